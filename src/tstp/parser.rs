//! TSTP parser (C11): an LR(1) grammar over the same machinery C4 builds
//! the Metamath grammar with, rather than a hand-written recursive
//! descent — `tstp_parser.h`'s `ParsingTree<Token,Rule>` reuse of its own
//! token ladder for exactly this reason
//! (`original_source/provers/tstp/tstp_parser.h`). `tstp::grammar::build`
//! supplies a `crate::grammar::Grammar` with no `Library` dependency;
//! `Lr1Parser::build` turns it into an LR(1) table the same way it turns
//! a Metamath grammar into one, and `Lr1Parser::parse` produces the same
//! `ParsingTree` shape C4 and C5 already operate on. Two tables are kept
//! live for the process's lifetime (one per start symbol) since TSTP's
//! grammar is fixed and never varies per input, unlike the Metamath
//! grammar extracted per-library.

use super::ast::{Fof, Fot};
use super::grammar::{self, label_char};
use super::lexer::tokenize;
use crate::error::ParseFailure;
use crate::lrparser::Lr1Parser;
use crate::tree::ParsingTree;
use std::sync::OnceLock;

/// One TSTP annotated formula: `fof(name, role, formula)`, optionally
/// followed by a `source` term and a `useful_info` term
/// (`fof(name, role, formula, source, useful_info).`). Neither annotation
/// is interpreted; they are kept as opaque terms for a caller that cares
/// about provenance, per the original toolbox's TSTP frontend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedFormula {
    pub name: String,
    pub role: String,
    pub formula: Fof,
    pub source: Option<Fot>,
    pub useful_info: Option<Fot>,
}

fn fof_parser() -> &'static Lr1Parser {
    static PARSER: OnceLock<Lr1Parser> = OnceLock::new();
    PARSER.get_or_init(|| {
        let g = grammar::build();
        Lr1Parser::build(&g, grammar::FOF).expect("TSTP FOF grammar must be LR(1)")
    })
}

fn clause_parser() -> &'static Lr1Parser {
    static PARSER: OnceLock<Lr1Parser> = OnceLock::new();
    PARSER.get_or_init(|| {
        let g = grammar::build();
        Lr1Parser::build(&g, grammar::CLAUSE).expect("TSTP clause grammar must be LR(1)")
    })
}

fn fail() -> ParseFailure {
    ParseFailure { token_stream_position: 0 }
}

// --- tree -> AST -----------------------------------------------------

/// Reassembles the string an `LID`/`UID`/`NUM` subtree spells out, one
/// character per "start"/"append" production, decoded from each node's
/// label via `label_char` (see `tstp::grammar` module docs for why the
/// literal character lives in the label rather than in `children`).
fn build_ident(tree: &ParsingTree) -> String {
    match tree.children.first() {
        None => label_char(tree.label).into_iter().collect(),
        Some(prefix) => {
            let mut s = build_ident(prefix);
            if let Some(c) = label_char(tree.label) {
                s.push(c);
            }
            s
        }
    }
}

fn build_name(tree: &ParsingTree) -> String {
    match tree.label.0 {
        grammar::R_NAME_FROM_LID | grammar::R_NAME_FROM_NUM => build_ident(&tree.children[0]),
        _ => String::new(),
    }
}

fn build_term(tree: &ParsingTree) -> Fot {
    match tree.label.0 {
        grammar::R_TERM_FROM_VAR => Fot::Variable(build_ident(&tree.children[0])),
        grammar::R_TERM_FROM_CONST => Fot::constant(build_ident(&tree.children[0])),
        grammar::R_TERM_FROM_APP => {
            let name = build_ident(&tree.children[0]);
            Fot::Functor(name, build_term_list(&tree.children[1]))
        }
        _ => unreachable!("not a TERM node: {:?}", tree.label),
    }
}

fn build_term_list(tree: &ParsingTree) -> Vec<Fot> {
    match tree.label.0 {
        grammar::R_TERMLIST_ONE => vec![build_term(&tree.children[0])],
        grammar::R_TERMLIST_EXTEND => {
            let mut v = build_term_list(&tree.children[0]);
            v.push(build_term(&tree.children[1]));
            v
        }
        _ => unreachable!("not a TERMLIST node: {:?}", tree.label),
    }
}

fn build_var_list(tree: &ParsingTree) -> Vec<String> {
    match tree.label.0 {
        grammar::R_VARLIST_ONE => vec![build_ident(&tree.children[0])],
        grammar::R_VARLIST_EXTEND => {
            let mut v = build_var_list(&tree.children[0]);
            v.push(build_ident(&tree.children[1]));
            v
        }
        _ => unreachable!("not a VARLIST node: {:?}", tree.label),
    }
}

/// `$`-prefixed atoms (`$true`, `$false`, `$distinct(...)`) are dispatched
/// by name here rather than threaded through the grammar as distinct
/// productions, matching the small fixed set TPTP itself defines.
fn build_fatom(tree: &ParsingTree) -> Result<Fof, ParseFailure> {
    match tree.label.0 {
        grammar::R_FATOM_FROM_TERM => match build_term(&tree.children[0]) {
            Fot::Functor(name, args) => Ok(Fof::Predicate(name, args)),
            Fot::Variable(_) => Err(fail()),
        },
        grammar::R_FATOM_EQUAL => Ok(Fof::Equal(
            Box::new(build_term(&tree.children[0])),
            Box::new(build_term(&tree.children[1])),
        )),
        grammar::R_FATOM_NOT_EQUAL => Ok(Fof::Not(Box::new(Fof::Equal(
            Box::new(build_term(&tree.children[0])),
            Box::new(build_term(&tree.children[1])),
        )))),
        grammar::R_FATOM_DOLLAR_BARE => {
            let name = build_ident(&tree.children[0]);
            Ok(match name.as_str() {
                "true" => Fof::True,
                "false" => Fof::False,
                _ => Fof::Predicate(format!("${name}"), vec![]),
            })
        }
        grammar::R_FATOM_DOLLAR_APP => {
            let name = build_ident(&tree.children[0]);
            let args = build_term_list(&tree.children[1]);
            Ok(if name == "distinct" {
                Fof::Distinct(args)
            } else {
                Fof::Predicate(format!("${name}"), args)
            })
        }
        _ => Err(fail()),
    }
}

fn build_ufof(tree: &ParsingTree) -> Result<Fof, ParseFailure> {
    match tree.label.0 {
        grammar::R_UFOF_FROM_ATOM => build_fatom(&tree.children[0]),
        grammar::R_UFOF_NOT => Ok(Fof::Not(Box::new(build_ufof(&tree.children[0])?))),
        grammar::R_UFOF_FORALL => {
            let vars = build_var_list(&tree.children[0]);
            Ok(Fof::Forall(vars, Box::new(build_ufof(&tree.children[1])?)))
        }
        grammar::R_UFOF_EXISTS => {
            let vars = build_var_list(&tree.children[0]);
            Ok(Fof::Exists(vars, Box::new(build_ufof(&tree.children[1])?)))
        }
        grammar::R_UFOF_PAREN => build_fof(&tree.children[0]),
        _ => Err(fail()),
    }
}

fn collect_and(tree: &ParsingTree) -> Result<Vec<Fof>, ParseFailure> {
    match tree.label.0 {
        grammar::R_AND_FOF_FROM_UFOF => Ok(vec![build_ufof(&tree.children[0])?]),
        grammar::R_AND_FOF_EXTEND => {
            let mut v = collect_and(&tree.children[0])?;
            v.push(build_ufof(&tree.children[1])?);
            Ok(v)
        }
        _ => Err(fail()),
    }
}

fn build_and_fof(tree: &ParsingTree) -> Result<Fof, ParseFailure> {
    let mut parts = collect_and(tree)?;
    Ok(if parts.len() == 1 { parts.pop().unwrap() } else { Fof::And(parts) })
}

fn collect_or(tree: &ParsingTree) -> Result<Vec<Fof>, ParseFailure> {
    match tree.label.0 {
        grammar::R_OR_FOF_FROM_AND_FOF => Ok(vec![build_and_fof(&tree.children[0])?]),
        grammar::R_OR_FOF_EXTEND => {
            let mut v = collect_or(&tree.children[0])?;
            v.push(build_and_fof(&tree.children[1])?);
            Ok(v)
        }
        _ => Err(fail()),
    }
}

fn build_or_fof(tree: &ParsingTree) -> Result<Fof, ParseFailure> {
    let mut parts = collect_or(tree)?;
    Ok(if parts.len() == 1 { parts.pop().unwrap() } else { Fof::Or(parts) })
}

fn build_fof(tree: &ParsingTree) -> Result<Fof, ParseFailure> {
    match tree.label.0 {
        grammar::R_FOF_FROM_OR => build_or_fof(&tree.children[0]),
        grammar::R_FOF_IMPLIES => Ok(Fof::Implies(
            Box::new(build_or_fof(&tree.children[0])?),
            Box::new(build_or_fof(&tree.children[1])?),
        )),
        grammar::R_FOF_IFF => Ok(Fof::Iff(
            Box::new(build_or_fof(&tree.children[0])?),
            Box::new(build_or_fof(&tree.children[1])?),
        )),
        grammar::R_FOF_XOR => Ok(Fof::Xor(
            Box::new(build_or_fof(&tree.children[0])?),
            Box::new(build_or_fof(&tree.children[1])?),
        )),
        grammar::R_FOF_NAND => Ok(Fof::Not(Box::new(Fof::And(vec![
            build_or_fof(&tree.children[0])?,
            build_or_fof(&tree.children[1])?,
        ])))),
        grammar::R_FOF_NOR => Ok(Fof::Not(Box::new(Fof::Or(vec![
            build_or_fof(&tree.children[0])?,
            build_or_fof(&tree.children[1])?,
        ])))),
        _ => Err(fail()),
    }
}

fn build_clause(tree: &ParsingTree) -> Result<AnnotatedFormula, ParseFailure> {
    let keyword = build_ident(&tree.children[0]);
    if keyword != "fof" && keyword != "cnf" {
        return Err(fail());
    }
    let name = build_name(&tree.children[1]);
    let role = build_ident(&tree.children[2]);
    let formula = build_fof(&tree.children[3])?;
    match tree.label.0 {
        grammar::R_CLAUSE_BARE => Ok(AnnotatedFormula {
            name,
            role,
            formula,
            source: None,
            useful_info: None,
        }),
        grammar::R_CLAUSE_WITH_SOURCE => Ok(AnnotatedFormula {
            name,
            role,
            formula,
            source: Some(build_term(&tree.children[4])),
            useful_info: None,
        }),
        grammar::R_CLAUSE_WITH_USEFUL_INFO => Ok(AnnotatedFormula {
            name,
            role,
            formula,
            source: Some(build_term(&tree.children[4])),
            useful_info: Some(build_term(&tree.children[5])),
        }),
        _ => Err(fail()),
    }
}

/// Parses a bare formula (no surrounding `fof(...)` wrapper).
pub fn parse_fof(input: &str) -> Result<Fof, ParseFailure> {
    let toks = tokenize(input).ok_or_else(fail)?;
    let tree = fof_parser().parse(&toks);
    if tree.is_failed() {
        return Err(ParseFailure { token_stream_position: toks.len() });
    }
    build_fof(&tree)
}

/// Parses one `fof(name, role, formula).` or `cnf(name, role, formula).`
/// annotated clause, with optional trailing `source`/`useful_info` terms.
pub fn parse_annotated(input: &str) -> Result<AnnotatedFormula, ParseFailure> {
    let toks = tokenize(input).ok_or_else(fail)?;
    let tree = clause_parser().parse(&toks);
    if tree.is_failed() {
        return Err(ParseFailure { token_stream_position: toks.len() });
    }
    build_clause(&tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_conjunction_and_implication_precedence() {
        let f = parse_fof("a & b => c").unwrap();
        assert_eq!(
            f,
            Fof::Implies(
                Box::new(Fof::And(vec![
                    Fof::Predicate("a".into(), vec![]),
                    Fof::Predicate("b".into(), vec![])
                ])),
                Box::new(Fof::Predicate("c".into(), vec![]))
            )
        );
    }

    #[test]
    fn parses_disjunction_list_flat_not_nested() {
        let f = parse_fof("a | b | c").unwrap();
        assert_eq!(
            f,
            Fof::Or(vec![
                Fof::Predicate("a".into(), vec![]),
                Fof::Predicate("b".into(), vec![]),
                Fof::Predicate("c".into(), vec![]),
            ])
        );
    }

    #[test]
    fn parses_quantified_formula() {
        let f = parse_fof("! [X] : p(X)").unwrap();
        assert_eq!(
            f,
            Fof::Forall(
                vec!["X".into()],
                Box::new(Fof::Predicate("p".into(), vec![Fot::var("X")]))
            )
        );
    }

    #[test]
    fn parses_multi_variable_quantifier() {
        let f = parse_fof("? [X,Y] : (X = Y)").unwrap();
        assert_eq!(
            f,
            Fof::Exists(
                vec!["X".into(), "Y".into()],
                Box::new(Fof::Equal(Box::new(Fot::var("X")), Box::new(Fot::var("Y"))))
            )
        );
    }

    #[test]
    fn parses_not_equal() {
        let f = parse_fof("a != b").unwrap();
        assert_eq!(
            f,
            Fof::Not(Box::new(Fof::Equal(
                Box::new(Fot::constant("a")),
                Box::new(Fot::constant("b"))
            )))
        );
    }

    #[test]
    fn parses_dollar_true_and_false() {
        assert_eq!(parse_fof("$true").unwrap(), Fof::True);
        assert_eq!(parse_fof("$false").unwrap(), Fof::False);
    }

    #[test]
    fn parses_dollar_distinct() {
        let f = parse_fof("$distinct(a,b,c)").unwrap();
        assert_eq!(
            f,
            Fof::Distinct(vec![Fot::constant("a"), Fot::constant("b"), Fot::constant("c")])
        );
    }

    #[test]
    fn parses_nested_functor_application() {
        let f = parse_fof("p(f(X,a))").unwrap();
        assert_eq!(
            f,
            Fof::Predicate(
                "p".into(),
                vec![Fot::Functor("f".into(), vec![Fot::var("X"), Fot::constant("a")])]
            )
        );
    }

    #[test]
    fn parses_annotated_clause() {
        let af = parse_annotated("fof(ax1, axiom, p(a)).").unwrap();
        assert_eq!(af.name, "ax1");
        assert_eq!(af.role, "axiom");
        assert_eq!(af.formula, Fof::Predicate("p".into(), vec![Fot::constant("a")]));
        assert!(af.source.is_none());
        assert!(af.useful_info.is_none());
    }

    #[test]
    fn parses_annotated_clause_with_numeric_name() {
        let af = parse_annotated("cnf(42, axiom, p(a)).").unwrap();
        assert_eq!(af.name, "42");
        assert_eq!(af.role, "axiom");
    }

    #[test]
    fn parses_annotated_clause_with_source_and_useful_info() {
        let af = parse_annotated("fof(ax1, axiom, p(a), introduced(definition), status(thm)).");
        let af = af.unwrap();
        assert_eq!(
            af.source,
            Some(Fot::Functor("introduced".into(), vec![Fot::constant("definition")]))
        );
        assert_eq!(
            af.useful_info,
            Some(Fot::Functor("status".into(), vec![Fot::constant("thm")]))
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_fof("a &").is_err());
    }

    #[test]
    fn rejects_bare_variable_as_a_formula() {
        assert!(parse_fof("X").is_err());
    }

    #[test]
    fn rejects_clause_with_unknown_keyword() {
        assert!(parse_annotated("foo(ax1, axiom, p(a)).").is_err());
    }
}
