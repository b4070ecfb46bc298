//! TSTP frontend (C11): CNF/FOF lexer, parser, tagged AST and a
//! capture-safe substitution used when a formula variable is replaced by a
//! ground witness term (e.g. instantiating a `Forall` when checking a
//! natural-deduction step in `nd`).

pub mod ast;
mod grammar;
pub mod lexer;
pub mod parser;

pub use ast::{fof_cmp, Fof, Fot};
pub use parser::{parse_annotated, parse_fof, AnnotatedFormula};

use crate::error::VariableCapture;

/// Replaces every free occurrence of `var` in `formula` with `replacement`,
/// refusing (rather than silently capturing) if doing so would place a
/// free variable of `replacement` under a binder that rebinds it.
pub fn replace(formula: &Fof, var: &str, replacement: &Fot) -> Result<Fof, VariableCapture> {
    let mut repl_free = std::collections::BTreeSet::new();
    replacement.free_variables(&mut repl_free);
    replace_inner(formula, var, replacement, &repl_free)
}

fn replace_inner(
    formula: &Fof,
    var: &str,
    replacement: &Fot,
    repl_free: &std::collections::BTreeSet<String>,
) -> Result<Fof, VariableCapture> {
    Ok(match formula {
        Fof::Predicate(name, args) => Fof::Predicate(
            name.clone(),
            args.iter().map(|a| replace_term(a, var, replacement)).collect(),
        ),
        Fof::True => Fof::True,
        Fof::False => Fof::False,
        Fof::Equal(a, b) => Fof::Equal(
            Box::new(replace_term(a, var, replacement)),
            Box::new(replace_term(b, var, replacement)),
        ),
        Fof::Distinct(terms) => {
            Fof::Distinct(terms.iter().map(|t| replace_term(t, var, replacement)).collect())
        }
        Fof::And(xs) => Fof::And(
            xs.iter()
                .map(|x| replace_inner(x, var, replacement, repl_free))
                .collect::<Result<_, _>>()?,
        ),
        Fof::Or(xs) => Fof::Or(
            xs.iter()
                .map(|x| replace_inner(x, var, replacement, repl_free))
                .collect::<Result<_, _>>()?,
        ),
        Fof::Iff(a, b) => Fof::Iff(
            Box::new(replace_inner(a, var, replacement, repl_free)?),
            Box::new(replace_inner(b, var, replacement, repl_free)?),
        ),
        Fof::Not(a) => Fof::Not(Box::new(replace_inner(a, var, replacement, repl_free)?)),
        Fof::Xor(a, b) => Fof::Xor(
            Box::new(replace_inner(a, var, replacement, repl_free)?),
            Box::new(replace_inner(b, var, replacement, repl_free)?),
        ),
        Fof::Implies(a, b) => Fof::Implies(
            Box::new(replace_inner(a, var, replacement, repl_free)?),
            Box::new(replace_inner(b, var, replacement, repl_free)?),
        ),
        Fof::Oeq(a, b) => Fof::Oeq(
            Box::new(replace_inner(a, var, replacement, repl_free)?),
            Box::new(replace_inner(b, var, replacement, repl_free)?),
        ),
        Fof::Forall(bound, body) | Fof::Exists(bound, body) => {
            if bound.iter().any(|b| b == var) {
                // `var` is rebound here: it no longer occurs free below,
                // so this subtree is left untouched.
                return Ok(formula.clone());
            }
            if bound.iter().any(|b| repl_free.contains(b)) {
                return Err(VariableCapture(var.to_string()));
            }
            let new_body = Box::new(replace_inner(body, var, replacement, repl_free)?);
            match formula {
                Fof::Forall(..) => Fof::Forall(bound.clone(), new_body),
                _ => Fof::Exists(bound.clone(), new_body),
            }
        }
    })
}

fn replace_term(term: &Fot, var: &str, replacement: &Fot) -> Fot {
    match term {
        Fot::Variable(v) if v == var => replacement.clone(),
        Fot::Variable(_) => term.clone(),
        Fot::Functor(name, args) => Fot::Functor(
            name.clone(),
            args.iter().map(|a| replace_term(a, var, replacement)).collect(),
        ),
    }
}

/// Renders a formula back to TSTP surface syntax, with full parenthesization
/// (no precedence-driven omission) so the output always round-trips through
/// `parse_fof` regardless of which connectives it mixes.
pub fn write_tstp(formula: &Fof) -> String {
    match formula {
        Fof::Predicate(name, args) if args.is_empty() => name.clone(),
        Fof::Predicate(name, args) => {
            format!("{name}({})", args.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(","))
        }
        Fof::True => "$true".to_string(),
        Fof::False => "$false".to_string(),
        Fof::Equal(a, b) => format!("{a} = {b}"),
        Fof::Distinct(terms) => format!(
            "$distinct({})",
            terms.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(",")
        ),
        Fof::And(xs) => format!("({})", xs.iter().map(write_tstp).collect::<Vec<_>>().join(" & ")),
        Fof::Or(xs) => format!("({})", xs.iter().map(write_tstp).collect::<Vec<_>>().join(" | ")),
        Fof::Iff(a, b) => format!("({} <=> {})", write_tstp(a), write_tstp(b)),
        Fof::Not(a) => format!("~({})", write_tstp(a)),
        Fof::Xor(a, b) => format!("({} <~> {})", write_tstp(a), write_tstp(b)),
        Fof::Implies(a, b) => format!("({} => {})", write_tstp(a), write_tstp(b)),
        Fof::Oeq(a, b) => format!("({} <=> {})", write_tstp(a), write_tstp(b)),
        Fof::Forall(vars, body) => format!("![{}]:({})", vars.join(","), write_tstp(body)),
        Fof::Exists(vars, body) => format!("?[{}]:({})", vars.join(","), write_tstp(body)),
    }
}

/// Writes one annotated clause, the inverse of `parse_annotated`.
pub fn write_annotated(af: &AnnotatedFormula) -> String {
    let mut out = format!("fof({},{},{}", af.name, af.role, write_tstp(&af.formula));
    if let Some(source) = &af.source {
        out.push(',');
        out.push_str(&source.to_string());
        if let Some(useful_info) = &af.useful_info {
            out.push(',');
            out.push_str(&useful_info.to_string());
        }
    }
    out.push_str(").");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_substitutes_free_occurrences() {
        let f = Fof::Predicate("p".into(), vec![Fot::var("X")]);
        let result = replace(&f, "X", &Fot::constant("a")).unwrap();
        assert_eq!(result, Fof::Predicate("p".into(), vec![Fot::constant("a")]));
    }

    #[test]
    fn replace_skips_rebound_variable() {
        let f = Fof::Forall(
            vec!["X".into()],
            Box::new(Fof::Predicate("p".into(), vec![Fot::var("X")])),
        );
        let result = replace(&f, "X", &Fot::constant("a")).unwrap();
        assert_eq!(result, f);
    }

    #[test]
    fn replace_rejects_capturing_substitution() {
        let f = Fof::Forall(
            vec!["Y".into()],
            Box::new(Fof::Predicate("p".into(), vec![Fot::var("X")])),
        );
        let err = replace(&f, "X", &Fot::var("Y")).unwrap_err();
        assert_eq!(err, VariableCapture("X".to_string()));
    }

    #[test]
    fn write_then_parse_round_trips() {
        let f = parse_fof("! [X] : (p(X) => q(X))").unwrap();
        let text = write_tstp(&f);
        let reparsed = parse_fof(&text).unwrap();
        assert_eq!(f, reparsed);
    }
}
