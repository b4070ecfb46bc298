//! Grammar extractor (C3): derives a context-free grammar from the library.
//!
//! Every typed variable (floating hypothesis) and every hypothesis-free,
//! non-theorem axiom whose thesis does not start with the turnstile
//! contributes one production. This induces exactly the CFG under which
//! every provable assertion in the library parses (spec §4.2).

use crate::intern::{LabTok, SymTok};
use crate::library::Library;
use std::collections::HashMap;

/// One CFG production: `lhs -> rhs`, where each element of `rhs` is either a
/// terminal (a constant symbol) or the typecode of a nonterminal, produced
/// by the assertion/hypothesis `label`.
#[derive(Debug, Clone)]
pub struct Derivation {
    pub label: LabTok,
    pub lhs: SymTok,
    /// For a floating hypothesis `T -> v`, `rhs` is the single-element
    /// `[v]`: the variable's own symbol, consumed as a terminal leaf.
    pub rhs: Vec<SymTok>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarError {
    /// The candidate axiom mentions the same variable twice in its thesis.
    RepeatedVariable(LabTok),
}

#[derive(Debug, Default)]
pub struct Grammar {
    pub derivations: Vec<Derivation>,
    /// Inverts `derivations` for reconstruction: for each production label,
    /// its index into `derivations`.
    pub ders_by_label: HashMap<LabTok, usize>,
    /// Variable-producing labels, by the variable's symbol.
    pub var_productions: HashMap<SymTok, LabTok>,
}

impl Grammar {
    pub fn derivation_for(&self, label: LabTok) -> Option<&Derivation> {
        self.ders_by_label.get(&label).map(|&i| &self.derivations[i])
    }

    fn push(&mut self, d: Derivation) {
        let idx = self.derivations.len();
        self.ders_by_label.insert(d.label, idx);
        self.derivations.push(d);
    }
}

/// Extracts the grammar from `lib`. `turnstile` is the symbol that marks a
/// thesis as a provable statement rather than syntax (`⊢`); productions are
/// never derived from theses starting with it.
pub fn extract_grammar(lib: &Library, turnstile: SymTok) -> Result<Grammar, GrammarError> {
    let mut grammar = Grammar::default();

    // Every typed variable becomes `T -> v`.
    for (var_lab, var_sym, type_sym) in variable_declarations(lib) {
        grammar.push(Derivation {
            label: var_lab,
            lhs: type_sym,
            rhs: vec![var_sym],
        });
        grammar.var_productions.insert(var_sym, var_lab);
    }

    for (label, assertion) in lib.list_assertions() {
        if assertion.is_theorem || !assertion.ess_hyps.is_empty() || !assertion.mand_dv.is_empty() {
            continue;
        }
        let Some(thesis) = lib.get_sentence(assertion.thesis) else {
            continue;
        };
        if thesis.is_empty() || thesis[0] == turnstile {
            continue;
        }
        let lhs = thesis[0];
        let mut rhs = Vec::with_capacity(thesis.len() - 1);
        let mut seen_vars = std::collections::HashSet::new();
        let mut repeated = None;
        for &tok in &thesis[1..] {
            if lib.is_variable(tok) {
                if !seen_vars.insert(tok) {
                    repeated = Some(label);
                    break;
                }
                rhs.push(lib.var_symbol_type(tok).unwrap_or(tok));
            } else {
                rhs.push(tok);
            }
        }
        if let Some(l) = repeated {
            return Err(GrammarError::RepeatedVariable(l));
        }
        grammar.push(Derivation { label, lhs, rhs });
    }

    Ok(grammar)
}

/// Finds every floating hypothesis `T v` in the library, returning
/// `(label, var_symbol, type_symbol)` triples.
fn variable_declarations(lib: &Library) -> Vec<(LabTok, SymTok, SymTok)> {
    let mut out = Vec::new();
    for (label, assertion) in lib.list_assertions() {
        if assertion.is_theorem {
            continue;
        }
        if !assertion.ess_hyps.is_empty() || !assertion.float_hyps.is_empty() {
            continue;
        }
        let Some(sentence) = lib.get_sentence(label) else {
            continue;
        };
        if sentence.len() == 2 && lib.is_variable(sentence[1]) {
            out.push((label, sentence[1], sentence[0]));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{Assertion, StackFrame};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn bare_assertion(thesis: LabTok) -> Assertion {
        Assertion {
            valid: true,
            is_theorem: false,
            float_hyps: vec![],
            ess_hyps: vec![],
            opt_hyps: BTreeSet::new(),
            mand_dv: BTreeSet::new(),
            opt_dv: BTreeSet::new(),
            thesis,
            number: 0,
            proof: None,
            comment: String::new(),
            usage_disc: false,
            modif_disc: false,
        }
    }

    /// `wff -> ( wff -> wff )`, `wff -> v`, `wff -> w`, `set -> x`. `v` and
    /// `w` are two distinct wff variables so `wi`'s thesis doesn't repeat a
    /// variable (`extract_grammar` rejects that).
    fn build_arrow_grammar() -> (Library, SymTok, SymTok, SymTok) {
        let mut lib = Library::new();
        let wff = lib.create_symbol("wff").unwrap();
        let set = lib.create_symbol("set").unwrap();
        let arrow = lib.create_symbol("->").unwrap();
        let lparen = lib.create_symbol("(").unwrap();
        let rparen = lib.create_symbol(")").unwrap();
        let turnstile = lib.create_symbol("|-").unwrap();
        let v = lib.create_symbol("v").unwrap();
        let w = lib.create_symbol("w").unwrap();
        let x = lib.create_symbol("x").unwrap();
        for c in [wff, set, arrow, lparen, rparen, turnstile] {
            lib.add_constant(c);
        }
        let vv = lib.create_label("vv").unwrap();
        lib.add_sentence(vv, vec![wff, v]);
        lib.add_assertion(vv, bare_assertion(vv));
        lib.declare_variable(vv, v, wff);

        let vw = lib.create_label("vw").unwrap();
        lib.add_sentence(vw, vec![wff, w]);
        lib.add_assertion(vw, bare_assertion(vw));
        lib.declare_variable(vw, w, wff);

        let vx = lib.create_label("vx").unwrap();
        lib.add_sentence(vx, vec![set, x]);
        lib.add_assertion(vx, bare_assertion(vx));
        lib.declare_variable(vx, x, set);

        let wi = lib.create_label("wi").unwrap();
        lib.add_sentence(wi, vec![wff, lparen, v, arrow, w, rparen]);
        lib.add_assertion(wi, bare_assertion(wi));

        (lib, wff, set, turnstile)
    }

    #[test]
    fn extracts_productions_for_vars_and_axioms() {
        let (lib, wff, set, turnstile) = build_arrow_grammar();
        let grammar = extract_grammar(&lib, turnstile).unwrap();
        assert_eq!(grammar.derivations.len(), 4);
        assert!(grammar
            .derivations
            .iter()
            .any(|d| d.lhs == wff && d.rhs.len() == 1));
        assert!(grammar
            .derivations
            .iter()
            .any(|d| d.lhs == set && d.rhs.len() == 1));
        assert!(grammar.derivations.iter().any(|d| d.rhs.len() == 5));
    }

    #[test]
    fn skips_theses_starting_with_turnstile() {
        let (mut lib, wff, _set, turnstile) = build_arrow_grammar();
        let ax = lib.create_label("ax-1").unwrap();
        lib.add_sentence(ax, vec![turnstile, wff]);
        lib.add_assertion(ax, bare_assertion(ax));
        let grammar = extract_grammar(&lib, turnstile).unwrap();
        assert!(grammar.derivation_for(ax).is_none());
    }

    #[test]
    fn rejects_repeated_variable_in_thesis() {
        let (mut lib, wff, _set, turnstile) = build_arrow_grammar();
        let v = lib.lookup_symbol("v").unwrap();
        let bad = lib.create_label("bad").unwrap();
        lib.add_sentence(bad, vec![wff, v, v]);
        lib.add_assertion(bad, bare_assertion(bad));
        let err = extract_grammar(&lib, turnstile).unwrap_err();
        assert_eq!(err, GrammarError::RepeatedVariable(bad));
    }
}
