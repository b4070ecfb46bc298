//! Registered-prover cache (C10): a process-wide, append-only registry
//! mapping a prover's template goal to a handle, plus per-library binding
//! of that handle to a concrete assertion match (grounded on
//! `compute_registered_provers`/`compute_registered_prover` in the
//! original toolbox).

use crate::intern::LabTok;
use crate::library::Sentence;
use crate::matcher::MatchResult;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

/// A stable handle into the registry, handed out in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProverHandle(pub usize);

#[derive(Debug, Clone)]
struct TemplateEntry {
    hyp_templates: Vec<Sentence>,
    thesis_template: Sentence,
}

struct Registry {
    templates: Vec<TemplateEntry>,
}

fn registry() -> &'static Mutex<Registry> {
    static REGISTRY: OnceLock<Mutex<Registry>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(Registry { templates: Vec::new() }))
}

/// Registers a prover's template shape once, process-wide, for the
/// lifetime of the program. Called during static setup by a prover module
/// (e.g. the TSTP frontend registering its `fof`-goal templates); never
/// called per-library.
pub fn register_prover(hyp_templates: Vec<Sentence>, thesis_template: Sentence) -> ProverHandle {
    let mut reg = registry().lock().unwrap();
    let handle = ProverHandle(reg.templates.len());
    reg.templates.push(TemplateEntry {
        hyp_templates,
        thesis_template,
    });
    handle
}

/// How a library-local binding behaves when no library assertion matches a
/// registered template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnboundPolicy {
    /// `bind` returns `None`; callers decide for themselves.
    NoOp,
    /// `bind` panics with a descriptive message; used where the caller
    /// has already asserted the library must define this prover.
    HardError,
}

/// A library-local binding of every registered handle to a
/// `(label, MatchResult)` pair, built once per library and then reused
/// across proof steps without re-invoking the matcher.
#[derive(Debug, Default)]
pub struct ProverBindings {
    bound: HashMap<ProverHandle, (LabTok, MatchResult)>,
}

impl ProverBindings {
    pub fn new() -> Self {
        ProverBindings::default()
    }

    /// Resolves `handle` against `lib` via `matcher`, caching the result.
    /// What happens when nothing in the library matches is governed by
    /// `opts.unbound_prover_policy`.
    pub fn bind(
        &mut self,
        handle: ProverHandle,
        matcher: &mut crate::matcher::AssertionMatcher<'_>,
        opts: &crate::config::ToolboxOptions,
    ) -> Option<(LabTok, MatchResult)> {
        if let Some(existing) = self.bound.get(&handle) {
            return Some(existing.clone());
        }
        let reg = registry().lock().unwrap();
        let Some(entry) = reg.templates.get(handle.0).cloned() else {
            return None;
        };
        drop(reg);
        let results = matcher.unify_assertion(&entry.hyp_templates, &entry.thesis_template, true);
        match results.into_iter().next() {
            Some(result) => {
                let label = result.label;
                self.bound.insert(handle, (label, result.clone()));
                Some((label, result))
            }
            None => match opts.unbound_prover_policy {
                UnboundPolicy::NoOp => None,
                UnboundPolicy::HardError => {
                    panic!("no assertion in this library satisfies registered prover {handle:?}")
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::extract_grammar;
    use crate::library::{Assertion, Library};
    use crate::lrparser::Lr1Parser;
    use std::collections::BTreeSet;

    fn bare(thesis: LabTok) -> Assertion {
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

    #[test]
    fn unbound_prover_returns_none_under_noop_policy() {
        let mut lib = Library::new();
        let wff = lib.create_symbol("wff").unwrap();
        let turnstile = lib.create_symbol("|-").unwrap();
        lib.add_constant(wff);
        lib.add_constant(turnstile);
        let v = lib.create_symbol("v").unwrap();
        let vv = lib.create_label("vv").unwrap();
        lib.add_sentence(vv, vec![wff, v]);
        lib.add_assertion(vv, bare(vv));
        lib.declare_variable(vv, v, wff);
        let grammar = extract_grammar(&lib, turnstile).unwrap();
        let parser = Lr1Parser::build(&grammar, wff).unwrap();
        let mut matcher = crate::matcher::AssertionMatcher::new(&lib, &grammar, &parser, wff, turnstile);

        let handle = register_prover(vec![], vec![turnstile, v, v]);
        let mut bindings = ProverBindings::new();
        let opts = crate::config::ToolboxOptions {
            unbound_prover_policy: UnboundPolicy::NoOp,
            ..crate::config::ToolboxOptions::default()
        };
        let result = bindings.bind(handle, &mut matcher, &opts);
        assert!(result.is_none());
    }

    #[test]
    #[should_panic]
    fn unbound_prover_panics_under_hard_error_policy() {
        let mut lib = Library::new();
        let wff = lib.create_symbol("wff").unwrap();
        let turnstile = lib.create_symbol("|-").unwrap();
        lib.add_constant(wff);
        lib.add_constant(turnstile);
        let v = lib.create_symbol("v").unwrap();
        let vv = lib.create_label("vv").unwrap();
        lib.add_sentence(vv, vec![wff, v]);
        lib.add_assertion(vv, bare(vv));
        lib.declare_variable(vv, v, wff);
        let grammar = extract_grammar(&lib, turnstile).unwrap();
        let parser = Lr1Parser::build(&grammar, wff).unwrap();
        let mut matcher = crate::matcher::AssertionMatcher::new(&lib, &grammar, &parser, wff, turnstile);

        let handle = register_prover(vec![], vec![turnstile, v, v]);
        let mut bindings = ProverBindings::new();
        let opts = crate::config::ToolboxOptions {
            unbound_prover_policy: UnboundPolicy::HardError,
            ..crate::config::ToolboxOptions::default()
        };
        bindings.bind(handle, &mut matcher, &opts);
    }
}
