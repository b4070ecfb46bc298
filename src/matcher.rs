//! Assertion matcher (C8): finds every assertion in the library whose
//! hypotheses and thesis unify with a given goal, across permutations of
//! the goal's hypotheses (`unify_assertion`, grounded on
//! `LibraryToolbox::unify_assertion_uncached2` in the original toolbox).

use crate::config::ToolboxOptions;
use crate::intern::LabTok;
use crate::library::{Library, Sentence};
use crate::lrparser::Lr1Parser;
use crate::tree::ParsingTree;
use crate::unify::UnilateralUnificator;
use std::collections::HashMap;

/// A single match: which assertion, which permutation of the caller's
/// hypothesis sentences lines up with the assertion's own hypothesis
/// order, and the symbol-level substitution that makes it work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub label: LabTok,
    /// `perm[i]` is the index into the caller's `hyp_sentences` that was
    /// matched against the assertion's `i`-th mandatory hypothesis.
    pub perm: Vec<usize>,
    pub subst: HashMap<LabTok, Sentence>,
}

/// Parses a sentence of the stated typecode via `parser`. Returns `None` on
/// a failed parse (caller usually skips the candidate assertion).
fn parse_sentence(parser: &Lr1Parser, lib: &Library, sentence: &Sentence) -> Option<ParsingTree> {
    if sentence.is_empty() {
        return None;
    }
    let tree = parser.parse(&sentence[1..]);
    if tree.is_failed() {
        None
    } else {
        let _ = lib;
        Some(tree)
    }
}

/// Reconstructs a symbol-level sentence from a substitution applied to an
/// assertion's own template trees, consistent with `reconstruct_sentence`.
fn tree_to_sentence(tree: &ParsingTree, grammar: &crate::grammar::Grammar, first: crate::intern::SymTok) -> Sentence {
    crate::lrparser::reconstruct_sentence(grammar, tree, first).unwrap_or_default()
}

/// Finds every assertion unifiable with `(hyp_sentences, thesis_sentence)`,
/// trying every permutation of `hyp_sentences` against the assertion's
/// mandatory-hypothesis order. If `just_first` is set, stops at the first
/// match and is eligible for the matcher's cache; otherwise always computes
/// the full set.
pub struct AssertionMatcher<'a> {
    lib: &'a Library,
    grammar: &'a crate::grammar::Grammar,
    parser: &'a Lr1Parser,
    start_type: crate::intern::SymTok,
    /// The provability marker (e.g. `|-`): only assertions whose thesis
    /// sentence starts with this symbol are candidates. A floating
    /// hypothesis's own declaring assertion has a syntax-typed thesis
    /// (`wff -> v`, never `|- ...`) and is excluded by this check, the
    /// same partition `grammar::extract_grammar` uses to decide what
    /// contributes a production instead of a provable step.
    turnstile: crate::intern::SymTok,
    /// Controls whether the cache and full hypothesis-permutation search
    /// are used; see `ToolboxOptions`.
    opts: ToolboxOptions,
    cache: HashMap<(Vec<Sentence>, Sentence), Vec<MatchResult>>,
}

impl<'a> AssertionMatcher<'a> {
    pub fn new(
        lib: &'a Library,
        grammar: &'a crate::grammar::Grammar,
        parser: &'a Lr1Parser,
        start_type: crate::intern::SymTok,
        turnstile: crate::intern::SymTok,
    ) -> Self {
        Self::with_options(lib, grammar, parser, start_type, turnstile, ToolboxOptions::default())
    }

    /// Like `new`, but with explicit `ToolboxOptions` instead of the
    /// session-wide default.
    pub fn with_options(
        lib: &'a Library,
        grammar: &'a crate::grammar::Grammar,
        parser: &'a Lr1Parser,
        start_type: crate::intern::SymTok,
        turnstile: crate::intern::SymTok,
        opts: ToolboxOptions,
    ) -> Self {
        AssertionMatcher {
            lib,
            grammar,
            parser,
            start_type,
            turnstile,
            opts,
            cache: HashMap::new(),
        }
    }

    pub fn unify_assertion(
        &mut self,
        hyp_sentences: &[Sentence],
        thesis_sentence: &Sentence,
        just_first: bool,
    ) -> Vec<MatchResult> {
        let cache_key = (hyp_sentences.to_vec(), thesis_sentence.clone());
        let use_cache = just_first && self.opts.unification_cache_enabled;
        if use_cache {
            if let Some(hit) = self.cache.get(&cache_key) {
                return hit.clone();
            }
        }
        let up_to_hyps_perms = self.opts.up_to_hyps_perms_default;

        let Some(thesis_tree) = parse_sentence(self.parser, self.lib, thesis_sentence) else {
            return Vec::new();
        };
        let hyp_trees: Vec<Option<ParsingTree>> = hyp_sentences
            .iter()
            .map(|s| parse_sentence(self.parser, self.lib, s))
            .collect();
        if hyp_trees.iter().any(|t| t.is_none()) {
            return Vec::new();
        }
        let hyp_trees: Vec<ParsingTree> = hyp_trees.into_iter().map(|t| t.unwrap()).collect();

        let mut results = Vec::new();
        for (label, assertion) in self.lib.list_assertions() {
            if assertion.usage_disc {
                continue;
            }
            let Some(candidate_thesis) = self.lib.get_sentence(assertion.thesis) else {
                continue;
            };
            if candidate_thesis.first() != Some(&self.turnstile) {
                continue;
            }
            if assertion.ess_hyps.len() != hyp_trees.len() {
                continue;
            }
            let Some(result) = self.try_match(label, &hyp_trees, &thesis_tree, up_to_hyps_perms) else {
                continue;
            };
            results.push(result);
            if just_first {
                break;
            }
        }

        if use_cache {
            self.cache.insert(cache_key, results.clone());
        }
        results
    }

    /// Tries `hyp_trees` against `candidate`'s mandatory hypothesis order,
    /// in every permutation when `up_to_hyps_perms` is set
    /// (`ToolboxOptions::up_to_hyps_perms_default`) or just the caller's own
    /// order otherwise. Every variable is a distinct symbol global to the
    /// library, so two assertions never share a variable label and no
    /// refresh step is needed before unifying (unlike the original toolbox,
    /// where refreshing avoided collisions between an assertion's own bound
    /// variables and the caller's).
    fn try_match(
        &self,
        candidate: LabTok,
        hyp_trees: &[ParsingTree],
        thesis_tree: &ParsingTree,
        up_to_hyps_perms: bool,
    ) -> Option<MatchResult> {
        let assertion = self.lib.get_assertion(candidate)?;
        // Only essential hypotheses are matched positionally against the
        // caller's `hyp_trees`; floating hypotheses contribute no sentence
        // of their own here; instead their variable is bound wherever it
        // occurs as a leaf inside the thesis or essential-hyp trees, which
        // `UnilateralUnificator` resolves directly.
        let mand = &assertion.ess_hyps;
        if mand.len() != hyp_trees.len() {
            return None;
        }

        let candidate_thesis_sentence = self.lib.get_sentence(assertion.thesis)?;
        let candidate_thesis_tree = parse_sentence(self.parser, self.lib, candidate_thesis_sentence)?;

        let perms = if up_to_hyps_perms {
            permutations(hyp_trees.len())
        } else {
            vec![(0..hyp_trees.len()).collect()]
        };
        for perm in perms {
            let mut unificator = UnilateralUnificator::new();
            unificator.add_parsing_trees(candidate_thesis_tree.clone(), thesis_tree.clone());
            let mut ok = true;
            for (i, &hyp_label) in mand.iter().enumerate() {
                let Some(hyp_sentence) = self.lib.get_sentence(hyp_label) else {
                    ok = false;
                    break;
                };
                if hyp_sentence.is_empty() {
                    ok = false;
                    break;
                }
                let Some(hyp_tree) = parse_sentence(self.parser, self.lib, hyp_sentence) else {
                    ok = false;
                    break;
                };
                unificator.add_parsing_trees(hyp_tree, hyp_trees[perm[i]].clone());
            }
            if !ok {
                continue;
            }
            if let Ok(subst) = unificator.unify(self.lib) {
                let subst_sentences = subst
                    .iter()
                    .map(|(&lab, tree)| (lab, tree_to_sentence(tree, self.grammar, self.start_type)))
                    .collect();
                return Some(MatchResult {
                    label: candidate,
                    perm,
                    subst: subst_sentences,
                });
            }
        }
        None
    }
}

/// All permutations of `0..n`, smallest first. `n` is always a small
/// hypothesis count in practice (library assertions rarely exceed a
/// handful of mandatory hypotheses), so naive generation is adequate.
fn permutations(n: usize) -> Vec<Vec<usize>> {
    fn permute(prefix: &mut Vec<usize>, remaining: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if remaining.is_empty() {
            out.push(prefix.clone());
            return;
        }
        for i in 0..remaining.len() {
            let v = remaining.remove(i);
            prefix.push(v);
            permute(prefix, remaining, out);
            prefix.pop();
            remaining.insert(i, v);
        }
    }
    let mut out = Vec::new();
    permute(&mut Vec::new(), &mut (0..n).collect(), &mut out);
    out
}
