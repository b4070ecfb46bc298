//! Proof engine (C9): a stack machine that replays a label sequence against
//! a library, checking floating/essential hypotheses and mandatory
//! distinct-variable constraints at each step (spec §4.6, grounded on
//! `checked_prover`/`type_proving_helper` in the original toolbox).

use crate::error::{ProofError, ProofErrorReason};
use crate::intern::{LabTok, SymTok};
use crate::library::{DvPair, Library, Sentence};
use std::collections::{BTreeSet, HashMap};

/// One stack entry: a fully substituted sentence plus the distinct-variable
/// pairs contributed by the hypotheses used to derive it, so that the
/// engine can check a later step's mandatory `mand_dv` requirement against
/// its antecedents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackEntry {
    pub sentence: Sentence,
    pub dv: BTreeSet<DvPair>,
}

/// A checkpoint the engine can roll back to: the stack length at the time
/// it was taken. Nested checkpoints are just stack-length marks, so
/// `commit` is a no-op and `rollback` truncates (mirroring the original's
/// nested try/catch-as-checkpoint pattern without exceptions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// Replays a proof (a sequence of labels) against a library, maintaining an
/// explicit stack of derived sentences.
pub struct ProofEngine<'a> {
    lib: &'a Library,
    stack: Vec<StackEntry>,
    /// The substitution bound to each floating-hypothesis variable at the
    /// current point, accumulated across `process_label` calls that
    /// provide a binding (via a preceding sequence of float-hyp steps).
    float_subst: HashMap<LabTok, Sentence>,
    /// The "caller's dv-set" (spec §4.8 step 4): the mandatory ∪ optional
    /// distinct-variable pairs declared by the theorem currently being
    /// verified. A mandatory dv requirement on a proof step is satisfied
    /// against this set as well as the dv pairs contributed by hypotheses
    /// already on the stack, since the theorem's own `$d` declarations are
    /// exactly the disjointness a step inside its proof is licensed to
    /// assume.
    context_dv: BTreeSet<DvPair>,
}

impl<'a> ProofEngine<'a> {
    pub fn new(lib: &'a Library) -> Self {
        ProofEngine {
            lib,
            stack: Vec::new(),
            float_subst: HashMap::new(),
            context_dv: BTreeSet::new(),
        }
    }

    /// Builds an engine that checks every proof step's mandatory dv
    /// constraints against `context_dv` in addition to hypothesis-contributed
    /// pairs — the caller's dv-set, e.g. a theorem's own mandatory ∪
    /// optional `$d` declarations while its proof is being verified.
    pub fn with_context_dv(lib: &'a Library, context_dv: BTreeSet<DvPair>) -> Self {
        ProofEngine {
            lib,
            stack: Vec::new(),
            float_subst: HashMap::new(),
            context_dv,
        }
    }

    pub fn stack(&self) -> &[StackEntry] {
        &self.stack
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.stack.len())
    }

    pub fn commit(&self, _checkpoint: Checkpoint) {
        // No-op: a committed checkpoint simply stops being a valid
        // rollback target once a later one is taken over it.
    }

    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.stack.truncate(checkpoint.0);
    }

    /// Checks that `candidate`'s leading type constant matches the type
    /// declared for the variable bound by floating hypothesis `hyp_label`,
    /// and returns that variable's symbol on success. This is the
    /// syntactic, tree-shape-only check the original toolbox's
    /// `type_proving_helper` performs before a floating hypothesis may
    /// bind: no general type inference, just a leading-symbol comparison.
    pub fn prove_floating_type(&self, hyp_label: LabTok, candidate: &Sentence) -> Option<SymTok> {
        let hyp_sentence = self.lib.get_sentence(hyp_label)?;
        let var_sym = hyp_sentence.get(1).copied()?;
        let hyp_type = hyp_sentence.first().copied()?;
        if candidate.first() == Some(&hyp_type) {
            Some(var_sym)
        } else {
            None
        }
    }

    /// Pushes the sentence bound to a floating-hypothesis variable.
    pub fn process_floating(&mut self, label: LabTok, sentence: Sentence) -> Result<(), ProofError> {
        if self.prove_floating_type(label, &sentence).is_none() {
            return Err(ProofError {
                label,
                reason: ProofErrorReason::FloatingTypeMismatch,
                on_stack: self.stack.iter().map(|e| e.sentence.clone()).collect(),
                to_subst: Some(sentence),
                subst_map: self.current_subst(),
            });
        }
        self.float_subst.insert(label, sentence.clone());
        self.stack.push(StackEntry {
            sentence,
            dv: BTreeSet::new(),
        });
        Ok(())
    }

    /// Processes one proof step: pops this label's mandatory hypotheses off
    /// the stack (in order), checks floating-hypothesis types and
    /// essential-hypothesis equality, checks the mandatory distinct-variable
    /// set against the DV pairs contributed by the popped hypotheses, and
    /// pushes the conclusion.
    pub fn process_label(&mut self, label: LabTok) -> Result<(), ProofError> {
        let assertion = self.lib.get_assertion(label).ok_or_else(|| ProofError {
            label,
            reason: ProofErrorReason::StackUnderflow,
            on_stack: self.stack.iter().map(|e| e.sentence.clone()).collect(),
            to_subst: None,
            subst_map: self.current_subst(),
        })?;

        let mand = assertion.mand_hyps();
        if self.stack.len() < mand.len() {
            return Err(ProofError {
                label,
                reason: ProofErrorReason::StackUnderflow,
                on_stack: self.stack.iter().map(|e| e.sentence.clone()).collect(),
                to_subst: None,
                subst_map: self.current_subst(),
            });
        }
        let base = self.stack.len() - mand.len();
        let popped: Vec<StackEntry> = self.stack.split_off(base);

        let mut subst: HashMap<SymTok, Sentence> = HashMap::new();
        let mut contributed_dv = self.context_dv.clone();
        for (hyp_label, entry) in mand.iter().zip(popped.iter()) {
            if assertion.float_hyps.contains(hyp_label) {
                let Some(var_sym) = self.prove_floating_type(*hyp_label, &entry.sentence) else {
                    return Err(self.fail(label, ProofErrorReason::FloatingTypeMismatch, popped.clone(), None));
                };
                subst.insert(var_sym, entry.sentence.clone());
            } else {
                let Some(hyp_sentence) = self.lib.get_sentence(*hyp_label) else {
                    return Err(self.fail(label, ProofErrorReason::EssentialMismatch, popped.clone(), None));
                };
                let expected = apply_subst(hyp_sentence, self.lib, &subst);
                if expected != entry.sentence {
                    return Err(self.fail(
                        label,
                        ProofErrorReason::EssentialMismatch,
                        popped.clone(),
                        Some(expected),
                    ));
                }
            }
            contributed_dv.extend(entry.dv.iter().copied());
        }

        // Mandatory DV check: every pair in `assertion.mand_dv` names two
        // variables of the template; under `subst` those map to ground
        // sentences whose every symbol-pair must already be disjoint
        // (tracked via `contributed_dv`) or the proof step is invalid.
        for pair in &assertion.mand_dv {
            let Some(sub_a) = subst.get(&pair.0) else { continue };
            let Some(sub_b) = subst.get(&pair.1) else { continue };
            if !dv_holds(sub_a, sub_b, self.lib, &contributed_dv) {
                return Err(self.fail(label, ProofErrorReason::DistinctViolation, popped.clone(), None));
            }
        }

        let Some(thesis_sentence) = self.lib.get_sentence(assertion.thesis) else {
            return Err(self.fail(label, ProofErrorReason::StackUnderflow, popped.clone(), None));
        };
        let conclusion = apply_subst(thesis_sentence, self.lib, &subst);
        self.stack.push(StackEntry {
            sentence: conclusion,
            dv: contributed_dv,
        });
        Ok(())
    }

    /// Builds a `ProofError` and restores `popped` onto the stack: a failed
    /// step must leave the stack exactly as it found it, since a caller that
    /// only intended to probe a step (without an explicit checkpoint) is
    /// still entitled to a stack unchanged by the attempt.
    fn fail(
        &mut self,
        label: LabTok,
        reason: ProofErrorReason,
        popped: Vec<StackEntry>,
        to_subst: Option<Sentence>,
    ) -> ProofError {
        let on_stack = popped.iter().map(|e| e.sentence.clone()).collect();
        self.stack.extend(popped);
        ProofError {
            label,
            reason,
            on_stack,
            to_subst,
            subst_map: self.current_subst(),
        }
    }

    fn current_subst(&self) -> HashMap<LabTok, Sentence> {
        self.float_subst.clone()
    }
}

/// Substitutes every variable symbol in `sentence` per `subst`, leaving
/// constants and unbound variables untouched.
fn apply_subst(sentence: &[SymTok], lib: &Library, subst: &HashMap<SymTok, Sentence>) -> Sentence {
    let mut out = Vec::with_capacity(sentence.len());
    for &tok in sentence {
        if lib.is_variable(tok) {
            match subst.get(&tok) {
                Some(bound) => out.extend(bound.iter().copied()),
                None => out.push(tok),
            }
        } else {
            out.push(tok);
        }
    }
    out
}

/// Two ground sentences satisfy a distinct-variable requirement if every
/// pair of variables they respectively mention is already known-disjoint
/// (present in `known_dv`), per invariant 5's "no implicit freshness" rule:
/// the engine never invents disjointness, it only checks what was already
/// established by the hypotheses in scope.
fn dv_holds(
    a: &[SymTok],
    b: &[SymTok],
    lib: &Library,
    known_dv: &BTreeSet<DvPair>,
) -> bool {
    let vars_a: Vec<SymTok> = a.iter().copied().filter(|&t| lib.is_variable(t)).collect();
    let vars_b: Vec<SymTok> = b.iter().copied().filter(|&t| lib.is_variable(t)).collect();
    for &va in &vars_a {
        for &vb in &vars_b {
            if va == vb {
                return false;
            }
            let Some(pair) = crate::library::DvPair::new(va, vb) else {
                continue;
            };
            if !known_dv.contains(&pair) {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::Assertion;
    use std::collections::BTreeSet;

    fn bare(thesis: LabTok, float_hyps: Vec<LabTok>, ess_hyps: Vec<LabTok>, mand_dv: BTreeSet<crate::library::DvPair>) -> Assertion {
        Assertion {
            valid: true,
            is_theorem: false,
            float_hyps,
            ess_hyps,
            opt_hyps: BTreeSet::new(),
            mand_dv,
            opt_dv: BTreeSet::new(),
            thesis,
            number: 0,
            proof: None,
            comment: String::new(),
            usage_disc: false,
            modif_disc: false,
        }
    }

    fn ax_mp_style_db() -> (Library, LabTok, LabTok, LabTok, LabTok) {
        let mut lib = Library::new();
        let wff = lib.create_symbol("wff").unwrap();
        let turnstile = lib.create_symbol("|-").unwrap();
        let arrow = lib.create_symbol("->").unwrap();
        for c in [wff, turnstile, arrow] {
            lib.add_constant(c);
        }
        let p = lib.create_symbol("p").unwrap();
        let q = lib.create_symbol("q").unwrap();

        let vp = lib.create_label("vp").unwrap();
        lib.add_sentence(vp, vec![wff, p]);
        lib.add_assertion(vp, bare(vp, vec![], vec![], BTreeSet::new()));
        lib.declare_variable(vp, p, wff);

        let vq = lib.create_label("vq").unwrap();
        lib.add_sentence(vq, vec![wff, q]);
        lib.add_assertion(vq, bare(vq, vec![], vec![], BTreeSet::new()));
        lib.declare_variable(vq, q, wff);

        let min = lib.create_label("min").unwrap();
        lib.add_sentence(min, vec![turnstile, p]);
        lib.add_assertion(min, bare(min, vec![vp], vec![], BTreeSet::new()));

        let maj = lib.create_label("maj").unwrap();
        lib.add_sentence(maj, vec![turnstile, p, arrow, q]);
        lib.add_assertion(maj, bare(maj, vec![vp, vq], vec![], BTreeSet::new()));

        let ax_mp = lib.create_label("ax-mp").unwrap();
        lib.add_sentence(ax_mp, vec![turnstile, q]);
        lib.add_assertion(
            ax_mp,
            bare(ax_mp, vec![vp, vq], vec![min, maj], BTreeSet::new()),
        );

        (lib, vp, vq, min, maj)
    }

    #[test]
    fn process_label_derives_conclusion_via_ax_mp() {
        let (lib, vp, vq, min, maj) = ax_mp_style_db();
        let p = lib.lookup_symbol("p").unwrap();
        let q = lib.lookup_symbol("q").unwrap();
        let wff = lib.lookup_symbol("wff").unwrap();
        let turnstile = lib.lookup_symbol("|-").unwrap();
        let arrow = lib.lookup_symbol("->").unwrap();
        let ax_mp = lib.lookup_label("ax-mp").unwrap();

        let mut engine = ProofEngine::new(&lib);
        engine.process_floating(vp, vec![wff, p]).unwrap();
        engine.process_floating(vq, vec![wff, q]).unwrap();
        engine.process_label(min).unwrap();
        engine.process_label(maj).unwrap();
        engine.process_label(ax_mp).unwrap();
        assert_eq!(engine.stack().last().unwrap().sentence, vec![turnstile, q]);
        let _ = arrow;
    }

    #[test]
    fn rollback_restores_stack_depth() {
        let (lib, vp, vq, min, _maj) = ax_mp_style_db();
        let p = lib.lookup_symbol("p").unwrap();
        let wff = lib.lookup_symbol("wff").unwrap();
        let mut engine = ProofEngine::new(&lib);
        engine.process_floating(vp, vec![wff, p]).unwrap();
        let cp = engine.checkpoint();
        engine.process_label(min).unwrap();
        assert_eq!(engine.stack().len(), 2);
        engine.rollback(cp);
        assert_eq!(engine.stack().len(), 1);
        let _ = vq;
    }

    #[test]
    fn prove_floating_type_rejects_wrong_leading_symbol() {
        let (lib, vp, _vq, _min, _maj) = ax_mp_style_db();
        let turnstile = lib.lookup_symbol("|-").unwrap();
        let q = lib.lookup_symbol("q").unwrap();
        let engine = ProofEngine::new(&lib);
        assert!(engine.prove_floating_type(vp, &vec![turnstile, q]).is_none());
    }

    #[test]
    fn stack_underflow_is_reported() {
        let (lib, _vp, _vq, min, _maj) = ax_mp_style_db();
        let mut engine = ProofEngine::new(&lib);
        let err = engine.process_label(min).unwrap_err();
        assert_eq!(err.reason, ProofErrorReason::StackUnderflow);
    }

    fn dv_step_db() -> (Library, LabTok, LabTok, LabTok) {
        let mut lib = Library::new();
        let wff = lib.create_symbol("wff").unwrap();
        let turnstile = lib.create_symbol("|-").unwrap();
        lib.add_constant(wff);
        lib.add_constant(turnstile);
        let p = lib.create_symbol("p").unwrap();
        let q = lib.create_symbol("q").unwrap();

        let vp = lib.create_label("vp").unwrap();
        lib.add_sentence(vp, vec![wff, p]);
        lib.add_assertion(vp, bare(vp, vec![], vec![], BTreeSet::new()));
        lib.declare_variable(vp, p, wff);

        let vq = lib.create_label("vq").unwrap();
        lib.add_sentence(vq, vec![wff, q]);
        lib.add_assertion(vq, bare(vq, vec![], vec![], BTreeSet::new()));
        lib.declare_variable(vq, q, wff);

        let mut mand_dv = BTreeSet::new();
        mand_dv.insert(crate::library::DvPair::new(p, q).unwrap());
        let ax_dv = lib.create_label("ax-dv").unwrap();
        lib.add_sentence(ax_dv, vec![turnstile, p, q]);
        lib.add_assertion(ax_dv, bare(ax_dv, vec![vp, vq], vec![], mand_dv));

        (lib, vp, vq, ax_dv)
    }

    /// A step whose mandatory dv requires two genuinely distinct variables
    /// fails against a fresh engine (no dv pairs are known), and succeeds
    /// once the theorem-under-verification's own dv-set is threaded in via
    /// `with_context_dv`. Before `context_dv` existed, this success case was
    /// structurally unreachable since no `StackEntry` ever carried a
    /// non-empty `dv` set.
    #[test]
    fn mandatory_dv_step_fails_without_context_and_succeeds_with_it() {
        let (lib, vp, vq, ax_dv) = dv_step_db();
        let p = lib.lookup_symbol("p").unwrap();
        let q = lib.lookup_symbol("q").unwrap();
        let wff = lib.lookup_symbol("wff").unwrap();

        let mut engine = ProofEngine::new(&lib);
        engine.process_floating(vp, vec![wff, p]).unwrap();
        engine.process_floating(vq, vec![wff, q]).unwrap();
        let err = engine.process_label(ax_dv).unwrap_err();
        assert_eq!(err.reason, ProofErrorReason::DistinctViolation);

        let mut context_dv = BTreeSet::new();
        context_dv.insert(crate::library::DvPair::new(p, q).unwrap());
        let mut engine = ProofEngine::with_context_dv(&lib, context_dv);
        engine.process_floating(vp, vec![wff, p]).unwrap();
        engine.process_floating(vq, vec![wff, q]).unwrap();
        engine.process_label(ax_dv).unwrap();
        let turnstile = lib.lookup_symbol("|-").unwrap();
        assert_eq!(
            engine.stack().last().unwrap().sentence,
            vec![turnstile, p, q]
        );
    }
}
