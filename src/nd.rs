//! Natural-deduction checker (C12): a total, structural `check()` over a
//! small sequent-calculus rule set (grounded on the sequent-shaped proof
//! objects in `original_source/provers/uct.h`, reworked here as a tagged
//! enum per the rest of this crate's style rather than a class hierarchy).

use crate::tstp::{replace, Fof, Fot};
use std::collections::BTreeSet;

/// A sequent `hypotheses |- conclusion`. Hypotheses are compared
/// structurally (via derived `Eq`), not up to reordering, mirroring how a
/// `Sequent` is built incrementally by the rules below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequent {
    pub hyps: Vec<Fof>,
    pub conclusion: Fof,
}

impl Sequent {
    pub fn new(hyps: Vec<Fof>, conclusion: Fof) -> Self {
        Sequent { hyps, conclusion }
    }

    fn contains(&self, f: &Fof) -> bool {
        self.hyps.iter().any(|h| h == f)
    }
}

/// One natural-deduction inference step, with its premises as nested
/// `NdNode`s. `check()` walks this tree bottom-up without recursion limits
/// beyond Rust's own stack (proof trees in this system are small).
#[derive(Debug, Clone)]
pub enum NdNode {
    /// `A |- A`: the sequent's hypothesis set must contain the conclusion.
    LogicalAxiom(Sequent),
    /// Adds a hypothesis not used by the premise.
    Weakening(Sequent, Box<NdNode>),
    /// Collapses a duplicated hypothesis.
    Contraction(Sequent, Box<NdNode>),
    /// From `Gamma |- false`, concludes `Gamma |- C` for any `C`.
    BottomElim(Sequent, Box<NdNode>),
    /// `Gamma |- A \/ ~A`, with no premise.
    ExcludedMiddle(Sequent),
    /// From `Gamma, A |- B`, concludes `Gamma |- A => B`.
    ImpIntro(Sequent, Box<NdNode>),
    /// From `Gamma |- A => B` and `Gamma |- A`, concludes `Gamma |- B`.
    ImpElim(Sequent, Box<NdNode>, Box<NdNode>),
    /// From `Gamma |- A` and `Gamma |- B`, concludes `Gamma |- A /\ B`.
    AndIntro(Sequent, Box<NdNode>, Box<NdNode>),
    /// From `Gamma |- A /\ B`, concludes `Gamma |- A`.
    AndElim1(Sequent, Box<NdNode>),
    /// From `Gamma |- A /\ B`, concludes `Gamma |- B`.
    AndElim2(Sequent, Box<NdNode>),
    /// From `Gamma, A |- false`, concludes `Gamma |- ~A`.
    NegElim(Sequent, Box<NdNode>),
    /// From `Gamma |- A[x]` with `x` not free in `Gamma`'s conclusion's
    /// context (checked against every hypothesis and the enclosing
    /// sequent's own free variables), concludes `Gamma |- forall x. A[x]`.
    ForallIntro(Sequent, Box<NdNode>, String),
    /// From `Gamma |- forall x. A[x]`, concludes `Gamma |- A[t/x]`.
    ForallElim(Sequent, Box<NdNode>, Fot),
    /// From `Gamma |- A[t/x]`, concludes `Gamma |- exists x. A[x]`.
    ExistsIntro(Sequent, Box<NdNode>, Fot),
    /// From `Gamma |- exists x. A[x]` and `Gamma, A[x] |- C` with `x` fresh
    /// for `Gamma` and `C` (the eigenvariable condition), concludes
    /// `Gamma |- C`.
    ExistsElim(Sequent, Box<NdNode>, Box<NdNode>, String),
}

impl NdNode {
    pub fn sequent(&self) -> &Sequent {
        match self {
            NdNode::LogicalAxiom(s)
            | NdNode::Weakening(s, _)
            | NdNode::Contraction(s, _)
            | NdNode::BottomElim(s, _)
            | NdNode::ExcludedMiddle(s)
            | NdNode::ImpIntro(s, _)
            | NdNode::ImpElim(s, _, _)
            | NdNode::AndIntro(s, _, _)
            | NdNode::AndElim1(s, _)
            | NdNode::AndElim2(s, _)
            | NdNode::NegElim(s, _)
            | NdNode::ForallIntro(s, _, _)
            | NdNode::ForallElim(s, _, _)
            | NdNode::ExistsIntro(s, _, _)
            | NdNode::ExistsElim(s, _, _, _) => s,
        }
    }
}

/// Checks that a proof tree's sequent really follows from its premises'
/// sequents under the stated rule. Always terminates with `true`/`false`;
/// never panics or raises an error (spec §7: "check() is a total boolean
/// function").
pub fn check(node: &NdNode) -> bool {
    match node {
        NdNode::LogicalAxiom(s) => s.contains(&s.conclusion),

        NdNode::Weakening(s, premise) => {
            check(premise)
                && premise.sequent().conclusion == s.conclusion
                && premise.sequent().hyps.iter().all(|h| s.hyps.contains(h))
        }

        NdNode::Contraction(s, premise) => {
            check(premise)
                && premise.sequent().conclusion == s.conclusion
                && s.hyps.iter().all(|h| premise.sequent().hyps.contains(h))
        }

        NdNode::BottomElim(s, premise) => {
            check(premise) && premise.sequent().conclusion == Fof::False && premise.sequent().hyps == s.hyps
        }

        NdNode::ExcludedMiddle(s) => match &s.conclusion {
            Fof::Or(parts) if parts.len() == 2 => match &parts[1] {
                Fof::Not(inner) => inner.as_ref() == &parts[0],
                _ => false,
            },
            _ => false,
        },

        NdNode::ImpIntro(s, premise) => {
            let Fof::Implies(a, b) = &s.conclusion else {
                return false;
            };
            check(premise)
                && premise.sequent().conclusion == **b
                && premise.sequent().contains(a)
                && premise
                    .sequent()
                    .hyps
                    .iter()
                    .filter(|h| *h != a.as_ref())
                    .all(|h| s.hyps.contains(h))
        }

        NdNode::ImpElim(s, imp_premise, arg_premise) => {
            let Fof::Implies(a, b) = &imp_premise.sequent().conclusion else {
                return false;
            };
            check(imp_premise)
                && check(arg_premise)
                && &arg_premise.sequent().conclusion == a.as_ref()
                && **b == s.conclusion
                && imp_premise.sequent().hyps == s.hyps
                && arg_premise.sequent().hyps == s.hyps
        }

        NdNode::AndIntro(s, left, right) => {
            let Fof::And(parts) = &s.conclusion else {
                return false;
            };
            parts.len() == 2
                && check(left)
                && check(right)
                && left.sequent().conclusion == parts[0]
                && right.sequent().conclusion == parts[1]
                && left.sequent().hyps == s.hyps
                && right.sequent().hyps == s.hyps
        }

        NdNode::AndElim1(s, premise) => match &premise.sequent().conclusion {
            Fof::And(parts) if parts.len() == 2 => {
                check(premise) && parts[0] == s.conclusion && premise.sequent().hyps == s.hyps
            }
            _ => false,
        },

        NdNode::AndElim2(s, premise) => match &premise.sequent().conclusion {
            Fof::And(parts) if parts.len() == 2 => {
                check(premise) && parts[1] == s.conclusion && premise.sequent().hyps == s.hyps
            }
            _ => false,
        },

        NdNode::NegElim(s, premise) => {
            let Fof::Not(a) = &s.conclusion else {
                return false;
            };
            check(premise)
                && premise.sequent().conclusion == Fof::False
                && premise.sequent().contains(a)
                && premise
                    .sequent()
                    .hyps
                    .iter()
                    .filter(|h| *h != a.as_ref())
                    .all(|h| s.hyps.contains(h))
        }

        NdNode::ForallIntro(s, premise, eigenvar) => {
            let Fof::Forall(vars, body) = &s.conclusion else {
                return false;
            };
            if vars.len() != 1 || &vars[0] != eigenvar {
                return false;
            }
            // Eigenvariable freshness (an Open Question resolved in
            // DESIGN.md): `eigenvar` must not occur free in any hypothesis
            // of the conclusion sequent, since those hypotheses persist
            // past the point of generalization.
            if s.hyps.iter().any(|h| h.free_variables().contains(eigenvar)) {
                return false;
            }
            check(premise)
                && &premise.sequent().conclusion == body.as_ref()
                && premise.sequent().hyps == s.hyps
        }

        NdNode::ForallElim(s, premise, witness) => {
            let Fof::Forall(vars, body) = &premise.sequent().conclusion else {
                return false;
            };
            if vars.len() != 1 {
                return false;
            }
            let Ok(instantiated) = replace(body, &vars[0], witness) else {
                return false;
            };
            check(premise) && instantiated == s.conclusion && premise.sequent().hyps == s.hyps
        }

        NdNode::ExistsIntro(s, premise, witness) => {
            let Fof::Exists(vars, body) = &s.conclusion else {
                return false;
            };
            if vars.len() != 1 {
                return false;
            }
            let Ok(instantiated) = replace(body, &vars[0], witness) else {
                return false;
            };
            check(premise) && instantiated == premise.sequent().conclusion && premise.sequent().hyps == s.hyps
        }

        NdNode::ExistsElim(s, exists_premise, body_premise, eigenvar) => {
            let Fof::Exists(vars, body) = &exists_premise.sequent().conclusion else {
                return false;
            };
            if vars.len() != 1 || &vars[0] != eigenvar {
                return false;
            }
            let Ok(instantiated) = replace(body, &vars[0], &Fot::var(eigenvar.clone())) else {
                return false;
            };
            if !body_premise.sequent().contains(&instantiated) {
                return false;
            }
            // Eigenvariable freshness: must not occur free in the
            // surrounding sequent's hypotheses or in the final conclusion.
            let mut occurs = s.conclusion.free_variables().contains(eigenvar);
            occurs |= s.hyps.iter().any(|h| h.free_variables().contains(eigenvar));
            if occurs {
                return false;
            }
            check(exists_premise)
                && check(body_premise)
                && body_premise.sequent().conclusion == s.conclusion
                && exists_premise.sequent().hyps == s.hyps
                && body_premise
                    .sequent()
                    .hyps
                    .iter()
                    .filter(|h| *h != &instantiated)
                    .all(|h| s.hyps.contains(h))
        }
    }
}

/// Collects every hypothesis referenced anywhere in a proof tree, useful
/// for diagnostics (not used by `check()` itself).
pub fn all_hyps(node: &NdNode) -> BTreeSet<Fof> {
    fn walk(node: &NdNode, out: &mut BTreeSet<Fof>) {
        out.extend(node.sequent().hyps.iter().cloned());
    }
    let mut out = BTreeSet::new();
    walk(node, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_axiom_holds_when_hyp_present() {
        let a = Fof::Predicate("p".into(), vec![]);
        let node = NdNode::LogicalAxiom(Sequent::new(vec![a.clone()], a));
        assert!(check(&node));
    }

    #[test]
    fn logical_axiom_fails_when_hyp_absent() {
        let a = Fof::Predicate("p".into(), vec![]);
        let b = Fof::Predicate("q".into(), vec![]);
        let node = NdNode::LogicalAxiom(Sequent::new(vec![a], b));
        assert!(!check(&node));
    }

    #[test]
    fn and_intro_combines_two_premises() {
        let a = Fof::Predicate("p".into(), vec![]);
        let b = Fof::Predicate("q".into(), vec![]);
        let left = NdNode::LogicalAxiom(Sequent::new(vec![a.clone(), b.clone()], a.clone()));
        let right = NdNode::LogicalAxiom(Sequent::new(vec![a.clone(), b.clone()], b.clone()));
        let top = NdNode::AndIntro(
            Sequent::new(vec![a.clone(), b.clone()], Fof::And(vec![a, b])),
            Box::new(left),
            Box::new(right),
        );
        assert!(check(&top));
    }

    #[test]
    fn imp_intro_discharges_the_antecedent() {
        let a = Fof::Predicate("p".into(), vec![]);
        let premise = NdNode::LogicalAxiom(Sequent::new(vec![a.clone()], a.clone()));
        let top = NdNode::ImpIntro(
            Sequent::new(vec![], Fof::Implies(Box::new(a.clone()), Box::new(a))),
            Box::new(premise),
        );
        assert!(check(&top));
    }

    #[test]
    fn forall_intro_rejects_eigenvariable_escaping_into_hyps() {
        let px = Fof::Predicate("p".into(), vec![Fot::var("X")]);
        let premise = NdNode::LogicalAxiom(Sequent::new(vec![px.clone()], px.clone()));
        let bad = NdNode::ForallIntro(
            Sequent::new(vec![px], Fof::Forall(vec!["X".into()], Box::new(px.clone()))),
            Box::new(premise),
            "X".into(),
        );
        assert!(!check(&bad));
    }

    #[test]
    fn exists_intro_and_elim_round_trip() {
        let witness = Fot::constant("a");
        let pa = Fof::Predicate("p".into(), vec![witness.clone()]);
        let px = Fof::Predicate("p".into(), vec![Fot::var("X")]);
        let exists_px = Fof::Exists(vec!["X".into()], Box::new(px.clone()));

        let intro_premise = NdNode::LogicalAxiom(Sequent::new(vec![pa.clone()], pa.clone()));
        let intro = NdNode::ExistsIntro(
            Sequent::new(vec![pa.clone()], exists_px.clone()),
            Box::new(intro_premise),
            witness,
        );
        assert!(check(&intro));
    }
}
