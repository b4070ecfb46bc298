//! Tagged-enum first-order AST (C11), replacing the original toolbox's
//! `FOT`/`FOF` class hierarchy (`Functor`/`Variable`, `Predicate`/`True`/
//! `False`/`Equal`/`Distinct`/`And`/`Or`/`Iff`/`Not`/`Xor`/`Implies`/`Oeq`/
//! `Forall`/`Exists`) with a sum type per spec §9's REDESIGN FLAGS.

use std::cmp::Ordering;
use std::fmt;

/// A first-order term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fot {
    Variable(String),
    /// A function application; a 0-ary functor is a constant.
    Functor(String, Vec<Fot>),
}

impl Fot {
    pub fn var(name: impl Into<String>) -> Self {
        Fot::Variable(name.into())
    }

    pub fn constant(name: impl Into<String>) -> Self {
        Fot::Functor(name.into(), Vec::new())
    }

    pub fn free_variables(&self, out: &mut std::collections::BTreeSet<String>) {
        match self {
            Fot::Variable(v) => {
                out.insert(v.clone());
            }
            Fot::Functor(_, args) => {
                for a in args {
                    a.free_variables(out);
                }
            }
        }
    }
}

impl fmt::Display for Fot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fot::Variable(v) => write!(f, "{v}"),
            Fot::Functor(name, args) if args.is_empty() => write!(f, "{name}"),
            Fot::Functor(name, args) => {
                write!(f, "{name}(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A first-order formula.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fof {
    Predicate(String, Vec<Fot>),
    True,
    False,
    Equal(Box<Fot>, Box<Fot>),
    Distinct(Vec<Fot>),
    And(Vec<Fof>),
    Or(Vec<Fof>),
    Iff(Box<Fof>, Box<Fof>),
    Not(Box<Fof>),
    Xor(Box<Fof>, Box<Fof>),
    Implies(Box<Fof>, Box<Fof>),
    /// Equivalence-of-terms-used-as-propositions ("Oeq"): a boolean-sorted
    /// equality between two formulas treated as terms.
    Oeq(Box<Fof>, Box<Fof>),
    Forall(Vec<String>, Box<Fof>),
    Exists(Vec<String>, Box<Fof>),
}

impl Fof {
    pub fn free_variables(&self) -> std::collections::BTreeSet<String> {
        let mut out = std::collections::BTreeSet::new();
        self.collect_free(&mut out);
        out
    }

    fn collect_free(&self, out: &mut std::collections::BTreeSet<String>) {
        match self {
            Fof::Predicate(_, args) => {
                for a in args {
                    a.free_variables(out);
                }
            }
            Fof::True | Fof::False => {}
            Fof::Equal(a, b) => {
                a.free_variables(out);
                b.free_variables(out);
            }
            Fof::Distinct(terms) => {
                for t in terms {
                    t.free_variables(out);
                }
            }
            Fof::And(xs) | Fof::Or(xs) => {
                for x in xs {
                    x.collect_free(out);
                }
            }
            Fof::Iff(a, b) | Fof::Xor(a, b) | Fof::Implies(a, b) | Fof::Oeq(a, b) => {
                a.collect_free(out);
                b.collect_free(out);
            }
            Fof::Not(a) => a.collect_free(out),
            Fof::Forall(bound, body) | Fof::Exists(bound, body) => {
                let mut inner = std::collections::BTreeSet::new();
                body.collect_free(&mut inner);
                for b in bound {
                    inner.remove(b);
                }
                out.extend(inner);
            }
        }
    }
}

impl Ord for Fof {
    fn cmp(&self, other: &Self) -> Ordering {
        fof_cmp(self, other)
    }
}

impl PartialOrd for Fof {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A total structural ordering over formulas, used to give sets/maps of
/// formulas a canonical iteration order (`fof_cmp`). Ranks by syntactic
/// shape first, then recurses lexicographically; two formulas that are
/// alpha-equivalent but spelled with different bound-variable names are
/// NOT considered equal by this ordering (bound-name-insensitive
/// comparison is a stronger notion this module doesn't need).
pub fn fof_cmp(a: &Fof, b: &Fof) -> Ordering {
    fn rank(f: &Fof) -> u8 {
        match f {
            Fof::True => 0,
            Fof::False => 1,
            Fof::Predicate(..) => 2,
            Fof::Equal(..) => 3,
            Fof::Distinct(..) => 4,
            Fof::Not(..) => 5,
            Fof::And(..) => 6,
            Fof::Or(..) => 7,
            Fof::Implies(..) => 8,
            Fof::Iff(..) => 9,
            Fof::Xor(..) => 10,
            Fof::Oeq(..) => 11,
            Fof::Forall(..) => 12,
            Fof::Exists(..) => 13,
        }
    }
    match rank(a).cmp(&rank(b)) {
        Ordering::Equal => {}
        other => return other,
    }
    match (a, b) {
        (Fof::True, Fof::True) | (Fof::False, Fof::False) => Ordering::Equal,
        (Fof::Predicate(na, aa), Fof::Predicate(nb, ab)) => {
            na.cmp(nb).then_with(|| fot_list_cmp(aa, ab))
        }
        (Fof::Equal(a1, a2), Fof::Equal(b1, b2)) => fot_cmp(a1, b1).then_with(|| fot_cmp(a2, b2)),
        (Fof::Distinct(xa), Fof::Distinct(xb)) => fot_list_cmp(xa, xb),
        (Fof::Not(a), Fof::Not(b)) => fof_cmp(a, b),
        (Fof::And(xa), Fof::Or(xb)) | (Fof::Or(xa), Fof::And(xb)) => fof_list_cmp(xa, xb),
        (Fof::And(xa), Fof::And(xb)) | (Fof::Or(xa), Fof::Or(xb)) => fof_list_cmp(xa, xb),
        (Fof::Implies(a1, a2), Fof::Implies(b1, b2))
        | (Fof::Iff(a1, a2), Fof::Iff(b1, b2))
        | (Fof::Xor(a1, a2), Fof::Xor(b1, b2))
        | (Fof::Oeq(a1, a2), Fof::Oeq(b1, b2)) => fof_cmp(a1, b1).then_with(|| fof_cmp(a2, b2)),
        (Fof::Forall(va, ba), Fof::Forall(vb, bb)) | (Fof::Exists(va, ba), Fof::Exists(vb, bb)) => {
            va.cmp(vb).then_with(|| fof_cmp(ba, bb))
        }
        _ => Ordering::Equal,
    }
}

fn fot_cmp(a: &Fot, b: &Fot) -> Ordering {
    match (a, b) {
        (Fot::Variable(va), Fot::Variable(vb)) => va.cmp(vb),
        (Fot::Variable(_), Fot::Functor(..)) => Ordering::Less,
        (Fot::Functor(..), Fot::Variable(_)) => Ordering::Greater,
        (Fot::Functor(na, aa), Fot::Functor(nb, ab)) => na.cmp(nb).then_with(|| fot_list_cmp(aa, ab)),
    }
}

fn fot_list_cmp(a: &[Fot], b: &[Fot]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| {
        for (x, y) in a.iter().zip(b.iter()) {
            let c = fot_cmp(x, y);
            if c != Ordering::Equal {
                return c;
            }
        }
        Ordering::Equal
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_variables_exclude_bound_names() {
        let f = Fof::Forall(
            vec!["X".into()],
            Box::new(Fof::Predicate("p".into(), vec![Fot::var("X"), Fot::var("Y")])),
        );
        let free = f.free_variables();
        assert!(free.contains("Y"));
        assert!(!free.contains("X"));
    }

    #[test]
    fn fof_cmp_is_total_and_reflexive() {
        let a = Fof::Predicate("p".into(), vec![Fot::var("X")]);
        let b = Fof::Predicate("p".into(), vec![Fot::var("Y")]);
        assert_eq!(fof_cmp(&a, &a), Ordering::Equal);
        assert_eq!(fof_cmp(&a, &b), Ordering::Less);
        assert_eq!(fof_cmp(&b, &a), Ordering::Greater);
    }

    #[test]
    fn fof_cmp_ranks_by_shape_before_contents() {
        let and = Fof::And(vec![Fof::True]);
        let or = Fof::Or(vec![Fof::True]);
        assert_eq!(fof_cmp(&and, &or), Ordering::Less);
    }
}
