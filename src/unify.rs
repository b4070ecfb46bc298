//! Unifier (C7): bilateral and unilateral tree unification.
//!
//! Grounded on `formula.rs`'s `unify`/`sub_unify` symbol-level unification,
//! generalized here to operate over `ParsingTree`s directly rather than
//! over flattened symbol sequences, since the matcher (C8) needs the bound
//! subtree for each variable, not just its flattened token run.

use crate::error::UnificationFailure;
use crate::library::Library;
use crate::subst::SubstMap;
use crate::tree::ParsingTree;

/// Tries to unify `pattern` against `concrete`, where only `pattern` may
/// contain variable leaves (a one-directional match: concrete is ground).
/// Each variable in `pattern` must bind consistently every time it recurs.
pub fn unify_unilateral(
    lib: &Library,
    pattern: &ParsingTree,
    concrete: &ParsingTree,
    subst: &mut SubstMap,
) -> Result<(), UnificationFailure> {
    if pattern.is_failed() || concrete.is_failed() {
        return Err(UnificationFailure);
    }
    if pattern.is_leaf() && lib.is_variable_label(pattern.label) {
        if pattern.typecode != concrete.typecode {
            return Err(UnificationFailure);
        }
        match subst.get(&pattern.label) {
            Some(bound) if bound == concrete => Ok(()),
            Some(_) => Err(UnificationFailure),
            None => {
                subst.insert(pattern.label, concrete.clone());
                Ok(())
            }
        }
    } else {
        if pattern.label != concrete.label || pattern.children.len() != concrete.children.len() {
            return Err(UnificationFailure);
        }
        for (p, c) in pattern.children.iter().zip(concrete.children.iter()) {
            unify_unilateral(lib, p, c, subst)?;
        }
        Ok(())
    }
}

/// Checks `unify_unilateral` without mutating a real substitution.
pub fn is_unifiable_unilateral(lib: &Library, pattern: &ParsingTree, concrete: &ParsingTree) -> bool {
    let mut scratch = SubstMap::new();
    unify_unilateral(lib, pattern, concrete, &mut scratch).is_ok()
}

/// A unilateral unificator accumulating equations one at a time
/// (`add_parsing_trees`, then `is_unifiable`/`unify`), mirroring the
/// original toolbox's incremental interface, in which the matcher adds one
/// hypothesis equation per permuted hypothesis before asking for the
/// combined substitution.
#[derive(Debug, Default)]
pub struct UnilateralUnificator {
    equations: Vec<(ParsingTree, ParsingTree)>,
}

impl UnilateralUnificator {
    pub fn new() -> Self {
        UnilateralUnificator::default()
    }

    pub fn add_parsing_trees(&mut self, pattern: ParsingTree, concrete: ParsingTree) {
        self.equations.push((pattern, concrete));
    }

    pub fn is_unifiable(&self, lib: &Library) -> bool {
        self.unify(lib).is_ok()
    }

    /// Unifies every accumulated equation into one substitution, left to
    /// right, failing on the first inconsistency.
    pub fn unify(&self, lib: &Library) -> Result<SubstMap, UnificationFailure> {
        let mut subst = SubstMap::new();
        for (pattern, concrete) in &self.equations {
            unify_unilateral(lib, pattern, concrete, &mut subst)?;
        }
        Ok(subst)
    }
}

/// Bilateral unification: both `a` and `b` may contain variable leaves, and
/// a variable on one side may bind to a variable leaf on the other side (as
/// opposed to only ground subtrees). Used where neither tree is a template,
/// e.g. checking two hypothesis instances for structural compatibility.
/// Bindings are recorded as an equivalence: binding `x` to `y` and then `y`
/// to a ground tree later must be consistent with the first binding.
pub fn unify_bilateral(
    lib: &Library,
    a: &ParsingTree,
    b: &ParsingTree,
    subst: &mut SubstMap,
) -> Result<(), UnificationFailure> {
    if a.is_failed() || b.is_failed() {
        return Err(UnificationFailure);
    }
    let a_is_var = a.is_leaf() && lib.is_variable_label(a.label);
    let b_is_var = b.is_leaf() && lib.is_variable_label(b.label);
    match (a_is_var, b_is_var) {
        (true, true) if a.label == b.label => Ok(()),
        (true, _) => bind_or_check(lib, a, b, subst),
        (_, true) => bind_or_check(lib, b, a, subst),
        (false, false) => {
            if a.label != b.label || a.children.len() != b.children.len() {
                return Err(UnificationFailure);
            }
            for (ca, cb) in a.children.iter().zip(b.children.iter()) {
                unify_bilateral(lib, ca, cb, subst)?;
            }
            Ok(())
        }
    }
}

fn bind_or_check(
    lib: &Library,
    var_side: &ParsingTree,
    other: &ParsingTree,
    subst: &mut SubstMap,
) -> Result<(), UnificationFailure> {
    if var_side.typecode != other.typecode {
        return Err(UnificationFailure);
    }
    match subst.get(&var_side.label).cloned() {
        Some(bound) => unify_bilateral(lib, &bound, other, subst),
        None => {
            subst.insert(var_side.label, other.clone());
            Ok(())
        }
    }
}
