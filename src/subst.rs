//! Substitution and alpha-refresh (C6).
//!
//! `SubstMap` binds variable labels to parse trees. `substitute` applies one
//! by rebuilding the tree bottom-up, replacing each variable leaf with its
//! bound tree (spec §4.5). Temporary-variable frames give callers a scoped
//! way to mint fresh variables for refreshing an assertion's bound
//! variables before unifying against it, mirroring `new_temp_var_frame` /
//! `release_temp_var_frame` / `create_temp_var` in the original toolbox.

use crate::intern::{LabTok, SymTok};
use crate::library::{Assertion, Library};
use crate::lrparser::Lr1Parser;
use crate::tree::ParsingTree;
use std::collections::HashMap;

/// A substitution: variable label -> bound tree.
pub type SubstMap = HashMap<LabTok, ParsingTree>;

/// Rebuilds `tree`, replacing every leaf whose label is a variable label
/// present in `subst` with its bound tree. Leaves not in `subst`, and all
/// internal nodes, are copied as-is (besides recursing into children).
pub fn substitute(tree: &ParsingTree, subst: &SubstMap) -> ParsingTree {
    if tree.is_leaf() {
        if let Some(bound) = subst.get(&tree.label) {
            return bound.clone();
        }
        return tree.clone();
    }
    let children = tree.children.iter().map(|c| substitute(c, subst)).collect();
    ParsingTree::node(tree.label, tree.typecode, children)
}

/// One nesting level of temporary-variable allocation: every variable
/// minted under this frame, so closing it can return them all to the
/// per-typecode free list (LIFO, mirroring `new_temp_var_frame` /
/// `release_temp_var_frame`).
#[derive(Debug, Default)]
struct Frame {
    allocated: Vec<(SymTok, LabTok, SymTok)>,
}

/// Mints library-backed temporary variables scoped to nested frames. Each
/// `push_frame` starts a new scope; `pop_frame` returns every variable
/// minted since to a per-typecode free list, so a later `new_temp_var`
/// pops a released slot instead of growing the interner. Never threaded
/// through more than one `Library` at a time, since the minted symbols and
/// labels are created directly in it.
#[derive(Debug, Default)]
pub struct TempVarAllocator {
    stack: Vec<Frame>,
    free_list: HashMap<SymTok, Vec<(LabTok, SymTok)>>,
    /// Per-typecode running counter, monotonic across the allocator's
    /// lifetime, used to name freshly minted symbols distinctly
    /// (`{typecode}.temp.{n}`); a released slot keeps its original name
    /// when reused, so this only grows when the free list is empty.
    counters: HashMap<SymTok, u32>,
}

impl TempVarAllocator {
    pub fn new() -> Self {
        TempVarAllocator::default()
    }

    pub fn push_frame(&mut self) {
        self.stack.push(Frame::default());
    }

    /// Closes the innermost frame, releasing every variable it allocated to
    /// the per-typecode free list.
    pub fn pop_frame(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        for (typecode, lab, sym) in frame.allocated {
            self.free_list.entry(typecode).or_default().push((lab, sym));
        }
    }

    /// Returns a variable of type `typecode`, reusing one from the free
    /// list if one is available, or minting a fresh `(label, symbol)` in
    /// `lib` otherwise. Requires at least one open frame.
    pub fn new_temp_var(
        &mut self,
        lib: &mut Library,
        typecode: SymTok,
    ) -> Option<(LabTok, SymTok)> {
        if self.stack.is_empty() {
            return None;
        }
        let reused = self.free_list.get_mut(&typecode).and_then(Vec::pop);
        let (lab, sym) = match reused {
            Some(pair) => pair,
            None => self.mint_fresh(lib, typecode)?,
        };
        self.stack.last_mut().unwrap().allocated.push((typecode, lab, sym));
        Some((lab, sym))
    }

    fn mint_fresh(&mut self, lib: &mut Library, typecode: SymTok) -> Option<(LabTok, SymTok)> {
        let n = self.counters.entry(typecode).or_insert(0);
        *n += 1;
        let count = *n;
        let type_name = lib.resolve_symbol(typecode).ok()?.to_string();
        let sym_name = format!("{type_name}.temp.{count}");
        let lab_name = format!("{type_name}.temp.{count}.lab");
        let sym = lib.get_or_create_symbol(&sym_name).ok()?;
        let lab = lib.get_or_create_label(&lab_name).ok()?;
        lib.add_sentence(lab, vec![typecode, sym]);
        lib.declare_variable(lab, sym, typecode);
        Some((lab, sym))
    }
}

/// Builds a substitution that maps every mandatory floating-hypothesis
/// variable of `assertion` to a freshly minted variable tree of the same
/// type, so the assertion's template can be unified against a goal without
/// its bound variables colliding with the goal's own (`refresh_assertion`).
pub fn build_refreshing_subst(
    lib: &mut Library,
    alloc: &mut TempVarAllocator,
    assertion: &Assertion,
) -> SubstMap {
    let mut subst = SubstMap::new();
    for &float_lab in &assertion.float_hyps {
        let Some(typecode) = lib.var_label_type(float_lab) else {
            continue;
        };
        let Some((new_lab, new_sym)) = alloc.new_temp_var(lib, typecode) else {
            continue;
        };
        subst.insert(float_lab, ParsingTree::leaf(new_lab, new_sym));
        let _ = new_sym;
    }
    subst
}

/// Parses `assertion`'s essential hypotheses and thesis, then applies one
/// shared refreshing substitution (built over its floating hypotheses) to
/// all of them, so the returned trees can be unified against a goal without
/// colliding with the goal's own variables (spec §4.5/§8).
pub fn refresh_assertion(
    lib: &mut Library,
    alloc: &mut TempVarAllocator,
    parser: &Lr1Parser,
    assertion: &Assertion,
) -> Option<(Vec<ParsingTree>, ParsingTree)> {
    let subst = build_refreshing_subst(lib, alloc, assertion);

    let mut hyp_trees = Vec::with_capacity(assertion.ess_hyps.len());
    for &hyp_label in &assertion.ess_hyps {
        let sentence = lib.get_sentence(hyp_label)?;
        if sentence.is_empty() {
            return None;
        }
        let tree = parser.parse(&sentence[1..]);
        if tree.is_failed() {
            return None;
        }
        hyp_trees.push(substitute(&tree, &subst));
    }

    let thesis_sentence = lib.get_sentence(assertion.thesis)?;
    if thesis_sentence.is_empty() {
        return None;
    }
    let thesis_tree = parser.parse(&thesis_sentence[1..]);
    if thesis_tree.is_failed() {
        return None;
    }
    let thesis_tree = substitute(&thesis_tree, &subst);

    Some((hyp_trees, thesis_tree))
}

/// Left composition: applying `compose_subst(a, b)` to a tree is the same
/// as applying `a` and then substituting again with `b` into whatever `a`
/// produced. Internal-only: the original toolbox's implementation of this
/// operation is flagged as unreliable, and neither the matcher nor the
/// proof engine uses it (see DESIGN.md). Kept for completeness and tested
/// in isolation; do not wire this into assertion matching.
#[doc(hidden)]
pub fn compose_subst(a: &SubstMap, b: &SubstMap) -> SubstMap {
    a.iter()
        .map(|(&var, tree)| (var, substitute(tree, b)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(l: u32, t: u16) -> ParsingTree {
        ParsingTree::leaf(LabTok(l), SymTok(t))
    }

    #[test]
    fn substitute_replaces_bound_leaves_only() {
        let tree = ParsingTree::node(LabTok(10), SymTok(1), vec![leaf(1, 1), leaf(2, 1)]);
        let mut subst = SubstMap::new();
        subst.insert(LabTok(1), leaf(99, 1));
        let result = substitute(&tree, &subst);
        assert_eq!(result.children[0], leaf(99, 1));
        assert_eq!(result.children[1], leaf(2, 1));
    }

    #[test]
    fn substitute_recurses_into_internal_nodes() {
        let inner = ParsingTree::node(LabTok(20), SymTok(1), vec![leaf(1, 1)]);
        let tree = ParsingTree::node(LabTok(10), SymTok(1), vec![inner]);
        let mut subst = SubstMap::new();
        subst.insert(LabTok(1), leaf(99, 1));
        let result = substitute(&tree, &subst);
        assert_eq!(result.children[0].children[0], leaf(99, 1));
    }

    #[test]
    fn temp_var_frames_reuse_released_vars() {
        let mut lib = Library::new();
        let wff = lib.create_symbol("wff").unwrap();
        lib.add_constant(wff);
        let mut alloc = TempVarAllocator::new();
        alloc.push_frame();
        let (lab1, sym1) = alloc.new_temp_var(&mut lib, wff).unwrap();
        alloc.pop_frame();
        alloc.push_frame();
        let (lab2, sym2) = alloc.new_temp_var(&mut lib, wff).unwrap();
        // Popping the first frame returns its variable to the free list, so
        // the second frame's allocation reuses the exact same slot.
        assert_eq!(lab1, lab2);
        assert_eq!(sym1, sym2);
    }

    #[test]
    fn temp_var_allocator_mints_fresh_when_free_list_empty() {
        let mut lib = Library::new();
        let wff = lib.create_symbol("wff").unwrap();
        lib.add_constant(wff);
        let mut alloc = TempVarAllocator::new();
        alloc.push_frame();
        let (lab1, _) = alloc.new_temp_var(&mut lib, wff).unwrap();
        // Still open: nothing has been released yet, so this must mint a
        // second, distinct variable rather than reuse `lab1`.
        let (lab2, _) = alloc.new_temp_var(&mut lib, wff).unwrap();
        assert_ne!(lab1, lab2);
    }

    #[test]
    fn refresh_assertion_shares_one_renaming_across_hyps_and_thesis() {
        let mut lib = Library::new();
        let wff = lib.create_symbol("wff").unwrap();
        let turnstile = lib.create_symbol("|-").unwrap();
        lib.add_constant(wff);
        lib.add_constant(turnstile);
        let ph = lib.create_symbol("ph").unwrap();
        let vph = lib.create_label("wph").unwrap();
        lib.add_sentence(vph, vec![wff, ph]);
        let var_bare = |thesis| Assertion {
            valid: true,
            is_theorem: false,
            float_hyps: vec![],
            ess_hyps: vec![],
            opt_hyps: std::collections::BTreeSet::new(),
            mand_dv: std::collections::BTreeSet::new(),
            opt_dv: std::collections::BTreeSet::new(),
            thesis,
            number: 0,
            proof: None,
            comment: String::new(),
            usage_disc: false,
            modif_disc: false,
        };
        lib.add_assertion(vph, var_bare(vph));
        lib.declare_variable(vph, ph, wff);

        let min = lib.create_label("min").unwrap();
        lib.add_sentence(min, vec![turnstile, ph]);
        let ax = lib.create_label("ax-id").unwrap();
        lib.add_sentence(ax, vec![turnstile, ph]);

        let assertion = Assertion {
            valid: true,
            is_theorem: false,
            float_hyps: vec![vph],
            ess_hyps: vec![min],
            opt_hyps: std::collections::BTreeSet::new(),
            mand_dv: std::collections::BTreeSet::new(),
            opt_dv: std::collections::BTreeSet::new(),
            thesis: ax,
            number: 0,
            proof: None,
            comment: String::new(),
            usage_disc: false,
            modif_disc: false,
        };

        let grammar = crate::grammar::extract_grammar(&lib, turnstile).unwrap();
        let parser = Lr1Parser::build(&grammar, wff).unwrap();
        let mut alloc = TempVarAllocator::new();
        alloc.push_frame();
        let (hyp_trees, thesis_tree) = refresh_assertion(&mut lib, &mut alloc, &parser, &assertion).unwrap();
        assert_eq!(hyp_trees.len(), 1);
        // Both the refreshed hyp and thesis reference the same fresh
        // variable label, since one renaming was applied to both.
        assert_eq!(hyp_trees[0].label, thesis_tree.label);
        assert_ne!(hyp_trees[0].label, vph);
    }

    #[test]
    fn compose_subst_is_left_composition() {
        let mut a = SubstMap::new();
        a.insert(LabTok(1), leaf(2, 1));
        let mut b = SubstMap::new();
        b.insert(LabTok(2), leaf(3, 1));
        let composed = compose_subst(&a, &b);
        assert_eq!(composed.get(&LabTok(1)), Some(&leaf(3, 1)));
    }
}
