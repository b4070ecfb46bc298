//! Library store (C2): symbols, labels, sentences and assertions.
//!
//! Unlike the upstream `metamath-knife`, this store is flat and append-only
//! — no segmentation, no incremental recomputation. That machinery belongs
//! to the out-of-scope Reader (spec §6) and is not part of this crate.

use crate::error::LibraryError;
use crate::intern::{Interner, LabTok, SymTok};
use std::collections::BTreeSet;
use std::collections::HashMap;

/// An ordered pair `(a, b)` with `a < b`, used for distinct-variable sets.
/// Constructing an equal pair is rejected, per invariant 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DvPair(pub SymTok, pub SymTok);

impl DvPair {
    pub fn new(a: SymTok, b: SymTok) -> Option<DvPair> {
        use std::cmp::Ordering::*;
        match a.cmp(&b) {
            Less => Some(DvPair(a, b)),
            Greater => Some(DvPair(b, a)),
            Equal => None,
        }
    }
}

/// A stack-frame declaration: "variable `v` has type `T`".
#[derive(Debug, Clone, Copy)]
pub struct FloatDecl {
    pub var: SymTok,
    pub typecode: SymTok,
    pub label: LabTok,
}

/// The floating-hypothesis table visible at a point in the library: an
/// ordered list of declarations plus the set of type-constant symbols.
#[derive(Debug, Clone, Default)]
pub struct StackFrame {
    pub decls: Vec<FloatDecl>,
    pub type_labels: BTreeSet<SymTok>,
}

impl StackFrame {
    pub fn type_of(&self, var: SymTok) -> Option<SymTok> {
        self.decls.iter().find(|d| d.var == var).map(|d| d.typecode)
    }

    pub fn label_of(&self, var: SymTok) -> Option<LabTok> {
        self.decls.iter().find(|d| d.var == var).map(|d| d.label)
    }
}

/// An ordered sequence of symbols; position 0 is a type constant.
pub type Sentence = Vec<SymTok>;

/// A library entry: either an axiom or a theorem.
#[derive(Debug, Clone)]
pub struct Assertion {
    pub valid: bool,
    pub is_theorem: bool,
    /// Mandatory type declarations, in appearance order.
    pub float_hyps: Vec<LabTok>,
    /// Essential hypotheses, in appearance order.
    pub ess_hyps: Vec<LabTok>,
    /// Hypotheses mentionable, but not mandatory, in a proof of this assertion.
    pub opt_hyps: BTreeSet<LabTok>,
    pub mand_dv: BTreeSet<DvPair>,
    pub opt_dv: BTreeSet<DvPair>,
    pub thesis: LabTok,
    /// Monotonically increasing insertion order, used to break ties and to
    /// implement "not yet usable" checks (`loc_after`-style orderings).
    pub number: u32,
    pub proof: Option<Vec<LabTok>>,
    pub comment: String,
    /// Set when the comment text carries a "(New usage is discouraged.)" tag.
    pub usage_disc: bool,
    /// Set when the comment text carries a "(Proof modification is discouraged.)" tag.
    pub modif_disc: bool,
}

impl Assertion {
    /// `mand_hyps` is the concatenation `float_hyps ++ ess_hyps`, preserving
    /// declaration order (invariant 6).
    pub fn mand_hyps(&self) -> Vec<LabTok> {
        let mut v = self.float_hyps.clone();
        v.extend(self.ess_hyps.iter().copied());
        v
    }

    pub fn arity(&self) -> usize {
        self.float_hyps.len() + self.ess_hyps.len()
    }
}

#[derive(Debug, Default)]
pub struct Library {
    syms: Interner<SymTok>,
    labels: Interner<LabTok>,
    is_const: Vec<bool>,
    sentences: HashMap<LabTok, Sentence>,
    assertions: HashMap<LabTok, Assertion>,
    next_number: u32,
    final_stack_frame: StackFrame,
    /// Reverse index: for every variable label, its symbol and type.
    var_lab_to_sym: HashMap<LabTok, SymTok>,
    var_sym_to_lab: HashMap<SymTok, LabTok>,
    var_lab_to_type: HashMap<LabTok, SymTok>,
}

impl Library {
    pub fn new() -> Self {
        Library {
            next_number: 0,
            ..Default::default()
        }
    }

    // --- C1-adjacent symbol/label management -----------------------------

    pub fn create_symbol(&mut self, name: &str) -> Result<SymTok, LibraryError> {
        let tok = self.syms.create(name)?;
        self.is_const.push(false);
        Ok(tok)
    }

    pub fn get_or_create_symbol(&mut self, name: &str) -> Result<SymTok, LibraryError> {
        if let Some(tok) = self.syms.get(name) {
            return Ok(tok);
        }
        self.create_symbol(name)
    }

    pub fn create_label(&mut self, name: &str) -> Result<LabTok, LibraryError> {
        self.labels.create(name)
    }

    pub fn get_or_create_label(&mut self, name: &str) -> Result<LabTok, LibraryError> {
        self.labels.get_or_create(name)
    }

    pub fn resolve_symbol(&self, tok: SymTok) -> Result<&str, LibraryError> {
        self.syms.resolve(tok)
    }

    pub fn resolve_label(&self, tok: LabTok) -> Result<&str, LibraryError> {
        self.labels.resolve(tok)
    }

    pub fn lookup_symbol(&self, name: &str) -> Option<SymTok> {
        self.syms.get(name)
    }

    pub fn lookup_label(&self, name: &str) -> Option<LabTok> {
        self.labels.get(name)
    }

    /// Marks `c` as a constant symbol. A symbol is either constant or
    /// variable; this partition never changes after library load
    /// (invariant 2), so this must be called at most once per symbol.
    pub fn add_constant(&mut self, c: SymTok) {
        let idx = c.0 as usize;
        if idx < self.is_const.len() {
            self.is_const[idx] = true;
        }
    }

    #[inline]
    pub fn is_constant(&self, c: SymTok) -> bool {
        self.is_const.get(c.0 as usize).copied().unwrap_or(false)
    }

    #[inline]
    pub fn is_variable(&self, c: SymTok) -> bool {
        !c.is_absent() && !self.is_constant(c)
    }

    // --- sentences & assertions -------------------------------------------

    pub fn add_sentence(&mut self, label: LabTok, tokens: Sentence) {
        self.sentences.insert(label, tokens);
    }

    pub fn get_sentence(&self, label: LabTok) -> Option<&Sentence> {
        self.sentences.get(&label)
    }

    pub fn add_assertion(&mut self, label: LabTok, mut assertion: Assertion) {
        assertion.number = self.next_number;
        self.next_number += 1;
        self.assertions.insert(label, assertion);
    }

    pub fn get_assertion(&self, label: LabTok) -> Option<&Assertion> {
        self.assertions.get(&label).filter(|a| a.valid)
    }

    /// A lazy sequence over valid assertions, in insertion order.
    pub fn list_assertions(&self) -> impl Iterator<Item = (LabTok, &Assertion)> {
        let mut v: Vec<_> = self
            .assertions
            .iter()
            .filter(|(_, a)| a.valid)
            .map(|(l, a)| (*l, a))
            .collect();
        v.sort_by_key(|(_, a)| a.number);
        v.into_iter()
    }

    // --- variable declarations (invariant 3) ------------------------------

    /// Declares `var_lab` as a floating-hypothesis label for variable
    /// `var_sym` of type `type_sym`. `get_sentence(var_lab)` must already
    /// equal `[type_sym, var_sym]`.
    pub fn declare_variable(&mut self, var_lab: LabTok, var_sym: SymTok, type_sym: SymTok) {
        self.var_lab_to_sym.insert(var_lab, var_sym);
        self.var_sym_to_lab.insert(var_sym, var_lab);
        self.var_lab_to_type.insert(var_lab, type_sym);
    }

    pub fn var_label_to_symbol(&self, lab: LabTok) -> Option<SymTok> {
        self.var_lab_to_sym.get(&lab).copied()
    }

    pub fn var_symbol_to_label(&self, sym: SymTok) -> Option<LabTok> {
        self.var_sym_to_lab.get(&sym).copied()
    }

    pub fn var_label_type(&self, lab: LabTok) -> Option<SymTok> {
        self.var_lab_to_type.get(&lab).copied()
    }

    pub fn var_symbol_type(&self, sym: SymTok) -> Option<SymTok> {
        self.var_symbol_to_label(sym)
            .and_then(|l| self.var_label_type(l))
    }

    pub fn is_variable_label(&self, lab: LabTok) -> bool {
        self.var_lab_to_sym.contains_key(&lab)
    }

    pub fn set_final_stack_frame(&mut self, frame: StackFrame) {
        self.final_stack_frame = frame;
    }

    pub fn final_stack_frame(&self) -> &StackFrame {
        &self.final_stack_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk() -> (Library, SymTok, SymTok) {
        let mut lib = Library::new();
        let wff = lib.create_symbol("wff").unwrap();
        let v = lib.create_symbol("v").unwrap();
        lib.add_constant(wff);
        (lib, wff, v)
    }

    #[test]
    fn constants_and_variables_are_partitioned() {
        let (lib, wff, v) = mk();
        assert!(lib.is_constant(wff));
        assert!(!lib.is_constant(v));
        assert!(lib.is_variable(v));
        assert!(!lib.is_variable(wff));
    }

    #[test]
    fn dv_pair_orders_and_rejects_equal() {
        let a = SymTok(1);
        let b = SymTok(2);
        assert_eq!(DvPair::new(a, b), Some(DvPair(a, b)));
        assert_eq!(DvPair::new(b, a), Some(DvPair(a, b)));
        assert_eq!(DvPair::new(a, a), None);
    }

    #[test]
    fn mand_hyps_concatenates_in_order() {
        let a = Assertion {
            valid: true,
            is_theorem: false,
            float_hyps: vec![LabTok(1), LabTok(2)],
            ess_hyps: vec![LabTok(3)],
            opt_hyps: BTreeSet::new(),
            mand_dv: BTreeSet::new(),
            opt_dv: BTreeSet::new(),
            thesis: LabTok(4),
            number: 0,
            proof: None,
            comment: String::new(),
            usage_disc: false,
            modif_disc: false,
        };
        assert_eq!(a.mand_hyps(), vec![LabTok(1), LabTok(2), LabTok(3)]);
        assert_eq!(a.arity(), 3);
    }

    #[test]
    fn invalid_assertions_are_skipped_by_list_and_get() {
        let mut lib = Library::new();
        let l = lib.create_label("a1").unwrap();
        let a = Assertion {
            valid: false,
            is_theorem: false,
            float_hyps: vec![],
            ess_hyps: vec![],
            opt_hyps: BTreeSet::new(),
            mand_dv: BTreeSet::new(),
            opt_dv: BTreeSet::new(),
            thesis: l,
            number: 0,
            proof: None,
            comment: String::new(),
            usage_disc: false,
            modif_disc: false,
        };
        lib.add_assertion(l, a);
        assert!(lib.get_assertion(l).is_none());
        assert_eq!(lib.list_assertions().count(), 0);
    }
}
