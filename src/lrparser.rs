//! LR parser (C4): builds, caches and runs an LR(1) table over a
//! `(symbol, label)` alphabet derived from the grammar (C3).
//!
//! On a failed parse the result is a tree with `label == LabTok(0)`
//! (`ParsingTree::failed`); this module never raises an error for an
//! ordinary failed parse of a goal sentence. A genuinely fatal condition
//! (the library's own grammar fails to build a table, e.g. a reduce/reduce
//! conflict) is reported through `LrBuildError`.

use crate::error::ParseFailure;
use crate::grammar::Grammar;
use crate::intern::{LabTok, SymTok};
use crate::tree::ParsingTree;
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Augmented-grammar synthetic symbol/label, guaranteed distinct from any
/// symbol or label created through `Library::create_symbol`/`create_label`
/// (those are handed out starting at 1 and counting up from a small base;
/// no practical database exhausts the top of the id space).
const AUG_SYM: SymTok = SymTok(u16::MAX);
const AUG_LAB: LabTok = LabTok(u32::MAX);
/// End-of-input marker used as an LR(1) lookahead symbol.
const EOF_SYM: SymTok = SymTok(u16::MAX - 1);

#[derive(Debug, Clone)]
struct Production {
    label: LabTok,
    lhs: SymTok,
    rhs: Vec<SymTok>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Item {
    prod: usize,
    dot: usize,
    lookahead: SymTok,
}

type ItemSet = BTreeSet<Item>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Shift(usize),
    Reduce(usize),
    Accept,
}

/// An ambiguous or otherwise unbuildable grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LrBuildError {
    Conflict { state: usize, symbol: SymTok },
}

/// The serializable action/goto table, also used as the persistent-cache
/// payload (spec §4.3, §6: "Parser cache store").
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct LrData {
    digest: [u8; 32],
    num_states: usize,
    action: HashMap<(usize, u16), ActionRepr>,
    goto: HashMap<(usize, u16), usize>,
    start_state: usize,
    productions: Vec<(u32, u16, Vec<u16>)>,
}

impl LrData {
    pub fn digest(&self) -> [u8; 32] {
        self.digest
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
enum ActionRepr {
    Shift(usize),
    Reduce(usize),
    Accept,
}

/// An LR(1) table over the symbol/label alphabet induced by a `Grammar`.
pub struct Lr1Parser {
    productions: Vec<Production>,
    action: HashMap<(usize, SymTok), Action>,
    goto: HashMap<(usize, SymTok), usize>,
    start_state: usize,
    digest: [u8; 32],
}

fn digest_of(grammar: &Grammar) -> [u8; 32] {
    let mut hasher = Sha256::new();
    let mut sorted: Vec<_> = grammar
        .derivations
        .iter()
        .map(|d| (d.label.0, d.lhs.0, d.rhs.iter().map(|s| s.0).collect::<Vec<_>>()))
        .collect();
    sorted.sort();
    for (label, lhs, rhs) in sorted {
        hasher.update(label.to_le_bytes());
        hasher.update(lhs.to_le_bytes());
        for s in rhs {
            hasher.update(s.to_le_bytes());
        }
        hasher.update([0xff]);
    }
    hasher.finalize().into()
}

impl Lr1Parser {
    pub fn digest(&self) -> [u8; 32] {
        self.digest
    }

    /// Builds LR(1) item sets and action/goto tables from the derivation
    /// set, with `start_type` as the grammar's augmented start symbol.
    pub fn build(grammar: &Grammar, start_type: SymTok) -> Result<Self, LrBuildError> {
        let digest = digest_of(grammar);
        let mut productions: Vec<Production> = grammar
            .derivations
            .iter()
            .map(|d| Production {
                label: d.label,
                lhs: d.lhs,
                rhs: d.rhs.clone(),
            })
            .collect();
        let start_prod = productions.len();
        productions.push(Production {
            label: AUG_LAB,
            lhs: AUG_SYM,
            rhs: vec![start_type],
        });

        let nonterminals: HashSet<SymTok> =
            productions.iter().map(|p| p.lhs).collect();

        let first_sets = compute_first_sets(&productions, &nonterminals);

        let start_item = Item {
            prod: start_prod,
            dot: 0,
            lookahead: EOF_SYM,
        };
        let start_state = closure(
            std::iter::once(start_item).collect(),
            &productions,
            &nonterminals,
            &first_sets,
        );

        let mut states: Vec<ItemSet> = vec![start_state];
        let mut state_index: HashMap<ItemSet, usize> = HashMap::new();
        state_index.insert(states[0].clone(), 0);
        let mut action: HashMap<(usize, SymTok), Action> = HashMap::new();
        let mut goto: HashMap<(usize, SymTok), usize> = HashMap::new();

        let mut frontier = vec![0usize];
        while let Some(s) = frontier.pop() {
            let symbols = symbols_after_dot(&states[s], &productions);
            for sym in symbols {
                let moved = go_to(&states[s], sym, &productions, &nonterminals, &first_sets);
                if moved.is_empty() {
                    continue;
                }
                let target = if let Some(&idx) = state_index.get(&moved) {
                    idx
                } else {
                    let idx = states.len();
                    state_index.insert(moved.clone(), idx);
                    states.push(moved);
                    frontier.push(idx);
                    idx
                };
                if nonterminals.contains(&sym) {
                    goto.insert((s, sym), target);
                } else {
                    set_action(&mut action, s, sym, Action::Shift(target))?;
                }
            }
            // Reductions & accept.
            for item in states[s].clone() {
                let prod = &productions[item.prod];
                if item.dot == prod.rhs.len() {
                    if item.prod == start_prod && item.lookahead == EOF_SYM {
                        set_action(&mut action, s, EOF_SYM, Action::Accept)?;
                    } else {
                        set_action(&mut action, s, item.lookahead, Action::Reduce(item.prod))?;
                    }
                }
            }
        }

        Ok(Lr1Parser {
            productions,
            action,
            goto,
            start_state: 0,
            digest,
        })
    }

    /// Reconstructs a parser from cached table data, iff `cache.digest`
    /// matches the current grammar's digest (spec §4.3: "cached tables are
    /// adopted iff the digest matches").
    pub fn from_cache(grammar: &Grammar, start_type: SymTok, cache: &LrData) -> Option<Self> {
        if cache.digest != digest_of(grammar) {
            return None;
        }
        let mut productions: Vec<Production> = cache
            .productions
            .iter()
            .map(|(label, lhs, rhs)| Production {
                label: LabTok(*label),
                lhs: SymTok(*lhs),
                rhs: rhs.iter().map(|s| SymTok(*s)).collect(),
            })
            .collect();
        if productions.is_empty() {
            productions.push(Production {
                label: AUG_LAB,
                lhs: AUG_SYM,
                rhs: vec![start_type],
            });
        }
        let action = cache
            .action
            .iter()
            .map(|(&(s, sym), a)| {
                let action = match *a {
                    ActionRepr::Shift(t) => Action::Shift(t),
                    ActionRepr::Reduce(p) => Action::Reduce(p),
                    ActionRepr::Accept => Action::Accept,
                };
                ((s, SymTok(sym)), action)
            })
            .collect();
        let goto = cache
            .goto
            .iter()
            .map(|(&(s, sym), &t)| ((s, SymTok(sym)), t))
            .collect();
        Some(Lr1Parser {
            productions,
            action,
            goto,
            start_state: cache.start_state,
            digest: cache.digest,
        })
    }

    /// Serializes this parser's table for persistent caching.
    pub fn to_cache(&self) -> LrData {
        LrData {
            digest: self.digest,
            num_states: self
                .action
                .keys()
                .chain(self.goto.keys())
                .map(|(s, _)| *s)
                .max()
                .map(|m| m + 1)
                .unwrap_or(1),
            action: self
                .action
                .iter()
                .map(|(&(s, sym), a)| {
                    let repr = match *a {
                        Action::Shift(t) => ActionRepr::Shift(t),
                        Action::Reduce(p) => ActionRepr::Reduce(p),
                        Action::Accept => ActionRepr::Accept,
                    };
                    ((s, sym.0), repr)
                })
                .collect(),
            goto: self.goto.iter().map(|(&(s, sym), &t)| ((s, sym.0), t)).collect(),
            start_state: self.start_state,
            productions: self
                .productions
                .iter()
                .map(|p| (p.label.0, p.lhs.0, p.rhs.iter().map(|s| s.0).collect()))
                .collect(),
        }
    }

    /// Parses `tokens` as a sentence of type `start_type`. Returns a tree
    /// with `label == LabTok(0)` on any failure to parse (unknown token,
    /// stuck state, or leftover input); never raises an error for that case.
    pub fn parse(&self, tokens: &[SymTok]) -> ParsingTree {
        let mut state_stack = vec![self.start_state];
        let mut tree_stack: Vec<ParsingTree> = Vec::new();
        let mut pos = 0usize;
        loop {
            let lookahead = tokens.get(pos).copied().unwrap_or(EOF_SYM);
            let state = *state_stack.last().unwrap();
            match self.action.get(&(state, lookahead)) {
                Some(Action::Shift(next)) => {
                    tree_stack.push(ParsingTree::leaf(LabTok::ABSENT, lookahead));
                    state_stack.push(*next);
                    pos += 1;
                }
                Some(Action::Reduce(prod_idx)) => {
                    let prod = &self.productions[*prod_idx];
                    let n = prod.rhs.len();
                    let popped = tree_stack.split_off(tree_stack.len() - n);
                    state_stack.truncate(state_stack.len() - n);
                    // Only nonterminal positions of `rhs` correspond to a
                    // recursively-reconstructible child; a literal symbol
                    // (one that is never any production's lhs) is reproduced
                    // directly from `rhs` by `reconstruct_sentence` and must
                    // not consume a slot in `children`, so it's dropped here.
                    let children: Vec<ParsingTree> = if n == 1 && self.is_terminal_leaf(prod) {
                        Vec::new()
                    } else {
                        popped
                            .into_iter()
                            .zip(prod.rhs.iter().copied())
                            .filter(|(_, sym)| self.is_nonterminal(*sym))
                            .map(|(tree, _)| tree)
                            .collect()
                    };
                    let node = ParsingTree::node(prod.label, prod.lhs, children);
                    let top = *state_stack.last().unwrap();
                    match self.goto.get(&(top, prod.lhs)) {
                        Some(&next) => {
                            tree_stack.push(node);
                            state_stack.push(next);
                        }
                        None => return ParsingTree::failed(),
                    }
                }
                Some(Action::Accept) => {
                    return tree_stack.pop().unwrap_or_else(ParsingTree::failed);
                }
                None => return ParsingTree::failed(),
            }
        }
    }

    /// True if `sym` is ever the left-hand side of one of this parser's own
    /// productions, i.e. it is a grammar nonterminal rather than a literal
    /// constant symbol. Mirrors `lrparser::der_is_literal`'s complement,
    /// kept in sync since both must agree on which `rhs` positions
    /// correspond to a child in the built tree.
    fn is_nonterminal(&self, sym: SymTok) -> bool {
        self.productions.iter().any(|p| p.lhs == sym)
    }

    fn is_terminal_leaf(&self, prod: &Production) -> bool {
        prod.rhs.len() == 1 && prod.lhs != AUG_SYM && !self.is_nonterminal(prod.rhs[0])
    }
}

fn set_action(
    action: &mut HashMap<(usize, SymTok), Action>,
    state: usize,
    sym: SymTok,
    new: Action,
) -> Result<(), LrBuildError> {
    match action.get(&(state, sym)) {
        Some(existing) if *existing != new => Err(LrBuildError::Conflict { state, symbol: sym }),
        _ => {
            action.insert((state, sym), new);
            Ok(())
        }
    }
}

fn symbols_after_dot(items: &ItemSet, productions: &[Production]) -> Vec<SymTok> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        let prod = &productions[item.prod];
        if let Some(&sym) = prod.rhs.get(item.dot) {
            if seen.insert(sym) {
                out.push(sym);
            }
        }
    }
    out
}

fn closure(
    mut items: ItemSet,
    productions: &[Production],
    nonterminals: &HashSet<SymTok>,
    first_sets: &HashMap<SymTok, HashSet<SymTok>>,
) -> ItemSet {
    loop {
        let mut added = Vec::new();
        for item in &items {
            let prod = &productions[item.prod];
            let Some(&next) = prod.rhs.get(item.dot) else {
                continue;
            };
            if !nonterminals.contains(&next) {
                continue;
            }
            let rest = &prod.rhs[item.dot + 1..];
            let lookaheads = first_of_sequence(rest, item.lookahead, first_sets, nonterminals);
            for (idx, p) in productions.iter().enumerate() {
                if p.lhs != next {
                    continue;
                }
                for &la in &lookaheads {
                    let new_item = Item {
                        prod: idx,
                        dot: 0,
                        lookahead: la,
                    };
                    if !items.contains(&new_item) {
                        added.push(new_item);
                    }
                }
            }
        }
        if added.is_empty() {
            return items;
        }
        items.extend(added);
    }
}

fn go_to(
    items: &ItemSet,
    sym: SymTok,
    productions: &[Production],
    nonterminals: &HashSet<SymTok>,
    first_sets: &HashMap<SymTok, HashSet<SymTok>>,
) -> ItemSet {
    let moved: ItemSet = items
        .iter()
        .filter_map(|item| {
            let prod = &productions[item.prod];
            if prod.rhs.get(item.dot) == Some(&sym) {
                Some(Item {
                    prod: item.prod,
                    dot: item.dot + 1,
                    lookahead: item.lookahead,
                })
            } else {
                None
            }
        })
        .collect();
    closure(moved, productions, nonterminals, first_sets)
}

fn compute_first_sets(
    productions: &[Production],
    nonterminals: &HashSet<SymTok>,
) -> HashMap<SymTok, HashSet<SymTok>> {
    let mut first: HashMap<SymTok, HashSet<SymTok>> = HashMap::new();
    for nt in nonterminals {
        first.entry(*nt).or_default();
    }
    let mut changed = true;
    while changed {
        changed = false;
        for prod in productions {
            let mut set = match prod.rhs.first() {
                None => HashSet::new(),
                Some(&sym) if !nonterminals.contains(&sym) => {
                    let mut s = HashSet::new();
                    s.insert(sym);
                    s
                }
                Some(&sym) => first.get(&sym).cloned().unwrap_or_default(),
            };
            let existing = first.entry(prod.lhs).or_default();
            set.retain(|s| !existing.contains(s));
            if !set.is_empty() {
                existing.extend(set);
                changed = true;
            }
        }
    }
    first
}

/// FIRST of `rest` followed by `fallback` (there are no epsilon
/// productions in this grammar, so this only ever needs the first symbol
/// of `rest`, falling back to `fallback` when `rest` is empty).
fn first_of_sequence(
    rest: &[SymTok],
    fallback: SymTok,
    first_sets: &HashMap<SymTok, HashSet<SymTok>>,
    nonterminals: &HashSet<SymTok>,
) -> Vec<SymTok> {
    match rest.first() {
        None => vec![fallback],
        Some(&sym) if !nonterminals.contains(&sym) => vec![sym],
        Some(&sym) => first_sets.get(&sym).into_iter().flatten().copied().collect(),
    }
}

/// Re-emits the sentence (prefixed by `first_sym`) that a parse tree was
/// built from, by walking `ders_by_label` (spec §4.4).
pub fn reconstruct_sentence(
    grammar: &Grammar,
    tree: &ParsingTree,
    first_sym: SymTok,
) -> Result<Vec<SymTok>, ParseFailure> {
    let mut out = vec![first_sym];
    reconstruct_into(grammar, tree, &mut out)?;
    Ok(out)
}

fn reconstruct_into(
    grammar: &Grammar,
    tree: &ParsingTree,
    out: &mut Vec<SymTok>,
) -> Result<(), ParseFailure> {
    if tree.is_failed() {
        return Err(ParseFailure {
            token_stream_position: out.len(),
        });
    }
    let der = grammar
        .derivation_for(tree.label)
        .ok_or(ParseFailure { token_stream_position: out.len() })?;
    if tree.is_leaf() {
        out.extend(der.rhs.iter().copied());
        return Ok(());
    }
    let mut child_iter = tree.children.iter();
    for &sym in &der.rhs {
        if grammar.ders_by_label.values().any(|&i| grammar.derivations[i].lhs == sym) && !der_is_literal(grammar, sym) {
            let child = child_iter.next().ok_or(ParseFailure { token_stream_position: out.len() })?;
            reconstruct_into(grammar, child, out)?;
        } else {
            out.push(sym);
        }
    }
    Ok(())
}

/// A symbol counts as "literal" (and thus never consumes a child) if it is
/// never the left-hand side of any derivation.
fn der_is_literal(grammar: &Grammar, sym: SymTok) -> bool {
    !grammar
        .derivations
        .iter()
        .any(|d| d.lhs == sym)
}
