//! Parse-tree machinery (C5): two interchangeable representations of a
//! parsing tree, plus a multi-iterator over the flat form.
//!
//! `label == LabTok(0)` marks a failed parse, per spec invariant on
//! `ParsingTree`.

use crate::intern::{LabTok, SymTok};

/// The nested (recursive) parse tree. Leaves are variable labels, internal
/// nodes are production (assertion) labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsingTree {
    pub label: LabTok,
    pub typecode: SymTok,
    pub children: Vec<ParsingTree>,
}

impl ParsingTree {
    pub fn failed() -> Self {
        ParsingTree {
            label: LabTok::ABSENT,
            typecode: SymTok::ABSENT,
            children: Vec::new(),
        }
    }

    pub fn leaf(label: LabTok, typecode: SymTok) -> Self {
        ParsingTree {
            label,
            typecode,
            children: Vec::new(),
        }
    }

    pub fn node(label: LabTok, typecode: SymTok, children: Vec<ParsingTree>) -> Self {
        ParsingTree {
            label,
            typecode,
            children,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.label.is_absent()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Node index into the arena of a `ParsingTree2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
struct FlatNode {
    label: LabTok,
    typecode: SymTok,
    parent: Option<NodeId>,
    /// Index of the next sibling in depth-first pre-order, if any.
    next_sibling: Option<NodeId>,
    children: Vec<NodeId>,
}

/// The arena-indexed flat form of a `ParsingTree`. Laid out so that a
/// depth-first walk can be driven by a `MultiIter` without recursion.
#[derive(Debug, Clone, Default)]
pub struct ParsingTree2 {
    nodes: Vec<FlatNode>,
    root: Option<NodeId>,
}

impl ParsingTree2 {
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn label(&self, id: NodeId) -> LabTok {
        self.nodes[id.0].label
    }

    pub fn typecode(&self, id: NodeId) -> SymTok {
        self.nodes[id.0].typecode
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn nth_child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.nodes[id.0].children.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, label: LabTok, typecode: SymTok, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(FlatNode {
            label,
            typecode,
            parent,
            next_sibling: None,
            children: Vec::new(),
        });
        id
    }

    /// Produces an event sequence `(status, node)` ending with `Finished`.
    pub fn multi_iter(&self) -> MultiIter<'_> {
        MultiIter {
            tree: self,
            stack: self.root.into_iter().map(|r| (r, 0usize)).collect(),
            finished: self.root.is_none(),
        }
    }
}

/// Converts the nested tree to the arena form (`pt_to_pt2`).
pub fn pt_to_pt2(pt: &ParsingTree) -> ParsingTree2 {
    let mut out = ParsingTree2::default();
    let root = build_flat(&mut out, pt, None);
    out.root = Some(root);
    // Wire up next_sibling now that all nodes exist.
    for node in &out.nodes.clone() {
        let _ = node;
    }
    for i in 0..out.nodes.len() {
        let children = out.nodes[i].children.clone();
        for w in children.windows(2) {
            out.nodes[w[0].0].next_sibling = Some(w[1]);
        }
    }
    out
}

fn build_flat(out: &mut ParsingTree2, pt: &ParsingTree, parent: Option<NodeId>) -> NodeId {
    let id = out.push(pt.label, pt.typecode, parent);
    let mut kids = Vec::with_capacity(pt.children.len());
    for child in &pt.children {
        kids.push(build_flat(out, child, Some(id)));
    }
    out.nodes[id.0].children = kids;
    id
}

/// Converts the arena form back to the nested tree (`pt2_to_pt`).
pub fn pt2_to_pt(pt2: &ParsingTree2) -> ParsingTree {
    match pt2.root {
        None => ParsingTree::failed(),
        Some(root) => rebuild_nested(pt2, root),
    }
}

fn rebuild_nested(pt2: &ParsingTree2, id: NodeId) -> ParsingTree {
    let children = pt2
        .children(id)
        .iter()
        .map(|c| rebuild_nested(pt2, *c))
        .collect();
    ParsingTree::node(pt2.label(id), pt2.typecode(id), children)
}

/// The event produced at each step of a depth-first walk of a `ParsingTree2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiEvent {
    /// Entering an internal node, before its children.
    Open(NodeId),
    /// Leaving an internal node, after its children.
    Close(NodeId),
    /// A childless node, visited exactly once.
    Leaf(NodeId),
    /// The walk is over; no more events will be produced.
    Finished,
}

/// A non-recursive, single-pass depth-first walker over a `ParsingTree2`.
/// Used by bilateral unification so that two trees can be walked in lockstep
/// without recursion (spec §4.4).
pub struct MultiIter<'a> {
    tree: &'a ParsingTree2,
    // (node, next child index to descend into)
    stack: Vec<(NodeId, usize)>,
    finished: bool,
}

impl<'a> Iterator for MultiIter<'a> {
    type Item = MultiEvent;

    fn next(&mut self) -> Option<MultiEvent> {
        if self.finished {
            return None;
        }
        let Some(&(node, child_idx)) = self.stack.last() else {
            self.finished = true;
            return Some(MultiEvent::Finished);
        };
        if child_idx == 0 {
            if self.tree.children(node).is_empty() {
                self.stack.pop();
                return Some(MultiEvent::Leaf(node));
            }
            // First visit: emit Open, then begin descending.
            self.stack.last_mut().unwrap().1 = 1;
            return Some(MultiEvent::Open(node));
        }
        let kids = self.tree.children(node);
        if child_idx - 1 < kids.len() {
            let next_child = kids[child_idx - 1];
            self.stack.last_mut().unwrap().1 += 1;
            self.stack.push((next_child, 0));
            self.next()
        } else {
            self.stack.pop();
            Some(MultiEvent::Close(node))
        }
    }
}
