//! Arena-indexed proof-search tree skeleton (supplement to C9, grounded on
//! `original_source/provers/uct.h`). Only the node shape is kept for
//! interface compatibility; no search heuristic is implemented here, per
//! the Non-goal excluding theorem-prover search (spec §5).

use crate::intern::LabTok;

/// Index into a `UctTree`'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UctNodeId(pub usize);

/// One node of a proof-search tree: the label of the assertion applied to
/// reach it, its parent, and its children, with the visit/value counters a
/// UCT selection policy would read. Nothing in this crate populates these
/// counters; they exist so a future search implementation has a node shape
/// to build on.
#[derive(Debug, Clone)]
pub struct UctNode {
    pub label: Option<LabTok>,
    pub parent: Option<UctNodeId>,
    pub children: Vec<UctNodeId>,
    pub visits: u32,
    pub total_value: f64,
}

impl UctNode {
    fn root() -> Self {
        UctNode {
            label: None,
            parent: None,
            children: Vec::new(),
            visits: 0,
            total_value: 0.0,
        }
    }
}

/// An arena of `UctNode`s. `new()` seeds a root; no other construction or
/// traversal is provided, since no search walks this tree yet.
#[derive(Debug, Default)]
pub struct UctTree {
    nodes: Vec<UctNode>,
}

impl UctTree {
    pub fn new() -> Self {
        UctTree {
            nodes: vec![UctNode::root()],
        }
    }

    pub fn root(&self) -> UctNodeId {
        UctNodeId(0)
    }

    pub fn node(&self, id: UctNodeId) -> &UctNode {
        &self.nodes[id.0]
    }

    pub fn add_child(&mut self, parent: UctNodeId, label: LabTok) -> UctNodeId {
        let id = UctNodeId(self.nodes.len());
        self.nodes.push(UctNode {
            label: Some(label),
            parent: Some(parent),
            children: Vec::new(),
            visits: 0,
            total_value: 0.0,
        });
        self.nodes[parent.0].children.push(id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_has_no_label_and_no_parent() {
        let tree = UctTree::new();
        let root = tree.node(tree.root());
        assert!(root.label.is_none());
        assert!(root.parent.is_none());
    }

    #[test]
    fn add_child_links_parent_and_child() {
        let mut tree = UctTree::new();
        let child = tree.add_child(tree.root(), LabTok(1));
        assert_eq!(tree.node(child).parent, Some(tree.root()));
        assert_eq!(tree.node(tree.root()).children, vec![child]);
    }
}
