/// Dialogue graphs: ordered node collections addressed by node id.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::character::CharacterId;
use super::node::{DialogueNode, NodeId};

/// Problems with authored dialogue data.
///
/// `EmptyBaseGraph` and `UnresolvedNode` are raised at runtime by the
/// session. The others are only reported by validation: at runtime a
/// duplicate id simply resolves to its first occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("character '{0}' has no base dialogue")]
    EmptyBaseGraph(CharacterId),
    #[error("node '{target}' referenced from '{from}' exists in neither the current nor the base graph")]
    UnresolvedNode { from: NodeId, target: NodeId },
    #[error("graph '{graph}' defines node '{node}' more than once")]
    DuplicateNode { graph: String, node: NodeId },
    #[error("graph '{graph}': node '{from}' points at unknown node '{target}'")]
    DanglingReference {
        graph: String,
        from: NodeId,
        target: NodeId,
    },
}

/// An ordered sequence of nodes. The first node is the entry point.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DialogueGraph {
    nodes: Vec<DialogueNode>,
}

impl DialogueGraph {
    pub fn new(nodes: Vec<DialogueNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[DialogueNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn entry(&self) -> Option<&DialogueNode> {
        self.nodes.first()
    }

    pub fn get(&self, index: usize) -> Option<&DialogueNode> {
        self.nodes.get(index)
    }

    /// Index of the first node with this id. Duplicates are never skipped
    /// over: the earliest definition always wins.
    pub fn position(&self, id: &NodeId) -> Option<usize> {
        self.nodes.iter().position(|node| &node.id == id)
    }

    pub fn find(&self, id: &NodeId) -> Option<&DialogueNode> {
        self.position(id).map(|index| &self.nodes[index])
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.position(id).is_some()
    }

    /// Node ids that appear more than once, in order of their second appearance.
    pub fn duplicate_ids(&self) -> Vec<NodeId> {
        let mut seen = FxHashSet::default();
        let mut duplicates = Vec::new();
        for node in &self.nodes {
            if !seen.insert(&node.id) && !duplicates.contains(&node.id) {
                duplicates.push(node.id.clone());
            }
        }
        duplicates
    }

    /// Ids reachable from the entry node by following `next` and option
    /// targets inside this graph only.
    pub fn reachable_ids(&self) -> FxHashSet<NodeId> {
        let mut reached = FxHashSet::default();
        let mut stack: Vec<&DialogueNode> = self.entry().into_iter().collect();
        while let Some(node) = stack.pop() {
            if !reached.insert(node.id.clone()) {
                continue;
            }
            let outgoing: Vec<&NodeId> = if node.is_branch() {
                node.options.iter().filter_map(|o| o.next.as_ref()).collect()
            } else {
                node.next.iter().collect()
            };
            for target in outgoing {
                if let Some(next) = self.find(target) {
                    stack.push(next);
                }
            }
        }
        reached
    }
}

impl FromIterator<DialogueNode> for DialogueGraph {
    fn from_iter<I: IntoIterator<Item = DialogueNode>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
