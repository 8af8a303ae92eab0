use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Newtype wrapper for node IDs. Unique within the graph that owns the node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A player-selectable choice on a branch node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueOption {
    pub label: String,
    /// Target node. `None` ends the conversation when chosen.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub next: Option<NodeId>,
}

impl DialogueOption {
    pub fn new(label: impl Into<String>, next: Option<&str>) -> Self {
        Self {
            label: label.into(),
            next: next.map(NodeId::from),
        }
    }
}

/// One unit of displayed dialogue plus its successor(s).
///
/// A node with options is a branch node: `next` is kept but ignored by
/// navigation. A node with neither options nor `next` is terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueNode {
    pub id: NodeId,
    pub text: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub next: Option<NodeId>,
    #[serde(default)]
    pub options: Vec<DialogueOption>,
}

impl DialogueNode {
    /// A linear node continuing to `next` (or terminal when `None`).
    pub fn linear(id: &str, text: &str, next: Option<&str>) -> Self {
        Self {
            id: NodeId::from(id),
            text: text.to_string(),
            next: next.map(NodeId::from),
            options: Vec::new(),
        }
    }

    /// A branch node offering `options`.
    pub fn branch(id: &str, text: &str, options: Vec<DialogueOption>) -> Self {
        Self {
            id: NodeId::from(id),
            text: text.to_string(),
            next: None,
            options,
        }
    }

    pub fn is_branch(&self) -> bool {
        !self.options.is_empty()
    }

    pub fn is_terminal(&self) -> bool {
        self.options.is_empty() && self.next.is_none()
    }

    /// Every node id this node can lead to, options included.
    pub fn targets(&self) -> impl Iterator<Item = &NodeId> {
        self.next
            .iter()
            .chain(self.options.iter().filter_map(|o| o.next.as_ref()))
    }
}

/// Authoring tools export "no successor" as an empty string; treat it as absent.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<NodeId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(NodeId))
}
