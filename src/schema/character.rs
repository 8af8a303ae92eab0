use ron::extensions::Extensions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

use super::clue::ClueId;
use super::graph::{ConfigError, DialogueGraph};
use super::node::NodeId;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid dialogue data: {0}")]
    Invalid(#[from] ConfigError),
}

/// Newtype wrapper for character IDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(pub String);

impl CharacterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CharacterId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

fn default_single_use() -> bool {
    true
}

/// A graph that replaces the base conversation when a specific clue is shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClueDialogue {
    pub clue: ClueId,
    pub dialogue: DialogueGraph,
    #[serde(default = "default_single_use")]
    pub single_use: bool,
}

/// Which of a character's graphs the session is walking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphRef {
    Base,
    Fallback,
    /// Index into `Character::clue_dialogues`.
    Override(usize),
}

impl fmt::Display for GraphRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphRef::Base => write!(f, "base"),
            GraphRef::Fallback => write!(f, "fallback"),
            GraphRef::Override(index) => write!(f, "override#{}", index),
        }
    }
}

/// A person the player can interrogate. Loaded once and never mutated by
/// the engine; sessions share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub display_name: String,
    #[serde(default)]
    pub portrait: Option<String>,
    #[serde(default)]
    pub summonable: bool,
    pub base: DialogueGraph,
    #[serde(default)]
    pub fallback: DialogueGraph,
    #[serde(default)]
    pub clue_dialogues: Vec<ClueDialogue>,
}

impl Character {
    pub fn graph(&self, graph: GraphRef) -> Option<&DialogueGraph> {
        match graph {
            GraphRef::Base => Some(&self.base),
            GraphRef::Fallback => Some(&self.fallback),
            GraphRef::Override(index) => self.clue_dialogues.get(index).map(|c| &c.dialogue),
        }
    }

    /// Override entries configured for `clue`, with their indices, in authored order.
    pub fn overrides_for<'a>(
        &'a self,
        clue: &'a ClueId,
    ) -> impl Iterator<Item = (usize, &'a ClueDialogue)> + 'a {
        self.clue_dialogues
            .iter()
            .enumerate()
            .filter(move |(_, entry)| &entry.clue == clue)
    }

    /// Check the authored graphs for problems.
    ///
    /// An empty base graph makes the character unusable. Duplicate ids and
    /// targets that resolve in neither the owning graph nor the base graph
    /// are reported but do not stop a session from running.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut problems = Vec::new();
        if self.base.is_empty() {
            problems.push(ConfigError::EmptyBaseGraph(self.id.clone()));
        }

        let mut graphs: Vec<(String, &DialogueGraph)> = vec![
            ("base".to_string(), &self.base),
            ("fallback".to_string(), &self.fallback),
        ];
        for entry in &self.clue_dialogues {
            graphs.push((format!("clue:{}", entry.clue), &entry.dialogue));
        }

        for (name, graph) in graphs {
            for node in graph.duplicate_ids() {
                problems.push(ConfigError::DuplicateNode {
                    graph: name.clone(),
                    node,
                });
            }
            for node in graph.nodes() {
                for target in node.targets() {
                    if !graph.contains(target) && !self.base.contains(target) {
                        problems.push(ConfigError::DanglingReference {
                            graph: name.clone(),
                            from: node.id.clone(),
                            target: target.clone(),
                        });
                    }
                }
            }
        }
        problems
    }

    /// Base-graph nodes that nothing can ever lead to: not the entry, and
    /// not targeted from any of the character's graphs.
    pub fn unreachable_base_nodes(&self) -> Vec<NodeId> {
        let reached = self.base.reachable_ids();
        let targeted: Vec<&NodeId> = std::iter::once(&self.fallback)
            .chain(self.clue_dialogues.iter().map(|c| &c.dialogue))
            .flat_map(|g| g.nodes().iter().flat_map(|n| n.targets()))
            .collect();
        self.base
            .nodes()
            .iter()
            .filter(|n| !reached.contains(&n.id) && !targeted.contains(&&n.id))
            .map(|n| n.id.clone())
            .collect()
    }
}

/// RON options used for all authored dialogue files: `next: "n1"` may be
/// written without wrapping it in `Some(..)`.
pub(crate) fn ron_options() -> ron::Options {
    ron::Options::default().with_default_extension(Extensions::IMPLICIT_SOME)
}

/// Parse a list of characters from a RON string.
pub fn parse_characters_ron(input: &str) -> Result<Vec<Character>, LoadError> {
    Ok(ron_options().from_str(input)?)
}

/// Load a list of characters from a RON file.
pub fn load_characters_from_ron(path: &Path) -> Result<Vec<Character>, LoadError> {
    let contents = std::fs::read_to_string(path)?;
    parse_characters_ron(&contents)
}
