use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Newtype wrapper for clue IDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClueId(pub String);

impl ClueId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ClueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClueId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A piece of evidence the player can collect and present to characters.
///
/// The engine treats clues as opaque: only the id matters for branching.
/// The remaining fields are carried for the benefit of whatever UI lists
/// the player's evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clue {
    pub id: ClueId,
    pub display_name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub searchable: bool,
}

impl Clue {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: ClueId::new(id),
            display_name: display_name.into(),
            summary: String::new(),
            detail: String::new(),
            searchable: false,
        }
    }
}

/// All clues known to a case, indexed by id.
///
/// Clues keep their authored order. When two clues share an id the first
/// one wins; later duplicates stay in `clues()` but are never returned by
/// `get`.
#[derive(Debug, Clone, Default)]
pub struct ClueDatabase {
    clues: Vec<Clue>,
    by_id: FxHashMap<ClueId, usize>,
}

impl ClueDatabase {
    pub fn new(clues: Vec<Clue>) -> Self {
        let mut by_id = FxHashMap::default();
        for (index, clue) in clues.iter().enumerate() {
            if clue.id.is_empty() {
                continue;
            }
            by_id.entry(clue.id.clone()).or_insert(index);
        }
        Self { clues, by_id }
    }

    pub fn get(&self, id: &ClueId) -> Option<&Clue> {
        self.by_id.get(id).map(|&index| &self.clues[index])
    }

    pub fn contains(&self, id: &ClueId) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn clues(&self) -> &[Clue] {
        &self.clues
    }

    pub fn len(&self) -> usize {
        self.clues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clues.is_empty()
    }

    /// Parse a clue database from a RON list of clues.
    pub fn parse_ron(input: &str) -> Result<ClueDatabase, ron::error::SpannedError> {
        let clues: Vec<Clue> = ron::from_str(input)?;
        Ok(Self::new(clues))
    }
}

impl FromIterator<Clue> for ClueDatabase {
    fn from_iter<I: IntoIterator<Item = Clue>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
