/// Clickable keywords: terms in dialogue text that reveal clues.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::core::ledger::ClueLedger;
use crate::schema::clue::ClueId;

/// One authored term → clue mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub term: String,
    pub clue: ClueId,
}

/// An occurrence of a keyword inside a piece of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordLink {
    /// Byte range of the term in the text.
    pub range: Range<usize>,
    pub clue: ClueId,
}

#[derive(Debug, Clone, Default)]
pub struct KeywordTable {
    /// Longest term first, so "red door" beats "red" at the same position.
    entries: Vec<KeywordEntry>,
}

impl KeywordTable {
    /// Build a table. Empty terms or clue ids are dropped; when a term is
    /// listed twice the first mapping wins.
    pub fn new(entries: Vec<KeywordEntry>) -> Self {
        let mut kept: Vec<KeywordEntry> = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.term.is_empty() || entry.clue.is_empty() {
                continue;
            }
            if kept.iter().any(|k| k.term == entry.term) {
                continue;
            }
            kept.push(entry);
        }
        kept.sort_by(|a, b| b.term.len().cmp(&a.term.len()));
        Self { entries: kept }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in match priority order.
    pub fn entries(&self) -> &[KeywordEntry] {
        &self.entries
    }

    pub fn clue_for(&self, term: &str) -> Option<&ClueId> {
        self.entries
            .iter()
            .find(|entry| entry.term == term)
            .map(|entry| &entry.clue)
    }

    /// Every non-overlapping keyword occurrence in `text`, left to right.
    pub fn links(&self, text: &str) -> Vec<KeywordLink> {
        let mut links = Vec::new();
        if self.entries.is_empty() {
            return links;
        }

        let mut pos = 0;
        while pos < text.len() {
            let rest = &text[pos..];
            match self.entries.iter().find(|e| rest.starts_with(e.term.as_str())) {
                Some(entry) => {
                    let end = pos + entry.term.len();
                    links.push(KeywordLink {
                        range: pos..end,
                        clue: entry.clue.clone(),
                    });
                    pos = end;
                }
                None => {
                    pos += rest.chars().next().map_or(1, char::len_utf8);
                }
            }
        }
        links
    }

    /// The player clicked `term`: reveal its clue. Returns `None` for an
    /// unknown term, otherwise whether the clue was newly revealed.
    pub fn collect<L: ClueLedger + ?Sized>(&self, term: &str, ledger: &mut L) -> Option<bool> {
        let clue = self.clue_for(term)?;
        Some(ledger.reveal(clue))
    }

    /// Parse a keyword table from a RON list of `(term, clue)` entries.
    pub fn parse_ron(input: &str) -> Result<KeywordTable, ron::error::SpannedError> {
        let entries: Vec<KeywordEntry> = ron::from_str(input)?;
        Ok(Self::new(entries))
    }
}
