/// Conversation history: an append-only log with a replay cursor.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::node::{DialogueNode, DialogueOption, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("cannot append while replaying entry {0}; return to the latest entry first")]
    AppendWhileReplaying(usize),
}

/// A snapshot of a node as it was shown. Options are copied out of the
/// node that produced the entry, so replay never consults the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub node_id: NodeId,
    pub text: String,
    pub options: Vec<DialogueOption>,
}

impl HistoryEntry {
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }
}

impl From<&DialogueNode> for HistoryEntry {
    fn from(node: &DialogueNode) -> Self {
        Self {
            node_id: node.id.clone(),
            text: node.text.clone(),
            options: node.options.clone(),
        }
    }
}

/// Where the history is looking.
///
/// `Live` tracks the newest entry. `Replay` pins an older one and is never
/// the last index: moving forward onto the last entry collapses into `Live`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Live,
    Replay(usize),
}

#[derive(Debug, Clone, Default)]
pub struct HistoryBuffer {
    entries: Vec<HistoryEntry>,
    cursor: Cursor,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn is_replaying(&self) -> bool {
        matches!(self.cursor, Cursor::Replay(_))
    }

    /// Add an entry at the end and return to `Live`.
    pub fn append(&mut self, entry: HistoryEntry) -> Result<(), HistoryError> {
        if let Cursor::Replay(index) = self.cursor {
            return Err(HistoryError::AppendWhileReplaying(index));
        }
        self.entries.push(entry);
        self.cursor = Cursor::Live;
        tracing::debug!(len = self.entries.len(), "history entry appended");
        Ok(())
    }

    /// The entry under the cursor; the newest one while `Live`.
    pub fn current(&self) -> Option<&HistoryEntry> {
        match self.cursor {
            Cursor::Live => self.entries.last(),
            Cursor::Replay(index) => self.entries.get(index),
        }
    }

    fn position(&self) -> usize {
        match self.cursor {
            Cursor::Live => self.entries.len().saturating_sub(1),
            Cursor::Replay(index) => index,
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.entries.len() >= 2 && self.position() > 0
    }

    pub fn can_go_forward(&self) -> bool {
        match self.cursor {
            Cursor::Live => false,
            Cursor::Replay(index) => index + 1 < self.entries.len(),
        }
    }

    /// Step to the previous entry. Returns false (and leaves the cursor
    /// alone) when already at the oldest entry.
    pub fn back(&mut self) -> bool {
        if !self.can_go_back() {
            tracing::warn!(cursor = ?self.cursor, len = self.entries.len(), "cannot move back in history");
            return false;
        }
        self.cursor = Cursor::Replay(self.position() - 1);
        tracing::debug!(cursor = ?self.cursor, "history moved back");
        true
    }

    /// Step to the next entry, snapping to `Live` on reaching the newest.
    pub fn forward(&mut self) -> bool {
        let Cursor::Replay(index) = self.cursor else {
            tracing::warn!("cannot move forward in history: already live");
            return false;
        };
        if index + 1 >= self.entries.len() {
            tracing::warn!(index, len = self.entries.len(), "cannot move forward in history");
            return false;
        }
        let next = index + 1;
        self.cursor = if next >= self.entries.len() - 1 {
            Cursor::Live
        } else {
            Cursor::Replay(next)
        };
        tracing::debug!(cursor = ?self.cursor, "history moved forward");
        true
    }

    pub fn reset_to_latest(&mut self) {
        self.cursor = Cursor::Live;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = Cursor::Live;
    }
}
