/// Clue ledger: which pieces of evidence the player has collected.

use rustc_hash::FxHashSet;
use std::fmt;

use crate::schema::clue::{Clue, ClueDatabase, ClueId};

/// The narrow view of the case state that dialogue needs.
///
/// `reveal` is idempotent and reports whether the call caused a new reveal.
pub trait ClueLedger {
    fn is_revealed(&self, id: &ClueId) -> bool;
    fn reveal(&mut self, id: &ClueId) -> bool;
}

impl<L: ClueLedger + ?Sized> ClueLedger for &mut L {
    fn is_revealed(&self, id: &ClueId) -> bool {
        (**self).is_revealed(id)
    }

    fn reveal(&mut self, id: &ClueId) -> bool {
        (**self).reveal(id)
    }
}

type RevealListener = Box<dyn FnMut(&Clue)>;

/// In-memory ledger backed by the case's clue database. Only clues that
/// exist in the database can be revealed.
pub struct MemoryLedger {
    database: ClueDatabase,
    revealed: FxHashSet<ClueId>,
    order: Vec<ClueId>,
    listeners: Vec<RevealListener>,
}

impl MemoryLedger {
    pub fn new(database: ClueDatabase) -> Self {
        Self {
            database,
            revealed: FxHashSet::default(),
            order: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub fn database(&self) -> &ClueDatabase {
        &self.database
    }

    /// Register a callback fired once per newly revealed clue.
    pub fn on_reveal(&mut self, listener: impl FnMut(&Clue) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Revealed clue ids in the order they were revealed.
    pub fn revealed(&self) -> &[ClueId] {
        &self.order
    }

    /// Forget every reveal, e.g. when a new case starts. Listeners stay registered.
    pub fn reset(&mut self) {
        tracing::info!(count = self.order.len(), "clue ledger reset");
        self.revealed.clear();
        self.order.clear();
    }
}

impl ClueLedger for MemoryLedger {
    fn is_revealed(&self, id: &ClueId) -> bool {
        !id.is_empty() && self.revealed.contains(id)
    }

    fn reveal(&mut self, id: &ClueId) -> bool {
        if id.is_empty() {
            tracing::warn!("reveal called with an empty clue id");
            return false;
        }
        if self.revealed.contains(id) {
            return false;
        }
        let Some(clue) = self.database.get(id) else {
            tracing::warn!(clue = %id, "clue not found in database");
            return false;
        };

        self.revealed.insert(id.clone());
        self.order.push(id.clone());
        for listener in &mut self.listeners {
            listener(clue);
        }
        tracing::info!(clue = %id, name = %clue.display_name, "clue revealed");
        true
    }
}

impl fmt::Debug for MemoryLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryLedger")
            .field("clues", &self.database.len())
            .field("revealed", &self.order)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
