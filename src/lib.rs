//! Dialogue Engine: branching interrogation conversations for detective games.
//!
//! Computes which dialogue node is current, which options exist and where
//! the player may navigate, given declarative per-character dialogue graphs
//! and the set of clues the player has collected. Rendering, audio and
//! persistence stay with the host game.

pub mod core;
pub mod schema;

pub use crate::core::history::{Cursor, HistoryBuffer, HistoryEntry};
pub use crate::core::keywords::{KeywordEntry, KeywordLink, KeywordTable};
pub use crate::core::ledger::{ClueLedger, MemoryLedger};
pub use crate::core::library::{CharacterLibrary, CharacterLibraryBuilder};
pub use crate::core::presentation::{Frame, NullSink, PresentationSink, RecordingSink};
pub use crate::core::session::{
    DialogueSession, Direction, ErrorKind, Operation, SessionError, SessionState, Transition,
};
pub use crate::schema::character::{Character, CharacterId, ClueDialogue, GraphRef, LoadError};
pub use crate::schema::clue::{Clue, ClueDatabase, ClueId};
pub use crate::schema::graph::{ConfigError, DialogueGraph};
pub use crate::schema::node::{DialogueNode, DialogueOption, NodeId};
