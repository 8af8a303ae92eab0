/// The interrogation session: walks a character's dialogue graphs, swaps in
/// clue-triggered overrides, and mediates between live play and history replay.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::core::history::{HistoryBuffer, HistoryEntry, HistoryError};
use crate::core::keywords::KeywordTable;
use crate::core::ledger::ClueLedger;
use crate::core::presentation::{Frame, NullSink, PresentationSink};
use crate::schema::character::{Character, CharacterId, GraphRef};
use crate::schema::clue::ClueId;
use crate::schema::graph::ConfigError;
use crate::schema::node::{DialogueNode, NodeId};

/// Which mode the session is in. Derived, never stored: no character means
/// `NoConversation`, otherwise the history cursor decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    NoConversation,
    Live,
    Replay,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::NoConversation => write!(f, "no conversation is running"),
            SessionState::Live => write!(f, "live"),
            SessionState::Replay => write!(f, "replaying history"),
        }
    }
}

/// The caller-facing operations, used to name what was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ShowClue,
    Continue,
    ChooseOption,
    NavigateHistory,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::ShowClue => write!(f, "show a clue"),
            Operation::Continue => write!(f, "continue"),
            Operation::ChooseOption => write!(f, "choose an option"),
            Operation::NavigateHistory => write!(f, "navigate history"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Back,
    Forward,
}

/// What a successful call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A new node became current and was appended to history.
    Shown,
    /// The history cursor moved; the current node is untouched.
    Navigated,
    /// The conversation reached its end.
    Ended,
    /// Nothing to do. Showing a clue nobody cares about lands here.
    Ignored,
}

/// Coarse classification of `SessionError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad authored data. The conversation has been ended.
    Configuration,
    /// Caller misuse. Nothing changed.
    InvalidState,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: Operation,
        state: SessionState,
    },
    #[error("node '{0}' offers choices; choose an option instead of continuing")]
    AwaitingChoice(NodeId),
    #[error("node '{0}' has no options to choose from")]
    NotAwaitingChoice(NodeId),
    #[error("option {index} is out of range ({available} available)")]
    OptionOutOfRange { index: usize, available: usize },
    #[error("clue '{0}' has not been revealed yet")]
    ClueNotRevealed(ClueId),
    #[error("character '{0}' cannot be summoned")]
    NotSummonable(CharacterId),
    #[error("history error: {0}")]
    History(#[from] HistoryError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Config(_) => ErrorKind::Configuration,
            _ => ErrorKind::InvalidState,
        }
    }
}

/// Position inside the current character's graphs.
#[derive(Debug, Clone)]
struct Conversation {
    character: Arc<Character>,
    graph: GraphRef,
    node: usize,
}

impl Conversation {
    fn node(&self) -> Option<&DialogueNode> {
        self.character.graph(self.graph)?.get(self.node)
    }
}

/// One interrogation at a time. Owns its ledger handle and sink; characters
/// are shared read-only.
///
/// Single-use overrides are remembered per (character, clue) for the life
/// of the session value, across conversations.
pub struct DialogueSession<L, S = NullSink> {
    ledger: L,
    sink: S,
    keywords: KeywordTable,
    conversation: Option<Conversation>,
    history: HistoryBuffer,
    used_overrides: FxHashSet<(CharacterId, ClueId)>,
    reveal_guard: bool,
}

impl<L: ClueLedger> DialogueSession<L, NullSink> {
    /// A session whose frames are pulled with `frame()` instead of pushed.
    pub fn headless(ledger: L) -> Self {
        Self::new(ledger, NullSink)
    }
}

impl<L: ClueLedger, S: PresentationSink> DialogueSession<L, S> {
    pub fn new(ledger: L, sink: S) -> Self {
        Self {
            ledger,
            sink,
            keywords: KeywordTable::default(),
            conversation: None,
            history: HistoryBuffer::new(),
            used_overrides: FxHashSet::default(),
            reveal_guard: false,
        }
    }

    /// Attach clickable keywords; every frame will carry their links.
    pub fn with_keywords(mut self, keywords: KeywordTable) -> Self {
        self.keywords = keywords;
        self
    }

    /// Refuse `show_clue` for clues the ledger has not revealed. Off by default.
    pub fn with_reveal_guard(mut self, enabled: bool) -> Self {
        self.reveal_guard = enabled;
        self
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn keywords(&self) -> &KeywordTable {
        &self.keywords
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn state(&self) -> SessionState {
        match (&self.conversation, self.history.is_replaying()) {
            (None, _) => SessionState::NoConversation,
            (Some(_), false) => SessionState::Live,
            (Some(_), true) => SessionState::Replay,
        }
    }

    pub fn character(&self) -> Option<&Arc<Character>> {
        self.conversation.as_ref().map(|c| &c.character)
    }

    pub fn current_graph(&self) -> Option<GraphRef> {
        self.conversation.as_ref().map(|c| c.graph)
    }

    pub fn current_node(&self) -> Option<&DialogueNode> {
        self.conversation.as_ref().and_then(Conversation::node)
    }

    /// Begin a conversation with `character`, discarding the previous history.
    pub fn start(&mut self, character: Arc<Character>) -> Result<Transition, SessionError> {
        if character.base.is_empty() {
            tracing::error!(character = %character.id, "character has no base dialogue");
            return Err(ConfigError::EmptyBaseGraph(character.id.clone()).into());
        }

        tracing::info!(character = %character.id, name = %character.display_name, "conversation started");
        self.history.clear();
        self.conversation = Some(Conversation {
            character,
            graph: GraphRef::Base,
            node: 0,
        });
        self.record_current()?;
        Ok(Transition::Shown)
    }

    /// `start`, but only for characters the player is allowed to call in.
    pub fn summon(&mut self, character: Arc<Character>) -> Result<Transition, SessionError> {
        if !character.summonable {
            tracing::warn!(character = %character.id, "character is not summonable");
            return Err(SessionError::NotSummonable(character.id.clone()));
        }
        self.start(character)
    }

    /// Present a collected clue to the current character.
    ///
    /// Picks the first eligible override for the clue (consuming it if it is
    /// single-use), then the fallback graph. With neither, the conversation
    /// is left untouched and `Transition::Ignored` is returned.
    ///
    /// An override graph that has no nodes is skipped without being
    /// consumed, so a later non-empty entry for the same clue still plays.
    pub fn show_clue(&mut self, clue: &ClueId) -> Result<Transition, SessionError> {
        self.require_live(Operation::ShowClue)?;
        if self.reveal_guard && !self.ledger.is_revealed(clue) {
            tracing::warn!(clue = %clue, "clue shown before it was revealed");
            return Err(SessionError::ClueNotRevealed(clue.clone()));
        }

        let character = match &self.conversation {
            Some(conversation) => Arc::clone(&conversation.character),
            None => return Err(self.invalid(Operation::ShowClue)),
        };

        let key = (character.id.clone(), clue.clone());
        let chosen = character
            .overrides_for(clue)
            .filter(|(_, entry)| !entry.dialogue.is_empty())
            .find(|(_, entry)| !entry.single_use || !self.used_overrides.contains(&key));

        if let Some((index, entry)) = chosen {
            if entry.single_use {
                self.used_overrides.insert(key);
            }
            tracing::info!(character = %character.id, clue = %clue, single_use = entry.single_use, "clue override entered");
            return self.enter(GraphRef::Override(index));
        }

        if !character.fallback.is_empty() {
            tracing::info!(character = %character.id, clue = %clue, "fallback dialogue entered");
            return self.enter(GraphRef::Fallback);
        }

        tracing::warn!(character = %character.id, clue = %clue, "no dialogue for clue; ignoring");
        Ok(Transition::Ignored)
    }

    /// Advance past a linear node.
    pub fn continue_dialogue(&mut self) -> Result<Transition, SessionError> {
        self.require_live(Operation::Continue)?;
        let node = self
            .current_node()
            .ok_or_else(|| self.invalid(Operation::Continue))?;
        if node.is_branch() {
            tracing::warn!(node = %node.id, "continue on a branch node");
            return Err(SessionError::AwaitingChoice(node.id.clone()));
        }

        let from = node.id.clone();
        match node.next.clone() {
            Some(target) => self.follow(from, target),
            None => Ok(self.finish()),
        }
    }

    /// Pick option `index` on the current branch node.
    pub fn choose_option(&mut self, index: usize) -> Result<Transition, SessionError> {
        self.require_live(Operation::ChooseOption)?;
        let node = self
            .current_node()
            .ok_or_else(|| self.invalid(Operation::ChooseOption))?;
        if !node.is_branch() {
            tracing::warn!(node = %node.id, "choose_option on a linear node");
            return Err(SessionError::NotAwaitingChoice(node.id.clone()));
        }
        let Some(option) = node.options.get(index) else {
            tracing::warn!(node = %node.id, index, "option index out of range");
            return Err(SessionError::OptionOutOfRange {
                index,
                available: node.options.len(),
            });
        };

        tracing::debug!(node = %node.id, label = %option.label, "option chosen");
        let from = node.id.clone();
        match option.next.clone() {
            Some(target) => self.follow(from, target),
            None => Ok(self.finish()),
        }
    }

    /// Browse history. Never touches the current node: replay frames come
    /// straight from the history entries.
    pub fn navigate_history(&mut self, direction: Direction) -> Result<Transition, SessionError> {
        if self.history.is_empty() {
            return Err(self.invalid(Operation::NavigateHistory));
        }
        let moved = match direction {
            Direction::Back => self.history.back(),
            Direction::Forward => self.history.forward(),
        };
        if !moved {
            return Ok(Transition::Ignored);
        }
        self.emit();
        Ok(Transition::Navigated)
    }

    /// Leave replay and show the newest entry again.
    pub fn resume_live(&mut self) -> Transition {
        if !self.history.is_replaying() {
            return Transition::Ignored;
        }
        self.history.reset_to_latest();
        self.emit();
        Transition::Navigated
    }

    /// Stop talking. History is kept until the next `start`.
    pub fn end(&mut self) {
        self.finish();
    }

    /// The frame for whatever the history cursor points at.
    pub fn frame(&self) -> Option<Frame> {
        let entry = self.history.current()?;
        let character = self.character();
        let mode = self.state();
        Some(Frame {
            speaker_name: character.map(|c| c.display_name.clone()),
            portrait: character.and_then(|c| c.portrait.clone()),
            text: entry.text.clone(),
            options: entry.options.iter().map(|o| o.label.clone()).collect(),
            links: self.keywords.links(&entry.text),
            can_go_back: self.history.can_go_back(),
            can_go_forward: self.history.can_go_forward(),
            mode,
            interactive: mode == SessionState::Live,
        })
    }

    /// (character, clue) pairs whose single-use override has been spent.
    pub fn consumed_overrides(&self) -> impl Iterator<Item = &(CharacterId, ClueId)> {
        self.used_overrides.iter()
    }

    /// Reload spent single-use overrides, e.g. from a save file.
    pub fn restore_consumed<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (CharacterId, ClueId)>,
    {
        self.used_overrides.extend(pairs);
    }

    fn invalid(&self, operation: Operation) -> SessionError {
        let state = self.state();
        tracing::warn!(%operation, %state, "operation refused");
        SessionError::InvalidState { operation, state }
    }

    fn require_live(&self, operation: Operation) -> Result<(), SessionError> {
        if self.state() == SessionState::Live {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    /// Resolve `target` in the current graph first, then in the base graph.
    fn follow(&mut self, from: NodeId, target: NodeId) -> Result<Transition, SessionError> {
        let Some(conversation) = self.conversation.as_mut() else {
            return Err(self.invalid(Operation::Continue));
        };

        let character = Arc::clone(&conversation.character);
        let in_current = character
            .graph(conversation.graph)
            .and_then(|graph| graph.position(&target))
            .map(|index| (conversation.graph, index));
        let resolved = in_current.or_else(|| {
            character
                .base
                .position(&target)
                .map(|index| (GraphRef::Base, index))
        });

        match resolved {
            Some((graph, node)) => {
                if graph != conversation.graph {
                    tracing::debug!(from = %conversation.graph, to = %graph, "returned to base dialogue");
                }
                conversation.graph = graph;
                conversation.node = node;
                self.record_current()?;
                Ok(Transition::Shown)
            }
            None => {
                tracing::error!(character = %character.id, from = %from, target = %target, "unresolved dialogue node");
                self.finish();
                Err(ConfigError::UnresolvedNode { from, target }.into())
            }
        }
    }

    fn enter(&mut self, graph: GraphRef) -> Result<Transition, SessionError> {
        if let Some(conversation) = self.conversation.as_mut() {
            conversation.graph = graph;
            conversation.node = 0;
        }
        self.record_current()?;
        Ok(Transition::Shown)
    }

    /// Append the current node to history and render it.
    fn record_current(&mut self) -> Result<(), SessionError> {
        if let Some(node) = self.current_node() {
            let entry = HistoryEntry::from(node);
            tracing::debug!(node = %entry.node_id, "node shown");
            self.history.append(entry)?;
        }
        self.emit();
        Ok(())
    }

    fn emit(&mut self) {
        if let Some(frame) = self.frame() {
            self.sink.render(&frame);
        }
    }

    fn finish(&mut self) -> Transition {
        match self.conversation.take() {
            Some(conversation) => {
                tracing::info!(character = %conversation.character.id, entries = self.history.len(), "conversation ended");
                self.sink.conversation_ended(&conversation.character.id);
                Transition::Ended
            }
            None => Transition::Ignored,
        }
    }
}

impl<L: fmt::Debug, S> fmt::Debug for DialogueSession<L, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogueSession")
            .field("ledger", &self.ledger)
            .field(
                "character",
                &self.conversation.as_ref().map(|c| &c.character.id),
            )
            .field("graph", &self.conversation.as_ref().map(|c| c.graph))
            .field("history", &self.history.len())
            .field("cursor", &self.history.cursor())
            .finish()
    }
}
