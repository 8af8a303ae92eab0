/// Presentation boundary: what the session hands to whoever draws it.

use serde::{Deserialize, Serialize};

use crate::core::keywords::KeywordLink;
use crate::core::session::SessionState;
use crate::schema::character::CharacterId;

/// Everything a front end needs to draw the dialogue box after a transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// `None` once the conversation has ended and only history remains.
    pub speaker_name: Option<String>,
    pub portrait: Option<String>,
    pub text: String,
    pub options: Vec<String>,
    /// Clickable keywords found in `text`.
    pub links: Vec<KeywordLink>,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub mode: SessionState,
    /// False while replaying history: options are shown but cannot be picked.
    pub interactive: bool,
}

/// Receives frames synchronously. Implementations must not call back into
/// the session that is notifying them.
pub trait PresentationSink {
    fn render(&mut self, frame: &Frame);

    fn conversation_ended(&mut self, _character: &CharacterId) {}
}

impl<S: PresentationSink + ?Sized> PresentationSink for &mut S {
    fn render(&mut self, frame: &Frame) {
        (**self).render(frame)
    }

    fn conversation_ended(&mut self, character: &CharacterId) {
        (**self).conversation_ended(character)
    }
}

/// Discards everything. For callers that pull frames with `DialogueSession::frame`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn render(&mut self, _frame: &Frame) {}
}

/// Keeps every frame it was given; handy in tests and tooling.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub frames: Vec<Frame>,
    pub ended: Vec<CharacterId>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }
}

impl PresentationSink for RecordingSink {
    fn render(&mut self, frame: &Frame) {
        self.frames.push(frame.clone());
    }

    fn conversation_ended(&mut self, character: &CharacterId) {
        self.ended.push(character.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(text: &str) -> Frame {
        Frame {
            speaker_name: Some("Witness".to_string()),
            portrait: None,
            text: text.to_string(),
            options: Vec::new(),
            links: Vec::new(),
            can_go_back: false,
            can_go_forward: false,
            mode: SessionState::Live,
            interactive: true,
        }
    }

    #[test]
    fn recording_sink_keeps_order() {
        let mut sink = RecordingSink::new();
        sink.render(&frame("one"));
        sink.render(&frame("two"));
        sink.conversation_ended(&CharacterId::from("witness"));
        assert_eq!(sink.frames.len(), 2);
        assert_eq!(sink.last().unwrap().text, "two");
        assert_eq!(sink.ended, vec![CharacterId::from("witness")]);
    }

    #[test]
    fn borrowed_sink_forwards() {
        fn render_into<S: PresentationSink>(mut sink: S, frame: &Frame) {
            sink.render(frame);
        }
        let mut sink = RecordingSink::new();
        render_into(&mut sink, &frame("via borrow"));
        assert_eq!(sink.frames.len(), 1);
    }
}
