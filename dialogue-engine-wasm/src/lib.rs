//! WASM bindings for dialogue-engine: drives the browser interrogation demo.

use wasm_bindgen::prelude::*;

use dialogue_engine::schema::character::parse_characters_ron;
use dialogue_engine::{
    CharacterId, CharacterLibrary, ClueDatabase, ClueId, ClueLedger, DialogueSession, Direction,
    Frame, KeywordTable, MemoryLedger, NullSink, SessionError, Transition,
};

// ---------------------------------------------------------------------------
// Embedded demo case, compiled into the WASM binary
// ---------------------------------------------------------------------------
mod data {
    pub const TAVERN_CHARACTERS: &[&str] = &[
        include_str!("../../case_data/tavern/characters/barkeep.ron"),
        include_str!("../../case_data/tavern/characters/cook.ron"),
        include_str!("../../case_data/tavern/characters/hobb.ron"),
    ];
    pub const TAVERN_CLUES: &str = include_str!("../../case_data/tavern/clues.ron");
    pub const TAVERN_KEYWORDS: &str = include_str!("../../case_data/tavern/keywords.ron");
}

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
struct StepOutput {
    transition: &'static str,
    frame: Option<Frame>,
}

#[derive(serde::Serialize)]
struct CharacterInfo {
    id: String,
    name: String,
    portrait: Option<String>,
    summonable: bool,
}

#[derive(serde::Serialize)]
struct ClueInfo {
    id: String,
    name: String,
    summary: String,
    revealed: bool,
}

fn transition_label(t: Transition) -> &'static str {
    match t {
        Transition::Shown => "shown",
        Transition::Navigated => "navigated",
        Transition::Ended => "ended",
        Transition::Ignored => "ignored",
    }
}

fn session_error(e: SessionError) -> JsError {
    JsError::new(&e.to_string())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&format!("JSON error: {e}")))
}

// ---------------------------------------------------------------------------
// InterrogationDemo, the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct InterrogationDemo {
    library: CharacterLibrary,
    session: DialogueSession<MemoryLedger, NullSink>,
}

#[wasm_bindgen]
impl InterrogationDemo {
    /// Build a demo from RON sources: a list of characters, a clue list and
    /// a keyword list. Empty clue or keyword sources are allowed.
    #[wasm_bindgen(constructor)]
    pub fn new(
        characters_ron: &str,
        clues_ron: &str,
        keywords_ron: &str,
    ) -> Result<InterrogationDemo, JsError> {
        Self::from_sources(&[characters_ron], clues_ron, keywords_ron)
    }

    /// The built-in tavern case.
    pub fn tavern() -> Result<InterrogationDemo, JsError> {
        Self::from_sources(data::TAVERN_CHARACTERS, data::TAVERN_CLUES, data::TAVERN_KEYWORDS)
    }

    /// Characters as a JSON array of `{id, name, portrait, summonable}`.
    pub fn characters(&self) -> Result<String, JsError> {
        let info: Vec<CharacterInfo> = self
            .library
            .characters()
            .iter()
            .map(|c| CharacterInfo {
                id: c.id.to_string(),
                name: c.display_name.clone(),
                portrait: c.portrait.clone(),
                summonable: c.summonable,
            })
            .collect();
        to_json(&info)
    }

    /// Every clue in the case with its revealed flag.
    pub fn clues(&self) -> Result<String, JsError> {
        let ledger = self.session.ledger();
        let info: Vec<ClueInfo> = self
            .library
            .clues()
            .clues()
            .iter()
            .map(|c| ClueInfo {
                id: c.id.to_string(),
                name: c.display_name.clone(),
                summary: c.summary.clone(),
                revealed: ledger.is_revealed(&c.id),
            })
            .collect();
        to_json(&info)
    }

    /// Each step method returns `{"transition": ..., "frame": ...}` as JSON.
    pub fn summon(&mut self, id: &str) -> Result<String, JsError> {
        let character = self
            .library
            .get(&CharacterId::from(id))
            .ok_or_else(|| JsError::new(&format!("Unknown character: {id}")))?;
        let t = self.session.summon(character).map_err(session_error)?;
        self.step(t)
    }

    #[wasm_bindgen(js_name = "continue")]
    pub fn continue_dialogue(&mut self) -> Result<String, JsError> {
        let t = self.session.continue_dialogue().map_err(session_error)?;
        self.step(t)
    }

    pub fn choose(&mut self, index: usize) -> Result<String, JsError> {
        let t = self.session.choose_option(index).map_err(session_error)?;
        self.step(t)
    }

    /// Only clues the player has collected can be shown.
    pub fn show_clue(&mut self, id: &str) -> Result<String, JsError> {
        let t = self
            .session
            .show_clue(&ClueId::from(id))
            .map_err(session_error)?;
        self.step(t)
    }

    /// Click a keyword. Returns whether a new clue was revealed.
    pub fn collect(&mut self, term: &str) -> bool {
        self.library
            .keywords()
            .collect(term, self.session.ledger_mut())
            .unwrap_or(false)
    }

    pub fn back(&mut self) -> Result<String, JsError> {
        let t = self
            .session
            .navigate_history(Direction::Back)
            .map_err(session_error)?;
        self.step(t)
    }

    pub fn forward(&mut self) -> Result<String, JsError> {
        let t = self
            .session
            .navigate_history(Direction::Forward)
            .map_err(session_error)?;
        self.step(t)
    }

    pub fn resume(&mut self) -> Result<String, JsError> {
        let t = self.session.resume_live();
        self.step(t)
    }

    pub fn end(&mut self) -> Result<String, JsError> {
        self.session.end();
        self.step(Transition::Ended)
    }

    /// The current frame, or `null` before anything was said.
    pub fn frame(&self) -> Result<String, JsError> {
        to_json(&self.session.frame())
    }

    /// Forget revealed clues and spent overrides.
    pub fn reset(&mut self) {
        self.session = self.library.session(NullSink).with_reveal_guard(true);
    }
}

// Private helpers
impl InterrogationDemo {
    fn from_sources(
        characters: &[&str],
        clues_ron: &str,
        keywords_ron: &str,
    ) -> Result<InterrogationDemo, JsError> {
        let mut builder = CharacterLibrary::builder();
        for source in characters {
            for character in parse_characters_ron(source)
                .map_err(|e| JsError::new(&format!("Character parse error: {e}")))?
            {
                builder = builder.with_character(character);
            }
        }
        if !clues_ron.trim().is_empty() {
            let clues = ClueDatabase::parse_ron(clues_ron)
                .map_err(|e| JsError::new(&format!("Clue parse error: {e}")))?;
            builder = builder.with_clues(clues.clues().to_vec());
        }
        if !keywords_ron.trim().is_empty() {
            let keywords = KeywordTable::parse_ron(keywords_ron)
                .map_err(|e| JsError::new(&format!("Keyword parse error: {e}")))?;
            builder = builder.with_keywords(keywords.entries().to_vec());
        }

        let library = builder
            .build()
            .map_err(|e| JsError::new(&format!("Case build error: {e}")))?;
        let session = library.session(NullSink).with_reveal_guard(true);
        Ok(InterrogationDemo { library, session })
    }

    fn step(&self, transition: Transition) -> Result<String, JsError> {
        to_json(&StepOutput {
            transition: transition_label(transition),
            frame: self.session.frame(),
        })
    }
}
