/// Character library: loads a case's characters, clues and keywords.

use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::keywords::{KeywordEntry, KeywordTable};
use crate::core::ledger::MemoryLedger;
use crate::core::presentation::PresentationSink;
use crate::core::session::DialogueSession;
use crate::schema::character::{load_characters_from_ron, Character, CharacterId, LoadError};
use crate::schema::clue::{Clue, ClueDatabase};
use crate::schema::graph::ConfigError;

/// Everything a case needs to run interrogations. Built via `CharacterLibrary::builder()`.
#[derive(Debug, Clone, Default)]
pub struct CharacterLibrary {
    characters: Vec<Arc<Character>>,
    by_id: FxHashMap<CharacterId, usize>,
    clues: ClueDatabase,
    keywords: KeywordTable,
}

/// Builder for constructing a `CharacterLibrary`.
#[derive(Debug, Default)]
pub struct CharacterLibraryBuilder {
    characters_dirs: Vec<PathBuf>,
    character_files: Vec<PathBuf>,
    clues_path: Option<PathBuf>,
    keywords_path: Option<PathBuf>,
    /// Directly provided characters (for testing without files).
    characters: Vec<Character>,
    /// Directly provided clues (for testing without files).
    clues: Vec<Clue>,
    /// Directly provided keywords (for testing without files).
    keywords: Vec<KeywordEntry>,
}

impl CharacterLibrary {
    pub fn builder() -> CharacterLibraryBuilder {
        CharacterLibraryBuilder::default()
    }

    pub fn get(&self, id: &CharacterId) -> Option<Arc<Character>> {
        self.by_id
            .get(id)
            .map(|&index| Arc::clone(&self.characters[index]))
    }

    pub fn characters(&self) -> &[Arc<Character>] {
        &self.characters
    }

    /// Characters the player may call in, in load order.
    pub fn summonable(&self) -> impl Iterator<Item = &Arc<Character>> {
        self.characters.iter().filter(|c| c.summonable)
    }

    pub fn clues(&self) -> &ClueDatabase {
        &self.clues
    }

    pub fn keywords(&self) -> &KeywordTable {
        &self.keywords
    }

    /// A fresh ledger over this case's clues, nothing revealed.
    pub fn ledger(&self) -> MemoryLedger {
        MemoryLedger::new(self.clues.clone())
    }

    /// A session with a fresh ledger and this case's keywords attached.
    pub fn session<S: PresentationSink>(&self, sink: S) -> DialogueSession<MemoryLedger, S> {
        DialogueSession::new(self.ledger(), sink).with_keywords(self.keywords.clone())
    }
}

impl CharacterLibraryBuilder {
    /// Load every `.ron` file in `path` as a list of characters.
    pub fn characters_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.characters_dirs.push(path.as_ref().to_path_buf());
        self
    }

    /// Load a single `.ron` file holding a list of characters.
    pub fn characters_file(mut self, path: impl AsRef<Path>) -> Self {
        self.character_files.push(path.as_ref().to_path_buf());
        self
    }

    pub fn clues(mut self, path: impl AsRef<Path>) -> Self {
        self.clues_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn keywords(mut self, path: impl AsRef<Path>) -> Self {
        self.keywords_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Provide a character directly (for testing without files).
    pub fn with_character(mut self, character: Character) -> Self {
        self.characters.push(character);
        self
    }

    /// Provide clues directly (for testing without files).
    pub fn with_clues(mut self, clues: Vec<Clue>) -> Self {
        self.clues.extend(clues);
        self
    }

    /// Provide keywords directly (for testing without files).
    pub fn with_keywords(mut self, keywords: Vec<KeywordEntry>) -> Self {
        self.keywords.extend(keywords);
        self
    }

    pub fn build(self) -> Result<CharacterLibrary, LoadError> {
        let mut characters = self.characters;
        for dir in &self.characters_dirs {
            load_ron_files_from_dir(dir, |path| {
                characters.extend(load_characters_from_ron(path)?);
                Ok(())
            })?;
        }
        for path in &self.character_files {
            characters.extend(load_characters_from_ron(path)?);
        }

        let mut clues = self.clues;
        if let Some(path) = &self.clues_path {
            let contents = std::fs::read_to_string(path)?;
            let loaded: Vec<Clue> = ron::from_str(&contents)?;
            clues.extend(loaded);
        }

        let mut keywords = self.keywords;
        if let Some(path) = &self.keywords_path {
            let contents = std::fs::read_to_string(path)?;
            let loaded: Vec<KeywordEntry> = ron::from_str(&contents)?;
            keywords.extend(loaded);
        }

        let mut library = CharacterLibrary {
            clues: ClueDatabase::new(clues),
            keywords: KeywordTable::new(keywords),
            ..CharacterLibrary::default()
        };

        for character in characters {
            for problem in character.validate() {
                if let ConfigError::EmptyBaseGraph(_) = problem {
                    return Err(problem.into());
                }
                tracing::warn!(character = %character.id, %problem, "dialogue data problem");
            }
            for entry in &character.clue_dialogues {
                if !library.clues.is_empty() && !library.clues.contains(&entry.clue) {
                    tracing::warn!(character = %character.id, clue = %entry.clue, "override keyed to unknown clue");
                }
            }
            if library.by_id.contains_key(&character.id) {
                tracing::warn!(character = %character.id, "duplicate character id; keeping the first");
                continue;
            }
            library
                .by_id
                .insert(character.id.clone(), library.characters.len());
            library.characters.push(Arc::new(character));
        }

        tracing::info!(
            characters = library.characters.len(),
            clues = library.clues.len(),
            keywords = library.keywords.len(),
            "character library loaded"
        );
        Ok(library)
    }
}

/// Load all .ron files from a directory, calling `loader` for each.
fn load_ron_files_from_dir<F>(dir: &Path, mut loader: F) -> Result<(), LoadError>
where
    F: FnMut(&Path) -> Result<(), LoadError>,
{
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) == Some("ron") {
            paths.push(path);
        }
    }
    paths.sort();
    for path in paths {
        loader(&path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::presentation::RecordingSink;
    use crate::schema::clue::ClueId;
    use crate::schema::graph::DialogueGraph;
    use crate::schema::node::DialogueNode;

    fn character(id: &str, summonable: bool) -> Character {
        Character {
            id: CharacterId::from(id),
            display_name: id.to_uppercase(),
            portrait: None,
            summonable,
            base: DialogueGraph::new(vec![DialogueNode::linear("n0", "Hello", None)]),
            fallback: DialogueGraph::default(),
            clue_dialogues: Vec::new(),
        }
    }

    #[test]
    fn builder_with_direct_data() {
        let library = CharacterLibrary::builder()
            .with_character(character("maid", true))
            .with_character(character("butler", false))
            .with_clues(vec![Clue::new("knife", "Knife")])
            .with_keywords(vec![KeywordEntry {
                term: "knife".to_string(),
                clue: ClueId::from("knife"),
            }])
            .build()
            .unwrap();

        assert_eq!(library.characters().len(), 2);
        assert!(library.get(&CharacterId::from("maid")).is_some());
        let summonable: Vec<&str> = library.summonable().map(|c| c.id.as_str()).collect();
        assert_eq!(summonable, vec!["maid"]);
        assert_eq!(library.keywords().len(), 1);
    }

    #[test]
    fn duplicate_character_keeps_first() {
        let mut second = character("maid", true);
        second.display_name = "Impostor".to_string();
        let library = CharacterLibrary::builder()
            .with_character(character("maid", true))
            .with_character(second)
            .build()
            .unwrap();
        assert_eq!(library.characters().len(), 1);
        assert_eq!(
            library.get(&CharacterId::from("maid")).unwrap().display_name,
            "MAID"
        );
    }

    #[test]
    fn empty_base_graph_fails_build() {
        let mut broken = character("ghost", true);
        broken.base = DialogueGraph::default();
        let err = CharacterLibrary::builder()
            .with_character(broken)
            .build()
            .unwrap_err();
        assert!(matches!(err, LoadError::Invalid(ConfigError::EmptyBaseGraph(_))));
    }

    #[test]
    fn session_shares_characters() {
        let library = CharacterLibrary::builder()
            .with_character(character("maid", true))
            .build()
            .unwrap();
        let maid = library.get(&CharacterId::from("maid")).unwrap();
        let mut session = library.session(RecordingSink::new());
        session.start(Arc::clone(&maid)).unwrap();
        assert!(Arc::ptr_eq(session.character().unwrap(), &maid));
    }
}
