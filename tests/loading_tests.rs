/// Loading integration tests: RON fixtures into a character library.

use dialogue_engine::schema::character::{load_characters_from_ron, parse_characters_ron};
use dialogue_engine::{CharacterId, CharacterLibrary, ClueId, ConfigError, LoadError, NodeId};

#[test]
fn fixture_case_loads() {
    let library = CharacterLibrary::builder()
        .characters_dir("tests/fixtures/case")
        .clues("tests/fixtures/clues.ron")
        .keywords("tests/fixtures/keywords.ron")
        .build()
        .unwrap();

    assert_eq!(library.characters().len(), 2);
    // Files load in name order.
    assert_eq!(library.characters()[0].id, CharacterId::from("cook"));
    assert_eq!(library.clues().len(), 3);
    assert_eq!(library.keywords().len(), 2);

    let witness = library.get(&CharacterId::from("witness")).unwrap();
    assert_eq!(witness.portrait.as_deref(), Some("portraits/witness.png"));
    assert_eq!(witness.clue_dialogues.len(), 2);
    assert!(witness.clue_dialogues[0].single_use);
    assert!(!witness.clue_dialogues[1].single_use);

    // Empty option targets mean "end the conversation".
    let n1 = witness.base.find(&NodeId::from("n1")).unwrap();
    assert!(n1.options[1].next.is_none());
}

#[test]
fn fixture_characters_validate_cleanly() {
    let characters = load_characters_from_ron(std::path::Path::new(
        "tests/fixtures/case/witness.ron",
    ))
    .unwrap();
    assert!(characters[0].validate().is_empty());
    assert!(characters[0].unreachable_base_nodes().is_empty());
}

#[test]
fn clue_data_round_trips_through_the_ledger() {
    let library = CharacterLibrary::builder()
        .clues("tests/fixtures/clues.ron")
        .build()
        .unwrap();
    let knife = library.clues().get(&ClueId::from("knife")).unwrap();
    assert!(knife.searchable);
    assert_eq!(knife.summary, "Found under the tavern stairs.");
}

#[test]
fn missing_file_is_an_io_error() {
    let err = CharacterLibrary::builder()
        .characters_file("tests/fixtures/does_not_exist.ron")
        .build()
        .unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}

#[test]
fn malformed_ron_is_reported() {
    let err = parse_characters_ron("[ (id: \"x\", display_name: ").unwrap_err();
    assert!(matches!(err, LoadError::Ron(_)));
}

#[test]
fn empty_base_graph_rejected_at_build() {
    let characters = parse_characters_ron(r#"[(id: "ghost", display_name: "Ghost", base: [])]"#)
        .unwrap();
    let mut builder = CharacterLibrary::builder();
    for character in characters {
        builder = builder.with_character(character);
    }
    let err = builder.build().unwrap_err();
    assert!(matches!(
        err,
        LoadError::Invalid(ConfigError::EmptyBaseGraph(ref id)) if id.as_str() == "ghost"
    ));
}

#[test]
fn bundled_tavern_case_is_clean() {
    let library = CharacterLibrary::builder()
        .characters_dir("case_data/tavern/characters")
        .clues("case_data/tavern/clues.ron")
        .keywords("case_data/tavern/keywords.ron")
        .build()
        .unwrap();
    assert_eq!(library.characters().len(), 3);
    for character in library.characters() {
        assert!(character.validate().is_empty(), "{}", character.id);
        assert!(character.unreachable_base_nodes().is_empty(), "{}", character.id);
        for entry in &character.clue_dialogues {
            assert!(library.clues().contains(&entry.clue));
        }
    }
    let summonable: Vec<&str> = library.summonable().map(|c| c.id.as_str()).collect();
    assert_eq!(summonable, vec!["barkeep", "hobb"]);
}

#[test]
fn single_character_file_loads() {
    let library = CharacterLibrary::builder()
        .characters_file("tests/fixtures/case/witness.ron")
        .build()
        .unwrap();
    assert_eq!(library.characters().len(), 1);
    assert!(library.get(&CharacterId::from("witness")).is_some());
    assert!(library.get(&CharacterId::from("cook")).is_none());
}
