/// Session integration tests: full interrogations against the fixture case.

use dialogue_engine::{
    CharacterId, CharacterLibrary, ClueId, ClueLedger, ConfigError, DialogueGraph, DialogueNode,
    DialogueSession, Direction, ErrorKind, GraphRef, MemoryLedger, NodeId, Operation,
    RecordingSink, SessionError, SessionState, Transition,
};
use std::sync::Arc;

fn library() -> CharacterLibrary {
    CharacterLibrary::builder()
        .characters_dir("tests/fixtures/case")
        .clues("tests/fixtures/clues.ron")
        .keywords("tests/fixtures/keywords.ron")
        .build()
        .unwrap()
}

fn witness_session() -> (CharacterLibrary, DialogueSession<MemoryLedger, RecordingSink>) {
    let library = library();
    let mut session = library.session(RecordingSink::new());
    let witness = library.get(&CharacterId::from("witness")).unwrap();
    session.summon(witness).unwrap();
    (library, session)
}

fn current(session: &DialogueSession<MemoryLedger, RecordingSink>) -> String {
    session.current_node().unwrap().id.to_string()
}

#[test]
fn walk_base_conversation_through_a_branch() {
    let (_, mut session) = witness_session();
    assert_eq!(current(&session), "n0");

    session.continue_dialogue().unwrap();
    assert_eq!(current(&session), "n1");
    let frame = session.sink().last().unwrap();
    assert_eq!(frame.options.len(), 2);
    assert_eq!(frame.options[0], "Where were you that night?");

    session.choose_option(0).unwrap();
    assert_eq!(current(&session), "alibi");
    session.continue_dialogue().unwrap();
    assert_eq!(current(&session), "n1");

    // "Nothing more." has an empty target.
    assert_eq!(session.choose_option(1), Ok(Transition::Ended));
    assert_eq!(session.state(), SessionState::NoConversation);
    assert_eq!(session.history().len(), 4);
    assert_eq!(session.sink().ended, vec![CharacterId::from("witness")]);
}

#[test]
fn keyword_links_reveal_clues_that_can_then_be_shown() {
    let library = library();
    let mut session = library
        .session(RecordingSink::new())
        .with_reveal_guard(true);
    session
        .summon(library.get(&CharacterId::from("witness")).unwrap())
        .unwrap();
    session.continue_dialogue().unwrap();
    session.choose_option(0).unwrap();

    let frame = session.sink().last().unwrap().clone();
    assert_eq!(frame.links.len(), 1);
    assert_eq!(&frame.text[frame.links[0].range.clone()], "red door");

    let red_door = ClueId::from("red_door");
    assert_eq!(
        session.show_clue(&red_door),
        Err(SessionError::ClueNotRevealed(red_door.clone()))
    );
    assert_eq!(
        library.keywords().collect("red door", session.ledger_mut()),
        Some(true)
    );
    assert!(session.ledger().is_revealed(&red_door));

    // No override for this clue: the witness falls back.
    assert_eq!(session.show_clue(&red_door), Ok(Transition::Shown));
    assert_eq!(current(&session), "f0");
    assert_eq!(session.current_graph(), Some(GraphRef::Fallback));
}

#[test]
fn clues_need_not_be_revealed_to_be_shown() {
    let (_, mut session) = witness_session();
    let knife = ClueId::from("knife");
    assert!(!session.ledger().is_revealed(&knife));

    assert_eq!(session.show_clue(&knife), Ok(Transition::Shown));
    assert_eq!(current(&session), "k0");
    // Showing never reveals.
    assert!(!session.ledger().is_revealed(&knife));
}

#[test]
fn override_node_shadows_base_node_with_same_id() {
    let library = library();
    let mut witness = (*library.get(&CharacterId::from("witness")).unwrap()).clone();
    witness.clue_dialogues[0].dialogue = DialogueGraph::new(vec![
        DialogueNode::linear("k0", "That knife...", Some("alibi")),
        DialogueNode::linear("alibi", "I was never at the tavern.", None),
    ]);
    assert!(witness.base.contains(&NodeId::from("alibi")));

    let mut session = library.session(RecordingSink::new());
    session.start(Arc::new(witness)).unwrap();
    session.show_clue(&ClueId::from("knife")).unwrap();
    session.continue_dialogue().unwrap();

    assert_eq!(current(&session), "alibi");
    assert_eq!(session.current_graph(), Some(GraphRef::Override(0)));
    assert_eq!(
        session.current_node().unwrap().text,
        "I was never at the tavern."
    );
}

#[test]
fn override_returns_to_base_graph() {
    let (_, mut session) = witness_session();
    let knife = ClueId::from("knife");
    session.ledger_mut().reveal(&knife);

    session.show_clue(&knife).unwrap();
    assert_eq!(current(&session), "k0");
    session.continue_dialogue().unwrap();
    assert_eq!(current(&session), "k1");
    assert_eq!(session.current_graph(), Some(GraphRef::Override(0)));

    session.continue_dialogue().unwrap();
    assert_eq!(current(&session), "n1");
    assert_eq!(session.current_graph(), Some(GraphRef::Base));
}

#[test]
fn single_use_override_is_spent_within_one_conversation() {
    let (_, mut session) = witness_session();
    let knife = ClueId::from("knife");
    session.ledger_mut().reveal(&knife);

    session.show_clue(&knife).unwrap();
    assert_eq!(current(&session), "k0");
    session.show_clue(&knife).unwrap();
    assert_eq!(current(&session), "f0");

    let consumed: Vec<_> = session.consumed_overrides().cloned().collect();
    assert_eq!(consumed, vec![(CharacterId::from("witness"), knife)]);
}

#[test]
fn single_use_is_spent_even_if_the_player_backs_out() {
    let (library, mut session) = witness_session();
    let knife = ClueId::from("knife");
    session.ledger_mut().reveal(&knife);

    session.show_clue(&knife).unwrap();
    session.navigate_history(Direction::Back).unwrap();
    session.resume_live();
    session.end();

    session
        .start(library.get(&CharacterId::from("witness")).unwrap())
        .unwrap();
    session.show_clue(&knife).unwrap();
    assert_eq!(current(&session), "f0");
}

#[test]
fn reusable_override_repeats() {
    let (_, mut session) = witness_session();
    let letter = ClueId::from("letter");
    session.ledger_mut().reveal(&letter);

    for _ in 0..3 {
        session.show_clue(&letter).unwrap();
        assert_eq!(current(&session), "l0");
    }
    assert!(session.consumed_overrides().next().is_none());

    // An option inside the override can jump straight into the base graph.
    session.choose_option(1).unwrap();
    assert_eq!(current(&session), "alibi");
    assert_eq!(session.current_graph(), Some(GraphRef::Base));
}

#[test]
fn replay_blocks_progress_until_resumed() {
    let (_, mut session) = witness_session();
    session.continue_dialogue().unwrap();
    session.choose_option(0).unwrap();

    session.navigate_history(Direction::Back).unwrap();
    session.navigate_history(Direction::Back).unwrap();
    assert_eq!(session.state(), SessionState::Replay);
    assert_eq!(session.sink().last().unwrap().text, "Hello, detective.");

    let history_len = session.history().len();
    let err = session.choose_option(0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(
        err,
        SessionError::InvalidState {
            operation: Operation::ChooseOption,
            state: SessionState::Replay,
        }
    );
    assert_eq!(current(&session), "alibi");
    assert_eq!(session.history().len(), history_len);

    session.resume_live();
    assert_eq!(session.state(), SessionState::Live);
    assert_eq!(session.continue_dialogue(), Ok(Transition::Shown));
    assert_eq!(current(&session), "n1");
}

#[test]
fn replayed_branch_shows_its_own_options() {
    let (_, mut session) = witness_session();
    let letter = ClueId::from("letter");
    session.ledger_mut().reveal(&letter);
    session.show_clue(&letter).unwrap();
    session.choose_option(0).unwrap();
    assert_eq!(current(&session), "l1");

    session.navigate_history(Direction::Back).unwrap();
    let frame = session.frame().unwrap();
    assert_eq!(frame.text, "The letter again?");
    assert_eq!(frame.options, vec!["Who wrote it?", "Back to that night."]);
    assert!(!frame.interactive);
    assert_eq!(frame.speaker_name.as_deref(), Some("Witness"));
}

#[test]
fn terminal_override_node_ends_on_continue() {
    let (_, mut session) = witness_session();
    let letter = ClueId::from("letter");
    session.ledger_mut().reveal(&letter);
    session.show_clue(&letter).unwrap();
    session.choose_option(0).unwrap();
    assert_eq!(session.continue_dialogue(), Ok(Transition::Ended));
    assert!(session.character().is_none());

    // History stays browsable after the conversation ended.
    assert_eq!(
        session.navigate_history(Direction::Back),
        Ok(Transition::Navigated)
    );
    let frame = session.frame().unwrap();
    assert_eq!(frame.speaker_name, None);
    assert_eq!(frame.mode, SessionState::NoConversation);
}

#[test]
fn cook_cannot_be_summoned_but_can_be_started() {
    let library = library();
    let cook = library.get(&CharacterId::from("cook")).unwrap();
    let mut session = library.session(RecordingSink::new());
    assert_eq!(
        session.summon(Arc::clone(&cook)),
        Err(SessionError::NotSummonable(CharacterId::from("cook")))
    );
    assert_eq!(session.state(), SessionState::NoConversation);
    assert_eq!(session.start(cook), Ok(Transition::Shown));
}

#[test]
fn starting_a_new_conversation_clears_history() {
    let (library, mut session) = witness_session();
    session.continue_dialogue().unwrap();
    assert_eq!(session.history().len(), 2);

    session
        .start(library.get(&CharacterId::from("cook")).unwrap())
        .unwrap();
    assert_eq!(session.history().len(), 1);
    assert_eq!(current(&session), "c0");
}

#[test]
fn unresolved_target_ends_conversation() {
    let library = library();
    let mut witness = (*library.get(&CharacterId::from("witness")).unwrap()).clone();
    witness.fallback = DialogueGraph::new(vec![DialogueNode::linear(
        "f0",
        "Hmm.",
        Some("missing"),
    )]);

    let mut session = library.session(RecordingSink::new());
    session.start(Arc::new(witness)).unwrap();
    let red_door = ClueId::from("red_door");
    session.ledger_mut().reveal(&red_door);
    session.show_clue(&red_door).unwrap();
    assert_eq!(current(&session), "f0");

    let err = session.continue_dialogue().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(
        err,
        SessionError::Config(ConfigError::UnresolvedNode {
            from: NodeId::from("f0"),
            target: NodeId::from("missing"),
        })
    );
    assert_eq!(session.state(), SessionState::NoConversation);
    assert_eq!(session.sink().ended, vec![CharacterId::from("witness")]);
}
