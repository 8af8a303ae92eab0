/// Tavern Night example: a scripted interrogation over the bundled tavern case.
///
/// The barkeep's accounts break Old Hobb's alibi.
///
/// Run with: cargo run --example tavern_night

use dialogue_engine::{
    CharacterId, CharacterLibrary, ClueId, ClueLedger, Direction, Frame, PresentationSink,
    Transition,
};

/// Prints each frame like a transcript.
struct Transcript;

impl PresentationSink for Transcript {
    fn render(&mut self, frame: &Frame) {
        let speaker = frame.speaker_name.as_deref().unwrap_or("(history)");
        let tag = if frame.interactive { "" } else { " [replay]" };
        println!("{}{}: {}", speaker, tag, frame.text);
        for (i, option) in frame.options.iter().enumerate() {
            println!("    {}) {}", i, option);
        }
    }

    fn conversation_ended(&mut self, character: &CharacterId) {
        println!("--- {} leaves ---\n", character);
    }
}

fn main() {
    // --- Load the case ---
    let library = CharacterLibrary::builder()
        .characters_dir("case_data/tavern/characters")
        .clues("case_data/tavern/clues.ron")
        .keywords("case_data/tavern/keywords.ron")
        .build()
        .expect("Failed to load tavern case");

    let mut session = library.session(Transcript);
    session.ledger_mut().on_reveal(|clue| {
        println!("  ** Clue collected: {} ({})", clue.display_name, clue.summary);
    });

    let barkeep = library
        .get(&CharacterId::from("barkeep"))
        .expect("barkeep is part of the case");
    let hobb = library
        .get(&CharacterId::from("hobb"))
        .expect("hobb is part of the case");

    // --- Scene 1: the barkeep ---
    session.summon(barkeep.clone()).expect("barkeep is summonable");
    session.continue_dialogue().expect("b0 is linear");
    session.choose_option(1).expect("ask about the back way");

    // The text mentions the red door: click it.
    library.keywords().collect("red door", session.ledger_mut());

    // Flip back through what was said, then carry on.
    session.navigate_history(Direction::Back).expect("history has entries");
    session.resume_live();
    session.continue_dialogue().expect("back to the question list");

    // Show the knife: a single-use override.
    session.ledger_mut().reveal(&ClueId::from("knife"));
    session.show_clue(&ClueId::from("knife")).expect("knife is revealed");
    session.continue_dialogue().expect("bk0 is linear");
    session.continue_dialogue().expect("bk1 returns to the questions");

    // A second showing hits the fallback.
    session.show_clue(&ClueId::from("knife")).expect("knife is revealed");
    session.end();

    // --- Scene 2: the accounts ---
    session.summon(barkeep).expect("barkeep is summonable");
    session.ledger_mut().reveal(&ClueId::from("ledger"));
    session.show_clue(&ClueId::from("ledger")).expect("ledger is revealed");
    session.choose_option(0).expect("point out the tab");
    session.end();

    // --- Scene 3: Hobb ---
    session.summon(hobb).expect("hobb is summonable");
    session.show_clue(&ClueId::from("ledger")).expect("ledger is revealed");
    session.continue_dialogue().expect("hl0 is linear");
    let outcome = session.continue_dialogue().expect("hl1 is terminal");
    assert_eq!(outcome, Transition::Ended);

    println!("Clues collected: {}", session.ledger().revealed().len());
}
