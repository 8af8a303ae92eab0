/// Interrogate: interactive shell for playing through a case's dialogue.
///
/// Usage: interrogate --case <dir_or_file> [--clues <path>] [--keywords <path>]
///
/// Commands:
///   list                list characters
///   summon <id>         call in a summonable character
///   start <id>          talk to any character
///   continue            advance a linear node
///   choose <n>          pick option n (1-based)
///   show <clue>         present a revealed clue
///   collect <term>      click a keyword in the dialogue text
///   reveal <clue>       reveal a clue directly
///   back / forward      browse history
///   resume              return to the live conversation
///   end                 end the conversation
///   history             print the conversation so far
///   clues               list revealed clues
///   help                list commands
///   quit                exit

use dialogue_engine::{
    CharacterId, CharacterLibrary, ClueId, ClueLedger, Direction, Frame, PresentationSink,
    SessionError, Transition,
};
use std::io::{self, BufRead, Write};
use std::process;
use tracing_subscriber::EnvFilter;

/// Prints frames to stdout as they arrive.
struct ConsoleSink;

impl PresentationSink for ConsoleSink {
    fn render(&mut self, frame: &Frame) {
        println!();
        if frame.mode != dialogue_engine::SessionState::Live {
            println!("  [{}]", frame.mode);
        }
        match &frame.speaker_name {
            Some(name) => println!("{}: {}", name, highlight(frame)),
            None => println!("{}", highlight(frame)),
        }
        for (i, option) in frame.options.iter().enumerate() {
            println!("  {}. {}", i + 1, option);
        }
        let mut nav = Vec::new();
        if frame.can_go_back {
            nav.push("back");
        }
        if frame.can_go_forward {
            nav.push("forward");
        }
        if !nav.is_empty() {
            println!("  ({})", nav.join(", "));
        }
    }

    fn conversation_ended(&mut self, character: &CharacterId) {
        println!("\n-- conversation with {} ended --", character);
    }
}

/// Wrap keyword occurrences in brackets.
fn highlight(frame: &Frame) -> String {
    let mut out = String::with_capacity(frame.text.len() + frame.links.len() * 2);
    let mut pos = 0;
    for link in &frame.links {
        out.push_str(&frame.text[pos..link.range.start]);
        out.push('[');
        out.push_str(&frame.text[link.range.clone()]);
        out.push(']');
        pos = link.range.end;
    }
    out.push_str(&frame.text[pos..]);
    out
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut case_dir = None;
    let mut clues_path = None;
    let mut keywords_path = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--case" if i + 1 < args.len() => {
                i += 1;
                case_dir = Some(args[i].clone());
            }
            "--clues" if i + 1 < args.len() => {
                i += 1;
                clues_path = Some(args[i].clone());
            }
            "--keywords" if i + 1 < args.len() => {
                i += 1;
                keywords_path = Some(args[i].clone());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let Some(case_dir) = case_dir else {
        eprintln!("ERROR: --case is required");
        print_usage();
        process::exit(1);
    };

    let mut builder = if std::path::Path::new(&case_dir).is_file() {
        CharacterLibrary::builder().characters_file(&case_dir)
    } else {
        CharacterLibrary::builder().characters_dir(&case_dir)
    };
    if let Some(path) = &clues_path {
        builder = builder.clues(path);
    }
    if let Some(path) = &keywords_path {
        builder = builder.keywords(path);
    }
    let library = match builder.build() {
        Ok(library) => library,
        Err(e) => {
            eprintln!("ERROR: failed to load case: {}", e);
            process::exit(1);
        }
    };

    println!(
        "Loaded {} characters, {} clues, {} keywords",
        library.characters().len(),
        library.clues().len(),
        library.keywords().len()
    );
    println!("Type 'help' for commands.\n");

    // Only collected evidence can be presented.
    let mut session = library.session(ConsoleSink).with_reveal_guard(true);
    session.ledger_mut().on_reveal(|clue| {
        println!("  * new clue: {}", clue.display_name);
    });

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("interrogate> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd.to_lowercase(), rest.trim()),
            None => (line.to_lowercase(), ""),
        };

        let result: Result<Transition, SessionError> = match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => {
                print_help();
                continue;
            }
            "list" | "ls" => {
                for character in library.characters() {
                    let marker = if character.summonable { "" } else { " (not summonable)" };
                    println!("  {}  {}{}", character.id, character.display_name, marker);
                }
                continue;
            }
            "summon" | "start" => {
                if rest.is_empty() {
                    println!("Usage: {} <character id>", cmd);
                    continue;
                }
                let Some(character) = library.get(&CharacterId::from(rest)) else {
                    println!("Unknown character: {}", rest);
                    continue;
                };
                if cmd == "summon" {
                    session.summon(character)
                } else {
                    session.start(character)
                }
            }
            "continue" | "c" | "next" => session.continue_dialogue(),
            "choose" => match rest.parse::<usize>() {
                Ok(n) if n >= 1 => session.choose_option(n - 1),
                _ => {
                    println!("Usage: choose <n>  (options are numbered from 1)");
                    continue;
                }
            },
            "show" => {
                if rest.is_empty() {
                    println!("Usage: show <clue id>");
                    continue;
                }
                session.show_clue(&ClueId::from(rest))
            }
            "collect" => {
                match library.keywords().collect(rest, session.ledger_mut()) {
                    None => println!("'{}' is not a keyword", rest),
                    Some(false) => println!("Already collected."),
                    Some(true) => {}
                }
                continue;
            }
            "reveal" => {
                if !session.ledger_mut().reveal(&ClueId::from(rest)) {
                    println!("Nothing new revealed.");
                }
                continue;
            }
            "back" | "b" => session.navigate_history(Direction::Back),
            "forward" | "f" => session.navigate_history(Direction::Forward),
            "resume" => Ok(session.resume_live()),
            "end" => {
                session.end();
                continue;
            }
            "history" => {
                for (i, entry) in session.history().entries().iter().enumerate() {
                    let marker = if entry.has_options() { " ?" } else { "" };
                    println!("  {:>3} [{}] {}{}", i, entry.node_id, entry.text, marker);
                }
                continue;
            }
            "clues" => {
                let ledger = session.ledger();
                if ledger.revealed().is_empty() {
                    println!("  (none)");
                }
                for id in ledger.revealed() {
                    let name = ledger
                        .database()
                        .get(id)
                        .map_or(id.as_str(), |c| c.display_name.as_str());
                    println!("  {}  {}", id, name);
                }
                continue;
            }
            _ => {
                println!("Unknown command: {}. Type 'help' for commands.", cmd);
                continue;
            }
        };

        match result {
            Ok(Transition::Ignored) => println!("(nothing happens)"),
            Ok(_) => {}
            Err(e) => println!("ERROR: {}", e),
        }
    }
}

fn print_usage() {
    println!("Usage: interrogate --case <dir_or_file> [--clues <path>] [--keywords <path>]");
    println!();
    println!("  --case <path>       Character .ron file or a directory of them");
    println!("  --clues <path>      Clue database .ron file");
    println!("  --keywords <path>   Keyword table .ron file");
    println!();
    println!("Set RUST_LOG=debug to trace session transitions.");
}

fn print_help() {
    println!("Commands:");
    println!("  list                list characters");
    println!("  summon <id>         call in a summonable character");
    println!("  start <id>          talk to any character");
    println!("  continue            advance a linear node");
    println!("  choose <n>          pick option n (1-based)");
    println!("  show <clue>         present a revealed clue");
    println!("  collect <term>      click a keyword in the dialogue text");
    println!("  reveal <clue>       reveal a clue directly");
    println!("  back / forward      browse history");
    println!("  resume              return to the live conversation");
    println!("  end                 end the conversation");
    println!("  history             print the conversation so far");
    println!("  clues               list revealed clues");
    println!("  help                list commands");
    println!("  quit                exit");
}
