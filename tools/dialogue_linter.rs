/// Dialogue Linter: checks a case's character files for broken graphs.
///
/// Usage: dialogue_linter <case_dir_or_file> [--clues <path>]

use dialogue_engine::schema::character::load_characters_from_ron;
use dialogue_engine::{Character, ClueDatabase, ConfigError};
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: dialogue_linter <case_dir_or_file> [--clues <path>]");
        process::exit(0);
    }

    let case_path = Path::new(&args[1]);
    let mut clues_path = None;

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--clues" && i + 1 < args.len() {
            i += 1;
            clues_path = Some(args[i].clone());
        }
        i += 1;
    }

    let mut characters = Vec::new();
    let mut load_failures = 0;
    if case_path.is_file() {
        match load_characters_from_ron(case_path) {
            Ok(loaded) => characters.extend(loaded),
            Err(e) => {
                eprintln!("ERROR: Failed to load character file: {}", e);
                process::exit(1);
            }
        }
    } else if case_path.is_dir() {
        load_characters_recursive(case_path, &mut characters, &mut load_failures);
    } else {
        eprintln!("ERROR: Path '{}' does not exist", case_path.display());
        process::exit(1);
    }

    let clues = match clues_path {
        Some(ref path) => match std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|s| ClueDatabase::parse_ron(&s).map_err(|e| e.to_string()))
        {
            Ok(db) => db,
            Err(e) => {
                eprintln!("ERROR: Failed to load clues from {}: {}", path, e);
                process::exit(1);
            }
        },
        None => ClueDatabase::default(),
    };

    println!("Loaded {} characters", characters.len());

    let (mut errors, warnings) = lint_characters(&characters, &clues);
    for _ in 0..load_failures {
        errors.push("a character file failed to load (see above)".to_string());
    }

    println!("\n=== Dialogue Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn load_characters_recursive(dir: &Path, characters: &mut Vec<Character>, failures: &mut usize) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    let mut paths: Vec<_> = entries.flatten().map(|e| e.path()).collect();
    paths.sort();
    for path in paths {
        if path.is_dir() {
            load_characters_recursive(&path, characters, failures);
        } else if path.extension().and_then(|s| s.to_str()) == Some("ron") {
            match load_characters_from_ron(&path) {
                Ok(loaded) => {
                    println!("  Loaded: {}", path.display());
                    characters.extend(loaded);
                }
                Err(e) => {
                    eprintln!("  ERROR loading {}: {}", path.display(), e);
                    *failures += 1;
                }
            }
        }
    }
}

fn lint_characters(characters: &[Character], clues: &ClueDatabase) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let mut seen = std::collections::HashSet::new();
    for character in characters {
        let id = &character.id;
        if !seen.insert(id.clone()) {
            warnings.push(format!("character '{}' is defined more than once", id));
        }

        for problem in character.validate() {
            match problem {
                ConfigError::EmptyBaseGraph(_)
                | ConfigError::DuplicateNode { .. }
                | ConfigError::DanglingReference { .. } => {
                    errors.push(format!("{}: {}", id, problem));
                }
                ConfigError::UnresolvedNode { .. } => {
                    warnings.push(format!("{}: {}", id, problem));
                }
            }
        }

        for node in character.unreachable_base_nodes() {
            warnings.push(format!("{}: base node '{}' is unreachable", id, node));
        }

        for entry in &character.clue_dialogues {
            if entry.dialogue.is_empty() {
                warnings.push(format!(
                    "{}: override for clue '{}' is empty and will never play",
                    id, entry.clue
                ));
            }
            if !clues.is_empty() && !clues.contains(&entry.clue) {
                warnings.push(format!(
                    "{}: override keyed to unknown clue '{}'",
                    id, entry.clue
                ));
            }
        }

        if character.fallback.is_empty() {
            warnings.push(format!(
                "{}: no fallback dialogue; unrecognised clues are ignored",
                id
            ));
        }
    }

    (errors, warnings)
}
