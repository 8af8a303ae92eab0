/// History buffer integration tests: replay cursor behaviour over longer logs.

use dialogue_engine::{Cursor, HistoryBuffer, HistoryEntry, NodeId};

fn filled(len: usize) -> HistoryBuffer {
    let mut history = HistoryBuffer::new();
    for i in 0..len {
        history
            .append(HistoryEntry {
                node_id: NodeId::new(format!("n{}", i)),
                text: format!("line {}", i),
                options: Vec::new(),
            })
            .unwrap();
    }
    history
}

fn current(history: &HistoryBuffer) -> String {
    history.current().unwrap().node_id.to_string()
}

#[test]
fn back_then_forward_visits_every_entry_in_order() {
    for len in 1..8 {
        let mut history = filled(len);

        let mut seen_back = vec![current(&history)];
        while history.can_go_back() {
            assert!(history.back());
            seen_back.push(current(&history));
        }
        let expected_back: Vec<String> = (0..len).rev().map(|i| format!("n{}", i)).collect();
        assert_eq!(seen_back, expected_back, "len {}", len);

        let mut seen_forward = vec![current(&history)];
        while history.can_go_forward() {
            assert!(history.forward());
            seen_forward.push(current(&history));
        }
        let expected_forward: Vec<String> = (0..len).map(|i| format!("n{}", i)).collect();
        assert_eq!(seen_forward, expected_forward, "len {}", len);

        // Forward runs out exactly when the cursor is live again.
        assert_eq!(history.cursor(), Cursor::Live);
        assert!(!history.can_go_forward());
    }
}

#[test]
fn navigation_is_deterministic_without_appends() {
    let moves = [true, true, false, true, false, false, false, true];
    let mut a = filled(5);
    let mut b = filled(5);
    for &back in &moves {
        if back {
            a.back();
            b.back();
        } else {
            a.forward();
            b.forward();
        }
        assert_eq!(a.cursor(), b.cursor());
        assert_eq!(current(&a), current(&b));
    }
}

#[test]
fn replay_never_pins_the_last_index() {
    let mut history = filled(4);
    history.back();
    history.back();
    history.back();
    while history.can_go_forward() {
        history.forward();
        if let Cursor::Replay(index) = history.cursor() {
            assert!(index < history.len() - 1);
        }
    }
    assert!(history
        .append(HistoryEntry {
            node_id: NodeId::from("n4"),
            text: "line 4".to_string(),
            options: Vec::new(),
        })
        .is_ok());
}

#[test]
fn navigation_does_not_mutate_the_log() {
    let mut history = filled(3);
    let before = history.entries().to_vec();
    history.back();
    history.back();
    history.forward();
    history.reset_to_latest();
    assert_eq!(history.entries(), before.as_slice());
}
