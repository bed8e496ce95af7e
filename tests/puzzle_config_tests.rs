//! Puzzle document, field decoding and history tests

use nazotet::core::{
    FieldDecodeError, FieldDecoder, GameState, History, PuzzleConfig, TextFieldDecoder,
};
use nazotet::types::{GameAction, Mino, PieceKind, RuleKind, FIELD_CELLS};

/// Comma-separated cell ids, the shape an external decoder hands back
struct CsvDecoder;

impl FieldDecoder for CsvDecoder {
    fn decode(&self, encoded: &str) -> Result<Vec<u8>, FieldDecodeError> {
        encoded
            .split(',')
            .map(|s| {
                s.trim()
                    .parse::<u8>()
                    .map_err(|e| FieldDecodeError::Malformed(e.to_string()))
            })
            .collect()
    }
}

#[test]
fn test_document_round_trip_through_engine() {
    let doc = r#"{
        "field": "GGGG.GGGGG/GGGG.GGGGG",
        "next": "tjx",
        "hold": "",
        "holdEnabled": true,
        "rules": [["TSD", "1"], ["Double", 2], ["Bogus", 5], ["Single", 0]],
        "author": "someone",
        "notes": ["no hold after the first piece"]
    }"#;
    let config = PuzzleConfig::from_json(doc).unwrap();
    let state = GameState::new(&config);

    assert_eq!(state.active().map(|p| p.kind), Some(PieceKind::T));
    assert_eq!(state.queue().to_letters(), "J");
    assert_eq!(state.goals().get(RuleKind::Tsd), 1);
    assert_eq!(state.goals().get(RuleKind::Double), 2);
    assert!(!state.goals().is_tracked(RuleKind::Single));
    assert_eq!(state.author(), Some("someone"));
    assert_eq!(state.notes().len(), 1);
    assert_eq!(state.board().get(0, 22), Some(Some(Mino::Gray)));
    assert_eq!(state.board().get(4, 21), Some(None));
}

#[test]
fn test_malformed_document_is_an_error() {
    assert!(PuzzleConfig::from_json("{\"next\": 5}").is_err());
    assert!(PuzzleConfig::from_json("not json").is_err());
}

#[test]
fn test_quiz_comment_fills_queue_and_hold() {
    let config = PuzzleConfig {
        comment: Some("#Q=[Z](S)LO".to_string()),
        ..PuzzleConfig::default()
    };
    let state = GameState::new(&config);
    assert_eq!(state.active().map(|p| p.kind), Some(PieceKind::S));
    assert_eq!(state.queue().to_letters(), "LO");
    assert_eq!(state.hold_piece(), Some(PieceKind::Z));
}

#[test]
fn test_explicit_queue_beats_quiz_comment() {
    let config = PuzzleConfig {
        comment: Some("#Q=[Z](S)LO".to_string()),
        hold_enabled: false,
        ..PuzzleConfig::with_queue("I")
    };
    let state = GameState::new(&config);
    assert_eq!(state.active().map(|p| p.kind), Some(PieceKind::I));
    assert_eq!(state.hold_piece(), None);
}

#[test]
fn test_custom_decoder() {
    let mut ids = vec!["0"; FIELD_CELLS];
    ids[22 * 10 + 9] = "8";
    let config = PuzzleConfig {
        field: Some(ids.join(",")),
        ..PuzzleConfig::with_queue("O")
    };

    let mut state = GameState::new(&PuzzleConfig::with_queue("I"));
    state.reset_with_decoder(&config, &CsvDecoder);
    assert!(state.board().is_occupied(9, 22));
    assert_eq!(state.active().map(|p| p.kind), Some(PieceKind::O));
}

#[test]
fn test_decode_failure_falls_back_to_empty_board() {
    let config = PuzzleConfig {
        field: Some("1,2,banana".to_string()),
        ..PuzzleConfig::with_queue("T")
    };
    let mut state = GameState::new(&PuzzleConfig::with_queue("I"));
    state.reset_with_decoder(&config, &CsvDecoder);

    assert!(state.board().is_empty());
    assert!(!state.game_over());
    assert_eq!(state.active().map(|p| p.kind), Some(PieceKind::T));
}

#[test]
fn test_text_decoder_errors() {
    assert!(matches!(
        TextFieldDecoder.decode("GGG"),
        Err(FieldDecodeError::RowWidth { .. })
    ));
    assert!(matches!(
        TextFieldDecoder.decode("GGGGGGGGG?"),
        Err(FieldDecodeError::UnknownChar { ch: '?', .. })
    ));
    let too_tall = vec![".........."; 24].join("/");
    assert!(matches!(
        TextFieldDecoder.decode(&too_tall),
        Err(FieldDecodeError::TooManyRows { rows: 24, .. })
    ));
}

#[test]
fn test_history_truncates_on_push() {
    let mut history = History::new();
    history.push(1);
    history.push(2);
    history.push(3);

    assert_eq!(history.undo(), Some(&2));
    assert_eq!(history.undo(), Some(&1));
    assert_eq!(history.undo(), None);
    history.push(4);

    assert_eq!(history.len(), 2);
    assert!(!history.can_redo());
    assert_eq!(history.current(), Some(&4));
    assert_eq!(history.undo(), Some(&1));
    assert_eq!(history.redo(), Some(&4));
}

#[test]
fn test_new_action_discards_redo() {
    let mut state = GameState::new(&PuzzleConfig::with_queue("IOTS"));
    state.apply_action(GameAction::HardDrop);
    state.apply_action(GameAction::HardDrop);
    assert!(state.undo());
    assert!(state.can_redo());

    state.apply_action(GameAction::MoveLeft);
    // Moves are not recorded, the redo branch survives them
    assert!(state.can_redo());

    state.apply_action(GameAction::HardDrop);
    assert!(!state.can_redo());
    assert_eq!(state.history_len(), 3);
    assert_eq!(state.queue().to_letters(), "S");
}
