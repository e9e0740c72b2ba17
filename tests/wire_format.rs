use scacchiera::{Board, Color, Game, Move, MoveId, Piece, PieceId, PieceKind, Position};
use serde_json::{json, Value};

fn pos(s: &str) -> Position {
    s.parse().unwrap()
}

#[test]
fn move_uses_camel_case_field_names() {
    let mv = Move::new(MoveId(3), PieceId(5), pos("e2"), pos("e4"));
    let value = serde_json::to_value(&mv).unwrap();
    assert_eq!(
        value,
        json!({
            "id": 3,
            "pieceId": 5,
            "origin": { "row": 6, "column": 4 },
            "destination": { "row": 4, "column": 4 },
            "capturedPieceId": null,
            "isCastle": false,
            "isPromotion": false,
            "confirmed": false
        })
    );
}

#[test]
fn move_flags_default_when_absent() {
    let mv: Move = serde_json::from_value(json!({
        "id": 9,
        "pieceId": 13,
        "origin": { "row": 1, "column": 4 },
        "destination": { "row": 3, "column": 4 },
    }))
    .unwrap();
    assert_eq!(mv, Move::new(MoveId(9), PieceId(13), pos("e7"), pos("e5")));
}

#[test]
fn piece_serializes_kind_as_type() {
    let piece = Piece::new(PieceId(17), PieceKind::Rook, Color::Black, pos("a8"));
    let value = serde_json::to_value(&piece).unwrap();
    assert_eq!(value["type"], "Rook");
    assert_eq!(value["color"], "Black");
    assert_eq!(value["neverMoved"], true);
    assert_eq!(value["captured"], false);
}

#[test]
fn board_accepts_the_legacy_history_field() {
    let board = Board::standard();
    let mut value = serde_json::to_value(&board).unwrap();
    let Value::Object(map) = &mut value else {
        panic!("board is not an object");
    };
    map.remove("moves");
    map.insert(
        "historialMovimientos".to_string(),
        json!([{
            "id": 1,
            "pieceId": 5,
            "origin": { "row": 6, "column": 4 },
            "destination": { "row": 4, "column": 4 },
        }]),
    );
    let restored: Board = serde_json::from_value(value).unwrap();
    assert_eq!(restored.moves().len(), 1);
    assert_eq!(restored.last_move().unwrap().to_string(), "e2e4");
}

#[test]
fn received_history_keeps_en_passant_available() {
    // The peer's board after 1. e4 ... 4. e5 d5 arrives as JSON; the capture
    // must be available without any locally made move.
    let mut board = Board::standard();
    let white_pawn = board.piece_at(pos("e2")).unwrap().unwrap().id;
    let black_pawn = board.piece_at(pos("d7")).unwrap().unwrap().id;
    let mut sender = Game::from_board(board.clone(), Color::White, Default::default());
    sender.join(Color::White, "ana").unwrap();
    sender.join(Color::Black, "luis").unwrap();
    sender.start().unwrap();
    for (id, to) in [
        (white_pawn, "e4"),
        (PieceId(9), "a6"),
        (white_pawn, "e5"),
        (black_pawn, "d5"),
    ] {
        sender.play(id, pos(to)).unwrap();
    }
    let json = serde_json::to_string(sender.board()).unwrap();
    board = serde_json::from_str(&json).unwrap();
    assert!(board.legal_moves_of(white_pawn).unwrap().contains(&pos("d6")));

    // Undo without local entries still restores the two-square advance
    let undone = board.undo_last_move().unwrap();
    assert_eq!(undone.to_string(), "d7d5");
    assert_eq!(board.piece(black_pawn).unwrap().position, pos("d7"));
}

#[test]
fn game_round_trips_through_json() {
    let mut game = Game::default();
    game.join(Color::White, "ana").unwrap();
    game.join(Color::Black, "luis").unwrap();
    game.start().unwrap();
    game.play(PieceId(5), pos("e4")).unwrap();

    let json = serde_json::to_string(&game).unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["turn"], "Black");
    assert_eq!(value["state"], "InProgress");
    assert_eq!(value["seats"]["white"], "ana");

    let restored: Game = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.turn(), Color::Black);
    assert_eq!(restored.ply(), 1);
    assert_eq!(restored.board().moves(), game.board().moves());
}
