use scacchiera::{
    Color, EngineError, Game, GameOptions, Move, MoveId, PieceId, PieceKind, Position,
};

fn pos(s: &str) -> Position {
    s.parse().unwrap()
}

fn started() -> Game {
    let mut game = Game::new(GameOptions::default());
    game.join(Color::White, "ana").unwrap();
    game.join(Color::Black, "luis").unwrap();
    game.start().unwrap();
    game
}

fn play(game: &mut Game, uci: &str) {
    let id = game.board().piece_at(pos(&uci[0..2])).unwrap().unwrap().id;
    game.play(id, pos(&uci[2..4])).unwrap();
}

// Italian game with captures available for both sides
fn midgame() -> Game {
    let mut game = started();
    for uci in [
        "e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6", "d2d4", "e5d4", "f3d4", "f6e4",
    ] {
        play(&mut game, uci);
    }
    game
}

#[test]
fn every_legal_move_round_trips() {
    let game = midgame();
    let moves = game.board().legal_moves_for(game.turn());
    assert!(!moves.is_empty());
    let mut captures = 0;
    for (id, dest) in moves {
        let mut copy = game.clone();
        let mv = copy.play(id, dest).unwrap();
        if mv.captured_piece_id.is_some() {
            captures += 1;
        }
        copy.undo_last_move().unwrap();
        assert_eq!(copy.board().pieces(), game.board().pieces(), "{}", mv);
        assert_eq!(copy.board().moves(), game.board().moves(), "{}", mv);
        assert_eq!(copy.turn(), game.turn());
        assert_eq!(copy.ply(), game.ply());
        assert_eq!(copy.in_check(), game.in_check());
    }
    assert!(captures > 0);
}

#[test]
fn captures_are_tombstoned_and_counted() {
    let game = midgame();
    let board = game.board();
    // d4 pawn (white) and e4 pawn (white) were taken, and the e5 pawn (black)
    assert_eq!(board.pieces().len(), 32);
    let white = board.captured_counts(Color::White);
    assert_eq!(white.get(&PieceKind::Pawn), Some(&2));
    let black = board.captured_counts(Color::Black);
    assert_eq!(black.get(&PieceKind::Pawn), Some(&1));
    assert_eq!(board.pieces_of(Color::White).count(), 14);
    assert_eq!(board.pieces_of(Color::Black).count(), 15);
}

#[test]
fn unknown_piece_is_rejected() {
    let mut game = started();
    let mv = Move::new(MoveId(1), PieceId(99), pos("e2"), pos("e4"));
    assert_eq!(game.apply_move(mv), Err(EngineError::UnknownPiece(PieceId(99))));
    assert_eq!(game.ply(), 0);
}

#[test]
fn wrong_colour_is_rejected() {
    let mut game = started();
    let before = game.board().clone();
    assert_eq!(
        game.play(PieceId(13), pos("e5")),
        Err(EngineError::NotYourTurn {
            piece: PieceId(13),
            turn: Color::White
        })
    );
    assert_eq!(game.board(), &before);
    assert_eq!(game.turn(), Color::White);
}

#[test]
fn undo_on_empty_history_fails() {
    let mut game = started();
    assert_eq!(game.undo_last_move(), Err(EngineError::NoMoveToUndo));
}

#[test]
fn illegal_destination_is_rejected_unless_validation_is_off() {
    let mut game = started();
    assert_eq!(
        game.play(PieceId(5), pos("e5")),
        Err(EngineError::IllegalMove {
            piece: PieceId(5),
            destination: pos("e5")
        })
    );

    game.options_mut().validate_moves = false;
    game.play(PieceId(5), pos("e5")).unwrap();
    assert_eq!(game.board().piece(PieceId(5)).unwrap().position, pos("e5"));
}

#[test]
fn promotion_rejects_non_pawns() {
    let mut game = started();
    let king = game.board().king(Color::White).unwrap().id;
    assert_eq!(
        game.promote(king, PieceKind::Queen),
        Err(EngineError::InvalidPromotion {
            piece: king,
            kind: PieceKind::Queen
        })
    );
    assert!(matches!(
        game.promote(PieceId(5), PieceKind::King),
        Err(EngineError::InvalidPromotion { .. })
    ));
}

#[test]
fn record_with_a_wrong_origin_is_rejected() {
    let mut game = started();
    let before = game.board().clone();
    // e2 pawn claiming to start from a1
    let mv = Move::new(MoveId(1), PieceId(5), pos("a1"), pos("e4"));
    assert_eq!(
        game.apply_move(mv),
        Err(EngineError::IllegalMove {
            piece: PieceId(5),
            destination: pos("e4")
        })
    );
    assert_eq!(game.board(), &before);
    assert_eq!(game.undo_last_move(), Err(EngineError::NoMoveToUndo));
}

#[test]
fn record_with_a_wrong_capture_is_rejected() {
    let mut game = started();
    let before = game.board().clone();
    let king = game.board().king(Color::White).unwrap().id;
    let mv = Move::new(MoveId(1), PieceId(5), pos("e2"), pos("e4")).capturing(king);
    assert!(matches!(
        game.apply_move(mv),
        Err(EngineError::IllegalMove { .. })
    ));
    assert_eq!(game.board(), &before);
    assert!(game.board().piece(king).unwrap().is_live());

    // A real capture must name its victim
    let mut game = midgame();
    let knight = game.board().piece_at(pos("d4")).unwrap().unwrap().id;
    let victim = game.board().piece_at(pos("c6")).unwrap().unwrap().id;
    let bare = Move::new(MoveId(20), knight, pos("d4"), pos("c6"));
    assert!(game.apply_move(bare.clone()).is_err());
    game.apply_move(bare.capturing(victim)).unwrap();
    assert!(game.board().piece(victim).unwrap().captured);
}

#[test]
fn undo_before_any_move_reports_empty_history() {
    let mut game = Game::default();
    assert_eq!(game.state(), scacchiera::GameState::Waiting);
    assert_eq!(game.undo_last_move(), Err(EngineError::NoMoveToUndo));
}
