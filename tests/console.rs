use scacchiera::console::{process_line, Console};
use scacchiera::{Color, GameOptions, GameState, PieceKind, StalematePolicy};

fn console() -> Console {
    Console::new(GameOptions::default()).unwrap()
}

#[test]
fn move_and_undo_flow() {
    let mut c = console();
    assert_eq!(process_line("move e2e4", &mut c), vec!["ok e2e4"]);
    assert_eq!(c.game().turn(), Color::Black);
    assert_eq!(process_line("confirm", &mut c), vec!["ok confirmed"]);
    assert!(process_line("confirm", &mut c)[0].starts_with("error"));
    assert_eq!(process_line("undo", &mut c), vec!["undone e2e4"]);
    assert_eq!(c.game().turn(), Color::White);
    assert!(process_line("undo", &mut c)[0].starts_with("error"));
}

#[test]
fn moves_lists_destinations() {
    let mut c = console();
    assert_eq!(process_line("moves e2", &mut c), vec!["moves e2: e3 e4"]);
    assert_eq!(process_line("moves e4", &mut c), vec!["error no piece on e4"]);
}

#[test]
fn illegal_and_out_of_turn_moves_are_reported() {
    let mut c = console();
    assert!(process_line("move e2e5", &mut c)[0].starts_with("error"));
    assert!(process_line("move e7e5", &mut c)[0].starts_with("error"));
    assert_eq!(c.game().ply(), 0);
    assert!(process_line("move e9e4", &mut c)[0].starts_with("error malformed"));
    assert_eq!(
        process_line("castle", &mut c),
        vec!["error unknown command: castle"]
    );
}

#[test]
fn fools_mate_reports_the_result() {
    let mut c = console();
    process_line("move f2f3", &mut c);
    process_line("move e7e5", &mut c);
    process_line("move g2g4", &mut c);
    assert_eq!(
        process_line("move d8h4", &mut c),
        vec!["ok d8h4", "result black wins (Checkmate)"]
    );
    assert_eq!(c.game().state(), GameState::Finished);
}

#[test]
fn check_is_announced() {
    let mut c = console();
    for line in ["move e2e4", "move f7f6", "move d1h5"] {
        process_line(line, &mut c);
    }
    // h5-e8 diagonal: f7 vacated, g6 empty
    let out = process_line("board", &mut c);
    assert_eq!(out.last().map(String::as_str), Some("turn black"));
    assert!(c.game().in_check());
    assert_eq!(process_line("move a7a6", &mut c).len(), 1);
    assert!(process_line("move g7g6", &mut c).contains(&"ok g7g6".to_string()));
}

#[test]
fn draw_offers_from_both_sides_end_the_game() {
    let mut c = console();
    assert_eq!(
        process_line("draw offer white", &mut c),
        vec!["ok white offers a draw"]
    );
    assert_eq!(
        process_line("draw offer black", &mut c),
        vec!["ok black offers a draw", "result draw (DrawAgreed)"]
    );
    assert_eq!(process_line("new", &mut c), vec!["ok new game"]);
    assert_eq!(c.game().state(), GameState::InProgress);
}

#[test]
fn resign_and_abandon() {
    let mut c = console();
    assert_eq!(
        process_line("resign white", &mut c),
        vec!["result black wins (Resignation)"]
    );
    process_line("new", &mut c);
    assert_eq!(
        process_line("abandon black", &mut c),
        vec!["result white wins (Abandonment)"]
    );
}

#[test]
fn setoption_carries_into_new_games() {
    let mut c = console();
    assert_eq!(
        process_line("setoption name Stalemate value draw", &mut c),
        vec!["option Stalemate = draw"]
    );
    assert_eq!(c.game().options().stalemate, StalematePolicy::Draw);
    process_line("new", &mut c);
    assert_eq!(c.game().options().stalemate, StalematePolicy::Draw);
    assert!(process_line("setoption name Hash value 16", &mut c)[0].starts_with("error"));
}

#[test]
fn underpromotion_from_the_move_suffix() {
    let mut c = console();
    // Walk the b-pawn through to b8, taking on a7... via a quick capture chain
    for line in [
        "move b2b4", "move a7a5", "move b4a5", "move b7b6", "move a5b6", "move h7h6",
        "move b6c7", "move h6h5",
    ] {
        assert!(process_line(line, &mut c)[0].starts_with("ok"), "{line}");
    }
    let out = process_line("move c7b8n", &mut c);
    assert_eq!(out[0], "ok c7b8");
    let b8 = c.game().board().piece_at("b8".parse().unwrap()).unwrap().unwrap();
    assert_eq!(b8.kind, PieceKind::Knight);
    assert_eq!(b8.color, Color::White);
}

#[test]
fn status_is_json() {
    let mut c = console();
    let out = process_line("status", &mut c);
    let json = out[0].strip_prefix("status ").unwrap();
    let value: serde_json::Value = serde_json::from_str(json).unwrap();
    assert_eq!(value["turn"], "White");
}

#[test]
fn quit_stops_the_loop() {
    let mut c = console();
    assert!(process_line("quit", &mut c).is_empty());
    assert!(!c.is_running());
}
