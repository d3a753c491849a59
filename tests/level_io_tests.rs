// Integration tests for the level text format
//
// Covers:
// - Save-then-load round trip preserves dimensions, spawns and terrain
// - Malformed level data is rejected with a descriptive error and the
//   running match is left exactly as it was

use bomber_arena::config::Config;
use bomber_arena::game::{ControlMode, Game};

fn human_game(width: i32, height: i32, seed: u64) -> Game {
    Game::with_seed(
        width,
        height,
        [ControlMode::Human, ControlMode::Human],
        Config::default_hardcoded(),
        seed,
    )
    .unwrap()
}

#[test]
fn test_generated_board_round_trips_through_level_text() {
    let game = human_game(15, 13, 99);
    let saved = game.save_level();

    let mut other = human_game(9, 9, 1);
    other.load_level(&saved).expect("saved level should load");

    assert_eq!(other.save_level(), saved, "terrain survives the round trip");
    let view = other.snapshot(0);
    assert_eq!(view.width, 15);
    assert_eq!(view.height, 13);
}

#[test]
fn test_all_supported_sizes_round_trip() {
    for (w, h) in [(9, 9), (15, 13), (21, 21)] {
        let game = human_game(w, h, 7);
        let saved = game.save_level();
        let mut other = human_game(9, 9, 2);
        other
            .load_level(&saved)
            .unwrap_or_else(|e| panic!("{}x{} level failed to load: {}", w, h, e));
        assert_eq!(other.save_level(), saved);
    }
}

#[test]
fn test_malformed_levels_are_rejected_without_side_effects() {
    let mut game = human_game(15, 13, 42);
    let before = serde_json::to_string(&game.snapshot(0)).unwrap();

    let malformed = [
        // Empty input
        "",
        // Non-numeric header
        "a,b\n1,1,3,3\n",
        // Header field count
        "15\n1,1,13,11\n",
        // Spawn line with three fields
        "15,13\n1,1,13\n",
        // Header says 13 rows, file has 2
        "15,13\n1,1,13,11\n1,1,1,1,1,1,1,1,1,1,1,1,1,1,1\n1,0,0,0,0,0,0,0,0,0,0,0,0,0,1\n",
        // Row width mismatch
        "3,3\n1,1,1,1\n1,1,1\n1,0\n1,1,1\n",
        // Unknown cell code
        "3,3\n1,1,1,1\n1,1,1\n1,9,1\n1,1,1\n",
        // Spawn out of bounds
        "3,3\n5,5,1,1\n1,1,1\n1,0,1\n1,1,1\n",
    ];

    for text in malformed {
        let result = game.load_level(text);
        assert!(result.is_err(), "input {:?} should be rejected", text);
        assert!(
            !result.unwrap_err().is_empty(),
            "error message should describe the problem"
        );
    }

    let after = serde_json::to_string(&game.snapshot(0)).unwrap();
    assert_eq!(before, after, "failed loads must not touch the match state");
}

#[test]
fn test_loading_a_level_restarts_the_match() {
    let mut game = human_game(15, 13, 3);

    // Arm a bomb mid-match, then swap the level in
    game.handle_bomb_request(0);
    game.update(10);
    assert_eq!(game.snapshot(10).bombs.len(), 1);

    let fresh = human_game(11, 11, 4).save_level();
    game.load_level(&fresh).unwrap();

    let view = game.snapshot(20);
    assert_eq!(view.bombs.len(), 0, "live bombs do not survive a level load");
    assert_eq!(view.width, 11);
    assert_eq!(view.scores, vec![0, 0]);
    assert!(view.running);
    assert_eq!(view.players[0].active_bombs, 0);
}
