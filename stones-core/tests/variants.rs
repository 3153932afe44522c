//! End-to-end games on the built-in boards and on custom boards.

use stones_core::{
    BoardTopology, Cell, GameEngine, GameEvent, LineKey, NodeId, OpeningStone, Phase, Player, RuleViolation,
    TopologyError, Variant, WinReason,
};

fn node(game: &GameEngine, label: &str) -> NodeId {
    game.node(label).unwrap()
}

fn place_all(game: &mut GameEngine, labels: &[&str]) {
    for label in labels {
        let n = node(game, label);
        game.place_stone(n).unwrap();
    }
}

fn slide(game: &mut GameEngine, from: &str, to: &str) {
    let (from, to) = (node(game, from), node(game, to));
    game.select_for_movement(from).unwrap();
    game.move_selected_to(to).unwrap();
}

// ========== Built-in Boards ==========

#[test]
fn test_saler_scenario() {
    let mut game = GameEngine::from_variant(Variant::Saler);
    place_all(&mut game, &["A", "B"]);
    assert_eq!(game.state().phase(), Phase::Movement);
    assert_eq!(game.state().current_player(), Player::One);

    let a = node(&game, "A");
    let c = node(&game, "C");
    game.select_for_movement(a).unwrap();
    let t = game.move_selected_to(c).unwrap();

    assert_eq!(t.state.cell(a), Cell::Empty);
    assert_eq!(t.state.cell(node(&game, "B")), Cell::Stone(Player::Two));
    assert_eq!(t.state.cell(c), Cell::Stone(Player::One));
    assert_eq!(t.state.current_player(), Player::Two);
}

#[test]
fn test_tinka_jump_needs_opponent_in_between() {
    let mut game = GameEngine::from_variant(Variant::Tinka);
    // One: 0,0 0,1 1,0. Two: 2,2 2,1 1,2.
    place_all(&mut game, &["0,0", "2,2", "0,1", "2,1", "1,0", "1,2"]);
    assert_eq!(game.state().phase(), Phase::Movement);

    let from = node(&game, "0,0");
    let to = node(&game, "0,2");
    game.select_for_movement(from).unwrap();
    assert!(game.selected_destinations().is_empty());
    assert_eq!(
        game.move_selected_to(to).unwrap_err(),
        RuleViolation::IllegalDestination { from, to }
    );
}

#[test]
fn test_tinka_jump_removes_stone_and_passes_turn() {
    let mut game = GameEngine::from_variant(Variant::Tinka);
    place_all(&mut game, &["0,0", "0,1", "1,0", "1,1", "2,2", "2,1"]);

    let from = node(&game, "0,0");
    game.select_for_movement(from).unwrap();
    let t = game.move_selected_to(node(&game, "0,2")).unwrap();

    assert_eq!(t.state.cell(node(&game, "0,1")), Cell::Empty);
    assert_eq!(t.state.current_player(), Player::Two);
    assert!(t.has(|e| matches!(e, GameEvent::TurnPassed { to: Player::Two })));
}

#[test]
fn test_lakir9_placement_mill_scenario() {
    let mut game = GameEngine::from_variant(Variant::Lakir9);
    place_all(&mut game, &["1", "10", "2", "11", "3"]);

    let expected = LineKey::from_nodes(&[node(&game, "1"), node(&game, "2"), node(&game, "3")]);
    let state = game.state();
    assert_eq!(state.phase(), Phase::CaptureSelection);
    assert_eq!(state.pending_capture(), Some(expected));
    assert_eq!(state.current_player(), Player::One);
}

#[test]
fn test_one_capture_per_mill() {
    let mut game = GameEngine::from_variant(Variant::Lakir9);
    place_all(&mut game, &["1", "10", "2", "11", "3"]);

    let t = game.resolve_capture_selection(node(&game, "10")).unwrap();
    assert_eq!(t.captures().len(), 1);
    assert_ne!(t.state.phase(), Phase::CaptureSelection);

    let err = game.resolve_capture_selection(node(&game, "11")).unwrap_err();
    assert!(matches!(
        err,
        RuleViolation::WrongPhase {
            expected: Phase::CaptureSelection,
            ..
        }
    ));
}

// ========== Rule Flags on Custom Boards ==========

fn lakir9_midgame(one: &[&str], two: &[&str]) -> GameEngine {
    let mut spec = Variant::Lakir9.spec();
    spec.rules.placement_budget = 0;
    for (labels, player) in [(one, Player::One), (two, Player::Two)] {
        spec.opening.extend(labels.iter().map(|l| OpeningStone {
            node: l.to_string(),
            player,
        }));
    }
    GameEngine::new(BoardTopology::from_spec(spec).unwrap())
}

#[test]
fn test_capture_to_minimum_ends_game() {
    let mut game = lakir9_midgame(&["1", "2", "6", "25"], &["10", "11", "14"]);
    assert_eq!(game.state().phase(), Phase::Movement);

    slide(&mut game, "6", "3");
    assert_eq!(game.state().phase(), Phase::CaptureSelection);
    let t = game.resolve_capture_selection(node(&game, "14")).unwrap();

    assert_eq!(t.state.stones_on_board(Player::Two), 2);
    assert_eq!(t.state.phase(), Phase::GameOver);
    assert_eq!(t.state.winner(), Some(Player::One));
    assert!(t.has(|e| *e
        == GameEvent::GameOver {
            winner: Player::One,
            reason: WinReason::MaterialExhausted
        }));
}

#[test]
fn test_capture_without_extra_action_passes_turn() {
    let mut spec = Variant::Lakir9.spec();
    spec.rules.captures_grant_extra_action = false;
    let mut game = GameEngine::new(BoardTopology::from_spec(spec).unwrap());
    place_all(&mut game, &["1", "10", "2", "11", "3"]);
    assert_eq!(game.state().current_player(), Player::One);

    let t = game.resolve_capture_selection(node(&game, "10")).unwrap();
    assert_eq!(t.state.phase(), Phase::Placement);
    assert_eq!(t.state.current_player(), Player::Two);
}

#[test]
fn test_budget_hand_off_after_extra_action() {
    // Tiny board: One closes A-B-C on the last placement round, captures,
    // and keeps placing while Two has nothing left.
    let json = r#"{
        "name": "hand-off",
        "nodes": ["A", "B", "C", "D", "E", "F", "G", "H"],
        "adjacency": {
            "A": ["B"], "B": ["A", "C"], "C": ["B", "D"], "D": ["C", "E"],
            "E": ["D", "F"], "F": ["E", "G"], "G": ["F", "H"], "H": ["G"]
        },
        "lines": [["A", "B", "C"]],
        "rules": {
            "placement_budget": 4,
            "min_viable_stones": 1,
            "allows_jump_capture": false,
            "forbids_self_mill_on_placement": false,
            "captures_grant_extra_action": true,
            "blocked_player_loses": false
        }
    }"#;
    let mut game = GameEngine::new(BoardTopology::from_json(json).unwrap());
    place_all(&mut game, &["A", "E", "B", "F", "C"]);
    assert_eq!(game.state().phase(), Phase::CaptureSelection);

    // One captures and places again (extra action)
    game.resolve_capture_selection(node(&game, "E")).unwrap();
    assert_eq!(game.state().current_player(), Player::One);
    place_all(&mut game, &["D"]);
    assert_eq!(game.state().current_player(), Player::Two);
    assert_eq!(game.state().stones_remaining(Player::One), 0);

    // Two places twice in a row: One has nothing left to place
    place_all(&mut game, &["G"]);
    assert_eq!(game.state().current_player(), Player::Two);
    let t = game.place_stone(node(&game, "H")).unwrap();
    assert_eq!(t.state.phase(), Phase::Movement);
    assert_eq!(t.state.current_player(), Player::One);
}

#[test]
fn test_custom_board_rejects_asymmetric_edges() {
    let json = r#"{
        "name": "broken",
        "nodes": ["A", "B"],
        "adjacency": {"A": ["B"]},
        "rules": {
            "placement_budget": 1,
            "min_viable_stones": 1,
            "allows_jump_capture": false,
            "forbids_self_mill_on_placement": false,
            "captures_grant_extra_action": false,
            "blocked_player_loses": true
        }
    }"#;
    assert_eq!(
        BoardTopology::from_json(json).unwrap_err(),
        TopologyError::AsymmetricEdge {
            from: "A".to_string(),
            to: "B".to_string()
        }
    );
}

#[test]
fn test_state_snapshot_serializes() {
    let mut game = GameEngine::from_variant(Variant::Lakir9);
    place_all(&mut game, &["1", "10", "2", "11", "3"]);
    let t = game.resolve_capture_selection(node(&game, "11")).unwrap();

    let json = serde_json::to_string(&t).unwrap();
    let back: stones_core::Transition = serde_json::from_str(&json).unwrap();
    assert_eq!(back, t);
}
