//! Replay a token sequence and print the resulting events and board.
//!
//! Tokens:
//!   `C`      place on C during placement, capture C during capture selection
//!   `A>C`    move the stone on A to C (movement only)

use anyhow::{anyhow, bail, Result};
use stones_core::{Action, BoardTopology, Cell, GameEngine, GameEvent, Phase, Player, Transition};
use tracing::debug;

/// Turn one token into an engine call for the current phase.
fn parse_token(engine: &GameEngine, token: &str) -> Result<Action> {
    let node = |label: &str| {
        engine
            .node(label.trim())
            .ok_or_else(|| anyhow!("unknown node {:?} on board {}", label, engine.topology().name()))
    };

    if let Some((from, to)) = token.split_once('>') {
        return Ok(Action::Move {
            from: node(from)?,
            to: node(to)?,
        });
    }

    let target = node(token)?;
    match engine.state().phase() {
        Phase::Placement => Ok(Action::Place(target)),
        Phase::CaptureSelection => Ok(Action::Capture(target)),
        Phase::Movement => bail!("movement needs `from>to`, got {:?}", token),
        Phase::GameOver => bail!("game is already over at {:?}", token),
    }
}

pub fn run(topology: BoardTopology, tokens: &[String]) -> Result<()> {
    let mut engine = GameEngine::new(topology);
    println!("Board: {}", engine.topology().name());
    println!();

    for (i, token) in tokens.iter().enumerate() {
        let action = parse_token(&engine, token)?;
        debug!(?action, "replaying");
        match engine.apply(action) {
            Ok(transition) => print_transition(&engine, i + 1, token, &transition),
            Err(err) => bail!("action {} ({}) rejected: {}", i + 1, token, err),
        }
    }

    println!();
    print_board(&engine);
    Ok(())
}

fn print_transition(engine: &GameEngine, step: usize, token: &str, transition: &Transition) {
    println!("{:>3}. {}", step, token);
    for event in &transition.events {
        println!("       {}", describe(engine.topology(), event));
    }
}

fn describe(topo: &BoardTopology, event: &GameEvent) -> String {
    let label = |n| topo.label(n);
    match event {
        GameEvent::StonePlaced { player, node } => format!("{player} placed on {}", label(*node)),
        GameEvent::StoneSelected { player, node, destinations } => {
            let to: Vec<&str> = destinations.iter().map(|&n| label(n)).collect();
            format!("{player} selected {} (can reach {})", label(*node), to.join(", "))
        }
        GameEvent::StoneMoved { player, from, to } => {
            format!("{player} moved {} -> {}", label(*from), label(*to))
        }
        GameEvent::StoneCaptured { by, node, cause } => {
            format!("{by} captured {} ({cause:?})", label(*node))
        }
        GameEvent::LineFormed { player, line } => {
            format!("{player} formed line {}", topo.line_labels(*line).join("-"))
        }
        GameEvent::LineClaimed { player, line } => {
            format!("{player} claimed line {}", topo.line_labels(*line).join("-"))
        }
        GameEvent::PhaseChanged { phase } => format!("phase: {phase:?}"),
        GameEvent::TurnPassed { to } => format!("turn: {to}"),
        GameEvent::GameOver { winner, reason } => format!("{winner} wins ({reason:?})"),
        GameEvent::Reset => "reset".to_string(),
    }
}

fn print_board(engine: &GameEngine) {
    let state = engine.state();
    let topo = engine.topology();

    let cells: Vec<String> = topo
        .nodes()
        .map(|n| {
            let mark = match state.cell(n) {
                Cell::Empty => '.',
                Cell::Stone(Player::One) => 'X',
                Cell::Stone(Player::Two) => 'O',
            };
            format!("{}:{}", topo.label(n), mark)
        })
        .collect();
    println!("{}", cells.join(" "));

    for player in Player::BOTH {
        println!(
            "{player}: {} on board, {} to place, {} lost",
            state.stones_on_board(player),
            state.stones_remaining(player),
            state.stones_captured(player),
        );
    }
    match state.winner() {
        Some(winner) => println!("Result: {winner} wins"),
        None => println!("Phase: {:?}, {} to move", state.phase(), state.current_player()),
    }
}
