//! Game-tree counter.
//!
//! Expands every legal action to a fixed depth and tallies nodes and
//! finished games per depth. Ctrl-C stops the walk and prints what was
//! counted so far.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use stones_core::{BoardTopology, GameEngine, Player};
use tracing::{debug, info};

const LOG_EVERY: u64 = 1 << 20;

#[derive(Clone, Copy, Default, Debug)]
struct Tally {
    nodes: u64,
    p1_wins: u64,
    p2_wins: u64,
}

struct Walk {
    running: Arc<AtomicBool>,
    per_depth: Vec<Tally>,
    visited: u64,
    start: Instant,
}

impl Walk {
    fn visit(&mut self, engine: &mut GameEngine, depth: usize, max_depth: usize) -> Result<()> {
        if !self.running.load(Ordering::Relaxed) {
            return Ok(());
        }

        self.visited += 1;
        if self.visited % LOG_EVERY == 0 {
            info!(
                visited = self.visited,
                rate = self.visited as f64 / self.start.elapsed().as_secs_f64(),
                "still counting"
            );
        }

        let tally = &mut self.per_depth[depth];
        tally.nodes += 1;
        match engine.state().winner() {
            Some(Player::One) => tally.p1_wins += 1,
            Some(Player::Two) => tally.p2_wins += 1,
            None => {}
        }
        if depth == max_depth || engine.state().is_over() {
            return Ok(());
        }

        let snapshot = engine.state().clone();
        for action in engine.legal_actions() {
            match engine.apply(action) {
                Ok(_) => self.visit(engine, depth + 1, max_depth)?,
                Err(err) => debug!(?action, %err, "listed action was refused"),
            }
            engine
                .rewind(snapshot.clone())
                .with_context(|| format!("restoring position at depth {depth}"))?;
        }
        Ok(())
    }
}

pub fn run(topology: BoardTopology, depth: u32) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("setting Ctrl-C handler")?;

    let mut engine = GameEngine::new(topology);
    let max_depth = depth as usize;
    info!(board = engine.topology().name(), depth, "counting game tree");

    let mut walk = Walk {
        running: running.clone(),
        per_depth: vec![Tally::default(); max_depth + 1],
        visited: 0,
        start: Instant::now(),
    };
    walk.visit(&mut engine, 0, max_depth)?;
    let elapsed = walk.start.elapsed();

    println!("{:>5} {:>14} {:>12} {:>12}", "Depth", "Nodes", "P1 wins", "P2 wins");
    println!("{}", "-".repeat(46));
    for (d, tally) in walk.per_depth.iter().enumerate() {
        println!("{:>5} {:>14} {:>12} {:>12}", d, tally.nodes, tally.p1_wins, tally.p2_wins);
    }
    println!();
    println!("Visited {} positions in {:.2}s", walk.visited, elapsed.as_secs_f64());
    if !running.load(Ordering::SeqCst) {
        println!("Interrupted: counts are partial.");
    }
    Ok(())
}
