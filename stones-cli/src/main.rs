//! Stones tooling
//!
//! Lists the built-in boards, replays scripted games and counts game trees.

mod cli;
mod perft;
mod replay;

use anyhow::Result;
use clap::Parser;
use stones_core::Variant;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_target(false)
        .init();

    match cli.command {
        Command::Variants => {
            print_variants();
            Ok(())
        }
        Command::Replay { board, tokens } => replay::run(board.load()?, &tokens),
        Command::Perft { board, depth } => perft::run(board.load()?, depth),
    }
}

fn print_variants() {
    let yn = |flag: bool| if flag { "yes" } else { "no" };

    println!(
        "{:<8} {:>5} {:>5} {:>6} {:>7} {:>6} {:>5} {:>5} {:>9} {:>6}",
        "Variant", "Nodes", "Lines", "Budget", "MinLeft", "Jumps", "Ban", "Extra", "BlockLoss", "Edges"
    );
    println!("{}", "-".repeat(72));
    for variant in Variant::ALL {
        let topo = variant.topology();
        let rules = topo.rules();
        let edges: u32 = topo.nodes().map(|n| topo.neighbors(n).count_ones()).sum::<u32>() / 2;
        println!(
            "{:<8} {:>5} {:>5} {:>6} {:>7} {:>6} {:>5} {:>5} {:>9} {:>6}",
            variant.name(),
            topo.node_count(),
            topo.lines().len(),
            rules.placement_budget,
            rules.min_viable_stones,
            yn(rules.allows_jump_capture),
            yn(rules.forbids_self_mill_on_placement),
            yn(rules.captures_grant_extra_action),
            yn(rules.blocked_player_loses),
            edges,
        );
    }
}
