//! Command-line interface for the stones tooling.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use stones_core::{BoardTopology, Variant};

/// Inspect boards, replay games and count game trees
#[derive(Parser, Debug)]
#[command(name = "stones")]
#[command(about = "Rule engine tooling for stone placement and capture games", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). RUST_LOG wins when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the built-in boards and their rule flags
    Variants,

    /// Play a sequence of actions and print what happened
    Replay {
        #[command(flatten)]
        board: BoardArgs,

        /// Node label to place, select or capture; `from>to` to move
        tokens: Vec<String>,
    },

    /// Count game-tree nodes and outcomes to a fixed depth
    Perft {
        #[command(flatten)]
        board: BoardArgs,

        /// Number of actions to expand
        #[arg(short, long, default_value = "4")]
        depth: u32,
    },
}

/// Which board to play on
#[derive(Args, Debug)]
pub struct BoardArgs {
    /// Built-in variant name
    #[arg(long, default_value = "saler", conflicts_with = "board")]
    pub variant: Variant,

    /// Custom board document (JSON)
    #[arg(long)]
    pub board: Option<PathBuf>,
}

impl BoardArgs {
    pub fn load(&self) -> Result<BoardTopology> {
        match &self.board {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading board document {}", path.display()))?;
                BoardTopology::from_json(&json).with_context(|| format!("loading board {}", path.display()))
            }
            None => Ok(self.variant.topology()),
        }
    }
}
