//! Rule engine for two-player stone placement, movement and capture games
//! played on graph-shaped boards.
//!
//! One engine covers every board of the family: a five-node graph, a 3x3
//! grid with jump captures, and 24/25-node Morris boards. A board is data
//! (a [`BoardTopology`]); the rules that differ between games are flags in
//! [`Rules`].
//!
//! # Board Encoding
//!
//! ```text
//! Nodes are dense indices 0..n (n <= 64), in the order a board document
//! lists its labels.
//!
//! Board: two u64 occupancy masks, one per player.
//!   bit i of stones[0] set => node i holds a Player One stone
//!   bit i of stones[1] set => node i holds a Player Two stone
//!   The masks never overlap. A node in neither mask is empty.
//!
//! Adjacency: one u64 neighbor mask per node.
//!
//! Line key: u64 mask with one bit per node of the line.
//!   A line is complete for a player when (stones & line) == line.
//! ```
//!
//! # Phases
//!
//! ```text
//!   Placement ──(both budgets spent)──► Movement
//!       │  ▲                              │  ▲
//!  mill │  │ capture              mill    │  │ capture
//!       ▼  │                              ▼  │
//!   CaptureSelection ◄──────────────► CaptureSelection
//!
//!   any phase ──(material below minimum | player to move blocked)──► GameOver
//! ```

pub mod board;
pub mod engine;
pub mod error;
pub mod event;
pub mod rules;
pub mod state;
pub mod topology;
pub mod variants;

#[cfg(feature = "wasm")]
pub mod wasm;

use serde::{Deserialize, Serialize};

pub use board::Board;
pub use engine::{Action, GameEngine};
pub use error::{RuleViolation, TopologyError};
pub use event::{CaptureCause, GameEvent, Transition, WinReason};
pub use state::{GameState, Phase};
pub use topology::{BoardTopology, Jump, LineKey, OpeningStone, Rules, TopologySpec};
pub use variants::Variant;

/// Largest board the mask encoding can hold.
pub const MAX_NODES: usize = 64;

/// Player identifier.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Player {
    One = 1,
    Two = 2,
}

impl Player {
    /// Both players, in turn order.
    pub const BOTH: [Player; 2] = [Player::One, Player::Two];

    /// Get the opponent player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Array slot for per-player tables (0 or 1).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize - 1
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", *self as u8)
    }
}

/// Index of a node on the board (0..node_count).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u8);

impl NodeId {
    /// Single-bit mask for this node.
    #[inline]
    pub const fn bit(self) -> u64 {
        1u64 << self.0
    }

    /// Index as usize, for table lookups.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Iterate over the nodes of a mask in ascending index order.
pub fn nodes_in(mut mask: u64) -> impl Iterator<Item = NodeId> {
    std::iter::from_fn(move || {
        if mask == 0 {
            return None;
        }
        let idx = mask.trailing_zeros() as u8;
        mask &= mask - 1;
        Some(NodeId(idx))
    })
}

/// What sits on a node.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Stone(Player),
}

impl Cell {
    /// Owner of the stone, if any.
    #[inline]
    pub fn owner(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Stone(player) => Some(player),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_opponent() {
        assert_eq!(Player::One.opponent(), Player::Two);
        assert_eq!(Player::Two.opponent(), Player::One);
    }

    #[test]
    fn test_player_index() {
        assert_eq!(Player::One.index(), 0);
        assert_eq!(Player::Two.index(), 1);
    }

    #[test]
    fn test_node_bit() {
        assert_eq!(NodeId(0).bit(), 1);
        assert_eq!(NodeId(5).bit(), 0b100000);
        assert_eq!(NodeId(63).bit(), 1u64 << 63);
    }

    #[test]
    fn test_nodes_in_ascending() {
        let nodes: Vec<_> = nodes_in(0b1010_0110).collect();
        assert_eq!(nodes, vec![NodeId(1), NodeId(2), NodeId(5), NodeId(7)]);
        assert_eq!(nodes_in(0).count(), 0);
        assert_eq!(nodes_in(u64::MAX).count(), 64);
    }

    #[test]
    fn test_cell_owner() {
        assert_eq!(Cell::Empty.owner(), None);
        assert_eq!(Cell::Stone(Player::Two).owner(), Some(Player::Two));
    }
}
