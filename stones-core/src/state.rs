//! The full mutable state of one match.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::topology::{BoardTopology, LineKey};
use crate::{Cell, NodeId, Player};

/// Where the match stands.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Players drop stones from their budget onto empty nodes.
    Placement,
    /// Players slide (or jump) stones already on the board.
    Movement,
    /// The player to move formed a line and must pick an opponent stone.
    CaptureSelection,
    /// Absorbing; only reset leaves it.
    GameOver,
}

/// Snapshot of a match. Only the engine mutates it.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct GameState {
    pub(crate) board: Board,
    pub(crate) current_player: Player,
    pub(crate) phase: Phase,
    pub(crate) remaining: [u8; 2],
    pub(crate) on_board: [u8; 2],
    /// Stones each player has lost to captures.
    pub(crate) captured: [u8; 2],
    pub(crate) selected: Option<NodeId>,
    pub(crate) pending_capture: Option<LineKey>,
    pub(crate) claimed: [BTreeSet<LineKey>; 2],
    pub(crate) winner: Option<Player>,
}

impl GameState {
    /// Starting position for a board: opening stones down, full budgets,
    /// Player One to move.
    pub fn initial(topology: &BoardTopology) -> GameState {
        let board = Board::from_masks(topology.opening(Player::One), topology.opening(Player::Two));
        let budget = topology.rules().placement_budget;
        GameState {
            board,
            current_player: Player::One,
            phase: if budget > 0 { Phase::Placement } else { Phase::Movement },
            remaining: [budget, budget],
            on_board: [board.count(Player::One), board.count(Player::Two)],
            captured: [0, 0],
            selected: None,
            pending_capture: None,
            claimed: [BTreeSet::new(), BTreeSet::new()],
            winner: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cell(&self, node: NodeId) -> Cell {
        self.board.cell(node)
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Stones a player still has to place.
    pub fn stones_remaining(&self, player: Player) -> u8 {
        self.remaining[player.index()]
    }

    /// Stones a player has on the board, tracked incrementally.
    pub fn stones_on_board(&self, player: Player) -> u8 {
        self.on_board[player.index()]
    }

    /// Stones a player has lost to captures.
    pub fn stones_captured(&self, player: Player) -> u8 {
        self.captured[player.index()]
    }

    /// Stones still in play for a player: on the board or waiting to be placed.
    pub fn material(&self, player: Player) -> u8 {
        self.remaining[player.index()] + self.on_board[player.index()]
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Line that earned the pending capture.
    pub fn pending_capture(&self) -> Option<LineKey> {
        self.pending_capture
    }

    /// Lines a player has already used for a capture.
    pub fn claimed_lines(&self, player: Player) -> &BTreeSet<LineKey> {
        &self.claimed[player.index()]
    }

    /// Check if either player has claimed a line.
    pub fn is_claimed(&self, line: LineKey) -> bool {
        self.claimed.iter().any(|set| set.contains(&line))
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Check that the incremental counters agree with the board and that
    /// no line is claimed twice.
    pub fn is_consistent(&self) -> bool {
        let counts_match = Player::BOTH
            .iter()
            .all(|&p| self.on_board[p.index()] == self.board.count(p));
        let disjoint_claims = self.claimed[0].is_disjoint(&self.claimed[1]);
        let disjoint_masks = self.board.mask(Player::One) & self.board.mask(Player::Two) == 0;
        counts_match && disjoint_claims && disjoint_masks
    }
}
