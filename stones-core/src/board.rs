//! Node occupancy as two bitmasks.

use serde::{Deserialize, Serialize};

use crate::topology::LineKey;
use crate::{nodes_in, Cell, NodeId, Player};

/// Which player's stone sits on each node.
///
/// See the crate documentation for the encoding. Every node has exactly one
/// occupancy value: the player masks are disjoint by construction, and a
/// node in neither mask is empty.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Board {
    stones: [u64; 2],
}

impl Board {
    /// Create an empty board.
    #[inline]
    pub fn new() -> Board {
        Board { stones: [0, 0] }
    }

    /// Create a board from per-player masks. The masks must not overlap.
    #[inline]
    pub fn from_masks(one: u64, two: u64) -> Board {
        debug_assert_eq!(one & two, 0, "a node cannot hold two stones");
        Board { stones: [one, two] }
    }

    /// Stones of one player as a mask.
    #[inline]
    pub fn mask(&self, player: Player) -> u64 {
        self.stones[player.index()]
    }

    /// All occupied nodes as a mask.
    #[inline]
    pub fn occupied(&self) -> u64 {
        self.stones[0] | self.stones[1]
    }

    /// What sits on a node.
    #[inline]
    pub fn cell(&self, node: NodeId) -> Cell {
        let bit = node.bit();
        if self.stones[0] & bit != 0 {
            Cell::Stone(Player::One)
        } else if self.stones[1] & bit != 0 {
            Cell::Stone(Player::Two)
        } else {
            Cell::Empty
        }
    }

    /// Owner of the stone on a node, if any.
    #[inline]
    pub fn owner(&self, node: NodeId) -> Option<Player> {
        self.cell(node).owner()
    }

    #[inline]
    pub fn is_empty(&self, node: NodeId) -> bool {
        self.occupied() & node.bit() == 0
    }

    /// Number of stones a player has on the board.
    #[inline]
    pub fn count(&self, player: Player) -> u8 {
        self.stones[player.index()].count_ones() as u8
    }

    /// Iterate over a player's stones in index order.
    pub fn stones(&self, player: Player) -> impl Iterator<Item = NodeId> {
        nodes_in(self.stones[player.index()])
    }

    // ========== Stone Operations ==========

    /// Put a stone on an empty node.
    /// Does NOT validate - caller must ensure the node is empty.
    #[inline]
    pub fn place(&mut self, node: NodeId, player: Player) {
        debug_assert!(self.is_empty(node));
        self.stones[player.index()] |= node.bit();
    }

    /// Remove whatever stone sits on a node, returning its owner.
    pub fn remove(&mut self, node: NodeId) -> Option<Player> {
        let owner = self.owner(node)?;
        self.stones[owner.index()] &= !node.bit();
        Some(owner)
    }

    /// Move a stone from one node to an empty node.
    /// Does NOT validate - caller must ensure the move is legal.
    #[inline]
    pub fn move_stone(&mut self, from: NodeId, to: NodeId, player: Player) {
        debug_assert_eq!(self.owner(from), Some(player));
        debug_assert!(self.is_empty(to));
        self.stones[player.index()] = (self.stones[player.index()] & !from.bit()) | to.bit();
    }

    // ========== Line Detection ==========

    /// Check if a player occupies every node of a line.
    #[inline]
    pub fn completes(&self, line: LineKey, player: Player) -> bool {
        self.stones[player.index()] & line.mask() == line.mask()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_new_is_empty() {
        let board = Board::new();
        for i in 0..64 {
            assert_eq!(board.cell(NodeId(i)), Cell::Empty);
            assert!(board.is_empty(NodeId(i)));
        }
        assert_eq!(board.occupied(), 0);
    }

    #[test]
    fn test_place_and_cell() {
        let mut board = Board::new();
        board.place(NodeId(3), Player::One);
        board.place(NodeId(7), Player::Two);

        assert_eq!(board.cell(NodeId(3)), Cell::Stone(Player::One));
        assert_eq!(board.cell(NodeId(7)), Cell::Stone(Player::Two));
        assert_eq!(board.owner(NodeId(0)), None);
        assert_eq!(board.count(Player::One), 1);
        assert_eq!(board.count(Player::Two), 1);
        assert_eq!(board.occupied(), (1 << 3) | (1 << 7));
    }

    #[test]
    fn test_remove() {
        let mut board = Board::new();
        board.place(NodeId(2), Player::Two);

        assert_eq!(board.remove(NodeId(2)), Some(Player::Two));
        assert!(board.is_empty(NodeId(2)));
        assert_eq!(board.remove(NodeId(2)), None);
    }

    #[test]
    fn test_move_stone() {
        let mut board = Board::new();
        board.place(NodeId(0), Player::One);
        board.place(NodeId(1), Player::Two);

        board.move_stone(NodeId(0), NodeId(2), Player::One);

        assert!(board.is_empty(NodeId(0)));
        assert_eq!(board.owner(NodeId(2)), Some(Player::One));
        assert_eq!(board.owner(NodeId(1)), Some(Player::Two));
        assert_eq!(board.count(Player::One), 1);
    }

    #[test]
    fn test_completes_line() {
        let line = LineKey::from_nodes(&[NodeId(0), NodeId(1), NodeId(2)]);
        let mut board = Board::new();
        board.place(NodeId(0), Player::One);
        board.place(NodeId(1), Player::One);
        assert!(!board.completes(line, Player::One));

        board.place(NodeId(2), Player::Two);
        assert!(!board.completes(line, Player::One));
        assert!(!board.completes(line, Player::Two));

        board.remove(NodeId(2));
        board.place(NodeId(2), Player::One);
        assert!(board.completes(line, Player::One));
    }

    #[test]
    fn test_stones_iter() {
        let board = Board::from_masks(0b1001, 0b0110);
        assert_eq!(board.stones(Player::One).collect::<Vec<_>>(), vec![NodeId(0), NodeId(3)]);
        assert_eq!(board.stones(Player::Two).collect::<Vec<_>>(), vec![NodeId(1), NodeId(2)]);
    }
}
