//! Pure rule predicates over a topology and a board.
//!
//! Nothing here mutates state; the engine combines these checks into
//! transitions.

use crate::board::Board;
use crate::topology::{BoardTopology, LineKey};
use crate::{NodeId, Player};

/// Empty nodes as a mask.
#[inline]
pub fn empty_nodes(topology: &BoardTopology, board: &Board) -> u64 {
    topology.all_nodes() & !board.occupied()
}

/// Destinations reachable by the stone on `from`: adjacent empty nodes, plus
/// jump landings over an opponent stone when the variant allows jumps.
pub fn legal_destinations(topology: &BoardTopology, board: &Board, from: NodeId, player: Player) -> u64 {
    let empty = empty_nodes(topology, board);
    let mut destinations = topology.neighbors(from) & empty;

    if topology.rules().allows_jump_capture {
        let opponent = board.mask(player.opponent());
        for jump in topology.jumps_from(from) {
            if opponent & jump.over.bit() != 0 && empty & jump.to.bit() != 0 {
                destinations |= jump.to.bit();
            }
        }
    }

    destinations
}

/// The opponent stone jumped by moving `from` -> `to`, if the move is a
/// capturing jump. Plain adjacent moves never capture.
pub fn jump_over(topology: &BoardTopology, board: &Board, from: NodeId, to: NodeId, player: Player) -> Option<NodeId> {
    if !topology.rules().allows_jump_capture || topology.is_adjacent(from, to) {
        return None;
    }
    let opponent = player.opponent();
    topology
        .jumps_from(from)
        .iter()
        .find(|jump| jump.to == to && board.owner(jump.over) == Some(opponent))
        .map(|jump| jump.over)
}

/// Check if a player can move any stone at all.
pub fn has_any_move(topology: &BoardTopology, board: &Board, player: Player) -> bool {
    board
        .stones(player)
        .any(|from| legal_destinations(topology, board, from, player) != 0)
}

/// Check if placing on `node` would leave `player` owning a full line
/// through it. Claimed lines count too: the placement ban is about shape.
pub fn would_complete_line(topology: &BoardTopology, board: &Board, node: NodeId, player: Player) -> bool {
    let mut test = *board;
    test.place(node, player);
    topology
        .lines_through(node)
        .iter()
        .any(|&line| test.completes(line, player))
}

/// Empty nodes where `player` may place a stone.
pub fn legal_placements(topology: &BoardTopology, board: &Board, player: Player) -> u64 {
    let empty = empty_nodes(topology, board);
    if !topology.rules().forbids_self_mill_on_placement {
        return empty;
    }
    crate::nodes_in(empty)
        .filter(|&node| !would_complete_line(topology, board, node, player))
        .fold(0, |mask, node| mask | node.bit())
}

/// First unclaimed line through `node` that `player` now fully occupies.
///
/// Lines are tried in declaration order and at most one is returned, even
/// when a single stone completes several.
pub fn newly_formed_line(
    topology: &BoardTopology,
    board: &Board,
    node: NodeId,
    player: Player,
    is_claimed: impl Fn(LineKey) -> bool,
) -> Option<LineKey> {
    topology
        .lines_through(node)
        .iter()
        .copied()
        .find(|&line| !is_claimed(line) && board.completes(line, player))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variants::Variant;

    fn grid() -> BoardTopology {
        Variant::Tinka.topology()
    }

    fn at(topology: &BoardTopology, label: &str) -> NodeId {
        topology.node(label).unwrap()
    }

    #[test]
    fn test_adjacent_destinations() {
        let topo = grid();
        let mut board = Board::new();
        board.place(at(&topo, "1,1"), Player::One);

        let dest = legal_destinations(&topo, &board, at(&topo, "1,1"), Player::One);
        let expected = ["0,1", "1,0", "1,2", "2,1"]
            .iter()
            .fold(0, |m, l| m | at(&topo, l).bit());
        assert_eq!(dest, expected);
    }

    #[test]
    fn test_jump_destination_requires_opponent() {
        let topo = grid();
        let mut board = Board::new();
        board.place(at(&topo, "0,0"), Player::One);
        board.place(at(&topo, "0,1"), Player::One);

        // Own stone in the middle: no jump
        let dest = legal_destinations(&topo, &board, at(&topo, "0,0"), Player::One);
        assert_eq!(dest & at(&topo, "0,2").bit(), 0);

        board.remove(at(&topo, "0,1"));
        board.place(at(&topo, "0,1"), Player::Two);
        let dest = legal_destinations(&topo, &board, at(&topo, "0,0"), Player::One);
        assert_ne!(dest & at(&topo, "0,2").bit(), 0);
        assert_eq!(
            jump_over(&topo, &board, at(&topo, "0,0"), at(&topo, "0,2"), Player::One),
            Some(at(&topo, "0,1"))
        );
    }

    #[test]
    fn test_jump_landing_must_be_empty() {
        let topo = grid();
        let mut board = Board::new();
        board.place(at(&topo, "0,0"), Player::One);
        board.place(at(&topo, "0,1"), Player::Two);
        board.place(at(&topo, "0,2"), Player::Two);

        let dest = legal_destinations(&topo, &board, at(&topo, "0,0"), Player::One);
        assert_eq!(dest, at(&topo, "1,0").bit());
    }

    #[test]
    fn test_no_jumps_without_flag() {
        let topo = Variant::Lakir.topology();
        let mut board = Board::new();
        let a = at(&topo, "outer-tl");
        let b = at(&topo, "outer-tm");
        let c = at(&topo, "outer-tr");
        board.place(a, Player::One);
        board.place(b, Player::Two);

        assert_eq!(legal_destinations(&topo, &board, a, Player::One) & c.bit(), 0);
        assert_eq!(jump_over(&topo, &board, a, c, Player::One), None);
    }

    #[test]
    fn test_has_any_move() {
        let topo = Variant::Saler.topology();
        let mut board = Board::new();
        board.place(at(&topo, "D"), Player::One);
        board.place(at(&topo, "C"), Player::Two);

        // D's only neighbor is C
        assert!(!has_any_move(&topo, &board, Player::One));
        assert!(has_any_move(&topo, &board, Player::Two));
    }

    #[test]
    fn test_would_complete_line() {
        let topo = Variant::Lakir.topology();
        let mut board = Board::new();
        board.place(at(&topo, "outer-tl"), Player::One);
        board.place(at(&topo, "outer-tm"), Player::One);

        assert!(would_complete_line(&topo, &board, at(&topo, "outer-tr"), Player::One));
        assert!(!would_complete_line(&topo, &board, at(&topo, "outer-tr"), Player::Two));
        assert!(!would_complete_line(&topo, &board, at(&topo, "outer-rm"), Player::One));
    }

    #[test]
    fn test_legal_placements_exclude_self_mill() {
        let topo = Variant::Lakir.topology();
        let mut board = Board::new();
        board.place(at(&topo, "outer-tl"), Player::One);
        board.place(at(&topo, "outer-tm"), Player::One);

        let p1 = legal_placements(&topo, &board, Player::One);
        let p2 = legal_placements(&topo, &board, Player::Two);
        assert_eq!(p1 & at(&topo, "outer-tr").bit(), 0);
        assert_ne!(p2 & at(&topo, "outer-tr").bit(), 0);
        assert_eq!(p2.count_ones(), 22);
        assert_eq!(p1.count_ones(), 21);
    }

    #[test]
    fn test_newly_formed_line_skips_claimed() {
        let topo = Variant::Lakir.topology();
        let mut board = Board::new();
        for label in ["outer-tl", "outer-tm", "outer-tr"] {
            board.place(at(&topo, label), Player::One);
        }
        let node = at(&topo, "outer-tr");

        let line = newly_formed_line(&topo, &board, node, Player::One, |_| false);
        assert_eq!(topo.line_labels(line.unwrap()), vec!["outer-tl", "outer-tm", "outer-tr"]);

        let claimed = line.unwrap();
        assert_eq!(newly_formed_line(&topo, &board, node, Player::One, |l| l == claimed), None);
        assert_eq!(newly_formed_line(&topo, &board, node, Player::Two, |_| false), None);
    }

    #[test]
    fn test_newly_formed_line_first_in_declaration_order() {
        let topo = Variant::Lakir.topology();
        let mut board = Board::new();
        // outer-tr closes both the top row and the right column
        for label in ["outer-tl", "outer-tm", "outer-tr", "outer-rm", "outer-br"] {
            board.place(at(&topo, label), Player::Two);
        }
        let line = newly_formed_line(&topo, &board, at(&topo, "outer-tr"), Player::Two, |_| false).unwrap();
        assert_eq!(topo.line_labels(line), vec!["outer-tl", "outer-tm", "outer-tr"]);
    }
}
