//! Rejections reported by the engine and the topology loader.
//!
//! None of these are crashes. A [`RuleViolation`] means the requested action
//! was illegal and the game state was left untouched.

use crate::state::Phase;
use crate::NodeId;

/// Why an engine operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum RuleViolation {
    /// The node index is not on this board.
    #[display("Node {} does not exist on this board", node)]
    UnknownNode { node: NodeId },

    /// The placement or move target already holds a stone.
    #[display("Node {} is already occupied", node)]
    OccupiedNode { node: NodeId },

    /// The stone at the node does not belong to the player to move.
    #[display("Node {} does not hold a stone of the player to move", node)]
    NotCurrentPlayersStone { node: NodeId },

    /// The destination is neither adjacent nor a valid jump.
    #[display("Cannot move from {} to {}", from, to)]
    IllegalDestination { from: NodeId, to: NodeId },

    /// The operation is not allowed in the current phase.
    #[display("Expected {:?} phase, game is in {:?}", expected, actual)]
    WrongPhase { expected: Phase, actual: Phase },

    /// Placing here would complete a line, which this variant forbids.
    #[display("Placing on {} would complete a line", node)]
    ForbiddenSelfMill { node: NodeId },

    /// The capture target is not an opponent stone.
    #[display("Node {} does not hold an opponent stone", node)]
    InvalidCaptureTarget { node: NodeId },

    /// A move was requested with no stone selected.
    #[display("No stone is selected")]
    NoStoneSelected,

    /// The player to move has no stones left to place.
    #[display("No stones left to place")]
    NoStonesRemaining,

    /// The game is over; only reset is accepted.
    #[display("Game is already over")]
    GameAlreadyOver,

    /// A snapshot handed to rewind does not fit this board.
    #[display("Snapshot does not belong to this board")]
    ForeignSnapshot,
}

impl std::error::Error for RuleViolation {}

/// Why a board description was refused.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum TopologyError {
    #[display("Board has no nodes")]
    Empty,

    #[display("Board has {} nodes, at most {} are supported", count, max)]
    TooManyNodes { count: usize, max: usize },

    #[display("Node label {:?} appears more than once", label)]
    DuplicateLabel { label: String },

    #[display("Unknown node label {:?}", label)]
    UnknownLabel { label: String },

    #[display("Node {:?} lists itself as a neighbor", label)]
    SelfLoop { label: String },

    #[display("{:?} lists {:?} as a neighbor but not the reverse", from, to)]
    AsymmetricEdge { from: String, to: String },

    #[display("Line {:?} must hold at least two distinct nodes", labels)]
    DegenerateLine { labels: Vec<String> },

    #[display("Jump {:?} over {:?} to {:?} is not a straight adjacent hop", from, over, to)]
    InvalidJump { from: String, over: String, to: String },

    #[display("Opening stone on {:?} is listed twice", label)]
    DuplicateOpeningStone { label: String },

    #[display("Placement budget {} per player does not fit on {} nodes", budget, nodes)]
    BudgetTooLarge { budget: u8, nodes: usize },

    #[display("Malformed board document: {}", message)]
    Parse { message: String },
}

impl std::error::Error for TopologyError {}

impl From<serde_json::Error> for TopologyError {
    fn from(err: serde_json::Error) -> Self {
        TopologyError::Parse {
            message: err.to_string(),
        }
    }
}
