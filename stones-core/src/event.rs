//! Events emitted by accepted engine operations.
//!
//! A renderer replays these to animate a transition and to choose sounds or
//! toasts. They carry no authority: the state snapshot in [`Transition`] is
//! the source of truth.

use serde::{Deserialize, Serialize};

use crate::state::{GameState, Phase};
use crate::topology::LineKey;
use crate::{NodeId, Player};

/// How a stone came to be removed.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum CaptureCause {
    /// Chosen by the player after forming a line.
    Mill,
    /// Jumped over by an opponent stone.
    Jump,
}

/// Why the game ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum WinReason {
    /// The loser's stones in play fell below the variant minimum.
    MaterialExhausted,
    /// The loser had to move and could not.
    Blocked,
}

/// Something that happened during a transition.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum GameEvent {
    StonePlaced { player: Player, node: NodeId },
    /// A stone was picked up; `destinations` are its legal targets.
    StoneSelected { player: Player, node: NodeId, destinations: Vec<NodeId> },
    StoneMoved { player: Player, from: NodeId, to: NodeId },
    StoneCaptured { by: Player, node: NodeId, cause: CaptureCause },
    /// A line was completed and a capture is owed.
    LineFormed { player: Player, line: LineKey },
    /// A line was spent on a capture and will never pay out again.
    LineClaimed { player: Player, line: LineKey },
    PhaseChanged { phase: Phase },
    TurnPassed { to: Player },
    GameOver { winner: Player, reason: WinReason },
    Reset,
}

/// Result of an accepted operation.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Transition {
    /// Events in the order they happened.
    pub events: Vec<GameEvent>,
    /// State after the operation.
    pub state: GameState,
}

impl Transition {
    /// Check if the transition contains an event matching a predicate.
    pub fn has(&self, pred: impl Fn(&GameEvent) -> bool) -> bool {
        self.events.iter().any(pred)
    }

    /// Nodes captured during this transition.
    pub fn captures(&self) -> Vec<NodeId> {
        self.events
            .iter()
            .filter_map(|event| match event {
                GameEvent::StoneCaptured { node, .. } => Some(*node),
                _ => None,
            })
            .collect()
    }
}
