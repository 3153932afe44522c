//! The game engine: the only thing allowed to change a [`GameState`].
//!
//! Every operation validates first, builds the next state on a copy, and
//! commits only when the whole transition succeeded. A rejected call leaves
//! the state exactly as it was.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

use crate::error::RuleViolation;
use crate::event::{CaptureCause, GameEvent, Transition, WinReason};
use crate::rules;
use crate::state::{GameState, Phase};
use crate::topology::{BoardTopology, LineKey, Rules};
use crate::variants::Variant;
use crate::{nodes_in, NodeId, Player};

/// One player action, for callers that drive the engine generically.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Place a stone from the budget.
    Place(NodeId),
    /// Select the stone on `from` and move it to `to`.
    Move { from: NodeId, to: NodeId },
    /// Remove an opponent stone after forming a line.
    Capture(NodeId),
}

fn rejected(err: RuleViolation) -> RuleViolation {
    debug!(%err, "action rejected");
    err
}

/// Rule engine for one match on one board.
#[derive(Clone, Debug)]
pub struct GameEngine {
    topology: BoardTopology,
    state: GameState,
}

impl GameEngine {
    /// Start a match on a board.
    pub fn new(topology: BoardTopology) -> GameEngine {
        let state = GameState::initial(&topology);
        GameEngine { topology, state }
    }

    /// Start a match on a built-in board.
    pub fn from_variant(variant: Variant) -> GameEngine {
        GameEngine::new(variant.topology())
    }

    pub fn topology(&self) -> &BoardTopology {
        &self.topology
    }

    pub fn rules(&self) -> &Rules {
        self.topology.rules()
    }

    /// Current state. Read-only; change it through the operations below.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Find a node by label.
    pub fn node(&self, label: &str) -> Option<NodeId> {
        self.topology.node(label)
    }

    // ========== Operations ==========

    /// Place a stone for the player to move.
    #[instrument(level = "debug", skip(self), fields(player = %self.state.current_player))]
    pub fn place_stone(&mut self, node: NodeId) -> Result<Transition, RuleViolation> {
        self.check_placement(node).map_err(rejected)?;

        let player = self.state.current_player;
        let mut next = self.state.clone();
        let mut events = Vec::new();

        next.board.place(node, player);
        next.remaining[player.index()] -= 1;
        next.on_board[player.index()] += 1;
        events.push(GameEvent::StonePlaced { player, node });

        let rewards_mills = !self.rules().forbids_self_mill_on_placement;
        if !(rewards_mills && self.enter_capture(&mut next, node, &mut events)) {
            self.pass_turn(&mut next, &mut events);
        }

        Ok(self.commit(next, events))
    }

    /// Pick up one of the mover's stones and expose its legal destinations.
    ///
    /// Selecting a different stone replaces the selection; selecting the
    /// stone already held changes nothing.
    #[instrument(level = "debug", skip(self), fields(player = %self.state.current_player))]
    pub fn select_for_movement(&mut self, node: NodeId) -> Result<Transition, RuleViolation> {
        self.check_selection(node).map_err(rejected)?;

        if self.state.selected == Some(node) {
            return Ok(Transition {
                events: Vec::new(),
                state: self.state.clone(),
            });
        }

        let player = self.state.current_player;
        let mut next = self.state.clone();
        next.selected = Some(node);
        let destinations = self.legal_destinations(node);
        let events = vec![GameEvent::StoneSelected {
            player,
            node,
            destinations,
        }];

        Ok(self.commit(next, events))
    }

    /// Move the selected stone, capturing a jumped stone where the variant
    /// allows jumps.
    #[instrument(level = "debug", skip(self), fields(player = %self.state.current_player))]
    pub fn move_selected_to(&mut self, destination: NodeId) -> Result<Transition, RuleViolation> {
        let from = self.check_move(destination).map_err(rejected)?;

        let player = self.state.current_player;
        let opponent = player.opponent();
        let jumped = rules::jump_over(&self.topology, &self.state.board, from, destination, player);
        let mut next = self.state.clone();
        let mut events = Vec::new();

        next.board.move_stone(from, destination, player);
        next.selected = None;
        events.push(GameEvent::StoneMoved {
            player,
            from,
            to: destination,
        });

        if let Some(over) = jumped {
            next.board.remove(over);
            next.on_board[opponent.index()] -= 1;
            next.captured[opponent.index()] += 1;
            events.push(GameEvent::StoneCaptured {
                by: player,
                node: over,
                cause: CaptureCause::Jump,
            });
        }

        // A formed line holds the turn until the capture is resolved.
        let owes_capture = self.enter_capture(&mut next, destination, &mut events);
        if !owes_capture && jumped.is_some() && self.rules().captures_grant_extra_action {
            // The jumped node is adjacent to the landing and now empty.
            let onward = rules::legal_destinations(&self.topology, &next.board, destination, player);
            debug_assert_ne!(onward, 0);
            next.selected = Some(destination);
            events.push(GameEvent::StoneSelected {
                player,
                node: destination,
                destinations: nodes_in(onward).collect(),
            });
        } else if !owes_capture {
            self.pass_turn(&mut next, &mut events);
        }

        Ok(self.commit(next, events))
    }

    /// Remove the chosen opponent stone and spend the line that earned it.
    #[instrument(level = "debug", skip(self), fields(player = %self.state.current_player))]
    pub fn resolve_capture_selection(&mut self, target: NodeId) -> Result<Transition, RuleViolation> {
        self.check_capture(target).map_err(rejected)?;

        let player = self.state.current_player;
        let opponent = player.opponent();
        let mut next = self.state.clone();
        let mut events = Vec::new();

        next.board.remove(target);
        next.on_board[opponent.index()] -= 1;
        next.captured[opponent.index()] += 1;
        events.push(GameEvent::StoneCaptured {
            by: player,
            node: target,
            cause: CaptureCause::Mill,
        });

        if let Some(line) = next.pending_capture.take() {
            next.claimed[player.index()].insert(line);
            events.push(GameEvent::LineClaimed { player, line });
        }

        // Back to whichever phase the line was formed in.
        next.phase = if next.remaining.iter().any(|&r| r > 0) {
            Phase::Placement
        } else {
            Phase::Movement
        };
        events.push(GameEvent::PhaseChanged { phase: next.phase });

        let can_place_again = next.phase != Phase::Placement || next.remaining[player.index()] > 0;
        if !(self.rules().captures_grant_extra_action && can_place_again) {
            self.pass_turn(&mut next, &mut events);
        }

        Ok(self.commit(next, events))
    }

    /// Throw the match away and start over. Always succeeds.
    #[instrument(level = "debug", skip(self))]
    pub fn reset(&mut self) -> Transition {
        self.state = GameState::initial(&self.topology);
        Transition {
            events: vec![GameEvent::Reset],
            state: self.state.clone(),
        }
    }

    /// Return to an earlier snapshot of this match.
    ///
    /// Snapshots taken on another board, or whose counters disagree with
    /// this board's stone supply, are refused.
    pub fn rewind(&mut self, snapshot: GameState) -> Result<(), RuleViolation> {
        if !self.fits(&snapshot) {
            return Err(rejected(RuleViolation::ForeignSnapshot));
        }
        self.state = snapshot;
        Ok(())
    }

    /// Apply an [`Action`]. A move selects its source first; if the move is
    /// then refused, the earlier selection is rolled back too.
    pub fn apply(&mut self, action: Action) -> Result<Transition, RuleViolation> {
        match action {
            Action::Place(node) => self.place_stone(node),
            Action::Capture(node) => self.resolve_capture_selection(node),
            Action::Move { from, to } => {
                let before = self.state.clone();
                let selection = self.select_for_movement(from)?;
                match self.move_selected_to(to) {
                    Ok(mut transition) => {
                        let mut events = selection.events;
                        events.append(&mut transition.events);
                        transition.events = events;
                        Ok(transition)
                    }
                    Err(err) => {
                        self.state = before;
                        Err(err)
                    }
                }
            }
        }
    }

    // ========== Queries ==========

    /// Legal destinations for the stone on `from`, owned by the player to move.
    pub fn legal_destinations(&self, from: NodeId) -> Vec<NodeId> {
        if !self.topology.contains(from) || self.state.board.owner(from) != Some(self.state.current_player) {
            return Vec::new();
        }
        let mask = rules::legal_destinations(&self.topology, &self.state.board, from, self.state.current_player);
        nodes_in(mask).collect()
    }

    /// Legal destinations of the selected stone, if any.
    pub fn selected_destinations(&self) -> Vec<NodeId> {
        match self.state.selected {
            Some(from) if self.state.phase == Phase::Movement => self.legal_destinations(from),
            _ => Vec::new(),
        }
    }

    /// Nodes where the player to move may place a stone right now.
    pub fn legal_placements(&self) -> Vec<NodeId> {
        if self.state.phase != Phase::Placement || self.state.stones_remaining(self.state.current_player) == 0 {
            return Vec::new();
        }
        let mask = rules::legal_placements(&self.topology, &self.state.board, self.state.current_player);
        nodes_in(mask).collect()
    }

    /// Opponent stones that may be taken during capture selection.
    pub fn capturable_stones(&self) -> Vec<NodeId> {
        if self.state.phase != Phase::CaptureSelection {
            return Vec::new();
        }
        self.state
            .board
            .stones(self.state.current_player.opponent())
            .collect()
    }

    /// Every action the player to move could take.
    pub fn legal_actions(&self) -> Vec<Action> {
        match self.state.phase {
            Phase::Placement => self.legal_placements().into_iter().map(Action::Place).collect(),
            Phase::Movement => {
                let player = self.state.current_player;
                self.state
                    .board
                    .stones(player)
                    .flat_map(|from| {
                        let mask = rules::legal_destinations(&self.topology, &self.state.board, from, player);
                        nodes_in(mask).map(move |to| Action::Move { from, to })
                    })
                    .collect()
            }
            Phase::CaptureSelection => self.capturable_stones().into_iter().map(Action::Capture).collect(),
            Phase::GameOver => Vec::new(),
        }
    }

    // ========== Preconditions ==========

    fn check_common(&self, node: NodeId, phase: Phase) -> Result<(), RuleViolation> {
        if self.state.phase == Phase::GameOver {
            return Err(RuleViolation::GameAlreadyOver);
        }
        if !self.topology.contains(node) {
            return Err(RuleViolation::UnknownNode { node });
        }
        if self.state.phase != phase {
            return Err(RuleViolation::WrongPhase {
                expected: phase,
                actual: self.state.phase,
            });
        }
        Ok(())
    }

    fn check_placement(&self, node: NodeId) -> Result<(), RuleViolation> {
        self.check_common(node, Phase::Placement)?;
        let player = self.state.current_player;
        if !self.state.board.is_empty(node) {
            return Err(RuleViolation::OccupiedNode { node });
        }
        if self.state.stones_remaining(player) == 0 {
            return Err(RuleViolation::NoStonesRemaining);
        }
        if self.rules().forbids_self_mill_on_placement
            && rules::would_complete_line(&self.topology, &self.state.board, node, player)
        {
            return Err(RuleViolation::ForbiddenSelfMill { node });
        }
        Ok(())
    }

    fn check_selection(&self, node: NodeId) -> Result<(), RuleViolation> {
        self.check_common(node, Phase::Movement)?;
        if self.state.board.owner(node) != Some(self.state.current_player) {
            return Err(RuleViolation::NotCurrentPlayersStone { node });
        }
        Ok(())
    }

    /// Returns the source of the move.
    fn check_move(&self, destination: NodeId) -> Result<NodeId, RuleViolation> {
        self.check_common(destination, Phase::Movement)?;
        let from = self.state.selected.ok_or(RuleViolation::NoStoneSelected)?;
        if !self.state.board.is_empty(destination) {
            return Err(RuleViolation::OccupiedNode { node: destination });
        }
        let reachable = rules::legal_destinations(&self.topology, &self.state.board, from, self.state.current_player);
        if reachable & destination.bit() == 0 {
            return Err(RuleViolation::IllegalDestination { from, to: destination });
        }
        Ok(from)
    }

    fn check_capture(&self, target: NodeId) -> Result<(), RuleViolation> {
        self.check_common(target, Phase::CaptureSelection)?;
        if self.state.board.owner(target) != Some(self.state.current_player.opponent()) {
            return Err(RuleViolation::InvalidCaptureTarget { node: target });
        }
        Ok(())
    }

    /// Check that a snapshot only refers to nodes and lines of this board.
    fn fits(&self, snapshot: &GameState) -> bool {
        let all = self.topology.all_nodes();
        let is_line = |line: &LineKey| self.topology.lines().contains(line);
        let budget = self.rules().placement_budget;

        snapshot.is_consistent()
            && snapshot.board.occupied() & !all == 0
            && snapshot.selected.map_or(true, |node| self.topology.contains(node))
            && snapshot.pending_capture.as_ref().map_or(true, is_line)
            && snapshot.claimed.iter().flatten().all(is_line)
            && Player::BOTH.into_iter().all(|p| {
                let i = p.index();
                let supply = budget as u16 + self.topology.opening(p).count_ones() as u16;
                snapshot.remaining[i] as u16 + snapshot.on_board[i] as u16 + snapshot.captured[i] as u16 == supply
            })
    }

    // ========== Transition Helpers ==========

    /// If the stone just landed on `node` completes an unclaimed line, owe a
    /// capture. Returns true when capture selection was entered.
    fn enter_capture(&self, next: &mut GameState, node: NodeId, events: &mut Vec<GameEvent>) -> bool {
        let player = next.current_player;
        let claims = &next.claimed;
        let Some(line) = rules::newly_formed_line(&self.topology, &next.board, node, player, |line| {
            claims.iter().any(|set| set.contains(&line))
        }) else {
            return false;
        };

        events.push(GameEvent::LineFormed { player, line });
        if next.on_board[player.opponent().index()] == 0 {
            trace!(%line, "line formed with nothing to capture");
            return false;
        }

        next.phase = Phase::CaptureSelection;
        next.pending_capture = Some(line);
        next.selected = None;
        events.push(GameEvent::PhaseChanged {
            phase: Phase::CaptureSelection,
        });
        true
    }

    /// Hand the turn to the opponent. During placement a player with an
    /// empty budget is skipped, and movement begins once both budgets are
    /// spent.
    fn pass_turn(&self, next: &mut GameState, events: &mut Vec<GameEvent>) {
        let player = next.current_player;
        let opponent = player.opponent();
        next.selected = None;

        if next.phase == Phase::Placement {
            if next.remaining == [0, 0] {
                next.phase = Phase::Movement;
                events.push(GameEvent::PhaseChanged { phase: Phase::Movement });
            } else if next.remaining[opponent.index()] == 0 {
                trace!(%player, "opponent has nothing left to place, turn stays");
                return;
            }
        }

        next.current_player = opponent;
        events.push(GameEvent::TurnPassed { to: opponent });
    }

    /// End the game if a player ran out of material or is blocked.
    fn settle(&self, next: &mut GameState, events: &mut Vec<GameEvent>) {
        if next.phase == Phase::GameOver {
            return;
        }
        let flags = self.rules();

        let exhausted = Player::BOTH
            .into_iter()
            .find(|&p| next.material(p) < flags.min_viable_stones)
            .map(|p| (p, WinReason::MaterialExhausted));
        let blocked = || {
            let mover = next.current_player;
            let stuck = flags.blocked_player_loses
                && next.phase == Phase::Movement
                && !rules::has_any_move(&self.topology, &next.board, mover);
            stuck.then_some((mover, WinReason::Blocked))
        };

        if let Some((loser, reason)) = exhausted.or_else(blocked) {
            let winner = loser.opponent();
            next.phase = Phase::GameOver;
            next.winner = Some(winner);
            next.selected = None;
            next.pending_capture = None;
            events.push(GameEvent::PhaseChanged { phase: Phase::GameOver });
            events.push(GameEvent::GameOver { winner, reason });
            info!(%winner, ?reason, "game over");
        }
    }

    /// Run win detection and make `next` the current state.
    fn commit(&mut self, mut next: GameState, mut events: Vec<GameEvent>) -> Transition {
        self.settle(&mut next, &mut events);
        debug_assert!(next.is_consistent(), "stone counters drifted from the board");
        trace!(phase = ?next.phase, player = %next.current_player, events = events.len(), "committed");
        self.state = next;
        Transition {
            events,
            state: self.state.clone(),
        }
    }
}
