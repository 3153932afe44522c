//! WASM bindings for stones-core
//!
//! Nodes cross the boundary as labels. Every operation answers with an
//! outcome object: `{ accepted, reason, events, state }`.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::{
    BoardTopology, CaptureCause, GameEngine, GameEvent, GameState, NodeId, Phase, Player, RuleViolation,
    Transition, Variant, WinReason,
};

/// WASM-friendly wrapper around GameEngine
#[wasm_bindgen]
pub struct WasmGame {
    inner: GameEngine,
}

#[wasm_bindgen]
impl WasmGame {
    /// Start a match on a built-in board ("saler", "tinka", "lakir3", "lakir", "lakir9")
    #[wasm_bindgen(constructor)]
    pub fn new(variant: &str) -> Result<WasmGame, JsError> {
        let variant: Variant = variant.parse()?;
        Ok(WasmGame {
            inner: GameEngine::from_variant(variant),
        })
    }

    /// Start a match on a custom board document
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str) -> Result<WasmGame, JsError> {
        let topology = BoardTopology::from_json(json)?;
        Ok(WasmGame {
            inner: GameEngine::new(topology),
        })
    }

    /// Names of the built-in boards
    #[wasm_bindgen(js_name = variantNames)]
    pub fn variant_names() -> JsValue {
        let names: Vec<&str> = Variant::ALL.iter().map(|v| v.name()).collect();
        to_js(&names)
    }

    /// Node labels in index order
    pub fn nodes(&self) -> JsValue {
        let topo = self.inner.topology();
        let labels: Vec<&str> = topo.nodes().map(|n| topo.label(n)).collect();
        to_js(&labels)
    }

    /// Current state snapshot
    pub fn state(&self) -> JsValue {
        to_js(&StateView::new(self.inner.topology(), self.inner.state()))
    }

    #[wasm_bindgen(js_name = placeStone)]
    pub fn place_stone(&mut self, label: &str) -> JsValue {
        self.run(label, |engine, node| engine.place_stone(node))
    }

    #[wasm_bindgen(js_name = selectForMovement)]
    pub fn select_for_movement(&mut self, label: &str) -> JsValue {
        self.run(label, |engine, node| engine.select_for_movement(node))
    }

    #[wasm_bindgen(js_name = moveSelectedTo)]
    pub fn move_selected_to(&mut self, label: &str) -> JsValue {
        self.run(label, |engine, node| engine.move_selected_to(node))
    }

    #[wasm_bindgen(js_name = resolveCaptureSelection)]
    pub fn resolve_capture_selection(&mut self, label: &str) -> JsValue {
        self.run(label, |engine, node| engine.resolve_capture_selection(node))
    }

    pub fn reset(&mut self) -> JsValue {
        let transition = self.inner.reset();
        to_js(&Outcome::accepted(self.inner.topology(), &transition))
    }

    /// Labels where the player to move may place
    #[wasm_bindgen(js_name = legalPlacements)]
    pub fn legal_placements(&self) -> JsValue {
        to_js(&self.labels(self.inner.legal_placements()))
    }

    /// Labels of opponent stones that may be captured
    #[wasm_bindgen(js_name = capturableStones)]
    pub fn capturable_stones(&self) -> JsValue {
        to_js(&self.labels(self.inner.capturable_stones()))
    }

    /// Labels the selected stone may move to
    #[wasm_bindgen(js_name = selectedDestinations)]
    pub fn selected_destinations(&self) -> JsValue {
        to_js(&self.labels(self.inner.selected_destinations()))
    }
}

impl WasmGame {
    fn run(
        &mut self,
        label: &str,
        op: impl FnOnce(&mut GameEngine, NodeId) -> Result<Transition, RuleViolation>,
    ) -> JsValue {
        let Some(node) = self.inner.node(label) else {
            let reason = format!("Unknown node {label:?}");
            return to_js(&Outcome::rejected(self.inner.topology(), self.inner.state(), reason));
        };
        let outcome = match op(&mut self.inner, node) {
            Ok(transition) => Outcome::accepted(self.inner.topology(), &transition),
            Err(err) => Outcome::rejected(self.inner.topology(), self.inner.state(), err.to_string()),
        };
        to_js(&outcome)
    }

    fn labels(&self, nodes: Vec<NodeId>) -> Vec<&str> {
        let topo = self.inner.topology();
        nodes.into_iter().map(|n| topo.label(n)).collect()
    }
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

fn player_bits(player: Option<Player>) -> u8 {
    player.map_or(0, |p| p as u8)
}

// ========== Views ==========

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Outcome<'a> {
    accepted: bool,
    reason: Option<String>,
    events: Vec<EventView<'a>>,
    state: StateView<'a>,
}

impl<'a> Outcome<'a> {
    fn accepted(topo: &'a BoardTopology, transition: &Transition) -> Outcome<'a> {
        Outcome {
            accepted: true,
            reason: None,
            events: transition.events.iter().map(|e| EventView::new(topo, e)).collect(),
            state: StateView::new(topo, &transition.state),
        }
    }

    fn rejected(topo: &'a BoardTopology, state: &GameState, reason: String) -> Outcome<'a> {
        Outcome {
            accepted: false,
            reason: Some(reason),
            events: Vec::new(),
            state: StateView::new(topo, state),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StateView<'a> {
    board: &'a str,
    phase: Phase,
    current_player: u8,
    /// Owner per node in index order: 0 empty, 1 or 2
    cells: Vec<u8>,
    remaining: [u8; 2],
    on_board: [u8; 2],
    captured: [u8; 2],
    selected: Option<&'a str>,
    pending_capture: Option<Vec<&'a str>>,
    winner: u8,
}

impl<'a> StateView<'a> {
    fn new(topo: &'a BoardTopology, state: &GameState) -> StateView<'a> {
        let count = |f: fn(&GameState, Player) -> u8| Player::BOTH.map(|p| f(state, p));
        StateView {
            board: topo.name(),
            phase: state.phase(),
            current_player: state.current_player() as u8,
            cells: topo.nodes().map(|n| player_bits(state.cell(n).owner())).collect(),
            remaining: count(GameState::stones_remaining),
            on_board: count(GameState::stones_on_board),
            captured: count(GameState::stones_captured),
            selected: state.selected().map(|n| topo.label(n)),
            pending_capture: state.pending_capture().map(|line| topo.line_labels(line)),
            winner: player_bits(state.winner()),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum EventView<'a> {
    Placed { player: u8, node: &'a str },
    Selected { player: u8, node: &'a str, destinations: Vec<&'a str> },
    Moved { player: u8, from: &'a str, to: &'a str },
    Captured { by: u8, node: &'a str, jump: bool },
    LineFormed { player: u8, line: Vec<&'a str> },
    LineClaimed { player: u8, line: Vec<&'a str> },
    PhaseChanged { phase: Phase },
    TurnPassed { to: u8 },
    GameOver { winner: u8, blocked: bool },
    Reset,
}

impl<'a> EventView<'a> {
    fn new(topo: &'a BoardTopology, event: &GameEvent) -> EventView<'a> {
        let label = |n: NodeId| topo.label(n);
        match *event {
            GameEvent::StonePlaced { player, node } => EventView::Placed {
                player: player as u8,
                node: label(node),
            },
            GameEvent::StoneSelected {
                player,
                node,
                ref destinations,
            } => EventView::Selected {
                player: player as u8,
                node: label(node),
                destinations: destinations.iter().map(|&n| label(n)).collect(),
            },
            GameEvent::StoneMoved { player, from, to } => EventView::Moved {
                player: player as u8,
                from: label(from),
                to: label(to),
            },
            GameEvent::StoneCaptured { by, node, cause } => EventView::Captured {
                by: by as u8,
                node: label(node),
                jump: cause == CaptureCause::Jump,
            },
            GameEvent::LineFormed { player, line } => EventView::LineFormed {
                player: player as u8,
                line: topo.line_labels(line),
            },
            GameEvent::LineClaimed { player, line } => EventView::LineClaimed {
                player: player as u8,
                line: topo.line_labels(line),
            },
            GameEvent::PhaseChanged { phase } => EventView::PhaseChanged { phase },
            GameEvent::TurnPassed { to } => EventView::TurnPassed { to: to as u8 },
            GameEvent::GameOver { winner, reason } => EventView::GameOver {
                winner: winner as u8,
                blocked: reason == WinReason::Blocked,
            },
            GameEvent::Reset => EventView::Reset,
        }
    }
}
