//! Board topology: nodes, adjacency, lines and jump triples.
//!
//! A topology is loaded once per variant from a [`TopologySpec`] (usually a
//! JSON document) and never changes afterwards. Labels are only used at the
//! edges; everything inside is indexed by [`NodeId`] and stored as masks.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::TopologyError;
use crate::{nodes_in, NodeId, Player, MAX_NODES};

/// A line, keyed by the set of nodes it covers.
///
/// The key is a node mask, so `[a, b, c]` and `[c, a, b]` are the same line.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct LineKey(pub u64);

impl LineKey {
    /// Build a key from any ordering of the line's nodes.
    pub fn from_nodes(nodes: &[NodeId]) -> LineKey {
        LineKey(nodes.iter().fold(0, |mask, node| mask | node.bit()))
    }

    /// Node mask of the line.
    #[inline]
    pub const fn mask(self) -> u64 {
        self.0
    }

    /// Number of nodes in the line.
    #[inline]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Check if the line passes through a node.
    #[inline]
    pub const fn contains(self, node: NodeId) -> bool {
        self.0 & node.bit() != 0
    }

    /// The line's nodes in index order.
    pub fn nodes(self) -> impl Iterator<Item = NodeId> {
        nodes_in(self.0)
    }
}

impl std::fmt::Display for LineKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.nodes().map(|n| n.0.to_string()).collect();
        write!(f, "{}", parts.join("-"))
    }
}

/// A directed jump: a stone on `from` hops over `over` and lands on `to`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Jump {
    pub from: NodeId,
    pub over: NodeId,
    pub to: NodeId,
}

/// Rule flags that distinguish one game of the family from another.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Rules {
    /// Stones each player places before movement starts. Zero skips
    /// placement and starts from the opening layout.
    pub placement_budget: u8,
    /// A player whose material drops below this loses.
    pub min_viable_stones: u8,
    /// Moving over an adjacent opponent stone along a jump triple removes it.
    pub allows_jump_capture: bool,
    /// Placements may not complete a line. When false, a line completed by
    /// a placement earns a capture like one completed by a move.
    pub forbids_self_mill_on_placement: bool,
    /// After a capture the capturing player acts again instead of passing.
    pub captures_grant_extra_action: bool,
    /// During movement, a player to move with no legal move loses.
    pub blocked_player_loses: bool,
}

/// A stone on the board before the first action.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct OpeningStone {
    pub node: String,
    pub player: Player,
}

/// Serialized board description, as stored in the board documents.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TopologySpec {
    pub name: String,
    /// Node labels; the order assigns node indices.
    pub nodes: Vec<String>,
    /// Neighbor labels per node. Must be symmetric.
    #[serde(default)]
    pub adjacency: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub lines: Vec<Vec<String>>,
    /// Jump triples `[from, over, to]`; each one also allows the reverse.
    #[serde(default)]
    pub jumps: Vec<[String; 3]>,
    #[serde(default)]
    pub opening: Vec<OpeningStone>,
    pub rules: Rules,
}

/// Validated, immutable board description.
#[derive(Clone, Debug)]
pub struct BoardTopology {
    name: String,
    labels: Vec<String>,
    index: HashMap<String, NodeId>,
    /// Neighbor mask per node.
    adjacency: Vec<u64>,
    /// Distinct lines in declaration order.
    lines: Vec<LineKey>,
    /// Lines through each node, in declaration order.
    lines_through: Vec<Vec<LineKey>>,
    jumps_from: Vec<Vec<Jump>>,
    opening: [u64; 2],
    rules: Rules,
}

fn resolve(index: &HashMap<String, NodeId>, label: &str) -> Result<NodeId, TopologyError> {
    index
        .get(label)
        .copied()
        .ok_or_else(|| TopologyError::UnknownLabel {
            label: label.to_string(),
        })
}

impl BoardTopology {
    /// Parse and validate a JSON board document.
    pub fn from_json(json: &str) -> Result<BoardTopology, TopologyError> {
        let spec: TopologySpec = serde_json::from_str(json)?;
        BoardTopology::from_spec(spec)
    }

    /// Validate a board description and precompute the lookup tables.
    pub fn from_spec(spec: TopologySpec) -> Result<BoardTopology, TopologyError> {
        let count = spec.nodes.len();
        if count == 0 {
            return Err(TopologyError::Empty);
        }
        if count > MAX_NODES {
            return Err(TopologyError::TooManyNodes {
                count,
                max: MAX_NODES,
            });
        }

        let mut index = HashMap::with_capacity(count);
        for (i, label) in spec.nodes.iter().enumerate() {
            if index.insert(label.clone(), NodeId(i as u8)).is_some() {
                return Err(TopologyError::DuplicateLabel {
                    label: label.clone(),
                });
            }
        }

        // ========== Adjacency ==========

        let mut adjacency = vec![0u64; count];
        for (label, neighbors) in &spec.adjacency {
            let from = resolve(&index, label)?;
            for neighbor in neighbors {
                let to = resolve(&index, neighbor)?;
                if to == from {
                    return Err(TopologyError::SelfLoop {
                        label: label.clone(),
                    });
                }
                adjacency[from.index()] |= to.bit();
            }
        }
        for (a, &mask) in adjacency.iter().enumerate() {
            for b in nodes_in(mask) {
                if adjacency[b.index()] & (1u64 << a) == 0 {
                    return Err(TopologyError::AsymmetricEdge {
                        from: spec.nodes[a].clone(),
                        to: spec.nodes[b.index()].clone(),
                    });
                }
            }
        }

        // ========== Lines ==========

        let mut lines: Vec<LineKey> = Vec::with_capacity(spec.lines.len());
        for labels in &spec.lines {
            let nodes = labels
                .iter()
                .map(|label| resolve(&index, label))
                .collect::<Result<Vec<_>, _>>()?;
            let key = LineKey::from_nodes(&nodes);
            if nodes.len() < 2 || key.len() as usize != nodes.len() {
                return Err(TopologyError::DegenerateLine {
                    labels: labels.clone(),
                });
            }
            // Same node set declared twice is one line.
            if !lines.contains(&key) {
                lines.push(key);
            }
        }
        let lines_through = (0..count)
            .map(|i| {
                lines
                    .iter()
                    .copied()
                    .filter(|line| line.contains(NodeId(i as u8)))
                    .collect()
            })
            .collect();

        // ========== Jumps ==========

        let mut jumps_from: Vec<Vec<Jump>> = vec![Vec::new(); count];
        for [from, over, to] in &spec.jumps {
            let f = resolve(&index, from)?;
            let o = resolve(&index, over)?;
            let t = resolve(&index, to)?;
            let hop = |a: NodeId, b: NodeId| adjacency[a.index()] & b.bit() != 0;
            if f == t || !hop(f, o) || !hop(o, t) {
                return Err(TopologyError::InvalidJump {
                    from: from.clone(),
                    over: over.clone(),
                    to: to.clone(),
                });
            }
            for jump in [
                Jump { from: f, over: o, to: t },
                Jump { from: t, over: o, to: f },
            ] {
                let list = &mut jumps_from[jump.from.index()];
                if !list.contains(&jump) {
                    list.push(jump);
                }
            }
        }

        // ========== Opening layout and budget ==========

        let mut opening = [0u64; 2];
        for stone in &spec.opening {
            let node = resolve(&index, &stone.node)?;
            if (opening[0] | opening[1]) & node.bit() != 0 {
                return Err(TopologyError::DuplicateOpeningStone {
                    label: stone.node.clone(),
                });
            }
            opening[stone.player.index()] |= node.bit();
        }
        let occupied = (opening[0] | opening[1]).count_ones() as usize;
        if spec.rules.placement_budget as usize * 2 + occupied > count {
            return Err(TopologyError::BudgetTooLarge {
                budget: spec.rules.placement_budget,
                nodes: count,
            });
        }

        Ok(BoardTopology {
            name: spec.name,
            labels: spec.nodes,
            index,
            adjacency,
            lines,
            lines_through,
            jumps_from,
            opening,
            rules: spec.rules,
        })
    }

    // ========== Lookups ==========

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    /// Mask with one bit per node on this board.
    #[inline]
    pub fn all_nodes(&self) -> u64 {
        if self.labels.len() == MAX_NODES {
            u64::MAX
        } else {
            (1u64 << self.labels.len()) - 1
        }
    }

    /// Iterate over all node ids.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.labels.len() as u8).map(NodeId)
    }

    /// Check if a node id is on this board.
    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.labels.len()
    }

    /// Find a node by label.
    pub fn node(&self, label: &str) -> Option<NodeId> {
        self.index.get(label).copied()
    }

    /// Label of a node. The node must be on this board.
    pub fn label(&self, node: NodeId) -> &str {
        &self.labels[node.index()]
    }

    /// Neighbor mask of a node.
    #[inline]
    pub fn neighbors(&self, node: NodeId) -> u64 {
        self.adjacency[node.index()]
    }

    #[inline]
    pub fn is_adjacent(&self, a: NodeId, b: NodeId) -> bool {
        self.adjacency[a.index()] & b.bit() != 0
    }

    /// All lines, in declaration order.
    pub fn lines(&self) -> &[LineKey] {
        &self.lines
    }

    /// Lines through a node, in declaration order.
    pub fn lines_through(&self, node: NodeId) -> &[LineKey] {
        &self.lines_through[node.index()]
    }

    /// Jumps starting at a node.
    pub fn jumps_from(&self, node: NodeId) -> &[Jump] {
        &self.jumps_from[node.index()]
    }

    /// Stones a player has on the board before the first action.
    #[inline]
    pub fn opening(&self, player: Player) -> u64 {
        self.opening[player.index()]
    }

    /// Labels of a line's nodes, in index order.
    pub fn line_labels(&self, line: LineKey) -> Vec<&str> {
        line.nodes().map(|node| self.label(node)).collect()
    }
}
