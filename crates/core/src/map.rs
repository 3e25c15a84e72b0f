use crate::{EncounterTier, MapRule, RngState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Combat,
    Elite,
    Rest,
    Shop,
    Event,
    Treasure,
    Boss,
}

impl NodeType {
    pub fn tier(self) -> Option<EncounterTier> {
        match self {
            NodeType::Combat => Some(EncounterTier::Normal),
            NodeType::Elite => Some(EncounterTier::Elite),
            NodeType::Boss => Some(EncounterTier::Boss),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MapNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeType,
    pub x: u32,
    pub y: u32,
    pub connections: Vec<String>,
    pub completed: bool,
    pub available: bool,
}

pub fn node_id(act: u8, floor: u32, path: u32) -> String {
    format!("{act}-{floor}-{path}")
}

/// Builds the floor-by-floor graph for one act. Floor 0 is all combat and
/// available; the last floor is all boss.
pub fn generate_map(act: u8, rule: &MapRule, rng: &mut RngState) -> Vec<MapNode> {
    let floors = rule.floors.max(1);
    let paths = rule.paths.max(1);
    let mid_floor = floors / 2;
    let mut nodes = Vec::with_capacity((floors * paths) as usize);

    for floor in 0..floors {
        for path in 0..paths {
            let kind = if floor == 0 {
                NodeType::Combat
            } else if floor == floors - 1 {
                NodeType::Boss
            } else if floor == mid_floor && rng.chance(rule.mid_floor_rest_chance) {
                NodeType::Rest
            } else {
                roll_node_type(rule, rng)
            };
            nodes.push(MapNode {
                id: node_id(act, floor, path),
                kind,
                x: path,
                y: floor,
                connections: Vec::new(),
                completed: false,
                available: floor == 0,
            });
        }
    }

    for floor in 0..floors.saturating_sub(1) {
        for path in 0..paths {
            let links = if rng.chance(rule.single_connection_chance) { 1 } else { 2 };
            let idx = (floor * paths + path) as usize;
            for link in 0..links {
                let offset: i64 = match link {
                    0 => 0,
                    _ if rng.chance(0.5) => -1,
                    _ => 1,
                };
                let target = (i64::from(path) + offset).clamp(0, i64::from(paths) - 1) as u32;
                let target_id = node_id(act, floor + 1, target);
                if !nodes[idx].connections.contains(&target_id) {
                    nodes[idx].connections.push(target_id);
                }
            }
        }
    }

    nodes
}

fn roll_node_type(rule: &MapRule, rng: &mut RngState) -> NodeType {
    let weights: Vec<u32> = rule.node_weights.iter().map(|entry| entry.weight).collect();
    rng.weighted(&weights)
        .and_then(|idx| rule.node_weights.get(idx))
        .map(|entry| entry.kind)
        .unwrap_or(NodeType::Combat)
}

/// Marks `id` completed, withdraws every other open node on its floor or
/// below, and opens its outgoing connections. Returns false for unknown ids.
pub fn complete_node(nodes: &mut [MapNode], id: &str) -> bool {
    let Some(done) = nodes.iter().find(|node| node.id == id) else {
        return false;
    };
    let floor = done.y;
    let connections = done.connections.clone();
    for node in nodes.iter_mut() {
        if node.id == id {
            node.completed = true;
            node.available = false;
        } else if !node.completed && node.y <= floor {
            node.available = false;
        }
    }
    for node in nodes.iter_mut() {
        if !node.completed && connections.contains(&node.id) {
            node.available = true;
        }
    }
    true
}

pub fn available_nodes(nodes: &[MapNode]) -> impl Iterator<Item = &MapNode> {
    nodes.iter().filter(|node| node.available && !node.completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameConfig;

    fn map(seed: u64) -> Vec<MapNode> {
        let config = GameConfig::default();
        generate_map(1, &config.map, &mut RngState::from_seed(seed))
    }

    #[test]
    fn layout_invariants() {
        let nodes = map(9);
        assert_eq!(nodes.len(), 45);
        for node in &nodes {
            match node.y {
                0 => {
                    assert_eq!(node.kind, NodeType::Combat);
                    assert!(node.available);
                }
                14 => {
                    assert_eq!(node.kind, NodeType::Boss);
                    assert!(node.connections.is_empty());
                }
                _ => {
                    assert_ne!(node.kind, NodeType::Boss);
                    assert!(!node.available);
                }
            }
            if node.y < 14 {
                assert!((1..=2).contains(&node.connections.len()));
            }
        }
        assert_eq!(nodes[0].id, "1-0-0");
    }

    #[test]
    fn same_seed_same_map() {
        assert_eq!(map(42), map(42));
    }

    #[test]
    fn completing_opens_connections_and_closes_siblings() {
        let mut nodes = map(3);
        let first = nodes[1].clone();
        assert!(complete_node(&mut nodes, &first.id));
        let open: Vec<&MapNode> = available_nodes(&nodes).collect();
        assert!(!open.is_empty());
        for node in open {
            assert_eq!(node.y, 1);
            assert!(first.connections.contains(&node.id));
        }
        assert!(!complete_node(&mut nodes, "9-9-9"));
    }
}
