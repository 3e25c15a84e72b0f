use crate::{Card, CombatState, DailyChallenge, EventDef, MapNode, Potion, Relic, ShopState, StatusEffects};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Menu,
    Map,
    Combat,
    CardReward,
    Rest,
    Shop,
    Event,
    Treasure,
    GameOver,
    Victory,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::GameOver | Phase::Victory)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub hp: u32,
    pub max_hp: u32,
    #[serde(default)]
    pub block: u32,
    pub gold: u32,
    pub deck: Vec<Card>,
    #[serde(default)]
    pub relics: Vec<Relic>,
    #[serde(default)]
    pub potions: Vec<Potion>,
    #[serde(default)]
    pub status: StatusEffects,
}

impl Player {
    pub fn new(max_hp: u32, gold: u32) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            block: 0,
            gold,
            deck: Vec::new(),
            relics: Vec::new(),
            potions: Vec::new(),
            status: StatusEffects::new(),
        }
    }

    pub fn heal(&mut self, amount: u32) {
        self.hp = self.hp.saturating_add(amount).min(self.max_hp);
    }

    pub fn deck_position(&self, card_id: &str) -> Option<usize> {
        self.deck.iter().position(|card| card.id == card_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunStats {
    pub floors_cleared: u32,
    pub enemies_killed: u32,
    pub damage_dealt: u64,
    pub cards_played: u32,
    pub gold_earned: u32,
    /// Wall-clock start in milliseconds, supplied by the caller.
    pub start_time_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreasureReward {
    pub gold: u32,
    #[serde(default)]
    pub relic: Option<Relic>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentEvent {
    pub event: EventDef,
    #[serde(default)]
    pub resolved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameState {
    pub player: Player,
    pub act: u8,
    pub floor: u32,
    pub map: Vec<MapNode>,
    pub phase: Phase,
    #[serde(default)]
    pub current_node: Option<String>,
    #[serde(default)]
    pub combat: Option<CombatState>,
    #[serde(default)]
    pub card_reward: Option<Vec<Card>>,
    #[serde(default)]
    pub treasure: Option<TreasureReward>,
    #[serde(default)]
    pub shop: Option<ShopState>,
    #[serde(default)]
    pub current_event: Option<CurrentEvent>,
    #[serde(default)]
    pub daily: Option<DailyChallenge>,
    #[serde(default)]
    pub stats: RunStats,
    /// Next card instance id handed out to deck cards.
    #[serde(default)]
    pub next_uid: u32,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            player: Player::new(0, 0),
            act: 1,
            floor: 0,
            map: Vec::new(),
            phase: Phase::Menu,
            current_node: None,
            combat: None,
            card_reward: None,
            treasure: None,
            shop: None,
            current_event: None,
            daily: None,
            stats: RunStats::default(),
            next_uid: 1,
        }
    }

    pub fn node(&self, id: &str) -> Option<&MapNode> {
        self.map.iter().find(|node| node.id == id)
    }

    pub fn current_map_node(&self) -> Option<&MapNode> {
        self.current_node.as_deref().and_then(|id| self.node(id))
    }

    /// Clones a catalog card into the deck with a fresh instance id.
    pub fn add_to_deck(&mut self, template: &Card) -> u32 {
        let uid = self.next_uid.max(1);
        self.next_uid = uid + 1;
        self.player.deck.push(template.instance(uid));
        uid
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
