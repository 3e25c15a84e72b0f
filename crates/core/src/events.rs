use crate::{EncounterTier, Intent, NodeType, Phase};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    RunStarted {
        seed: u64,
        daily: bool,
    },
    NodeEntered {
        node_id: String,
        kind: NodeType,
    },
    CombatStarted {
        tier: EncounterTier,
        enemies: Vec<String>,
    },
    TurnStarted {
        turn: u32,
        energy: u32,
        hand: usize,
    },
    CardPlayed {
        card_id: String,
        cost: u32,
    },
    CardExhausted {
        card_id: String,
    },
    DamageDealt {
        enemy: usize,
        amount: u32,
        hp: u32,
    },
    BlockGained {
        amount: u32,
        block: u32,
    },
    PlayerDamaged {
        amount: u32,
        blocked: u32,
        hp: u32,
    },
    EnemyActed {
        enemy: usize,
        intent: Intent,
    },
    EnemyDefeated {
        enemy: usize,
        enemy_id: String,
    },
    PlayerRevived {
        hp: u32,
    },
    PotionUsed {
        potion_id: String,
    },
    CombatWon {
        turns: u32,
    },
    CombatLost,
    PhaseChanged {
        phase: Phase,
    },
    GoldChanged {
        delta: i64,
        gold: u32,
    },
    HpChanged {
        hp: u32,
        max_hp: u32,
    },
    CardAdded {
        card_id: String,
    },
    CardRemoved {
        card_id: String,
    },
    CardUpgraded {
        card_id: String,
    },
    RelicGained {
        relic_id: String,
    },
    PotionGained {
        potion_id: String,
    },
    ActAdvanced {
        act: u8,
    },
    RunWon,
    RunLost {
        act: u8,
        floor: u32,
    },
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub(crate) fn append(&mut self, other: &mut EventBus) {
        self.queue.append(&mut other.queue);
    }
}
