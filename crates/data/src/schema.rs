use serde::{Deserialize, Serialize};

pub use deckdungeon_core::{
    ActPools, Card, Consequence, Content, EncounterTable, EnemyTemplate, EventDef, GameConfig,
    Potion, RarityPools, Relic,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardsFile {
    pub cards: Vec<Card>,
    pub starter_deck: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemiesFile {
    pub enemies: Vec<EnemyTemplate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelicsFile {
    pub relics: Vec<Relic>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PotionsFile {
    pub potions: Vec<Potion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsFile {
    pub events: Vec<EventDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActsFile {
    pub acts: Vec<ActPools>,
}
