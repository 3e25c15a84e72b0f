use crate::{Card, CardKind, EncounterTier, EnemyTemplate, Potion, Rarity, Relic, RngState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RarityPools {
    #[serde(default)]
    pub common: Vec<String>,
    #[serde(default)]
    pub uncommon: Vec<String>,
    #[serde(default)]
    pub rare: Vec<String>,
}

impl RarityPools {
    pub fn get(&self, rarity: Rarity) -> &[String] {
        match rarity {
            Rarity::Common => &self.common,
            Rarity::Uncommon => &self.uncommon,
            Rarity::Rare => &self.rare,
        }
    }

    pub fn all(&self) -> impl Iterator<Item = &String> {
        self.common.iter().chain(&self.uncommon).chain(&self.rare)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncounterTable {
    #[serde(default)]
    pub normal: Vec<Vec<String>>,
    #[serde(default)]
    pub elite: Vec<Vec<String>>,
    #[serde(default)]
    pub boss: Vec<Vec<String>>,
}

impl EncounterTable {
    pub fn get(&self, tier: EncounterTier) -> &[Vec<String>] {
        match tier {
            EncounterTier::Normal => &self.normal,
            EncounterTier::Elite => &self.elite,
            EncounterTier::Boss => &self.boss,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActPools {
    pub act: u8,
    pub cards: RarityPools,
    pub relics: RarityPools,
    #[serde(default)]
    pub potions: Vec<String>,
    #[serde(default)]
    pub events: Vec<String>,
    pub encounters: EncounterTable,
}

fn one() -> u32 {
    1
}

/// A single outcome of an event choice. A choice applies its list in order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Consequence {
    Damage {
        amount: u32,
    },
    Heal {
        amount: u32,
    },
    Gold {
        amount: i32,
    },
    MaxHp {
        amount: i32,
    },
    Relic {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        rarity: Option<Rarity>,
    },
    Card {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        rarity: Option<Rarity>,
        #[serde(default)]
        kind: Option<CardKind>,
        #[serde(default = "one")]
        count: u32,
    },
    RemoveCard,
    UpgradeCard,
    Potion {
        #[serde(default)]
        id: Option<String>,
    },
    /// Double or nothing on `stake` gold.
    Gamble {
        stake: u32,
    },
    Nothing,
}

impl Consequence {
    pub fn needs_card(&self) -> bool {
        matches!(self, Consequence::RemoveCard | Consequence::UpgradeCard)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventChoice {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub consequences: Vec<Consequence>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub choices: Vec<EventChoice>,
}

impl EventDef {
    pub fn choice(&self, id: &str) -> Option<&EventChoice> {
        self.choices.iter().find(|choice| choice.id == id)
    }
}

/// Immutable catalogs. Templates are cloned into live instances.
#[derive(Debug, Clone, Default)]
pub struct Content {
    pub cards: Vec<Card>,
    pub starter_deck: Vec<String>,
    pub enemies: Vec<EnemyTemplate>,
    pub relics: Vec<Relic>,
    pub potions: Vec<Potion>,
    pub events: Vec<EventDef>,
    pub acts: Vec<ActPools>,
}

impl Content {
    pub fn card(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn enemy(&self, id: &str) -> Option<&EnemyTemplate> {
        self.enemies.iter().find(|enemy| enemy.id == id)
    }

    pub fn relic(&self, id: &str) -> Option<&Relic> {
        self.relics.iter().find(|relic| relic.id == id)
    }

    pub fn potion(&self, id: &str) -> Option<&Potion> {
        self.potions.iter().find(|potion| potion.id == id)
    }

    pub fn event(&self, id: &str) -> Option<&EventDef> {
        self.events.iter().find(|event| event.id == id)
    }

    /// Pools for `act`, falling back to the last defined act.
    pub fn act(&self, act: u8) -> Option<&ActPools> {
        self.acts
            .iter()
            .find(|pools| pools.act == act)
            .or_else(|| self.acts.iter().max_by_key(|pools| pools.act))
    }

    pub fn starter_deck(&self) -> Vec<Card> {
        self.starter_deck
            .iter()
            .filter_map(|id| self.card(id))
            .cloned()
            .collect()
    }

    pub fn pick_encounter<'a>(
        &'a self,
        act: u8,
        tier: EncounterTier,
        rng: &mut RngState,
    ) -> Option<&'a [String]> {
        let table = self.act(act)?.encounters.get(tier);
        rng.pick(table).map(Vec::as_slice)
    }

    /// Any card from the act pool, optionally narrowed by rarity and kind.
    pub fn pick_card_where<'a>(
        &'a self,
        act: u8,
        rarity: Option<Rarity>,
        kind: Option<CardKind>,
        rng: &mut RngState,
    ) -> Option<&'a Card> {
        let pools = &self.act(act)?.cards;
        let candidates: Vec<&Card> = pools
            .all()
            .filter_map(|id| self.card(id))
            .filter(|card| rarity.map_or(true, |rarity| card.rarity == rarity))
            .filter(|card| kind.map_or(true, |kind| card.kind == kind))
            .collect();
        rng.pick(&candidates).copied()
    }

    /// Unowned relic from the act pool. With no rarity given every rarity is eligible.
    pub fn pick_relic<'a>(
        &'a self,
        act: u8,
        rarity: Option<Rarity>,
        owned: &[Relic],
        rng: &mut RngState,
    ) -> Option<&'a Relic> {
        let pools = &self.act(act)?.relics;
        let ids: Vec<&String> = match rarity {
            Some(rarity) => pools.get(rarity).iter().collect(),
            None => pools.all().collect(),
        };
        let indices: Vec<usize> = self
            .relics
            .iter()
            .enumerate()
            .filter(|(_, relic)| ids.contains(&&relic.id))
            .filter(|(_, relic)| !owned.iter().any(|have| have.id == relic.id))
            .map(|(idx, _)| idx)
            .collect();
        rng.pick(&indices).map(|idx| &self.relics[*idx])
    }

    pub fn pick_potion<'a>(&'a self, act: u8, rng: &mut RngState) -> Option<&'a Potion> {
        let id = rng.pick(&self.act(act)?.potions)?;
        self.potion(id)
    }

    pub fn pick_event<'a>(&'a self, act: u8, rng: &mut RngState) -> Option<&'a EventDef> {
        let id = rng.pick(&self.act(act)?.events)?;
        self.event(id)
    }
}
