use crate::{Player, Rarity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RelicEffect {
    HpAfterCombat,
    FirstTurnEnergy,
    CombatBlock,
    GoldPerCombat,
    CombatPoison,
    HealAfterCombat,
    ExtraCardReward,
    CombatEnergy,
    CombatStrength,
    PotionHeal,
    ThornsPassive,
    ExtraDraw,
    Meditation,
    AttackBlock,
    PoisonEnergy,
    UpgradeBasics,
    TurnStrength,
    PhoenixRevival,
    ScryPassive,
    KillHeal,
    PowerDraw,
    ChaosPlay,
    ThreeCardEnergy,
    BlockDamage,
    EnergyHpCost,
    DoubleRemove,
    RandomStartEnergy,
    #[serde(rename = "extra_gold_5")]
    ExtraGold5,
    NoBlockShield,
    AttackHeal,
    PowerEnergy,
    CurseTrade,
    EnergyLessDraw,
    KillStrength,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Relic {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub rarity: Rarity,
    pub effect: RelicEffect,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PotionEffect {
    Heal(u32),
    Strength(u32),
    Block(u32),
    DamageAll(u32),
    Draw(u32),
    Poison(u32),
    Energy(u32),
}

impl PotionEffect {
    pub fn needs_target(self) -> bool {
        matches!(self, PotionEffect::Poison(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Potion {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub effect: PotionEffect,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error("no potion slots")]
    NoPotionSlots,
    #[error("relic already owned: {0}")]
    RelicOwned(String),
    #[error("invalid potion slot")]
    InvalidPotionSlot,
}

impl Player {
    pub fn has_relic(&self, effect: RelicEffect) -> bool {
        self.relics.iter().any(|relic| relic.effect == effect)
    }

    pub fn owns_relic(&self, id: &str) -> bool {
        self.relics.iter().any(|relic| relic.id == id)
    }

    /// Relics are unique by id.
    pub fn add_relic(&mut self, relic: Relic) -> Result<(), InventoryError> {
        if self.owns_relic(&relic.id) {
            return Err(InventoryError::RelicOwned(relic.id));
        }
        self.relics.push(relic);
        Ok(())
    }

    pub fn add_potion(&mut self, potion: Potion, slots: usize) -> Result<(), InventoryError> {
        if self.potions.len() >= slots {
            return Err(InventoryError::NoPotionSlots);
        }
        self.potions.push(potion);
        Ok(())
    }

    pub fn take_potion(&mut self, slot: usize) -> Result<Potion, InventoryError> {
        if slot >= self.potions.len() {
            return Err(InventoryError::InvalidPotionSlot);
        }
        Ok(self.potions.remove(slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relic(id: &str, effect: RelicEffect) -> Relic {
        Relic {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            rarity: Rarity::Common,
            effect,
        }
    }

    fn potion(id: &str) -> Potion {
        Potion {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            effect: PotionEffect::Heal(20),
        }
    }

    #[test]
    fn relics_are_unique() {
        let mut player = Player::new(70, 99);
        player
            .add_relic(relic("gold_tooth", RelicEffect::GoldPerCombat))
            .expect("first");
        let err = player
            .add_relic(relic("gold_tooth", RelicEffect::GoldPerCombat))
            .unwrap_err();
        assert_eq!(err, InventoryError::RelicOwned("gold_tooth".into()));
        assert!(player.has_relic(RelicEffect::GoldPerCombat));
    }

    #[test]
    fn potion_slots_are_bounded() {
        let mut player = Player::new(70, 99);
        for _ in 0..3 {
            player.add_potion(potion("health_potion"), 3).expect("slot");
        }
        assert_eq!(
            player.add_potion(potion("health_potion"), 3),
            Err(InventoryError::NoPotionSlots)
        );
        assert!(player.take_potion(3).is_err());
        assert_eq!(player.take_potion(0).expect("take").id, "health_potion");
        assert_eq!(player.potions.len(), 2);
    }

    #[test]
    fn potion_effect_json_shape() {
        let effect: PotionEffect = serde_json::from_str(r#"{"damage_all":20}"#).expect("parse");
        assert_eq!(effect, PotionEffect::DamageAll(20));
        let relic: RelicEffect = serde_json::from_str(r#""extra_gold_5""#).expect("parse");
        assert_eq!(relic, RelicEffect::ExtraGold5);
    }
}
