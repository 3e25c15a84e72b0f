use crate::{EncounterTier, NodeType, Rarity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValueRange {
    pub min: u32,
    pub max: u32,
}

impl ValueRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRule {
    pub max_hp: u32,
    pub gold: u32,
    pub energy: u32,
    pub hand_size: usize,
    pub potion_slots: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeWeight {
    pub kind: NodeType,
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapRule {
    pub acts: u8,
    pub floors: u32,
    pub paths: u32,
    pub node_weights: Vec<NodeWeight>,
    /// Chance that the middle floor is forced to a rest site before the weighted roll.
    pub mid_floor_rest_chance: f64,
    /// Chance that a node links to exactly one node on the next floor (otherwise two).
    pub single_connection_chance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestRule {
    pub heal_percent: u32,
    pub upgrade_damage: u32,
    pub upgrade_block: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RarityWeight {
    pub rarity: Rarity,
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatGold {
    pub tier: EncounterTier,
    pub gold: ValueRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardRule {
    pub card_options: usize,
    pub rarity_weights: Vec<RarityWeight>,
    pub combat_gold: Vec<CombatGold>,
    pub treasure_gold: ValueRange,
    pub treasure_relic_chance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopPrices {
    pub common: u32,
    pub uncommon: u32,
    pub rare: u32,
    pub potion: u32,
    pub removal: u32,
    pub heal: u32,
    pub heal_amount: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopRule {
    pub card_offers: usize,
    pub potion_offers: usize,
    pub common_keep_chance: f64,
    pub prices: ShopPrices,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyAiRule {
    pub attack_weight: u32,
    pub defend_weight: u32,
    pub buff_weight: u32,
    pub min_damage: u32,
    /// Fraction of max HP used as base attack damage.
    pub damage_ratio: f64,
    pub damage_spread: u32,
    pub block: ValueRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub player: PlayerRule,
    pub map: MapRule,
    pub rest: RestRule,
    pub rewards: RewardRule,
    pub shop: ShopRule,
    pub enemy_ai: EnemyAiRule,
}

impl GameConfig {
    pub fn combat_gold(&self, tier: EncounterTier) -> ValueRange {
        self.rewards
            .combat_gold
            .iter()
            .find(|entry| entry.tier == tier)
            .map(|entry| entry.gold)
            .unwrap_or(ValueRange::new(0, 0))
    }

    pub fn card_price(&self, rarity: Rarity) -> u32 {
        match rarity {
            Rarity::Common => self.shop.prices.common,
            Rarity::Uncommon => self.shop.prices.uncommon,
            Rarity::Rare => self.shop.prices.rare,
        }
    }

    pub fn rest_heal_amount(&self, max_hp: u32) -> u32 {
        max_hp * self.rest.heal_percent / 100
    }

    /// Last floor index of each act; always a boss floor.
    pub fn boss_floor(&self) -> u32 {
        self.map.floors.saturating_sub(1)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player: PlayerRule {
                max_hp: 70,
                gold: 99,
                energy: 3,
                hand_size: 5,
                potion_slots: 3,
            },
            map: MapRule {
                acts: 3,
                floors: 15,
                paths: 3,
                node_weights: vec![
                    NodeWeight { kind: NodeType::Combat, weight: 50 },
                    NodeWeight { kind: NodeType::Elite, weight: 10 },
                    NodeWeight { kind: NodeType::Rest, weight: 10 },
                    NodeWeight { kind: NodeType::Shop, weight: 10 },
                    NodeWeight { kind: NodeType::Event, weight: 15 },
                    NodeWeight { kind: NodeType::Treasure, weight: 5 },
                ],
                mid_floor_rest_chance: 0.3,
                single_connection_chance: 0.6,
            },
            rest: RestRule {
                heal_percent: 30,
                upgrade_damage: 3,
                upgrade_block: 3,
            },
            rewards: RewardRule {
                card_options: 3,
                rarity_weights: vec![
                    RarityWeight { rarity: Rarity::Common, weight: 70 },
                    RarityWeight { rarity: Rarity::Uncommon, weight: 25 },
                    RarityWeight { rarity: Rarity::Rare, weight: 5 },
                ],
                combat_gold: vec![
                    CombatGold { tier: EncounterTier::Normal, gold: ValueRange::new(10, 20) },
                    CombatGold { tier: EncounterTier::Elite, gold: ValueRange::new(25, 35) },
                    CombatGold { tier: EncounterTier::Boss, gold: ValueRange::new(50, 70) },
                ],
                treasure_gold: ValueRange::new(25, 50),
                treasure_relic_chance: 0.5,
            },
            shop: ShopRule {
                card_offers: 5,
                potion_offers: 3,
                common_keep_chance: 0.7,
                prices: ShopPrices {
                    common: 50,
                    uncommon: 100,
                    rare: 150,
                    potion: 50,
                    removal: 75,
                    heal: 30,
                    heal_amount: 15,
                },
            },
            enemy_ai: EnemyAiRule {
                attack_weight: 60,
                defend_weight: 20,
                buff_weight: 20,
                min_damage: 5,
                damage_ratio: 0.08,
                damage_spread: 4,
                block: ValueRange::new(3, 10),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_heal_floors_thirty_percent() {
        let config = GameConfig::default();
        assert_eq!(config.rest_heal_amount(70), 21);
        assert_eq!(config.rest_heal_amount(9), 2);
    }

    #[test]
    fn combat_gold_by_tier() {
        let config = GameConfig::default();
        assert_eq!(config.combat_gold(EncounterTier::Elite), ValueRange::new(25, 35));
        assert_eq!(config.boss_floor(), 14);
    }
}
