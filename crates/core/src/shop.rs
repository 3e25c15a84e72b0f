use crate::{Card, Content, GameConfig, Potion, RngState};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardOffer {
    pub card: Card,
    pub price: u32,
    #[serde(default)]
    pub sold: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PotionOffer {
    pub potion: Potion,
    pub price: u32,
    #[serde(default)]
    pub sold: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShopState {
    pub cards: Vec<CardOffer>,
    pub potions: Vec<PotionOffer>,
    pub removal_price: u32,
    #[serde(default)]
    pub removal_used: bool,
    pub heal_price: u32,
    pub heal_amount: u32,
    #[serde(default)]
    pub heal_used: bool,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShopError {
    #[error("invalid offer index")]
    InvalidOffer,
    #[error("offer already purchased")]
    AlreadyPurchased,
}

impl ShopState {
    /// Stock for one visit: distinct playable catalog cards (commons only
    /// survive a keep roll) and distinct potions from the act pool.
    pub fn generate(config: &GameConfig, content: &Content, act: u8, rng: &mut RngState) -> Self {
        let rule = &config.shop;
        let mut candidates: Vec<&Card> = content
            .cards
            .iter()
            .filter(|card| !card.is_unplayable())
            .filter(|card| {
                card.rarity != crate::Rarity::Common || rng.chance(rule.common_keep_chance)
            })
            .collect();
        rng.shuffle(&mut candidates);
        let cards = candidates
            .into_iter()
            .take(rule.card_offers)
            .map(|card| CardOffer {
                card: card.clone(),
                price: config.card_price(card.rarity),
                sold: false,
            })
            .collect();

        let mut pool: Vec<&String> = content
            .act(act)
            .map(|pools| pools.potions.iter().collect())
            .unwrap_or_default();
        rng.shuffle(&mut pool);
        let potions = pool
            .into_iter()
            .filter_map(|id| content.potion(id))
            .take(rule.potion_offers)
            .map(|potion| PotionOffer {
                potion: potion.clone(),
                price: rule.prices.potion,
                sold: false,
            })
            .collect();

        Self {
            cards,
            potions,
            removal_price: rule.prices.removal,
            removal_used: false,
            heal_price: rule.prices.heal,
            heal_amount: rule.prices.heal_amount,
            heal_used: false,
        }
    }

    pub fn card_offer(&self, idx: usize) -> Result<&CardOffer, ShopError> {
        let offer = self.cards.get(idx).ok_or(ShopError::InvalidOffer)?;
        if offer.sold {
            return Err(ShopError::AlreadyPurchased);
        }
        Ok(offer)
    }

    pub fn potion_offer(&self, idx: usize) -> Result<&PotionOffer, ShopError> {
        let offer = self.potions.get(idx).ok_or(ShopError::InvalidOffer)?;
        if offer.sold {
            return Err(ShopError::AlreadyPurchased);
        }
        Ok(offer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActPools, CardKind, EncounterTable, PotionEffect, Rarity, RarityPools, Special};

    fn card(id: &str, rarity: Rarity) -> Card {
        Card {
            id: id.into(),
            name: id.into(),
            kind: CardKind::Skill,
            cost: 1,
            damage: None,
            block: Some(5),
            description: String::new(),
            rarity,
            exhaust: false,
            upgraded: false,
            status: None,
            special: None,
            uid: 0,
        }
    }

    fn content() -> Content {
        let mut wound = card("wound", Rarity::Uncommon);
        wound.special = Some(Special::Unplayable);
        let potion = |id: &str| Potion {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            effect: PotionEffect::Heal(20),
        };
        Content {
            cards: vec![
                card("a", Rarity::Uncommon),
                card("b", Rarity::Rare),
                card("c", Rarity::Uncommon),
                card("d", Rarity::Rare),
                card("e", Rarity::Uncommon),
                card("f", Rarity::Rare),
                wound,
            ],
            potions: vec![potion("p1"), potion("p2")],
            acts: vec![ActPools {
                act: 1,
                cards: RarityPools::default(),
                relics: RarityPools::default(),
                potions: vec!["p1".into(), "p2".into()],
                events: Vec::new(),
                encounters: EncounterTable::default(),
            }],
            ..Content::default()
        }
    }

    #[test]
    fn stock_is_distinct_priced_and_playable() {
        let config = GameConfig::default();
        let shop = ShopState::generate(&config, &content(), 1, &mut RngState::from_seed(8));
        assert_eq!(shop.cards.len(), 5);
        assert_eq!(shop.potions.len(), 2);
        for offer in &shop.cards {
            assert!(!offer.card.is_unplayable());
            assert_eq!(offer.price, config.card_price(offer.card.rarity));
        }
        let mut ids: Vec<&str> = shop.cards.iter().map(|offer| offer.card.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
        assert_eq!(shop.removal_price, 75);
        assert_eq!(shop.heal_amount, 15);
    }

    #[test]
    fn sold_offers_are_rejected() {
        let config = GameConfig::default();
        let mut shop = ShopState::generate(&config, &content(), 1, &mut RngState::from_seed(8));
        shop.cards[0].sold = true;
        assert_eq!(shop.card_offer(0), Err(ShopError::AlreadyPurchased));
        assert_eq!(shop.card_offer(9), Err(ShopError::InvalidOffer));
        assert!(shop.potion_offer(1).is_ok());
    }
}
