use super::*;
use crate::*;

impl RunState {
    /// Rolls the post-combat card offer and moves to the reward screen.
    pub(super) fn offer_card_reward(&mut self, tier: EncounterTier, events: &mut EventBus) {
        let mut count = self.config.rewards.card_options;
        if self.state.player.has_relic(RelicEffect::ExtraCardReward) {
            count += 1;
        }
        let weights: Vec<u32> = self
            .config
            .rewards
            .rarity_weights
            .iter()
            .map(|entry| entry.weight)
            .collect();
        let Some(pools) = self.content.act(self.state.act).map(|act| &act.cards) else {
            log::debug!("no card pool for act {}", self.state.act);
            self.state.card_reward = Some(Vec::new());
            self.set_phase(Phase::CardReward, events);
            return;
        };
        let mut offers: Vec<Card> = Vec::with_capacity(count);
        while offers.len() < count {
            let rarity = self
                .rng
                .weighted(&weights)
                .and_then(|idx| self.config.rewards.rarity_weights.get(idx))
                .map(|entry| entry.rarity)
                .unwrap_or(Rarity::Common);
            let fresh = |id: &&String| !offers.iter().any(|offer| &offer.id == *id);
            let mut candidates: Vec<&String> = pools.get(rarity).iter().filter(fresh).collect();
            if candidates.is_empty() {
                // rarity exhausted, fall back to the whole act pool
                candidates = pools.all().filter(fresh).collect();
            }
            let Some(card) = self
                .rng
                .pick(&candidates)
                .and_then(|id| self.content.card(id))
            else {
                break;
            };
            offers.push(card.clone());
        }
        log::debug!("card reward after {tier:?} fight: {} offers", offers.len());
        self.state.card_reward = Some(offers);
        self.set_phase(Phase::CardReward, events);
    }

    /// Takes an offered card (or skips), pays out gold and after-combat relics,
    /// clears the node and handles the act boss.
    pub fn choose_card_reward(
        &mut self,
        card_id: Option<&str>,
        events: &mut EventBus,
    ) -> Result<(), RunError> {
        self.require_phase(Phase::CardReward)?;
        if let Some(id) = card_id {
            let card = self
                .state
                .card_reward
                .as_ref()
                .and_then(|offers| offers.iter().find(|offer| offer.id == id))
                .cloned()
                .ok_or(RunError::InvalidChoice)?;
            self.grant_card(&card, events);
        }

        let tier = self
            .state
            .combat
            .as_ref()
            .map(|combat| combat.tier)
            .or_else(|| self.state.current_map_node().and_then(|node| node.kind.tier()))
            .unwrap_or(EncounterTier::Normal);
        let range = self.config.combat_gold(tier);
        let gold = self.rng.range(range.min, range.max);
        self.change_gold(i64::from(gold), events)?;

        let player = &self.state.player;
        let gold_tooth = player.has_relic(RelicEffect::GoldPerCombat);
        let worn_boots = player.has_relic(RelicEffect::ExtraGold5);
        let blood_vial = player.has_relic(RelicEffect::HealAfterCombat);
        let iron_ring = player.has_relic(RelicEffect::HpAfterCombat);
        if gold_tooth {
            self.change_gold(10, events)?;
        }
        if worn_boots {
            self.change_gold(5, events)?;
        }
        if blood_vial {
            self.heal(2, events);
        }
        if iron_ring && tier != EncounterTier::Boss {
            self.change_max_hp(3, events);
        }

        self.state.combat = None;
        self.state.card_reward = None;
        self.complete_current_node(events);

        if tier == EncounterTier::Boss {
            if self.state.act >= self.config.map.acts {
                self.finish_run(true, events);
            } else {
                self.advance_act(events);
            }
        }
        Ok(())
    }
}
