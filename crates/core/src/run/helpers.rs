use super::*;
use crate::*;

impl RunState {
    pub(super) fn require_phase(&self, phase: Phase) -> Result<(), RunError> {
        if self.state.phase != phase {
            return Err(RunError::InvalidPhase(self.state.phase));
        }
        Ok(())
    }

    pub(super) fn require_gold(&self, price: u32) -> Result<(), RunError> {
        let gold = self.state.player.gold;
        if gold < price {
            return Err(RunError::NotEnoughGold { price, gold });
        }
        Ok(())
    }

    /// Positive deltas count toward run statistics. Spending more than the
    /// player holds is rejected.
    pub(super) fn change_gold(&mut self, delta: i64, events: &mut EventBus) -> Result<(), RunError> {
        if delta == 0 {
            return Ok(());
        }
        if delta < 0 {
            let price = u32::try_from(delta.unsigned_abs()).unwrap_or(u32::MAX);
            self.require_gold(price)?;
            self.state.player.gold -= price;
        } else {
            let gain = u32::try_from(delta).unwrap_or(u32::MAX);
            self.state.player.gold = self.state.player.gold.saturating_add(gain);
            self.state.stats.gold_earned = self.state.stats.gold_earned.saturating_add(gain);
        }
        events.push(Event::GoldChanged {
            delta,
            gold: self.state.player.gold,
        });
        Ok(())
    }

    pub(super) fn heal(&mut self, amount: u32, events: &mut EventBus) {
        let before = self.state.player.hp;
        self.state.player.heal(amount);
        if self.state.player.hp != before {
            self.push_hp(events);
        }
    }

    /// Max HP changes move current HP by the same amount. Neither drops below 1.
    pub(super) fn change_max_hp(&mut self, delta: i32, events: &mut EventBus) {
        let player = &mut self.state.player;
        let step = delta.unsigned_abs();
        if delta >= 0 {
            player.max_hp = player.max_hp.saturating_add(step);
            player.hp = player.hp.saturating_add(step).min(player.max_hp);
        } else {
            player.max_hp = player.max_hp.saturating_sub(step).max(1);
            player.hp = player.hp.saturating_sub(step).max(1).min(player.max_hp);
        }
        self.push_hp(events);
    }

    /// Out-of-combat damage. Lethal damage consumes a Phoenix Feather if one is
    /// owned, otherwise the run ends.
    pub(super) fn event_damage(&mut self, amount: u32, events: &mut EventBus) {
        let player = &mut self.state.player;
        player.hp = player.hp.saturating_sub(amount);
        if player.hp == 0 {
            if let Some(pos) = player
                .relics
                .iter()
                .position(|relic| relic.effect == RelicEffect::PhoenixRevival)
            {
                player.relics.remove(pos);
                player.hp = (player.max_hp / 4).max(1);
                log::debug!("phoenix feather revived player at {} hp", player.hp);
                events.push(Event::PlayerRevived { hp: player.hp });
            }
        }
        self.push_hp(events);
        if self.state.player.hp == 0 {
            self.finish_run(false, events);
        }
    }

    pub(super) fn push_hp(&self, events: &mut EventBus) {
        events.push(Event::HpChanged {
            hp: self.state.player.hp,
            max_hp: self.state.player.max_hp,
        });
    }

    /// Adds a relic, applying its on-pickup effect. Already owned relics are rejected.
    pub(super) fn grant_relic(&mut self, relic: Relic, events: &mut EventBus) -> Result<(), RunError> {
        let effect = relic.effect;
        let relic_id = relic.id.clone();
        self.state.player.add_relic(relic)?;
        events.push(Event::RelicGained { relic_id });
        if effect == RelicEffect::UpgradeBasics {
            let rest = &self.config.rest;
            let (damage, block) = (rest.upgrade_damage, rest.upgrade_block);
            for card in self.state.player.deck.iter_mut() {
                if !card.upgraded && (card.id == "strike" || card.id == "defend") {
                    card.upgrade(damage, block);
                    events.push(Event::CardUpgraded {
                        card_id: card.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub(super) fn grant_card(&mut self, template: &Card, events: &mut EventBus) {
        self.state.add_to_deck(template);
        events.push(Event::CardAdded {
            card_id: template.id.clone(),
        });
    }

    pub(super) fn grant_potion(&mut self, potion: Potion, events: &mut EventBus) -> Result<(), RunError> {
        let potion_id = potion.id.clone();
        self.state
            .player
            .add_potion(potion, self.config.player.potion_slots)
            .map_err(|err| match err {
                InventoryError::NoPotionSlots => RunError::PotionSlotsFull,
                other => RunError::Inventory(other),
            })?;
        events.push(Event::PotionGained { potion_id });
        Ok(())
    }

    /// Removes the first deck card with `card_id`, leaving other copies in place.
    pub(super) fn remove_deck_card(&mut self, card_id: &str, events: &mut EventBus) -> Result<(), RunError> {
        let pos = self
            .state
            .player
            .deck_position(card_id)
            .ok_or(RunError::CardNotInDeck)?;
        let card = self.state.player.deck.remove(pos);
        events.push(Event::CardRemoved { card_id: card.id });
        Ok(())
    }

    /// Upgrades the first not yet upgraded deck card with `card_id`.
    pub(super) fn upgrade_deck_card(&mut self, card_id: &str, events: &mut EventBus) -> Result<(), RunError> {
        let (damage, block) = (self.config.rest.upgrade_damage, self.config.rest.upgrade_block);
        let deck = &mut self.state.player.deck;
        if !deck.iter().any(|card| card.id == card_id) {
            return Err(RunError::CardNotInDeck);
        }
        let card = deck
            .iter_mut()
            .find(|card| card.id == card_id && !card.upgraded)
            .ok_or(RunError::AlreadyUpgraded)?;
        card.upgrade(damage, block);
        events.push(Event::CardUpgraded {
            card_id: card_id.to_string(),
        });
        Ok(())
    }

    /// Marks the current node cleared, opens the next floor and returns to the map.
    pub(super) fn complete_current_node(&mut self, events: &mut EventBus) {
        if let Some(id) = self.state.current_node.clone() {
            crate::complete_node(&mut self.state.map, &id);
        }
        self.state.stats.floors_cleared += 1;
        self.set_phase(Phase::Map, events);
    }

    pub(super) fn finish_run(&mut self, victory: bool, events: &mut EventBus) {
        self.state.combat = None;
        if victory {
            log::info!("run won after {} floors", self.state.stats.floors_cleared);
            self.set_phase(Phase::Victory, events);
            events.push(Event::RunWon);
        } else {
            log::info!(
                "run lost in act {} on floor {}",
                self.state.act,
                self.state.floor
            );
            self.set_phase(Phase::GameOver, events);
            events.push(Event::RunLost {
                act: self.state.act,
                floor: self.state.floor,
            });
        }
    }
}
