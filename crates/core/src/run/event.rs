use super::*;
use crate::*;

impl RunState {
    /// Resolves one option of the current event. Each event resolves once; its
    /// gold costs must be affordable up front.
    pub fn choose_event_option(
        &mut self,
        choice_id: &str,
        card_id: Option<&str>,
        events: &mut EventBus,
    ) -> Result<(), RunError> {
        self.require_phase(Phase::Event)?;
        let current = self
            .state
            .current_event
            .as_ref()
            .ok_or(RunError::InvalidChoice)?;
        if current.resolved {
            return Err(RunError::EventAlreadyResolved);
        }
        let choice = current
            .event
            .choice(choice_id)
            .cloned()
            .ok_or(RunError::InvalidChoice)?;

        let cost: u32 = choice
            .consequences
            .iter()
            .map(|consequence| match consequence {
                Consequence::Gold { amount } if *amount < 0 => amount.unsigned_abs(),
                Consequence::Gamble { stake } => *stake,
                _ => 0,
            })
            .sum();
        self.require_gold(cost)?;
        if let Some(id) = card_id {
            if self.state.player.deck_position(id).is_none() {
                return Err(RunError::CardNotInDeck);
            }
        }

        log::debug!("event choice {choice_id}");
        for consequence in &choice.consequences {
            self.apply_consequence(consequence, card_id, events)?;
            if self.state.phase.is_terminal() {
                break;
            }
        }
        if let Some(current) = self.state.current_event.as_mut() {
            current.resolved = true;
        }
        Ok(())
    }

    fn apply_consequence(
        &mut self,
        consequence: &Consequence,
        card_id: Option<&str>,
        events: &mut EventBus,
    ) -> Result<(), RunError> {
        let act = self.state.act;
        match consequence {
            Consequence::Damage { amount } => self.event_damage(*amount, events),
            Consequence::Heal { amount } => self.heal(*amount, events),
            Consequence::Gold { amount } => self.change_gold(i64::from(*amount), events)?,
            Consequence::MaxHp { amount } => self.change_max_hp(*amount, events),
            Consequence::Relic { id, rarity } => {
                let relic = match id {
                    Some(id) => self.content.relic(id).cloned(),
                    None => self
                        .content
                        .pick_relic(act, *rarity, &self.state.player.relics, &mut self.rng)
                        .cloned(),
                };
                match relic {
                    Some(relic) if !self.state.player.owns_relic(&relic.id) => {
                        self.grant_relic(relic, events)?;
                    }
                    _ => log::debug!("no relic to grant"),
                }
            }
            Consequence::Card {
                id,
                rarity,
                kind,
                count,
            } => {
                for _ in 0..*count {
                    let card = match id {
                        Some(id) => Some(self.content.card(id).cloned().ok_or(RunError::UnknownCard)?),
                        None => self
                            .content
                            .pick_card_where(act, *rarity, *kind, &mut self.rng)
                            .cloned(),
                    };
                    if let Some(card) = card {
                        self.grant_card(&card, events);
                    }
                }
            }
            Consequence::RemoveCard => {
                let target = match card_id {
                    Some(id) => Some(id.to_string()),
                    None => self
                        .rng
                        .pick(&self.state.player.deck)
                        .map(|card| card.id.clone()),
                };
                if let Some(id) = target {
                    self.remove_deck_card(&id, events)?;
                }
            }
            Consequence::UpgradeCard => {
                let target = match card_id {
                    Some(id) => Some(id.to_string()),
                    None => {
                        let candidates: Vec<&Card> = self
                            .state
                            .player
                            .deck
                            .iter()
                            .filter(|card| !card.upgraded)
                            .collect();
                        self.rng.pick(&candidates).map(|card| card.id.clone())
                    }
                };
                if let Some(id) = target {
                    self.upgrade_deck_card(&id, events)?;
                }
            }
            Consequence::Potion { id } => {
                let potion = match id {
                    Some(id) => self.content.potion(id).cloned(),
                    None => self.content.pick_potion(act, &mut self.rng).cloned(),
                };
                if let Some(potion) = potion {
                    match self.grant_potion(potion, events) {
                        Err(RunError::PotionSlotsFull) => log::debug!("potion belt full"),
                        other => other?,
                    }
                }
            }
            Consequence::Gamble { stake } => {
                let delta = i64::from(*stake);
                if self.rng.chance(0.5) {
                    self.change_gold(delta, events)?;
                } else {
                    self.change_gold(-delta, events)?;
                }
            }
            Consequence::Nothing => {}
        }
        Ok(())
    }

    pub fn leave_event(&mut self, events: &mut EventBus) -> Result<(), RunError> {
        self.require_phase(Phase::Event)?;
        self.state.current_event = None;
        self.complete_current_node(events);
        Ok(())
    }
}
