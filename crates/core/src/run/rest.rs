use super::*;
use crate::*;

impl RunState {
    pub fn rest_heal(&mut self, events: &mut EventBus) -> Result<(), RunError> {
        self.require_phase(Phase::Rest)?;
        let amount = self.config.rest_heal_amount(self.state.player.max_hp);
        self.heal(amount, events);
        self.complete_current_node(events);
        Ok(())
    }

    pub fn rest_upgrade(&mut self, card_id: &str, events: &mut EventBus) -> Result<(), RunError> {
        self.require_phase(Phase::Rest)?;
        self.upgrade_deck_card(card_id, events)?;
        self.complete_current_node(events);
        Ok(())
    }

    /// Removes one copy of `card_id`. A second removal needs Deck Master.
    pub fn rest_remove(
        &mut self,
        card_id: &str,
        second: Option<&str>,
        events: &mut EventBus,
    ) -> Result<(), RunError> {
        self.require_phase(Phase::Rest)?;
        if second.is_some() && !self.state.player.has_relic(RelicEffect::DoubleRemove) {
            return Err(RunError::InvalidChoice);
        }
        self.remove_deck_card(card_id, events)?;
        if let Some(second) = second {
            self.remove_deck_card(second, events)?;
        }
        self.complete_current_node(events);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::run::tests::*;
    use crate::*;

    #[test]
    fn heal_restores_thirty_percent() {
        let mut run = at_node(2, NodeType::Rest);
        assert_eq!(run.state.phase, Phase::Rest);
        run.state.player.hp = 30;
        let mut events = EventBus::default();
        run.dispatch(Action::RestHeal, &mut events).expect("heal");
        assert_eq!(run.state.player.hp, 51);
        assert_eq!(run.state.phase, Phase::Map);
        assert_eq!(run.state.stats.floors_cleared, 1);
    }

    #[test]
    fn heal_caps_at_max_hp() {
        let mut run = at_node(2, NodeType::Rest);
        run.state.player.hp = 65;
        let mut events = EventBus::default();
        run.dispatch(Action::RestHeal, &mut events).expect("heal");
        assert_eq!(run.state.player.hp, 70);
    }

    #[test]
    fn upgrade_changes_one_instance() {
        let mut run = at_node(2, NodeType::Rest);
        let mut events = EventBus::default();
        run.dispatch(Action::RestUpgrade { card_id: "strike".into() }, &mut events)
            .expect("upgrade");
        let upgraded: Vec<&Card> = run
            .state
            .player
            .deck
            .iter()
            .filter(|card| card.upgraded)
            .collect();
        assert_eq!(upgraded.len(), 1);
        assert_eq!(upgraded[0].damage, Some(9));
        assert_eq!(upgraded[0].name, "Strike+");
    }

    #[test]
    fn remove_takes_exactly_one_copy() {
        let mut run = at_node(2, NodeType::Rest);
        let mut events = EventBus::default();
        run.dispatch(
            Action::RestRemove {
                card_id: "strike".into(),
                second: None,
            },
            &mut events,
        )
        .expect("remove");
        let strikes = run
            .state
            .player
            .deck
            .iter()
            .filter(|card| card.id == "strike")
            .count();
        assert_eq!(strikes, 4);
        assert_eq!(run.state.player.deck.len(), 9);
    }

    #[test]
    fn second_removal_needs_deck_master() {
        let mut run = at_node(2, NodeType::Rest);
        let mut events = EventBus::default();
        let action = Action::RestRemove {
            card_id: "strike".into(),
            second: Some("defend".into()),
        };
        assert_eq!(
            run.dispatch(action.clone(), &mut events),
            Err(RunError::InvalidChoice)
        );
        give_relic(&mut run, "deck_master");
        run.dispatch(action, &mut events).expect("double remove");
        assert_eq!(run.state.player.deck.len(), 8);
    }

    #[test]
    fn fully_upgraded_card_is_rejected() {
        let mut run = at_node(2, NodeType::Rest);
        for card in run.state.player.deck.iter_mut().filter(|card| card.id == "defend") {
            card.upgrade(3, 3);
        }
        let before = run.state.clone();
        let mut events = EventBus::default();
        assert_eq!(
            run.dispatch(Action::RestUpgrade { card_id: "defend".into() }, &mut events),
            Err(RunError::AlreadyUpgraded)
        );
        assert_eq!(run.state, before);
    }

    #[test]
    fn missing_card_is_rejected() {
        let mut run = at_node(2, NodeType::Rest);
        let mut events = EventBus::default();
        assert_eq!(
            run.dispatch(Action::RestUpgrade { card_id: "bash".into() }, &mut events),
            Err(RunError::CardNotInDeck)
        );
        assert_eq!(run.state.phase, Phase::Rest);
    }
}
