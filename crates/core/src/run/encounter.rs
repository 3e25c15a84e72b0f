use super::*;
use crate::*;

impl RunState {
    pub(super) fn start_combat(&mut self, tier: EncounterTier, events: &mut EventBus) -> Result<(), RunError> {
        let ids = self
            .content
            .pick_encounter(self.state.act, tier, &mut self.rng)
            .ok_or(RunError::NoEncounter)?;
        let templates: Vec<&EnemyTemplate> = ids
            .iter()
            .filter_map(|id| self.content.enemy(id))
            .collect();
        if templates.is_empty() {
            return Err(RunError::NoEncounter);
        }
        let wound = self
            .content
            .card(WOUND_CARD_ID)
            .cloned()
            .ok_or(RunError::UnknownCard)?;
        let player = &self.state.player;
        let setup = CombatSetup {
            hp: player.hp,
            max_hp: player.max_hp,
            deck: &player.deck,
            relics: &player.relics,
            enemies: templates,
            tier,
            base_energy: self.config.player.energy,
            hand_size: self.config.player.hand_size,
            wound,
        };
        let combat = CombatState::start(setup, &mut self.rng, events);
        self.state.player.block = 0;
        self.state.player.status = StatusEffects::new();
        self.state.combat = Some(combat);
        self.set_phase(Phase::Combat, events);
        Ok(())
    }

    pub fn play_card(
        &mut self,
        card: &CardRef,
        target: Option<usize>,
        events: &mut EventBus,
    ) -> Result<(), RunError> {
        self.require_phase(Phase::Combat)?;
        let combat = self.state.combat.as_mut().ok_or(RunError::NoCombat)?;
        let idx = card.find(&combat.hand).ok_or(CombatError::CardNotInHand)?;
        let report = combat.play_card(idx, target, &mut self.rng, events)?;
        self.state.stats.cards_played += 1;
        self.after_combat_action(report, events);
        Ok(())
    }

    pub fn end_turn(&mut self, events: &mut EventBus) -> Result<(), RunError> {
        self.require_phase(Phase::Combat)?;
        let combat = self.state.combat.as_mut().ok_or(RunError::NoCombat)?;
        let report = combat.end_turn(&self.config.enemy_ai, &mut self.rng, events)?;
        self.after_combat_action(report, events);
        Ok(())
    }

    /// Drinks the potion in `slot`. Only usable during combat.
    pub fn use_potion(
        &mut self,
        slot: usize,
        target: Option<usize>,
        events: &mut EventBus,
    ) -> Result<(), RunError> {
        self.require_phase(Phase::Combat)?;
        let potion = self
            .state
            .player
            .potions
            .get(slot)
            .cloned()
            .ok_or(CombatError::InvalidPotion)?;
        let combat = self.state.combat.as_mut().ok_or(RunError::NoCombat)?;
        let report = combat.use_potion(&potion, target, &mut self.rng, events)?;
        self.state.player.take_potion(slot)?;
        self.after_combat_action(report, events);
        Ok(())
    }

    /// Folds combat results into the run: HP, relics, statistics and card
    /// growth, then resolves the end of the fight.
    fn after_combat_action(&mut self, report: CombatReport, events: &mut EventBus) {
        let stats = &mut self.state.stats;
        stats.damage_dealt += u64::from(report.damage_dealt);
        stats.enemies_killed += report.enemies_killed;

        let Some(combat) = self.state.combat.as_ref() else {
            return;
        };
        let player = &mut self.state.player;
        player.hp = combat.player.hp;
        player.max_hp = combat.player.max_hp;
        if player.relics.len() != combat.relics.len() {
            player.relics = combat.relics.clone();
        }
        for (uid, damage) in combat.grown_cards() {
            if let Some(card) = player.deck.iter_mut().find(|card| card.uid == uid) {
                card.damage = Some(damage);
            }
        }
        if !combat.is_over() {
            return;
        }
        if combat.victory {
            let tier = combat.tier;
            self.state.player.block = 0;
            self.state.player.status = StatusEffects::new();
            self.offer_card_reward(tier, events);
        } else {
            self.finish_run(false, events);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::run::tests::*;
    use crate::*;

    #[test]
    fn entering_combat_node_starts_encounter() {
        let mut run = started_run(5);
        let mut events = EventBus::default();
        run.dispatch(Action::EnterNode { node_id: "1-0-0".into() }, &mut events)
            .expect("enter");
        assert_eq!(run.state.phase, Phase::Combat);
        let combat = run.state.combat.as_ref().expect("combat");
        assert_eq!(combat.hand.len(), 5);
        assert_eq!(combat.energy, 3);
        assert_eq!(combat.enemies.len(), 1);
        assert_eq!(run.state.current_node.as_deref(), Some("1-0-0"));
    }

    #[test]
    fn rejected_card_leaves_state_untouched() {
        let mut run = in_combat(5);
        set_hand(&mut run, &["strike", "defend"]);
        let before = run.state.clone();
        let mut events = EventBus::default();
        let err = run
            .dispatch(
                Action::PlayCard {
                    card: CardRef::Id("bash".into()),
                    target: None,
                },
                &mut events,
            )
            .unwrap_err();
        assert_eq!(err, RunError::Combat(CombatError::CardNotInHand));

        let err = run
            .dispatch(
                Action::PlayCard {
                    card: CardRef::Index(0),
                    target: Some(4),
                },
                &mut events,
            )
            .unwrap_err();
        assert_eq!(err, RunError::Combat(CombatError::InvalidTarget));
        assert_eq!(run.state, before);
        assert!(events.is_empty());
    }

    #[test]
    fn played_cards_update_stats_and_hp() {
        let mut run = in_combat(5);
        set_hand(&mut run, &["strike", "defend"]);
        let mut events = EventBus::default();
        run.dispatch(
            Action::PlayCard {
                card: CardRef::Id("strike".into()),
                target: None,
            },
            &mut events,
        )
        .expect("strike");
        assert_eq!(run.state.stats.cards_played, 1);
        assert_eq!(run.state.stats.damage_dealt, 6);

        run.dispatch(Action::EndTurn, &mut events).expect("end turn");
        let combat = run.state.combat.as_ref().expect("combat");
        assert_eq!(run.state.player.hp, combat.player.hp);
        assert!(run.state.player.hp < 70);
    }

    #[test]
    fn potion_is_consumed_on_use() {
        let mut run = in_combat(5);
        let potion = run.content.potion("fire_potion").cloned().expect("potion");
        run.state.player.potions.push(potion);
        let mut events = EventBus::default();
        run.dispatch(Action::UsePotion { slot: 0, target: None }, &mut events)
            .expect("potion");
        assert!(run.state.player.potions.is_empty());
        assert_eq!(run.state.stats.damage_dealt, 20);
        assert_eq!(
            run.dispatch(Action::UsePotion { slot: 0, target: None }, &mut events),
            Err(RunError::Combat(CombatError::InvalidPotion))
        );
    }

    #[test]
    fn potions_are_combat_only() {
        let mut run = started_run(5);
        let potion = run.content.potion("fire_potion").cloned().expect("potion");
        run.state.player.potions.push(potion);
        let mut events = EventBus::default();
        assert_eq!(
            run.dispatch(Action::UsePotion { slot: 0, target: None }, &mut events),
            Err(RunError::InvalidPhase(Phase::Map))
        );
    }

    #[test]
    fn defeat_ends_the_run() {
        let mut run = in_combat(5);
        run.state.player.hp = 1;
        if let Some(combat) = run.state.combat.as_mut() {
            combat.player.hp = 1;
            combat.player.block = 0;
        }
        let mut events = EventBus::default();
        run.dispatch(Action::EndTurn, &mut events).expect("end turn");
        assert_eq!(run.state.phase, Phase::GameOver);
        assert!(run.state.combat.is_none());
        assert!(events.drain().any(|event| matches!(event, Event::RunLost { .. })));
    }
}
