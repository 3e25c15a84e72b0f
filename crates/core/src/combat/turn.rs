use super::*;
use crate::{CardKind, EnemyAiRule, Potion, PotionEffect, StatusKind};

impl CombatState {
    /// Shuffles the deck into the draw pile, draws the opening hand and applies
    /// combat-start relics.
    pub fn start(setup: CombatSetup<'_>, rng: &mut RngState, events: &mut EventBus) -> Self {
        let relics = setup.relics.to_vec();
        let has = |effect: RelicEffect| relics.iter().any(|relic| relic.effect == effect);

        let mut max_energy = setup.base_energy;
        if has(RelicEffect::EnergyHpCost) {
            max_energy += 1;
        }
        let mut energy = max_energy;
        if has(RelicEffect::FirstTurnEnergy) {
            energy += 1;
        }
        if has(RelicEffect::CombatEnergy) {
            energy += 1;
        }
        if has(RelicEffect::RandomStartEnergy) {
            energy += rng.range(0, 2);
        }

        let mut player = CombatPlayer {
            hp: setup.hp,
            max_hp: setup.max_hp,
            block: 0,
            status: StatusEffects::new(),
            temp_strength: 0,
            start_hp: setup.hp,
        };
        if has(RelicEffect::CombatBlock) {
            player.block += 5;
        }
        if has(RelicEffect::CombatStrength) {
            player.status.add(StatusKind::Strength, 1);
        }
        if has(RelicEffect::ThornsPassive) {
            player.status.add(StatusKind::Thorns, 1);
        }
        if has(RelicEffect::CurseTrade) {
            player.status.add(StatusKind::Vulnerable, 2);
        }

        let mut enemies: Vec<Enemy> = setup
            .enemies
            .iter()
            .map(|template| Enemy::from_template(template))
            .collect();
        for enemy in &mut enemies {
            if has(RelicEffect::CombatPoison) {
                enemy.status.add(StatusKind::Poison, 1);
            }
            if has(RelicEffect::CurseTrade) {
                enemy.status.add(StatusKind::Weak, 2);
            }
        }

        let mut combat = Self {
            player,
            defeated: vec![false; enemies.len()],
            enemies,
            hand: Vec::new(),
            piles: crate::Piles::from_deck(setup.deck, rng),
            active_powers: Vec::new(),
            energy,
            max_energy,
            turn: 1,
            is_player_turn: true,
            combat_ended: false,
            victory: false,
            tier: setup.tier,
            relics,
            counters: TurnCounters::default(),
            hand_size: setup.hand_size,
            wound: setup.wound,
        };
        combat.draw(combat.hand_size, rng);

        events.push(Event::CombatStarted {
            tier: combat.tier,
            enemies: combat.enemies.iter().map(|enemy| enemy.id.clone()).collect(),
        });
        events.push(Event::TurnStarted {
            turn: combat.turn,
            energy: combat.energy,
            hand: combat.hand.len(),
        });
        log::debug!(
            "combat started: {:?} vs {} enemies, energy {}",
            combat.tier,
            combat.enemies.len(),
            combat.energy
        );
        combat
    }

    fn ensure_player_turn(&self) -> Result<(), CombatError> {
        if self.combat_ended || !self.is_player_turn {
            return Err(CombatError::CombatOver);
        }
        Ok(())
    }

    /// Plays the card at `hand_idx`. Rejections leave the state untouched.
    pub fn play_card(
        &mut self,
        hand_idx: usize,
        target: Option<usize>,
        rng: &mut RngState,
        events: &mut EventBus,
    ) -> Result<CombatReport, CombatError> {
        self.ensure_player_turn()?;
        let card = self.hand.get(hand_idx).ok_or(CombatError::CardNotInHand)?;
        if card.is_unplayable() {
            return Err(CombatError::Unplayable);
        }
        if card.has_special(Special::Ethereal) && self.counters.cards_played > 0 {
            return Err(CombatError::MustBeFirstCard);
        }
        let cost = self.effective_cost(card);
        if cost > self.energy {
            return Err(CombatError::NotEnoughEnergy {
                cost,
                energy: self.energy,
            });
        }
        let target = if card.needs_target() {
            Some(self.resolve_target(target)?)
        } else {
            None
        };

        let hp_before = self.total_enemy_hp();
        let mut card = self.hand.remove(hand_idx);
        let corruption = self.has_power(Special::Corruption);
        self.energy -= cost;
        self.counters.cards_played += 1;
        if card.kind == CardKind::Attack {
            self.counters.attacked = true;
        }
        events.push(Event::CardPlayed {
            card_id: card.id.clone(),
            cost,
        });

        self.resolve_card(&mut card, target, rng, events);
        self.after_play(&card, rng, events);

        if card.kind == CardKind::Power {
            self.active_powers.push(card);
        } else if card.exhaust || (corruption && card.kind == CardKind::Skill) {
            self.exhaust_card(card, rng, events);
        } else {
            self.piles.discard.push(card);
        }

        Ok(self.finish_action(hp_before, events))
    }

    /// On-play relic and power triggers.
    fn after_play(&mut self, card: &Card, rng: &mut RngState, events: &mut EventBus) {
        match card.kind {
            CardKind::Attack => {
                if self.has_relic(RelicEffect::AttackHeal) {
                    self.heal_player(1);
                }
                if self.has_relic(RelicEffect::AttackBlock) {
                    self.gain_block(1, rng, events);
                }
                for _ in 0..self.power_count(Special::RagePassive) {
                    self.gain_block(3, rng, events);
                }
            }
            CardKind::Power => {
                if self.has_relic(RelicEffect::PowerEnergy) {
                    self.energy += 1;
                }
                if self.has_relic(RelicEffect::PowerDraw) {
                    self.draw(1, rng);
                }
            }
            CardKind::Skill => {}
        }
        if self.counters.cards_played == 3 && self.has_relic(RelicEffect::ThreeCardEnergy) {
            self.energy += 1;
        }
    }

    /// End-of-turn effects, enemy turn, status tick, then the next player turn.
    pub fn end_turn(
        &mut self,
        ai: &EnemyAiRule,
        rng: &mut RngState,
        events: &mut EventBus,
    ) -> Result<CombatReport, CombatError> {
        self.ensure_player_turn()?;
        let hp_before = self.total_enemy_hp();

        for _ in 0..self.power_count(Special::Metallicize) {
            self.gain_block(3, rng, events);
        }
        if self.has_relic(RelicEffect::NoBlockShield) && self.player.block == 0 {
            self.gain_block(8, rng, events);
        }
        let hand = std::mem::take(&mut self.hand);
        self.piles.discard(hand);
        self.counters.attacked_last_turn = self.counters.attacked;
        self.is_player_turn = false;

        let mut kills = self.sweep_defeated(events);
        if !self.check_victory(events) {
            self.run_enemy_turn(ai, rng, events);
            kills += self.sweep_defeated(events);
        }
        if !self.combat_ended {
            self.tick_statuses();
            kills += self.sweep_defeated(events);
            if !self.check_victory(events) && !self.check_player_death(events) {
                self.begin_player_turn(rng, events);
                kills += self.sweep_defeated(events);
                self.check_victory(events);
            }
        }

        Ok(CombatReport {
            damage_dealt: hp_before.saturating_sub(self.total_enemy_hp()),
            enemies_killed: kills,
        })
    }

    fn begin_player_turn(&mut self, rng: &mut RngState, events: &mut EventBus) {
        self.turn += 1;
        self.energy = self.max_energy;
        if !self.has_power(Special::Barricade) {
            self.player.block = 0;
        }
        let attacked_last_turn = self.counters.attacked_last_turn;
        let poison_ticked = self.counters.poison_ticked;
        self.counters = TurnCounters {
            attacked_last_turn,
            ..TurnCounters::default()
        };
        self.is_player_turn = true;

        let demon = self.power_count(Special::DemonForm) * 2;
        self.player.status.add(StatusKind::Strength, demon);
        if self.has_relic(RelicEffect::TurnStrength) {
            self.player.status.add(StatusKind::Strength, 1);
        }
        if self.has_relic(RelicEffect::EnergyHpCost) && self.player.hp > 1 {
            self.player.hp -= 1;
        }
        if self.has_relic(RelicEffect::EnergyLessDraw) {
            self.energy += 1;
        }
        if self.has_relic(RelicEffect::PoisonEnergy) && poison_ticked {
            self.energy += 1;
        }

        let mut draws = self.hand_size + self.power_count(Special::BattleTrance) as usize;
        if self.has_relic(RelicEffect::ExtraDraw) {
            draws += 1;
        }
        if self.has_relic(RelicEffect::Meditation) && !attacked_last_turn {
            draws += 1;
        }
        if self.has_relic(RelicEffect::EnergyLessDraw) {
            draws = draws.saturating_sub(1);
        }
        self.draw(draws, rng);

        if self.has_relic(RelicEffect::ScryPassive) {
            self.draw(2, rng);
            if let Some(idx) = rng.index(self.hand.len()) {
                let dropped = self.hand.remove(idx);
                self.piles.discard.push(dropped);
            }
        }
        if self.has_relic(RelicEffect::ChaosPlay) {
            self.play_top_card_free(rng, events);
        }

        events.push(Event::TurnStarted {
            turn: self.turn,
            energy: self.energy,
            hand: self.hand.len(),
        });
    }

    /// Chaos Orb: the top draw-pile card resolves for free against a random living enemy.
    fn play_top_card_free(&mut self, rng: &mut RngState, events: &mut EventBus) {
        let Some(mut card) = self.piles.draw_one(rng) else {
            return;
        };
        if card.is_unplayable() {
            self.piles.discard.push(card);
            return;
        }
        let targets: Vec<usize> = self.living_enemies().map(|(idx, _)| idx).collect();
        let target = rng.pick(&targets).copied();
        if card.needs_target() && target.is_none() {
            self.piles.discard.push(card);
            return;
        }
        events.push(Event::CardPlayed {
            card_id: card.id.clone(),
            cost: 0,
        });
        self.resolve_card(&mut card, target, rng, events);
        if card.kind == CardKind::Power {
            self.active_powers.push(card);
        } else if card.exhaust {
            self.exhaust_card(card, rng, events);
        } else {
            self.piles.discard.push(card);
        }
    }

    /// Applies a potion's effect. The caller removes it from the belt on success.
    pub fn use_potion(
        &mut self,
        potion: &Potion,
        target: Option<usize>,
        rng: &mut RngState,
        events: &mut EventBus,
    ) -> Result<CombatReport, CombatError> {
        self.ensure_player_turn()?;
        let target = if potion.effect.needs_target() {
            Some(self.resolve_target(target)?)
        } else {
            None
        };
        let hp_before = self.total_enemy_hp();
        events.push(Event::PotionUsed {
            potion_id: potion.id.clone(),
        });
        match potion.effect {
            PotionEffect::Heal(amount) => self.heal_player(amount),
            PotionEffect::Strength(amount) => self.player.status.add(StatusKind::Strength, amount),
            PotionEffect::Block(amount) => self.gain_block(amount, rng, events),
            PotionEffect::DamageAll(amount) => {
                self.hit_all(amount, events);
            }
            PotionEffect::Draw(amount) => {
                self.draw(amount as usize, rng);
            }
            PotionEffect::Poison(amount) => {
                if let Some(enemy) = target.and_then(|idx| self.enemies.get_mut(idx)) {
                    enemy.status.add(StatusKind::Poison, amount);
                }
            }
            PotionEffect::Energy(amount) => self.energy += amount,
        }
        if self.has_relic(RelicEffect::PotionHeal) {
            self.heal_player(5);
        }
        Ok(self.finish_action(hp_before, events))
    }
}
