//! Card resolution pipeline: damage, block, status grant, then the special tag.

use super::*;
use crate::{CardKind, StatusKind, TargetScope};

impl CombatState {
    /// Damage from the player to one enemy. Returns HP removed.
    pub(crate) fn hit_enemy(&mut self, idx: usize, raw: u32, events: &mut EventBus) -> u32 {
        let Some(enemy) = self.enemies.get_mut(idx) else {
            return 0;
        };
        if !enemy.is_alive() {
            return 0;
        }
        let removed = enemy.take_damage(raw);
        events.push(Event::DamageDealt {
            enemy: idx,
            amount: removed,
            hp: enemy.hp,
        });
        removed
    }

    pub(crate) fn hit_all(&mut self, raw: u32, events: &mut EventBus) -> u32 {
        let targets: Vec<usize> = self.living_enemies().map(|(idx, _)| idx).collect();
        targets
            .into_iter()
            .map(|idx| self.hit_enemy(idx, raw, events))
            .sum()
    }

    pub(crate) fn hit_random(&mut self, raw: u32, rng: &mut RngState, events: &mut EventBus) {
        let targets: Vec<usize> = self.living_enemies().map(|(idx, _)| idx).collect();
        if let Some(idx) = rng.pick(&targets).copied() {
            self.hit_enemy(idx, raw, events);
        }
    }

    /// Every block gain goes through here so Juggernaut and Mirror Shield see it.
    pub(crate) fn gain_block(&mut self, amount: u32, rng: &mut RngState, events: &mut EventBus) {
        if amount == 0 {
            return;
        }
        self.player.block = self.player.block.saturating_add(amount);
        events.push(Event::BlockGained {
            amount,
            block: self.player.block,
        });
        for _ in 0..self.power_count(Special::Juggernaut) {
            self.hit_random(5, rng, events);
        }
        if self.has_relic(RelicEffect::BlockDamage) {
            self.hit_random(amount, rng, events);
        }
    }

    pub(crate) fn player_card_damage(&self, base: u32) -> u32 {
        card_damage(
            base,
            self.player.status.get(StatusKind::Strength),
            self.player.status.has(StatusKind::Weak),
        )
    }

    /// Moves a card to the exhaust pile and fires exhaust triggers.
    pub(crate) fn exhaust_card(&mut self, card: Card, rng: &mut RngState, events: &mut EventBus) {
        events.push(Event::CardExhausted {
            card_id: card.id.clone(),
        });
        if card.has_special(Special::Sentinel) {
            self.energy += 2;
        }
        self.piles.exhaust.push(card);
        let draws = self.power_count(Special::DarkEmbrace) as usize;
        if draws > 0 {
            self.draw(draws, rng);
        }
    }

    /// Applies `card` in fixed order. `target` must already be resolved when the
    /// card needs one. Growth specials mutate the played instance.
    pub(crate) fn resolve_card(
        &mut self,
        card: &mut Card,
        target: Option<usize>,
        rng: &mut RngState,
        events: &mut EventBus,
    ) {
        let special = card.special;

        // 1. damage
        let deferred = special.map_or(false, Special::defers_damage);
        if card.base_damage() > 0 && !deferred {
            let damage = self.player_card_damage(card.base_damage());
            if special.map_or(false, Special::hits_all_in_damage_step) {
                self.hit_all(damage, events);
            } else if let Some(idx) = target {
                self.hit_enemy(idx, damage, events);
            }
        }

        // 2. block
        if card.base_block() > 0 {
            self.gain_block(card.base_block(), rng, events);
        }

        // 3. status grant
        if let Some(grant) = card.status {
            match grant.target {
                TargetScope::Player => self.player.status.add(grant.kind, grant.amount),
                TargetScope::Enemy => {
                    if let Some(enemy) = target.and_then(|idx| self.enemies.get_mut(idx)) {
                        enemy.status.add(grant.kind, grant.amount);
                    }
                }
                TargetScope::AllEnemies => {
                    for enemy in self.enemies.iter_mut().filter(|enemy| enemy.is_alive()) {
                        enemy.status.add(grant.kind, grant.amount);
                    }
                }
            }
        }

        // 4. special
        if let Some(special) = special {
            self.resolve_special(special, card, target, rng, events);
        }
    }

    fn resolve_special(
        &mut self,
        special: Special,
        card: &mut Card,
        target: Option<usize>,
        rng: &mut RngState,
        events: &mut EventBus,
    ) {
        match special {
            Special::Cleave => {}
            Special::Execute => {
                if self.target_dead(target) {
                    self.energy += 1;
                }
            }
            Special::DrawCard => {
                self.draw(1, rng);
            }
            Special::Whirlwind => {
                let damage = self.player_card_damage(card.base_damage());
                for _ in 0..self.energy {
                    self.hit_all(damage, events);
                }
                self.energy = 0;
            }
            Special::Rampage | Special::SearingBlow => {
                if let Some(growth) = special.growth() {
                    card.damage = Some(card.base_damage() + growth);
                }
            }
            Special::Wound => {
                let wound = self.wound.clone();
                self.piles.insert_random(wound, rng);
            }
            Special::Immolate => {
                self.piles.discard.push(self.wound.clone());
            }
            Special::MultiHit => {
                if let Some(idx) = target {
                    let damage = self.player_card_damage(card.base_damage());
                    self.hit_enemy(idx, damage, events);
                }
            }
            Special::SelfDamage => {
                self.player_lose_hp(2, events);
            }
            Special::Headbutt => {
                self.piles.recycle_top_discard();
            }
            Special::SecondWind => {
                let (keep, spent): (Vec<Card>, Vec<Card>) = std::mem::take(&mut self.hand)
                    .into_iter()
                    .partition(|held| held.kind == CardKind::Attack);
                self.hand = keep;
                for held in spent {
                    self.exhaust_card(held, rng, events);
                    self.gain_block(5, rng, events);
                }
            }
            Special::EnergyDamage => {
                self.energy += 1;
                self.player_lose_hp(3, events);
            }
            Special::EnergyDraw => {
                self.energy += 1;
                self.draw(2, rng);
            }
            Special::Disarm => {
                if let Some(enemy) = target.and_then(|idx| self.enemies.get_mut(idx)) {
                    enemy.status.remove(StatusKind::Strength, 2);
                }
            }
            Special::Temporary => {
                if let Some(grant) = card.status.filter(|grant| grant.kind == StatusKind::Strength) {
                    self.player.temp_strength += grant.amount;
                }
            }
            Special::Cleanse => {
                for kind in StatusKind::ALL.into_iter().filter(|kind| kind.is_debuff()) {
                    self.player.status.clear(kind);
                }
                self.heal_player(3);
            }
            Special::Prepare => {
                self.draw(1, rng);
                if let Some(idx) = rng.index(self.hand.len()) {
                    let dropped = self.hand.remove(idx);
                    self.piles.discard.push(dropped);
                }
            }
            Special::Uppercut => {
                if let Some(enemy) = target.and_then(|idx| self.enemies.get_mut(idx)) {
                    enemy.status.add(StatusKind::Weak, 1);
                    enemy.status.add(StatusKind::Vulnerable, 1);
                }
            }
            Special::BodySlam => {
                if let Some(idx) = target {
                    self.hit_enemy(idx, self.player.block, events);
                }
            }
            Special::Offering => {
                if !self.player_lose_hp(6, events) {
                    self.energy += 2;
                    self.draw(3, rng);
                }
            }
            Special::Reaper => {
                let healed = self.hit_all(card.base_damage(), events);
                self.heal_player(healed);
            }
            Special::Feed => {
                if self.target_dead(target) {
                    self.player.max_hp += 3;
                    self.heal_player(3);
                }
            }
            Special::LimitBreak => {
                let strength = self.player.status.get(StatusKind::Strength);
                self.player.status.add(StatusKind::Strength, strength);
            }
            Special::BloodCost
            | Special::Ethereal
            | Special::Sentinel
            | Special::Unplayable
            | Special::RagePassive
            | Special::Metallicize
            | Special::DemonForm
            | Special::Barricade
            | Special::Corruption
            | Special::BattleTrance
            | Special::Juggernaut
            | Special::DarkEmbrace
            | Special::Evolve => {}
        }
    }

    fn target_dead(&self, target: Option<usize>) -> bool {
        target
            .and_then(|idx| self.enemies.get(idx))
            .map_or(false, |enemy| enemy.hp == 0)
    }
}
