use crate::{
    Card, EncounterTier, Enemy, EnemyTemplate, Event, EventBus, Relic, RelicEffect, RngState,
    Special, StatusEffects,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod effects;
mod enemy_turn;
mod math;
mod turn;

pub use math::*;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CombatError {
    #[error("card not in hand")]
    CardNotInHand,
    #[error("card is unplayable")]
    Unplayable,
    #[error("not enough energy: cost {cost}, have {energy}")]
    NotEnoughEnergy { cost: u32, energy: u32 },
    #[error("invalid target")]
    InvalidTarget,
    #[error("no living target")]
    NoLivingTarget,
    #[error("card must be the first played this turn")]
    MustBeFirstCard,
    #[error("combat is over")]
    CombatOver,
    #[error("invalid potion")]
    InvalidPotion,
}

/// In-combat view of the player. HP is copied back to the run after every action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CombatPlayer {
    pub hp: u32,
    pub max_hp: u32,
    pub block: u32,
    #[serde(default)]
    pub status: StatusEffects,
    /// Strength granted until the end of the current round (Flex).
    #[serde(default)]
    pub temp_strength: u32,
    /// HP when the encounter began.
    pub start_hp: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnCounters {
    pub cards_played: u32,
    pub attacked: bool,
    pub attacked_last_turn: bool,
    /// Set when any enemy took poison damage in the last status tick.
    pub poison_ticked: bool,
}

/// Totals for one accepted combat action, used for run statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombatReport {
    pub damage_dealt: u32,
    pub enemies_killed: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CombatState {
    pub player: CombatPlayer,
    pub enemies: Vec<Enemy>,
    pub hand: Vec<Card>,
    pub piles: crate::Piles,
    pub active_powers: Vec<Card>,
    pub energy: u32,
    pub max_energy: u32,
    pub turn: u32,
    pub is_player_turn: bool,
    pub combat_ended: bool,
    pub victory: bool,
    pub tier: EncounterTier,
    /// Relics carried into the fight. A spent Phoenix Feather is removed here.
    #[serde(default)]
    pub relics: Vec<Relic>,
    #[serde(default)]
    pub counters: TurnCounters,
    pub hand_size: usize,
    /// Template used when a card shuffles a Wound into the piles.
    pub wound: Card,
    #[serde(default)]
    defeated: Vec<bool>,
}

/// Everything needed to open an encounter.
#[derive(Debug, Clone)]
pub struct CombatSetup<'a> {
    pub hp: u32,
    pub max_hp: u32,
    pub deck: &'a [Card],
    pub relics: &'a [Relic],
    pub enemies: Vec<&'a EnemyTemplate>,
    pub tier: EncounterTier,
    pub base_energy: u32,
    pub hand_size: usize,
    pub wound: Card,
}

impl CombatState {
    pub fn has_relic(&self, effect: RelicEffect) -> bool {
        self.relics.iter().any(|relic| relic.effect == effect)
    }

    /// Copies of an active power; stacked powers trigger once per copy.
    pub fn power_count(&self, special: Special) -> u32 {
        self.active_powers
            .iter()
            .filter(|card| card.has_special(special))
            .count() as u32
    }

    pub fn has_power(&self, special: Special) -> bool {
        self.power_count(special) > 0
    }

    pub fn living_enemies(&self) -> impl Iterator<Item = (usize, &Enemy)> {
        self.enemies
            .iter()
            .enumerate()
            .filter(|(_, enemy)| enemy.is_alive())
    }

    pub fn first_living(&self) -> Option<usize> {
        self.living_enemies().map(|(idx, _)| idx).next()
    }

    pub fn total_enemy_hp(&self) -> u32 {
        self.enemies.iter().map(|enemy| enemy.hp).sum()
    }

    pub fn all_enemies_dead(&self) -> bool {
        self.enemies.iter().all(|enemy| !enemy.is_alive())
    }

    /// HP lost since the encounter began, as used by Blood for Blood.
    pub fn hp_lost(&self) -> u32 {
        self.player.start_hp.saturating_sub(self.player.hp)
    }

    pub fn effective_cost(&self, card: &Card) -> u32 {
        effective_cost(card, self.has_power(Special::Corruption), self.hp_lost())
    }

    pub fn is_over(&self) -> bool {
        self.combat_ended
    }

    /// Resolves an optional named target to a living enemy index. No name
    /// falls back to the first living enemy.
    pub fn resolve_target(&self, target: Option<usize>) -> Result<usize, CombatError> {
        match target {
            Some(idx) => match self.enemies.get(idx) {
                Some(enemy) if enemy.is_alive() => Ok(idx),
                _ => Err(CombatError::InvalidTarget),
            },
            None => self.first_living().ok_or(CombatError::NoLivingTarget),
        }
    }

    /// Instance damage of every card with permanent growth, keyed by uid.
    pub fn grown_cards(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.hand
            .iter()
            .chain(&self.piles.draw)
            .chain(&self.piles.discard)
            .chain(&self.piles.exhaust)
            .chain(&self.active_powers)
            .filter(|card| card.uid != 0)
            .filter(|card| card.special.and_then(Special::growth).is_some())
            .map(|card| (card.uid, card.base_damage()))
    }

    /// Marks newly dead enemies, fires on-kill relics and returns the kill count.
    fn sweep_defeated(&mut self, events: &mut EventBus) -> u32 {
        if self.defeated.len() != self.enemies.len() {
            self.defeated.resize(self.enemies.len(), false);
        }
        let mut kills = 0;
        for idx in 0..self.enemies.len() {
            if self.defeated[idx] || self.enemies[idx].is_alive() {
                continue;
            }
            self.defeated[idx] = true;
            kills += 1;
            events.push(Event::EnemyDefeated {
                enemy: idx,
                enemy_id: self.enemies[idx].id.clone(),
            });
            if self.has_relic(RelicEffect::KillHeal) {
                self.heal_player(3);
            }
            if self.has_relic(RelicEffect::KillStrength) {
                self.player.status.add(crate::StatusKind::Strength, 2);
            }
        }
        kills
    }

    /// Ends the fight as a win once every enemy is down. Returns true when it did.
    fn check_victory(&mut self, events: &mut EventBus) -> bool {
        if self.combat_ended {
            return self.victory;
        }
        if self.all_enemies_dead() {
            self.combat_ended = true;
            self.victory = true;
            self.is_player_turn = false;
            log::debug!("combat won on turn {}", self.turn);
            events.push(Event::CombatWon { turns: self.turn });
            return true;
        }
        false
    }

    /// Lethal check with Phoenix Feather revival. Returns true when the player is dead.
    fn check_player_death(&mut self, events: &mut EventBus) -> bool {
        if self.player.hp > 0 {
            return false;
        }
        if let Some(pos) = self
            .relics
            .iter()
            .position(|relic| relic.effect == RelicEffect::PhoenixRevival)
        {
            self.relics.remove(pos);
            self.player.hp = (self.player.max_hp / 4).max(1);
            log::debug!("phoenix feather revived player at {} hp", self.player.hp);
            events.push(Event::PlayerRevived { hp: self.player.hp });
            return false;
        }
        self.combat_ended = true;
        self.victory = false;
        self.is_player_turn = false;
        log::debug!("player died on turn {}", self.turn);
        events.push(Event::CombatLost);
        true
    }

    fn heal_player(&mut self, amount: u32) {
        self.player.hp = self.player.hp.saturating_add(amount).min(self.player.max_hp);
    }

    /// Self-inflicted HP loss from cards. Ignores block.
    fn player_lose_hp(&mut self, amount: u32, events: &mut EventBus) -> bool {
        self.player.hp = self.player.hp.saturating_sub(amount);
        self.check_player_death(events)
    }

    fn finish_action(&mut self, hp_before: u32, events: &mut EventBus) -> CombatReport {
        let enemies_killed = self.sweep_defeated(events);
        self.check_victory(events);
        CombatReport {
            damage_dealt: hp_before.saturating_sub(self.total_enemy_hp()),
            enemies_killed,
        }
    }

    pub(crate) fn draw(&mut self, count: usize, rng: &mut RngState) -> usize {
        let mut remaining = count;
        let mut drawn = 0;
        while remaining > 0 {
            let Some(card) = self.piles.draw_one(rng) else {
                break;
            };
            remaining -= 1;
            drawn += 1;
            if card.is_unplayable() {
                remaining += self.power_count(Special::Evolve) as usize;
            }
            self.hand.push(card);
        }
        drawn
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::{CardKind, EnemyAction, Rarity};

    pub fn card(id: &str, kind: CardKind, cost: u32) -> Card {
        Card {
            id: id.into(),
            name: id.into(),
            kind,
            cost,
            damage: None,
            block: None,
            description: String::new(),
            rarity: Rarity::Common,
            exhaust: false,
            upgraded: false,
            status: None,
            special: None,
            uid: 0,
        }
    }

    pub fn attack(id: &str, cost: u32, damage: u32) -> Card {
        Card {
            damage: Some(damage),
            ..card(id, CardKind::Attack, cost)
        }
    }

    pub fn skill(id: &str, cost: u32, block: u32) -> Card {
        Card {
            block: Some(block),
            ..card(id, CardKind::Skill, cost)
        }
    }

    pub fn with_special(mut card: Card, special: Special) -> Card {
        card.special = Some(special);
        card
    }

    pub fn wound() -> Card {
        with_special(card("wound", CardKind::Skill, 0), Special::Unplayable)
    }

    pub fn template(id: &str, max_hp: u32, damage: u32) -> EnemyTemplate {
        EnemyTemplate {
            id: id.into(),
            name: id.into(),
            max_hp,
            act: 1,
            action: EnemyAction::attack(damage),
        }
    }

    pub fn relic(effect: RelicEffect) -> Relic {
        Relic {
            id: format!("{effect:?}"),
            name: format!("{effect:?}"),
            description: String::new(),
            rarity: Rarity::Common,
            effect,
        }
    }

    /// Started combat with a fixed hand, empty piles and the given enemies.
    pub fn combat_with_hand(hand: Vec<Card>, enemies: &[EnemyTemplate]) -> CombatState {
        let deck: Vec<Card> = Vec::new();
        let mut rng = RngState::from_seed(1);
        let mut events = EventBus::default();
        let setup = CombatSetup {
            hp: 70,
            max_hp: 70,
            deck: &deck,
            relics: &[],
            enemies: enemies.iter().collect(),
            tier: EncounterTier::Normal,
            base_energy: 3,
            hand_size: 5,
            wound: wound(),
        };
        let mut combat = CombatState::start(setup, &mut rng, &mut events);
        combat.hand = hand;
        combat
    }
}
