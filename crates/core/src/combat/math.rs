//! Damage arithmetic. Every multiplier floors immediately.

use crate::{Card, CardKind, Special};

pub const WEAK_MULTIPLIER: f64 = 0.75;
pub const VULNERABLE_MULTIPLIER: f64 = 1.5;

pub fn apply_weak(raw: u32, weak: bool) -> u32 {
    if weak {
        (f64::from(raw) * WEAK_MULTIPLIER).floor() as u32
    } else {
        raw
    }
}

pub fn apply_vulnerable(raw: u32, vulnerable: bool) -> u32 {
    if vulnerable {
        (f64::from(raw) * VULNERABLE_MULTIPLIER).floor() as u32
    } else {
        raw
    }
}

/// Attacker-side damage: base plus strength, then weak.
pub fn card_damage(base: u32, strength: u32, weak: bool) -> u32 {
    apply_weak(base.saturating_add(strength), weak)
}

/// Damage an enemy attack deals before the player's block.
pub fn incoming_damage(base: u32, enemy_strength: u32, enemy_weak: bool, player_vulnerable: bool) -> u32 {
    apply_vulnerable(card_damage(base, enemy_strength, enemy_weak), player_vulnerable)
}

/// Splits `damage` into (blocked, through) against a block pool.
pub fn absorb(block: u32, damage: u32) -> (u32, u32) {
    let blocked = block.min(damage);
    (blocked, damage - blocked)
}

/// Energy actually charged for `card`. `hp_lost` is start-of-combat HP minus
/// current HP.
pub fn effective_cost(card: &Card, corruption: bool, hp_lost: u32) -> u32 {
    if corruption && card.kind == CardKind::Skill {
        return 0;
    }
    if card.has_special(Special::BloodCost) {
        return card.cost.saturating_sub(hp_lost.min(4));
    }
    card.cost
}
