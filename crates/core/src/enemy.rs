use crate::{EnemyAiRule, RngState, StatusEffects, StatusKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EncounterTier {
    Normal,
    Elite,
    Boss,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Attack,
    Defend,
    Buff,
    Debuff,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusApplication {
    pub kind: StatusKind,
    pub amount: u32,
}

/// A declared enemy move. Buffs land on the enemy, debuffs on the player.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnemyAction {
    pub kind: Intent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusApplication>,
}

impl EnemyAction {
    pub fn attack(damage: u32) -> Self {
        Self {
            kind: Intent::Attack,
            damage: Some(damage),
            block: None,
            status: None,
        }
    }

    pub fn defend(block: u32) -> Self {
        Self {
            kind: Intent::Defend,
            damage: None,
            block: Some(block),
            status: None,
        }
    }

    pub fn status(kind: Intent, status: StatusKind, amount: u32) -> Self {
        Self {
            kind,
            damage: None,
            block: None,
            status: Some(StatusApplication { kind: status, amount }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyTemplate {
    pub id: String,
    pub name: String,
    pub max_hp: u32,
    pub act: u8,
    pub action: EnemyAction,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Enemy {
    pub id: String,
    pub name: String,
    pub max_hp: u32,
    pub hp: u32,
    pub intent: Intent,
    pub next_action: EnemyAction,
    #[serde(default)]
    pub status: StatusEffects,
    #[serde(default)]
    pub block: u32,
    pub act: u8,
    /// Authored status move reused whenever the AI rolls a buff.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<EnemyAction>,
    /// Authored attack damage. Every attack this enemy rolls hits for it;
    /// enemies authored without an attack fall back to the HP formula.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack: Option<u32>,
}

impl Enemy {
    pub fn from_template(template: &EnemyTemplate) -> Self {
        let signature = match template.action.kind {
            Intent::Buff | Intent::Debuff if template.action.status.is_some() => {
                Some(template.action)
            }
            _ => None,
        };
        let attack = match template.action.kind {
            Intent::Attack => template.action.damage,
            _ => None,
        };
        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            max_hp: template.max_hp,
            hp: template.max_hp,
            intent: template.action.kind,
            next_action: template.action,
            status: StatusEffects::new(),
            block: 0,
            act: template.act,
            signature,
            attack,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Player-sourced damage: vulnerable multiplier, then block, then HP.
    /// Returns the HP actually removed.
    pub fn take_damage(&mut self, raw: u32) -> u32 {
        let mut damage = crate::apply_vulnerable(raw, self.status.has(StatusKind::Vulnerable));
        let absorbed = damage.min(self.block);
        self.block -= absorbed;
        damage -= absorbed;
        self.lose_hp(damage)
    }

    /// Direct HP loss that ignores block and vulnerable.
    pub fn lose_hp(&mut self, amount: u32) -> u32 {
        let removed = amount.min(self.hp);
        self.hp -= removed;
        removed
    }

    /// Weighted attack/defend/buff roll. Attacks reuse the authored damage,
    /// or scale with max HP when none was authored.
    pub fn roll_intent(&mut self, rule: &EnemyAiRule, rng: &mut RngState) {
        let weights = [rule.attack_weight, rule.defend_weight, rule.buff_weight];
        let action = match rng.weighted(&weights) {
            Some(1) => EnemyAction::defend(rng.range(rule.block.min, rule.block.max)),
            Some(2) => self
                .signature
                .unwrap_or_else(|| EnemyAction::status(Intent::Buff, StatusKind::Strength, 1)),
            _ => {
                let damage = match self.attack {
                    Some(damage) => damage,
                    None => attack_damage(self.max_hp, rule, rng),
                };
                EnemyAction::attack(damage)
            }
        };
        self.intent = action.kind;
        self.next_action = action;
    }
}

pub fn attack_damage(max_hp: u32, rule: &EnemyAiRule, rng: &mut RngState) -> u32 {
    let scaled = (f64::from(max_hp) * rule.damage_ratio).floor() as u32;
    scaled.max(rule.min_damage) + rng.range(0, rule.damage_spread)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameConfig;

    fn template(max_hp: u32, action: EnemyAction) -> EnemyTemplate {
        EnemyTemplate {
            id: "dummy".into(),
            name: "Dummy".into(),
            max_hp,
            act: 1,
            action,
        }
    }

    #[test]
    fn first_intent_is_authored() {
        let enemy = Enemy::from_template(&template(48, EnemyAction::status(
            Intent::Buff,
            StatusKind::Ritual,
            3,
        )));
        assert_eq!(enemy.intent, Intent::Buff);
        assert_eq!(enemy.hp, 48);
        assert!(enemy.signature.is_some());
    }

    #[test]
    fn attack_damage_scales_with_max_hp() {
        let rule = GameConfig::default().enemy_ai;
        let mut rng = RngState::from_seed(11);
        for _ in 0..100 {
            let small = attack_damage(10, &rule, &mut rng);
            assert!((5..=9).contains(&small));
            let boss = attack_damage(250, &rule, &mut rng);
            assert!((20..=24).contains(&boss));
        }
    }

    #[test]
    fn rolled_buff_falls_back_to_strength() {
        let rule = EnemyAiRule {
            attack_weight: 0,
            defend_weight: 0,
            buff_weight: 1,
            ..GameConfig::default().enemy_ai
        };
        let mut enemy = Enemy::from_template(&template(40, EnemyAction::attack(11)));
        enemy.roll_intent(&rule, &mut RngState::from_seed(2));
        assert_eq!(
            enemy.next_action,
            EnemyAction::status(Intent::Buff, StatusKind::Strength, 1)
        );
    }

    #[test]
    fn rolled_attacks_reuse_authored_damage() {
        let rule = EnemyAiRule {
            attack_weight: 3,
            defend_weight: 1,
            buff_weight: 1,
            ..GameConfig::default().enemy_ai
        };
        let mut rng = RngState::from_seed(5);
        let mut exploder = Enemy::from_template(&template(30, EnemyAction::attack(30)));
        let mut attacks = vec![exploder.next_action.damage];
        for _ in 0..40 {
            exploder.roll_intent(&rule, &mut rng);
            if exploder.intent == Intent::Attack {
                attacks.push(exploder.next_action.damage);
            }
        }
        assert!(attacks.len() > 1);
        assert!(attacks.iter().all(|damage| *damage == Some(30)));

        let mut cultist = Enemy::from_template(&template(
            48,
            EnemyAction::status(Intent::Buff, StatusKind::Ritual, 3),
        ));
        assert_eq!(cultist.attack, None);
        for _ in 0..40 {
            cultist.roll_intent(&rule, &mut rng);
            if let Some(damage) = cultist.next_action.damage {
                assert!((5..=9).contains(&damage));
            }
        }
    }

    #[test]
    fn damage_goes_through_vulnerable_then_block() {
        let mut enemy = Enemy::from_template(&template(40, EnemyAction::attack(11)));
        enemy.status.add(StatusKind::Vulnerable, 1);
        enemy.block = 4;
        let removed = enemy.take_damage(6);
        assert_eq!(removed, 5);
        assert_eq!(enemy.block, 0);
        assert_eq!(enemy.hp, 35);
        assert_eq!(enemy.lose_hp(100), 35);
        assert!(!enemy.is_alive());
    }
}
