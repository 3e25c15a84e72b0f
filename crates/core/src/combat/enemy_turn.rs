use super::*;
use crate::{EnemyAiRule, Intent, StatusKind};

impl CombatState {
    /// Every living enemy executes its declared action, then rolls the next one.
    /// Stops early when the player dies or the last enemy falls to thorns.
    pub(crate) fn run_enemy_turn(&mut self, ai: &EnemyAiRule, rng: &mut RngState, events: &mut EventBus) {
        for idx in 0..self.enemies.len() {
            if !self.enemies[idx].is_alive() {
                continue;
            }
            self.enemies[idx].block = 0;
            let action = self.enemies[idx].next_action;
            events.push(Event::EnemyActed {
                enemy: idx,
                intent: action.kind,
            });
            match action.kind {
                Intent::Attack => {
                    let enemy = &self.enemies[idx];
                    let damage = incoming_damage(
                        action.damage.unwrap_or(0),
                        enemy.status.get(StatusKind::Strength),
                        enemy.status.has(StatusKind::Weak),
                        self.player.status.has(StatusKind::Vulnerable),
                    );
                    let (blocked, through) = absorb(self.player.block, damage);
                    self.player.block -= blocked;
                    let lost = through.min(self.player.hp);
                    self.player.hp -= lost;
                    events.push(Event::PlayerDamaged {
                        amount: lost,
                        blocked,
                        hp: self.player.hp,
                    });
                    let thorns = self.player.status.get(StatusKind::Thorns);
                    if lost > 0 && thorns > 0 {
                        self.enemies[idx].lose_hp(thorns);
                    }
                }
                Intent::Defend => {
                    self.enemies[idx].block += action.block.unwrap_or(0);
                }
                Intent::Buff => {
                    if let Some(status) = action.status {
                        self.enemies[idx].status.add(status.kind, status.amount);
                    }
                }
                Intent::Debuff => {
                    if let Some(status) = action.status {
                        self.player.status.add(status.kind, status.amount);
                    }
                }
            }
            log::trace!("enemy {idx} acted: {:?}", action.kind);
            self.enemies[idx].roll_intent(ai, rng);

            if self.check_player_death(events) {
                return;
            }
            self.sweep_defeated(events);
            if self.check_victory(events) {
                return;
            }
        }
    }

    /// Round-end status pass for the player and every living enemy.
    pub(crate) fn tick_statuses(&mut self) {
        let player = &mut self.player;
        let poison = player.status.get(StatusKind::Poison);
        if poison > 0 {
            player.hp = player.hp.saturating_sub(poison);
            player.status.decrement(StatusKind::Poison);
        }
        let regen = player.status.get(StatusKind::Regen);
        if regen > 0 {
            player.hp = player.hp.saturating_add(regen).min(player.max_hp);
        }
        player.status.decrement(StatusKind::Weak);
        player.status.decrement(StatusKind::Vulnerable);
        player.status.remove(StatusKind::Strength, player.temp_strength);
        player.temp_strength = 0;

        let mut poison_ticked = false;
        for enemy in self.enemies.iter_mut().filter(|enemy| enemy.is_alive()) {
            let poison = enemy.status.get(StatusKind::Poison);
            if poison > 0 {
                enemy.lose_hp(poison);
                enemy.status.decrement(StatusKind::Poison);
                poison_ticked = true;
            }
            let regen = enemy.status.get(StatusKind::Regen);
            if regen > 0 {
                enemy.hp = enemy.hp.saturating_add(regen).min(enemy.max_hp);
            }
            let ritual = enemy.status.get(StatusKind::Ritual);
            enemy.status.add(StatusKind::Strength, ritual);
            enemy.status.decrement(StatusKind::Weak);
            enemy.status.decrement(StatusKind::Vulnerable);
        }
        self.counters.poison_ticked = poison_ticked;
    }
}

#[cfg(test)]
mod tests {
    use crate::combat::fixtures::*;
    use crate::*;

    #[test]
    fn tick_order_and_decay() {
        let mut combat = combat_with_hand(vec![], &[template("cultist", 48, 0)]);
        combat.player.hp = 60;
        combat.player.status.add(StatusKind::Poison, 3);
        combat.player.status.add(StatusKind::Regen, 5);
        combat.player.status.add(StatusKind::Weak, 1);
        combat.enemies[0].status.add(StatusKind::Ritual, 3);
        combat.enemies[0].status.add(StatusKind::Vulnerable, 2);
        combat.tick_statuses();
        assert_eq!(combat.player.hp, 62);
        assert_eq!(combat.player.status.get(StatusKind::Poison), 2);
        assert_eq!(combat.player.status.get(StatusKind::Regen), 5);
        assert!(!combat.player.status.has(StatusKind::Weak));
        assert_eq!(combat.enemies[0].status.get(StatusKind::Strength), 3);
        assert_eq!(combat.enemies[0].status.get(StatusKind::Ritual), 3);
        assert_eq!(combat.enemies[0].status.get(StatusKind::Vulnerable), 1);
    }

    #[test]
    fn regen_caps_at_max_hp() {
        let mut combat = combat_with_hand(vec![], &[template("a", 40, 0)]);
        combat.player.hp = 68;
        combat.player.status.add(StatusKind::Regen, 5);
        combat.tick_statuses();
        assert_eq!(combat.player.hp, 70);
    }

    #[test]
    fn enemy_strength_and_weak_scale_attacks() {
        let mut combat = combat_with_hand(vec![], &[template("a", 40, 10)]);
        combat.enemies[0].status.add(StatusKind::Strength, 2);
        combat.enemies[0].status.add(StatusKind::Weak, 1);
        combat.player.status.add(StatusKind::Vulnerable, 1);
        let mut rng = RngState::from_seed(1);
        let mut events = EventBus::default();
        combat.run_enemy_turn(&GameConfig::default().enemy_ai, &mut rng, &mut events);
        // floor(floor(12 * 0.75) * 1.5) = 13
        assert_eq!(combat.player.hp, 57);
    }

    #[test]
    fn dead_player_stops_remaining_enemies() {
        let mut combat = combat_with_hand(
            vec![],
            &[template("a", 40, 80), template("b", 40, 10)],
        );
        let mut rng = RngState::from_seed(1);
        let mut events = EventBus::default();
        combat.run_enemy_turn(&GameConfig::default().enemy_ai, &mut rng, &mut events);
        assert!(combat.combat_ended);
        assert!(!combat.victory);
        let acted = events
            .drain()
            .filter(|event| matches!(event, Event::EnemyActed { .. }))
            .count();
        assert_eq!(acted, 1);
    }
}
