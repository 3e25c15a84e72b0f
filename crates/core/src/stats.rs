use crate::GameState;
use serde::{Deserialize, Serialize};

/// Aggregates across every finished run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LifetimeStats {
    pub total_runs: u32,
    pub victories: u32,
    pub deaths: u32,
    pub total_floors_cleared: u64,
    pub total_enemies_killed: u64,
    pub total_damage_dealt: u64,
    pub total_cards_played: u64,
    pub total_gold_earned: u64,
    pub total_play_time_ms: u64,
    /// Deepest floor reached counting earlier acts as 15 floors each.
    pub best_floor: u32,
    pub fastest_victory_ms: Option<u64>,
    pub longest_run_ms: u64,
}

impl LifetimeStats {
    pub fn record_run(&mut self, state: &GameState, victory: bool, floors_per_act: u32, now_ms: u64) {
        let stats = &state.stats;
        let elapsed = now_ms.saturating_sub(stats.start_time_ms);
        let depth = u32::from(state.act.saturating_sub(1)) * floors_per_act + state.floor;

        self.total_runs += 1;
        if victory {
            self.victories += 1;
        } else {
            self.deaths += 1;
        }
        self.total_floors_cleared += u64::from(stats.floors_cleared);
        self.total_enemies_killed += u64::from(stats.enemies_killed);
        self.total_damage_dealt += stats.damage_dealt;
        self.total_cards_played += u64::from(stats.cards_played);
        self.total_gold_earned += u64::from(stats.gold_earned);
        self.total_play_time_ms += elapsed;
        self.best_floor = self.best_floor.max(depth);
        self.longest_run_ms = self.longest_run_ms.max(elapsed);
        if victory && self.fastest_victory_ms.map_or(true, |best| elapsed < best) {
            self.fastest_victory_ms = Some(elapsed);
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.total_runs == 0 {
            return 0.0;
        }
        f64::from(self.victories) / f64::from(self.total_runs)
    }
}
