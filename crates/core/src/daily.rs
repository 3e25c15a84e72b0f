//! Date-derived seeds and daily challenge scoring.

use crate::GameState;
use serde::{Deserialize, Serialize};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub const DAILY_HISTORY: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDate {
    pub year: i32,
    /// 1-based month.
    pub month: u32,
    pub day: u32,
}

impl CalendarDate {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// `"Oct 16, 2026"`.
    pub fn label(&self) -> String {
        let month = MONTHS
            .get(self.month.saturating_sub(1) as usize)
            .copied()
            .unwrap_or("???");
        format!("{month} {}, {}", self.day, self.year)
    }
}

/// 32-bit string hash (`hash * 31 + byte`) of `"{year}-{month0}-{day}"`.
pub fn daily_seed(date: CalendarDate) -> i64 {
    let key = format!("{}-{}-{}", date.year, date.month.saturating_sub(1), date.day);
    let hash = key
        .bytes()
        .fold(0i32, |hash, byte| hash.wrapping_mul(31).wrapping_add(i32::from(byte)));
    i64::from(hash)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyChallenge {
    pub seed: i64,
    pub date: String,
}

impl DailyChallenge {
    pub fn for_date(date: CalendarDate) -> Self {
        Self {
            seed: daily_seed(date),
            date: date.label(),
        }
    }

    /// Generator seed offset from the date seed, e.g. by act number.
    pub fn rng_seed(&self, offset: u64) -> u64 {
        (self.seed as u64).wrapping_add(offset)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyResult {
    pub date: String,
    pub seed: i64,
    pub score: u64,
    pub floors_cleared: u32,
    pub victory: bool,
    pub time_ms: u64,
}

impl DailyResult {
    /// `None` for ordinary runs.
    pub fn from_run(state: &GameState, victory: bool, now_ms: u64) -> Option<Self> {
        let daily = state.daily.as_ref()?;
        let elapsed = now_ms.saturating_sub(state.stats.start_time_ms);
        Some(Self {
            date: daily.date.clone(),
            seed: daily.seed,
            score: daily_score(state, victory, elapsed),
            floors_cleared: state.stats.floors_cleared,
            victory,
            time_ms: elapsed,
        })
    }
}

pub fn daily_score(state: &GameState, victory: bool, elapsed_ms: u64) -> u64 {
    let stats = &state.stats;
    let mut score = u64::from(stats.floors_cleared) * 10
        + u64::from(stats.enemies_killed) * 5
        + stats.damage_dealt / 10
        + u64::from(state.player.gold);
    if victory {
        score += 500;
        let minutes = elapsed_ms as f64 / 60_000.0;
        if minutes < 20.0 {
            score += (300.0 * (1.0 - minutes / 20.0)).floor() as u64;
        }
    }
    score
}

/// Appends `result` unless its date is already recorded, keeping the newest
/// entries. Returns false when the date was already present.
pub fn record_daily_result(results: &mut Vec<DailyResult>, result: DailyResult) -> bool {
    if results.iter().any(|existing| existing.date == result.date) {
        return false;
    }
    results.push(result);
    if results.len() > DAILY_HISTORY {
        let excess = results.len() - DAILY_HISTORY;
        results.drain(..excess);
    }
    true
}
