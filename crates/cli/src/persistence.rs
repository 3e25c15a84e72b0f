use anyhow::{bail, Context};
use deckdungeon_core::{record_daily_result, DailyResult, GameState, LifetimeStats};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SAVE_SCHEMA_VERSION: u32 = 1;
const SAVE_FILE: &str = "save.json";
const STATS_FILE: &str = "stats.json";
const DAILY_FILE: &str = "daily.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SavedGame {
    version: u32,
    state: GameState,
}

/// The three persisted records, each one JSON file under a single directory.
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

pub fn default_storage_dir() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("DECKDUNGEON_HOME") {
        return Some(PathBuf::from(path));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".deckdungeon"))
}

impl Storage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save_path(&self) -> PathBuf {
        self.dir.join(SAVE_FILE)
    }

    pub fn save_game(&self, state: &GameState) -> anyhow::Result<()> {
        self.save_game_to(state, &self.save_path())
    }

    pub fn save_game_to(&self, state: &GameState, path: &Path) -> anyhow::Result<()> {
        let payload = SavedGame {
            version: SAVE_SCHEMA_VERSION,
            state: state.clone(),
        };
        write_json(path, &payload)
    }

    /// A missing save is `None`; so is a malformed one, after a warning.
    pub fn load_game(&self) -> Option<GameState> {
        self.load_game_from(&self.save_path())
    }

    pub fn load_game_from(&self, path: &Path) -> Option<GameState> {
        if !path.exists() {
            return None;
        }
        match read_save(path) {
            Ok(state) => Some(state),
            Err(err) => {
                log::warn!("discarding save {}: {err:#}", path.display());
                None
            }
        }
    }

    pub fn clear_game(&self) {
        let path = self.save_path();
        if path.exists() {
            if let Err(err) = fs::remove_file(&path) {
                log::warn!("remove {}: {err}", path.display());
            }
        }
    }

    pub fn load_stats(&self) -> LifetimeStats {
        read_or_default(&self.dir.join(STATS_FILE))
    }

    pub fn save_stats(&self, stats: &LifetimeStats) -> anyhow::Result<()> {
        write_json(&self.dir.join(STATS_FILE), stats)
    }

    pub fn load_daily_results(&self) -> Vec<DailyResult> {
        read_or_default(&self.dir.join(DAILY_FILE))
    }

    pub fn save_daily_results(&self, results: &[DailyResult]) -> anyhow::Result<()> {
        write_json(&self.dir.join(DAILY_FILE), &results)
    }

    /// Folds a finished run into lifetime stats and, for daily runs, the daily
    /// history, then drops the save. Returns the daily result when one was kept.
    pub fn record_finished_run(
        &self,
        state: &GameState,
        victory: bool,
        floors_per_act: u32,
        now_ms: u64,
    ) -> anyhow::Result<Option<DailyResult>> {
        let mut stats = self.load_stats();
        stats.record_run(state, victory, floors_per_act, now_ms);
        self.save_stats(&stats)?;

        let mut kept = None;
        if let Some(result) = DailyResult::from_run(state, victory, now_ms) {
            let mut results = self.load_daily_results();
            if record_daily_result(&mut results, result.clone()) {
                self.save_daily_results(&results)?;
                kept = Some(result);
            } else {
                log::info!("daily result for {} already recorded", result.date);
            }
        }
        self.clear_game();
        Ok(kept)
    }
}

fn read_save(path: &Path) -> anyhow::Result<GameState> {
    let payload: SavedGame = read_json(path)?;
    if payload.version != SAVE_SCHEMA_VERSION {
        bail!(
            "unsupported save version {} (expected {})",
            payload.version,
            SAVE_SCHEMA_VERSION
        );
    }
    Ok(payload.state)
}

fn read_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    if !path.exists() {
        return T::default();
    }
    read_json(path).unwrap_or_else(|err| {
        log::warn!("ignoring {}: {err:#}", path.display());
        T::default()
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let body = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&body).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(value).context("serialize")?;
    fs::write(path, body).with_context(|| format!("write {}", path.display()))
}
