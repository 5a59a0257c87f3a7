//! Persisted progression and preferences
//!
//! Best survival time, coin balance and upgrade levels outlive a run. The
//! simulation reads this record at run start and writes it at game over; the
//! shop writes it on purchase. Loading never fails: anything unreadable
//! falls back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::shop::UpgradeKey;
use crate::sim::Difficulty;

/// Default save file location
pub const DEFAULT_SAVE_PATH: &str = "save.json";

/// Upgrade levels by key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeLevels {
    pub shield: u8,
    pub magnet: u8,
    pub drops: u8,
    pub second: u8,
}

impl UpgradeLevels {
    pub fn level(&self, key: UpgradeKey) -> u8 {
        match key {
            UpgradeKey::Shield => self.shield,
            UpgradeKey::Magnet => self.magnet,
            UpgradeKey::Drops => self.drops,
            UpgradeKey::SecondChance => self.second,
        }
    }

    pub fn level_mut(&mut self, key: UpgradeKey) -> &mut u8 {
        match key {
            UpgradeKey::Shield => &mut self.shield,
            UpgradeKey::Magnet => &mut self.magnet,
            UpgradeKey::Drops => &mut self.drops,
            UpgradeKey::SecondChance => &mut self.second,
        }
    }

    pub fn has_second_chance(&self) -> bool {
        self.second > 0
    }

    /// Clamp every level to its catalog maximum
    pub fn sanitize(&mut self) {
        for key in UpgradeKey::ALL {
            let max = key.max_level();
            let level = self.level_mut(key);
            *level = (*level).min(max);
        }
    }
}

/// Outcome of committing a finished run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub survived: f32,
    pub coins: u32,
    pub best: f32,
    pub new_best: bool,
}

/// The persisted record
///
/// Written with serde; read field by field in [`Progression::from_json`] so
/// one bad value never costs the rest of the record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progression {
    /// Best survival time (seconds)
    pub best: f32,
    /// Master volume 0-100 (UI only)
    pub volume: u8,
    /// Difficulty preset name
    pub difficulty: String,
    /// UI only
    pub fullscreen: bool,
    pub coins_total: u64,
    pub upgrades: UpgradeLevels,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            best: 0.0,
            volume: 70,
            difficulty: Difficulty::Normal.as_str().to_string(),
            fullscreen: false,
            coins_total: 0,
            upgrades: UpgradeLevels::default(),
        }
    }
}

/// Numeric value of a field, accepting numbers and numeric strings
fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

/// Whole value of a field clamped to `[lo, hi]`
fn whole(value: &Value, lo: f64, hi: f64) -> Option<f64> {
    number(value).map(|n| n.trunc().clamp(lo, hi))
}

fn read_upgrades(fields: &Map<String, Value>) -> UpgradeLevels {
    let mut upgrades = UpgradeLevels::default();
    for key in UpgradeKey::ALL {
        if let Some(level) = fields.get(key.as_str()).and_then(|v| whole(v, 0.0, key.max_level() as f64)) {
            *upgrades.level_mut(key) = level as u8;
        }
    }
    upgrades
}

impl Progression {
    /// Selected preset (unknown names resolve to Normal)
    pub fn difficulty(&self) -> Difficulty {
        Difficulty::from_name(&self.difficulty)
    }

    /// Store a preset by name, normalizing unknown names to Normal
    pub fn set_difficulty(&mut self, name: &str) {
        self.difficulty = Difficulty::from_name(name).as_str().to_string();
    }

    pub fn set_volume(&mut self, volume: i32) {
        self.volume = volume.clamp(0, 100) as u8;
    }

    pub fn toggle_fullscreen(&mut self) -> bool {
        self.fullscreen = !self.fullscreen;
        self.fullscreen
    }

    /// Fold a finished run into the record
    pub fn commit_run(&mut self, survived: f32, coins: u32) -> RunRecord {
        let survived = if survived.is_finite() { survived.max(0.0) } else { 0.0 };
        let new_best = survived > self.best;
        self.best = self.best.max(survived);
        self.coins_total = self.coins_total.saturating_add(coins as u64);
        log::info!(
            "Run committed: {:.1}s, {} coins (best {:.1}s, total {} coins)",
            survived,
            coins,
            self.best,
            self.coins_total
        );
        RunRecord {
            survived,
            coins,
            best: self.best,
            new_best,
        }
    }

    /// Repair out-of-range values from a hand-edited or older save
    pub fn sanitize(&mut self) {
        if !self.best.is_finite() || self.best < 0.0 {
            self.best = 0.0;
        }
        self.volume = self.volume.min(100);
        self.difficulty = self.difficulty().as_str().to_string();
        self.upgrades.sanitize();
    }

    /// Parse a save; never fails
    ///
    /// Each field is read on its own: a missing or unreadable field keeps its
    /// default while the others load, and out-of-range numbers are clamped.
    pub fn from_json(json: &str) -> Self {
        let value = match serde_json::from_str::<Value>(json) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Corrupt progression data ({}), using defaults", e);
                return Self::default();
            }
        };
        let Some(fields) = value.as_object() else {
            log::warn!("Progression data is not an object, using defaults");
            return Self::default();
        };

        let mut progression = Self::default();
        if let Some(best) = fields.get("best").and_then(number) {
            progression.best = best as f32;
        }
        if let Some(volume) = fields.get("volume").and_then(|v| whole(v, 0.0, 100.0)) {
            progression.volume = volume as u8;
        }
        match fields.get("difficulty") {
            Some(Value::String(name)) => progression.difficulty = name.clone(),
            Some(Value::Null) | None => {}
            Some(other) => progression.difficulty = other.to_string(),
        }
        match fields.get("fullscreen") {
            Some(Value::Bool(b)) => progression.fullscreen = *b,
            Some(other) => progression.fullscreen = number(other).is_some_and(|n| n != 0.0),
            None => {}
        }
        if let Some(coins) = fields.get("coins_total").and_then(|v| whole(v, 0.0, u64::MAX as f64)) {
            progression.coins_total = coins as u64;
        }
        if let Some(Value::Object(upgrades)) = fields.get("upgrades") {
            progression.upgrades = read_upgrades(upgrades);
        }

        progression.sanitize();
        progression
    }
}

/// Errors writing the save file
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON file backing for [`Progression`]
#[derive(Debug, Clone)]
pub struct ProgressionStore {
    path: PathBuf,
}

impl Default for ProgressionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_PATH)
    }
}

impl ProgressionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record; missing or corrupt files yield defaults
    pub fn load(&self) -> Progression {
        match fs::read_to_string(&self.path) {
            Ok(json) => {
                let progression = Progression::from_json(&json);
                log::info!("Loaded progression from {}", self.path.display());
                progression
            }
            Err(e) => {
                log::info!("No progression at {} ({}), starting fresh", self.path.display(), e);
                Progression::default()
            }
        }
    }

    /// Write via a temp file and rename so a crash never leaves a half-written save
    pub fn save(&self, progression: &Progression) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(progression)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        log::info!("Progression saved to {}", self.path.display());
        Ok(())
    }
}
