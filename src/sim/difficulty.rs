//! Difficulty presets and the time-based escalation ramp

use serde::{Deserialize, Serialize};

use crate::consts::{DIFFICULTY_STEP_SECS, MIN_TIMER_PERIOD_MS};

/// Ramp timer slack so accumulated f32 ticks land on the step boundary
const RAMP_EPSILON: f32 = 1e-3;

/// Named difficulty preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Resolve a stored name, falling back to Normal
    pub fn from_name(s: &str) -> Self {
        Self::from_str(s).unwrap_or_default()
    }

    /// Tuning constants for this preset
    pub fn profile(&self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                bomb_speed0: 160.0,
                spawn_ms0: 900,
                spawn_min_ms: 320,
                step_speed: 24.0,
                step_spawn_ms: 60,
            },
            Difficulty::Normal => DifficultyProfile {
                bomb_speed0: 185.0,
                spawn_ms0: 780,
                spawn_min_ms: 260,
                step_speed: 28.0,
                step_spawn_ms: 70,
            },
            Difficulty::Hard => DifficultyProfile {
                bomb_speed0: 210.0,
                spawn_ms0: 700,
                spawn_min_ms: 220,
                step_speed: 34.0,
                step_spawn_ms: 80,
            },
        }
    }
}

/// Difficulty tuning bundle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Initial bomb fall speed (px/s)
    pub bomb_speed0: f32,
    /// Initial bomb spawn period (ms)
    pub spawn_ms0: u32,
    /// Spawn period floor (ms)
    pub spawn_min_ms: u32,
    /// Speed added per bump
    pub step_speed: f32,
    /// Spawn period removed per bump (ms)
    pub step_spawn_ms: u32,
}

impl DifficultyProfile {
    /// Spawn floor, never below the scheduler minimum
    pub fn floor_ms(&self) -> u32 {
        self.spawn_min_ms.max(MIN_TIMER_PERIOD_MS)
    }
}

/// Live bomb speed / spawn period for the current run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyRamp {
    pub difficulty: Difficulty,
    pub profile: DifficultyProfile,
    pub bomb_speed: f32,
    pub spawn_ms: u32,
    /// Seconds accumulated toward the next bump
    pub timer: f32,
    /// Bumps applied this run
    pub bumps: u32,
}

impl Default for DifficultyRamp {
    fn default() -> Self {
        Self::new(Difficulty::default())
    }
}

impl DifficultyRamp {
    pub fn new(difficulty: Difficulty) -> Self {
        let profile = difficulty.profile();
        Self {
            difficulty,
            profile,
            bomb_speed: profile.bomb_speed0,
            spawn_ms: profile.spawn_ms0.max(profile.floor_ms()),
            timer: 0.0,
            bumps: 0,
        }
    }

    /// Select a preset and reset speed/interval to its initial values
    pub fn apply_profile(&mut self, difficulty: Difficulty) {
        *self = Self::new(difficulty);
    }

    /// Select a preset by stored name (unknown names resolve to Normal)
    pub fn apply_profile_name(&mut self, name: &str) {
        self.apply_profile(Difficulty::from_name(name));
    }

    /// One escalation step
    pub fn bump(&mut self) {
        self.bomb_speed += self.profile.step_speed;
        self.spawn_ms = self
            .spawn_ms
            .saturating_sub(self.profile.step_spawn_ms)
            .max(self.profile.floor_ms());
        self.bumps += 1;
    }

    /// Accumulate survival time; returns true when a bump was applied.
    ///
    /// At most one bump per call. The caller must re-arm the bomb timer.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.timer += dt.max(0.0);
        if self.timer + RAMP_EPSILON >= DIFFICULTY_STEP_SECS {
            self.timer = (self.timer - DIFFICULTY_STEP_SECS).max(0.0);
            self.bump();
            return true;
        }
        false
    }
}
