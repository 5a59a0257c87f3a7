//! Dodge - A falling-hazard arcade survival game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, physics, collisions, game state)
//! - `progression`: Persisted best time, coin balance and upgrade levels
//! - `shop`: Upgrade catalog and purchase rules

pub mod progression;
pub mod shop;
pub mod sim;

pub use progression::{Progression, ProgressionStore, UpgradeLevels};
pub use shop::{ShopError, UpgradeKey, purchase, upgrade_cost};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest dt a single tick will integrate
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Play field dimensions (pixels, y grows downward)
    pub const FIELD_WIDTH: f32 = 540.0;
    pub const FIELD_HEIGHT: f32 = 720.0;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 52.0;
    pub const PLAYER_SPEED: f32 = 340.0;
    /// Gap between the player and the bottom edge
    pub const PLAYER_BOTTOM_MARGIN: f32 = 16.0;

    /// Bomb defaults
    pub const BOMB_SIZE: f32 = 30.0;

    /// Difficulty ramp period (seconds of survival per bump)
    pub const DIFFICULTY_STEP_SECS: f32 = 10.0;

    /// Power-up spawn period range (ms), narrowed by the drops upgrade
    pub const POWERUP_MS_LO: u32 = 5600;
    pub const POWERUP_MS_HI: u32 = 8200;
    /// Reduction of the upper bound per drops level
    pub const POWERUP_MS_PER_DROP_LEVEL: u32 = 600;
    /// Upper bound never drops below lo + this
    pub const POWERUP_MS_MIN_SPREAD: u32 = 400;
    pub const POWERUP_SIZE: f32 = 26.0;
    pub const POWERUP_FALL_SPEED: f32 = 150.0;

    /// Slow-time effect
    pub const SLOW_FACTOR: f32 = 0.5;
    pub const SLOW_TIME: f32 = 5.0;
    /// Base shield / magnet durations, extended per upgrade level
    pub const SHIELD_TIME: f32 = 8.0;
    pub const MAGNET_TIME: f32 = 7.0;
    pub const UPGRADE_BONUS_SECS: f32 = 2.0;

    /// Coins
    pub const COIN_MS: u32 = 900;
    pub const COIN_RADIUS: f32 = 10.0;
    pub const COIN_VY: f32 = 150.0;
    pub const COIN_MAGNET_ACCEL: f32 = 520.0;
    pub const COIN_MAX_SPEED: f32 = 440.0;
    pub const COIN_SPAWN_Y: f32 = -18.0;

    /// Spawn periods are never shorter than this
    pub const MIN_TIMER_PERIOD_MS: u32 = 50;

    /// Particles (visual feedback only)
    pub const PARTICLES_PER_BURST: usize = 10;
    pub const PARTICLE_GRAVITY: f32 = 380.0;
    pub const PARTICLE_MAX_LIFE: f32 = 0.9;
    pub const MAX_PARTICLES: usize = 512;
}

/// Feedback palette (0xRRGGBB)
pub mod palette {
    pub const OK: u32 = 0x20B964;
    pub const GREY: u32 = 0x505050;
    pub const ORANGE: u32 = 0xFF8C00;
    pub const PURPLE: u32 = 0x9146FF;
    pub const SKY: u32 = 0x5AC8FF;
    pub const GOLD: u32 = 0xF0C814;
    pub const DANGER: u32 = 0xE63C3C;
}

/// Milliseconds to seconds
#[inline]
pub fn ms_to_secs(ms: u32) -> f32 {
    ms as f32 / 1000.0
}

/// Clamp an x coordinate so a body of `width` stays inside the field
#[inline]
pub fn clamp_to_field(x: f32, width: f32) -> f32 {
    x.clamp(0.0, (consts::FIELD_WIDTH - width).max(0.0))
}

/// Unit vector from `from` toward `to`, with distance floored at 1px
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    let delta = to - from;
    delta / delta.length().max(1.0)
}
