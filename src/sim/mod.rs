//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or file I/O

pub mod collision;
pub mod difficulty;
pub mod effects;
pub mod entity;
pub mod player;
pub mod scheduler;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use collision::{Aabb, circle_aabb_overlap};
pub use difficulty::{Difficulty, DifficultyProfile, DifficultyRamp};
pub use effects::{Effect, EffectContext};
pub use entity::{Bomb, Coin, Particle, PowerUp, PowerUpKind};
pub use player::{MoveIntent, Player};
pub use scheduler::{SpawnKind, SpawnScheduler};
pub use snapshot::{EntityKind, FrameSnapshot, HudSnapshot};
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick};
