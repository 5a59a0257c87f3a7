//! Read-only frame snapshot for renderers and HUDs

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::PowerUpKind;
use super::state::{GamePhase, GameState};
use crate::progression::Progression;

/// What an entity view represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Bomb,
    PowerUp(PowerUpKind),
    Coin,
}

/// A drawable entity (top-left + size)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub size: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub size: f32,
    pub shield: bool,
    pub magnet: bool,
    pub second_chance: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleView {
    pub pos: Vec2,
    pub color: u32,
    pub alpha: f32,
    pub size: f32,
}

/// Run metrics for the HUD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub phase: GamePhase,
    pub difficulty: String,
    pub time_alive: f32,
    pub best: f32,
    pub coins: u32,
    pub coins_total: u64,
    pub slow_time_left: f32,
    pub shield_time_left: f32,
    pub magnet_time_left: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub hud: HudSnapshot,
    pub player: PlayerView,
    pub entities: Vec<EntityView>,
    pub particles: Vec<ParticleView>,
}

impl GameState {
    pub fn hud(&self, progression: &Progression) -> HudSnapshot {
        HudSnapshot {
            phase: self.phase,
            difficulty: self.ramp.difficulty.as_str().to_string(),
            time_alive: self.time_alive,
            best: progression.best,
            coins: self.coins_collected,
            coins_total: progression.coins_total,
            slow_time_left: self.slow_time_left,
            shield_time_left: self.player.shield_time_left,
            magnet_time_left: self.player.magnet_time_left,
        }
    }

    /// Everything a renderer needs for one frame, in draw order
    pub fn snapshot(&self, progression: &Progression) -> FrameSnapshot {
        let bombs = self.bombs.iter().map(|b| {
            let aabb = b.aabb();
            EntityView {
                id: b.id,
                kind: EntityKind::Bomb,
                pos: aabb.min,
                size: aabb.size,
            }
        });
        let powerups = self.powerups.iter().map(|p| {
            let aabb = p.aabb();
            EntityView {
                id: p.id,
                kind: EntityKind::PowerUp(p.kind),
                pos: aabb.min,
                size: aabb.size,
            }
        });
        let coins = self.coins.iter().map(|c| EntityView {
            id: c.id,
            kind: EntityKind::Coin,
            pos: c.pos - Vec2::splat(c.radius),
            size: Vec2::splat(c.radius * 2.0),
        });

        FrameSnapshot {
            hud: self.hud(progression),
            player: PlayerView {
                pos: self.player.pos,
                size: self.player.size,
                shield: self.player.has_shield(),
                magnet: self.player.has_magnet(),
                second_chance: self.player.second_chance_available,
            },
            entities: bombs.chain(powerups).chain(coins).collect(),
            particles: self
                .particles
                .iter()
                .map(|p| ParticleView {
                    pos: p.pos,
                    color: p.color,
                    alpha: p.alpha(),
                    size: p.size,
                })
                .collect(),
        }
    }
}
