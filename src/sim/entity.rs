//! Falling entities and visual particles

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::*;
use crate::{direction_to, palette};

/// A falling hazard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bomb {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    /// Fall speed captured at spawn (px/s)
    pub vy: f32,
}

impl Bomb {
    /// New bomb just above the top edge
    pub fn new(id: u32, x: f32, vy: f32) -> Self {
        Self {
            id,
            pos: Vec2::new(x, -BOMB_SIZE),
            vy,
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::square(self.pos, BOMB_SIZE)
    }

    /// Straight descent, scaled by the slow factor
    pub fn advance(&mut self, dt: f32, slow: f32) {
        self.pos.y += self.vy * slow * dt;
    }

    pub fn is_off_screen(&self) -> bool {
        self.pos.y >= FIELD_HEIGHT
    }
}

/// Collectible currency; falls, or homes on the player while a magnet is active
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    /// Center
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Coin {
    pub fn new(id: u32, x: f32) -> Self {
        Self {
            id,
            pos: Vec2::new(x, COIN_SPAWN_Y),
            vel: Vec2::new(0.0, COIN_VY),
            radius: COIN_RADIUS,
        }
    }

    /// Integrate one step.
    ///
    /// `magnet_target` is the player's center while the magnet is active.
    /// Speed is capped at `COIN_MAX_SPEED`; without a magnet the downward
    /// speed is floored at `COIN_VY`, even on the tick the magnet expires.
    pub fn advance(&mut self, dt: f32, magnet_target: Option<Vec2>) {
        if let Some(target) = magnet_target {
            let accel = direction_to(self.pos, target) * COIN_MAGNET_ACCEL;
            self.vel += accel * dt;
        }
        self.vel = self.vel.clamp_length_max(COIN_MAX_SPEED);
        if magnet_target.is_none() {
            self.vel.y = self.vel.y.max(COIN_VY);
        }
        self.pos += self.vel * dt;
    }

    pub fn is_off_screen(&self) -> bool {
        self.pos.y - self.radius >= FIELD_HEIGHT
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Shield,
    Slow,
    Clear,
    Magnet,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Shield,
        PowerUpKind::Slow,
        PowerUpKind::Clear,
        PowerUpKind::Magnet,
    ];

    /// Uniform pick among the four kinds
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    pub fn color(&self) -> u32 {
        match self {
            PowerUpKind::Shield => palette::OK,
            PowerUpKind::Slow => palette::ORANGE,
            PowerUpKind::Clear => palette::PURPLE,
            PowerUpKind::Magnet => palette::SKY,
        }
    }
}

/// A falling power-up capsule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    /// Top-left corner
    pub pos: Vec2,
    pub vy: f32,
}

impl PowerUp {
    pub fn new(id: u32, kind: PowerUpKind, x: f32) -> Self {
        Self {
            id,
            kind,
            pos: Vec2::new(x, -POWERUP_SIZE),
            vy: POWERUP_FALL_SPEED,
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::square(self.pos, POWERUP_SIZE)
    }

    /// Power-ups ignore the slow effect
    pub fn advance(&mut self, dt: f32) {
        self.pos.y += self.vy * dt;
    }

    pub fn is_off_screen(&self) -> bool {
        self.pos.y >= FIELD_HEIGHT
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    /// Seconds remaining
    pub life: f32,
    pub size: f32,
}

impl Particle {
    pub fn spawn(pos: Vec2, color: u32, rng: &mut impl Rng) -> Self {
        Self {
            pos,
            vel: Vec2::new(
                rng.random_range(-120.0..=120.0),
                rng.random_range(-220.0..=-60.0),
            ),
            color,
            life: rng.random_range(0.5..=PARTICLE_MAX_LIFE),
            size: rng.random_range(2..=4) as f32,
        }
    }

    /// Ballistic step with gravity and linear life decay
    pub fn advance(&mut self, dt: f32) {
        self.life -= dt;
        self.vel.y += PARTICLE_GRAVITY * dt;
        self.pos += self.vel * dt;
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Opacity for the renderer (0-1)
    pub fn alpha(&self) -> f32 {
        (self.life / PARTICLE_MAX_LIFE).clamp(0.0, 1.0)
    }
}
