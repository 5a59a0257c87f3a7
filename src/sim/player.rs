//! The player's avatar and its timed statuses

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::clamp_to_field;
use crate::consts::*;

/// Sustained horizontal intent, sampled once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MoveIntent {
    #[default]
    None,
    Left,
    Right,
}

impl MoveIntent {
    /// Build from held-key state; both held cancel out
    pub fn from_held(left: bool, right: bool) -> Self {
        match (left, right) {
            (true, false) => MoveIntent::Left,
            (false, true) => MoveIntent::Right,
            _ => MoveIntent::None,
        }
    }

    pub fn axis(&self) -> f32 {
        match self {
            MoveIntent::None => 0.0,
            MoveIntent::Left => -1.0,
            MoveIntent::Right => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub size: f32,
    pub speed: f32,
    /// Shield seconds left; the shield is up iff this is positive
    pub shield_time_left: f32,
    pub magnet_time_left: f32,
    /// One-time save per run
    pub second_chance_available: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Player {
    /// Centered at the bottom of the field
    pub fn new(second_chance: bool) -> Self {
        Self {
            pos: Vec2::new(
                (FIELD_WIDTH / 2.0 - PLAYER_SIZE / 2.0).floor(),
                FIELD_HEIGHT - PLAYER_SIZE - PLAYER_BOTTOM_MARGIN,
            ),
            size: PLAYER_SIZE,
            speed: PLAYER_SPEED,
            shield_time_left: 0.0,
            magnet_time_left: 0.0,
            second_chance_available: second_chance,
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::square(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size * 0.5)
    }

    pub fn has_shield(&self) -> bool {
        self.shield_time_left > 0.0
    }

    pub fn has_magnet(&self) -> bool {
        self.magnet_time_left > 0.0
    }

    pub fn grant_shield(&mut self, duration: f32) {
        self.shield_time_left = duration.max(0.0);
    }

    pub fn grant_magnet(&mut self, duration: f32) {
        self.magnet_time_left = duration.max(0.0);
    }

    /// Drop the shield after it absorbs a hit
    pub fn consume_shield(&mut self) -> bool {
        let had = self.has_shield();
        self.shield_time_left = 0.0;
        had
    }

    pub fn consume_second_chance(&mut self) -> bool {
        std::mem::replace(&mut self.second_chance_available, false)
    }

    /// Move horizontally and decay status timers
    pub fn advance(&mut self, dt: f32, intent: MoveIntent) {
        self.pos.x = clamp_to_field(self.pos.x + intent.axis() * self.speed * dt, self.size);
        self.shield_time_left = (self.shield_time_left - dt).max(0.0);
        self.magnet_time_left = (self.magnet_time_left - dt).max(0.0);
    }
}
