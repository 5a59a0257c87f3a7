//! Power-up effect table
//!
//! `apply` maps a pickup to the effect it should have given the current
//! upgrade levels; `GameState` carries the effect out.

use serde::{Deserialize, Serialize};

use super::entity::PowerUpKind;
use crate::consts::*;
use crate::progression::UpgradeLevels;

/// Inputs an effect depends on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EffectContext {
    pub shield_level: u8,
    pub magnet_level: u8,
}

impl From<&UpgradeLevels> for EffectContext {
    fn from(levels: &UpgradeLevels) -> Self {
        Self {
            shield_level: levels.shield,
            magnet_level: levels.magnet,
        }
    }
}

/// Resolved effect of a pickup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Player shield for the given seconds
    Shield { duration: f32 },
    /// Global bomb slow-down for the given seconds
    Slow { duration: f32 },
    /// Destroy every active bomb
    ClearBombs,
    /// Player magnet for the given seconds
    Magnet { duration: f32 },
}

pub fn shield_duration(level: u8) -> f32 {
    SHIELD_TIME + UPGRADE_BONUS_SECS * level as f32
}

pub fn magnet_duration(level: u8) -> f32 {
    MAGNET_TIME + UPGRADE_BONUS_SECS * level as f32
}

pub fn apply(kind: PowerUpKind, ctx: &EffectContext) -> Effect {
    match kind {
        PowerUpKind::Shield => Effect::Shield {
            duration: shield_duration(ctx.shield_level),
        },
        PowerUpKind::Slow => Effect::Slow {
            duration: SLOW_TIME,
        },
        PowerUpKind::Clear => Effect::ClearBombs,
        PowerUpKind::Magnet => Effect::Magnet {
            duration: magnet_duration(ctx.magnet_level),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_durations() {
        let ctx = EffectContext::default();
        assert_eq!(apply(PowerUpKind::Shield, &ctx), Effect::Shield { duration: 8.0 });
        assert_eq!(apply(PowerUpKind::Magnet, &ctx), Effect::Magnet { duration: 7.0 });
        assert_eq!(apply(PowerUpKind::Slow, &ctx), Effect::Slow { duration: 5.0 });
        assert_eq!(apply(PowerUpKind::Clear, &ctx), Effect::ClearBombs);
    }

    #[test]
    fn test_upgrade_bonus() {
        let ctx = EffectContext {
            shield_level: 3,
            magnet_level: 2,
        };
        assert_eq!(apply(PowerUpKind::Shield, &ctx), Effect::Shield { duration: 14.0 });
        assert_eq!(apply(PowerUpKind::Magnet, &ctx), Effect::Magnet { duration: 11.0 });
        // Slow is not upgradable
        assert_eq!(apply(PowerUpKind::Slow, &ctx), Effect::Slow { duration: 5.0 });
    }
}
