//! Upgrade shop
//!
//! Cost of the next level is `base + step * current_level`. A purchase either
//! deducts the cost and raises the level together, or changes nothing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::progression::Progression;

/// Purchasable upgrades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeKey {
    Shield,
    Magnet,
    Drops,
    SecondChance,
}

/// Catalog row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub title: &'static str,
    pub description: &'static str,
    pub max_level: u8,
    pub base_cost: u32,
    pub step_cost: u32,
}

impl UpgradeKey {
    pub const ALL: [UpgradeKey; 4] = [
        UpgradeKey::Shield,
        UpgradeKey::Magnet,
        UpgradeKey::Drops,
        UpgradeKey::SecondChance,
    ];

    /// Key used in the save file
    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeKey::Shield => "shield",
            UpgradeKey::Magnet => "magnet",
            UpgradeKey::Drops => "drops",
            UpgradeKey::SecondChance => "second",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "shield" => Some(UpgradeKey::Shield),
            "magnet" => Some(UpgradeKey::Magnet),
            "drops" => Some(UpgradeKey::Drops),
            "second" | "second_chance" => Some(UpgradeKey::SecondChance),
            _ => None,
        }
    }

    pub fn entry(&self) -> CatalogEntry {
        match self {
            UpgradeKey::Shield => CatalogEntry {
                title: "Shield+",
                description: "Shield lasts +2s per level",
                max_level: 3,
                base_cost: 15,
                step_cost: 10,
            },
            UpgradeKey::Magnet => CatalogEntry {
                title: "Magnet+",
                description: "Magnet lasts +2s per level",
                max_level: 3,
                base_cost: 15,
                step_cost: 10,
            },
            UpgradeKey::Drops => CatalogEntry {
                title: "Drops+",
                description: "Power-ups drop more often",
                max_level: 3,
                base_cost: 20,
                step_cost: 12,
            },
            UpgradeKey::SecondChance => CatalogEntry {
                title: "Second Chance",
                description: "One extra life per run",
                max_level: 1,
                base_cost: 40,
                step_cost: 0,
            },
        }
    }

    pub fn max_level(&self) -> u8 {
        self.entry().max_level
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShopError {
    #[error("unknown upgrade: {0}")]
    UnknownUpgrade(String),

    #[error("{} is already at max level {level}", .key.as_str())]
    MaxLevel { key: UpgradeKey, level: u8 },

    #[error("insufficient coins: need {cost}, have {balance}")]
    InsufficientCoins { cost: u32, balance: u64 },
}

pub type ShopResult<T> = Result<T, ShopError>;

/// Price of the next level, or None when maxed
pub fn upgrade_cost(key: UpgradeKey, level: u8) -> Option<u32> {
    let entry = key.entry();
    if level >= entry.max_level {
        return None;
    }
    Some(entry.base_cost + entry.step_cost * level as u32)
}

/// Successful purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    pub key: UpgradeKey,
    pub cost: u32,
    pub new_level: u8,
    pub balance: u64,
}

/// Buy the next level of `key`. Validates before mutating.
pub fn purchase(progression: &mut Progression, key: UpgradeKey) -> ShopResult<Receipt> {
    let level = progression.upgrades.level(key);
    let cost = upgrade_cost(key, level).ok_or(ShopError::MaxLevel { key, level })?;
    let balance = progression.coins_total;
    if balance < cost as u64 {
        return Err(ShopError::InsufficientCoins { cost, balance });
    }

    progression.coins_total = balance - cost as u64;
    let new_level = level + 1;
    *progression.upgrades.level_mut(key) = new_level;
    log::info!(
        "Purchased {} level {} for {} coins ({} left)",
        key.as_str(),
        new_level,
        cost,
        progression.coins_total
    );
    Ok(Receipt {
        key,
        cost,
        new_level,
        balance: progression.coins_total,
    })
}

/// Purchase by save-file key
pub fn purchase_by_name(progression: &mut Progression, name: &str) -> ShopResult<Receipt> {
    let key = UpgradeKey::from_str(name).ok_or_else(|| ShopError::UnknownUpgrade(name.to_string()))?;
    purchase(progression, key)
}
