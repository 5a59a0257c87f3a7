//! Spawn timers
//!
//! Three independent periodic countdowns keyed by [`SpawnKind`]. Periods only
//! change through [`SpawnScheduler::arm`]; nothing re-arms implicitly.

use serde::{Deserialize, Serialize};

use crate::consts::MIN_TIMER_PERIOD_MS;
use crate::ms_to_secs;

/// What a timer spawns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnKind {
    Bomb,
    PowerUp,
    Coin,
}

impl SpawnKind {
    pub const ALL: [SpawnKind; 3] = [SpawnKind::Bomb, SpawnKind::PowerUp, SpawnKind::Coin];

    fn index(self) -> usize {
        match self {
            SpawnKind::Bomb => 0,
            SpawnKind::PowerUp => 1,
            SpawnKind::Coin => 2,
        }
    }
}

/// A single periodic timer
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnTimer {
    /// Period in ms (None = disarmed)
    pub period_ms: Option<u32>,
    /// Seconds until next firing
    pub remaining: f32,
}

impl SpawnTimer {
    pub fn is_armed(&self) -> bool {
        self.period_ms.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnScheduler {
    timers: [SpawnTimer; 3],
}

impl SpawnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)arm a timer; the countdown restarts from the full period.
    ///
    /// Periods are floored at `MIN_TIMER_PERIOD_MS`.
    pub fn arm(&mut self, kind: SpawnKind, period_ms: u32) {
        let period_ms = period_ms.max(MIN_TIMER_PERIOD_MS);
        self.timers[kind.index()] = SpawnTimer {
            period_ms: Some(period_ms),
            remaining: ms_to_secs(period_ms),
        };
    }

    pub fn disarm(&mut self, kind: SpawnKind) {
        self.timers[kind.index()] = SpawnTimer::default();
    }

    pub fn disarm_all(&mut self) {
        self.timers = Default::default();
    }

    pub fn timer(&self, kind: SpawnKind) -> &SpawnTimer {
        &self.timers[kind.index()]
    }

    pub fn period_ms(&self, kind: SpawnKind) -> Option<u32> {
        self.timer(kind).period_ms
    }

    pub fn is_armed(&self, kind: SpawnKind) -> bool {
        self.timer(kind).is_armed()
    }

    /// Advance all armed timers; returns the kinds that fired, in
    /// bomb, power-up, coin order.
    ///
    /// Each timer fires at most once per call; a backlog longer than one
    /// period is dropped.
    pub fn tick(&mut self, dt: f32) -> Vec<SpawnKind> {
        let dt = dt.max(0.0);
        let mut fired = Vec::new();
        for kind in SpawnKind::ALL {
            let timer = &mut self.timers[kind.index()];
            let Some(period_ms) = timer.period_ms else {
                continue;
            };
            let period = ms_to_secs(period_ms);
            timer.remaining -= dt;
            if timer.remaining <= 0.0 {
                timer.remaining += period;
                if timer.remaining <= 0.0 {
                    timer.remaining = period;
                }
                fired.push(kind);
            }
        }
        fired
    }
}
