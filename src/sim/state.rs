//! Game state and core simulation types
//!
//! Everything a run owns lives here and is rebuilt on start, restart and
//! abort. Persistent data is passed in as a [`Progression`] at the
//! checkpoints that need it.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::{Difficulty, DifficultyRamp};
use super::effects::{self, Effect, EffectContext};
use super::entity::{Bomb, Coin, Particle, PowerUp, PowerUpKind};
use super::player::Player;
use super::scheduler::{SpawnKind, SpawnScheduler};
use crate::consts::*;
use crate::palette;
use crate::progression::{Progression, RunRecord, UpgradeLevels};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen; simulation idle
    #[default]
    Menu,
    /// Active gameplay
    Running,
    /// Game is paused
    Paused,
    /// Run ended
    GameOver,
}

/// Things that happened during a tick, for audio/HUD/tests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted { difficulty: Difficulty },
    Paused,
    Resumed,
    ReturnedToMenu,
    Spawned(SpawnKind),
    /// Shield took a bomb hit
    ShieldAbsorbed { pos: Vec2 },
    /// Second chance took a bomb hit
    SecondChanceUsed { pos: Vec2 },
    PowerUpCollected { kind: PowerUpKind, pos: Vec2 },
    /// A bomb destroyed by the clear power-up
    BombCleared { pos: Vec2 },
    CoinCollected { pos: Vec2 },
    DifficultyBumped { bomb_speed: f32, spawn_ms: u32 },
    GameOver(RunRecord),
}

/// Complete run state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub phase: GamePhase,
    pub player: Player,
    /// Active entities (spawn order)
    pub bombs: Vec<Bomb>,
    pub powerups: Vec<PowerUp>,
    pub coins: Vec<Coin>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub ramp: DifficultyRamp,
    pub scheduler: SpawnScheduler,
    /// Survival time this run (seconds)
    pub time_alive: f32,
    pub slow_time_left: f32,
    pub coins_collected: u32,
    /// Upgrade levels in effect for this run
    pub upgrades: UpgradeLevels,
    /// Events from the most recent tick
    pub events: Vec<GameEvent>,
    /// Result of the last finished run
    pub last_run: Option<RunRecord>,
    next_id: u32,
}

impl GameState {
    /// Create an idle state on the menu
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Menu,
            player: Player::default(),
            bombs: Vec::new(),
            powerups: Vec::new(),
            coins: Vec::new(),
            particles: Vec::new(),
            ramp: DifficultyRamp::default(),
            scheduler: SpawnScheduler::new(),
            time_alive: 0.0,
            slow_time_left: 0.0,
            coins_collected: 0,
            upgrades: UpgradeLevels::default(),
            events: Vec::new(),
            last_run: None,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn clear_run(&mut self, progression: &Progression) {
        self.ramp.apply_profile(progression.difficulty());
        self.upgrades = progression.upgrades;
        self.player = Player::new(self.upgrades.has_second_chance());
        self.bombs.clear();
        self.powerups.clear();
        self.coins.clear();
        self.particles.clear();
        self.time_alive = 0.0;
        self.slow_time_left = 0.0;
        self.coins_collected = 0;
        self.scheduler.disarm_all();
    }

    /// Begin a fresh run (from the menu or after game over)
    pub fn start_run(&mut self, progression: &Progression) {
        self.clear_run(progression);
        self.phase = GamePhase::Running;

        self.scheduler.arm(SpawnKind::Bomb, self.ramp.spawn_ms);
        let powerup_ms = self.roll_powerup_period();
        self.scheduler.arm(SpawnKind::PowerUp, powerup_ms);
        self.scheduler.arm(SpawnKind::Coin, COIN_MS);

        log::info!(
            "Run started: {} (speed {}, spawn {}ms)",
            self.ramp.difficulty.as_str(),
            self.ramp.bomb_speed,
            self.ramp.spawn_ms
        );
        self.events.push(GameEvent::RunStarted {
            difficulty: self.ramp.difficulty,
        });
    }

    /// Abandon whatever is happening and go back to the menu
    pub fn return_to_menu(&mut self, progression: &Progression) {
        self.clear_run(progression);
        self.phase = GamePhase::Menu;
        self.events.push(GameEvent::ReturnedToMenu);
    }

    /// Power-up period bounds (ms) after the drops bonus
    pub fn powerup_period_range(upgrades: &UpgradeLevels) -> (u32, u32) {
        let lo = POWERUP_MS_LO;
        let hi = POWERUP_MS_HI
            .saturating_sub(POWERUP_MS_PER_DROP_LEVEL * upgrades.drops as u32)
            .max(lo + POWERUP_MS_MIN_SPREAD);
        (lo, hi)
    }

    fn roll_powerup_period(&mut self) -> u32 {
        let (lo, hi) = Self::powerup_period_range(&self.upgrades);
        self.rng.random_range(lo..=hi)
    }

    /// Take new upgrade levels mid-run and re-arm the power-up timer with
    /// the new drop range
    pub fn apply_upgrades(&mut self, upgrades: &UpgradeLevels) {
        self.upgrades = *upgrades;
        if matches!(self.phase, GamePhase::Running | GamePhase::Paused) {
            let ms = self.roll_powerup_period();
            self.scheduler.arm(SpawnKind::PowerUp, ms);
        }
    }

    /// Bomb fall multiplier for this tick
    pub fn slow_factor(&self) -> f32 {
        if self.slow_time_left > 0.0 {
            SLOW_FACTOR
        } else {
            1.0
        }
    }

    pub fn spawn(&mut self, kind: SpawnKind) {
        match kind {
            SpawnKind::Bomb => self.spawn_bomb(),
            SpawnKind::PowerUp => self.spawn_powerup(),
            SpawnKind::Coin => self.spawn_coin(),
        }
        log::debug!("Spawned {:?}", kind);
        self.events.push(GameEvent::Spawned(kind));
    }

    fn spawn_bomb(&mut self) {
        let max_x = (FIELD_WIDTH - BOMB_SIZE) as u32;
        let x = self.rng.random_range(0..=max_x) as f32;
        let id = self.next_entity_id();
        self.bombs.push(Bomb::new(id, x, self.ramp.bomb_speed));
    }

    /// Spawns and redraws the next power-up period
    fn spawn_powerup(&mut self) {
        let kind = PowerUpKind::random(&mut self.rng);
        let x = self.rng.random_range(24..=(FIELD_WIDTH - 50.0) as u32) as f32;
        let id = self.next_entity_id();
        self.powerups.push(PowerUp::new(id, kind, x));
        let ms = self.roll_powerup_period();
        self.scheduler.arm(SpawnKind::PowerUp, ms);
    }

    fn spawn_coin(&mut self) {
        let x = self.rng.random_range(20..=(FIELD_WIDTH - 20.0) as u32) as f32;
        let id = self.next_entity_id();
        self.coins.push(Coin::new(id, x));
    }

    /// Spray feedback particles at `pos`
    pub fn burst(&mut self, pos: Vec2, color: u32) {
        for _ in 0..PARTICLES_PER_BURST {
            let particle = Particle::spawn(pos, color, &mut self.rng);
            self.particles.push(particle);
        }
        if self.particles.len() > MAX_PARTICLES {
            let excess = self.particles.len() - MAX_PARTICLES;
            self.particles.drain(..excess);
        }
    }

    /// Carry out a power-up effect
    pub fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Shield { duration } => self.player.grant_shield(duration),
            Effect::Slow { duration } => self.slow_time_left = duration,
            Effect::ClearBombs => {
                let centers: Vec<Vec2> = self.bombs.iter().map(|b| b.aabb().center()).collect();
                self.bombs.clear();
                for pos in centers {
                    self.burst(pos, palette::PURPLE);
                    self.events.push(GameEvent::BombCleared { pos });
                }
            }
            Effect::Magnet { duration } => self.player.grant_magnet(duration),
        }
    }

    /// Resolve a pickup through the effect table
    pub fn collect_powerup(&mut self, kind: PowerUpKind) {
        let effect = effects::apply(kind, &EffectContext::from(&self.upgrades));
        self.apply_effect(effect);
    }

    /// Fatal hit: commit results and stop all timers in the same step
    pub fn end_run(&mut self, progression: &mut Progression) {
        self.scheduler.disarm_all();
        self.phase = GamePhase::GameOver;
        let record = progression.commit_run(self.time_alive, self.coins_collected);
        log::info!(
            "Game over after {:.1}s with {} coins{}",
            record.survived,
            record.coins,
            if record.new_best { " (new best!)" } else { "" }
        );
        self.last_run = Some(record);
        self.events.push(GameEvent::GameOver(record));
    }
}
