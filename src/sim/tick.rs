//! Fixed timestep simulation tick
//!
//! Core game loop: commands, spawn timers, motion, collision resolution and
//! the difficulty ramp, in that order, once per tick.

use glam::Vec2;

use super::collision::circle_aabb_overlap;
use super::player::MoveIntent;
use super::scheduler::SpawnKind;
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;
use crate::palette;
use crate::progression::Progression;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held direction
    pub intent: MoveIntent,
    /// Start a run from the menu
    pub start: bool,
    /// Pause toggle
    pub pause: bool,
    /// New run after game over
    pub restart: bool,
    /// Back to the menu from any in-run phase
    pub abort: bool,
}

/// Advance the game state by one timestep
pub fn tick(state: &mut GameState, progression: &mut Progression, input: &TickInput, dt: f32) {
    state.events.clear();
    let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };

    handle_commands(state, progression, input);

    // Only a running game simulates
    if state.phase != GamePhase::Running {
        return;
    }

    for kind in state.scheduler.tick(dt) {
        state.spawn(kind);
    }

    integrate(state, input.intent, dt);
    prune_off_screen(state);

    let contacts = find_contacts(state);
    resolve_contacts(state, progression, contacts);
    if state.phase != GamePhase::Running {
        return;
    }

    state.time_alive += dt;
    if state.ramp.advance(dt) {
        state.scheduler.arm(SpawnKind::Bomb, state.ramp.spawn_ms);
        log::info!(
            "Difficulty bump #{}: speed {}, spawn {}ms",
            state.ramp.bumps,
            state.ramp.bomb_speed,
            state.ramp.spawn_ms
        );
        state.events.push(GameEvent::DifficultyBumped {
            bomb_speed: state.ramp.bomb_speed,
            spawn_ms: state.ramp.spawn_ms,
        });
    }
}

fn handle_commands(state: &mut GameState, progression: &Progression, input: &TickInput) {
    if input.abort && state.phase != GamePhase::Menu {
        state.return_to_menu(progression);
        return;
    }

    match state.phase {
        GamePhase::Menu if input.start => state.start_run(progression),
        GamePhase::GameOver if input.restart => state.start_run(progression),
        GamePhase::Running if input.pause => {
            state.phase = GamePhase::Paused;
            state.events.push(GameEvent::Paused);
        }
        GamePhase::Paused if input.pause => {
            state.phase = GamePhase::Running;
            state.events.push(GameEvent::Resumed);
        }
        _ => {}
    }
}

fn integrate(state: &mut GameState, intent: MoveIntent, dt: f32) {
    // Sampled before the slow timer decays
    let slow = state.slow_factor();
    state.slow_time_left = (state.slow_time_left - dt).max(0.0);

    state.player.advance(dt, intent);

    for bomb in &mut state.bombs {
        bomb.advance(dt, slow);
    }
    for powerup in &mut state.powerups {
        powerup.advance(dt);
    }

    let magnet_target = state.player.has_magnet().then(|| state.player.center());
    for coin in &mut state.coins {
        coin.advance(dt, magnet_target);
    }

    for particle in &mut state.particles {
        particle.advance(dt);
    }
    state.particles.retain(|p| p.is_alive());
}

fn prune_off_screen(state: &mut GameState) {
    state.bombs.retain(|b| !b.is_off_screen());
    state.powerups.retain(|p| !p.is_off_screen());
    state.coins.retain(|c| !c.is_off_screen());
}

/// Overlaps found in a read-only pass
#[derive(Debug, Default)]
struct Contacts {
    /// First bomb touching the player
    bomb: Option<usize>,
    powerups: Vec<usize>,
    coins: Vec<usize>,
}

fn find_contacts(state: &GameState) -> Contacts {
    let player = state.player.aabb();
    Contacts {
        bomb: state.bombs.iter().position(|b| b.aabb().overlaps(&player)),
        powerups: state
            .powerups
            .iter()
            .enumerate()
            .filter(|(_, p)| p.aabb().overlaps(&player))
            .map(|(i, _)| i)
            .collect(),
        coins: state
            .coins
            .iter()
            .enumerate()
            .filter(|(_, c)| circle_aabb_overlap(c.pos, c.radius, &player))
            .map(|(i, _)| i)
            .collect(),
    }
}

/// Apply contacts: bomb, then power-ups, then coins
fn resolve_contacts(state: &mut GameState, progression: &mut Progression, contacts: Contacts) {
    if let Some(idx) = contacts.bomb {
        let pos = state.bombs[idx].aabb().center();
        if state.player.consume_shield() {
            state.bombs.remove(idx);
            state.burst(pos, palette::OK);
            state.events.push(GameEvent::ShieldAbsorbed { pos });
        } else if state.player.consume_second_chance() {
            state.bombs.remove(idx);
            state.burst(pos, palette::GREY);
            state.events.push(GameEvent::SecondChanceUsed { pos });
        } else {
            state.burst(pos, palette::DANGER);
            state.end_run(progression);
            return;
        }
    }

    let picked: Vec<_> = contacts
        .powerups
        .iter()
        .map(|&i| (state.powerups[i].id, state.powerups[i].kind, state.powerups[i].aabb().center()))
        .collect();
    state.powerups.retain(|p| !picked.iter().any(|(id, _, _)| *id == p.id));
    for (_, kind, pos) in picked {
        state.collect_powerup(kind);
        state.burst(pos, kind.color());
        state.events.push(GameEvent::PowerUpCollected { kind, pos });
    }

    let collected: Vec<(u32, Vec2)> = contacts
        .coins
        .iter()
        .map(|&i| (state.coins[i].id, state.coins[i].pos))
        .collect();
    state.coins.retain(|c| !collected.iter().any(|(id, _)| *id == c.id));
    for (_, pos) in collected {
        state.coins_collected += 1;
        state.burst(pos, palette::GOLD);
        state.events.push(GameEvent::CoinCollected { pos });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Bomb, Coin, PowerUp, PowerUpKind};

    fn running(seed: u64) -> (GameState, Progression) {
        let progression = Progression::default();
        let mut state = GameState::new(seed);
        state.start_run(&progression);
        (state, progression)
    }

    /// Stationary bomb sitting on the player
    fn bomb_on_player(state: &mut GameState) {
        let id = state.next_entity_id();
        let mut bomb = Bomb::new(id, state.player.pos.x, 0.0);
        bomb.pos.y = state.player.pos.y;
        state.bombs.push(bomb);
    }

    #[test]
    fn test_menu_to_running() {
        let mut state = GameState::new(1);
        let mut progression = Progression::default();
        tick(&mut state, &mut progression, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Menu);
        assert_eq!(state.time_alive, 0.0);

        let input = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &mut progression, &input, SIM_DT);
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.time_alive > 0.0);
    }

    #[test]
    fn test_tick_pause() {
        let (mut state, mut progression) = running(1);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &mut progression, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Paused);

        // Frozen: nothing advances while paused
        let before_time = state.time_alive;
        let before_timers = state.scheduler.clone();
        for _ in 0..600 {
            tick(&mut state, &mut progression, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.time_alive, before_time);
        assert_eq!(state.scheduler, before_timers);
        assert!(state.bombs.is_empty());

        tick(&mut state, &mut progression, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_shield_absorbs_bomb() {
        let (mut state, mut progression) = running(2);
        state.player.grant_shield(8.0);
        bomb_on_player(&mut state);

        tick(&mut state, &mut progression, &TickInput::default(), SIM_DT);

        assert!(!state.player.has_shield());
        assert!(state.bombs.is_empty());
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.events.iter().any(|e| matches!(e, GameEvent::ShieldAbsorbed { .. })));
        assert_eq!(state.particles.len(), PARTICLES_PER_BURST);
    }

    #[test]
    fn test_fatal_bomb_commits_best_time() {
        let (mut state, mut progression) = running(3);
        progression.best = 5.0;
        state.time_alive = 12.0;
        state.coins_collected = 4;
        bomb_on_player(&mut state);

        tick(&mut state, &mut progression, &TickInput::default(), SIM_DT);

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(progression.best, 12.0);
        assert_eq!(progression.coins_total, 4);
        assert!(SpawnKind::ALL.iter().all(|k| !state.scheduler.is_armed(*k)));
        let record = state.last_run.expect("run record");
        assert!(record.new_best);
    }

    #[test]
    fn test_fatal_bomb_keeps_higher_best() {
        let (mut state, mut progression) = running(3);
        progression.best = 50.0;
        state.time_alive = 12.0;
        bomb_on_player(&mut state);
        tick(&mut state, &mut progression, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(progression.best, 50.0);
    }

    #[test]
    fn test_second_chance_is_single_use() {
        let (mut state, mut progression) = running(4);
        state.player.second_chance_available = true;

        bomb_on_player(&mut state);
        tick(&mut state, &mut progression, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Running);
        assert!(!state.player.second_chance_available);
        assert!(state.events.iter().any(|e| matches!(e, GameEvent::SecondChanceUsed { .. })));

        bomb_on_player(&mut state);
        tick(&mut state, &mut progression, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_shield_used_before_second_chance() {
        let (mut state, mut progression) = running(4);
        state.player.second_chance_available = true;
        state.player.grant_shield(3.0);
        bomb_on_player(&mut state);
        bomb_on_player(&mut state);

        // One bomb resolved per tick
        tick(&mut state, &mut progression, &TickInput::default(), SIM_DT);
        assert!(!state.player.has_shield());
        assert!(state.player.second_chance_available);
        assert_eq!(state.bombs.len(), 1);

        tick(&mut state, &mut progression, &TickInput::default(), SIM_DT);
        assert!(!state.player.second_chance_available);
        assert!(state.bombs.is_empty());
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_coin_pickup_counts_once_and_defers_commit() {
        let (mut state, mut progression) = running(5);
        let center = state.player.center();
        for _ in 0..3 {
            let id = state.next_entity_id();
            let mut coin = Coin::new(id, center.x);
            coin.pos = center;
            coin.vel = Vec2::ZERO;
            state.coins.push(coin);
        }

        tick(&mut state, &mut progression, &TickInput::default(), SIM_DT);

        assert_eq!(state.coins_collected, 3);
        assert!(state.coins.is_empty());
        assert_eq!(progression.coins_total, 0);
        let pickups = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::CoinCollected { .. }))
            .count();
        assert_eq!(pickups, 3);
    }

    #[test]
    fn test_powerup_pickup_applies_effect() {
        let (mut state, mut progression) = running(6);
        let id = state.next_entity_id();
        let mut powerup = PowerUp::new(id, PowerUpKind::Slow, state.player.pos.x);
        powerup.pos.y = state.player.pos.y;
        state.powerups.push(powerup);

        tick(&mut state, &mut progression, &TickInput::default(), SIM_DT);

        assert!(state.powerups.is_empty());
        assert_eq!(state.slow_time_left, SLOW_TIME);
        assert_eq!(state.slow_factor(), SLOW_FACTOR);
        assert!(state.events.iter().any(|e| matches!(
            e,
            GameEvent::PowerUpCollected {
                kind: PowerUpKind::Slow,
                ..
            }
        )));
    }

    #[test]
    fn test_slow_halves_bomb_fall() {
        let (mut state, mut progression) = running(7);
        state.slow_time_left = SLOW_TIME;
        let id = state.next_entity_id();
        state.bombs.push(Bomb::new(id, 0.0, 120.0));
        tick(&mut state, &mut progression, &TickInput::default(), 0.1);
        assert!((state.bombs[0].pos.y - (-BOMB_SIZE + 6.0)).abs() < 1e-4);
    }

    #[test]
    fn test_off_screen_entities_pruned() {
        let (mut state, mut progression) = running(8);
        let id = state.next_entity_id();
        let mut bomb = Bomb::new(id, 0.0, 100.0);
        bomb.pos.y = FIELD_HEIGHT - 0.5;
        state.bombs.push(bomb);
        tick(&mut state, &mut progression, &TickInput::default(), SIM_DT);
        assert!(state.bombs.is_empty());
    }

    #[test]
    fn test_abort_resets_to_menu() {
        let (mut state, mut progression) = running(9);
        state.coins_collected = 7;
        bomb_on_player(&mut state);
        let abort = TickInput {
            abort: true,
            ..Default::default()
        };
        tick(&mut state, &mut progression, &abort, SIM_DT);
        assert_eq!(state.phase, GamePhase::Menu);
        assert!(state.bombs.is_empty());
        assert_eq!(state.coins_collected, 0);
        assert!(SpawnKind::ALL.iter().all(|k| !state.scheduler.is_armed(*k)));
        // Aborting does not commit the run
        assert_eq!(progression.coins_total, 0);
    }

    #[test]
    fn test_abort_from_paused() {
        let (mut state, mut progression) = running(12);
        state.coins_collected = 4;
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &mut progression, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Paused);

        let abort = TickInput {
            abort: true,
            ..Default::default()
        };
        tick(&mut state, &mut progression, &abort, SIM_DT);
        assert_eq!(state.phase, GamePhase::Menu);
        assert!(SpawnKind::ALL.iter().all(|k| !state.scheduler.is_armed(*k)));
        assert_eq!(progression.coins_total, 0);

        // The next run starts clean
        let start = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &mut progression, &start, SIM_DT);
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.coins_collected, 0);
        assert!(SpawnKind::ALL.iter().all(|k| state.scheduler.is_armed(*k)));
    }

    #[test]
    fn test_abort_from_game_over() {
        let (mut state, mut progression) = running(13);
        state.coins_collected = 6;
        bomb_on_player(&mut state);
        tick(&mut state, &mut progression, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(progression.coins_total, 6);

        let abort = TickInput {
            abort: true,
            ..Default::default()
        };
        tick(&mut state, &mut progression, &abort, SIM_DT);
        assert_eq!(state.phase, GamePhase::Menu);
        assert!(SpawnKind::ALL.iter().all(|k| !state.scheduler.is_armed(*k)));
        // Committed once at game over, not again on the way out
        assert_eq!(progression.coins_total, 6);
    }

    #[test]
    fn test_magnet_pulls_coins_then_releases() {
        let (mut state, mut progression) = running(14);
        state.scheduler.disarm_all();
        state.player.grant_magnet(MAGNET_TIME);
        let center = state.player.center();
        let id = state.next_entity_id();
        let mut coin = Coin::new(id, center.x - 120.0);
        coin.pos = Vec2::new(center.x - 120.0, center.y);
        coin.vel = Vec2::ZERO;
        state.coins.push(coin);

        tick(&mut state, &mut progression, &TickInput::default(), SIM_DT);
        let vel = state.coins[0].vel;
        assert!(vel.x > 0.0);
        assert!(vel.y.abs() < 1e-3);

        // Expires during this tick: base fall speed is restored immediately
        state.coins[0].pos = Vec2::new(center.x - 120.0, 100.0);
        state.coins[0].vel = Vec2::new(200.0, -50.0);
        state.player.magnet_time_left = SIM_DT / 2.0;
        tick(&mut state, &mut progression, &TickInput::default(), SIM_DT);
        assert_eq!(state.player.magnet_time_left, 0.0);
        assert!(state.coins[0].vel.y >= COIN_VY);
    }

    #[test]
    fn test_restart_after_game_over() {
        let (mut state, mut progression) = running(10);
        bomb_on_player(&mut state);
        tick(&mut state, &mut progression, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);

        // Start does nothing outside the menu
        let start = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &mut progression, &start, SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &mut progression, &restart, SIM_DT);
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.bombs.is_empty());
        assert!(state.scheduler.is_armed(SpawnKind::Bomb));
    }

    #[test]
    fn test_bump_rearms_bomb_timer() {
        let (mut state, mut progression) = running(11);
        state.ramp.timer = DIFFICULTY_STEP_SECS - SIM_DT / 2.0;
        tick(&mut state, &mut progression, &TickInput::default(), SIM_DT);
        assert_eq!(state.ramp.bumps, 1);
        assert_eq!(state.scheduler.period_ms(SpawnKind::Bomb), Some(780 - 70));
        assert!(state.events.iter().any(|e| matches!(e, GameEvent::DifficultyBumped { .. })));
    }

    #[test]
    fn test_determinism() {
        let mut a = GameState::new(99999);
        let mut b = GameState::new(99999);
        let mut pa = Progression::default();
        let mut pb = Progression::default();
        let start = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut a, &mut pa, &start, SIM_DT);
        tick(&mut b, &mut pb, &start, SIM_DT);
        let input = TickInput {
            intent: MoveIntent::Left,
            ..Default::default()
        };
        for _ in 0..300 {
            tick(&mut a, &mut pa, &input, SIM_DT);
            tick(&mut b, &mut pb, &input, SIM_DT);
        }
        assert_eq!(a.phase, b.phase);
        assert_eq!(a.bombs, b.bombs);
        assert_eq!(a.coins, b.coins);
        assert_eq!(a.powerups, b.powerups);
    }
}
