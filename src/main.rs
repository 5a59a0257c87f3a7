//! Dodge entry point
//!
//! Headless native driver: loads progression, plays one run with a simple
//! autopilot on the fixed-step loop, then saves the result.

use dodge::consts::*;
use dodge::progression::{DEFAULT_SAVE_PATH, Progression, ProgressionStore};
use dodge::sim::{GamePhase, GameState, MoveIntent, TickInput, tick};

/// Command line options
#[derive(Debug)]
struct Options {
    save_path: String,
    seed: u64,
    max_seconds: f32,
    difficulty: Option<String>,
    snapshot: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            save_path: DEFAULT_SAVE_PATH.to_string(),
            seed: 12345,
            max_seconds: 120.0,
            difficulty: None,
            snapshot: false,
        }
    }
}

impl Options {
    fn parse() -> Self {
        let mut opts = Self::default();
        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--save" => {
                    if let Some(v) = args.next() {
                        opts.save_path = v;
                    }
                }
                "--seed" => match args.next().map(|v| v.parse()) {
                    Some(Ok(seed)) => opts.seed = seed,
                    _ => log::warn!("--seed expects an integer"),
                },
                "--seconds" => match args.next().map(|v| v.parse()) {
                    Some(Ok(secs)) => opts.max_seconds = secs,
                    _ => log::warn!("--seconds expects a number"),
                },
                "--difficulty" => opts.difficulty = args.next(),
                "--snapshot" => opts.snapshot = true,
                other => log::warn!("Ignoring unknown argument: {}", other),
            }
        }
        opts
    }
}

/// Steer away from the closest bomb falling toward the player's column
fn autopilot(state: &GameState) -> MoveIntent {
    let player = state.player.aabb();
    let center = player.center().x;
    let threat = state
        .bombs
        .iter()
        .filter(|b| b.pos.y < player.min.y + player.size.y)
        .filter(|b| {
            let aabb = b.aabb();
            aabb.max().x > player.min.x - BOMB_SIZE && aabb.min.x < player.max().x + BOMB_SIZE
        })
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

    match threat {
        Some(bomb) => {
            let bomb_x = bomb.aabb().center().x;
            if bomb_x > center {
                if player.min.x <= 0.0 { MoveIntent::Right } else { MoveIntent::Left }
            } else if player.max().x >= FIELD_WIDTH {
                MoveIntent::Left
            } else {
                MoveIntent::Right
            }
        }
        None => {
            // Drift back toward the middle
            let mid = FIELD_WIDTH / 2.0;
            if center < mid - PLAYER_SIZE {
                MoveIntent::Right
            } else if center > mid + PLAYER_SIZE {
                MoveIntent::Left
            } else {
                MoveIntent::None
            }
        }
    }
}

/// Start a run and drive it until game over or `max_seconds` of frames
fn play(state: &mut GameState, progression: &mut Progression, max_seconds: f32) {
    let mut input = TickInput {
        start: true,
        ..Default::default()
    };

    // Simulated 30 Hz frames drained through the fixed-step accumulator
    let frame_dt = 1.0 / 30.0;
    let mut accumulator = 0.0;
    let mut elapsed = 0.0;
    while elapsed < max_seconds {
        accumulator += frame_dt;
        elapsed += frame_dt;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            input.intent = autopilot(state);
            tick(state, progression, &input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            input.start = false;
        }

        if state.phase == GamePhase::GameOver {
            break;
        }
    }
}

fn main() {
    env_logger::init();
    let opts = Options::parse();
    log::info!("Dodge (headless) starting...");

    let store = ProgressionStore::new(&opts.save_path);
    let mut progression = store.load();
    if let Some(name) = &opts.difficulty {
        progression.set_difficulty(name);
    }

    let mut state = GameState::new(opts.seed);
    play(&mut state, &mut progression, opts.max_seconds);

    match state.phase {
        GamePhase::GameOver => {
            if let Some(record) = state.last_run {
                log::info!(
                    "Survived {:.1}s, collected {} coins{}",
                    record.survived,
                    record.coins,
                    if record.new_best { " - new best!" } else { "" }
                );
            }
        }
        _ => {
            // Only a game over banks coins; an unfinished run is dropped
            log::info!(
                "Time limit reached at {:.1}s, run not committed ({} coins left unbanked)",
                state.time_alive,
                state.coins_collected
            );
        }
    }

    if opts.snapshot {
        match serde_json::to_string_pretty(&state.snapshot(&progression)) {
            Ok(json) => println!("{}", json),
            Err(e) => log::warn!("Failed to serialize snapshot: {}", e),
        }
    }

    if let Err(e) = store.save(&progression) {
        log::warn!("Failed to save progression: {}", e);
    }
}
