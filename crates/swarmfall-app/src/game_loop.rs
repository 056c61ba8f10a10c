//! Headless game loop: drives the engine from a virtual host clock.
//!
//! Each iteration takes the engine's pending frame request, computes the
//! autopilot's input from the last state, and calls `Engine::frame` with the
//! host timestamp. With `realtime` set the loop sleeps to the frame rate;
//! otherwise it runs as fast as possible.

use std::time::{Duration, Instant};

use log::{debug, info};
use serde::Serialize;

use swarmfall_core::balance::BalanceTable;
use swarmfall_core::enums::Key;
use swarmfall_core::input::InputState;
use swarmfall_core::state::GameState;
use swarmfall_sim::engine::{Engine, EngineConfig};
use swarmfall_sim::error::EngineError;

use crate::state::{FrameQueue, LatestState};

/// Enemies closer than this make the autopilot back away.
const FLEE_DISTANCE: f32 = 220.0;

/// Options for one headless run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub seed: u64,
    /// Host time to run for (seconds).
    pub seconds: f64,
    pub fps: u32,
    /// Sleep between frames to match wall-clock time.
    pub realtime: bool,
    pub balance: BalanceTable,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            seconds: 60.0,
            fps: 60,
            realtime: false,
            balance: BalanceTable::default(),
        }
    }
}

/// End-of-run report printed by the binary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub frames: u64,
    pub sim_seconds: f64,
    pub score: u64,
    pub wave: u32,
    pub level: u32,
    pub kills: u32,
    pub upgrades_taken: u32,
    pub game_over: bool,
    pub peak_entities: usize,
    pub reclaimed: u64,
}

/// Run the engine headless until the time budget is spent or the player dies.
pub fn run(options: &RunOptions) -> Result<RunSummary, EngineError> {
    let queue = FrameQueue::new();
    let sink = LatestState::new();
    let config = EngineConfig {
        seed: options.seed,
        balance: options.balance,
        ..Default::default()
    };
    let mut engine = Engine::new(config, Box::new(queue.clone()), Some(Box::new(sink.clone())))?;

    let fps = options.fps.max(1);
    let frame_duration = Duration::from_secs_f64(1.0 / fps as f64);
    let frame_ms = 1000.0 / fps as f64;
    let budget_ms = options.seconds.max(0.0) * 1000.0;

    let mut host_ms = 0.0;
    let mut upgrades_taken = 0;
    let mut peak_entities = 0;
    let mut next_frame_time = Instant::now();

    engine.start();
    while host_ms <= budget_ms && queue.take_pending().is_some() {
        let input = autopilot(engine.state());
        engine.frame(host_ms, &input);

        let state = engine.state();
        peak_entities = peak_entities.max(state.metrics.entity_count);
        if state.is_game_over {
            break;
        }
        if let Some(choice) = state.level_up.choices.first().map(|c| c.id.clone()) {
            if engine.apply_upgrade(&choice) {
                debug!("Autopilot took {choice}");
                upgrades_taken += 1;
            }
        }

        host_ms += frame_ms;
        if options.realtime {
            next_frame_time += frame_duration;
            let now = Instant::now();
            if next_frame_time > now {
                std::thread::sleep(next_frame_time - now);
            } else if now - next_frame_time > frame_duration * 2 {
                // Too far behind; resync instead of catching up.
                next_frame_time = now;
            }
        }
    }
    engine.stop();

    let state = sink.latest().unwrap_or_else(|| engine.state().clone());
    let summary = summarize(options.seed, &state, sink.presented(), upgrades_taken, peak_entities);
    info!(
        "Run finished: wave {} level {} score {} ({} frames)",
        summary.wave, summary.level, summary.score, summary.frames
    );
    Ok(summary)
}

fn summarize(
    seed: u64,
    state: &GameState,
    frames: u64,
    upgrades_taken: u32,
    peak_entities: usize,
) -> RunSummary {
    RunSummary {
        seed,
        frames,
        sim_seconds: state.elapsed_ms / 1000.0,
        score: state.score,
        wave: state.wave.number,
        level: state.player.level,
        kills: state.kill_count,
        upgrades_taken,
        game_over: state.is_game_over,
        peak_entities,
        reclaimed: state.pools.enemies.reclaimed
            + state.pools.projectiles.reclaimed
            + state.pools.xp_orbs.reclaimed,
    }
}

/// Back away from the nearest enemy when it gets close; otherwise hold.
pub fn autopilot(state: &GameState) -> InputState {
    let player = state.player.body.position;
    let nearest = state
        .enemies
        .iter()
        .map(|view| view.entity.body.position)
        .min_by(|a, b| (*a - player).length_squared().total_cmp(&(*b - player).length_squared()));

    let mut input = InputState::new();
    let Some(enemy) = nearest else {
        return input;
    };
    let away = player - enemy;
    if away.length() > FLEE_DISTANCE {
        return input;
    }
    if away.x > 1.0 {
        input.press(Key::Right);
    } else if away.x < -1.0 {
        input.press(Key::Left);
    }
    if away.y > 1.0 {
        input.press(Key::Down);
    } else if away.y < -1.0 {
        input.press(Key::Up);
    }
    input
}
