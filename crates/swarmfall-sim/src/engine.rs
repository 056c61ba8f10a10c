//! Game engine: the per-frame loop driving every system.
//!
//! `Engine` owns the world, the RNG, and the simulation clock. The host calls
//! `frame` from its scheduler with a timestamp; the engine clamps the step,
//! runs the fixed system order, rebuilds the `GameState`, presents it, and
//! asks for the next frame. Sim time only moves inside the update body, so
//! pausing freezes every timer and the same seed and inputs replay exactly.

use std::time::Instant;

use log::{debug, info, trace, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use swarmfall_core::balance::BalanceTable;
use swarmfall_core::constants::*;
use swarmfall_core::enums::Key;
use swarmfall_core::events::GameEvent;
use swarmfall_core::input::InputState;
use swarmfall_core::state::{GameState, PerformanceMetrics};
use swarmfall_core::types::{Handle, SimClock, WorldBounds};

use crate::error::EngineError;
use crate::host::{FrameHandle, FrameScheduler, Presenter};
use crate::systems;
use crate::systems::experience::ExperienceSystem;
use crate::world::World;

/// Initial and maximum slot counts for one pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoolSize {
    pub initial: usize,
    pub max: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoolSizes {
    pub enemies: PoolSize,
    pub projectiles: PoolSize,
    pub xp_orbs: PoolSize,
}

impl Default for PoolSizes {
    fn default() -> Self {
        Self {
            enemies: PoolSize {
                initial: ENEMY_POOL_INITIAL,
                max: ENEMY_POOL_MAX,
            },
            projectiles: PoolSize {
                initial: PROJECTILE_POOL_INITIAL,
                max: PROJECTILE_POOL_MAX,
            },
            xp_orbs: PoolSize {
                initial: ORB_POOL_INITIAL,
                max: ORB_POOL_MAX,
            },
        }
    }
}

/// World extent and broad-phase cell size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub bounds: WorldBounds,
    pub cell_size: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            bounds: WorldBounds::default(),
            cell_size: GRID_CELL_SIZE,
        }
    }
}

/// Configuration for starting a new engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// RNG seed for determinism. Same seed and inputs = same run.
    pub seed: u64,
    pub balance: BalanceTable,
    pub world: WorldConfig,
    pub pools: PoolSizes,
    /// Upper bound on one simulated step (ms).
    pub max_frame_ms: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            balance: BalanceTable::default(),
            world: WorldConfig::default(),
            pools: PoolSizes::default(),
            max_frame_ms: MAX_FRAME_MS,
        }
    }
}

impl EngineConfig {
    fn validate(&self) -> Result<(), EngineError> {
        if let Err(err) = self.balance.validate() {
            warn!("Rejected balance table: {err}");
            return Err(err.into());
        }
        let pools = [
            ("pools.enemies.max", self.pools.enemies.max),
            ("pools.projectiles.max", self.pools.projectiles.max),
            ("pools.xp_orbs.max", self.pools.xp_orbs.max),
        ];
        for (field, max) in pools {
            if max == 0 {
                return Err(EngineError::InvalidConfig {
                    field,
                    reason: "must be at least 1",
                });
            }
        }
        let world = &self.world;
        if !(world.bounds.width > 0.0 && world.bounds.height > 0.0) {
            return Err(EngineError::InvalidConfig {
                field: "world.bounds",
                reason: "width and height must be positive",
            });
        }
        if !(world.cell_size.is_finite() && world.cell_size > 0.0) {
            return Err(EngineError::InvalidConfig {
                field: "world.cell_size",
                reason: "must be a positive finite number",
            });
        }
        if !(self.max_frame_ms > 0.0) {
            return Err(EngineError::InvalidConfig {
                field: "max_frame_ms",
                reason: "must be positive",
            });
        }
        Ok(())
    }
}

/// The game engine. Owns the world and all run state.
pub struct Engine {
    config: EngineConfig,
    world: World,
    experience: ExperienceSystem,
    clock: SimClock,
    rng: ChaCha8Rng,
    scheduler: Box<dyn FrameScheduler>,
    presenter: Box<dyn Presenter>,
    running: bool,
    pending_frame: Option<FrameHandle>,
    last_host_ms: Option<f64>,
    pause_key_held: bool,
    metrics: PerformanceMetrics,
    released: Vec<Handle>,
    state: GameState,
}

impl Engine {
    /// Build an engine. Nothing is constructed unless the presenter is
    /// present and the configuration validates.
    pub fn new(
        config: EngineConfig,
        scheduler: Box<dyn FrameScheduler>,
        presenter: Option<Box<dyn Presenter>>,
    ) -> Result<Self, EngineError> {
        let presenter = presenter.ok_or(EngineError::MissingSurface)?;
        config.validate()?;

        let world = World::new(&config);
        let mut engine = Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            world,
            experience: ExperienceSystem::new(),
            clock: SimClock::default(),
            scheduler,
            presenter,
            running: false,
            pending_frame: None,
            last_host_ms: None,
            pause_key_held: false,
            metrics: PerformanceMetrics::default(),
            released: Vec::new(),
            state: GameState::default(),
        };
        engine.refresh_state();
        Ok(engine)
    }

    /// Begin requesting frames. Calling it while running does nothing.
    pub fn start(&mut self) {
        if self.running {
            debug!("Engine already running");
            return;
        }
        self.running = true;
        self.last_host_ms = None;
        self.pending_frame = Some(self.scheduler.request_frame());
        info!("Engine started (seed {})", self.config.seed);
    }

    /// Cancel the pending frame and stop the loop.
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
        }
        if self.running {
            self.running = false;
            info!("Engine stopped at frame {}", self.clock.frame);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Host frame callback.
    ///
    /// The step is the host time since the previous frame, clamped to
    /// `max_frame_ms`; the first frame after `start` steps by zero. Frames
    /// delivered after `stop` are ignored.
    pub fn frame(&mut self, now_ms: f64, input: &InputState) {
        if !self.running {
            return;
        }
        self.pending_frame = None;

        let raw_ms = self
            .last_host_ms
            .map_or(0.0, |last| (now_ms - last).max(0.0));
        self.last_host_ms = Some(now_ms);
        if raw_ms > 0.0 {
            let fps = 1000.0 / raw_ms;
            self.metrics.fps = if self.metrics.fps == 0.0 {
                fps
            } else {
                self.metrics.fps + (fps - self.metrics.fps) * FPS_SMOOTHING
            };
        }
        self.metrics.frame_time_ms = raw_ms;

        self.advance(raw_ms, input);

        self.pending_frame = Some(self.scheduler.request_frame());
    }

    /// Advance by an explicit step, bypassing the scheduler. The step is
    /// clamped like a host frame. Hosts that own their loop and tests use this.
    pub fn step(&mut self, dt_ms: f64, input: &InputState) {
        self.advance(dt_ms, input);
    }

    fn advance(&mut self, dt_ms: f64, input: &InputState) {
        let dt_ms = dt_ms.clamp(0.0, self.config.max_frame_ms);
        self.handle_pause_key(input);
        if !self.world.is_paused && !self.world.is_game_over && dt_ms > 0.0 {
            self.update(dt_ms, input);
        }
        self.refresh_state();
        self.presenter.present(&self.state);
    }

    /// Edge-triggered: toggles once per press of the pause key.
    fn handle_pause_key(&mut self, input: &InputState) {
        let down = input.is_down(Key::Pause);
        if down && !self.pause_key_held {
            self.toggle_pause();
        }
        self.pause_key_held = down;
    }

    /// The update body: one fixed pass over every system.
    fn update(&mut self, dt_ms: f64, input: &InputState) {
        let started = Instant::now();
        self.clock.advance(dt_ms);
        let now = self.clock.now_ms;
        let dt = self.clock.dt_secs();
        let balance = &self.config.balance;
        let world = &mut self.world;

        // 1. Player movement
        systems::movement::move_player(&mut world.player, input, world.bounds, dt);
        // 2. Wave spawning
        systems::wave_spawner::run(world, balance, &mut self.rng, now);
        // 3. Weapons
        systems::weapons::run(world, balance, now);
        // 4. Kinematics
        let target = world.player.body.position;
        systems::movement::move_enemies(&mut world.enemies, target, dt);
        systems::movement::move_projectiles(&mut world.projectiles, world.bounds, dt, dt_ms);
        systems::movement::follow_player(&mut world.projectiles, target, now);
        systems::movement::move_orbs(&mut world.xp_orbs, target, dt);
        // 5. Collision
        systems::collision::run(world, &mut self.rng, now);
        // 6. Experience
        self.experience.update(world, balance, &mut self.rng);
        // 7. Death check
        if world.player.is_dead() && !world.is_game_over {
            world.is_game_over = true;
            world.events.push(GameEvent::GameOver {
                score: world.score,
                wave: world.wave.number,
            });
            info!(
                "Game over: score {} on wave {} after {:.1}s",
                world.score,
                world.wave.number,
                now / 1000.0
            );
        }
        // 8. Cleanup
        systems::cleanup::run(world, &mut self.released);

        self.metrics.update_ms = started.elapsed().as_secs_f64() * 1000.0;
        trace!(
            "Frame {} dt={:.2}ms update={:.3}ms entities={}",
            self.clock.frame,
            dt_ms,
            self.metrics.update_ms,
            world.entity_count()
        );
    }

    fn refresh_state(&mut self) {
        let events = std::mem::take(&mut self.world.events);
        self.state = systems::snapshot::build_snapshot(
            &self.world,
            &self.clock,
            &self.experience,
            self.metrics,
            events,
        );
    }

    pub fn pause(&mut self) {
        if !self.world.is_paused {
            self.world.is_paused = true;
            debug!("Paused at {:.0}ms", self.clock.now_ms);
        }
    }

    pub fn resume(&mut self) {
        if self.world.is_paused {
            self.world.is_paused = false;
            debug!("Resumed at {:.0}ms", self.clock.now_ms);
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.world.is_paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.world.is_paused
    }

    pub fn is_game_over(&self) -> bool {
        self.world.is_game_over
    }

    /// Start a fresh run with the same configuration. The RNG keeps its
    /// stream, so consecutive runs differ.
    pub fn restart(&mut self) {
        self.world = World::new(&self.config);
        self.experience.reset();
        self.clock = SimClock::default();
        self.metrics = PerformanceMetrics::default();
        self.pause_key_held = false;
        self.refresh_state();
        info!("Run restarted");
    }

    /// Apply a level-up offer by id. Unknown ids are ignored.
    pub fn apply_upgrade(&mut self, id: &str) -> bool {
        let applied = self.experience.apply_upgrade(
            &mut self.world,
            &self.config.balance,
            &mut self.rng,
            id,
        );
        if applied {
            self.refresh_state();
        }
        applied
    }

    /// State as of the last frame.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn clock(&self) -> SimClock {
        self.clock
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read-only access to the live world.
    pub fn world(&self) -> &World {
        &self.world
    }

    #[cfg(test)]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}
