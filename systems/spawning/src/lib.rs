#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave scheduler responsible for emitting enemy spawn commands.

use std::time::Duration;

use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use werian_defence_core::{CellCoord, Command, EnemyKind};

const ORDINARY_KINDS: [EnemyKind; 2] = [EnemyKind::Orc, EnemyKind::Head];

/// Configuration parameters required to construct the wave scheduler.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Spawn interval in effect before the first wave boundary.
    pub initial_spawn_interval: Duration,
    /// Amount the spawn interval shrinks at every wave boundary.
    pub spawn_interval_step: Duration,
    /// Lower bound of the spawn interval.
    pub spawn_interval_floor: Duration,
    /// Wave interval in effect before the first wave boundary.
    pub initial_wave_interval: Duration,
    /// Amount the wave interval shrinks at every wave boundary.
    pub wave_interval_step: Duration,
    /// Lower bound of the wave interval.
    pub wave_interval_floor: Duration,
    /// Simulation time from which every wave also brings a boss.
    pub boss_threshold: Duration,
    /// Cells where ordinary enemies appear.
    pub spawn_points: Vec<CellCoord>,
    /// Cells where the wave enemy appears.
    pub wave_spawn_points: Vec<CellCoord>,
    /// Cells where the boss appears.
    pub boss_spawn_points: Vec<CellCoord>,
    /// Seed for the spawn point and archetype choices.
    pub rng_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_spawn_interval: Duration::from_millis(4_000),
            spawn_interval_step: Duration::from_millis(100),
            spawn_interval_floor: Duration::from_millis(100),
            initial_wave_interval: Duration::from_millis(40_000),
            wave_interval_step: Duration::from_millis(1_000),
            wave_interval_floor: Duration::from_millis(2_000),
            boss_threshold: Duration::from_millis(60_000),
            spawn_points: vec![
                CellCoord::new(0, 20),
                CellCoord::new(0, 16),
                CellCoord::new(50, 22),
                CellCoord::new(50, 25),
            ],
            wave_spawn_points: vec![CellCoord::new(50, 2), CellCoord::new(0, 20)],
            boss_spawn_points: vec![CellCoord::new(40, 26), CellCoord::new(0, 20)],
            rng_seed: 0x5745_5249_414e,
        }
    }
}

/// Timers and difficulty parameters carried from tick to tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveState {
    /// Current wave number, starting at one.
    pub wave: u32,
    /// Current time between ordinary spawns.
    pub spawn_interval: Duration,
    /// Current time between wave boundaries.
    pub wave_interval: Duration,
    /// Simulation time of the last ordinary spawn.
    pub last_spawn: Duration,
    /// Simulation time of the last wave boundary.
    pub last_wave: Duration,
}

/// What happened during one scheduler tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WaveTick {
    /// Wave number entered this tick, if a boundary was crossed.
    pub wave_started: Option<u32>,
    /// Number of spawn commands emitted.
    pub spawned: usize,
}

/// Pure system that emits spawn commands from two independent timers.
#[derive(Debug)]
pub struct WaveScheduler {
    config: Config,
    state: WaveState,
    rng: ChaCha8Rng,
}

impl WaveScheduler {
    /// Creates a new scheduler using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let state = WaveState {
            wave: 1,
            spawn_interval: config.initial_spawn_interval,
            wave_interval: config.initial_wave_interval,
            last_spawn: Duration::ZERO,
            last_wave: Duration::ZERO,
        };
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        Self { config, state, rng }
    }

    /// Current timers and difficulty parameters.
    #[must_use]
    pub const fn state(&self) -> &WaveState {
        &self.state
    }

    /// Advances both timers to `now`, emitting spawn commands for every
    /// timer that elapsed.
    ///
    /// A wave boundary brings one stone enemy, and a skeleton as well once
    /// `now` reaches the boss threshold, then tightens both intervals.
    pub fn handle(&mut self, now: Duration, out: &mut Vec<Command>) -> WaveTick {
        let mut tick = WaveTick::default();

        if now.saturating_sub(self.state.last_wave) >= self.state.wave_interval {
            self.state.wave = self.state.wave.saturating_add(1);
            tick.wave_started = Some(self.state.wave);

            if let Some(&cell) = self.config.wave_spawn_points.choose(&mut self.rng) {
                out.push(Command::SpawnEnemy {
                    kind: EnemyKind::Stone,
                    cell,
                });
                tick.spawned += 1;
            }

            self.state.spawn_interval = self
                .state
                .spawn_interval
                .saturating_sub(self.config.spawn_interval_step)
                .max(self.config.spawn_interval_floor);
            self.state.wave_interval = self
                .state
                .wave_interval
                .saturating_sub(self.config.wave_interval_step)
                .max(self.config.wave_interval_floor);
            self.state.last_wave = now;

            if now >= self.config.boss_threshold {
                if let Some(&cell) = self.config.boss_spawn_points.choose(&mut self.rng) {
                    out.push(Command::SpawnEnemy {
                        kind: EnemyKind::Skeleton,
                        cell,
                    });
                    tick.spawned += 1;
                }
            }
        }

        if now.saturating_sub(self.state.last_spawn) >= self.state.spawn_interval {
            self.state.last_spawn = now;
            let cell = self.config.spawn_points.choose(&mut self.rng).copied();
            let kind = ORDINARY_KINDS.choose(&mut self.rng).copied();
            if let (Some(cell), Some(kind)) = (cell, kind) {
                out.push(Command::SpawnEnemy { kind, cell });
                tick.spawned += 1;
            }
        }

        tick
    }
}
