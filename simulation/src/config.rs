//! Simulation configuration loaded from TOML.

use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use werian_defence_core::{CellCoord, CellRect, PassabilityPolicy, PlacementError, TowerKind};
use werian_defence_system_spawning::Config as WaveConfig;
use werian_defence_world::{Grid, GridError};

const DEFAULT_COLUMNS: u32 = 52;
const DEFAULT_ROWS: u32 = 28;
const DEFAULT_LANES: [u32; 6] = [2, 16, 20, 22, 25, 26];

/// Failures raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The configuration text was not valid TOML for this schema.
    #[error("failed to parse configuration")]
    Parse(#[from] toml::de::Error),
    /// The terrain layout could not be parsed.
    #[error("invalid terrain layout")]
    Terrain(#[from] GridError),
    /// The terrain layout disagrees with the declared dimensions.
    #[error("terrain is {found_columns}x{found_rows}, expected {columns}x{rows}")]
    DimensionMismatch {
        /// Declared column count.
        columns: u32,
        /// Declared row count.
        rows: u32,
        /// Column count found in the layout.
        found_columns: u32,
        /// Row count found in the layout.
        found_rows: u32,
    },
    /// A spawn point lies outside the grid.
    #[error("spawn point {cell:?} lies outside the grid")]
    SpawnPointOutOfBounds {
        /// Offending spawn point.
        cell: CellCoord,
    },
    /// The main structure cannot stand at its configured origin.
    #[error("main structure cannot be placed: {0}")]
    MainStructure(PlacementError),
    /// The cell size is not a positive finite number.
    #[error("cell size must be positive, got {0}")]
    CellSize(f32),
    /// The tick rate is zero.
    #[error("tick rate must be positive")]
    TickRate,
}

/// Complete description of a simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Fixed rate at which hosts drive ticks.
    pub tick_rate_hz: u32,
    /// Simulation time between two repath cycles, in milliseconds.
    pub repath_interval_ms: u64,
    /// Seed for every random choice made by the scheduler.
    pub seed: u64,
    /// Gold available before the first reward.
    pub starting_gold: u32,
    /// Map layout.
    pub level: LevelConfig,
    /// Spawn cadence and difficulty ramp.
    pub waves: WavesConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 30,
            repath_interval_ms: 2_000,
            seed: 0x5745_5249_414e,
            starting_gold: 100,
            level: LevelConfig::default(),
            waves: WavesConfig::default(),
        }
    }
}

/// Map layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LevelConfig {
    /// Number of cell columns.
    pub columns: u32,
    /// Number of cell rows.
    pub rows: u32,
    /// Side length of a cell in world units.
    pub cell_size: f32,
    /// Terrain rows, `.` for path and `#` for buildable ground.
    pub terrain: Vec<String>,
    /// Rule deciding which cells enemies may walk through.
    pub passability: PassabilityPolicy,
    /// Upper-left cell of the main structure's footprint.
    pub main_origin: CellCoord,
}

impl Default for LevelConfig {
    fn default() -> Self {
        let terrain = (0..DEFAULT_ROWS)
            .map(|row| {
                let glyph = if DEFAULT_LANES.contains(&row) { '.' } else { '#' };
                std::iter::repeat(glyph)
                    .take(DEFAULT_COLUMNS as usize)
                    .collect()
            })
            .collect();
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            cell_size: 40.0,
            terrain,
            passability: PassabilityPolicy::default(),
            main_origin: CellCoord::new(27, 9),
        }
    }
}

/// Spawn cadence and difficulty ramp, with times in milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WavesConfig {
    /// Initial time between ordinary spawns.
    pub spawn_interval_ms: u64,
    /// Spawn interval reduction per wave.
    pub spawn_interval_step_ms: u64,
    /// Lowest spawn interval.
    pub spawn_interval_floor_ms: u64,
    /// Initial time between waves.
    pub wave_interval_ms: u64,
    /// Wave interval reduction per wave.
    pub wave_interval_step_ms: u64,
    /// Lowest wave interval.
    pub wave_interval_floor_ms: u64,
    /// Time from which waves also bring a boss.
    pub boss_threshold_ms: u64,
    /// Cells where ordinary enemies appear.
    pub spawn_points: Vec<CellCoord>,
    /// Cells where wave enemies appear.
    pub wave_spawn_points: Vec<CellCoord>,
    /// Cells where bosses appear.
    pub boss_spawn_points: Vec<CellCoord>,
}

impl Default for WavesConfig {
    fn default() -> Self {
        let defaults = WaveConfig::default();
        Self {
            spawn_interval_ms: millis(defaults.initial_spawn_interval),
            spawn_interval_step_ms: millis(defaults.spawn_interval_step),
            spawn_interval_floor_ms: millis(defaults.spawn_interval_floor),
            wave_interval_ms: millis(defaults.initial_wave_interval),
            wave_interval_step_ms: millis(defaults.wave_interval_step),
            wave_interval_floor_ms: millis(defaults.wave_interval_floor),
            boss_threshold_ms: millis(defaults.boss_threshold),
            spawn_points: defaults.spawn_points,
            wave_spawn_points: defaults.wave_spawn_points,
            boss_spawn_points: defaults.boss_spawn_points,
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl SimulationConfig {
    /// Parses a configuration from TOML text; absent keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads and parses a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Checks the configuration and builds the grid it describes.
    pub fn validate(&self) -> Result<Grid, ConfigError> {
        if self.tick_rate_hz == 0 {
            return Err(ConfigError::TickRate);
        }
        let cell_size = self.level.cell_size;
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(ConfigError::CellSize(cell_size));
        }

        let grid = Grid::parse(&self.level.terrain, self.level.passability)?;
        let (found_columns, found_rows) = grid.dimensions();
        if (found_columns, found_rows) != (self.level.columns, self.level.rows) {
            return Err(ConfigError::DimensionMismatch {
                columns: self.level.columns,
                rows: self.level.rows,
                found_columns,
                found_rows,
            });
        }

        let view = grid.view();
        let waves = &self.waves;
        for &cell in waves
            .spawn_points
            .iter()
            .chain(&waves.wave_spawn_points)
            .chain(&waves.boss_spawn_points)
        {
            if !view.contains(cell) {
                return Err(ConfigError::SpawnPointOutOfBounds { cell });
            }
        }

        let footprint =
            CellRect::from_origin_and_size(self.level.main_origin, TowerKind::Main.footprint());
        grid.check_placement(footprint)
            .map_err(ConfigError::MainStructure)?;

        Ok(grid)
    }

    /// Fixed simulation step matching the tick rate.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate_hz.max(1)
    }

    /// Simulation time between two repath cycles.
    #[must_use]
    pub fn repath_interval(&self) -> Duration {
        Duration::from_millis(self.repath_interval_ms)
    }

    /// Scheduler configuration derived from the wave settings.
    #[must_use]
    pub fn wave_config(&self) -> WaveConfig {
        let waves = &self.waves;
        let spawn_floor = Duration::from_millis(waves.spawn_interval_floor_ms);
        let wave_floor = Duration::from_millis(waves.wave_interval_floor_ms);
        WaveConfig {
            initial_spawn_interval: Duration::from_millis(waves.spawn_interval_ms).max(spawn_floor),
            spawn_interval_step: Duration::from_millis(waves.spawn_interval_step_ms),
            spawn_interval_floor: spawn_floor,
            initial_wave_interval: Duration::from_millis(waves.wave_interval_ms).max(wave_floor),
            wave_interval_step: Duration::from_millis(waves.wave_interval_step_ms),
            wave_interval_floor: wave_floor,
            boss_threshold: Duration::from_millis(waves.boss_threshold_ms),
            spawn_points: waves.spawn_points.clone(),
            wave_spawn_points: waves.wave_spawn_points.clone(),
            boss_spawn_points: waves.boss_spawn_points.clone(),
            rng_seed: self.seed,
        }
    }
}
