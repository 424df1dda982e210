#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-order tick driver for Werian Defence.
//!
//! [`Simulation`] owns the authoritative world and every pure system. Each
//! running tick executes repath, movement, combat, spawn and death sweep in
//! that order; every phase reads views captured from the world and feeds its
//! commands back through [`werian_defence_world::apply`].

mod config;
mod economy;
mod state;

use std::time::Duration;

use glam::Vec2;
use tracing::{debug, info, warn};
use werian_defence_core::{
    Command, Event, PlacementError, Presentation, Reward, TowerId, TowerKind, TowerTarget,
    UpgradeError,
};
use werian_defence_system_movement::Movement;
use werian_defence_system_pathfinding::Repathing;
use werian_defence_system_spawning::WaveScheduler;
use werian_defence_system_tower_combat::{ProjectileFlight, TowerCombat};
use werian_defence_system_tower_targeting::TowerTargeting;
use werian_defence_world::{self as world, query, World};

pub use config::{ConfigError, LevelConfig, SimulationConfig, WavesConfig};
pub use economy::Economy;
pub use state::{GameState, Intent, IntentError};

use state::Transition;

/// Phases a running tick may execute, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Nearest-structure assignment and route recomputation.
    Repath,
    /// Route following and melee contact.
    Movement,
    /// Tower attacks and projectile flight.
    Combat,
    /// Wave scheduler timers.
    Spawn,
    /// Removal of dead agents.
    Sweep,
}

/// Summary of one call to [`Simulation::tick`].
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    /// State after the tick.
    pub state: GameState,
    /// Phases executed, in order.
    pub phases: Vec<Phase>,
    /// One reward per enemy removed by the death sweep.
    pub rewards: Vec<Reward>,
    /// Wave number entered during the tick, if any.
    pub wave_started: Option<u32>,
    /// Every event the world emitted during the tick.
    pub events: Vec<Event>,
}

impl TickReport {
    fn idle(state: GameState) -> Self {
        Self {
            state,
            phases: Vec::new(),
            rewards: Vec::new(),
            wave_started: None,
            events: Vec::new(),
        }
    }
}

/// Authoritative simulation plus the systems and timers that drive it.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    pristine: World,
    world: World,
    state: GameState,
    economy: Economy,
    now: Duration,
    last_repath: Option<Duration>,
    quit_requested: bool,
    repathing: Repathing,
    movement: Movement,
    targeting: TowerTargeting,
    combat: TowerCombat,
    flight: ProjectileFlight,
    waves: WaveScheduler,
    targets: Vec<TowerTarget>,
    commands: Vec<Command>,
}

impl Simulation {
    /// Validates the configuration and builds a world holding only the main structure.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        let grid = config.validate()?;
        let mut pristine = World::new(grid, config.level.cell_size);
        let mut events = Vec::new();
        world::apply(
            &mut pristine,
            Command::PlaceTower {
                kind: TowerKind::Main,
                origin: config.level.main_origin,
            },
            &mut events,
        );
        if let Some(Event::TowerPlacementRejected { reason, .. }) = events.first() {
            return Err(ConfigError::MainStructure(*reason));
        }

        let waves = WaveScheduler::new(config.wave_config());
        let economy = Economy::new(config.starting_gold);
        Ok(Self {
            world: pristine.clone(),
            pristine,
            state: GameState::Menu,
            economy,
            now: Duration::ZERO,
            last_repath: None,
            quit_requested: false,
            repathing: Repathing::default(),
            movement: Movement,
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            flight: ProjectileFlight,
            waves,
            targets: Vec::new(),
            commands: Vec::new(),
            config,
        })
    }

    /// Applies a lifecycle intent, returning the resulting state.
    pub fn handle_intent(&mut self, intent: Intent) -> Result<GameState, IntentError> {
        match state::transition(self.state, intent)? {
            Transition::To(next) => {
                info!(from = ?self.state, to = ?next, "state transition");
                self.state = next;
            }
            Transition::Reset => {
                info!(from = ?self.state, "run reset");
                self.reset();
            }
            Transition::Exit => {
                info!(state = ?self.state, "quit requested");
                self.quit_requested = true;
            }
        }
        Ok(self.state)
    }

    fn reset(&mut self) {
        self.world = self.pristine.clone();
        self.state = GameState::Menu;
        self.economy = Economy::new(self.config.starting_gold);
        self.now = Duration::ZERO;
        self.last_repath = None;
        self.waves = WaveScheduler::new(self.config.wave_config());
    }

    /// Places a structure centred on the cell containing `anchor`.
    ///
    /// The grid is left unchanged when the request is rejected. Gold is not
    /// checked here; callers consult [`Simulation::economy`] first.
    pub fn request_placement(
        &mut self,
        anchor: Vec2,
        kind: TowerKind,
    ) -> Result<TowerId, PlacementError> {
        if !kind.placeable() {
            return Err(PlacementError::ReservedKind);
        }
        let origin = world::footprint_origin(anchor, kind, self.config.level.cell_size)
            .ok_or(PlacementError::OutOfBounds)?;

        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::PlaceTower { kind, origin },
            &mut events,
        );
        match events.first() {
            Some(Event::TowerPlaced { tower, .. }) => {
                info!(
                    tower = tower.get(),
                    ?kind,
                    column = origin.column(),
                    row = origin.row(),
                    "tower placed"
                );
                Ok(*tower)
            }
            Some(Event::TowerPlacementRejected { reason, .. }) => {
                debug!(
                    ?kind,
                    column = origin.column(),
                    row = origin.row(),
                    %reason,
                    "placement rejected"
                );
                Err(*reason)
            }
            _ => Err(PlacementError::Occupied),
        }
    }

    /// Upgrades a structure, returning the level it reached.
    pub fn request_upgrade(&mut self, tower: TowerId) -> Result<u32, UpgradeError> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::UpgradeTower { tower }, &mut events);
        match events.first() {
            Some(Event::TowerUpgraded { level, .. }) => {
                info!(tower = tower.get(), level, "tower upgraded");
                Ok(*level)
            }
            Some(Event::TowerUpgradeRejected { reason, .. }) => Err(*reason),
            _ => Err(UpgradeError::MissingTower),
        }
    }

    /// Advances a running simulation by `dt`.
    ///
    /// Ticks outside [`GameState::Running`] do nothing. When the main
    /// structure falls during movement, the tick sweeps casualties and ends
    /// without running combat or spawning.
    pub fn tick(&mut self, dt: Duration) -> TickReport {
        if self.state != GameState::Running {
            return TickReport::idle(self.state);
        }

        let mut report = TickReport::idle(self.state);
        self.now = self.now.saturating_add(dt);
        self.apply(Command::AdvanceClock { now: self.now }, &mut report);

        let repath_due = self
            .last_repath
            .map_or(true, |last| self.now.saturating_sub(last) >= self.config.repath_interval());
        if repath_due {
            self.repath(&mut report);
        }

        self.run_movement(&mut report);
        if self.main_tower_fallen() {
            self.sweep(&mut report);
            return report;
        }

        self.run_combat(&mut report);
        self.run_spawning(&mut report);
        self.sweep(&mut report);
        report
    }

    fn repath(&mut self, report: &mut TickReport) {
        let summary = self.repathing.handle(
            &query::enemy_view(&self.world),
            &query::tower_view(&self.world),
            query::grid_view(&self.world),
            query::cell_size(&self.world),
            &mut self.commands,
        );
        debug!(
            assigned = summary.assigned,
            retained = summary.retained,
            untargeted = summary.untargeted,
            "repath cycle"
        );
        self.last_repath = Some(self.now);
        self.flush(report);
        report.phases.push(Phase::Repath);
    }

    fn run_movement(&mut self, report: &mut TickReport) {
        self.movement.handle(
            &query::enemy_view(&self.world),
            &query::tower_view(&self.world),
            &mut self.commands,
        );
        self.flush(report);
        report.phases.push(Phase::Movement);
    }

    fn run_combat(&mut self, report: &mut TickReport) {
        let towers = query::tower_view(&self.world);
        self.targeting
            .handle(&towers, &query::enemy_view(&self.world), &mut self.targets);
        self.combat
            .handle(self.now, &towers, &self.targets, &mut self.commands);
        self.flush(report);

        self.flight.handle(
            &query::projectile_view(&self.world),
            &query::enemy_view(&self.world),
            query::playfield(&self.world),
            &mut self.commands,
        );
        self.flush(report);
        report.phases.push(Phase::Combat);
    }

    fn run_spawning(&mut self, report: &mut TickReport) {
        let tick = self.waves.handle(self.now, &mut self.commands);
        if let Some(wave) = tick.wave_started {
            info!(
                wave,
                spawn_interval_ms = millis(self.waves.state().spawn_interval),
                wave_interval_ms = millis(self.waves.state().wave_interval),
                "wave started"
            );
        }
        if tick.spawned > 0 {
            debug!(spawned = tick.spawned, "enemies spawned");
        }
        report.wave_started = tick.wave_started;
        self.flush(report);
        report.phases.push(Phase::Spawn);
    }

    fn sweep(&mut self, report: &mut TickReport) {
        self.apply(Command::SweepCasualties, report);
        report.phases.push(Phase::Sweep);
        report.state = self.state;
    }

    fn main_tower_fallen(&self) -> bool {
        let Some(main) = query::main_tower(&self.world) else {
            return true;
        };
        query::tower_view(&self.world)
            .get(main)
            .map_or(true, |tower| tower.life.is_depleted())
    }

    fn flush(&mut self, report: &mut TickReport) {
        let commands = std::mem::take(&mut self.commands);
        for command in commands {
            self.apply(command, report);
        }
    }

    fn apply(&mut self, command: Command, report: &mut TickReport) {
        let start = report.events.len();
        world::apply(&mut self.world, command, &mut report.events);
        for event in &report.events[start..] {
            match event {
                Event::EnemyDied { reward, .. } => {
                    self.economy.credit(*reward);
                    report.rewards.push(*reward);
                }
                Event::TowerDestroyed { tower, kind, main } => {
                    if *main {
                        warn!(tower = tower.get(), "main structure destroyed");
                        self.state = GameState::GameOver;
                    } else {
                        info!(tower = tower.get(), ?kind, "tower destroyed");
                    }
                }
                _ => {}
            }
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> GameState {
        self.state
    }

    /// Simulation time accumulated by running ticks.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Current wave number, starting at one.
    #[must_use]
    pub fn wave(&self) -> u32 {
        self.waves.state().wave
    }

    /// Score and gold balances.
    #[must_use]
    pub const fn economy(&self) -> &Economy {
        &self.economy
    }

    /// Mutable balances, used by hosts to pay for placements and upgrades.
    pub fn economy_mut(&mut self) -> &mut Economy {
        &mut self.economy
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Configuration the simulation was built from.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Describes the current frame for renderers.
    #[must_use]
    pub fn presentation(&self) -> Presentation {
        query::presentation(&self.world)
    }

    /// Reports whether the player asked to quit.
    #[must_use]
    pub const fn should_quit(&self) -> bool {
        self.quit_requested
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
