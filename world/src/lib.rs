#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Werian Defence.

mod grid;
mod registry;

use std::time::Duration;

use glam::Vec2;
use werian_defence_core::{
    AnimationState, CellCoord, CellRect, Command, Event, PlacementError, Route, TowerKind,
    UpgradeError, WELCOME_BANNER,
};

pub use grid::{Grid, GridError};
pub use registry::{AgentRegistry, TowerRemoval};

use registry::TowerState;

/// Represents the authoritative Werian Defence world state.
#[derive(Clone, Debug)]
pub struct World {
    banner: &'static str,
    grid: Grid,
    registry: AgentRegistry,
    cell_size: f32,
    now: Duration,
}

impl World {
    /// Creates a world over the provided grid with no agents.
    #[must_use]
    pub fn new(grid: Grid, cell_size: f32) -> Self {
        Self {
            banner: WELCOME_BANNER,
            grid,
            registry: AgentRegistry::new(),
            cell_size,
            now: Duration::ZERO,
        }
    }

    fn place_tower(&mut self, kind: TowerKind, origin: CellCoord, out_events: &mut Vec<Event>) {
        let footprint = CellRect::from_origin_and_size(origin, kind.footprint());
        let main = kind == TowerKind::Main;
        if main && self.registry.main_tower().is_some() {
            out_events.push(Event::TowerPlacementRejected {
                kind,
                origin,
                reason: PlacementError::ReservedKind,
            });
            return;
        }

        if let Err(reason) = self.grid.check_placement(footprint) {
            out_events.push(Event::TowerPlacementRejected {
                kind,
                origin,
                reason,
            });
            return;
        }

        let id = self.registry.allocate_tower_id();
        if let Err(reason) = self.grid.place_structure(id, footprint) {
            out_events.push(Event::TowerPlacementRejected {
                kind,
                origin,
                reason,
            });
            return;
        }

        let anchor = footprint.center(self.cell_size);
        self.registry
            .insert_tower(TowerState::new(id, kind, footprint, anchor), main);
        out_events.push(Event::TowerPlaced {
            tower: id,
            kind,
            footprint,
        });
    }

    fn sweep_casualties(&mut self, out_events: &mut Vec<Event>) {
        for id in self.registry.depleted_enemies() {
            if let Some(enemy) = self.registry.remove_enemy(id) {
                out_events.push(Event::EnemyDied {
                    enemy: id,
                    kind: enemy.kind,
                    reward: enemy.kind.reward(),
                });
            }
        }

        for id in self.registry.depleted_towers() {
            if let Some(removal) = self.registry.remove_tower(id) {
                let _ = self.grid.remove_structure(id);
                out_events.push(Event::TowerDestroyed {
                    tower: id,
                    kind: removal.snapshot.kind,
                    main: removal.main,
                });
            }
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::AdvanceClock { now } => {
            world.now = now;
            for enemy in world.registry.enemies_mut() {
                enemy.advance_animation();
            }
            out_events.push(Event::TimeAdvanced { now });
        }
        Command::PlaceTower { kind, origin } => world.place_tower(kind, origin, out_events),
        Command::UpgradeTower { tower } => match world.registry.tower_mut(tower) {
            Some(state) => {
                let level = state.upgrade();
                out_events.push(Event::TowerUpgraded { tower, level });
            }
            None => out_events.push(Event::TowerUpgradeRejected {
                tower,
                reason: UpgradeError::MissingTower,
            }),
        },
        Command::SpawnEnemy { kind, cell } => {
            if !world.grid.view().contains(cell) {
                return;
            }
            let enemy = world
                .registry
                .insert_enemy(kind, cell.center(world.cell_size));
            out_events.push(Event::EnemySpawned { enemy, kind, cell });
        }
        Command::AssignRoute {
            enemy,
            target,
            cells,
        } => {
            let cell_size = world.cell_size;
            if let Some(state) = world.registry.enemy_mut(enemy) {
                state.route = Route::through(cells, cell_size);
                state.route_cursor = 0;
                state.target = target;
                out_events.push(Event::RouteAssigned {
                    enemy,
                    target,
                    waypoints: state.route.len(),
                });
            }
        }
        Command::AdvanceEnemy {
            enemy,
            position,
            route_cursor,
            facing,
        } => {
            if let Some(state) = world.registry.enemy_mut(enemy) {
                if route_cursor < state.route_cursor || route_cursor > state.route.len() {
                    return;
                }
                state.position = position;
                state.route_cursor = route_cursor;
                state.facing = facing;
                state.state = AnimationState::Moving;
            }
        }
        Command::StrikeTower {
            enemy,
            tower,
            damage,
        } => {
            let Some(target) = world.registry.tower_mut(tower) else {
                return;
            };
            target.life.damage(damage);
            if let Some(attacker) = world.registry.enemy_mut(enemy) {
                attacker.state = AnimationState::Attacking;
            }
            out_events.push(Event::TowerStruck {
                enemy,
                tower,
                damage,
            });
        }
        Command::StrikeEnemy {
            tower,
            enemy,
            damage,
        } => {
            let now = world.now;
            if let Some(attacker) = world.registry.tower_mut(tower) {
                attacker.last_attack = Some(now);
            }
            if let Some(target) = world.registry.enemy_mut(enemy) {
                target.life.damage(damage);
                out_events.push(Event::EnemyStruck {
                    tower,
                    enemy,
                    damage,
                });
            }
        }
        Command::LaunchProjectile {
            tower,
            target,
            origin,
            velocity,
            damage,
        } => {
            let now = world.now;
            if let Some(attacker) = world.registry.tower_mut(tower) {
                attacker.last_attack = Some(now);
            }
            let projectile = world
                .registry
                .insert_projectile(tower, target, origin, velocity, damage);
            out_events.push(Event::ProjectileLaunched {
                projectile,
                tower,
                target,
            });
        }
        Command::MoveProjectile {
            projectile,
            position,
        } => {
            if let Some(state) = world.registry.projectile_mut(projectile) {
                state.position = position;
            }
        }
        Command::ProjectileContact { projectile, enemy } => {
            let Some(state) = world.registry.remove_projectile(projectile) else {
                return;
            };
            if let Some(target) = world.registry.enemy_mut(enemy) {
                target.life.damage(state.damage);
                out_events.push(Event::EnemyStruck {
                    tower: state.tower,
                    enemy,
                    damage: state.damage,
                });
            }
        }
        Command::ExpireProjectile { projectile } => {
            if world.registry.remove_projectile(projectile).is_some() {
                out_events.push(Event::ProjectileExpired { projectile });
            }
        }
        Command::SweepCasualties => world.sweep_casualties(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use glam::Vec2;
    use werian_defence_core::{
        CellCoord, EnemyPresentation, EnemyView, GridView, Presentation, ProjectileView, TowerId,
        TowerPresentation, TowerView, TOWER_ATTACK_DISPLAY,
    };

    use super::{AgentRegistry, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Exposes a read-only view of terrain and structure occupancy.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView<'_> {
        world.grid.view()
    }

    /// Provides read-only access to the agent registry.
    #[must_use]
    pub fn registry(world: &World) -> &AgentRegistry {
        &world.registry
    }

    /// Captures a read-only view of every enemy.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        world.registry.snapshot_enemies()
    }

    /// Captures a read-only view of every structure.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        world.registry.snapshot_structures()
    }

    /// Captures a read-only view of every projectile in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        world.registry.snapshot_projectiles()
    }

    /// Side length of a grid cell in world units.
    #[must_use]
    pub fn cell_size(world: &World) -> f32 {
        world.cell_size
    }

    /// Extent of the visible playfield in world units.
    #[must_use]
    pub fn playfield(world: &World) -> Vec2 {
        let (columns, rows) = world.grid.dimensions();
        Vec2::new(columns as f32, rows as f32) * world.cell_size
    }

    /// Simulation time of the most recent clock advance.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.now
    }

    /// Identifier of the designated main structure while it stands.
    #[must_use]
    pub fn main_tower(world: &World) -> Option<TowerId> {
        world.registry.main_tower()
    }

    /// Structure occupying the provided cell, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: CellCoord) -> Option<TowerId> {
        world.grid.view().occupant(cell)
    }

    /// Describes the current frame for renderers.
    #[must_use]
    pub fn presentation(world: &World) -> Presentation {
        let enemies = world
            .registry
            .snapshot_enemies()
            .iter()
            .map(|enemy| EnemyPresentation {
                id: enemy.id,
                kind: enemy.kind,
                position: enemy.position,
                state: enemy.state,
                facing: enemy.facing,
                animation_phase: enemy.animation_phase,
                life_fraction: enemy.life.fraction(),
            })
            .collect();
        let towers = world
            .registry
            .snapshot_structures()
            .iter()
            .map(|tower| TowerPresentation {
                id: tower.id,
                kind: tower.kind,
                anchor: tower.anchor,
                level: tower.level,
                attacking: tower
                    .last_attack
                    .is_some_and(|last| world.now.saturating_sub(last) < TOWER_ATTACK_DISPLAY),
                life_fraction: tower.life.fraction(),
            })
            .collect();
        let projectiles = world
            .registry
            .snapshot_projectiles()
            .iter()
            .map(|projectile| projectile.position)
            .collect();

        Presentation {
            enemies,
            towers,
            projectiles,
        }
    }
}

/// Converts a continuous anchor into the origin of a footprint centred on it.
#[must_use]
pub fn footprint_origin(anchor: Vec2, kind: TowerKind, cell_size: f32) -> Option<CellCoord> {
    let cell = CellCoord::containing(anchor, cell_size)?;
    let size = kind.footprint();
    let column = cell.column().checked_sub(size.width() / 2)?;
    let row = cell.row().checked_sub(size.height() / 2)?;
    Some(CellCoord::new(column, row))
}
