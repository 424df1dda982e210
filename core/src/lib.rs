#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Werian Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems capture immutable views
//! ([`EnemyView`], [`TowerView`], [`ProjectileView`], [`GridView`]) at the
//! start of their phase, then respond with [`Command`] batches. The world
//! applies those commands to its live collections and broadcasts [`Event`]
//! values describing what changed. No system ever mutates the collection it
//! is iterating.

use std::{sync::Arc, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Werian.";

/// Distance travelled by an arrow on every tick, in world units.
pub const ARROW_SPEED: f32 = 10.0;

/// Share of the archer's damage carried by each arrow.
pub const ARROW_DAMAGE_FACTOR: f32 = 0.5;

/// Radius around an enemy inside which a projectile counts as a hit.
pub const PROJECTILE_CONTACT_RADIUS: f32 = 20.0;

/// Window after an attack during which a tower presents as attacking.
pub const TOWER_ATTACK_DISPLAY: Duration = Duration::from_millis(300);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the world clock to the provided simulation time.
    AdvanceClock {
        /// Simulation time elapsed since the run started.
        now: Duration,
    },
    /// Requests placement of a tower whose footprint starts at `origin`.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Upper-left cell of the footprint.
        origin: CellCoord,
    },
    /// Requests an upgrade of an existing tower.
    UpgradeTower {
        /// Tower receiving the upgrade.
        tower: TowerId,
    },
    /// Requests that a new enemy enter the grid at the centre of `cell`.
    SpawnEnemy {
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Cell the enemy appears in.
        cell: CellCoord,
    },
    /// Replaces an enemy's target and route wholesale.
    AssignRoute {
        /// Enemy receiving the route.
        enemy: EnemyId,
        /// Structure the route leads to, if any.
        target: Option<TowerId>,
        /// Cells to step into, excluding the enemy's current cell.
        cells: Vec<CellCoord>,
    },
    /// Moves an enemy along its current route.
    AdvanceEnemy {
        /// Enemy that moved.
        enemy: EnemyId,
        /// Position after the move.
        position: Vec2,
        /// Route cursor after the move.
        route_cursor: usize,
        /// Facing derived from the horizontal component of the move.
        facing: Facing,
    },
    /// Applies an enemy's contact damage to the structure it stands against.
    StrikeTower {
        /// Enemy dealing the blow.
        enemy: EnemyId,
        /// Structure receiving the damage.
        tower: TowerId,
        /// Damage dealt.
        damage: f32,
    },
    /// Applies a tower's direct damage to an enemy and starts its cooldown.
    StrikeEnemy {
        /// Tower dealing the blow.
        tower: TowerId,
        /// Enemy receiving the damage.
        enemy: EnemyId,
        /// Damage dealt.
        damage: f32,
    },
    /// Creates a projectile from a tower and starts the tower's cooldown.
    LaunchProjectile {
        /// Tower that fired.
        tower: TowerId,
        /// Enemy the projectile was aimed at.
        target: EnemyId,
        /// Launch position.
        origin: Vec2,
        /// Displacement applied on every tick.
        velocity: Vec2,
        /// Damage applied on contact.
        damage: f32,
    },
    /// Moves a projectile to a new position.
    MoveProjectile {
        /// Projectile being moved.
        projectile: ProjectileId,
        /// Position after the move.
        position: Vec2,
    },
    /// Resolves a projectile's contact with an enemy.
    ProjectileContact {
        /// Projectile that made contact.
        projectile: ProjectileId,
        /// Enemy that was struck.
        enemy: EnemyId,
    },
    /// Removes a projectile without effect.
    ExpireProjectile {
        /// Projectile leaving the playfield.
        projectile: ProjectileId,
    },
    /// Removes every enemy and structure whose life is depleted.
    SweepCasualties,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Simulation time after the advance.
        now: Duration,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Cells occupied by the tower.
        footprint: CellRect,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested for placement.
        kind: TowerKind,
        /// Origin cell provided in the placement request.
        origin: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower was upgraded.
    TowerUpgraded {
        /// Tower that was upgraded.
        tower: TowerId,
        /// Upgrade level reached.
        level: u32,
    },
    /// Reports that an upgrade request was rejected.
    TowerUpgradeRejected {
        /// Tower named in the request.
        tower: TowerId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Confirms that an enemy entered the grid.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Cell the enemy appeared in.
        cell: CellCoord,
    },
    /// Confirms that an enemy received a new route.
    RouteAssigned {
        /// Enemy that received the route.
        enemy: EnemyId,
        /// Structure the route leads to.
        target: Option<TowerId>,
        /// Number of waypoints in the route.
        waypoints: usize,
    },
    /// Reports contact damage dealt to a structure.
    TowerStruck {
        /// Enemy dealing the blow.
        enemy: EnemyId,
        /// Structure receiving the damage.
        tower: TowerId,
        /// Damage dealt.
        damage: f32,
    },
    /// Reports damage dealt to an enemy, either directly or by projectile.
    EnemyStruck {
        /// Tower responsible for the damage.
        tower: TowerId,
        /// Enemy receiving the damage.
        enemy: EnemyId,
        /// Damage dealt.
        damage: f32,
    },
    /// Confirms that a projectile entered the playfield.
    ProjectileLaunched {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired it.
        tower: TowerId,
        /// Enemy it was aimed at.
        target: EnemyId,
    },
    /// Confirms that a projectile left the playfield without effect.
    ProjectileExpired {
        /// Projectile that was removed.
        projectile: ProjectileId,
    },
    /// Reports that an enemy died and was removed.
    EnemyDied {
        /// Enemy that died.
        enemy: EnemyId,
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Reward owed to the economy.
        reward: Reward,
    },
    /// Reports that a structure was destroyed and removed.
    TowerDestroyed {
        /// Structure that was destroyed.
        tower: TowerId,
        /// Type of the structure.
        kind: TowerKind,
        /// Whether the structure was the designated main structure.
        main: bool,
    },
}

/// Score and gold owed for one enemy death.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Reward {
    /// Score awarded.
    pub points: u32,
    /// Gold awarded.
    pub gold: u32,
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Centre of the cell in world units.
    #[must_use]
    pub fn center(self, cell_size: f32) -> Vec2 {
        Vec2::new(
            (self.column as f32 + 0.5) * cell_size,
            (self.row as f32 + 0.5) * cell_size,
        )
    }

    /// Cell containing the provided world position.
    ///
    /// Returns `None` for negative coordinates or a non-positive cell size.
    #[must_use]
    pub fn containing(position: Vec2, cell_size: f32) -> Option<Self> {
        if cell_size <= 0.0 || position.x < 0.0 || position.y < 0.0 {
            return None;
        }
        let column = (position.x / cell_size).floor();
        let row = (position.y / cell_size).floor();
        if column > u32::MAX as f32 || row > u32::MAX as f32 {
            return None;
        }
        Some(Self::new(column as u32, row as u32))
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Reports whether the rectangle covers the provided cell.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        let column = u64::from(cell.column());
        let row = u64::from(cell.row());
        let left = u64::from(self.origin.column());
        let top = u64::from(self.origin.row());
        column >= left
            && row >= top
            && column < left + u64::from(self.size.width())
            && row < top + u64::from(self.size.height())
    }

    /// Iterates the covered cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let origin = self.origin;
        let width = self.size.width();
        let height = self.size.height();
        (0..height).flat_map(move |dy| {
            (0..width).map(move |dx| {
                CellCoord::new(
                    origin.column().saturating_add(dx),
                    origin.row().saturating_add(dy),
                )
            })
        })
    }

    /// Centre of the rectangle in world units.
    #[must_use]
    pub fn center(&self, cell_size: f32) -> Vec2 {
        Vec2::new(
            (self.origin.column() as f32 + self.size.width() as f32 / 2.0) * cell_size,
            (self.origin.row() as f32 + self.size.height() as f32 / 2.0) * cell_size,
        )
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Static classification of a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Terrain {
    /// Walkable lane that never accepts structures.
    Path,
    /// Ground that accepts structures.
    Buildable,
}

impl Terrain {
    /// Parses the single-character glyph used by level layouts.
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' => Some(Self::Path),
            '#' => Some(Self::Buildable),
            _ => None,
        }
    }
}

/// Rule deciding which cells enemies may walk through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassabilityPolicy {
    /// Path cells and unoccupied buildable cells are walkable.
    #[default]
    BuildableWalkable,
    /// Only path cells are walkable.
    PathOnly,
}

/// Read-only view of terrain, structure occupancy and the passability rule.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    terrain: &'a [Terrain],
    occupancy: &'a [Option<TowerId>],
    columns: u32,
    rows: u32,
    policy: PassabilityPolicy,
}

impl<'a> GridView<'a> {
    /// Captures a new grid view backed by the provided row-major slices.
    #[must_use]
    pub fn new(
        terrain: &'a [Terrain],
        occupancy: &'a [Option<TowerId>],
        columns: u32,
        rows: u32,
        policy: PassabilityPolicy,
    ) -> Self {
        Self {
            terrain,
            occupancy,
            columns,
            rows,
            policy,
        }
    }

    /// Provides the dimensions of the grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Reports whether the cell lies within the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Terrain classification of the cell, if it lies within the grid.
    #[must_use]
    pub fn terrain(&self, cell: CellCoord) -> Option<Terrain> {
        self.index(cell)
            .and_then(|index| self.terrain.get(index).copied())
    }

    /// Structure occupying the cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<TowerId> {
        self.index(cell)
            .and_then(|index| self.occupancy.get(index).copied().flatten())
    }

    /// Reports whether an enemy heading for `target` may enter the cell.
    ///
    /// A structure's own footprint is walkable for the enemies assigned to
    /// it, so routes lead up to the structure under attack while every
    /// other structure remains an obstacle.
    #[must_use]
    pub fn is_passable(&self, cell: CellCoord, target: Option<TowerId>) -> bool {
        let Some(terrain) = self.terrain(cell) else {
            return false;
        };
        let occupant = self.occupant(cell);
        if occupant.is_some() && occupant == target {
            return true;
        }
        match (terrain, self.policy) {
            (Terrain::Path, _) => occupant.is_none(),
            (Terrain::Buildable, PassabilityPolicy::BuildableWalkable) => occupant.is_none(),
            (Terrain::Buildable, PassabilityPolicy::PathOnly) => false,
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }
}

/// Current and maximum life of an agent.
///
/// Damage is applied without a floor, so life may turn negative until the
/// death sweep removes the agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Life {
    current: f32,
    maximum: f32,
}

impl Life {
    /// Creates a full life pool.
    #[must_use]
    pub const fn full(maximum: f32) -> Self {
        Self {
            current: maximum,
            maximum,
        }
    }

    /// Remaining life.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Maximum life.
    #[must_use]
    pub const fn maximum(&self) -> f32 {
        self.maximum
    }

    /// Remaining life as a fraction of the maximum, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.maximum <= 0.0 {
            return 0.0;
        }
        (self.current / self.maximum).clamp(0.0, 1.0)
    }

    /// Reports whether the agent is dead.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }

    /// Subtracts damage from the current life.
    pub fn damage(&mut self, amount: f32) {
        self.current -= amount;
    }

    /// Raises both maximum and current life by the same amount.
    pub fn reinforce(&mut self, amount: f32) {
        self.maximum += amount;
        self.current += amount;
    }
}

/// Enemy archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Common foot soldier.
    Orc,
    /// Faster, slightly sturdier common enemy.
    Head,
    /// Heavy enemy that arrives at every wave boundary.
    Stone,
    /// Boss mixed into waves late in a run.
    Skeleton,
}

impl EnemyKind {
    /// Life the archetype spawns with.
    #[must_use]
    pub const fn max_life(self) -> f32 {
        match self {
            Self::Orc => 100.0,
            Self::Head => 125.0,
            Self::Stone => 1_000.0,
            Self::Skeleton => 3_000.0,
        }
    }

    /// Distance covered per tick, in world units.
    #[must_use]
    pub const fn speed(self) -> f32 {
        match self {
            Self::Orc => 2.0,
            Self::Head => 3.0,
            Self::Stone => 1.0,
            Self::Skeleton => 3.0,
        }
    }

    /// Damage dealt to the target structure on every tick of contact.
    #[must_use]
    pub const fn contact_damage(self) -> f32 {
        match self {
            Self::Orc => 0.5,
            Self::Head => 1.0,
            Self::Stone => 2.0,
            Self::Skeleton => 1.0,
        }
    }

    /// Score and gold owed when the enemy dies.
    #[must_use]
    pub const fn reward(self) -> Reward {
        let value = match self {
            Self::Orc => 10,
            Self::Head => 20,
            Self::Stone => 100,
            Self::Skeleton => 300,
        };
        Reward {
            points: value,
            gold: value,
        }
    }

    /// Number of frames in the archetype's run cycle.
    #[must_use]
    pub const fn animation_frames(self) -> u32 {
        match self {
            Self::Orc | Self::Skeleton => 20,
            Self::Head | Self::Stone => 10,
        }
    }
}

/// How a tower delivers damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttackStyle {
    /// Damage lands on the target the moment the tower attacks.
    Direct,
    /// The tower launches a projectile that deals damage on contact.
    Projectile,
}

/// Types of towers that can exist in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// The keep the player defends; its fall ends the run.
    Main,
    /// Fires arrows at the first enemy in range.
    Archer,
    /// Burns the first enemy in range directly.
    Fire,
}

impl TowerKind {
    /// Life the tower is built with.
    #[must_use]
    pub const fn max_life(self) -> f32 {
        match self {
            Self::Main => 1_000.0,
            Self::Archer | Self::Fire => 100.0,
        }
    }

    /// Gold required to build or upgrade the tower.
    #[must_use]
    pub const fn price(self) -> u32 {
        match self {
            Self::Main => 1_000,
            Self::Archer | Self::Fire => 50,
        }
    }

    /// Attack radius in world units, measured from the footprint centre.
    #[must_use]
    pub const fn range(self) -> f32 {
        match self {
            Self::Main => 300.0,
            Self::Archer => 250.0,
            Self::Fire => 200.0,
        }
    }

    /// Damage per attack before upgrades.
    #[must_use]
    pub const fn damage(self) -> f32 {
        match self {
            Self::Main => 100.0,
            Self::Archer => 25.0,
            Self::Fire => 20.0,
        }
    }

    /// Minimum simulation time between two attacks.
    #[must_use]
    pub const fn cooldown(self) -> Duration {
        match self {
            Self::Main | Self::Archer | Self::Fire => Duration::from_millis(1_000),
        }
    }

    /// Cells covered by the tower.
    #[must_use]
    pub const fn footprint(self) -> CellRectSize {
        match self {
            Self::Main => CellRectSize::new(5, 5),
            Self::Archer | Self::Fire => CellRectSize::new(2, 2),
        }
    }

    /// Delivery mechanism of the tower's damage.
    #[must_use]
    pub const fn attack_style(self) -> AttackStyle {
        match self {
            Self::Archer => AttackStyle::Projectile,
            Self::Main | Self::Fire => AttackStyle::Direct,
        }
    }

    /// Life added to both maximum and current life by one upgrade.
    #[must_use]
    pub const fn upgrade_life(self) -> f32 {
        match self {
            Self::Main => 1_000.0,
            Self::Archer | Self::Fire => 100.0,
        }
    }

    /// Damage added by one upgrade.
    #[must_use]
    pub const fn upgrade_damage(self) -> f32 {
        match self {
            Self::Main => 1.0,
            Self::Archer => 25.0,
            Self::Fire => 1.0,
        }
    }

    /// Whether players may request this tower through placement.
    #[must_use]
    pub const fn placeable(self) -> bool {
        !matches!(self, Self::Main)
    }
}

/// Ordered cells and matching waypoints an enemy follows toward its target.
///
/// Routes are shared immutably and replaced wholesale; they are never
/// edited in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Route {
    cells: Arc<[CellCoord]>,
    waypoints: Arc<[Vec2]>,
}

impl Route {
    /// Builds a route whose waypoints sit at the centre of each cell.
    #[must_use]
    pub fn through(cells: Vec<CellCoord>, cell_size: f32) -> Self {
        let waypoints: Vec<Vec2> = cells.iter().map(|cell| cell.center(cell_size)).collect();
        Self {
            cells: cells.into(),
            waypoints: waypoints.into(),
        }
    }

    /// Number of waypoints in the route.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Reports whether the route has no waypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Waypoint at the provided index.
    #[must_use]
    pub fn waypoint(&self, index: usize) -> Option<Vec2> {
        self.waypoints.get(index).copied()
    }

    /// Cells the route passes through.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }
}

/// Horizontal orientation of a sprite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    /// Facing toward decreasing x.
    Left,
    /// Facing toward increasing x.
    #[default]
    Right,
}

/// Discrete animation state consumed by renderers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AnimationState {
    /// Standing still.
    #[default]
    Idle,
    /// Walking along a route.
    Moving,
    /// Striking a structure or an enemy.
    Attacking,
}

/// Immutable representation of a single enemy used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Archetype of the enemy.
    pub kind: EnemyKind,
    /// Continuous position in world units.
    pub position: Vec2,
    /// Current and maximum life.
    pub life: Life,
    /// Structure the enemy is heading for; may dangle after it is destroyed.
    pub target: Option<TowerId>,
    /// Route toward the target.
    pub route: Route,
    /// Index of the next waypoint to reach.
    pub route_cursor: usize,
    /// Horizontal orientation.
    pub facing: Facing,
    /// Animation state for the current tick.
    pub state: AnimationState,
    /// Frame index within the archetype's run cycle.
    pub animation_phase: u32,
}

/// Read-only snapshot describing all enemies in registration order.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single enemy.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of captured enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Region of cells occupied by the tower.
    pub footprint: CellRect,
    /// Centre of the footprint in world units.
    pub anchor: Vec2,
    /// Current and maximum life.
    pub life: Life,
    /// Damage per attack including upgrades.
    pub damage: f32,
    /// Upgrade level, starting at zero.
    pub level: u32,
    /// Simulation time of the last attack, if the tower ever attacked.
    pub last_attack: Option<Duration>,
    /// Whether this is the designated main structure.
    pub main: bool,
}

impl TowerSnapshot {
    /// Reports whether the tower's cooldown has elapsed at `now`.
    #[must_use]
    pub fn ready_at(&self, now: Duration) -> bool {
        self.last_attack
            .map_or(true, |last| now.saturating_sub(last) >= self.kind.cooldown())
    }
}

/// Read-only snapshot describing all towers in registration order.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single tower.
    #[must_use]
    pub fn get(&self, id: TowerId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Nearest tower to `position` by anchor distance.
    ///
    /// Ties resolve to the tower registered first.
    #[must_use]
    pub fn nearest_to(&self, position: Vec2) -> Option<(&TowerSnapshot, f32)> {
        let mut best: Option<(&TowerSnapshot, f32)> = None;
        for snapshot in &self.snapshots {
            let distance = snapshot.anchor.distance(position);
            match best {
                Some((_, closest)) if distance >= closest => {}
                _ => best = Some((snapshot, distance)),
            }
        }
        best
    }

    /// Number of captured towers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated by the world.
    pub id: ProjectileId,
    /// Tower that fired the projectile.
    pub tower: TowerId,
    /// Enemy the projectile was aimed at.
    pub target: EnemyId,
    /// Current position in world units.
    pub position: Vec2,
    /// Displacement applied on every tick.
    pub velocity: Vec2,
    /// Damage applied on contact.
    pub damage: f32,
}

/// Read-only snapshot describing all projectiles in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectiles in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Target chosen by a tower for the current tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that selected the target.
    pub tower: TowerId,
    /// Enemy that was selected.
    pub enemy: EnemyId,
    /// Anchor of the tower in world units.
    pub tower_anchor: Vec2,
    /// Position of the enemy when it was selected.
    pub enemy_position: Vec2,
}

/// Per-frame description of an enemy for renderers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyPresentation {
    /// Enemy being described.
    pub id: EnemyId,
    /// Archetype, selecting the sprite set.
    pub kind: EnemyKind,
    /// Position in world units.
    pub position: Vec2,
    /// Animation state.
    pub state: AnimationState,
    /// Horizontal orientation.
    pub facing: Facing,
    /// Frame within the run cycle.
    pub animation_phase: u32,
    /// Remaining life fraction.
    pub life_fraction: f32,
}

/// Per-frame description of a tower for renderers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerPresentation {
    /// Tower being described.
    pub id: TowerId,
    /// Kind, selecting the sprite set.
    pub kind: TowerKind,
    /// Footprint centre in world units.
    pub anchor: Vec2,
    /// Upgrade level, selecting the visual variant.
    pub level: u32,
    /// Whether the tower attacked recently.
    pub attacking: bool,
    /// Remaining life fraction.
    pub life_fraction: f32,
}

/// Everything a renderer consumes for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Presentation {
    /// Enemies in registration order.
    pub enemies: Vec<EnemyPresentation>,
    /// Towers in registration order.
    pub towers: Vec<TowerPresentation>,
    /// Positions of projectiles in flight.
    pub projectiles: Vec<Vec2>,
}

/// Reasons a tower placement request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The requested footprint extends beyond the grid.
    #[error("footprint extends beyond the grid")]
    OutOfBounds,
    /// The requested footprint covers a cell that does not accept structures.
    #[error("footprint covers terrain that does not accept structures")]
    NotBuildable,
    /// The requested footprint overlaps another structure.
    #[error("footprint overlaps another structure")]
    Occupied,
    /// The requested kind cannot be placed by players.
    #[error("this structure cannot be placed")]
    ReservedKind,
}

/// Reasons a tower upgrade request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum UpgradeError {
    /// No tower with the provided identifier exists.
    #[error("no such tower")]
    MissingTower,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn containing_cell_floors_world_position() {
        assert_eq!(
            CellCoord::containing(Vec2::new(85.0, 39.9), 40.0),
            Some(CellCoord::new(2, 0))
        );
        assert_eq!(CellCoord::containing(Vec2::new(-1.0, 5.0), 40.0), None);
        assert_eq!(
            CellCoord::containing(CellCoord::new(7, 3).center(40.0), 40.0),
            Some(CellCoord::new(7, 3))
        );
    }

    #[test]
    fn rect_cells_cover_footprint_in_row_major_order() {
        let rect = CellRect::from_origin_and_size(CellCoord::new(3, 4), CellRectSize::new(2, 2));
        let cells: Vec<_> = rect.cells().collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(3, 4),
                CellCoord::new(4, 4),
                CellCoord::new(3, 5),
                CellCoord::new(4, 5),
            ]
        );
        assert!(rect.contains(CellCoord::new(4, 5)));
        assert!(!rect.contains(CellCoord::new(5, 5)));
        assert_eq!(rect.center(10.0), Vec2::new(40.0, 50.0));
    }

    #[test]
    fn passability_lets_enemies_into_their_own_target_only() {
        let terrain = vec![Terrain::Path, Terrain::Buildable, Terrain::Buildable];
        let occupancy = vec![None, Some(TowerId::new(1)), None];
        let grid = GridView::new(
            &terrain,
            &occupancy,
            3,
            1,
            PassabilityPolicy::BuildableWalkable,
        );

        assert!(grid.is_passable(CellCoord::new(0, 0), None));
        assert!(!grid.is_passable(CellCoord::new(1, 0), None));
        assert!(!grid.is_passable(CellCoord::new(1, 0), Some(TowerId::new(2))));
        assert!(grid.is_passable(CellCoord::new(1, 0), Some(TowerId::new(1))));
        assert!(grid.is_passable(CellCoord::new(2, 0), None));
        assert!(!grid.is_passable(CellCoord::new(3, 0), None));
    }

    #[test]
    fn path_only_policy_blocks_open_buildable_ground() {
        let terrain = vec![Terrain::Path, Terrain::Buildable, Terrain::Buildable];
        let occupancy = vec![None, Some(TowerId::new(1)), None];
        let grid = GridView::new(&terrain, &occupancy, 3, 1, PassabilityPolicy::PathOnly);

        assert!(grid.is_passable(CellCoord::new(0, 0), None));
        assert!(grid.is_passable(CellCoord::new(1, 0), Some(TowerId::new(1))));
        assert!(!grid.is_passable(CellCoord::new(2, 0), None));
    }

    #[test]
    fn life_allows_negative_values_and_clamps_fraction() {
        let mut life = Life::full(100.0);
        life.damage(60.0);
        assert!(!life.is_depleted());
        life.damage(60.0);
        assert_eq!(life.current(), -20.0);
        assert!(life.is_depleted());
        assert_eq!(life.fraction(), 0.0);
    }

    #[test]
    fn nearest_tower_prefers_first_registered_on_ties() {
        let view = TowerView::from_snapshots(vec![
            tower_at(2, Vec2::new(10.0, 0.0)),
            tower_at(1, Vec2::new(-10.0, 0.0)),
        ]);

        let (nearest, distance) = view.nearest_to(Vec2::ZERO).expect("towers exist");
        assert_eq!(nearest.id, TowerId::new(1));
        assert_eq!(distance, 10.0);
    }

    #[test]
    fn tower_readiness_respects_cooldown() {
        let mut tower = tower_at(1, Vec2::ZERO);
        assert!(tower.ready_at(Duration::ZERO));
        tower.last_attack = Some(Duration::from_millis(500));
        assert!(!tower.ready_at(Duration::from_millis(1_499)));
        assert!(tower.ready_at(Duration::from_millis(1_500)));
    }

    #[test]
    fn placement_error_round_trips_through_toml() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Wrapper {
            reason: PlacementError,
            kind: TowerKind,
        }

        let value = Wrapper {
            reason: PlacementError::Occupied,
            kind: TowerKind::Archer,
        };
        let text = toml::to_string(&value).expect("serialize");
        let restored: Wrapper = toml::from_str(&text).expect("deserialize");
        assert_eq!(restored, value);
    }

    fn tower_at(id: u32, anchor: Vec2) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            kind: TowerKind::Archer,
            footprint: CellRect::from_origin_and_size(
                CellCoord::new(0, 0),
                CellRectSize::new(2, 2),
            ),
            anchor,
            life: Life::full(100.0),
            damage: 25.0,
            level: 0,
            last_attack: None,
            main: false,
        }
    }
}
