//! Authoritative agent collections and identifier allocation.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use werian_defence_core::{
    AnimationState, CellRect, EnemyId, EnemyKind, EnemySnapshot, EnemyView, Facing, Life,
    ProjectileId, ProjectileSnapshot, ProjectileView, Route, TowerId, TowerKind, TowerSnapshot,
    TowerView,
};

/// Live state of an enemy stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct EnemyState {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) position: Vec2,
    pub(crate) life: Life,
    pub(crate) target: Option<TowerId>,
    pub(crate) route: Route,
    pub(crate) route_cursor: usize,
    pub(crate) facing: Facing,
    pub(crate) state: AnimationState,
    pub(crate) animation_phase: u32,
}

impl EnemyState {
    fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            life: self.life,
            target: self.target,
            route: self.route.clone(),
            route_cursor: self.route_cursor,
            facing: self.facing,
            state: self.state,
            animation_phase: self.animation_phase,
        }
    }

    /// Moves the run cycle one frame forward and clears the per-tick state.
    pub(crate) fn advance_animation(&mut self) {
        self.animation_phase = (self.animation_phase + 1) % self.kind.animation_frames().max(1);
        self.state = AnimationState::Idle;
    }
}

/// Live state of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    pub(crate) id: TowerId,
    pub(crate) kind: TowerKind,
    pub(crate) footprint: CellRect,
    pub(crate) anchor: Vec2,
    pub(crate) life: Life,
    pub(crate) damage: f32,
    pub(crate) level: u32,
    pub(crate) last_attack: Option<Duration>,
}

impl TowerState {
    pub(crate) fn new(id: TowerId, kind: TowerKind, footprint: CellRect, anchor: Vec2) -> Self {
        Self {
            id,
            kind,
            footprint,
            anchor,
            life: Life::full(kind.max_life()),
            damage: kind.damage(),
            level: 0,
            last_attack: None,
        }
    }

    /// Applies one upgrade step, returning the level reached.
    pub(crate) fn upgrade(&mut self) -> u32 {
        self.life.reinforce(self.kind.upgrade_life());
        self.damage += self.kind.upgrade_damage();
        self.level += 1;
        self.level
    }

    fn snapshot(&self, main: bool) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            footprint: self.footprint,
            anchor: self.anchor,
            life: self.life,
            damage: self.damage,
            level: self.level,
            last_attack: self.last_attack,
            main,
        }
    }
}

/// Live state of a projectile stored inside the world.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ProjectileState {
    pub(crate) id: ProjectileId,
    pub(crate) tower: TowerId,
    pub(crate) target: EnemyId,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) damage: f32,
}

impl ProjectileState {
    fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            tower: self.tower,
            target: self.target,
            position: self.position,
            velocity: self.velocity,
            damage: self.damage,
        }
    }
}

/// Structure removed from the registry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerRemoval {
    /// State of the structure at the moment of removal.
    pub snapshot: TowerSnapshot,
    /// Whether the removed structure was the designated main structure.
    pub main: bool,
}

/// Registry that owns every agent and manages identifier allocation.
///
/// Identifiers grow monotonically and are never reused, so ordering by
/// identifier is registration order.
#[derive(Clone, Debug)]
pub struct AgentRegistry {
    enemies: BTreeMap<EnemyId, EnemyState>,
    towers: BTreeMap<TowerId, TowerState>,
    projectiles: BTreeMap<ProjectileId, ProjectileState>,
    main_tower: Option<TowerId>,
    next_enemy_id: EnemyId,
    next_tower_id: TowerId,
    next_projectile_id: ProjectileId,
}

impl AgentRegistry {
    /// Creates an empty registry with reset identifier counters.
    pub(crate) fn new() -> Self {
        Self {
            enemies: BTreeMap::new(),
            towers: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            main_tower: None,
            next_enemy_id: EnemyId::new(0),
            next_tower_id: TowerId::new(0),
            next_projectile_id: ProjectileId::new(0),
        }
    }

    /// Captures every enemy in registration order.
    #[must_use]
    pub fn snapshot_enemies(&self) -> EnemyView {
        EnemyView::from_snapshots(self.enemies.values().map(EnemyState::snapshot).collect())
    }

    /// Captures every structure in registration order.
    #[must_use]
    pub fn snapshot_structures(&self) -> TowerView {
        TowerView::from_snapshots(
            self.towers
                .values()
                .map(|tower| tower.snapshot(self.main_tower == Some(tower.id)))
                .collect(),
        )
    }

    /// Captures every projectile in flight.
    #[must_use]
    pub fn snapshot_projectiles(&self) -> ProjectileView {
        ProjectileView::from_snapshots(
            self.projectiles
                .values()
                .map(ProjectileState::snapshot)
                .collect(),
        )
    }

    /// Reports whether the registry holds no enemies and no structures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty() && self.towers.is_empty()
    }

    /// Identifier of the designated main structure while it stands.
    #[must_use]
    pub fn main_tower(&self) -> Option<TowerId> {
        self.main_tower
    }

    pub(crate) fn insert_enemy(&mut self, kind: EnemyKind, position: Vec2) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().saturating_add(1));
        let _ = self.enemies.insert(
            id,
            EnemyState {
                id,
                kind,
                position,
                life: Life::full(kind.max_life()),
                target: None,
                route: Route::default(),
                route_cursor: 0,
                facing: Facing::default(),
                state: AnimationState::Idle,
                animation_phase: 0,
            },
        );
        id
    }

    pub(crate) fn remove_enemy(&mut self, id: EnemyId) -> Option<EnemySnapshot> {
        self.enemies.remove(&id).map(|enemy| enemy.snapshot())
    }

    pub(crate) fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut EnemyState> {
        self.enemies.get_mut(&id)
    }

    pub(crate) fn enemies_mut(&mut self) -> impl Iterator<Item = &mut EnemyState> {
        self.enemies.values_mut()
    }

    /// Reserves the next structure identifier ahead of grid placement.
    pub(crate) fn allocate_tower_id(&mut self) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        id
    }

    pub(crate) fn insert_tower(&mut self, tower: TowerState, main: bool) {
        if main {
            self.main_tower = Some(tower.id);
        }
        let _ = self.towers.insert(tower.id, tower);
    }

    pub(crate) fn remove_tower(&mut self, id: TowerId) -> Option<TowerRemoval> {
        let tower = self.towers.remove(&id)?;
        let main = self.main_tower == Some(id);
        if main {
            self.main_tower = None;
        }
        Some(TowerRemoval {
            snapshot: tower.snapshot(main),
            main,
        })
    }

    pub(crate) fn tower_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.towers.get_mut(&id)
    }

    pub(crate) fn insert_projectile(
        &mut self,
        tower: TowerId,
        target: EnemyId,
        position: Vec2,
        velocity: Vec2,
        damage: f32,
    ) -> ProjectileId {
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().saturating_add(1));
        let _ = self.projectiles.insert(
            id,
            ProjectileState {
                id,
                tower,
                target,
                position,
                velocity,
                damage,
            },
        );
        id
    }

    pub(crate) fn remove_projectile(&mut self, id: ProjectileId) -> Option<ProjectileState> {
        self.projectiles.remove(&id)
    }

    pub(crate) fn projectile_mut(&mut self, id: ProjectileId) -> Option<&mut ProjectileState> {
        self.projectiles.get_mut(&id)
    }

    /// Identifiers of dead enemies in registration order.
    pub(crate) fn depleted_enemies(&self) -> Vec<EnemyId> {
        self.enemies
            .values()
            .filter(|enemy| enemy.life.is_depleted())
            .map(|enemy| enemy.id)
            .collect()
    }

    /// Identifiers of destroyed structures in registration order.
    pub(crate) fn depleted_towers(&self) -> Vec<TowerId> {
        self.towers
            .values()
            .filter(|tower| tower.life.is_depleted())
            .map(|tower| tower.id)
            .collect()
    }
}
