#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure systems that turn targeting data into damage and fly projectiles.

use std::time::Duration;

use glam::Vec2;
use werian_defence_core::{
    AttackStyle, Command, EnemyView, ProjectileView, TowerTarget, TowerView, ARROW_DAMAGE_FACTOR,
    ARROW_SPEED, PROJECTILE_CONTACT_RADIUS,
};

/// Tower combat system that queues attack commands for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits one attack per targeting tower whose cooldown has elapsed at `now`.
    ///
    /// Direct towers strike immediately; projectile towers launch an arrow
    /// toward the target's current position.
    pub fn handle(
        &mut self,
        now: Duration,
        towers: &TowerView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        if tower_targets.is_empty() {
            return;
        }

        self.scratch.clear();

        for target in tower_targets {
            let Some(tower) = towers.get(target.tower) else {
                continue;
            };
            if !tower.ready_at(now) {
                continue;
            }

            match tower.kind.attack_style() {
                AttackStyle::Direct => self.scratch.push(Command::StrikeEnemy {
                    tower: tower.id,
                    enemy: target.enemy,
                    damage: tower.damage,
                }),
                AttackStyle::Projectile => {
                    // An enemy standing on the anchor gives no heading to fly along.
                    let Some(heading) =
                        (target.enemy_position - target.tower_anchor).try_normalize()
                    else {
                        continue;
                    };
                    self.scratch.push(Command::LaunchProjectile {
                        tower: tower.id,
                        target: target.enemy,
                        origin: target.tower_anchor,
                        velocity: heading * ARROW_SPEED,
                        damage: tower.damage * ARROW_DAMAGE_FACTOR,
                    });
                }
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

/// Moves projectiles, resolving contact and expiry.
#[derive(Debug, Default)]
pub struct ProjectileFlight;

impl ProjectileFlight {
    /// Emits one command per projectile in flight.
    ///
    /// A projectile leaving `0..=playfield` expires without effect; otherwise
    /// it hits the first living enemy, in registration order, within the
    /// contact radius of its new position.
    pub fn handle(
        &mut self,
        projectiles: &ProjectileView,
        enemies: &EnemyView,
        playfield: Vec2,
        out: &mut Vec<Command>,
    ) {
        for projectile in projectiles.iter() {
            let position = projectile.position + projectile.velocity;
            if position.x < 0.0
                || position.y < 0.0
                || position.x > playfield.x
                || position.y > playfield.y
            {
                out.push(Command::ExpireProjectile {
                    projectile: projectile.id,
                });
                continue;
            }

            let struck = enemies.iter().find(|enemy| {
                !enemy.life.is_depleted()
                    && enemy.position.distance(position) <= PROJECTILE_CONTACT_RADIUS
            });
            match struck {
                Some(enemy) => out.push(Command::ProjectileContact {
                    projectile: projectile.id,
                    enemy: enemy.id,
                }),
                None => out.push(Command::MoveProjectile {
                    projectile: projectile.id,
                    position,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use werian_defence_core::{
        AnimationState, CellCoord, CellRect, CellRectSize, EnemyId, EnemyKind, EnemySnapshot,
        Facing, Life, ProjectileId, ProjectileSnapshot, Route, TowerId, TowerKind, TowerSnapshot,
    };

    #[test]
    fn attacks_respect_cooldown_readiness() {
        let mut system = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![
            tower(2, TowerKind::Fire, None),
            tower(5, TowerKind::Main, Some(Duration::from_millis(400))),
        ]);
        let targets = vec![target(2, 4), target(5, 1), target(42, 3)];
        let mut out = Vec::new();

        system.handle(Duration::from_millis(1_000), &towers, &targets, &mut out);

        assert_eq!(
            out,
            vec![Command::StrikeEnemy {
                tower: TowerId::new(2),
                enemy: EnemyId::new(4),
                damage: 20.0,
            }],
        );

        out.clear();
        system.handle(Duration::from_millis(1_400), &towers, &targets, &mut out);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn archers_launch_half_damage_arrows_toward_target() {
        let mut system = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![tower(1, TowerKind::Archer, None)]);
        let targets = vec![target(1, 0)];
        let mut out = Vec::new();

        system.handle(Duration::ZERO, &towers, &targets, &mut out);

        assert_eq!(
            out,
            vec![Command::LaunchProjectile {
                tower: TowerId::new(1),
                target: EnemyId::new(0),
                origin: Vec2::ZERO,
                velocity: Vec2::new(ARROW_SPEED, 0.0),
                damage: 12.5,
            }],
        );
    }

    #[test]
    fn archers_hold_fire_at_an_enemy_on_their_anchor() {
        let mut system = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![tower(1, TowerKind::Archer, None)]);
        let overlapping = TowerTarget {
            enemy_position: Vec2::ZERO,
            ..target(1, 0)
        };
        let mut out = Vec::new();

        system.handle(Duration::ZERO, &towers, &[overlapping], &mut out);
        assert!(out.is_empty());

        system.handle(Duration::from_millis(33), &towers, &[target(1, 0)], &mut out);
        assert!(matches!(
            out.as_slice(),
            [Command::LaunchProjectile { velocity, .. }] if *velocity == Vec2::new(ARROW_SPEED, 0.0)
        ));
    }

    #[test]
    fn projectiles_hit_first_enemy_in_contact_radius() {
        let mut system = ProjectileFlight;
        let projectiles = ProjectileView::from_snapshots(vec![projectile(0, Vec2::new(40.0, 0.0))]);
        let enemies = EnemyView::from_snapshots(vec![
            enemy(7, Vec2::new(45.0, 0.0)),
            enemy(3, Vec2::new(65.0, 0.0)),
        ]);
        let mut out = Vec::new();

        system.handle(&projectiles, &enemies, Vec2::new(100.0, 100.0), &mut out);

        assert_eq!(
            out,
            vec![Command::ProjectileContact {
                projectile: ProjectileId::new(0),
                enemy: EnemyId::new(3),
            }],
        );
    }

    #[test]
    fn projectiles_leaving_playfield_expire() {
        let mut system = ProjectileFlight;
        let projectiles = ProjectileView::from_snapshots(vec![
            projectile(0, Vec2::new(95.0, 10.0)),
            projectile(1, Vec2::new(10.0, 10.0)),
        ]);
        let mut out = Vec::new();

        system.handle(
            &projectiles,
            &EnemyView::default(),
            Vec2::new(100.0, 100.0),
            &mut out,
        );

        assert_eq!(
            out,
            vec![
                Command::ExpireProjectile {
                    projectile: ProjectileId::new(0),
                },
                Command::MoveProjectile {
                    projectile: ProjectileId::new(1),
                    position: Vec2::new(20.0, 10.0),
                },
            ],
        );
    }

    fn tower(id: u32, kind: TowerKind, last_attack: Option<Duration>) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            kind,
            footprint: CellRect::from_origin_and_size(
                CellCoord::new(0, 0),
                CellRectSize::new(2, 2),
            ),
            anchor: Vec2::ZERO,
            life: Life::full(kind.max_life()),
            damage: kind.damage(),
            level: 0,
            last_attack,
            main: false,
        }
    }

    fn target(tower: u32, enemy: u32) -> TowerTarget {
        TowerTarget {
            tower: TowerId::new(tower),
            enemy: EnemyId::new(enemy),
            tower_anchor: Vec2::ZERO,
            enemy_position: Vec2::new(50.0, 0.0),
        }
    }

    fn projectile(id: u32, position: Vec2) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: ProjectileId::new(id),
            tower: TowerId::new(0),
            target: EnemyId::new(0),
            position,
            velocity: Vec2::new(ARROW_SPEED, 0.0),
            damage: 12.5,
        }
    }

    fn enemy(id: u32, position: Vec2) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Orc,
            position,
            life: Life::full(100.0),
            target: None,
            route: Route::default(),
            route_cursor: 0,
            facing: Facing::Right,
            state: AnimationState::Idle,
            animation_phase: 0,
        }
    }
}
