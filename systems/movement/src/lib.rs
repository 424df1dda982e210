#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that walks enemies along their routes.

use werian_defence_core::{Command, EnemySnapshot, EnemyView, Facing, TowerView};

/// Pure system that interpolates enemies toward their next waypoint and
/// turns arrival into melee contact with the assigned target.
#[derive(Debug, Default)]
pub struct Movement;

impl Movement {
    /// Emits one command per enemy that either moves or strikes this tick.
    ///
    /// Enemies without a target neither move nor attack. An enemy whose
    /// target no longer stands stays where its route ended.
    pub fn handle(&mut self, enemies: &EnemyView, towers: &TowerView, out: &mut Vec<Command>) {
        for enemy in enemies.iter() {
            let Some(target) = enemy.target else {
                continue;
            };

            if let Some(command) = step(enemy) {
                out.push(command);
                continue;
            }

            if towers.get(target).is_some() {
                out.push(Command::StrikeTower {
                    enemy: enemy.id,
                    tower: target,
                    damage: enemy.kind.contact_damage(),
                });
            }
        }
    }
}

fn step(enemy: &EnemySnapshot) -> Option<Command> {
    let waypoint = enemy.route.waypoint(enemy.route_cursor)?;
    let speed = enemy.kind.speed();
    let offset = waypoint - enemy.position;
    let distance = offset.length();

    let (position, route_cursor) = if distance <= speed {
        (waypoint, enemy.route_cursor + 1)
    } else {
        (enemy.position + offset / distance * speed, enemy.route_cursor)
    };

    let facing = if offset.x < 0.0 {
        Facing::Left
    } else if offset.x > 0.0 {
        Facing::Right
    } else {
        enemy.facing
    };

    Some(Command::AdvanceEnemy {
        enemy: enemy.id,
        position,
        route_cursor,
        facing,
    })
}
