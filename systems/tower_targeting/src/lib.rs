#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use glam::Vec2;
use werian_defence_core::{EnemyId, EnemyView, TowerTarget, TowerView};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    enemy_workspace: Vec<EnemyCandidate>,
}

#[derive(Clone, Copy, Debug)]
struct EnemyCandidate {
    id: EnemyId,
    position: Vec2,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes one target per living tower that has a living enemy in range.
    ///
    /// Each tower picks the first enemy, in registration order, whose distance
    /// from the tower's anchor is at most its range. The output buffer is
    /// cleared before populating it.
    pub fn handle(&mut self, towers: &TowerView, enemies: &EnemyView, out: &mut Vec<TowerTarget>) {
        out.clear();

        if towers.is_empty() || enemies.is_empty() {
            return;
        }

        self.enemy_workspace.clear();
        self.enemy_workspace.extend(
            enemies
                .iter()
                .filter(|enemy| !enemy.life.is_depleted())
                .map(|enemy| EnemyCandidate {
                    id: enemy.id,
                    position: enemy.position,
                }),
        );
        if self.enemy_workspace.is_empty() {
            return;
        }

        for tower in towers.iter() {
            if tower.life.is_depleted() {
                continue;
            }

            let range = tower.kind.range();
            let selected = self
                .enemy_workspace
                .iter()
                .find(|candidate| candidate.position.distance(tower.anchor) <= range);

            if let Some(candidate) = selected {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy: candidate.id,
                    tower_anchor: tower.anchor,
                    enemy_position: candidate.position,
                });
            }
        }
    }
}
