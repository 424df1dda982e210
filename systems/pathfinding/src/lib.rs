#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Breadth-first route planning toward the nearest structure.

use std::collections::VecDeque;

use thiserror::Error;
use werian_defence_core::{CellCoord, Command, EnemyView, GridView, TowerId, TowerView};

/// Failures reported by [`find_route`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RouteError {
    /// No passable path connects the start cell to the goal footprint.
    #[error("goal footprint is unreachable from the start cell")]
    NoRoute,
    /// The start cell lies outside the grid.
    #[error("start cell lies outside the grid")]
    StartOutOfBounds,
}

/// Computes the shortest 4-connected route from `start` to the nearest goal cell.
///
/// The returned cells exclude `start` and end at the first goal cell reached.
/// Neighbours are explored north, east, south, west, so identical inputs
/// always yield identical routes.
pub fn find_route(
    start: CellCoord,
    goal: &[CellCoord],
    grid: GridView<'_>,
    target: Option<TowerId>,
) -> Result<Vec<CellCoord>, RouteError> {
    RouteSearch::default().find(start, goal, grid, target)
}

/// Reusable scratch buffers for repeated breadth-first searches.
#[derive(Debug, Default)]
pub struct RouteSearch {
    parents: Vec<usize>,
    goal_mask: Vec<bool>,
    queue: VecDeque<CellCoord>,
}

const UNVISITED: usize = usize::MAX;

impl RouteSearch {
    /// Runs [`find_route`] using the buffers held by this search.
    pub fn find(
        &mut self,
        start: CellCoord,
        goal: &[CellCoord],
        grid: GridView<'_>,
        target: Option<TowerId>,
    ) -> Result<Vec<CellCoord>, RouteError> {
        let (columns, rows) = grid.dimensions();
        let width = usize::try_from(columns).unwrap_or(0);
        let Some(start_index) = index(width, columns, rows, start) else {
            return Err(RouteError::StartOutOfBounds);
        };
        self.prepare(columns, rows);

        let mut any_goal = false;
        for &cell in goal {
            if let Some(goal_index) = index(width, columns, rows, cell) {
                self.goal_mask[goal_index] = true;
                any_goal = true;
            }
        }
        if !any_goal {
            return Err(RouteError::NoRoute);
        }
        if self.goal_mask[start_index] {
            return Ok(Vec::new());
        }

        self.parents[start_index] = start_index;
        self.queue.push_back(start);

        while let Some(cell) = self.queue.pop_front() {
            let Some(current) = index(width, columns, rows, cell) else {
                continue;
            };
            for neighbor in neighbors(cell, columns, rows) {
                let Some(next) = index(width, columns, rows, neighbor) else {
                    continue;
                };
                if self.parents[next] != UNVISITED || !grid.is_passable(neighbor, target) {
                    continue;
                }
                self.parents[next] = current;
                if self.goal_mask[next] {
                    return Ok(self.trace(next, start_index, width));
                }
                self.queue.push_back(neighbor);
            }
        }

        Err(RouteError::NoRoute)
    }

    fn prepare(&mut self, columns: u32, rows: u32) {
        let cell_count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        self.parents.clear();
        self.parents.resize(cell_count, UNVISITED);
        self.goal_mask.clear();
        self.goal_mask.resize(cell_count, false);
        self.queue.clear();
    }

    fn trace(&self, mut current: usize, start: usize, width: usize) -> Vec<CellCoord> {
        let mut route = Vec::new();
        while current != start {
            route.push(coord(width, current));
            current = self.parents[current];
        }
        route.reverse();
        route
    }
}

fn neighbors(cell: CellCoord, columns: u32, rows: u32) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];

    if let Some(row) = cell.row().checked_sub(1) {
        candidates[0] = Some(CellCoord::new(cell.column(), row));
    }
    if let Some(column) = cell.column().checked_add(1).filter(|&c| c < columns) {
        candidates[1] = Some(CellCoord::new(column, cell.row()));
    }
    if let Some(row) = cell.row().checked_add(1).filter(|&r| r < rows) {
        candidates[2] = Some(CellCoord::new(cell.column(), row));
    }
    if let Some(column) = cell.column().checked_sub(1) {
        candidates[3] = Some(CellCoord::new(column, cell.row()));
    }

    candidates.into_iter().flatten()
}

fn index(width: usize, columns: u32, rows: u32, cell: CellCoord) -> Option<usize> {
    if cell.column() >= columns || cell.row() >= rows {
        return None;
    }
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

fn coord(width: usize, index: usize) -> CellCoord {
    let column = u32::try_from(index % width).unwrap_or(u32::MAX);
    let row = u32::try_from(index / width).unwrap_or(u32::MAX);
    CellCoord::new(column, row)
}

/// Counts gathered during one repath cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RepathSummary {
    /// Enemies that received a fresh route.
    pub assigned: usize,
    /// Enemies whose target was unreachable and kept their previous route.
    pub retained: usize,
    /// Enemies left without a target because no structure stands.
    pub untargeted: usize,
}

/// Pure system that assigns every enemy its nearest structure and a route to it.
#[derive(Debug, Default)]
pub struct Repathing {
    search: RouteSearch,
    goal: Vec<CellCoord>,
}

impl Repathing {
    /// Emits [`Command::AssignRoute`] for every enemy that can be routed.
    ///
    /// Enemies whose nearest structure is unreachable receive no command and
    /// keep following their previous route.
    pub fn handle(
        &mut self,
        enemies: &EnemyView,
        towers: &TowerView,
        grid: GridView<'_>,
        cell_size: f32,
        out: &mut Vec<Command>,
    ) -> RepathSummary {
        let mut summary = RepathSummary::default();

        for enemy in enemies.iter() {
            let Some((tower, _)) = towers.nearest_to(enemy.position) else {
                summary.untargeted += 1;
                if enemy.target.is_some() || !enemy.route.is_empty() {
                    out.push(Command::AssignRoute {
                        enemy: enemy.id,
                        target: None,
                        cells: Vec::new(),
                    });
                }
                continue;
            };

            let Some(start) = CellCoord::containing(enemy.position, cell_size) else {
                summary.retained += 1;
                continue;
            };

            self.goal.clear();
            self.goal.extend(tower.footprint.cells());
            match self.search.find(start, &self.goal, grid, Some(tower.id)) {
                Ok(cells) => {
                    summary.assigned += 1;
                    out.push(Command::AssignRoute {
                        enemy: enemy.id,
                        target: Some(tower.id),
                        cells,
                    });
                }
                Err(_) => summary.retained += 1,
            }
        }

        summary
    }
}
