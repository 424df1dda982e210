use proptest::prelude::*;
use werian_defence_core::{CellCoord, GridView, PassabilityPolicy, Terrain, TowerId};
use werian_defence_system_pathfinding::{find_route, RouteError};

const SIDE: u32 = 8;
const BLOCKER: TowerId = TowerId::new(99);
const TARGET: TowerId = TowerId::new(7);

fn grid_from<'a>(
    terrain: &'a [Terrain],
    occupancy: &'a [Option<TowerId>],
    policy: PassabilityPolicy,
) -> GridView<'a> {
    GridView::new(terrain, occupancy, SIDE, SIDE, policy)
}

fn adjacent(a: CellCoord, b: CellCoord) -> bool {
    a.manhattan_distance(b) == 1
}

fn reachable(
    start: CellCoord,
    goal: &[CellCoord],
    grid: GridView<'_>,
    target: Option<TowerId>,
) -> bool {
    if goal.contains(&start) {
        return true;
    }
    let mut seen = vec![false; (SIDE * SIDE) as usize];
    let mut stack = vec![start];
    seen[(start.row() * SIDE + start.column()) as usize] = true;
    while let Some(cell) = stack.pop() {
        let candidates = [
            cell.row().checked_sub(1).map(|r| CellCoord::new(cell.column(), r)),
            Some(CellCoord::new(cell.column() + 1, cell.row())),
            Some(CellCoord::new(cell.column(), cell.row() + 1)),
            cell.column().checked_sub(1).map(|c| CellCoord::new(c, cell.row())),
        ];
        for next in candidates.into_iter().flatten() {
            if !grid.contains(next) || !grid.is_passable(next, target) {
                continue;
            }
            let index = (next.row() * SIDE + next.column()) as usize;
            if seen[index] {
                continue;
            }
            if goal.contains(&next) {
                return true;
            }
            seen[index] = true;
            stack.push(next);
        }
    }
    false
}

#[test]
fn route_reaches_single_cell_structure_in_open_field() {
    let terrain: Vec<Terrain> = (0..100)
        .map(|index| if index == 55 { Terrain::Buildable } else { Terrain::Path })
        .collect();
    let mut occupancy = vec![None; 100];
    occupancy[55] = Some(TARGET);
    let grid = GridView::new(&terrain, &occupancy, 10, 10, PassabilityPolicy::default());
    let goal = [CellCoord::new(5, 5)];

    let route = find_route(CellCoord::new(0, 0), &goal, grid, Some(TARGET)).expect("open field");

    assert_eq!(route.len(), 10);
    let last = *route.last().expect("non-empty route");
    assert!(last == goal[0] || adjacent(last, goal[0]));
    assert!(adjacent(CellCoord::new(0, 0), route[0]));
    for pair in route.windows(2) {
        assert!(adjacent(pair[0], pair[1]));
    }
}

#[test]
fn structure_is_an_obstacle_for_enemies_targeting_something_else() {
    let terrain = vec![Terrain::Path; 100];
    let mut occupancy = vec![None; 100];
    for row in 0..9 {
        occupancy[row * 10 + 5] = Some(BLOCKER);
    }
    let grid = GridView::new(&terrain, &occupancy, 10, 10, PassabilityPolicy::default());

    let route = find_route(CellCoord::new(0, 0), &[CellCoord::new(9, 0)], grid, None)
        .expect("gap at the bottom row");
    assert!(route.contains(&CellCoord::new(5, 9)));
    assert!(route
        .iter()
        .all(|cell| grid.occupant(*cell).is_none()));
}

#[test]
fn path_only_policy_keeps_enemies_on_lanes() {
    let rows = [
        "..######", "#.######", "#......#", "######.#", "######..", "########", "########",
        "########",
    ];
    let terrain: Vec<Terrain> = rows
        .iter()
        .flat_map(|row| row.chars())
        .map(|glyph| Terrain::from_glyph(glyph).expect("valid glyph"))
        .collect();
    let occupancy = vec![None; terrain.len()];
    let grid = grid_from(&terrain, &occupancy, PassabilityPolicy::PathOnly);

    let route = find_route(CellCoord::new(0, 0), &[CellCoord::new(7, 4)], grid, None)
        .expect("lane connects both ends");
    assert!(route
        .iter()
        .all(|cell| grid.terrain(*cell) == Some(Terrain::Path)));
    assert_eq!(route.len(), 11);
}

proptest! {
    #[test]
    fn routes_are_adjacent_passable_and_match_flood_fill(
        layout in proptest::collection::vec(0u8..4, (SIDE * SIDE) as usize),
        start in (0..SIDE, 0..SIDE),
        goal_origin in (0..SIDE - 1, 0..SIDE - 1),
        path_only in any::<bool>(),
    ) {
        let terrain: Vec<Terrain> = layout
            .iter()
            .map(|value| if *value == 1 { Terrain::Buildable } else { Terrain::Path })
            .collect();
        let mut occupancy: Vec<Option<TowerId>> = layout
            .iter()
            .map(|value| (*value == 0).then_some(BLOCKER))
            .collect();
        let goal: Vec<CellCoord> = [(0, 0), (1, 0), (0, 1), (1, 1)]
            .iter()
            .map(|(dx, dy)| CellCoord::new(goal_origin.0 + dx, goal_origin.1 + dy))
            .collect();
        for cell in &goal {
            occupancy[(cell.row() * SIDE + cell.column()) as usize] = Some(TARGET);
        }
        let policy = if path_only {
            PassabilityPolicy::PathOnly
        } else {
            PassabilityPolicy::BuildableWalkable
        };
        let grid = grid_from(&terrain, &occupancy, policy);
        let start = CellCoord::new(start.0, start.1);

        let result = find_route(start, &goal, grid, Some(TARGET));
        match &result {
            Ok(route) => {
                prop_assert!(reachable(start, &goal, grid, Some(TARGET)));
                let mut previous = start;
                for cell in route {
                    prop_assert!(adjacent(previous, *cell));
                    prop_assert!(grid.is_passable(*cell, Some(TARGET)));
                    previous = *cell;
                }
                if let Some(last) = route.last() {
                    prop_assert!(goal.contains(last));
                    prop_assert!(route[..route.len() - 1].iter().all(|cell| !goal.contains(cell)));
                } else {
                    prop_assert!(goal.contains(&start));
                }
            }
            Err(error) => {
                prop_assert_eq!(*error, RouteError::NoRoute);
                prop_assert!(!reachable(start, &goal, grid, Some(TARGET)));
            }
        }

        prop_assert_eq!(result, find_route(start, &goal, grid, Some(TARGET)));
    }
}
