use std::time::Duration;

use glam::Vec2;
use werian_defence_core::{
    AnimationState, CellCoord, Command, EnemyId, EnemyKind, Event, Facing, PassabilityPolicy,
    Terrain, TowerId, TowerKind,
};
use werian_defence_system_movement::Movement;
use werian_defence_world::{self as world, query, Grid, World};

const CELL: f32 = 10.0;

fn world_with_archer_and_orc() -> World {
    let mut world = World::new(
        Grid::uniform(10, 4, Terrain::Buildable, PassabilityPolicy::default()),
        CELL,
    );
    let mut events = Vec::new();
    for command in [
        Command::PlaceTower {
            kind: TowerKind::Archer,
            origin: CellCoord::new(6, 0),
        },
        Command::SpawnEnemy {
            kind: EnemyKind::Orc,
            cell: CellCoord::new(3, 0),
        },
        Command::AssignRoute {
            enemy: EnemyId::new(0),
            target: Some(TowerId::new(0)),
            cells: vec![
                CellCoord::new(4, 0),
                CellCoord::new(5, 0),
                CellCoord::new(6, 0),
            ],
        },
    ] {
        world::apply(&mut world, command, &mut events);
    }
    world
}

fn tick(world: &mut World, movement: &mut Movement, now: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::AdvanceClock { now }, &mut events);
    let mut commands = Vec::new();
    movement.handle(
        &query::enemy_view(world),
        &query::tower_view(world),
        &mut commands,
    );
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

#[test]
fn enemy_walks_its_route_then_strikes_the_target_every_tick() {
    let mut world = world_with_archer_and_orc();
    let mut movement = Movement::default();
    let mut previous_cursor = 0;
    let mut strikes = 0;

    for frame in 1..=20u64 {
        let events = tick(&mut world, &mut movement, Duration::from_millis(frame * 33));
        let enemies = query::enemy_view(&world);
        let orc = enemies.get(EnemyId::new(0)).expect("orc alive");
        assert!(orc.route_cursor >= previous_cursor);
        assert!(orc.route_cursor <= orc.route.len());
        previous_cursor = orc.route_cursor;
        assert_eq!(orc.facing, Facing::Right);

        strikes += events
            .iter()
            .filter(|event| matches!(event, Event::TowerStruck { .. }))
            .count();
    }

    let enemies = query::enemy_view(&world);
    let orc = enemies.get(EnemyId::new(0)).expect("orc alive");
    assert_eq!(orc.position, CellCoord::new(6, 0).center(CELL));
    assert_eq!(orc.state, AnimationState::Attacking);
    assert_eq!(strikes, 5);
    let towers = query::tower_view(&world);
    let archer = towers.get(TowerId::new(0)).expect("archer standing");
    assert_eq!(archer.life.current(), 100.0 - 5.0 * 0.5);
}

#[test]
fn enemies_without_target_stay_put() {
    let mut world = World::new(
        Grid::uniform(4, 4, Terrain::Path, PassabilityPolicy::default()),
        CELL,
    );
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnEnemy {
            kind: EnemyKind::Head,
            cell: CellCoord::new(2, 2),
        },
        &mut events,
    );
    let mut movement = Movement::default();

    let events = tick(&mut world, &mut movement, Duration::from_millis(33));

    assert!(events
        .iter()
        .all(|event| matches!(event, Event::TimeAdvanced { .. })));
    let enemies = query::enemy_view(&world);
    let head = enemies.iter().next().expect("head alive");
    assert_eq!(head.position, Vec2::new(25.0, 25.0));
    assert_eq!(head.state, AnimationState::Idle);
}

#[test]
fn destroyed_target_is_not_struck() {
    let mut world = world_with_archer_and_orc();
    let mut movement = Movement::default();
    for frame in 1..=15u64 {
        let _ = tick(&mut world, &mut movement, Duration::from_millis(frame * 33));
    }

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::StrikeTower {
            enemy: EnemyId::new(0),
            tower: TowerId::new(0),
            damage: 1_000.0,
        },
        &mut events,
    );
    world::apply(&mut world, Command::SweepCasualties, &mut events);
    assert!(query::tower_view(&world).is_empty());

    let events = tick(&mut world, &mut movement, Duration::from_millis(600));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::TowerStruck { .. })));
}
