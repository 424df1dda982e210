use std::time::Duration;

use werian_defence_core::{
    CellCoord, Command, EnemyId, EnemyKind, Event, PassabilityPolicy, Terrain, TowerId, TowerKind,
};
use werian_defence_system_tower_combat::{ProjectileFlight, TowerCombat};
use werian_defence_system_tower_targeting::TowerTargeting;
use werian_defence_world::{self as world, query, Grid, World};

struct Rig {
    world: World,
    targeting: TowerTargeting,
    combat: TowerCombat,
    flight: ProjectileFlight,
}

impl Rig {
    fn new(setup: Vec<Command>) -> Self {
        let mut world = World::new(
            Grid::uniform(20, 10, Terrain::Buildable, PassabilityPolicy::default()),
            20.0,
        );
        let mut events = Vec::new();
        for command in setup {
            world::apply(&mut world, command, &mut events);
        }
        Self {
            world,
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            flight: ProjectileFlight,
        }
    }

    fn tick(&mut self, now: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::AdvanceClock { now }, &mut events);

        let towers = query::tower_view(&self.world);
        let enemies = query::enemy_view(&self.world);
        let mut targets = Vec::new();
        self.targeting.handle(&towers, &enemies, &mut targets);
        let mut commands = Vec::new();
        self.combat.handle(now, &towers, &targets, &mut commands);
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, &mut events);
        }

        self.flight.handle(
            &query::projectile_view(&self.world),
            &query::enemy_view(&self.world),
            query::playfield(&self.world),
            &mut commands,
        );
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        world::apply(&mut self.world, Command::SweepCasualties, &mut events);
        events
    }
}

#[test]
fn archer_arrow_travels_then_deals_half_damage() {
    let mut rig = Rig::new(vec![
        Command::PlaceTower {
            kind: TowerKind::Archer,
            origin: CellCoord::new(2, 4),
        },
        Command::SpawnEnemy {
            kind: EnemyKind::Orc,
            cell: CellCoord::new(8, 4),
        },
    ]);

    let mut hit_at = None;
    for frame in 0..30u64 {
        let events = rig.tick(Duration::from_millis(frame * 33));
        if frame == 0 {
            assert!(events
                .iter()
                .any(|event| matches!(event, Event::ProjectileLaunched { .. })));
        }
        if events
            .iter()
            .any(|event| matches!(event, Event::EnemyStruck { damage, .. } if *damage == 12.5))
        {
            hit_at = Some(frame);
            break;
        }
    }

    let hit_at = hit_at.expect("arrow reached the orc");
    assert!(hit_at > 0, "arrows need time to travel");
    assert!(query::projectile_view(&rig.world).is_empty());
    let enemies = query::enemy_view(&rig.world);
    let orc = enemies.get(EnemyId::new(0)).expect("orc survives one arrow");
    assert_eq!(orc.life.current(), 87.5);
}

#[test]
fn fire_tower_kills_and_death_is_rewarded_once() {
    let mut rig = Rig::new(vec![
        Command::PlaceTower {
            kind: TowerKind::Fire,
            origin: CellCoord::new(2, 4),
        },
        Command::SpawnEnemy {
            kind: EnemyKind::Orc,
            cell: CellCoord::new(5, 4),
        },
    ]);

    let mut deaths = Vec::new();
    for second in 0..6u64 {
        let events = rig.tick(Duration::from_secs(second));
        deaths.extend(events.into_iter().filter_map(|event| match event {
            Event::EnemyDied { enemy, reward, .. } => Some((second, enemy, reward)),
            _ => None,
        }));
    }

    assert_eq!(deaths.len(), 1);
    let (second, enemy, reward) = deaths[0];
    assert_eq!(second, 4);
    assert_eq!(enemy, EnemyId::new(0));
    assert_eq!(reward, EnemyKind::Orc.reward());
    assert!(query::enemy_view(&rig.world).is_empty());
}

#[test]
fn archer_cooldown_gates_launches_to_one_per_second() {
    let mut rig = Rig::new(vec![
        Command::PlaceTower {
            kind: TowerKind::Archer,
            origin: CellCoord::new(2, 4),
        },
        Command::SpawnEnemy {
            kind: EnemyKind::Orc,
            cell: CellCoord::new(8, 4),
        },
    ]);

    let mut launches = Vec::new();
    for frame in 0..70u64 {
        let now = Duration::from_millis(frame * 33);
        let events = rig.tick(now);
        let launched = events
            .iter()
            .filter(|event| matches!(event, Event::ProjectileLaunched { .. }))
            .count();
        assert!(launched <= 1);
        if launched == 1 {
            launches.push(now.as_millis());
        }
    }

    assert_eq!(launches, vec![0, 1023, 2046]);
}

#[test]
fn overkill_leaves_negative_life_and_a_single_death() {
    let mut world = World::new(
        Grid::uniform(10, 10, Terrain::Buildable, PassabilityPolicy::default()),
        20.0,
    );
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnEnemy {
            kind: EnemyKind::Orc,
            cell: CellCoord::new(5, 5),
        },
        &mut events,
    );
    let enemy = EnemyId::new(0);
    for tower in [0, 1] {
        world::apply(
            &mut world,
            Command::StrikeEnemy {
                tower: TowerId::new(tower),
                enemy,
                damage: 60.0,
            },
            &mut events,
        );
    }

    let orc = query::enemy_view(&world)
        .get(enemy)
        .map(|orc| orc.life.current())
        .expect("orc is swept, not removed on damage");
    assert_eq!(orc, -20.0);

    events.clear();
    world::apply(&mut world, Command::SweepCasualties, &mut events);
    world::apply(&mut world, Command::SweepCasualties, &mut events);
    let deaths = events
        .iter()
        .filter(|event| matches!(event, Event::EnemyDied { .. }))
        .count();
    assert_eq!(deaths, 1);
    assert!(query::enemy_view(&world).is_empty());
}
