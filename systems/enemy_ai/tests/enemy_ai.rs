use std::collections::HashSet;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use veil_core::{Command, Event, LevelConfig, NoteText};
use veil_system_enemy_ai::EnemyAi;
use veil_world::{apply, query, World};

fn generated_world(seed: u64) -> World {
    let mut world = World::new();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut events = Vec::new();
    apply(
        &mut world,
        Command::GenerateLevel {
            columns: 41,
            rows: 32,
            level: 25,
            config: LevelConfig::default(),
            note_text: NoteText::plain("..."),
        },
        &mut rng,
        &mut events,
    );
    world
}

#[test]
fn planner_stays_silent_without_a_tick() {
    let world = generated_world(1);
    let mut ai = EnemyAi::new();
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let mut commands = Vec::new();

    let events = vec![Event::PulseFaded];
    ai.handle(
        &events,
        query::terrain(&world),
        &query::enemies(&world),
        query::occupancy(&world),
        query::player(&world).expect("player placed").cell,
        query::pulse(&world),
        &mut rng,
        &mut commands,
    );
    assert!(commands.is_empty());
}

#[test]
fn long_simulation_keeps_enemies_on_distinct_floor_cells() {
    let mut world = generated_world(1);
    let mut ai = EnemyAi::new();
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    assert_eq!(query::enemies(&world).len(), 24);

    for turn in 0..200 {
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
            &mut rng,
            &mut events,
        );

        let mut commands = Vec::new();
        ai.handle(
            &events,
            query::terrain(&world),
            &query::enemies(&world),
            query::occupancy(&world),
            query::player(&world).expect("player placed").cell,
            query::pulse(&world),
            &mut rng,
            &mut commands,
        );
        for command in commands {
            apply(&mut world, command, &mut rng, &mut events);
        }

        let terrain = query::terrain(&world);
        let view = query::enemies(&world);
        let mut cells = HashSet::new();
        for snapshot in view.iter() {
            assert!(
                !terrain.is_wall(snapshot.cell),
                "turn {turn}: enemy walked into a wall at {:?}",
                snapshot.cell,
            );
            assert!(
                cells.insert(snapshot.cell),
                "turn {turn}: two enemies share {:?}",
                snapshot.cell,
            );
        }
        assert_eq!(view.len(), 24, "enemies are never created or destroyed");
    }
}
