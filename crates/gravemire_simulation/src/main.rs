//! Headless симуляция GRAVEMIRE
//!
//! Запускает Bevy App без рендера: игрок + два агента, 1000 тиков

use bevy::prelude::*;
use gravemire_simulation::bridge::AssetLoadFinished;
use gravemire_simulation::{
    create_headless_app, spawn_hostile_agent, spawn_player, AgentClass, DeterministicRng,
};

fn main() {
    let seed = 42;
    println!("Starting GRAVEMIRE headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);

    let mut spawned = Vec::new();
    {
        let world = app.world_mut();
        spawn_player(&mut world.commands());

        world.resource_scope(|world, mut rng: Mut<DeterministicRng>| {
            let mut commands = world.commands();
            spawned.push(spawn_hostile_agent(
                &mut commands,
                &mut rng.rng,
                AgentClass::Shambler,
                Vec3::new(5.0, 0.0, 5.0),
            ));
            spawned.push(spawn_hostile_agent(
                &mut commands,
                &mut rng.rng,
                AgentClass::Stalker,
                Vec3::new(-8.0, 0.0, 3.0),
            ));
        });
    }
    app.update(); // flush spawn команд

    // Host сигналит что mesh/тела агентов загружены
    for entity in spawned {
        app.world_mut().send_event(AssetLoadFinished { entity });
    }

    // Запускаем 1000 тиков симуляции
    for tick in 0..1000 {
        app.update();

        if tick % 100 == 0 {
            let entity_count = app.world().entities().len();
            println!("Tick {}: {} entities", tick, entity_count);
        }
    }

    println!("Simulation complete!");
}
