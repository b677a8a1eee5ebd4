//! Combat integration tests
//!
//! End-to-end сценарии на headless App (60Hz fixed tick, manual time):
//! - смерть агента: урон 6 по 5 HP → Dying, через 3000 мс Dead + MeshRemoved
//! - fire-rate gate: два выстрела внутри интервала → успешен ровно один
//! - contact урон: ровно один hit frame на re-entry, не каждый тик
//! - auto-regen игрока: +0.1 за тик бездействия до max
//! - Hurt подавляет движение агента и снимается через 500 мс
//! - AwaitingAssets откладывает активацию агента
//! - смерть игрока останавливает simulation clock

use bevy::ecs::event::EventCursor;
use bevy::prelude::*;
use gravemire_simulation::bridge::{AssetLoadFinished, AudioCueRequested, MeshRemoved};
use gravemire_simulation::*;

/// Helper: App + игрок + набор агентов (уже "загруженных")
fn create_combat_app(seed: u64, agents: &[(AgentClass, Vec3)]) -> (App, Entity, Vec<Entity>) {
    let mut app = create_headless_app(seed);

    let player;
    let mut spawned = Vec::new();
    {
        let world = app.world_mut();
        player = spawn_player(&mut world.commands());

        world.resource_scope(|world, mut rng: Mut<DeterministicRng>| {
            let mut commands = world.commands();
            for (class, position) in agents {
                spawned.push(spawn_hostile_agent(
                    &mut commands,
                    &mut rng.rng,
                    *class,
                    *position,
                ));
            }
        });
    }
    app.update(); // flush spawn команд

    for entity in &spawned {
        app.world_mut().send_event(AssetLoadFinished { entity: *entity });
    }
    app.update(); // активация (снятие AwaitingAssets)

    (app, player, spawned)
}

fn behavior_state(app: &App, entity: Entity) -> BehaviorState {
    app.world().get::<Behavior>(entity).unwrap().state
}

/// Сценарий §смерть: health=5, урон 6 → health=0, Dying;
/// 3000 мс спустя Dead и mesh убран
#[test]
fn test_agent_death_settles_after_linger() {
    // Агент далеко от игрока: атак и попаданий нет
    let (mut app, _player, agents) = create_combat_app(
        42,
        &[(AgentClass::Shambler, Vec3::new(100.0, 0.0, 100.0))],
    );
    let agent = agents[0];

    app.world_mut().get_mut::<Health>(agent).unwrap().current = 5.0;
    app.world_mut().send_event(HealthDelta {
        target: agent,
        delta: -6.0,
    });
    app.update();

    {
        let health = app.world().get::<Health>(agent).unwrap();
        assert_eq!(health.current, 0.0);
    }
    assert_eq!(behavior_state(&app, agent), BehaviorState::Dying);

    // Повторный урон по умирающему — идемпотентный no-op
    app.world_mut().send_event(HealthDelta {
        target: agent,
        delta: -3.0,
    });
    app.update();
    assert_eq!(app.world().get::<Health>(agent).unwrap().current, 0.0);
    assert_eq!(behavior_state(&app, agent), BehaviorState::Dying);

    // 2 тика уже прошло; до 3000 мс (180 тиков) ещё Dying
    for _ in 0..177 {
        app.update();
    }
    assert_eq!(behavior_state(&app, agent), BehaviorState::Dying);

    let mut cursor: EventCursor<MeshRemoved> =
        app.world().resource::<Events<MeshRemoved>>().get_cursor();

    // Тики 179..181: порог 3000 мс пересечён
    for _ in 0..3 {
        app.update();
    }
    assert_eq!(behavior_state(&app, agent), BehaviorState::Dead);

    let events = app.world().resource::<Events<MeshRemoved>>();
    let removed: Vec<_> = cursor.read(events).collect();
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].entity, agent);
}

/// Сценарий §fire-rate: charge_now=1, два выстрела подряд →
/// второй отклонён, charge остаётся 0
#[test]
fn test_double_fire_within_interval() {
    let (mut app, player, _) = create_combat_app(42, &[]);

    {
        let world = app.world_mut();
        world.get_mut::<Player>(player).unwrap().camera_unlocked = true;
        world.get_mut::<Weapon>(player).unwrap().pistol.charge_now = 1;
        world.resource_mut::<PlayerInput>().fire = true;
    }

    // Тик 1: выстрел успешен; тик 2: intent внутри интервала — отклонён
    app.update();
    app.update();

    let weapon = app.world().get::<Weapon>(player).unwrap();
    assert_eq!(weapon.pistol.charge_now, 0);

    let pool = app.world().get::<ProjectilePool>(player).unwrap();
    assert_eq!(pool.live_count(), 1);
}

/// Выстрел с charge=0 никогда не успешен: без projectile, с kick cue
#[test]
fn test_empty_weapon_fire_is_cue_not_shot() {
    let (mut app, player, _) = create_combat_app(42, &[]);

    {
        let world = app.world_mut();
        world.get_mut::<Player>(player).unwrap().camera_unlocked = true;
        world.get_mut::<Weapon>(player).unwrap().pistol.charge_now = 0;
        world.resource_mut::<PlayerInput>().fire = true;
    }

    app.update();

    let weapon = app.world().get::<Weapon>(player).unwrap();
    assert_eq!(weapon.pistol.charge_now, 0);
    // Kick выставлен, fire-rate окно НЕ израсходовано
    assert!(weapon.kick_until_ms > 0.0);
    assert_eq!(weapon.firing_until_ms, 0.0);

    let pool = app.world().get::<ProjectilePool>(player).unwrap();
    assert_eq!(pool.live_count(), 0);
}

/// Contact урон: ровно один hit frame на WindUp → ActiveHit re-entry,
/// удержание в ActiveHit урона не даёт до re-arm
#[test]
fn test_attack_damage_once_per_reentry() {
    // Агент в радиусе атаки Shambler (planar dist = 1.0)
    let spawn = Vec3::new(PLAYER_SPAWN.x + 1.0, 0.0, PLAYER_SPAWN.z);
    let (mut app, player, _) = create_combat_app(42, &[(AgentClass::Shambler, spawn)]);

    let mut cursor: EventCursor<HealthDelta> =
        app.world().resource::<Events<HealthDelta>>().get_cursor();
    let mut strikes = 0usize;

    // 59 тиков < 1000 мс re-arm: ровно один hit frame
    for _ in 0..59 {
        app.update();
        let events = app.world().resource::<Events<HealthDelta>>();
        strikes += cursor
            .read(events)
            .filter(|e| e.target == player && e.delta < 0.0)
            .count();
    }
    assert_eq!(strikes, 1, "урон должен примениться ровно один раз");

    // После re-arm интервала — второй hit frame
    for _ in 0..10 {
        app.update();
        let events = app.world().resource::<Events<HealthDelta>>();
        strikes += cursor
            .read(events)
            .filter(|e| e.target == player && e.delta < 0.0)
            .count();
    }
    assert_eq!(strikes, 2, "после re-arm ровно второй hit frame");

    let health = app.world().get::<Health>(player).unwrap();
    assert!(health.current < health.max);
}

/// Directional input двигает и FSM игрока: Idle → Moving → Idle
#[test]
fn test_player_fsm_tracks_movement_input() {
    let (mut app, player, _) = create_combat_app(42, &[]);

    {
        let world = app.world_mut();
        world.get_mut::<Player>(player).unwrap().camera_unlocked = true;
        world.resource_mut::<PlayerInput>().move_forward = true;
    }
    let before = app.world().get::<Transform>(player).unwrap().translation;

    app.update();
    assert_eq!(behavior_state(&app, player), BehaviorState::Moving);
    assert_ne!(
        app.world().get::<Transform>(player).unwrap().translation,
        before
    );

    // Ввод отпущен → обратно Idle
    app.world_mut().resource_mut::<PlayerInput>().move_forward = false;
    app.update();
    assert_eq!(behavior_state(&app, player), BehaviorState::Idle);
}

/// Heartbeat раненого: каждый regen тик ниже max перезапускает
/// near-death cue, busy канал глушит (но regen продолжается)
#[test]
fn test_near_death_heartbeat_during_regen() {
    let (mut app, player, _) = create_combat_app(42, &[]);

    {
        let world = app.world_mut();
        world.get_mut::<Health>(player).unwrap().current = 50.0;
        world.get_mut::<Player>(player).unwrap().previous_health = 50.0;
    }

    let mut cursor: EventCursor<AudioCueRequested> = app
        .world()
        .resource::<Events<AudioCueRequested>>()
        .get_cursor();
    let mut cues = 0usize;
    for _ in 0..5 {
        app.update();
        let events = app.world().resource::<Events<AudioCueRequested>>();
        cues += cursor
            .read(events)
            .filter(|e| e.path == "assets/sound/nearDeath.mp3")
            .count();
    }
    assert_eq!(cues, 5, "cue перезапускается на каждом regen тике");

    app.world_mut().resource_mut::<PlayerAudio>().near_death_busy = true;
    for _ in 0..5 {
        app.update();
        let events = app.world().resource::<Events<AudioCueRequested>>();
        cues += cursor
            .read(events)
            .filter(|e| e.path == "assets/sound/nearDeath.mp3")
            .count();
    }
    assert_eq!(cues, 5, "busy канал глушит heartbeat");

    // Regen при этом не останавливался: 10 тиков → +1.0
    let health = app.world().get::<Health>(player).unwrap();
    assert!((health.current - 51.0).abs() < 1e-3, "{}", health.current);
}

/// Auto-regen: +0.1 за тик пока health не меняется, стоп на max
#[test]
fn test_player_auto_regen_to_max() {
    let (mut app, player, _) = create_combat_app(42, &[]);

    {
        let world = app.world_mut();
        let mut health = world.get_mut::<Health>(player).unwrap();
        health.current = 99.0;
        world.get_mut::<Player>(player).unwrap().previous_health = 99.0;
    }

    for _ in 0..5 {
        app.update();
    }
    let health = app.world().get::<Health>(player).unwrap();
    assert!(
        (health.current - 99.5).abs() < 1e-3,
        "5 тиков regen: {}",
        health.current
    );

    // До max и дальше — clamp, рост останавливается
    for _ in 0..20 {
        app.update();
    }
    let health = app.world().get::<Health>(player).unwrap();
    assert_eq!(health.current, 100.0);
}

/// Hurt: подавляет steering и снимается на ≥500 мс
#[test]
fn test_hurt_suppresses_steering() {
    let (mut app, _player, agents) =
        create_combat_app(42, &[(AgentClass::Shambler, Vec3::new(10.0, 0.0, 10.0))]);
    let agent = agents[0];

    app.world_mut().send_event(HealthDelta {
        target: agent,
        delta: -1.0,
    });
    app.update();
    assert_eq!(behavior_state(&app, agent), BehaviorState::Hurt);

    let frozen = app.world().get::<Transform>(agent).unwrap().translation;

    // 29 тиков (< 500 мс): всё ещё Hurt, позиция не меняется
    for _ in 0..29 {
        app.update();
    }
    assert_eq!(behavior_state(&app, agent), BehaviorState::Hurt);
    let position = app.world().get::<Transform>(agent).unwrap().translation;
    assert_eq!(position, frozen);

    // Порог 500 мс пересечён → Idle, следующий тик снова погоня
    for _ in 0..3 {
        app.update();
    }
    assert_eq!(behavior_state(&app, agent), BehaviorState::Moving);
    let position = app.world().get::<Transform>(agent).unwrap().translation;
    assert_ne!(position, frozen);
}

/// MissingAsset: до AssetLoadFinished агент не обновляется
#[test]
fn test_awaiting_assets_defers_activation() {
    let mut app = create_headless_app(42);

    let mut agent = Entity::PLACEHOLDER;
    {
        let world = app.world_mut();
        spawn_player(&mut world.commands());
        world.resource_scope(|world, mut rng: Mut<DeterministicRng>| {
            agent = spawn_hostile_agent(
                &mut world.commands(),
                &mut rng.rng,
                AgentClass::Stalker,
                Vec3::new(10.0, 0.0, 10.0),
            );
        });
    }
    app.update();

    let spawn_position = app.world().get::<Transform>(agent).unwrap().translation;

    for _ in 0..10 {
        app.update();
    }
    assert_eq!(
        app.world().get::<Transform>(agent).unwrap().translation,
        spawn_position,
        "незагруженный агент не должен двигаться"
    );

    app.world_mut().send_event(AssetLoadFinished { entity: agent });
    for _ in 0..5 {
        app.update();
    }
    assert_ne!(
        app.world().get::<Transform>(agent).unwrap().translation,
        spawn_position,
        "после загрузки погоня начинается"
    );
}

/// Смерть игрока: health=0, Dying, simulation clock останавливается
#[test]
fn test_player_death_halts_clock() {
    let (mut app, player, _) = create_combat_app(42, &[]);

    app.world_mut().send_event(HealthDelta {
        target: player,
        delta: -150.0,
    });
    app.update();

    assert_eq!(app.world().get::<Health>(player).unwrap().current, 0.0);
    assert_eq!(behavior_state(&app, player), BehaviorState::Dying);
    assert!(!app.world().resource::<SimulationRunning>().0);

    let halted_at = app.world().resource::<SimClock>().now_ms;
    for _ in 0..10 {
        app.update();
    }
    assert_eq!(app.world().resource::<SimClock>().now_ms, halted_at);
}

/// Инварианты health на длинном прогоне с активной стрельбой
#[test]
fn test_health_invariants_long_run() {
    let (mut app, player, agents) = create_combat_app(
        123,
        &[
            (AgentClass::Shambler, Vec3::new(3.0, 0.0, 3.0)),
            (AgentClass::Stalker, Vec3::new(-5.0, 0.0, 8.0)),
        ],
    );

    {
        let world = app.world_mut();
        world.get_mut::<Player>(player).unwrap().camera_unlocked = true;
        let mut input = world.resource_mut::<PlayerInput>();
        input.fire = true;
        input.move_forward = true;
    }

    for tick in 0..1000 {
        app.update();

        if tick % 100 != 0 {
            continue;
        }

        let world = app.world();
        for entity in std::iter::once(player).chain(agents.iter().copied()) {
            if let Some(health) = world.get::<Health>(entity) {
                assert!(
                    health.current >= 0.0 && health.current <= health.max,
                    "Tick {}: {:?} health {} вне [0, {}]",
                    tick,
                    entity,
                    health.current,
                    health.max
                );
            }
        }

        // Симуляция могла остановиться только со смертью игрока
        let running = world.resource::<SimulationRunning>().0;
        let player_alive = world.get::<Health>(player).map(|h| h.is_alive());
        if running {
            assert_eq!(player_alive, Some(true));
        }
    }
}
