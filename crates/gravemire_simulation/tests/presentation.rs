//! Presentation политики на headless App
//!
//! Прогоняет настоящие системы (не их копии) и считает bridge события:
//! - LOD: MaterialSwapped ровно один раз на пересечение порога 5.0
//! - анимация: ClipRequested подавляется пока состояние не сменилось
//! - ambient: рык по deadline, busy канал глушит но перевзводит интервал

use bevy::ecs::event::EventCursor;
use bevy::prelude::*;
use gravemire_simulation::bridge::{
    AssetLoadFinished, AudioCueRequested, ClipRequested, MaterialSwapped, MaterialTier,
};
use gravemire_simulation::*;

/// App + игрок + один агент (ещё НЕ активированный — тесты сами решают
/// когда слать AssetLoadFinished)
fn create_scene(seed: u64, class: AgentClass, position: Vec3) -> (App, Entity, Entity) {
    let mut app = create_headless_app(seed);

    let player;
    let mut agent = Entity::PLACEHOLDER;
    {
        let world = app.world_mut();
        player = spawn_player(&mut world.commands());
        world.resource_scope(|world, mut rng: Mut<DeterministicRng>| {
            agent = spawn_hostile_agent(&mut world.commands(), &mut rng.rng, class, position);
        });
    }
    app.update(); // flush spawn команд

    (app, player, agent)
}

/// Тикает `ticks` раз, собирая MaterialSwapped по агенту после каждого
/// тика (double-buffer событий не успевает их уронить)
fn collect_swaps(
    app: &mut App,
    cursor: &mut EventCursor<MaterialSwapped>,
    agent: Entity,
    ticks: usize,
) -> Vec<MaterialTier> {
    let mut tiers = Vec::new();
    for _ in 0..ticks {
        app.update();
        let events = app.world().resource::<Events<MaterialSwapped>>();
        tiers.extend(cursor.read(events).filter(|e| e.entity == agent).map(|e| e.tier));
    }
    tiers
}

fn collect_clips(
    app: &mut App,
    cursor: &mut EventCursor<ClipRequested>,
    agent: Entity,
    ticks: usize,
) -> Vec<&'static str> {
    let mut clips = Vec::new();
    for _ in 0..ticks {
        app.update();
        let events = app.world().resource::<Events<ClipRequested>>();
        clips.extend(cursor.read(events).filter(|e| e.entity == agent).map(|e| e.clip));
    }
    clips
}

fn count_growls(app: &mut App, cursor: &mut EventCursor<AudioCueRequested>, ticks: usize) -> usize {
    let mut growls = 0;
    for _ in 0..ticks {
        app.update();
        let events = app.world().resource::<Events<AudioCueRequested>>();
        growls += cursor
            .read(events)
            .filter(|e| e.path.starts_with("assets/sound/agentGrowl"))
            .count();
    }
    growls
}

#[test]
fn test_material_swap_once_per_crossing() {
    let (mut app, player, agent) = create_scene(42, AgentClass::Shambler, Vec3::ZERO);
    app.world_mut().send_event(AssetLoadFinished { entity: agent });

    let mut cursor: EventCursor<MaterialSwapped> =
        app.world().resource::<Events<MaterialSwapped>>().get_cursor();

    // Спавн low, игрок далеко (~22 planar): пересечений нет
    let swaps = collect_swaps(&mut app, &mut cursor, agent, 3);
    assert!(swaps.is_empty(), "далёкий агент уже low: {:?}", swaps);

    // Игрок телепортируется вплотную: ровно одно переключение на high
    app.world_mut()
        .get_mut::<Transform>(player)
        .unwrap()
        .translation = Vec3::new(1.0, 10.0, 1.0);
    let swaps = collect_swaps(&mut app, &mut cursor, agent, 5);
    assert_eq!(swaps, vec![MaterialTier::High]);

    // Игрок уходит: ровно одно переключение обратно на low
    app.world_mut()
        .get_mut::<Transform>(player)
        .unwrap()
        .translation = Vec3::new(30.0, 10.0, 30.0);
    let swaps = collect_swaps(&mut app, &mut cursor, agent, 5);
    assert_eq!(swaps, vec![MaterialTier::Low]);
}

#[test]
fn test_clip_requests_suppressed_until_state_change() {
    // Агент далеко: Moving с первого активного тика
    let (mut app, _player, agent) =
        create_scene(42, AgentClass::Shambler, Vec3::new(30.0, 0.0, 30.0));

    let mut cursor: EventCursor<ClipRequested> =
        app.world().resource::<Events<ClipRequested>>().get_cursor();
    app.world_mut().send_event(AssetLoadFinished { entity: agent });

    // 30 тиков погони: walk запрошен один раз, дальше подавлен
    let clips = collect_clips(&mut app, &mut cursor, agent, 30);
    assert_eq!(clips, vec!["walk"]);

    // Урон → one-shot gethit; после recovery снова walk (новый запрос,
    // CurrentClip сменился)
    app.world_mut().send_event(HealthDelta {
        target: agent,
        delta: -1.0,
    });
    let clips = collect_clips(&mut app, &mut cursor, agent, 40);
    assert_eq!(clips, vec!["gethit", "walk"]);
}

#[test]
fn test_growl_fires_and_rearms_jittered() {
    let (mut app, _player, agent) =
        create_scene(42, AgentClass::Shambler, Vec3::new(30.0, 0.0, 30.0));

    let mut cursor: EventCursor<AudioCueRequested> =
        app.world().resource::<Events<AudioCueRequested>>().get_cursor();
    app.world_mut().send_event(AssetLoadFinished { entity: agent });

    // Стартовый deadline 0 → ровно один рык, интервал перевзведён
    let growls = count_growls(&mut app, &mut cursor, 5);
    assert_eq!(growls, 1);

    let now = app.world().resource::<SimClock>().now_ms;
    let voice = app.world().get::<AmbientVoice>(agent).unwrap();
    assert!(
        voice.next_cue_at_ms >= 1000.0 && voice.next_cue_at_ms <= now + 10000.0,
        "deadline вне jitter диапазона: {}",
        voice.next_cue_at_ms
    );
}

#[test]
fn test_busy_channel_suppresses_growl_but_rearms() {
    let (mut app, _player, agent) =
        create_scene(7, AgentClass::Stalker, Vec3::new(30.0, 0.0, 30.0));
    app.world_mut()
        .get_mut::<AmbientVoice>(agent)
        .unwrap()
        .channel_busy = true;

    let mut cursor: EventCursor<AudioCueRequested> =
        app.world().resource::<Events<AudioCueRequested>>().get_cursor();
    app.world_mut().send_event(AssetLoadFinished { entity: agent });

    let growls = count_growls(&mut app, &mut cursor, 60);
    assert_eq!(growls, 0, "busy канал: cue не уходит");

    // Но интервал всё равно перевзведён (иначе рык ломился бы каждый тик)
    let voice = app.world().get::<AmbientVoice>(agent).unwrap();
    assert!(voice.next_cue_at_ms >= 1000.0);
}
