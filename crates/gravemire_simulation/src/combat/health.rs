//! Health resolver: применение урона/лечения, смерть, Hurt recovery
//!
//! Все изменения здоровья проходят через HealthDelta события — один
//! вход, один clamp, одна точка перехода в Dying.

use bevy::prelude::*;

use crate::bridge::{
    AudioCueRequested, BodyDetached, DebugColliderRemoved, MeshRemoved, Overlay, OverlayToggled,
};
use crate::components::{Behavior, BehaviorState, Health, HostileAgent, Player, PlayerAudio};
use crate::{SimClock, SimulationRunning};

/// Пассивная регенерация игрока за тик бездействия
pub const PLAYER_REGEN_PER_TICK: f32 = 0.1;

/// Событие: изменение здоровья (отрицательная = урон, положительная = лечение)
#[derive(Event, Debug, Clone)]
pub struct HealthDelta {
    pub target: Entity,
    pub delta: f32,
}

/// Событие: актор перешёл в Dying (health пересёк 0)
#[derive(Event, Debug, Clone)]
pub struct ActorDied {
    pub entity: Entity,
}

/// System: применение HealthDelta событий
///
/// 1. Dying/Dead цель — no-op (повторный урон по мёртвому идемпотентен)
/// 2. clamp в [0, max]
/// 3. Пересечение нуля → Dying: у агента отцепляется тело и debug
///    коллайдер, играет death growl; у игрока останавливается весь
///    simulation clock (игрок не деспавнится)
/// 4. Урон по живому → Hurt (снимется через 500 мс)
pub fn apply_health_deltas(
    mut delta_events: EventReader<HealthDelta>,
    mut died_events: EventWriter<ActorDied>,
    mut body_events: EventWriter<BodyDetached>,
    mut collider_events: EventWriter<DebugColliderRemoved>,
    mut audio_events: EventWriter<AudioCueRequested>,
    mut overlay_events: EventWriter<OverlayToggled>,
    mut running: ResMut<SimulationRunning>,
    player_audio: Res<PlayerAudio>,
    clock: Res<SimClock>,
    mut actors: Query<(&mut Health, &mut Behavior, Option<&Player>)>,
) {
    for event in delta_events.read() {
        let Ok((mut health, mut behavior, player)) = actors.get_mut(event.target) else {
            crate::log_warning(&format!(
                "HealthDelta: target {:?} has no Health/Behavior",
                event.target
            ));
            continue;
        };

        // Мёртвых не лечим и не добиваем
        if behavior.is_dead_or_dying() {
            continue;
        }

        let died = health.apply(event.delta);

        if died {
            behavior.enter(BehaviorState::Dying, clock.now_ms);
            died_events.write(ActorDied {
                entity: event.target,
            });

            if player.is_some() {
                // Игрок: глобальный стоп симуляции, HUD прячется
                running.0 = false;
                overlay_events.write(OverlayToggled {
                    overlay: Overlay::Health,
                    visible: false,
                });
                crate::log_info("Player died, simulation halted");
            } else {
                body_events.write(BodyDetached {
                    entity: event.target,
                });
                collider_events.write(DebugColliderRemoved {
                    entity: event.target,
                });
                audio_events.write(AudioCueRequested {
                    path: "assets/sound/agentDeath.mp3".to_string(),
                    looped: false,
                    volume: 0.5,
                });
                crate::log_info(&format!("Agent {:?} is dying", event.target));
            }
            continue;
        }

        if event.delta < 0.0 {
            behavior.enter(BehaviorState::Hurt, clock.now_ms);

            if player.is_some() {
                overlay_events.write(OverlayToggled {
                    overlay: Overlay::Health,
                    visible: true,
                });
            }
        }

        // Near-death cue: любое изменение ниже max, пока канал свободен
        if player.is_some() && health.current < health.max && !player_audio.near_death_busy {
            audio_events.write(AudioCueRequested {
                path: "assets/sound/nearDeath.mp3".to_string(),
                looped: false,
                volume: 0.3,
            });
        }
    }
}

/// System: пассивная регенерация игрока
///
/// Health не менялся с прошлого тика и ниже max → +0.1. Применяется
/// напрямую (не через событие): sync_previous_health после нас фиксирует
/// уже подлеченное значение, поэтому regen продолжается каждый тик,
/// а внешний урон (применяется после sync) сбивает условие на следующий.
pub fn player_auto_regen(
    player_audio: Res<PlayerAudio>,
    mut audio_events: EventWriter<AudioCueRequested>,
    mut players: Query<(&mut Health, &Player, &Behavior)>,
) {
    for (mut health, player, behavior) in players.iter_mut() {
        if behavior.is_dead_or_dying() {
            continue;
        }

        if player.previous_health == health.current && health.current < health.max {
            health.apply(PLAYER_REGEN_PER_TICK);

            // "Heartbeat" раненого: пока regen идёт ниже max, near-death
            // cue перезапускается на каждом тике со свободным каналом
            if health.current < health.max && !player_audio.near_death_busy {
                audio_events.write(AudioCueRequested {
                    path: "assets/sound/nearDeath.mp3".to_string(),
                    looped: false,
                    volume: 0.3,
                });
            }
        }
    }
}

/// System: фиксация health игрока до применения урона этого тика
pub fn sync_previous_health(mut players: Query<(&Health, &mut Player)>) {
    for (health, mut player) in players.iter_mut() {
        player.previous_health = health.current;
    }
}

/// System: Hurt снимается на ≥500 мс → Idle
/// (следующий тик distance/input re-evaluation выберет реальное состояние)
pub fn recover_from_hurt(clock: Res<SimClock>, mut actors: Query<&mut Behavior>) {
    for mut behavior in actors.iter_mut() {
        if behavior.hurt_expired(clock.now_ms) {
            behavior.enter(BehaviorState::Idle, clock.now_ms);
        }
    }
}

/// System: Dying → Dead на ≥3000 мс
///
/// Mesh убирается из рендера, труп-entity остаётся в мире (terminal state).
pub fn settle_dead(
    clock: Res<SimClock>,
    mut mesh_events: EventWriter<MeshRemoved>,
    mut agents: Query<(Entity, &mut Behavior), With<HostileAgent>>,
) {
    for (entity, mut behavior) in agents.iter_mut() {
        if behavior.death_linger_expired(clock.now_ms) {
            behavior.enter(BehaviorState::Dead, clock.now_ms);
            mesh_events.write(MeshRemoved { entity });
            crate::log_info(&format!("Agent {:?} removed from scene", entity));
        }
    }
}
