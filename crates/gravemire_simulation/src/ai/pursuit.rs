//! Погоня и атака враждебного агента
//!
//! Каждый тик (пока не Hurt/Dying/Dead):
//! - planar displacement до игрока, шаг тела = displacement / velocity_divisor
//!   (дробный шаг: чем ближе, тем меньше шаг — quirk оригинала сохранён,
//!   тик фиксирован на 60Hz, см. DESIGN.md)
//! - ориентация на игрока по planar углу, нормализованному в (-π, π]
//! - FSM: вход в Attacking играет замах (WindUp), урон наносится ровно на
//!   переходе WindUp → ActiveHit; пока ActiveHit держится, повторный hit
//!   frame возможен только после re-arm интервала

use bevy::prelude::*;
use rand::Rng;

use crate::combat::HealthDelta;
use crate::components::{
    AttackPhase, AwaitingAssets, Behavior, BehaviorState, HostileAgent, Player, ATTACK_REARM_MS,
};
use crate::{DeterministicRng, SimClock};

/// Нормализация угла в (-π, π]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};

    let mut wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped += TAU;
    }
    wrapped
}

/// System: полный AI проход по агентам
pub fn agent_pursuit(
    clock: Res<SimClock>,
    mut rng: ResMut<DeterministicRng>,
    mut damage_events: EventWriter<HealthDelta>,
    players: Query<(Entity, &Transform, &Behavior), With<Player>>,
    mut agents: Query<
        (&mut Transform, &mut Behavior, &mut HostileAgent),
        (Without<Player>, Without<AwaitingAssets>),
    >,
) {
    let Ok((player_entity, player_transform, player_behavior)) = players.single() else {
        return;
    };
    // Снапшот позиции игрока на начало прохода (single-writer-per-tick)
    let player_pos = player_transform.translation;
    let now = clock.now_ms;

    for (mut transform, mut behavior, mut agent) in agents.iter_mut() {
        if behavior.state == BehaviorState::Dead {
            continue;
        }

        let diff_x = player_pos.x - transform.translation.x;
        let diff_z = player_pos.z - transform.translation.z;
        let player_dist = (diff_x * diff_x + diff_z * diff_z).sqrt();

        // Steering: Attacking/Hurt/Dying стоят на месте
        if !behavior.is_attacking() && !behavior.is_incapacitated() {
            transform.translation.x += diff_x / agent.velocity_divisor;
            transform.translation.z += diff_z / agent.velocity_divisor;
        }

        // Facing: мёртвые и умирающие не доворачиваются
        if !behavior.is_dead_or_dying() {
            let angle = normalize_angle(diff_x.atan2(diff_z));
            transform.rotation = Quat::from_rotation_y(angle);
        }

        // Hurt/Dying: ни атак, ни переходов (recovery в combat::health)
        if behavior.is_incapacitated() {
            continue;
        }

        if player_dist < agent.class.attack_range() {
            // Игрок-труп не интересен (симуляция всё равно остановлена)
            if player_behavior.is_dead_or_dying() {
                continue;
            }

            match behavior.state {
                BehaviorState::Attacking {
                    phase: AttackPhase::WindUp,
                } => {
                    // Hit frame: урон ровно один раз на re-entry
                    behavior.enter(
                        BehaviorState::Attacking {
                            phase: AttackPhase::ActiveHit,
                        },
                        now,
                    );
                    agent.rearm_at_ms = now + ATTACK_REARM_MS;
                    damage_events.write(HealthDelta {
                        target: player_entity,
                        delta: -agent.strike_damage(),
                    });
                }
                BehaviorState::Attacking {
                    phase: AttackPhase::ActiveHit,
                } => {
                    // Удержание в ActiveHit урона не даёт; новый цикл
                    // только после re-arm
                    if now >= agent.rearm_at_ms {
                        agent.attack_clip = agent.class.pick_attack_clip(&mut rng.rng);
                        behavior.enter(
                            BehaviorState::Attacking {
                                phase: AttackPhase::WindUp,
                            },
                            now,
                        );
                    }
                }
                _ => {
                    // Вход в атаку: замах, урона ещё нет
                    agent.attack_clip = agent.class.pick_attack_clip(&mut rng.rng);
                    behavior.enter(
                        BehaviorState::Attacking {
                            phase: AttackPhase::WindUp,
                        },
                        now,
                    );
                }
            }
        } else if behavior.state != BehaviorState::Moving {
            // Вне дальности: Idle/Attacking → Moving (погоня продолжается)
            behavior.enter(BehaviorState::Moving, now);
        }
    }
}
