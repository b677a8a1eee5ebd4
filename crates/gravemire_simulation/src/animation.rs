//! Animation state selector
//!
//! Отображает Behavior → именованный клип. Повторный запрос того же
//! клипа подавляется (CurrentClip), cross-fade фиксированный 0.5.
//! One-shot клипы (gethit, death*) не зациклены и замирают на последнем
//! кадре у animation collaborator; walk/attack — loop.

use bevy::prelude::*;
use rand::Rng;

use crate::bridge::ClipRequested;
use crate::components::{AwaitingAssets, Behavior, BehaviorState, HostileAgent};
use crate::DeterministicRng;

/// Длительность cross-fade между клипами
pub const CLIP_BLEND: f32 = 0.5;

/// Скорость hurt клипа
pub const HURT_CLIP_SPEED: f32 = 0.04;

/// Скорость death клипов
pub const DEATH_CLIP_SPEED: f32 = 0.08;

/// Последний запрошенный клип (подавление повторного re-trigger)
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct CurrentClip {
    pub name: Option<&'static str>,
}

pub struct AnimationPlugin;

impl Plugin for AnimationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            select_agent_clips.in_set(crate::SimSet::Presentation),
        );
    }
}

/// System: выбор клипа агента из текущего Behavior
fn select_agent_clips(
    mut rng: ResMut<DeterministicRng>,
    mut clip_events: EventWriter<ClipRequested>,
    mut agents: Query<
        (Entity, &Behavior, &HostileAgent, &mut CurrentClip),
        Without<AwaitingAssets>,
    >,
) {
    for (entity, behavior, agent, mut current) in agents.iter_mut() {
        let desired: Option<(&'static str, f32, bool)> = match behavior.state {
            BehaviorState::Moving => Some(("walk", agent.walk_clip_speed, true)),
            BehaviorState::Attacking { .. } => {
                Some((agent.attack_clip, agent.class.attack_clip_speed(), true))
            }
            BehaviorState::Hurt => Some(("gethit", HURT_CLIP_SPEED, false)),
            BehaviorState::Dying => {
                if matches!(current.name, Some("death1") | Some("death2")) {
                    // Death клип уже играет, не перетираем
                    None
                } else {
                    let clip = if rng.rng.gen_bool(0.5) { "death1" } else { "death2" };
                    Some((clip, DEATH_CLIP_SPEED, false))
                }
            }
            // Idle живёт ≤1 тик (re-evaluation), Dead меш уже убирается
            BehaviorState::Idle | BehaviorState::Dead => None,
        };

        let Some((clip, speed, looped)) = desired else {
            continue;
        };

        if current.name == Some(clip) {
            continue;
        }

        clip_events.write(ClipRequested {
            entity,
            clip,
            speed,
            looped,
            blend: CLIP_BLEND,
        });
        current.name = Some(clip);
    }
}
