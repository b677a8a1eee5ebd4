//! LOD / visual-fidelity policy
//!
//! Чистая функция planar дистанции до игрока против порога 5.0:
//! наружу — дешёвый материал, внутрь — high-fidelity. Флаг в LodState
//! гарантирует одно переключение на пересечение порога (sub-threshold
//! jitter по одну сторону ничего не делает).

use bevy::prelude::*;

use crate::bridge::{MaterialSwapped, MaterialTier};
use crate::components::{AwaitingAssets, HostileAgent, LodState, Player, LOD_NEAR_RANGE};

pub struct LodPlugin;

impl Plugin for LodPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            switch_material_tier.in_set(crate::SimSet::Presentation),
        );
    }
}

/// Решение о переключении: Some(tier) только на пересечении порога,
/// иначе тишина (флаг уже на нужной стороне)
pub fn material_transition(player_dist: f32, lod: &mut LodState) -> Option<MaterialTier> {
    if player_dist > LOD_NEAR_RANGE && !lod.low_fidelity {
        lod.low_fidelity = true;
        return Some(MaterialTier::Low);
    }

    if player_dist <= LOD_NEAR_RANGE && lod.low_fidelity {
        lod.low_fidelity = false;
        return Some(MaterialTier::High);
    }

    None
}

/// System: переключение материала по дистанции
fn switch_material_tier(
    players: Query<&Transform, With<Player>>,
    mut swap_events: EventWriter<MaterialSwapped>,
    mut agents: Query<
        (Entity, &Transform, &mut LodState),
        (With<HostileAgent>, Without<Player>, Without<AwaitingAssets>),
    >,
) {
    let Ok(player_transform) = players.single() else {
        return;
    };
    let player_pos = player_transform.translation;

    for (entity, transform, mut lod) in agents.iter_mut() {
        let diff_x = player_pos.x - transform.translation.x;
        let diff_z = player_pos.z - transform.translation.z;
        let player_dist = (diff_x * diff_x + diff_z * diff_z).sqrt();

        if let Some(tier) = material_transition(player_dist, lod.as_mut()) {
            swap_events.write(MaterialSwapped { entity, tier });
        }
    }
}
