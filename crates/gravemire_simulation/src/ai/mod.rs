//! AI module: distance-driven погоня за игроком
//!
//! Прямолинейный pursuit без pathfinding — агент всегда шагает
//! по displacement к игроку (y игнорируется).

use bevy::prelude::*;

pub mod pursuit;

pub use pursuit::normalize_angle;

/// AI Plugin
///
/// Один chained проход по агентам в SimSet::Ai:
/// steering → facing → FSM переходы → contact урон на hit frame.
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            pursuit::agent_pursuit.in_set(crate::SimSet::Ai),
        );
    }
}
