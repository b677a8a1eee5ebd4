//! Combat module: health resolver, оружие, projectile pool
//!
//! ECS ответственность:
//! - Game state: Health, Behavior, Weapon charge/cooldowns
//! - Combat rules: clamp урона, смерть ровно один раз, fire-rate gate
//! - Events: HealthDelta (вход), ActorDied / WeaponFired (выход)
//!
//! Host ответственность:
//! - визуальный kick/muzzle flash (читает Weapon.kick_until_ms)
//! - звук по AudioCueRequested

use bevy::prelude::*;

pub mod health;
pub mod projectile;
pub mod weapon;

// Re-export основных типов
pub use health::{ActorDied, HealthDelta, PLAYER_REGEN_PER_TICK};
pub use projectile::{Projectile, ProjectilePool, POOL_CAPACITY, PROJECTILE_DAMAGE};
pub use weapon::{Loadout, LoadoutKind, Weapon, WeaponFireIntent, WeaponFired, KICK_MS};

/// Combat Plugin
///
/// Порядок выполнения (внутри SimSet::Combat, после AI):
/// 1. resolve_fire_intents — charge/fire-rate gate, spawn projectile
/// 2. advance_projectiles / collide_projectiles — полёт и попадания
/// 3. player_auto_regen — пассивный +0.1 при неизменном health
/// 4. sync_previous_health — фиксация health до применения урона тика
/// 5. apply_health_deltas — clamp, Hurt/Dying переходы, смерть один раз
/// 6. recover_from_hurt — Hurt снимается на ≥500 мс
/// 7. settle_dead — Dying → Dead на ≥3000 мс, MeshRemoved
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<HealthDelta>()
            .add_event::<ActorDied>()
            .add_event::<WeaponFireIntent>()
            .add_event::<WeaponFired>();

        app.add_systems(
            FixedUpdate,
            (
                weapon::resolve_fire_intents,
                projectile::advance_projectiles,
                projectile::collide_projectiles,
                health::player_auto_regen,
                health::sync_previous_health,
                health::apply_health_deltas,
                health::recover_from_hurt,
                health::settle_dead,
            )
                .chain()
                .in_set(crate::SimSet::Combat),
        );
    }
}
