//! Projectile pool: fixed-capacity арена слотов с переиспользованием
//!
//! Выстрелы ложатся в слоты по кольцевому курсору (порядок стрельбы
//! сохраняется, память ограничена POOL_CAPACITY при любом темпе огня).

use bevy::prelude::*;

use crate::components::{AwaitingAssets, Behavior, HostileAgent};
use super::HealthDelta;

pub const POOL_CAPACITY: usize = 64;

/// Шаг пули за тик (единицы мира)
pub const PROJECTILE_STEP: f32 = 2.0;

/// Дальность, после которой слот считается истёкшим
pub const PROJECTILE_MAX_RANGE: f32 = 100.0;

/// Урон одной пули
pub const PROJECTILE_DAMAGE: f32 = 1.0;

/// Радиус попадания по агенту
pub const PROJECTILE_HIT_RADIUS: f32 = 1.0;

/// Одна пуля (слот арены)
#[derive(Debug, Clone, Copy, Reflect)]
pub struct Projectile {
    pub position: Vec3,
    pub direction: Vec3,
    pub origin: Vec3,
    pub live: bool,
}

/// Пул пуль игрока
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct ProjectilePool {
    slots: Vec<Projectile>,
    /// Кольцевой курсор следующего слота
    cursor: usize,
}

impl ProjectilePool {
    /// Спавн пули: арена растёт до POOL_CAPACITY, дальше кольцевой
    /// курсор перезаписывает самый старый слот независимо от live
    /// (старейшая пуля при realistic темпах огня давно истекла)
    pub fn spawn(&mut self, origin: Vec3, direction: Vec3) {
        let projectile = Projectile {
            position: origin,
            direction,
            origin,
            live: true,
        };

        if self.slots.len() < POOL_CAPACITY {
            self.slots.push(projectile);
            self.cursor = self.slots.len() % POOL_CAPACITY;
        } else {
            self.slots[self.cursor] = projectile;
            self.cursor = (self.cursor + 1) % POOL_CAPACITY;
        }
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|p| p.live).count()
    }

    pub fn iter_live_mut(&mut self) -> impl Iterator<Item = &mut Projectile> {
        self.slots.iter_mut().filter(|p| p.live)
    }
}

/// System: полёт пуль + истечение по дальности
pub fn advance_projectiles(mut pools: Query<&mut ProjectilePool>) {
    for mut pool in pools.iter_mut() {
        for projectile in pool.iter_live_mut() {
            projectile.position += projectile.direction * PROJECTILE_STEP;

            if projectile.position.distance(projectile.origin) > PROJECTILE_MAX_RANGE {
                projectile.live = false;
            }
        }
    }
}

/// System: попадания пуль по агентам
///
/// Dying/Dead и ещё не загруженные агенты прозрачны для пуль
/// (тело уже отцеплено или ещё не добавлено).
pub fn collide_projectiles(
    mut pools: Query<&mut ProjectilePool>,
    agents: Query<(Entity, &Transform, &Behavior), (With<HostileAgent>, Without<AwaitingAssets>)>,
    mut damage_events: EventWriter<HealthDelta>,
) {
    for mut pool in pools.iter_mut() {
        for projectile in pool.iter_live_mut() {
            for (entity, transform, behavior) in agents.iter() {
                if behavior.is_dead_or_dying() {
                    continue;
                }

                if projectile.position.distance(transform.translation) < PROJECTILE_HIT_RADIUS {
                    damage_events.write(HealthDelta {
                        target: entity,
                        delta: -PROJECTILE_DAMAGE,
                    });
                    projectile.live = false;
                    break;
                }
            }
        }
    }
}
