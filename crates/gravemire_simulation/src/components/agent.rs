//! Компоненты враждебных агентов: класс, steering, LOD, ambient voice

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::actor::{AwaitingAssets, Behavior, Health};
use crate::animation::CurrentClip;

/// Дистанция переключения low/high fidelity материала (planar, метры)
pub const LOD_NEAR_RANGE: f32 = 5.0;

/// Интервал между повторными hit frames внутри одного attack цикла (мс)
pub const ATTACK_REARM_MS: f64 = 1000.0;

/// Класс агента (два варианта с разной скоростью/дальностью/уроном)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum AgentClass {
    /// Медленный ближний класс: полный урон, короткая дальность
    Shambler,
    /// Быстрый дальний класс: урон × 2/3, длинная дальность
    Stalker,
}

impl AgentClass {
    /// Дальность атаки (planar, метры)
    pub fn attack_range(&self) -> f32 {
        match self {
            AgentClass::Shambler => 2.0,
            AgentClass::Stalker => 4.0,
        }
    }

    /// Множитель contact урона (Stalker бьёт слабее)
    pub fn damage_factor(&self) -> f32 {
        match self {
            AgentClass::Shambler => 1.0,
            AgentClass::Stalker => 1.0 / 1.5,
        }
    }

    /// Диапазон velocity_divisor (больше = медленнее погоня)
    pub fn velocity_divisor_range(&self) -> std::ops::RangeInclusive<f32> {
        match self {
            AgentClass::Shambler => 300.0..=500.0,
            AgentClass::Stalker => 200.0..=400.0,
        }
    }

    /// Скорость воспроизведения attack клипа
    pub fn attack_clip_speed(&self) -> f32 {
        match self {
            AgentClass::Shambler => 0.08,
            AgentClass::Stalker => 0.12,
        }
    }

    /// Выбор attack клипа: Shambler — случайный из трёх, Stalker — один
    pub fn pick_attack_clip(&self, rng: &mut impl Rng) -> &'static str {
        match self {
            AgentClass::Shambler => {
                const VARIANTS: [&str; 3] = ["attack1", "attack2", "attack3"];
                VARIANTS[rng.gen_range(0..VARIANTS.len())]
            }
            AgentClass::Stalker => "attack4",
        }
    }
}

/// Враждебный агент: погоня за игроком по прямой
///
/// Шаг за тик = displacement / velocity_divisor (дробный шаг К игроку,
/// не фиксированная скорость — сближение замедляется у цели; quirk
/// оригинала сохранён намеренно, тик фиксирован на 60Hz).
#[derive(Component, Debug, Clone, Reflect)]
pub struct HostileAgent {
    pub class: AgentClass,

    /// Обратная скорость погони
    pub velocity_divisor: f32,

    /// Базовый contact урон (до damage_factor класса)
    pub contact_damage: f32,

    /// Per-agent скорость walk клипа
    pub walk_clip_speed: f32,

    /// Клип текущего attack цикла (выбирается при входе в Attacking)
    pub attack_clip: &'static str,

    /// Deadline повторного hit frame внутри attack цикла
    pub rearm_at_ms: f64,
}

impl HostileAgent {
    pub fn new(class: AgentClass, rng: &mut impl Rng) -> Self {
        Self {
            class,
            velocity_divisor: rng.gen_range(class.velocity_divisor_range()),
            contact_damage: rng.gen_range(0.4..=0.6),
            // randInt(4, 10) / 100 из оригинала
            walk_clip_speed: rng.gen_range(4..=10) as f32 / 100.0,
            attack_clip: "attack1",
            rearm_at_ms: 0.0,
        }
    }

    /// Урон по игроку за один hit frame (отрицательная HealthDelta)
    pub fn strike_damage(&self) -> f32 {
        self.contact_damage * self.class.damage_factor()
    }
}

/// LOD состояние: какой материал сейчас на агенте
///
/// Флаг нужен чтобы переключение срабатывало один раз на пересечение
/// порога, а не каждый тик пока стоим по одну сторону.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct LodState {
    /// Сейчас применён дешёвый материал (агенты спавнятся low)
    pub low_fidelity: bool,
}

impl Default for LodState {
    fn default() -> Self {
        Self { low_fidelity: true }
    }
}

/// Ambient voice scheduler: idle рык с jittered интервалом
///
/// После каждого срабатывания следующий deadline берётся случайно из
/// [1000, 10000] мс. Cue не играет если канал занят или агент Dying/Dead.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct AmbientVoice {
    pub next_cue_at_ms: f64,

    /// Зеркало is_playing канала у audio collaborator (host обновляет)
    pub channel_busy: bool,
}

impl Default for AmbientVoice {
    fn default() -> Self {
        Self {
            next_cue_at_ms: 0.0,
            channel_busy: false,
        }
    }
}

/// Spawn helper: агент создаётся когда host начал грузить его mesh
/// (AwaitingAssets снимается по AssetLoadFinished)
pub fn spawn_hostile_agent(
    commands: &mut Commands,
    rng: &mut impl Rng,
    class: AgentClass,
    position: Vec3,
) -> Entity {
    // randInt(3, 6) HP из оригинала
    let health = Health::new(rng.gen_range(3..=6) as f32);

    commands
        .spawn((
            Transform::from_translation(position),
            Behavior::default(),
            health,
            HostileAgent::new(class, rng),
            LodState::default(),
            AmbientVoice::default(),
            CurrentClip::default(),
            AwaitingAssets,
        ))
        .id()
}
