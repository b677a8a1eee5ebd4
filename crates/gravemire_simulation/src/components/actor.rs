//! Базовые компоненты акторов: Health, Behavior (FSM state + таймер)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Hurt снимается автоматически через 500 мс
pub const HURT_RECOVERY_MS: f64 = 500.0;

/// Dying → Dead (труп убирается из рендера) через 3000 мс
pub const DEATH_LINGER_MS: f64 = 3000.0;

/// Здоровье актора
///
/// Инвариант: 0.0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// Применяет delta (отрицательная = урон, положительная = лечение)
    /// с clamp в [0, max]. Возвращает true если этим вызовом health
    /// пересёк 0 сверху вниз (смерть — ровно один раз).
    pub fn apply(&mut self, delta: f32) -> bool {
        let was_alive = self.is_alive();
        self.current = (self.current + delta).clamp(0.0, self.max);
        was_alive && !self.is_alive()
    }
}

/// Фаза атаки (вместо сравнения имён анимаций строками)
///
/// WindUp — замах: клип запущен, урон ещё не нанесён.
/// ActiveHit — hit frame: урон применяется ровно на переходе WindUp → ActiveHit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum AttackPhase {
    WindUp,
    ActiveHit,
}

/// Поведенческое состояние актора (ровно одно активно)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum BehaviorState {
    Idle,
    Moving,
    Attacking { phase: AttackPhase },
    Hurt,
    Dying,
    Dead,
}

/// FSM состояние + момент входа (мс simulation clock)
///
/// entered_at_ms используется для timed transitions:
/// Hurt → (500 мс) → re-evaluation, Dying → (3000 мс) → Dead.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Behavior {
    pub state: BehaviorState,
    pub entered_at_ms: f64,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            state: BehaviorState::Idle,
            entered_at_ms: 0.0,
        }
    }
}

impl Behavior {
    /// Переход в новое состояние (сбрасывает таймер состояния)
    pub fn enter(&mut self, state: BehaviorState, now_ms: f64) {
        self.state = state;
        self.entered_at_ms = now_ms;
    }

    /// Сколько мс актор находится в текущем состоянии
    pub fn elapsed_ms(&self, now_ms: f64) -> f64 {
        now_ms - self.entered_at_ms
    }

    pub fn is_attacking(&self) -> bool {
        matches!(self.state, BehaviorState::Attacking { .. })
    }

    /// Hurt/Dying/Dead подавляют steering и атаку
    pub fn is_incapacitated(&self) -> bool {
        matches!(
            self.state,
            BehaviorState::Hurt | BehaviorState::Dying | BehaviorState::Dead
        )
    }

    pub fn is_dead_or_dying(&self) -> bool {
        matches!(self.state, BehaviorState::Dying | BehaviorState::Dead)
    }

    /// Hurt истёк? (граница: ровно на 500 мс — уже истёк)
    pub fn hurt_expired(&self, now_ms: f64) -> bool {
        self.state == BehaviorState::Hurt && self.elapsed_ms(now_ms) >= HURT_RECOVERY_MS
    }

    /// Пора убирать труп? (граница: ровно на 3000 мс)
    pub fn death_linger_expired(&self, now_ms: f64) -> bool {
        self.state == BehaviorState::Dying && self.elapsed_ms(now_ms) >= DEATH_LINGER_MS
    }
}

/// Маркер: mesh/физика актора ещё грузятся host-ом
///
/// Все update системы пропускают такого актора (MissingAsset — не ошибка,
/// а отложенная активация). Снимается по AssetLoadFinished событию.
#[derive(Component, Debug, Default)]
pub struct AwaitingAssets;
