//! Компоненты игрока: маркер, камера, зеркало audio каналов

use bevy::prelude::*;

use super::actor::{Behavior, Health};
use crate::combat::{ProjectilePool, Weapon};

/// Базовая скорость игрока (единиц за тик)
pub const PLAYER_STEP: f32 = 0.1;

/// Стартовая позиция игрока
pub const PLAYER_SPAWN: Vec3 = Vec3::new(-7.0, 10.0, 21.0);

/// Вертикальная скорость прыжка (отдаётся физике через bridge)
pub const JUMP_VELOCITY: f32 = 4.0;

/// Маркер-компонент игрока + его контроллерное состояние
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Player {
    /// Free-look разрешён (курсор был отцентрован)
    pub camera_unlocked: bool,

    /// Health прошлого тика (для auto-regen "no-change" условия)
    pub previous_health: f32,

    /// Было ли движение в этом тике (head bob)
    pub is_moving: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            camera_unlocked: false,
            previous_health: 100.0,
            is_moving: false,
        }
    }
}

/// Камера-rig: yaw/pitch free-look + head bob offset
///
/// Камера принадлежит рендеру; симуляция держит только ориентацию
/// (источник направления выстрела) и bob offset который host читает.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct CameraRig {
    /// Горизонтальный угол (радианы)
    pub yaw: f32,

    /// Вертикальный угол (радианы, clamp ±60°)
    pub pitch: f32,

    /// Фаза head bob (растёт пока игрок движется)
    pub bob_phase: f32,

    /// Вертикальный offset камеры над телом (host читает каждый тик)
    pub height_offset: f32,
}

impl CameraRig {
    /// Направление взгляда (полное, с pitch) — направление выстрела
    pub fn look_direction(&self) -> Vec3 {
        let rotation = Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch);
        rotation * Vec3::NEG_Z
    }

    /// Planar направление движения (pitch игнорируется)
    pub fn forward_planar(&self) -> Vec3 {
        let dir = Quat::from_rotation_y(self.yaw) * Vec3::NEG_Z;
        Vec3::new(dir.x, 0.0, dir.z).normalize_or_zero()
    }
}

/// Зеркало is_playing каналов игрока у audio collaborator
///
/// Host выставляет флаги; симуляция только читает (cue не дублируется
/// пока канал занят).
#[derive(Resource, Debug, Default, Clone)]
pub struct PlayerAudio {
    pub near_death_busy: bool,
    pub switch_busy: bool,
    /// Три фоновые музыкальные дорожки
    pub music_busy: [bool; 3],
}

impl PlayerAudio {
    pub fn any_music_playing(&self) -> bool {
        self.music_busy.iter().any(|busy| *busy)
    }
}

/// Spawn helper: игрок создаётся один раз за сессию и никогда не деспавнится
pub fn spawn_player(commands: &mut Commands) -> Entity {
    commands
        .spawn((
            Transform::from_translation(PLAYER_SPAWN),
            Behavior::default(),
            Health::new(100.0),
            Player::default(),
            CameraRig::default(),
            Weapon::default(),
            ProjectilePool::default(),
        ))
        .id()
}
