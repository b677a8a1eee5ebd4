//! Player controller: input → движение, free-look, триггеры оружия
//!
//! Вместо глобальных синглтонов (gun/window state) — явный PlayerInput
//! resource: host пишет снапшот ввода, контроллер читает его в свой тик.

use bevy::prelude::*;

use crate::bridge::{AudioCueRequested, JumpRequested, Overlay, OverlayToggled};
use crate::combat::{Weapon, WeaponFireIntent};
use crate::components::{
    Behavior, BehaviorState, CameraRig, Player, PlayerAudio, JUMP_VELOCITY, PLAYER_STEP,
};
use crate::SimClock;

/// Чувствительность мыши (градусы на пиксель)
pub const LOOK_SENSITIVITY_DEG: f32 = 0.1;

/// Clamp вертикального угла камеры
pub const PITCH_LIMIT_DEG: f32 = 60.0;

/// Ниже этой высоты тело телепортируется на respawn точку
pub const FALL_RESPAWN_Y: f32 = -5.0;

/// Снапшот ввода за тик (host-written)
///
/// fire/steady_aim — уровни (зажатая кнопка), reload/switch/jump —
/// фронты (host сбрасывает после тика).
#[derive(Resource, Debug, Default, Clone)]
pub struct PlayerInput {
    pub move_forward: bool,
    pub move_backward: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,

    /// Смещение курсора за тик (пиксели)
    pub look_delta: Vec2,

    pub fire: bool,
    pub reload: bool,
    pub switch_weapon: bool,
    pub steady_aim: bool,
    pub jump: bool,

    /// Курсор в центральном окне экрана (±10 px)
    pub cursor_centered: bool,
}

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerInput>().add_systems(
            FixedUpdate,
            (
                update_camera_unlock,
                apply_look,
                apply_movement,
                handle_triggers,
            )
                .chain()
                .in_set(crate::SimSet::Player),
        );
    }
}

/// System: free-look разблокируется когда курсор отцентрован
///
/// До разблокировки виден cursor-оверлей; событие шлётся только при
/// смене видимости, не каждый тик.
fn update_camera_unlock(
    input: Res<PlayerInput>,
    mut overlay_events: EventWriter<OverlayToggled>,
    mut players: Query<&mut Player>,
    mut last_visible: Local<Option<bool>>,
) {
    let Ok(mut player) = players.single_mut() else {
        return;
    };

    if player.camera_unlocked {
        return;
    }

    let visible = if input.cursor_centered {
        player.camera_unlocked = true;
        false
    } else {
        true
    };

    if *last_visible != Some(visible) {
        *last_visible = Some(visible);
        overlay_events.write(OverlayToggled {
            overlay: Overlay::Cursor,
            visible,
        });
    }
}

/// System: yaw/pitch из смещения курсора, pitch clamp ±60°
fn apply_look(input: Res<PlayerInput>, mut players: Query<(&Player, &mut CameraRig)>) {
    let Ok((player, mut rig)) = players.single_mut() else {
        return;
    };

    if !player.camera_unlocked {
        return;
    }

    rig.yaw -= (input.look_delta.x * LOOK_SENSITIVITY_DEG).to_radians();
    rig.pitch -= (input.look_delta.y * LOOK_SENSITIVITY_DEG).to_radians();

    let limit = PITCH_LIMIT_DEG.to_radians();
    rig.pitch = rig.pitch.clamp(-limit, limit);
}

/// System: планарное движение + head bob + fall respawn
///
/// Hurt подавляет движение (снимется через 500 мс); Dying игрока
/// останавливает симуляцию целиком, сюда уже не доходит.
fn apply_movement(
    input: Res<PlayerInput>,
    clock: Res<SimClock>,
    mut jump_events: EventWriter<JumpRequested>,
    mut players: Query<(
        Entity,
        &mut Transform,
        &mut Player,
        &mut CameraRig,
        &mut Behavior,
    )>,
) {
    let Ok((entity, mut transform, mut player, mut rig, mut behavior)) = players.single_mut()
    else {
        return;
    };

    player.is_moving = false;

    if player.camera_unlocked && !behavior.is_incapacitated() {
        let forward = rig.forward_planar();
        let left = Vec3::Y.cross(forward);

        let mut moved = false;
        if input.move_forward {
            transform.translation += forward * PLAYER_STEP;
            moved = true;
        } else if input.move_backward {
            transform.translation -= forward * PLAYER_STEP;
            moved = true;
        }

        if input.strafe_left {
            transform.translation += left * PLAYER_STEP;
            moved = true;
        } else if input.strafe_right {
            transform.translation -= left * PLAYER_STEP;
            moved = true;
        }

        player.is_moving = moved;

        if input.jump {
            jump_events.write(JumpRequested {
                entity,
                vertical_velocity: JUMP_VELOCITY,
            });
        }
    }

    // FSM: Idle ⇄ Moving по наличию ввода; Hurt/Dying не перетираем
    // (recovery вернёт Idle, следующий тик снова подхватит ввод)
    if player.is_moving {
        if behavior.state == BehaviorState::Idle {
            behavior.enter(BehaviorState::Moving, clock.now_ms);
        }
    } else if behavior.state == BehaviorState::Moving {
        behavior.enter(BehaviorState::Idle, clock.now_ms);
    }

    if player.is_moving {
        rig.bob_phase += 0.1;
    }
    rig.height_offset = 1.0 + (1.5 * rig.bob_phase).sin() / 10.0;

    // Провалился под мир — телепорт на respawn точку
    if transform.translation.y < FALL_RESPAWN_Y {
        transform.translation = Vec3::new(0.0, 10.0, 0.0);
    }
}

/// System: триггеры оружия (fire / reload / switch / стойка)
fn handle_triggers(
    input: Res<PlayerInput>,
    player_audio: Res<PlayerAudio>,
    mut fire_events: EventWriter<WeaponFireIntent>,
    mut audio_events: EventWriter<AudioCueRequested>,
    mut players: Query<(Entity, &Player, &mut Weapon)>,
) {
    let Ok((entity, player, mut weapon)) = players.single_mut() else {
        return;
    };

    if !player.camera_unlocked {
        return;
    }

    weapon.steadied = input.steady_aim;

    if input.reload {
        weapon.reload();
        audio_events.write(AudioCueRequested {
            path: "assets/sound/reload-gun.mp3".to_string(),
            looped: false,
            volume: 0.3,
        });
    }

    if input.switch_weapon {
        weapon.switch();
        if !player_audio.switch_busy {
            audio_events.write(AudioCueRequested {
                path: "assets/sound/switchWeapon.mp3".to_string(),
                looped: false,
                volume: 0.5,
            });
        }
    }

    if input.fire {
        fire_events.write(WeaponFireIntent { shooter: entity });
    }
}
