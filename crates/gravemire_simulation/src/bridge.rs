//! Bridge события — граница с внешними collaborators
//!
//! Симуляция никогда не трогает физику/рендер/звук напрямую:
//! - ECS → host: команды (клипы, материалы, звуковые cue, удаление тел/мешей)
//! - host → ECS: AssetLoadFinished + busy-флаги каналов (PlayerAudio,
//!   AmbientVoice.channel_busy)
//!
//! Позиции/ориентации host синхронизирует сам, читая Transform из World.

use bevy::prelude::*;

use crate::components::AwaitingAssets;
use crate::SimSet;

/// Event (host → ECS): mesh + физ. тело актора загружены
///
/// До этого события все update системы пропускают актора.
#[derive(Event, Debug, Clone)]
pub struct AssetLoadFinished {
    pub entity: Entity,
}

/// Event: запрос анимационного клипа у animation collaborator
///
/// Повторный запрос того же клипа подавляется селектором — каждое такое
/// событие реально запускает play(clip, blend_from, loop).
#[derive(Event, Debug, Clone)]
pub struct ClipRequested {
    pub entity: Entity,
    pub clip: &'static str,
    pub speed: f32,
    pub looped: bool,
    /// Длительность cross-fade от предыдущего клипа
    pub blend: f32,
}

/// Event: load_and_play у audio collaborator
#[derive(Event, Debug, Clone)]
pub struct AudioCueRequested {
    pub path: String,
    pub looped: bool,
    pub volume: f32,
}

/// Уровень детализации материала
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialTier {
    Low,
    High,
}

/// Event: переключение материала агента (LOD policy)
#[derive(Event, Debug, Clone)]
pub struct MaterialSwapped {
    pub entity: Entity,
    pub tier: MaterialTier,
}

/// Event: отцепить физическое тело (вход в Dying)
#[derive(Event, Debug, Clone)]
pub struct BodyDetached {
    pub entity: Entity,
}

/// Event: убрать debug-визуализацию коллайдера (вход в Dying)
#[derive(Event, Debug, Clone)]
pub struct DebugColliderRemoved {
    pub entity: Entity,
}

/// Event: убрать mesh из сцены (Dying → Dead, труп остаётся в ECS)
#[derive(Event, Debug, Clone)]
pub struct MeshRemoved {
    pub entity: Entity,
}

/// UI оверлеи, которыми управляет host page layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Cursor,
    Health,
}

/// Event: показать/скрыть оверлей
#[derive(Event, Debug, Clone)]
pub struct OverlayToggled {
    pub overlay: Overlay,
    pub visible: bool,
}

/// Event: задать вертикальную velocity телу (прыжок)
#[derive(Event, Debug, Clone)]
pub struct JumpRequested {
    pub entity: Entity,
    pub vertical_velocity: f32,
}

pub struct BridgePlugin;

impl Plugin for BridgePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AssetLoadFinished>()
            .add_event::<ClipRequested>()
            .add_event::<AudioCueRequested>()
            .add_event::<MaterialSwapped>()
            .add_event::<BodyDetached>()
            .add_event::<DebugColliderRemoved>()
            .add_event::<MeshRemoved>()
            .add_event::<OverlayToggled>()
            .add_event::<JumpRequested>();

        app.add_systems(FixedUpdate, activate_loaded_actors.in_set(SimSet::Clock));
    }
}

/// System: снимает AwaitingAssets когда host сообщил о загрузке
fn activate_loaded_actors(
    mut commands: Commands,
    mut load_events: EventReader<AssetLoadFinished>,
) {
    for event in load_events.read() {
        if let Ok(mut entity_commands) = commands.get_entity(event.entity) {
            entity_commands.remove::<AwaitingAssets>();
            crate::log_info(&format!("Actor {:?} finished loading", event.entity));
        }
    }
}
