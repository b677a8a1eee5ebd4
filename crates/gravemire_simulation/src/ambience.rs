//! Ambient audio политики
//!
//! - Per-agent idle рык: jittered deadline в [1000, 10000] мс, канал
//!   не занят, агент не Dying/Dead. Полностью независим от combat state.
//! - Фоновая музыка: когда ни одна из трёх дорожек не играет,
//!   запускается случайная.

use bevy::prelude::*;
use rand::Rng;

use crate::bridge::AudioCueRequested;
use crate::components::{AmbientVoice, AwaitingAssets, Behavior, PlayerAudio};
use crate::{DeterministicRng, SimClock};

/// Диапазон интервала между рыками (мс)
pub const GROWL_INTERVAL_MS: std::ops::RangeInclusive<f64> = 1000.0..=10000.0;

pub struct AmbiencePlugin;

impl Plugin for AmbiencePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerAudio>().add_systems(
            FixedUpdate,
            (schedule_growls, update_music)
                .chain()
                .in_set(crate::SimSet::Presentation),
        );
    }
}

/// System: jittered idle рыки агентов
fn schedule_growls(
    clock: Res<SimClock>,
    mut rng: ResMut<DeterministicRng>,
    mut audio_events: EventWriter<AudioCueRequested>,
    mut agents: Query<(&Behavior, &mut AmbientVoice), Without<AwaitingAssets>>,
) {
    let now = clock.now_ms;

    for (behavior, mut voice) in agents.iter_mut() {
        if behavior.is_dead_or_dying() {
            continue;
        }

        if now < voice.next_cue_at_ms {
            continue;
        }

        // Интервал перевзводится при каждом срабатывании, даже если
        // канал занят и cue не ушёл
        voice.next_cue_at_ms = now + rng.rng.gen_range(GROWL_INTERVAL_MS);

        if voice.channel_busy {
            continue;
        }

        let variant = if rng.rng.gen_bool(0.5) { "" } else { "2" };
        audio_events.write(AudioCueRequested {
            path: format!("assets/sound/agentGrowl{}.mp3", variant),
            looped: false,
            volume: 0.4,
        });
    }
}

/// System: фоновая музыка — одна случайная дорожка когда всё молчит
///
/// Latch не даёт спамить запрос каждый тик пока host ещё не выставил
/// busy флаг начатой дорожки.
fn update_music(
    player_audio: Res<PlayerAudio>,
    mut rng: ResMut<DeterministicRng>,
    mut audio_events: EventWriter<AudioCueRequested>,
    mut requested: Local<bool>,
) {
    if player_audio.any_music_playing() {
        *requested = false;
        return;
    }

    if *requested {
        return;
    }
    *requested = true;

    let track = rng.rng.gen_range(1..=3);
    let path = if track == 1 {
        "assets/sound/backgroundMusic.mp3".to_string()
    } else {
        format!("assets/sound/backgroundMusic{}.mp3", track)
    };

    audio_events.write(AudioCueRequested {
        path,
        looped: false,
        volume: 0.5,
    });
}
