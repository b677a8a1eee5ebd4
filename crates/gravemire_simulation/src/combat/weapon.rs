//! Weapon state: два loadout-а, charge, fire-rate gate, visual kick
//!
//! Все cooldown-ы — deadlines в simulation мс на компоненте, проверяемые
//! каждый тик. Никаких отложенных callback-ов: deadline на акторе,
//! которого больше нет, просто никогда не прочитается.

use bevy::prelude::*;
use rand::Rng;

use crate::bridge::AudioCueRequested;
use crate::components::{CameraRig, Player};
use crate::{DeterministicRng, SimClock};

/// Визуальный kick/muzzle flash длится 100 мс независимо от fire interval
pub const KICK_MS: f64 = 100.0;

/// Боковой/вертикальный разброс точки выстрела без прицельной стойки
const JITTER_STEPS: [f32; 5] = [-0.5, -0.3, 0.0, 0.3, 0.5];

/// Активный loadout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum LoadoutKind {
    Pistol,
    Rifle,
}

/// Per-loadout состояние: заряд и fire-rate
#[derive(Debug, Clone, Copy, Reflect)]
pub struct Loadout {
    pub charge_now: u32,
    pub charge_max: u32,
    pub fire_interval_ms: f64,
}

impl Loadout {
    pub fn pistol() -> Self {
        Self {
            charge_now: 10,
            charge_max: 10,
            fire_interval_ms: 500.0,
        }
    }

    pub fn rifle() -> Self {
        Self {
            charge_now: 30,
            charge_max: 30,
            fire_interval_ms: 150.0,
        }
    }
}

/// Оружие игрока
///
/// Инвариант: is_firing(now) истинно ровно fire_interval_ms после
/// успешного выстрела; в этом окне повторные выстрелы отклоняются.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Weapon {
    pub active: LoadoutKind,
    pub pistol: Loadout,
    pub rifle: Loadout,

    /// Deadline окончания fire-rate окна
    pub firing_until_ms: f64,

    /// Deadline окончания visual kick/flash (host читает)
    pub kick_until_ms: f64,

    /// Прицельная стойка: без jitter
    pub steadied: bool,
}

impl Default for Weapon {
    fn default() -> Self {
        Self {
            active: LoadoutKind::Pistol,
            pistol: Loadout::pistol(),
            rifle: Loadout::rifle(),
            firing_until_ms: 0.0,
            kick_until_ms: 0.0,
            steadied: false,
        }
    }
}

impl Weapon {
    pub fn active_loadout(&self) -> &Loadout {
        match self.active {
            LoadoutKind::Pistol => &self.pistol,
            LoadoutKind::Rifle => &self.rifle,
        }
    }

    pub fn active_loadout_mut(&mut self) -> &mut Loadout {
        match self.active {
            LoadoutKind::Pistol => &mut self.pistol,
            LoadoutKind::Rifle => &mut self.rifle,
        }
    }

    pub fn is_firing(&self, now_ms: f64) -> bool {
        now_ms < self.firing_until_ms
    }

    pub fn kick_active(&self, now_ms: f64) -> bool {
        now_ms < self.kick_until_ms
    }

    pub fn switch(&mut self) {
        self.active = match self.active {
            LoadoutKind::Pistol => LoadoutKind::Rifle,
            LoadoutKind::Rifle => LoadoutKind::Pistol,
        };
    }

    /// Мгновенная перезарядка активного loadout-а
    pub fn reload(&mut self) {
        let loadout = self.active_loadout_mut();
        loadout.charge_now = loadout.charge_max;
    }
}

/// Event: игрок нажал на спуск (strategic intent, контроллер → combat)
#[derive(Event, Debug, Clone)]
pub struct WeaponFireIntent {
    pub shooter: Entity,
}

/// Event: выстрел состоялся (для host VFX / AI reaction)
#[derive(Event, Debug, Clone)]
pub struct WeaponFired {
    pub shooter: Entity,
    pub origin: Vec3,
    pub direction: Vec3,
}

/// System: разрешение fire intent-ов
///
/// Успех только при charge_now > 0 и вне fire-rate окна. Провал по
/// заряду — empty cue + kick, БЕЗ расхода cooldown-а и без projectile.
/// Попытка внутри окна — тихий no-op.
pub fn resolve_fire_intents(
    mut intents: EventReader<WeaponFireIntent>,
    mut fired_events: EventWriter<WeaponFired>,
    mut audio_events: EventWriter<AudioCueRequested>,
    clock: Res<SimClock>,
    mut rng: ResMut<DeterministicRng>,
    mut shooters: Query<
        (
            &mut Weapon,
            &mut super::ProjectilePool,
            &Transform,
            &CameraRig,
        ),
        With<Player>,
    >,
) {
    let now = clock.now_ms;

    for intent in intents.read() {
        let Ok((mut weapon, mut pool, transform, rig)) = shooters.get_mut(intent.shooter) else {
            continue;
        };

        if weapon.is_firing(now) {
            continue;
        }

        if weapon.active_loadout().charge_now == 0 {
            // ResourceExhaustion: cue вместо ошибки
            weapon.kick_until_ms = now + KICK_MS;
            audio_events.write(AudioCueRequested {
                path: "assets/sound/empty-gun.mp3".to_string(),
                looped: false,
                volume: 0.5,
            });
            continue;
        }

        let interval = weapon.active_loadout().fire_interval_ms;
        weapon.active_loadout_mut().charge_now -= 1;
        weapon.firing_until_ms = now + interval;
        weapon.kick_until_ms = now + KICK_MS;

        let mut origin = transform.translation + Vec3::Y * rig.height_offset;
        if !weapon.steadied {
            let rng = &mut rng.rng;
            origin.x += JITTER_STEPS[rng.gen_range(0..JITTER_STEPS.len())];
            origin.y += JITTER_STEPS[rng.gen_range(0..JITTER_STEPS.len())];
        }

        let direction = rig.look_direction();
        pool.spawn(origin, direction);

        audio_events.write(AudioCueRequested {
            path: "assets/sound/fire.mp3".to_string(),
            looped: false,
            volume: 1.0,
        });
        fired_events.write(WeaponFired {
            shooter: intent.shooter,
            origin,
            direction,
        });
    }
}
