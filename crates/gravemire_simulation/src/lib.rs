//! GRAVEMIRE Simulation Core
//!
//! Per-tick gameplay симуляция survival FPS на Bevy 0.16 (strategic layer):
//! акторы (игрок + враждебные агенты), combat, distance-driven AI,
//! animation selection, LOD и ambient audio политики.
//!
//! HYBRID ARCHITECTURE:
//! - ECS = strategic layer (game state, FSM, combat rules, таймеры)
//! - Host = tactical layer (физика, рендер, анимация, звук) — общение
//!   через bridge события (bridge.rs), host читает Transform напрямую

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod ambience;
pub mod animation;
pub mod bridge;
pub mod combat;
pub mod components;
pub mod lod;
pub mod player;

// Re-export базовых типов для удобства
pub use ai::AIPlugin;
pub use ambience::AmbiencePlugin;
pub use animation::AnimationPlugin;
pub use combat::{
    ActorDied, CombatPlugin, HealthDelta, ProjectilePool, Weapon, WeaponFireIntent, WeaponFired,
};
pub use components::*;
pub use lod::LodPlugin;
pub use player::{PlayerPlugin, PlayerInput};

/// Длительность одного simulation тика (мс) при 60Hz
pub const TICK_MS: f64 = 1000.0 / 60.0;

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick (легче считать интервалы)
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            // Детерминистичный RNG (seed по умолчанию)
            .insert_resource(DeterministicRng::new(42))
            .insert_resource(SimClock::default())
            .insert_resource(SimulationRunning(true))
            // Порядок фаз тика: clock → input/player → AI → combat → presentation
            .configure_sets(
                FixedUpdate,
                (
                    SimSet::Clock,
                    SimSet::Player,
                    SimSet::Ai,
                    SimSet::Combat,
                    SimSet::Presentation,
                )
                    .chain()
                    .run_if(simulation_running),
            )
            .add_systems(FixedUpdate, advance_sim_clock.in_set(SimSet::Clock))
            // Подсистемы (ECS strategic layer)
            .add_plugins((
                bridge::BridgePlugin,
                PlayerPlugin,
                AIPlugin,
                CombatPlugin,
                AnimationPlugin,
                LodPlugin,
                AmbiencePlugin,
            ));
    }
}

/// Фазы simulation тика (между plugins нужен явный порядок)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    Clock,
    Player,
    Ai,
    Combat,
    Presentation,
}

/// Simulation clock (мс от старта симуляции)
///
/// Все gameplay таймеры — deadlines в этих мс, проверяемые каждый тик
/// (никаких wall-clock timestamps и отложенных callbacks: deadline на
/// уничтоженном акторе просто никогда не сработает).
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct SimClock {
    pub now_ms: f64,
}

fn advance_sim_clock(mut clock: ResMut<SimClock>) {
    clock.now_ms += TICK_MS;
}

/// Глобальный флаг: идёт ли симуляция
///
/// Смерть игрока выставляет false — весь gameplay тик останавливается
/// (игрок никогда не деспавнится).
#[derive(Resource, Debug, Clone, Copy)]
pub struct SimulationRunning(pub bool);

/// Run condition для всех simulation фаз
pub fn simulation_running(running: Res<SimulationRunning>) -> bool {
    running.0
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// TimeUpdateStrategy::ManualDuration — каждый app.update() продвигает
/// время ровно на один тик (детерминизм в тестах и headless прогонах).
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / 60.0,
        )))
        .add_plugins(SimulationPlugin)
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// Snapshot мира для сравнения детерминизма
/// (упрощённая версия: Debug-формат компонента, сортировка по Entity ID)
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}

use once_cell::sync::Lazy;
use std::sync::Mutex;

// Потокобезопасный глобальный logger (host подставляет свой LogPrinter)
static LOGGER: Lazy<Mutex<Option<Box<dyn LogPrinter>>>> = Lazy::new(|| Mutex::new(None));

pub static LOGGER_LEVEL: Lazy<Mutex<LogLevel>> = Lazy::new(|| Mutex::new(LogLevel::Debug));

pub fn set_logger(logger: Box<dyn LogPrinter>) {
    *LOGGER.lock().unwrap() = Some(logger);
}

pub fn set_log_level(level: LogLevel) {
    *LOGGER_LEVEL.lock().unwrap() = level;
}

pub fn set_logger_if_needed(logger: Box<dyn LogPrinter>) {
    if LOGGER.lock().unwrap().is_none() {
        set_logger(logger);
    }
}

pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl PartialOrd for LogLevel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogLevel {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_int().cmp(&other.as_int())
    }
}

impl PartialEq for LogLevel {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for LogLevel {}

impl LogLevel {
    pub fn as_str(&self) -> &str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn as_int(&self) -> i32 {
        match self {
            LogLevel::Debug => 0,
            LogLevel::Info => 1,
            LogLevel::Warning => 2,
            LogLevel::Error => 3,
        }
    }
}

pub trait LogPrinter: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

pub fn log(message: &str) {
    log_with_level(LogLevel::Debug, message);
}

pub fn log_info(message: &str) {
    log_with_level(LogLevel::Info, message);
}

pub fn log_warning(message: &str) {
    log_with_level(LogLevel::Warning, message);
}

pub fn log_error(message: &str) {
    log_with_level(LogLevel::Error, message);
}

pub fn log_with_level(level: LogLevel, message: &str) {
    // Timestamp добавляем здесь, не в host logger
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        logger.log(level, &format!("[{}] {}", timestamp, message));
    }
}

struct ConsoleLogger;

impl LogPrinter for ConsoleLogger {
    fn log(&self, level: LogLevel, message: &str) {
        println!("[{}] {}", level.as_str(), message);
    }
}

pub fn init_logger() {
    set_logger_if_needed(Box::new(ConsoleLogger));
}
