//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: общее для всех живых акторов (Health, Behavior, AwaitingAssets)
//! - agent: враждебные агенты (HostileAgent, AgentClass, LodState, AmbientVoice)
//! - player: игрок (Player, CameraRig, PlayerAudio, spawn_player)

pub mod actor;
pub mod agent;
pub mod player;

// Re-exports для удобного импорта
pub use actor::*;
pub use agent::*;
pub use player::*;
