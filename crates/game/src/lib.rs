//! SkyRunner simulation core.
//!
//! An aircraft skims a rolling sea, shooting meteors and picking up
//! jewels that sweep toward it along the horizon. This crate holds the
//! whole per-frame simulation: pooled entities, proximity collisions,
//! the flight model and the game state machine. Drawing, sound and UI
//! live behind the traits in [`sinks`].

pub mod aircraft;
pub mod collision;
pub mod config;
pub mod controller;
pub mod entities;
pub mod pool;
pub mod session;
pub mod sinks;
pub mod spawner;

pub use aircraft::{Aircraft, CameraRig};
pub use config::{ConfigError, GameConfig};
pub use controller::{Controller, GamePhase};
pub use session::Session;
pub use sinks::{Cue, HudSnapshot, NullPresenter, Presenter, Prompt};
