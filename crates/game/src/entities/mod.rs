//! Simulated entities and their per-frame update rules.
//!
//! Entities only carry simulation state. How they look is the renderer's
//! business; it receives a [`Transform`] per entity each frame.

mod bullet;
mod fragment;
mod jewel;
mod meteor;
mod ocean;
mod orbit;
mod sky;

pub use bullet::Bullet;
pub use fragment::{spawn_burst, Burst, Fragment};
pub use jewel::Jewel;
pub use meteor::Meteor;
pub use ocean::{Ocean, WaveVertex};
pub use orbit::Orbit;
pub use sky::{Cloud, Sky};

use engine_core::{Transform, Vec3};

use crate::pool::Poolable;

/// Identity of an entity within its kind. Never reused for another entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// What an entity is, so the presentation layer knows which visual to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Aircraft,
    Bullet,
    Meteor,
    Jewel,
    Fragment,
    Cloud,
}

/// Shared per-tick inputs for entity updates.
#[derive(Debug, Clone, Copy)]
pub struct WorldFrame {
    /// Elapsed time this tick, milliseconds.
    pub dt: f32,
    /// Current world speed (base speed times throttle).
    pub world_speed: f32,
    pub sea_radius: f32,
}

/// Per-type update rule for pooled entities.
pub trait Entity: Poolable {
    fn update(&mut self, frame: &WorldFrame);

    /// True once the entity should go back to its pool.
    fn is_expired(&self) -> bool;

    fn position(&self) -> Vec3;

    fn transform(&self) -> Transform;
}
