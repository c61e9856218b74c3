//! Outbound interfaces to the presentation layer.
//!
//! The simulation never draws, plays or displays anything itself. Once
//! per step it hands the scene changes, transforms, cues and HUD values
//! to these sinks, which are free to ignore them.

use engine_core::{Transform, Vec3};

use crate::aircraft::CameraRig;
use crate::controller::GamePhase;
use crate::entities::{EntityId, EntityKind};

/// Scene graph membership: visuals to create and drop.
pub trait SceneSink {
    fn add(&mut self, kind: EntityKind, id: EntityId);
    fn remove(&mut self, kind: EntityKind, id: EntityId);
}

/// Per-frame placement of everything on screen.
pub trait TransformSink {
    fn set_transform(&mut self, kind: EntityKind, id: EntityId, transform: &Transform);
    fn set_camera(&mut self, camera: &CameraRig);
    /// Sea cylinder roll and its current surface vertices.
    fn set_ocean(&mut self, rotation: f32, vertices: &[Vec3]);
}

/// Fire-and-forget sound and effect triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    BulletFired,
    MeteorShot,
    MeteorRammed,
    /// Damage flash on the aircraft.
    AircraftHit,
    JewelCollected,
    StageUp,
    GameOver,
}

pub trait CueSink {
    fn cue(&mut self, cue: Cue);
}

/// Message shown over the playfield, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    ClickToStart,
    ClickToReplay,
}

/// Values for the heads-up display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudSnapshot {
    pub phase: GamePhase,
    pub score: u32,
    pub bullets: u32,
    /// Out of ammunition; the display flickers the counter.
    pub bullets_depleted: bool,
    pub stage: u32,
    /// Health bar fill in [0, 1].
    pub health_fraction: f32,
    pub distance: f32,
    pub prompt: Option<Prompt>,
}

pub trait UiSink {
    fn present(&mut self, hud: &HudSnapshot);
}

/// Everything a step reports to.
pub trait Presenter: SceneSink + TransformSink + CueSink + UiSink {}

impl<T: SceneSink + TransformSink + CueSink + UiSink> Presenter for T {}

/// Discards all output. Useful for headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl SceneSink for NullPresenter {
    fn add(&mut self, _kind: EntityKind, _id: EntityId) {}
    fn remove(&mut self, _kind: EntityKind, _id: EntityId) {}
}

impl TransformSink for NullPresenter {
    fn set_transform(&mut self, _kind: EntityKind, _id: EntityId, _transform: &Transform) {}
    fn set_camera(&mut self, _camera: &CameraRig) {}
    fn set_ocean(&mut self, _rotation: f32, _vertices: &[Vec3]) {}
}

impl CueSink for NullPresenter {
    fn cue(&mut self, _cue: Cue) {}
}

impl UiSink for NullPresenter {
    fn present(&mut self, _hud: &HudSnapshot) {}
}
