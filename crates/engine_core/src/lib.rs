//! Core engine types and utilities for SkyRunner.
//!
//! This crate provides the foundational types used across the simulation:
//! - Transform and spatial components
//! - Frame timing with delta clamping and an optional fixed step
//! - Common component types (health, lifetime, velocity)

pub mod components;
pub mod time;
pub mod transform;

pub use components::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Quat, Vec2, Vec3};
