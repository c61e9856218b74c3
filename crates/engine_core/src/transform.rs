//! Transform component and utilities for spatial positioning.

use glam::{EulerRot, Quat, Vec3};

/// A 3D transform representing position, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and rotation.
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Builder-style uniform scale.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Rotation from pitch (about X) then roll (about Z), the two angles a
    /// banking craft uses.
    pub fn euler_xz(pitch: f32, roll: f32) -> Quat {
        Quat::from_euler(EulerRot::XYZ, pitch, 0.0, roll)
    }

    /// Rotation from Y then Z spin angles, used for tumbling debris.
    pub fn euler_yz(yaw: f32, roll: f32) -> Quat {
        Quat::from_euler(EulerRot::XYZ, 0.0, yaw, roll)
    }

    /// Transform a point from local space into the space this transform lives in.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * (local * self.scale)
    }
}
