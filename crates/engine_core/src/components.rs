//! Common components shared by the simulation.

use glam::Vec3;

/// Velocity component for moving entities.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub linear: Vec3,
    pub angular: Vec3,
}

impl Velocity {
    pub fn with_angular(linear: Vec3, angular: Vec3) -> Self {
        Self { linear, angular }
    }
}

/// Health for damageable entities. Never drops below zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.current = (self.current - amount.max(0.0)).max(0.0);
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    /// Fraction of max health left, in [0, 1].
    pub fn percentage(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

/// Lifetime for temporary entities (debris, effects).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Lifetime {
    pub remaining: f32,
    pub total: f32,
}

impl Lifetime {
    pub fn new(total: f32) -> Self {
        Self {
            remaining: total,
            total,
        }
    }

    /// Tick down; returns true once the lifetime is used up.
    pub fn update(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.is_expired()
    }

    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }

    /// How far through its life the entity is, 0 at birth and 1 at expiry.
    pub fn progress(&self) -> f32 {
        if self.total <= 0.0 {
            return 1.0;
        }
        (1.0 - self.remaining / self.total).clamp(0.0, 1.0)
    }
}
