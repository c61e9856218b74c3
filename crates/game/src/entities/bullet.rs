use engine_core::{Transform, Vec3};

use super::{Entity, EntityId, WorldFrame};
use crate::pool::Poolable;

/// A shot fired straight ahead from the aircraft.
#[derive(Debug, Clone)]
pub struct Bullet {
    id: EntityId,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Bullets past this x have left the play area.
    pub max_x: f32,
}

impl Bullet {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            max_x: f32::INFINITY,
        }
    }

    pub fn launch(&mut self, origin: Vec3, speed: f32, max_x: f32) {
        self.position = origin;
        self.velocity = Vec3::new(speed, 0.0, 0.0);
        self.max_x = max_x;
    }
}

impl Poolable for Bullet {
    fn id(&self) -> EntityId {
        self.id
    }

    fn reset(&mut self) {
        self.position = Vec3::ZERO;
        self.velocity = Vec3::ZERO;
        self.max_x = f32::INFINITY;
    }
}

impl Entity for Bullet {
    fn update(&mut self, frame: &WorldFrame) {
        self.position += self.velocity * frame.dt;
    }

    fn is_expired(&self) -> bool {
        self.position.x > self.max_x
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn transform(&self) -> Transform {
        Transform::from_position(self.position)
    }
}
