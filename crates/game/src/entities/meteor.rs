use engine_core::{Transform, Vec2, Vec3};

use super::{Entity, EntityId, Orbit, WorldFrame};
use crate::pool::Poolable;

/// An obstacle sweeping along the horizon arc toward the aircraft.
#[derive(Debug, Clone)]
pub struct Meteor {
    id: EntityId,
    pub orbit: Orbit,
    pub position: Vec3,
    /// Tumble angles about Y and Z.
    pub spin: Vec2,
    /// Tumble rates, radians per millisecond.
    pub spin_rate: Vec2,
}

impl Meteor {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            orbit: Orbit::default(),
            position: Vec3::ZERO,
            spin: Vec2::ZERO,
            spin_rate: Vec2::ZERO,
        }
    }

    pub fn launch(&mut self, orbit: Orbit, spin_rate: Vec2, sea_radius: f32) {
        self.orbit = orbit;
        self.spin_rate = spin_rate;
        self.position = orbit.position(sea_radius);
    }
}

impl Poolable for Meteor {
    fn id(&self) -> EntityId {
        self.id
    }

    fn reset(&mut self) {
        self.orbit = Orbit::default();
        self.position = Vec3::ZERO;
        self.spin_rate = Vec2::ZERO;
    }
}

impl Entity for Meteor {
    fn update(&mut self, frame: &WorldFrame) {
        self.orbit.advance(frame.dt, frame.world_speed);
        self.position = self.orbit.position(frame.sea_radius);
        self.spin += self.spin_rate * frame.dt;
    }

    fn is_expired(&self) -> bool {
        self.orbit.has_passed()
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn transform(&self) -> Transform {
        Transform::from_position_rotation(self.position, Transform::euler_yz(self.spin.x, self.spin.y))
    }
}
