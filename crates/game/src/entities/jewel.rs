use engine_core::{Transform, Vec2, Vec3};

use super::{Entity, EntityId, Orbit, WorldFrame};
use crate::pool::Poolable;

/// A collectible riding the same horizon arc as the meteors.
#[derive(Debug, Clone)]
pub struct Jewel {
    id: EntityId,
    pub orbit: Orbit,
    pub position: Vec3,
    pub spin: Vec2,
    pub spin_rate: Vec2,
    /// Points granted on pickup.
    pub value: u32,
}

impl Jewel {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            orbit: Orbit::default(),
            position: Vec3::ZERO,
            spin: Vec2::ZERO,
            spin_rate: Vec2::ZERO,
            value: 0,
        }
    }

    pub fn launch(&mut self, orbit: Orbit, spin_rate: Vec2, value: u32, sea_radius: f32) {
        self.orbit = orbit;
        self.spin_rate = spin_rate;
        self.value = value;
        self.position = orbit.position(sea_radius);
    }
}

impl Poolable for Jewel {
    fn id(&self) -> EntityId {
        self.id
    }

    fn reset(&mut self) {
        self.orbit = Orbit::default();
        self.position = Vec3::ZERO;
        self.spin_rate = Vec2::ZERO;
        self.value = 0;
    }
}

impl Entity for Jewel {
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
