use std::f32::consts::{FRAC_PI_2, TAU};

use engine_core::{Quat, Transform, Vec2, Vec3};
use rand::Rng;

use super::EntityId;
use crate::config::SkyConfig;

/// One decorative cloud fixed to the rotating sky ring.
#[derive(Debug, Clone)]
pub struct Cloud {
    pub id: EntityId,
    /// Angle around the ring.
    pub angle: f32,
    /// Distance from the ring's centre.
    pub radius: f32,
    pub depth: f32,
    pub scale: f32,
    pub spin: Vec2,
    pub spin_rate: Vec2,
}

impl Cloud {
    /// Position relative to the sky ring.
    pub fn local_position(&self) -> Vec3 {
        Vec3::new(
            self.angle.cos() * self.radius,
            self.angle.sin() * self.radius,
            self.depth,
        )
    }
}

/// A ring of clouds centred on the sea's axis, rotating with the world.
#[derive(Debug, Clone)]
pub struct Sky {
    pub clouds: Vec<Cloud>,
    /// Rotation of the whole ring about Z.
    pub rotation: f32,
    /// Ring centre sits this far below the origin.
    pub sea_radius: f32,
}

impl Sky {
    pub fn new(cfg: &SkyConfig, sea_radius: f32, rng: &mut impl Rng) -> Self {
        let count = cfg.clouds.max(1);
        let step = TAU / count as f32;
        let clouds = (0..cfg.clouds)
            .map(|i| Cloud {
                id: EntityId(i),
                angle: step * i as f32,
                radius: sea_radius + cfg.min_altitude + rng.gen::<f32>() * cfg.altitude_spread,
                depth: -cfg.min_depth - rng.gen::<f32>() * cfg.depth_spread,
                scale: 1.0 + rng.gen::<f32>() * (cfg.max_scale - 1.0).max(0.0),
                spin: Vec2::ZERO,
                spin_rate: Vec2::new(rng.gen::<f32>(), rng.gen::<f32>()) * cfg.max_spin,
            })
            .collect();
        Self {
            clouds,
            rotation: 0.0,
            sea_radius,
        }
    }

    pub fn update(&mut self, dt: f32, world_speed: f32) {
        for cloud in &mut self.clouds {
            cloud.spin += cloud.spin_rate * dt;
        }
        self.rotation += world_speed * dt;
    }

    /// World transform of `cloud`, including the ring's rotation and offset.
    pub fn cloud_transform(&self, cloud: &Cloud) -> Transform {
        let ring = Quat::from_rotation_z(self.rotation);
        let centre = Vec3::new(0.0, -self.sea_radius, 0.0);
        let facing = Quat::from_rotation_z(cloud.angle + FRAC_PI_2)
            * Transform::euler_yz(cloud.spin.x, cloud.spin.y);
        Transform::from_position_rotation(centre + ring * cloud.local_position(), ring * facing)
            .with_scale(cloud.scale)
    }

    pub fn transforms(&self) -> impl Iterator<Item = (EntityId, Transform)> + '_ {
        self.clouds.iter().map(|c| (c.id, self.cloud_transform(c)))
    }
}
