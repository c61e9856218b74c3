//! Aircraft flight model and chase camera.
//!
//! The pointer never moves the aircraft directly: it picks a target point,
//! the aircraft eases toward it, and its banking is derived from how far it
//! still has to go. Meteor hits add a knockback that decays back to zero.

use engine_core::{Transform, Vec2, Vec3};

use crate::config::{AircraftConfig, CameraConfig};

/// Clamped linear remap of `value` from `[in_min, in_max]` to `[out_min, out_max]`.
pub fn transform_value(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    let (lo, hi) = if in_min <= in_max {
        (in_min, in_max)
    } else {
        (in_max, in_min)
    };
    transform_value_unclamped(value.clamp(lo, hi), in_min, in_max, out_min, out_max)
}

/// Linear remap without clamping the input.
pub fn transform_value_unclamped(
    value: f32,
    in_min: f32,
    in_max: f32,
    out_min: f32,
    out_max: f32,
) -> f32 {
    let span = in_max - in_min;
    if span == 0.0 {
        return out_min;
    }
    let t = (value - in_min) / span;
    out_min + t * (out_max - out_min)
}

/// Exponential-style easing factor for one step, capped so a long frame
/// lands on the target instead of overshooting it.
fn blend(dt: f32, rate: f32) -> f32 {
    (dt * rate).clamp(0.0, 1.0)
}

/// Temporary push applied by a meteor hit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Knockback {
    /// Added to the displacement every tick.
    pub speed: Vec2,
    /// Offset added to the aircraft's target point.
    pub displacement: Vec2,
}

impl Knockback {
    pub fn is_settled(&self) -> bool {
        self.speed.length_squared() < 1e-8 && self.displacement.length_squared() < 1e-8
    }
}

/// The player's aircraft.
#[derive(Debug, Clone)]
pub struct Aircraft {
    pub position: Vec3,
    /// Rotation about X.
    pub pitch: f32,
    /// Rotation about Z.
    pub roll: f32,
    /// Where the pointer wants the aircraft to be.
    pub target: Vec2,
    pub knockback: Knockback,
    /// Throttle multiplier on the world speed, from the pointer.
    pub throttle: f32,
    fall_speed: f32,
    scale: f32,
}

impl Aircraft {
    pub fn new(cfg: &AircraftConfig) -> Self {
        let start = Vec3::new(cfg.horizontal.out_min, cfg.default_height, 0.0);
        Self {
            position: start,
            pitch: 0.0,
            roll: 0.0,
            target: start.truncate(),
            knockback: Knockback::default(),
            throttle: cfg.throttle.out_min,
            fall_speed: cfg.fall_speed,
            scale: cfg.scale,
        }
    }

    /// Steer toward the pointer for one tick of `dt` milliseconds.
    pub fn update(&mut self, dt: f32, pointer: Vec2, cfg: &AircraftConfig) {
        self.throttle = cfg.throttle.apply(pointer.x);

        self.knockback.displacement += self.knockback.speed;
        self.target = Vec2::new(cfg.horizontal.apply(pointer.x), cfg.vertical.apply(pointer.y))
            + self.knockback.displacement;

        let k = blend(dt, cfg.movement_sensitivity);
        self.position.x += (self.target.x - self.position.x) * k;
        self.position.y += (self.target.y - self.position.y) * k;

        let remaining = self.target.y - self.position.y;
        self.roll = remaining * dt * cfg.roll_sensitivity;
        self.pitch = -remaining * dt * cfg.pitch_sensitivity;

        let ks = blend(dt, cfg.knockback_speed_decay);
        let kd = blend(dt, cfg.knockback_displacement_decay);
        self.knockback.speed -= self.knockback.speed * ks;
        self.knockback.displacement -= self.knockback.displacement * kd;
    }

    /// Apply a knockback speed, replacing whatever push was in progress.
    pub fn hit(&mut self, impulse: Vec3) {
        self.knockback.speed = impulse.truncate();
    }

    /// Tumble out of the sky after the game is lost. Returns true once the
    /// wreck is below `fall_floor`.
    pub fn fall(&mut self, dt: f32, cfg: &AircraftConfig) -> bool {
        self.fall_speed *= cfg.fall_acceleration;
        self.position.y -= self.fall_speed * dt;
        self.roll += (-std::f32::consts::FRAC_PI_2 - self.roll) * dt * 0.0002;
        self.pitch += 0.0003 * dt;
        self.has_crashed(cfg)
    }

    pub fn has_crashed(&self, cfg: &AircraftConfig) -> bool {
        self.position.y < cfg.fall_floor
    }

    /// World-space point bullets leave from.
    pub fn muzzle(&self, cfg: &AircraftConfig) -> Vec3 {
        self.transform().transform_point(Vec3::from_array(cfg.muzzle_offset) / self.scale)
    }

    pub fn transform(&self) -> Transform {
        Transform::from_position_rotation(self.position, Transform::euler_xz(self.pitch, self.roll))
            .with_scale(self.scale)
    }
}

/// Chase camera that follows the aircraft's height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub position: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Preferred distance for the current throttle; informational, the
    /// camera itself stays at a fixed depth.
    pub target_distance: f32,
}

impl CameraRig {
    pub fn new(cam: &CameraConfig, aircraft: &AircraftConfig) -> Self {
        Self {
            position: Vec3::new(0.0, aircraft.default_height, cam.distance),
            fov: cam.initial_fov,
            target_distance: cam.throttle_distance.out_min,
        }
    }

    pub fn update(&mut self, dt: f32, pointer: Vec2, aircraft: &Aircraft, cam: &CameraConfig) {
        self.fov = cam.fov.apply(pointer.x);
        self.target_distance = cam.throttle_distance.apply(aircraft.throttle);
        self.position.y += (aircraft.position.y - self.position.y) * blend(dt, cam.sensitivity);
    }
}
