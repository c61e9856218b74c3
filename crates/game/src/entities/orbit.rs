use std::f32::consts::PI;

use engine_core::Vec3;

/// Circular path around the centre of the sea cylinder.
///
/// Things on an orbit appear ahead of the aircraft near angle 0, sweep
/// over it around π/2 and are behind the camera once the angle passes π.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orbit {
    pub angle: f32,
    pub radius: f32,
    /// Angular speed relative to the world speed.
    pub rate: f32,
}

impl Orbit {
    pub fn new(angle: f32, radius: f32, rate: f32) -> Self {
        Self { angle, radius, rate }
    }

    pub fn advance(&mut self, dt: f32, world_speed: f32) {
        self.angle += self.rate * world_speed * dt;
    }

    pub fn position(&self, sea_radius: f32) -> Vec3 {
        Vec3::new(
            self.angle.cos() * self.radius,
            -sea_radius + self.angle.sin() * self.radius,
            0.0,
        )
    }

    /// The arc is complete; the body is behind the view.
    pub fn has_passed(&self) -> bool {
        self.angle > PI
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_on_the_circle() {
        let orbit = Orbit::new(0.0, 700.0, 0.6);
        assert_eq!(orbit.position(600.0), Vec3::new(700.0, -600.0, 0.0));
        let top = Orbit::new(PI / 2.0, 700.0, 0.6).position(600.0);
        assert!(top.x.abs() < 1e-3);
        assert!((top.y - 100.0).abs() < 1e-3);
    }

    #[test]
    fn orbit_finishes_its_arc() {
        let mut orbit = Orbit::new(-0.3, 700.0, 0.6);
        let mut ticks = 0;
        while !orbit.has_passed() {
            orbit.advance(16.0, 0.0005);
            ticks += 1;
            assert!(ticks < 1_000_000, "orbit never completed");
        }
        assert!(orbit.angle > PI);
    }
}
