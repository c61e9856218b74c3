use std::f32::consts::TAU;

use engine_core::Vec3;
use rand::Rng;

use crate::config::SeaConfig;

/// One lattice vertex of the sea surface, bobbing on a small circle
/// around its rest position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveVertex {
    pub base: Vec3,
    pub angle: f32,
    pub amplitude: f32,
    /// Radians per millisecond.
    pub speed: f32,
}

impl WaveVertex {
    pub fn position(&self) -> Vec3 {
        self.base + Vec3::new(self.angle.cos(), self.angle.sin(), 0.0) * self.amplitude
    }
}

/// The sea: a cylinder lying along Z whose surface vertices wave
/// independently while the whole cylinder rolls with the world.
#[derive(Debug, Clone)]
pub struct Ocean {
    pub waves: Vec<WaveVertex>,
    vertices: Vec<Vec3>,
    pub rotation: f32,
}

impl Ocean {
    /// Build the lattice ring by ring along the cylinder's length. Each
    /// ring has `radial_segments` vertices; the seam is not duplicated.
    pub fn new(cfg: &SeaConfig, rng: &mut impl Rng) -> Self {
        let rings = cfg.length_segments + 1;
        let mut waves = Vec::with_capacity((rings * cfg.radial_segments) as usize);
        for ring in 0..rings {
            let z = cfg.length / 2.0 - cfg.length * ring as f32 / cfg.length_segments.max(1) as f32;
            for seg in 0..cfg.radial_segments {
                let theta = TAU * seg as f32 / cfg.radial_segments as f32;
                waves.push(WaveVertex {
                    base: Vec3::new(theta.sin() * cfg.radius, -theta.cos() * cfg.radius, z),
                    angle: rng.gen::<f32>() * TAU,
                    amplitude: lerp(cfg.min_wave_size, cfg.max_wave_size, rng.gen()),
                    speed: lerp(cfg.min_wave_speed, cfg.max_wave_speed, rng.gen()),
                });
            }
        }
        let vertices = waves.iter().map(WaveVertex::position).collect();
        Self {
            waves,
            vertices,
            rotation: 0.0,
        }
    }

    pub fn update(&mut self, dt: f32, world_speed: f32) {
        for (wave, vertex) in self.waves.iter_mut().zip(self.vertices.iter_mut()) {
            wave.angle += wave.speed * dt;
            *vertex = wave.position();
        }
        self.rotation += world_speed * dt;
    }

    /// Current vertex positions, relative to the cylinder's axis.
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ocean() -> Ocean {
        let mut rng = StdRng::seed_from_u64(5);
        Ocean::new(&SeaConfig::default(), &mut rng)
    }

    #[test]
    fn lattice_covers_the_cylinder() {
        let ocean = ocean();
        assert_eq!(ocean.waves.len(), 440);
        assert_eq!(ocean.vertices().len(), 440);
        for w in &ocean.waves {
            assert!((w.base.truncate().length() - 600.0).abs() < 1e-2);
            assert!(w.base.z.abs() <= 400.0 + 1e-3);
            assert!((5.0..=20.0).contains(&w.amplitude));
            assert!((0.001..=0.003).contains(&w.speed));
        }
    }

    #[test]
    fn vertices_stay_within_their_amplitude() {
        let mut ocean = ocean();
        for _ in 0..50 {
            ocean.update(33.0, 0.0005);
        }
        for (w, v) in ocean.waves.iter().zip(ocean.vertices()) {
            assert!((v.distance(w.base) - w.amplitude).abs() < 1e-2);
        }
        assert!((ocean.rotation - 50.0 * 33.0 * 0.0005).abs() < 1e-4);
    }
}
