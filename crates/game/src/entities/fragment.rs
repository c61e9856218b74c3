use engine_core::{Lifetime, Quat, Transform, Vec3, Velocity};
use glam::EulerRot;
use rand::Rng;

use super::{Entity, EntityId, WorldFrame};
use crate::config::FragmentConfig;
use crate::pool::{Pool, Poolable};

/// A shard thrown out of an explosion. Drifts toward a random point and
/// shrinks until its lifetime runs out.
#[derive(Debug, Clone)]
pub struct Fragment {
    id: EntityId,
    pub position: Vec3,
    pub velocity: Velocity,
    pub lifetime: Lifetime,
    pub rotation: Vec3,
    pub start_scale: f32,
    pub end_scale: f32,
}

impl Fragment {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            position: Vec3::ZERO,
            velocity: Velocity::default(),
            lifetime: Lifetime::default(),
            rotation: Vec3::ZERO,
            start_scale: 1.0,
            end_scale: 1.0,
        }
    }

    pub fn scale(&self) -> f32 {
        let t = self.lifetime.progress();
        self.start_scale + (self.end_scale - self.start_scale) * t
    }
}

impl Poolable for Fragment {
    fn id(&self) -> EntityId {
        self.id
    }

    fn reset(&mut self) {
        self.position = Vec3::ZERO;
        self.velocity = Velocity::default();
        self.lifetime = Lifetime::default();
        self.rotation = Vec3::ZERO;
        self.start_scale = 1.0;
        self.end_scale = 1.0;
    }
}

impl Entity for Fragment {
    fn update(&mut self, frame: &WorldFrame) {
        self.position += self.velocity.linear * frame.dt;
        self.rotation += self.velocity.angular * frame.dt;
        self.lifetime.update(frame.dt);
    }

    fn is_expired(&self) -> bool {
        self.lifetime.is_expired()
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn transform(&self) -> Transform {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Transform::from_position_rotation(self.position, rotation).with_scale(self.scale())
    }
}

/// Size and count of one explosion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burst {
    pub count: u32,
    pub scale: f32,
}

impl Burst {
    pub fn meteor(cfg: &FragmentConfig) -> Self {
        Self {
            count: cfg.meteor_burst,
            scale: cfg.meteor_scale,
        }
    }

    pub fn jewel(cfg: &FragmentConfig) -> Self {
        Self {
            count: cfg.jewel_burst,
            scale: cfg.jewel_scale,
        }
    }
}

fn signed(rng: &mut impl Rng) -> f32 {
    rng.gen_range(-1.0..=1.0)
}

/// Throw `burst.count` fragments out of `origin`. Returns the ids that
/// entered the scene.
pub fn spawn_burst(
    pool: &mut Pool<Fragment>,
    origin: Vec3,
    burst: Burst,
    cfg: &FragmentConfig,
    rng: &mut impl Rng,
) -> Vec<EntityId> {
    let mut spawned = Vec::with_capacity(burst.count as usize);
    for _ in 0..burst.count {
        let life = if cfg.max_lifetime_ms > cfg.min_lifetime_ms {
            rng.gen_range(cfg.min_lifetime_ms..cfg.max_lifetime_ms)
        } else {
            cfg.min_lifetime_ms
        };
        let offset = Vec3::new(signed(rng) * cfg.spread, signed(rng) * cfg.spread, 0.0);
        let spin = Vec3::new(signed(rng), signed(rng), signed(rng)) * cfg.max_spin;

        let fragment = pool.acquire_with(Fragment::new);
        fragment.position = origin;
        fragment.velocity = Velocity::with_angular(offset / life.max(1.0), spin);
        fragment.lifetime = Lifetime::new(life);
        fragment.rotation = Vec3::ZERO;
        fragment.start_scale = burst.scale;
        fragment.end_scale = cfg.end_scale;
        spawned.push(fragment.id());
    }
    spawned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::EntityKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn frame(dt: f32) -> WorldFrame {
        WorldFrame { dt, world_speed: 0.0, sea_radius: 600.0 }
    }

    #[test]
    fn meteor_burst_spawns_configured_count() {
        let cfg = FragmentConfig::default();
        let mut pool = Pool::new(EntityKind::Fragment);
        let mut rng = StdRng::seed_from_u64(7);
        let ids = spawn_burst(&mut pool, Vec3::ONE, Burst::meteor(&cfg), &cfg, &mut rng);
        assert_eq!(ids.len(), 15);
        assert_eq!(pool.in_use_len(), 15);
        for f in pool.in_use() {
            assert_eq!(f.position, Vec3::ONE);
            assert_eq!(f.scale(), 3.0);
            assert!((600.0..=800.0).contains(&f.lifetime.total));
        }
    }

    #[test]
    fn fragments_drift_shrink_and_expire() {
        let cfg = FragmentConfig::default();
        let mut pool = Pool::new(EntityKind::Fragment);
        let mut rng = StdRng::seed_from_u64(1);
        spawn_burst(&mut pool, Vec3::ZERO, Burst::jewel(&cfg), &cfg, &mut rng);
        assert_eq!(pool.in_use_len(), 5);

        let released = pool.tick(&frame(300.0));
        assert!(released.is_empty());
        for f in pool.in_use() {
            assert!(f.scale() < 0.8);
            assert!(f.position.x.abs() <= cfg.spread);
            assert!(f.position.y.abs() <= cfg.spread);
            assert_eq!(f.position.z, 0.0);
        }

        let released = pool.tick(&frame(600.0));
        assert_eq!(released.len(), 5);
        assert_eq!(pool.in_use_len(), 0);
        assert_eq!(pool.available_len(), 5);
    }

    #[test]
    fn second_burst_reuses_released_fragments() {
        let cfg = FragmentConfig::default();
        let mut pool = Pool::new(EntityKind::Fragment);
        let mut rng = StdRng::seed_from_u64(3);
        spawn_burst(&mut pool, Vec3::ZERO, Burst::jewel(&cfg), &cfg, &mut rng);
        pool.tick(&frame(1000.0));
        spawn_burst(&mut pool, Vec3::ZERO, Burst::jewel(&cfg), &cfg, &mut rng);
        assert_eq!(pool.capacity(), 5);
    }
}
