//! Meteor and jewel batches.
//!
//! Batches enter just below the horizon ahead of the aircraft, strung out
//! backward along the arc so they sweep past one after another. Meteors
//! scatter across the aircraft's whole vertical range; jewels follow a
//! gentle wave at one height.

use engine_core::Vec2;
use rand::prelude::*;

use crate::config::GameConfig;
use crate::entities::{EntityId, Jewel, Meteor, Orbit};
use crate::pool::{Pool, Poolable};

/// Launch `count` meteors. The game spawns one per stage reached.
pub fn spawn_meteors(
    pool: &mut Pool<Meteor>,
    count: u32,
    cfg: &GameConfig,
    rng: &mut impl Rng,
) -> Vec<EntityId> {
    let sea_radius = cfg.sea.radius;
    let centre = cfg.aircraft.default_height + sea_radius;
    let swing = cfg.aircraft.amplitude_height();
    let combat = &cfg.combat;

    (0..count)
        .map(|i| {
            let radius = centre + rng.gen_range(-1.0..=1.0f32) * swing;
            let orbit = Orbit::new(-(i as f32) * combat.meteor_spacing, radius, combat.meteor_speed);
            let spin = Vec2::new(rng.gen(), rng.gen()) * combat.meteor_spin;
            let meteor = pool.acquire_with(Meteor::new);
            meteor.launch(orbit, spin, sea_radius);
            meteor.id()
        })
        .collect()
}

/// Launch a string of 1 to `max_per_batch` jewels.
pub fn spawn_jewels(pool: &mut Pool<Jewel>, cfg: &GameConfig, rng: &mut impl Rng) -> Vec<EntityId> {
    let sea_radius = cfg.sea.radius;
    let jewels = &cfg.jewels;
    let count = rng.gen_range(1..=jewels.max_per_batch.max(1));
    let swing = (cfg.aircraft.amplitude_height() - 20.0).max(0.0);
    let height = sea_radius + cfg.aircraft.default_height + rng.gen_range(-1.0..=1.0f32) * swing;
    let wave = 10.0 + (rng.gen::<f32>() * 10.0).round();

    (0..count)
        .map(|i| {
            let radius = height + (i as f32 * 0.5).cos() * wave;
            let orbit = Orbit::new(-(i as f32) * jewels.spacing, radius, jewels.speed);
            let spin = Vec2::new(rng.gen(), rng.gen()) * jewels.spin;
            let jewel = pool.acquire_with(Jewel::new);
            jewel.launch(orbit, spin, jewels.value, sea_radius);
            jewel.id()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::EntityKind;
    use rand::rngs::StdRng;

    #[test]
    fn meteor_batch_spreads_backward_along_the_arc() {
        let cfg = GameConfig::default();
        let mut pool = Pool::new(EntityKind::Meteor);
        let mut rng = StdRng::seed_from_u64(9);
        let ids = spawn_meteors(&mut pool, 4, &cfg, &mut rng);
        assert_eq!(ids.len(), 4);
        for (i, m) in pool.in_use().iter().enumerate() {
            assert!((m.orbit.angle + i as f32 * 0.1).abs() < 1e-6);
            assert!((620.0..=780.0).contains(&m.orbit.radius), "{}", m.orbit.radius);
            assert_eq!(m.orbit.rate, 0.6);
        }
    }

    #[test]
    fn meteor_batch_reuses_prefilled_pool() {
        let cfg = GameConfig::default();
        let mut pool = Pool::new(EntityKind::Meteor);
        pool.prefill(10, Meteor::new);
        let mut rng = StdRng::seed_from_u64(2);
        spawn_meteors(&mut pool, 3, &cfg, &mut rng);
        assert_eq!(pool.capacity(), 10);
        assert_eq!(pool.available_len(), 7);
    }

    #[test]
    fn jewel_batch_size_and_values() {
        let cfg = GameConfig::default();
        let mut pool = Pool::new(EntityKind::Jewel);
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..20 {
            let ids = spawn_jewels(&mut pool, &cfg, &mut rng);
            assert!((1..=10).contains(&ids.len()));
        }
        for j in pool.in_use() {
            assert_eq!(j.value, 3);
            assert_eq!(j.orbit.rate, 0.5);
            assert!(j.orbit.angle <= 0.0 && j.orbit.angle > -0.2);
            // Height 700 ± 60 plus a wave of at most 20.
            assert!((620.0..=780.0).contains(&j.orbit.radius), "{}", j.orbit.radius);
        }
    }
}
