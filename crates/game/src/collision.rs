//! Proximity hit tests.
//!
//! Everything here only reads positions and returns in-use indices. The
//! session applies the consequences afterwards, so nothing is removed
//! while a scan is still walking the lists.

use engine_core::Vec3;

use crate::entities::Entity;

/// Pair bullets with meteors they touch.
///
/// Bullets are visited in insertion order and each one claims the first
/// unclaimed meteor within `tolerance`. A bullet hits at most one meteor
/// and a meteor is hit by at most one bullet per pass.
pub fn bullet_meteor_hits<B: Entity, M: Entity>(
    bullets: &[B],
    meteors: &[M],
    tolerance: f32,
) -> Vec<(usize, usize)> {
    let tolerance_sq = tolerance * tolerance;
    let mut claimed = vec![false; meteors.len()];
    let mut hits = Vec::new();
    for (bi, bullet) in bullets.iter().enumerate() {
        let origin = bullet.position();
        let target = meteors
            .iter()
            .enumerate()
            .find(|(mi, m)| !claimed[*mi] && m.position().distance_squared(origin) < tolerance_sq);
        if let Some((mi, _)) = target {
            claimed[mi] = true;
            hits.push((bi, mi));
        }
    }
    hits
}

/// Indices of every body within `tolerance` of `point`, in insertion order.
pub fn proximity_hits<T: Entity>(point: Vec3, bodies: &[T], tolerance: f32) -> Vec<usize> {
    let tolerance_sq = tolerance * tolerance;
    bodies
        .iter()
        .enumerate()
        .filter(|(_, b)| b.position().distance_squared(point) < tolerance_sq)
        .map(|(i, _)| i)
        .collect()
}

/// Push of magnitude `strength` directed from `obstacle` toward `aircraft`.
/// Zero when the two coincide.
pub fn knockback(aircraft: Vec3, obstacle: Vec3, strength: f32) -> Vec3 {
    (aircraft - obstacle).normalize_or_zero() * strength
}
