//! One game session and its frame step.
//!
//! A [`Session`] owns the whole simulated world. The host calls
//! [`Session::step`] once per frame with the elapsed milliseconds, the
//! current pointer and a [`Presenter`]; user actions (start, replay,
//! fire) may arrive between steps. Their scene changes and cues are
//! queued and delivered by the next step.

use engine_core::{clamp_delta_ms, Vec2, Vec3};
use input::PointerSource;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::aircraft::{Aircraft, CameraRig};
use crate::collision::{bullet_meteor_hits, knockback, proximity_hits};
use crate::config::{ConfigError, GameConfig};
use crate::controller::{Controller, GamePhase};
use crate::entities::{
    spawn_burst, Bullet, Burst, Entity, EntityId, EntityKind, Fragment, Jewel, Meteor, Ocean, Sky,
    WorldFrame,
};
use crate::pool::{Pool, Poolable};
use crate::sinks::{Cue, HudSnapshot, Presenter, Prompt};
use crate::spawner::{spawn_jewels, spawn_meteors};

/// The aircraft is the only entity of its kind.
pub const AIRCRAFT_ID: EntityId = EntityId(0);

/// A scene membership change, kept in the order it happened.
#[derive(Debug, Clone, Copy)]
enum SceneChange {
    Add(EntityKind, EntityId),
    Remove(EntityKind, EntityId),
}

/// Scene changes and cues waiting for the next presentation flush.
///
/// An id can be released and reacquired between flushes, so changes are
/// replayed in queue order rather than grouped by kind of change.
#[derive(Debug, Default)]
struct Outbox {
    scene: Vec<SceneChange>,
    cues: Vec<Cue>,
}

impl Outbox {
    fn add(&mut self, kind: EntityKind, ids: impl IntoIterator<Item = EntityId>) {
        self.scene.extend(ids.into_iter().map(|id| SceneChange::Add(kind, id)));
    }

    fn remove(&mut self, kind: EntityKind, ids: impl IntoIterator<Item = EntityId>) {
        self.scene.extend(ids.into_iter().map(|id| SceneChange::Remove(kind, id)));
    }

    fn flush(&mut self, out: &mut impl Presenter) {
        for change in self.scene.drain(..) {
            match change {
                SceneChange::Add(kind, id) => out.add(kind, id),
                SceneChange::Remove(kind, id) => out.remove(kind, id),
            }
        }
        for cue in self.cues.drain(..) {
            out.cue(cue);
        }
    }
}

/// Simulation state for one player.
pub struct Session {
    config: GameConfig,
    rng: StdRng,
    controller: Controller,
    aircraft: Aircraft,
    camera: CameraRig,
    bullets: Pool<Bullet>,
    meteors: Pool<Meteor>,
    jewels: Pool<Jewel>,
    fragments: Pool<Fragment>,
    sky: Sky,
    ocean: Ocean,
    /// The wreck has hit the bottom; replay may be offered.
    crashed: bool,
    /// Permanent scene members (aircraft, clouds) have been announced.
    announced: bool,
    outbox: Outbox,
}

impl Session {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic session for tests and replays of a run.
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, mut rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut meteors = Pool::new(EntityKind::Meteor);
        meteors.prefill(config.combat.meteor_prefill, Meteor::new);
        let mut jewels = Pool::new(EntityKind::Jewel);
        jewels.prefill(config.jewels.prefill, Jewel::new);

        let sky = Sky::new(&config.sky, config.sea.radius, &mut rng);
        let ocean = Ocean::new(&config.sea, &mut rng);
        log::debug!(
            "World built: {} clouds, {} wave vertices",
            sky.clouds.len(),
            ocean.waves.len()
        );

        Ok(Self {
            controller: Controller::new(&config),
            aircraft: Aircraft::new(&config.aircraft),
            camera: CameraRig::new(&config.camera, &config.aircraft),
            bullets: Pool::new(EntityKind::Bullet),
            meteors,
            jewels,
            fragments: Pool::new(EntityKind::Fragment),
            sky,
            ocean,
            crashed: false,
            announced: false,
            outbox: Outbox::default(),
            rng,
            config,
        })
    }

    // ---- user actions ----------------------------------------------------

    /// Leave the title screen and begin flying.
    pub fn start(&mut self) -> bool {
        self.controller.start()
    }

    /// Start over after a lost game. Ignored unless the game is over.
    pub fn replay(&mut self) -> bool {
        if !self.controller.replay() {
            return false;
        }
        self.reset_world();
        log::info!("Replay requested");
        true
    }

    /// Reset everything to a fresh, not yet started game.
    pub fn new_game(&mut self) {
        self.controller.new_game();
        self.reset_world();
    }

    /// The single "click" action: start from the title, replay after a loss.
    pub fn click(&mut self) -> bool {
        match self.controller.phase() {
            GamePhase::NotStarted => self.start(),
            GamePhase::Playing => false,
            GamePhase::GameOver => self.replay(),
        }
    }

    /// Fire a bullet from the aircraft's nose, if any are left.
    pub fn fire(&mut self) -> bool {
        if !self.controller.try_fire() {
            return false;
        }
        let origin = self.aircraft.muzzle(&self.config.aircraft);
        let combat = &self.config.combat;
        let bullet = self.bullets.acquire_with(Bullet::new);
        bullet.launch(origin, combat.bullet_speed, combat.bullet_max_x);
        let id = bullet.id();
        self.outbox.add(EntityKind::Bullet, [id]);
        self.outbox.cues.push(Cue::BulletFired);
        log::debug!("Bullet fired, {} left", self.controller.bullets);
        true
    }

    fn reset_world(&mut self) {
        let released = self.bullets.release_all();
        self.outbox.remove(EntityKind::Bullet, released);
        let released = self.meteors.release_all();
        self.outbox.remove(EntityKind::Meteor, released);
        let released = self.jewels.release_all();
        self.outbox.remove(EntityKind::Jewel, released);
        let released = self.fragments.release_all();
        self.outbox.remove(EntityKind::Fragment, released);

        self.aircraft = Aircraft::new(&self.config.aircraft);
        self.camera = CameraRig::new(&self.config.camera, &self.config.aircraft);
        self.crashed = false;
    }

    // ---- frame step ------------------------------------------------------

    /// Advance the world by `dt_ms` milliseconds and hand the result to `out`.
    pub fn step(&mut self, dt_ms: f32, pointer: &impl PointerSource, out: &mut impl Presenter) {
        let max_ms = self.config.clock.max_frame_ms;
        let dt = clamp_delta_ms(dt_ms, max_ms);
        if dt_ms > max_ms {
            log::warn!("Frame took {:.1} ms, simulating {:.1} ms", dt_ms, dt);
        }

        self.update_aircraft(dt, pointer.pointer());

        let frame = WorldFrame {
            dt,
            world_speed: self.controller.speed,
            sea_radius: self.config.sea.radius,
        };
        self.bullets.update(&frame);
        self.meteors.update(&frame);
        self.jewels.update(&frame);
        self.fragments.update(&frame);
        self.sky.update(dt, frame.world_speed);
        self.ocean.update(dt, frame.world_speed);

        if self.controller.is_playing() {
            self.shoot_meteors();
            self.ram_meteors();
            self.collect_jewels();
        }

        self.despawn_expired();

        let advance = self.controller.advance(dt, self.aircraft.throttle);
        if advance.stages_gained > 0 {
            self.outbox.cues.push(Cue::StageUp);
        }
        for _ in 0..advance.meteor_batches {
            let ids = spawn_meteors(&mut self.meteors, self.controller.stage, &self.config, &mut self.rng);
            log::debug!("Meteor batch of {} at distance {:.0}", ids.len(), self.controller.distance);
            self.outbox.add(EntityKind::Meteor, ids);
        }
        for _ in 0..advance.jewel_batches {
            let ids = spawn_jewels(&mut self.jewels, &self.config, &mut self.rng);
            log::debug!("Jewel batch of {} at distance {:.0}", ids.len(), self.controller.distance);
            self.outbox.add(EntityKind::Jewel, ids);
        }

        self.present(out);
    }

    fn update_aircraft(&mut self, dt: f32, pointer: Vec2) {
        let cfg = &self.config.aircraft;
        if self.controller.phase() == GamePhase::GameOver {
            if !self.crashed && self.aircraft.fall(dt, cfg) {
                self.crashed = true;
                log::info!("Aircraft went down; waiting for replay");
            }
        } else {
            self.aircraft.update(dt, pointer, cfg);
        }
        self.camera.update(dt, pointer, &self.aircraft, &self.config.camera);
    }

    fn burst(&mut self, origin: Vec3, burst: Burst) {
        let ids = spawn_burst(&mut self.fragments, origin, burst, &self.config.fragments, &mut self.rng);
        self.outbox.add(EntityKind::Fragment, ids);
    }

    /// Bullets against meteors. Both are removed after the scan.
    fn shoot_meteors(&mut self) {
        let hits = bullet_meteor_hits(
            self.bullets.in_use(),
            self.meteors.in_use(),
            self.config.combat.meteor_tolerance,
        );
        if hits.is_empty() {
            return;
        }
        let mut spent = Vec::with_capacity(hits.len());
        let mut destroyed = Vec::with_capacity(hits.len());
        for (bi, mi) in hits {
            let at = self.meteors.in_use()[mi].position();
            self.burst(at, Burst::meteor(&self.config.fragments));
            self.controller.add_score(self.config.combat.meteor_kill_score);
            self.outbox.cues.push(Cue::MeteorShot);
            spent.push(bi);
            destroyed.push(mi);
        }
        let released = self.bullets.release_indices(&mut spent);
        self.outbox.remove(EntityKind::Bullet, released);
        let released = self.meteors.release_indices(&mut destroyed);
        self.outbox.remove(EntityKind::Meteor, released);
    }

    /// Meteors flown into: knockback and damage.
    fn ram_meteors(&mut self) {
        let combat = &self.config.combat;
        let mut rammed = proximity_hits(self.aircraft.position, self.meteors.in_use(), combat.meteor_tolerance);
        if rammed.is_empty() {
            return;
        }
        let (strength, damage) = (self.config.aircraft.knockback_strength, combat.meteor_damage);
        for &mi in &rammed {
            let at = self.meteors.in_use()[mi].position();
            self.burst(at, Burst::meteor(&self.config.fragments));
            self.aircraft.hit(knockback(self.aircraft.position, at, strength));
            self.outbox.cues.push(Cue::AircraftHit);
            self.outbox.cues.push(Cue::MeteorRammed);
            if self.controller.damage(damage) {
                self.outbox.cues.push(Cue::GameOver);
            }
        }
        let released = self.meteors.release_indices(&mut rammed);
        self.outbox.remove(EntityKind::Meteor, released);
    }

    fn collect_jewels(&mut self) {
        let mut picked = proximity_hits(
            self.aircraft.position,
            self.jewels.in_use(),
            self.config.jewels.tolerance,
        );
        if picked.is_empty() {
            return;
        }
        for &ji in &picked {
            let jewel = &self.jewels.in_use()[ji];
            let (at, value) = (jewel.position(), jewel.value);
            self.burst(at, Burst::jewel(&self.config.fragments));
            self.controller.add_score(value);
            self.outbox.cues.push(Cue::JewelCollected);
        }
        let released = self.jewels.release_indices(&mut picked);
        self.outbox.remove(EntityKind::Jewel, released);
    }

    fn despawn_expired(&mut self) {
        let released = self.bullets.release_expired();
        self.outbox.remove(EntityKind::Bullet, released);
        let released = self.meteors.release_expired();
        self.outbox.remove(EntityKind::Meteor, released);
        let released = self.jewels.release_expired();
        self.outbox.remove(EntityKind::Jewel, released);
        let released = self.fragments.release_expired();
        self.outbox.remove(EntityKind::Fragment, released);
    }

    // ---- presentation ----------------------------------------------------

    fn present(&mut self, out: &mut impl Presenter) {
        if !self.announced {
            out.add(EntityKind::Aircraft, AIRCRAFT_ID);
            for cloud in &self.sky.clouds {
                out.add(EntityKind::Cloud, cloud.id);
            }
            self.announced = true;
        }
        self.outbox.flush(out);

        out.set_transform(EntityKind::Aircraft, AIRCRAFT_ID, &self.aircraft.transform());
        out.set_camera(&self.camera);
        push_transforms(&self.bullets, out);
        push_transforms(&self.meteors, out);
        push_transforms(&self.jewels, out);
        push_transforms(&self.fragments, out);
        for (id, transform) in self.sky.transforms() {
            out.set_transform(EntityKind::Cloud, id, &transform);
        }
        out.set_ocean(self.ocean.rotation, self.ocean.vertices());

        out.present(&self.hud());
    }

    pub fn hud(&self) -> HudSnapshot {
        let c = &self.controller;
        let prompt = match c.phase() {
            GamePhase::NotStarted => Some(Prompt::ClickToStart),
            GamePhase::GameOver if self.crashed => Some(Prompt::ClickToReplay),
            _ => None,
        };
        HudSnapshot {
            phase: c.phase(),
            score: c.score,
            bullets: c.bullets,
            bullets_depleted: c.bullets_depleted(),
            stage: c.stage,
            health_fraction: c.health.percentage(),
            distance: c.distance,
            prompt,
        }
    }

    // ---- accessors -------------------------------------------------------

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.controller.phase()
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn aircraft(&self) -> &Aircraft {
        &self.aircraft
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn bullets(&self) -> &Pool<Bullet> {
        &self.bullets
    }

    pub fn meteors(&self) -> &Pool<Meteor> {
        &self.meteors
    }

    pub fn jewels(&self) -> &Pool<Jewel> {
        &self.jewels
    }

    pub fn fragments(&self) -> &Pool<Fragment> {
        &self.fragments
    }

    pub fn sky(&self) -> &Sky {
        &self.sky
    }

    pub fn ocean(&self) -> &Ocean {
        &self.ocean
    }

    pub fn has_crashed(&self) -> bool {
        self.crashed
    }
}

fn push_transforms<T: Entity>(pool: &Pool<T>, out: &mut impl Presenter) {
    let kind = pool.kind();
    for entity in pool.in_use() {
        out.set_transform(kind, entity.id(), &entity.transform());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::Knockback;
    use crate::entities::Orbit;
    use crate::sinks::{CueSink, NullPresenter, SceneSink, TransformSink, UiSink};
    use engine_core::Transform;
    use std::collections::HashSet;

    /// Keeps the aircraft parked at its starting point.
    const STILL: Vec2 = Vec2::new(-1.0, 0.0);
    const DT: f32 = 16.0;

    #[derive(Default)]
    struct Recorder {
        added: Vec<(EntityKind, EntityId)>,
        removed: Vec<(EntityKind, EntityId)>,
        /// Scene membership after replaying every add and remove in order.
        scene: HashSet<(EntityKind, EntityId)>,
        cues: Vec<Cue>,
        huds: Vec<HudSnapshot>,
        transforms: usize,
        cameras: usize,
        ocean_vertices: usize,
    }

    impl SceneSink for Recorder {
        fn add(&mut self, kind: EntityKind, id: EntityId) {
            self.added.push((kind, id));
            assert!(self.scene.insert((kind, id)), "{:?} {:?} added twice", kind, id);
        }
        fn remove(&mut self, kind: EntityKind, id: EntityId) {
            self.removed.push((kind, id));
            self.scene.remove(&(kind, id));
        }
    }

    impl TransformSink for Recorder {
        fn set_transform(&mut self, _kind: EntityKind, _id: EntityId, _transform: &Transform) {
            self.transforms += 1;
        }
        fn set_camera(&mut self, _camera: &CameraRig) {
            self.cameras += 1;
        }
        fn set_ocean(&mut self, _rotation: f32, vertices: &[Vec3]) {
            self.ocean_vertices = vertices.len();
        }
    }

    impl CueSink for Recorder {
        fn cue(&mut self, cue: Cue) {
            self.cues.push(cue);
        }
    }

    impl UiSink for Recorder {
        fn present(&mut self, hud: &HudSnapshot) {
            self.huds.push(*hud);
        }
    }

    impl Recorder {
        fn count(&self, cue: Cue) -> usize {
            self.cues.iter().filter(|&&c| c == cue).count()
        }

        fn scene_of(&self, kind: EntityKind) -> HashSet<EntityId> {
            self.scene.iter().filter(|(k, _)| *k == kind).map(|&(_, id)| id).collect()
        }
    }

    fn live_ids<T: Entity>(pool: &Pool<T>) -> HashSet<EntityId> {
        pool.in_use().iter().map(|e| e.id()).collect()
    }

    /// The scene holds exactly the pooled entities that are in use.
    fn assert_scene_matches_pools(s: &Session, rec: &Recorder) {
        assert_eq!(rec.scene_of(EntityKind::Bullet), live_ids(s.bullets()));
        assert_eq!(rec.scene_of(EntityKind::Jewel), live_ids(s.jewels()));
        assert_eq!(rec.scene_of(EntityKind::Fragment), live_ids(s.fragments()));
        let meteors = rec.scene_of(EntityKind::Meteor);
        assert!(meteors.is_subset(&live_ids(s.meteors())));
    }

    fn session() -> Session {
        Session::with_seed(GameConfig::default(), 42).expect("default config is valid")
    }

    fn playing() -> Session {
        let mut s = session();
        assert!(s.start());
        s
    }

    /// Put a meteor at `p` (z = 0) with an orbit matching that point.
    fn place_meteor(s: &mut Session, p: Vec3) -> EntityId {
        let sea = s.config.sea.radius;
        let rel = Vec2::new(p.x, p.y + sea);
        let orbit = Orbit::new(rel.y.atan2(rel.x), rel.length(), 0.6);
        let meteor = s.meteors.acquire_with(Meteor::new);
        meteor.launch(orbit, Vec2::ZERO, sea);
        meteor.id()
    }

    fn place_jewel(s: &mut Session, p: Vec3) -> EntityId {
        let sea = s.config.sea.radius;
        let rel = Vec2::new(p.x, p.y + sea);
        let orbit = Orbit::new(rel.y.atan2(rel.x), rel.length(), 0.5);
        let jewel = s.jewels.acquire_with(Jewel::new);
        jewel.launch(orbit, Vec2::ZERO, 3, sea);
        jewel.id()
    }

    fn place_bullet(s: &mut Session, p: Vec3) -> EntityId {
        let bullet = s.bullets.acquire_with(Bullet::new);
        bullet.launch(p, 0.48, 400.0);
        bullet.id()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut cfg = GameConfig::default();
        cfg.pace.stage_distance = 0.0;
        assert!(matches!(
            Session::with_seed(cfg, 1),
            Err(ConfigError::Invalid { field: "pace.stage_distance", .. })
        ));
    }

    #[test]
    fn first_step_announces_permanent_members() {
        let mut s = session();
        let mut rec = Recorder::default();
        s.step(DT, &STILL, &mut rec);
        assert!(rec.added.contains(&(EntityKind::Aircraft, AIRCRAFT_ID)));
        let clouds = rec.added.iter().filter(|(k, _)| *k == EntityKind::Cloud).count();
        assert_eq!(clouds, 20);
        assert_eq!(rec.ocean_vertices, 440);
        assert_eq!(rec.cameras, 1);
        // Aircraft plus clouds.
        assert_eq!(rec.transforms, 21);
        assert_eq!(rec.huds.last().map(|h| h.prompt), Some(Some(Prompt::ClickToStart)));

        let mut rec = Recorder::default();
        s.step(DT, &STILL, &mut rec);
        assert!(rec.added.is_empty());
    }

    #[test]
    fn bullet_on_meteor_scores_and_bursts() {
        let mut s = playing();
        let at = Vec3::new(200.0, 100.0, 0.0);
        let meteor = place_meteor(&mut s, at);
        let bullet = place_bullet(&mut s, at);
        let mut rec = Recorder::default();
        s.step(DT, &STILL, &mut rec);

        assert_eq!(s.controller().score, 100);
        assert_eq!(s.bullets().in_use_len(), 0);
        assert_eq!(s.meteors().in_use_len(), 0);
        assert!(s.meteors().is_available(meteor));
        assert_eq!(s.fragments().in_use_len(), 15);
        assert!(rec.removed.contains(&(EntityKind::Bullet, bullet)));
        assert!(rec.removed.contains(&(EntityKind::Meteor, meteor)));
        assert_eq!(rec.count(Cue::MeteorShot), 1);
        assert_eq!(s.controller().health.current, 100.0);
    }

    #[test]
    fn two_bullets_one_meteor_leaves_one_bullet() {
        let mut s = playing();
        let at = Vec3::new(200.0, 100.0, 0.0);
        place_meteor(&mut s, at);
        place_bullet(&mut s, at);
        let second = place_bullet(&mut s, at + Vec3::new(1.0, 0.0, 0.0));
        s.step(DT, &STILL, &mut NullPresenter);
        assert_eq!(s.controller().score, 100);
        assert_eq!(s.bullets().in_use_len(), 1);
        assert!(s.bullets().is_in_use(second));
        assert_eq!(s.fragments().in_use_len(), 15);
    }

    #[test]
    fn ramming_a_meteor_costs_health_and_knocks_back() {
        let mut s = playing();
        let plane = s.aircraft().position;
        let meteor = place_meteor(&mut s, plane + Vec3::new(3.0, 4.0, 0.0));
        let mut rec = Recorder::default();
        s.step(DT, &STILL, &mut rec);

        assert_eq!(s.controller().health.current, 90.0);
        assert!(s.meteors().is_available(meteor));
        let push = s.aircraft().knockback.speed;
        assert!(push.x < 0.0 && push.y < 0.0, "{:?}", push);
        assert!((push.length() - 100.0).abs() < 1e-2);
        assert_eq!(rec.count(Cue::AircraftHit), 1);
        assert_eq!(rec.count(Cue::MeteorRammed), 1);
        assert_eq!(s.fragments().in_use_len(), 15);
        assert_eq!(s.controller().score, 0);
    }

    #[test]
    fn jewel_pickup_adds_value() {
        let mut s = playing();
        let plane = s.aircraft().position;
        let jewel = place_jewel(&mut s, plane + Vec3::new(0.0, 10.0, 0.0));
        let mut rec = Recorder::default();
        s.step(DT, &STILL, &mut rec);
        assert_eq!(s.controller().score, 3);
        assert!(s.jewels().is_available(jewel));
        assert_eq!(s.fragments().in_use_len(), 5);
        assert_eq!(rec.count(Cue::JewelCollected), 1);
    }

    #[test]
    fn no_collisions_before_start() {
        let mut s = session();
        let plane = s.aircraft().position;
        place_meteor(&mut s, plane);
        place_jewel(&mut s, plane);
        s.step(DT, &STILL, &mut NullPresenter);
        assert_eq!(s.controller().health.current, 100.0);
        assert_eq!(s.controller().score, 0);
        assert_eq!(s.meteors().in_use_len(), 1);
        assert_eq!(s.jewels().in_use_len(), 1);
    }

    #[test]
    fn stage_decides_meteor_batch_size() {
        for stage in 1..=5 {
            let mut s = playing();
            s.controller.stage = stage;
            s.controller.distance = 50.0;
            let mut rec = Recorder::default();
            s.step(DT, &STILL, &mut rec);
            assert_eq!(s.meteors().in_use_len(), stage as usize);
            let added = rec.added.iter().filter(|(k, _)| *k == EntityKind::Meteor).count();
            assert_eq!(added, stage as usize);
        }
    }

    #[test]
    fn health_only_falls_while_playing_and_ends_at_zero() {
        let mut s = playing();
        let mut last = s.controller().health.current;
        let mut rec = Recorder::default();
        for _ in 0..12 {
            // Hold the aircraft still between hits.
            s.aircraft.knockback = Knockback::default();
            let plane = s.aircraft().position;
            place_meteor(&mut s, plane);
            s.step(DT, &STILL, &mut rec);
            let now = s.controller().health.current;
            assert!(now <= last);
            assert!(now >= 0.0);
            assert_eq!(now == 0.0, s.phase() == GamePhase::GameOver);
            last = now;
        }
        assert_eq!(s.phase(), GamePhase::GameOver);
        assert_eq!(rec.count(Cue::GameOver), 1);
        // Meteors no longer hurt once the game is over.
        let plane = s.aircraft().position;
        place_meteor(&mut s, plane);
        s.step(DT, &STILL, &mut rec);
        assert_eq!(s.controller().health.current, 0.0);
    }

    #[test]
    fn firing_launches_from_the_nose() {
        let mut s = session();
        assert!(!s.fire());
        s.start();
        assert!(s.fire());
        assert_eq!(s.controller().bullets, 1);
        let bullet = &s.bullets().in_use()[0];
        assert!(bullet.position.x > s.aircraft().position.x);
        let mut rec = Recorder::default();
        s.step(DT, &STILL, &mut rec);
        assert_eq!(rec.count(Cue::BulletFired), 1);
        assert!(rec.added.iter().any(|(k, _)| *k == EntityKind::Bullet));

        assert!(s.fire());
        assert!(!s.fire());
        s.step(DT, &STILL, &mut rec);
        assert!(rec.huds.last().map_or(false, |h| h.bullets_depleted));
    }

    #[test]
    fn bullets_leave_the_field_and_return_to_pool() {
        let mut s = playing();
        s.fire();
        let mut steps = 0;
        while s.bullets().in_use_len() > 0 {
            s.step(DT, &STILL, &mut NullPresenter);
            steps += 1;
            assert!(steps < 1000);
        }
        assert_eq!(s.bullets().available_len(), 1);
    }

    #[test]
    fn meteors_complete_their_arc_and_are_released() {
        let mut s = session();
        s.controller.start();
        let id = place_meteor(&mut s, Vec3::new(0.0, 150.0, 0.0));
        let mut rec = Recorder::default();
        // Keep the aircraft low so the meteor passes overhead.
        let low = Vec2::new(-1.0, -0.75);
        let mut steps = 0;
        while s.meteors().is_in_use(id) {
            s.step(33.0, &low, &mut rec);
            steps += 1;
            assert!(steps < 100_000, "meteor never left");
        }
        assert!(s.meteors().is_available(id));
        assert!(rec.removed.contains(&(EntityKind::Meteor, id)));
    }

    #[test]
    fn wreck_falls_then_offers_replay() {
        let mut s = playing();
        s.controller.health.current = 10.0;
        let plane = s.aircraft().position;
        place_meteor(&mut s, plane);
        s.step(DT, &STILL, &mut NullPresenter);
        assert_eq!(s.phase(), GamePhase::GameOver);
        assert_eq!(s.hud().prompt, None);

        let mut steps = 0;
        while !s.has_crashed() {
            s.step(DT, &STILL, &mut NullPresenter);
            steps += 1;
            assert!(steps < 10_000);
        }
        assert_eq!(s.hud().prompt, Some(Prompt::ClickToReplay));
        assert!(s.controller().speed < s.config().pace.start_speed);

        let jewel = place_jewel(&mut s, Vec3::new(300.0, 0.0, 0.0));
        let mut rec = Recorder::default();
        assert!(s.click());
        s.step(DT, &STILL, &mut rec);
        assert_eq!(s.phase(), GamePhase::NotStarted);
        assert_eq!(s.hud().prompt, Some(Prompt::ClickToStart));
        assert_eq!(s.jewels().in_use_len(), 0);
        assert!(rec.removed.contains(&(EntityKind::Jewel, jewel)));
        assert_eq!(s.aircraft().position.y, s.config().aircraft.default_height);
    }

    #[test]
    fn replay_ignored_while_playing() {
        let mut s = playing();
        s.controller.add_score(100);
        assert!(!s.replay());
        assert!(!s.click());
        assert_eq!(s.controller().score, 100);
    }

    #[test]
    fn point_blank_shot_leaves_no_bullet_in_scene() {
        let mut s = playing();
        let mut rec = Recorder::default();
        s.step(DT, &STILL, &mut rec);

        let muzzle = s.aircraft().muzzle(&s.config.aircraft);
        place_meteor(&mut s, muzzle + Vec3::new(8.0, 0.0, 0.0));
        assert!(s.fire());
        s.step(DT, &STILL, &mut rec);

        assert_eq!(rec.count(Cue::MeteorShot), 1);
        assert_eq!(s.bullets().in_use_len(), 0);
        assert!(rec.scene_of(EntityKind::Bullet).is_empty());
        assert_scene_matches_pools(&s, &rec);

        // The recycled bullet is announced once more, not twice.
        assert!(s.fire());
        s.step(DT, &STILL, &mut rec);
        assert_eq!(rec.scene_of(EntityKind::Bullet).len(), 1);
        assert_scene_matches_pools(&s, &rec);
    }

    #[test]
    fn fire_then_new_game_before_a_step_leaves_scene_empty() {
        let mut s = playing();
        let mut rec = Recorder::default();
        s.step(DT, &STILL, &mut rec);
        assert!(s.fire());
        s.new_game();
        s.step(DT, &STILL, &mut rec);
        assert!(rec.scene_of(EntityKind::Bullet).is_empty());
        assert_scene_matches_pools(&s, &rec);
    }

    #[test]
    fn jewels_are_not_collected_after_game_over() {
        let mut s = playing();
        assert!(s.controller.damage(100.0));
        let plane = s.aircraft().position;
        place_jewel(&mut s, plane);
        s.step(DT, &STILL, &mut NullPresenter);
        assert_eq!(s.controller().score, 0);
        assert_eq!(s.jewels().in_use_len(), 1);
    }

    #[test]
    fn new_game_resets_everything() {
        let mut s = playing();
        s.fire();
        let plane = s.aircraft().position;
        place_meteor(&mut s, plane);
        place_meteor(&mut s, Vec3::new(300.0, 300.0, 0.0));
        place_jewel(&mut s, Vec3::new(300.0, 0.0, 0.0));
        s.controller.add_score(700);
        s.controller.stage = 3;
        s.step(DT, &STILL, &mut NullPresenter);

        for _ in 0..2 {
            s.new_game();
            let c = s.controller();
            assert_eq!(c.phase(), GamePhase::NotStarted);
            assert_eq!((c.score, c.stage, c.bullets), (0, 1, 2));
            assert_eq!(c.health.current, 100.0);
            assert_eq!(s.bullets().in_use_len(), 0);
            assert_eq!(s.meteors().in_use_len(), 0);
            assert_eq!(s.jewels().in_use_len(), 0);
            assert_eq!(s.fragments().in_use_len(), 0);
        }
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut s = playing();
        // Get the world moving first.
        s.step(DT, &STILL, &mut NullPresenter);
        let speed = s.controller().speed;
        s.step(10_000.0, &STILL, &mut NullPresenter);
        let max = s.config().clock.max_frame_ms;
        assert!(s.controller().distance <= speed * max * 50.0 + 1e-3);
    }

    #[test]
    fn long_run_keeps_pools_consistent() {
        let mut s = playing();
        let mut rec = Recorder::default();
        for i in 0..3000 {
            let t = i as f32 * 0.01;
            let pointer = Vec2::new(t.sin(), (t * 0.7).cos() * 0.8);
            if i % 200 == 0 {
                s.fire();
            }
            s.step(DT, &pointer, &mut rec);
        }
        assert!(s.controller().distance > 0.0);
        for m in s.meteors().in_use() {
            assert!(!s.meteors().is_available(m.id()));
        }
        // Every announced entity was either removed or is still live.
        let live = s.bullets().in_use_len()
            + s.meteors().in_use_len()
            + s.jewels().in_use_len()
            + s.fragments().in_use_len();
        let transient = |k: &EntityKind| {
            !matches!(k, EntityKind::Aircraft | EntityKind::Cloud)
        };
        let added = rec.added.iter().filter(|(k, _)| transient(k)).count();
        assert_eq!(added - rec.removed.len(), live);
        assert_scene_matches_pools(&s, &rec);
    }
}
