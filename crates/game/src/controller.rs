//! Game state machine and economy: phase, pace, distance, stage, health,
//! score and ammunition.

use engine_core::Health;

use crate::config::GameConfig;

/// Session phase.
///
/// `NotStarted -> Playing` on the player's start action, `Playing ->
/// GameOver` when health runs out, `GameOver -> NotStarted` on replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GamePhase {
    #[default]
    NotStarted,
    Playing,
    GameOver,
}

/// Events produced by one [`Controller::advance`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Advance {
    /// Meteor batches due this tick; each batch holds `stage` meteors.
    pub meteor_batches: u32,
    pub jewel_batches: u32,
    pub stages_gained: u32,
}

impl Advance {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Tunables the controller reads every tick.
#[derive(Debug, Clone, Copy)]
struct Rules {
    start_speed: f32,
    speed_increase_per_stage: f32,
    speed_increase_over_time: f32,
    speed_update_distance: f32,
    speed_smoothing: f32,
    distance_per_speed: f32,
    stage_distance: f32,
    game_over_speed_decay: f32,
    meteor_spawn_distance: f32,
    jewel_spawn_distance: f32,
    starting_health: f32,
    starting_bullets: u32,
}

impl Rules {
    fn from_config(cfg: &GameConfig) -> Self {
        Self {
            start_speed: cfg.pace.start_speed,
            speed_increase_per_stage: cfg.pace.speed_increase_per_stage,
            speed_increase_over_time: cfg.pace.speed_increase_over_time,
            speed_update_distance: cfg.pace.speed_update_distance,
            speed_smoothing: cfg.pace.speed_smoothing,
            distance_per_speed: cfg.pace.distance_per_speed,
            stage_distance: cfg.pace.stage_distance,
            game_over_speed_decay: cfg.pace.game_over_speed_decay,
            meteor_spawn_distance: cfg.combat.meteor_spawn_distance,
            jewel_spawn_distance: cfg.jewels.spawn_distance,
            starting_health: cfg.aircraft.starting_health,
            starting_bullets: cfg.combat.starting_bullets,
        }
    }
}

/// Distance mark of a recurring event. Fires once for every `interval`
/// crossed, so a long tick cannot skip one.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Milestone {
    last: f32,
}

impl Milestone {
    fn crossings(&mut self, distance: f32, interval: f32) -> u32 {
        if interval <= 0.0 {
            return 0;
        }
        let mut count = 0;
        let reached = distance.floor();
        while reached - self.last >= interval {
            self.last += interval;
            count += 1;
        }
        count
    }
}

/// Per-session record of the game's global state.
#[derive(Debug, Clone)]
pub struct Controller {
    rules: Rules,
    phase: GamePhase,
    /// World speed this tick: base speed times throttle.
    pub speed: f32,
    pub base_speed: f32,
    pub target_base_speed: f32,
    pub distance: f32,
    pub stage: u32,
    pub health: Health,
    pub score: u32,
    pub bullets: u32,
    speed_mark: Milestone,
    stage_mark: Milestone,
    meteor_mark: Milestone,
    jewel_mark: Milestone,
}

impl Controller {
    pub fn new(cfg: &GameConfig) -> Self {
        Self::with_rules(Rules::from_config(cfg))
    }

    fn with_rules(rules: Rules) -> Self {
        Self {
            rules,
            phase: GamePhase::NotStarted,
            speed: 0.0,
            base_speed: rules.start_speed,
            target_base_speed: rules.start_speed,
            distance: 0.0,
            stage: 1,
            health: Health::new(rules.starting_health),
            score: 0,
            bullets: rules.starting_bullets,
            speed_mark: Milestone::default(),
            stage_mark: Milestone::default(),
            meteor_mark: Milestone::default(),
            jewel_mark: Milestone::default(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Begin play. Only valid from `NotStarted`; returns whether the phase changed.
    pub fn start(&mut self) -> bool {
        if self.phase != GamePhase::NotStarted {
            return false;
        }
        self.phase = GamePhase::Playing;
        log::info!("Game started");
        true
    }

    /// Rebuild the controller after a lost game. Ignored in other phases.
    pub fn replay(&mut self) -> bool {
        if self.phase != GamePhase::GameOver {
            return false;
        }
        self.new_game();
        true
    }

    /// Unconditional reset to a fresh, not yet started game.
    pub fn new_game(&mut self) {
        *self = Self::with_rules(self.rules);
    }

    /// Advance distance, pace and stage by `dt` milliseconds at the given
    /// throttle. While the game is over the world only spins down.
    pub fn advance(&mut self, dt: f32, throttle: f32) -> Advance {
        let mut out = Advance::default();
        match self.phase {
            GamePhase::NotStarted => {}
            GamePhase::GameOver => {
                self.speed *= self.rules.game_over_speed_decay;
            }
            GamePhase::Playing => {
                let r = self.rules;
                self.distance += self.speed * dt * r.distance_per_speed;

                let speed_ups = self.speed_mark.crossings(self.distance, r.speed_update_distance);
                self.target_base_speed += r.speed_increase_over_time * dt * speed_ups as f32;

                // A new stage restarts the time ramp from the stage's own pace.
                out.stages_gained = self.stage_mark.crossings(self.distance, r.stage_distance);
                if out.stages_gained > 0 {
                    self.stage += out.stages_gained;
                    self.target_base_speed =
                        r.start_speed + r.speed_increase_per_stage * self.stage as f32;
                    log::info!("Stage {} at distance {:.0}", self.stage, self.distance);
                }

                out.meteor_batches = self.meteor_mark.crossings(self.distance, r.meteor_spawn_distance);
                out.jewel_batches = self.jewel_mark.crossings(self.distance, r.jewel_spawn_distance);

                let blend = (dt * r.speed_smoothing).min(1.0);
                self.base_speed += (self.target_base_speed - self.base_speed) * blend;
                self.speed = self.base_speed * throttle;
            }
        }
        out
    }

    /// Take a hit. Health never drops while not playing; reaching zero
    /// ends the game. Returns whether this hit ended it.
    pub fn damage(&mut self, amount: f32) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.health.take_damage(amount);
        log::debug!("Health {:.0}/{:.0}", self.health.current, self.health.max);
        if self.health.is_dead() {
            self.phase = GamePhase::GameOver;
            log::info!(
                "Game over: score {} stage {} distance {:.0}",
                self.score,
                self.stage,
                self.distance
            );
            return true;
        }
        false
    }

    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Spend a bullet if one is left and the game is running.
    pub fn try_fire(&mut self) -> bool {
        if !self.is_playing() || self.bullets == 0 {
            return false;
        }
        self.bullets -= 1;
        true
    }

    pub fn bullets_depleted(&self) -> bool {
        self.bullets == 0
    }
}
