//! Game tunables. Loaded from `config.ron` at startup.
//!
//! Every rate is per millisecond of simulated time. Defaults reproduce the
//! classic arcade feel; a config file only needs the fields it overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from loading or validating a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid RON: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("`{field}` {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Linear remap of one pointer axis onto a gameplay range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisMap {
    pub in_min: f32,
    pub in_max: f32,
    pub out_min: f32,
    pub out_max: f32,
    /// Clamp the input to `[in_min, in_max]` before remapping.
    #[serde(default = "default_true")]
    pub clamp: bool,
}

impl AxisMap {
    pub const fn new(in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> Self {
        Self {
            in_min,
            in_max,
            out_min,
            out_max,
            clamp: true,
        }
    }

    pub fn apply(&self, value: f32) -> f32 {
        if self.clamp {
            crate::aircraft::transform_value(value, self.in_min, self.in_max, self.out_min, self.out_max)
        } else {
            crate::aircraft::transform_value_unclamped(
                value,
                self.in_min,
                self.in_max,
                self.out_min,
                self.out_max,
            )
        }
    }
}

fn default_true() -> bool {
    true
}

/// Frame timing policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Largest step the simulation will take in one frame.
    pub max_frame_ms: f32,
    /// Run the simulation on a fixed step instead of the raw frame delta.
    pub fixed_step_ms: Option<f32>,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            max_frame_ms: engine_core::DEFAULT_MAX_FRAME_MS,
            fixed_step_ms: None,
        }
    }
}

/// World speed, distance and difficulty ramp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaceConfig {
    pub start_speed: f32,
    /// Added to the target speed per stage.
    pub speed_increase_per_stage: f32,
    /// Added to the target speed (times dT) on every speed checkpoint.
    pub speed_increase_over_time: f32,
    /// Distance between speed checkpoints.
    pub speed_update_distance: f32,
    /// How quickly the base speed chases its target.
    pub speed_smoothing: f32,
    /// Distance units gained per unit of speed per millisecond.
    pub distance_per_speed: f32,
    /// Distance between stage increments.
    pub stage_distance: f32,
    /// Per-tick speed multiplier after game over.
    pub game_over_speed_decay: f32,
}

impl Default for PaceConfig {
    fn default() -> Self {
        Self {
            start_speed: 0.000_35,
            speed_increase_per_stage: 0.000_005,
            speed_increase_over_time: 0.000_002_5,
            speed_update_distance: 100.0,
            speed_smoothing: 0.02,
            distance_per_speed: 50.0,
            stage_distance: 1000.0,
            game_over_speed_decay: 0.99,
        }
    }
}

/// Aircraft flight model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AircraftConfig {
    pub default_height: f32,
    pub starting_health: f32,
    /// Pointer x → throttle multiplier on the world speed.
    pub throttle: AxisMap,
    /// Pointer x → target x.
    pub horizontal: AxisMap,
    /// Pointer y → target y.
    pub vertical: AxisMap,
    pub movement_sensitivity: f32,
    pub roll_sensitivity: f32,
    pub pitch_sensitivity: f32,
    /// Decay rate of the knockback speed.
    pub knockback_speed_decay: f32,
    /// Decay rate of the accumulated knockback displacement.
    pub knockback_displacement_decay: f32,
    /// Knockback speed given by a meteor hit.
    pub knockback_strength: f32,
    /// Bullet spawn point in aircraft space.
    pub muzzle_offset: [f32; 3],
    pub scale: f32,
    /// Initial fall speed once the game is over.
    pub fall_speed: f32,
    /// Per-tick fall acceleration after game over.
    pub fall_acceleration: f32,
    /// Height below which the wreck is out of view.
    pub fall_floor: f32,
}

impl Default for AircraftConfig {
    fn default() -> Self {
        let default_height = 100.0;
        let amplitude_height = 80.0;
        let amplitude_width = 75.0;
        Self {
            default_height,
            starting_health: 100.0,
            throttle: AxisMap::new(-0.5, 0.5, 1.2, 1.6),
            horizontal: AxisMap::new(-1.0, 1.0, -amplitude_width * 0.7, -amplitude_width),
            vertical: AxisMap::new(
                -0.75,
                0.75,
                default_height - amplitude_height,
                default_height + amplitude_height,
            ),
            movement_sensitivity: 0.005,
            roll_sensitivity: 0.0008,
            pitch_sensitivity: 0.0004,
            knockback_speed_decay: 0.03,
            knockback_displacement_decay: 0.01,
            knockback_strength: 100.0,
            muzzle_offset: [15.0, 0.0, 0.0],
            scale: 0.25,
            fall_speed: 0.001,
            fall_acceleration: 1.05,
            fall_floor: -200.0,
        }
    }
}

impl AircraftConfig {
    /// Vertical swing either side of the default height.
    pub fn amplitude_height(&self) -> f32 {
        (self.vertical.out_max - self.vertical.out_min) * 0.5
    }
}

/// Chase camera.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub distance: f32,
    pub initial_fov: f32,
    /// Pointer x → field of view (degrees).
    pub fov: AxisMap,
    /// Throttle → preferred camera distance.
    pub throttle_distance: AxisMap,
    pub sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 200.0,
            initial_fov: 55.0,
            fov: AxisMap::new(-1.0, 1.0, 40.0, 80.0),
            throttle_distance: AxisMap::new(1.2, 1.6, 150.0, 500.0),
            sensitivity: 0.002,
        }
    }
}

/// Bullets and meteors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub starting_bullets: u32,
    /// Bullet travel along +x, per millisecond.
    pub bullet_speed: f32,
    /// Bullets past this x are gone.
    pub bullet_max_x: f32,
    pub meteor_kill_score: u32,
    pub meteor_damage: f32,
    /// Angular rate of meteors relative to the world speed.
    pub meteor_speed: f32,
    pub meteor_tolerance: f32,
    pub meteor_spawn_distance: f32,
    /// Angular gap between meteors of one batch.
    pub meteor_spacing: f32,
    pub meteor_spin: f32,
    /// Meteors built up front so early batches do not allocate.
    pub meteor_prefill: usize,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            starting_bullets: 2,
            bullet_speed: 0.48,
            bullet_max_x: 400.0,
            meteor_kill_score: 100,
            meteor_damage: 10.0,
            meteor_speed: 0.6,
            meteor_tolerance: 10.0,
            meteor_spawn_distance: 50.0,
            meteor_spacing: 0.1,
            meteor_spin: 0.006,
            meteor_prefill: 10,
        }
    }
}

/// Collectible jewels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JewelConfig {
    pub value: u32,
    pub speed: f32,
    pub tolerance: f32,
    pub spawn_distance: f32,
    pub max_per_batch: u32,
    /// Angular gap between jewels of one batch.
    pub spacing: f32,
    pub spin: f32,
    pub prefill: usize,
}

impl Default for JewelConfig {
    fn default() -> Self {
        Self {
            value: 3,
            speed: 0.5,
            tolerance: 15.0,
            spawn_distance: 100.0,
            max_per_batch: 10,
            spacing: 0.02,
            spin: 0.006,
            prefill: 10,
        }
    }
}

/// Ocean cylinder and its waves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeaConfig {
    pub radius: f32,
    pub length: f32,
    pub radial_segments: u32,
    pub length_segments: u32,
    pub min_wave_speed: f32,
    pub max_wave_speed: f32,
    pub min_wave_size: f32,
    pub max_wave_size: f32,
}

impl Default for SeaConfig {
    fn default() -> Self {
        Self {
            radius: 600.0,
            length: 800.0,
            radial_segments: 40,
            length_segments: 10,
            min_wave_speed: 0.001,
            max_wave_speed: 0.003,
            min_wave_size: 5.0,
            max_wave_size: 20.0,
        }
    }
}

/// Decorative cloud ring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyConfig {
    pub clouds: u32,
    /// Extra height above the sea for the lowest cloud.
    pub min_altitude: f32,
    pub altitude_spread: f32,
    pub min_depth: f32,
    pub depth_spread: f32,
    pub max_scale: f32,
    pub max_spin: f32,
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self {
            clouds: 20,
            min_altitude: 150.0,
            altitude_spread: 200.0,
            min_depth: 300.0,
            depth_spread: 500.0,
            max_scale: 3.0,
            max_spin: 0.0003,
        }
    }
}

/// Explosion debris.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FragmentConfig {
    pub meteor_burst: u32,
    pub meteor_scale: f32,
    pub jewel_burst: u32,
    pub jewel_scale: f32,
    /// Maximum x/y offset a fragment travels from the burst centre.
    pub spread: f32,
    pub min_lifetime_ms: f32,
    pub max_lifetime_ms: f32,
    pub end_scale: f32,
    pub max_spin: f32,
}

impl Default for FragmentConfig {
    fn default() -> Self {
        Self {
            meteor_burst: 15,
            meteor_scale: 3.0,
            jewel_burst: 5,
            jewel_scale: 0.8,
            spread: 50.0,
            min_lifetime_ms: 600.0,
            max_lifetime_ms: 800.0,
            end_scale: 0.1,
            max_spin: 0.02,
        }
    }
}

/// All tunables for one session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub clock: ClockConfig,
    pub pace: PaceConfig,
    pub aircraft: AircraftConfig,
    pub camera: CameraConfig,
    pub combat: CombatConfig,
    pub jewels: JewelConfig,
    pub sea: SeaConfig,
    pub sky: SkyConfig,
    pub fragments: FragmentConfig,
}

impl GameConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Invalid config at {:?}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    /// Load and validate a config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&data)
    }

    /// Parse and validate RON text.
    pub fn from_ron_str(data: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would stall the game or make the maths diverge.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(value: f32, field: &'static str) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: "must be a positive number",
                })
            }
        }

        positive(self.clock.max_frame_ms, "clock.max_frame_ms")?;
        if let Some(step) = self.clock.fixed_step_ms {
            positive(step, "clock.fixed_step_ms")?;
        }
        positive(self.pace.speed_update_distance, "pace.speed_update_distance")?;
        positive(self.pace.stage_distance, "pace.stage_distance")?;
        positive(self.pace.distance_per_speed, "pace.distance_per_speed")?;
        positive(self.combat.meteor_spawn_distance, "combat.meteor_spawn_distance")?;
        positive(self.combat.meteor_tolerance, "combat.meteor_tolerance")?;
        positive(self.jewels.spawn_distance, "jewels.spawn_distance")?;
        positive(self.jewels.tolerance, "jewels.tolerance")?;
        positive(self.sea.radius, "sea.radius")?;
        positive(self.aircraft.starting_health, "aircraft.starting_health")?;
        if self.fragments.min_lifetime_ms <= 0.0
            || self.fragments.max_lifetime_ms < self.fragments.min_lifetime_ms
        {
            return Err(ConfigError::Invalid {
                field: "fragments.max_lifetime_ms",
                reason: "must be at least fragments.min_lifetime_ms, which must be positive",
            });
        }
        if self.sea.max_wave_speed < self.sea.min_wave_speed
            || self.sea.max_wave_size < self.sea.min_wave_size
        {
            return Err(ConfigError::Invalid {
                field: "sea",
                reason: "wave maxima must not be below their minima",
            });
        }
        if self.jewels.max_per_batch == 0 {
            return Err(ConfigError::Invalid {
                field: "jewels.max_per_batch",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("config.ron")
}
