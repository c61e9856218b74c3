//! SkyRunner headless runner.
//!
//! Drives a session without a window. A scripted cursor sweeps the
//! aircraft around the sky, the fire key is tapped now and then, and a
//! click starts each game and every replay. Progress goes to the log.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use engine_core::{FrameClock, Transform, Vec3};
use game::entities::{EntityId, EntityKind};
use game::sinks::{CueSink, SceneSink, TransformSink, UiSink};
use game::{CameraRig, Cue, GameConfig, GamePhase, HudSnapshot, Session};
use input::{ElementState, KeyCode, MouseButton, PointerState};

const DEFAULT_FRAMES: u32 = 3600;
const FRAMES_VAR: &str = "SKYRUNNER_FRAMES";
/// Simulated display refresh.
const FRAME: Duration = Duration::from_micros(16_667);
const WINDOW_W: f32 = 1280.0;
const WINDOW_H: f32 = 720.0;
/// Frames between fire key taps.
const FIRE_EVERY: u32 = 150;

/// Logs what a renderer, mixer and HUD would have received.
#[derive(Default)]
struct LogPresenter {
    live: usize,
    peak_live: usize,
    transforms: u64,
    cues: u64,
    hud: Option<HudSnapshot>,
    games: u32,
    best_score: u32,
}

impl SceneSink for LogPresenter {
    fn add(&mut self, _kind: EntityKind, _id: EntityId) {
        self.live += 1;
        self.peak_live = self.peak_live.max(self.live);
    }

    fn remove(&mut self, kind: EntityKind, id: EntityId) {
        if self.live == 0 {
            log::warn!("Removal of {:?} {:?} with an empty scene", kind, id);
            return;
        }
        self.live -= 1;
    }
}

impl TransformSink for LogPresenter {
    fn set_transform(&mut self, _kind: EntityKind, _id: EntityId, _transform: &Transform) {
        self.transforms += 1;
    }

    fn set_camera(&mut self, camera: &CameraRig) {
        log::trace!("camera y {:.1} fov {:.1}", camera.position.y, camera.fov);
    }

    fn set_ocean(&mut self, _rotation: f32, _vertices: &[Vec3]) {}
}

impl CueSink for LogPresenter {
    fn cue(&mut self, cue: Cue) {
        self.cues += 1;
        log::debug!("cue {:?}", cue);
    }
}

impl UiSink for LogPresenter {
    fn present(&mut self, hud: &HudSnapshot) {
        if let Some(prev) = self.hud {
            if prev.phase != hud.phase {
                log::info!("{:?} -> {:?}", prev.phase, hud.phase);
                if hud.phase == GamePhase::GameOver {
                    self.games += 1;
                }
            }
            if prev.stage != hud.stage || prev.health_fraction != hud.health_fraction {
                log::info!(
                    "stage {} | score {} | health {:.0}% | bullets {}",
                    hud.stage,
                    hud.score,
                    hud.health_fraction * 100.0,
                    hud.bullets
                );
            }
        }
        self.best_score = self.best_score.max(hud.score);
        self.hud = Some(*hud);
    }
}

/// Frame budget from `SKYRUNNER_FRAMES`. The count is a `u32` so every
/// frame's timestamp stays representable.
fn frame_budget() -> Result<u32> {
    parse_frames(std::env::var(FRAMES_VAR).ok())
}

fn parse_frames(raw: Option<String>) -> Result<u32> {
    match raw {
        Some(v) => v
            .trim()
            .parse()
            .with_context(|| {
                format!("{} must be a frame count up to {}, got {:?}", FRAMES_VAR, u32::MAX, v)
            }),
        None => Ok(DEFAULT_FRAMES),
    }
}

/// Cursor path in window pixels for frame `n`.
fn scripted_cursor(n: u32) -> (f64, f64) {
    let t = n as f32 / 60.0;
    let x = (0.5 + 0.45 * (t * 0.9).sin()) * WINDOW_W;
    let y = (0.5 + 0.35 * (t * 0.6).cos()) * WINDOW_H;
    (x as f64, y as f64)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let frames = frame_budget()?;
    let config = GameConfig::load();
    let mut clock = FrameClock::starting_at(Instant::now(), config.clock.max_frame_ms);
    clock.set_fixed_step_ms(config.clock.fixed_step_ms);
    let mut session = Session::new(config).context("building session")?;
    let mut pointer = PointerState::new(WINDOW_W, WINDOW_H);
    let mut presenter = LogPresenter::default();

    log::info!("Starting SkyRunner headless run: {} frames", frames);

    let origin = Instant::now();
    for n in 1..=frames {
        pointer.process_cursor_position(scripted_cursor(n));
        if n % FIRE_EVERY == 0 {
            pointer.process_keyboard(KeyCode::Space, ElementState::Pressed);
            pointer.process_keyboard(KeyCode::Space, ElementState::Released);
        }
        if presenter.hud.is_some_and(|h| h.prompt.is_some()) {
            pointer.process_mouse_button(MouseButton::Left, ElementState::Released);
        }

        if pointer.take_click() {
            session.click();
        }
        if pointer.take_fire() {
            session.fire();
        }

        clock.update_at(origin + FRAME * n);
        if clock.fixed_step_ms().is_some() {
            while let Some(step) = clock.next_fixed_step() {
                session.step(step, &pointer, &mut presenter);
            }
        } else {
            session.step(clock.delta_ms(), &pointer, &mut presenter);
        }
    }

    let hud = session.hud();
    log::info!(
        "Finished after {:.1}s simulated: {} games lost, best score {}, now stage {} at {:.0}",
        clock.elapsed().as_secs_f32(),
        presenter.games,
        presenter.best_score,
        hud.stage,
        hud.distance
    );
    log::info!(
        "Scene peak {} entities, {} transforms pushed, {} cues",
        presenter.peak_live,
        presenter.transforms,
        presenter.cues
    );
    Ok(())
}
