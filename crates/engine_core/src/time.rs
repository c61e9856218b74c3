//! Frame timing for the game loop.
//!
//! The simulation measures time in milliseconds. Raw wall-clock deltas are
//! clamped before they reach gameplay code so a hitch (or a tab that was
//! hidden for a minute) cannot produce one enormous step.

use std::time::{Duration, Instant};

/// Default ceiling for a single frame step: one frame at 30 Hz.
pub const DEFAULT_MAX_FRAME_MS: f32 = 1000.0 / 30.0;

/// Upper bound on fixed steps drained in one frame, so a slow machine
/// falls behind gracefully instead of spiralling.
const MAX_CATCH_UP_STEPS: u32 = 8;

/// Clamp a raw frame delta to `[0, max_ms]`. Non-finite and negative input
/// becomes zero.
pub fn clamp_delta_ms(raw_ms: f32, max_ms: f32) -> f32 {
    if !raw_ms.is_finite() || raw_ms <= 0.0 {
        return 0.0;
    }
    raw_ms.min(max_ms.max(0.0))
}

/// Manages frame timing and delta time calculation.
#[derive(Debug)]
pub struct FrameClock {
    /// Time when the clock started.
    start_time: Instant,
    /// Time of the last frame.
    last_frame: Instant,
    /// Unclamped duration of the last frame.
    raw_delta: Duration,
    /// Frame count since start.
    frame_count: u64,
    /// Largest step handed to gameplay.
    max_frame_ms: f32,
    /// Fixed timestep, when enabled.
    fixed_step_ms: Option<f32>,
    /// Accumulated (clamped) time waiting for fixed steps.
    accumulator_ms: f32,
    /// Fixed steps already drained this frame.
    steps_this_frame: u32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_MS)
    }
}

impl FrameClock {
    /// Create a new clock that clamps every frame to `max_frame_ms`.
    pub fn new(max_frame_ms: f32) -> Self {
        Self::starting_at(Instant::now(), max_frame_ms)
    }

    /// Create a clock whose first frame is measured from `now`.
    pub fn starting_at(now: Instant, max_frame_ms: f32) -> Self {
        Self {
            start_time: now,
            last_frame: now,
            raw_delta: Duration::ZERO,
            frame_count: 0,
            max_frame_ms,
            fixed_step_ms: None,
            accumulator_ms: 0.0,
            steps_this_frame: 0,
        }
    }

    /// Update timing at the start of a new frame.
    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    /// Update timing as if the frame started at `now`.
    pub fn update_at(&mut self, now: Instant) {
        self.raw_delta = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        self.frame_count += 1;
        self.steps_this_frame = 0;

        let raw_ms = self.raw_delta_ms();
        let clamped = self.delta_ms();
        if raw_ms > clamped {
            log::trace!("frame spike {:.1} ms clamped to {:.1} ms", raw_ms, clamped);
        }
        if self.fixed_step_ms.is_some() {
            self.accumulator_ms += clamped;
        }
    }

    /// Forget the time spent while the loop was halted (window hidden,
    /// paused). The next frame measures from `now`.
    pub fn reset(&mut self, now: Instant) {
        self.last_frame = now;
        self.raw_delta = Duration::ZERO;
        self.accumulator_ms = 0.0;
    }

    /// Unclamped delta of the last frame in milliseconds.
    pub fn raw_delta_ms(&self) -> f32 {
        self.raw_delta.as_secs_f32() * 1000.0
    }

    /// Clamped delta of the last frame in milliseconds.
    pub fn delta_ms(&self) -> f32 {
        clamp_delta_ms(self.raw_delta_ms(), self.max_frame_ms)
    }

    /// Total elapsed time since the clock started.
    pub fn elapsed(&self) -> Duration {
        self.last_frame - self.start_time
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn max_frame_ms(&self) -> f32 {
        self.max_frame_ms
    }

    /// Enable (or disable with `None`) fixed-timestep stepping.
    pub fn set_fixed_step_ms(&mut self, step: Option<f32>) {
        self.fixed_step_ms = step.filter(|s| s.is_finite() && *s > 0.0);
        self.accumulator_ms = 0.0;
    }

    pub fn fixed_step_ms(&self) -> Option<f32> {
        self.fixed_step_ms
    }

    /// Consume one fixed step from the accumulator, if a full one is ready.
    /// Without a fixed step configured this yields nothing.
    pub fn next_fixed_step(&mut self) -> Option<f32> {
        let step = self.fixed_step_ms?;
        if self.steps_this_frame >= MAX_CATCH_UP_STEPS {
            // Drop the backlog rather than carrying it into the next frame.
            self.accumulator_ms = 0.0;
            return None;
        }
        if self.accumulator_ms >= step {
            self.accumulator_ms -= step;
            self.steps_this_frame += 1;
            Some(step)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_rejects_degenerate_input() {
        assert_eq!(clamp_delta_ms(f32::NAN, 33.0), 0.0);
        assert_eq!(clamp_delta_ms(f32::INFINITY, 33.0), 0.0);
        assert_eq!(clamp_delta_ms(-4.0, 33.0), 0.0);
        assert_eq!(clamp_delta_ms(0.0, 33.0), 0.0);
    }

    #[test]
    fn clamp_caps_spikes() {
        assert_eq!(clamp_delta_ms(16.0, 33.0), 16.0);
        assert_eq!(clamp_delta_ms(60_000.0, 33.0), 33.0);
    }

    #[test]
    fn update_at_measures_and_clamps() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0, 50.0);
        clock.update_at(t0 + Duration::from_millis(20));
        assert!((clock.delta_ms() - 20.0).abs() < 0.01);
        clock.update_at(t0 + Duration::from_millis(5_020));
        assert!((clock.raw_delta_ms() - 5_000.0).abs() < 0.01);
        assert_eq!(clock.delta_ms(), 50.0);
        assert_eq!(clock.frame_count(), 2);
    }

    #[test]
    fn reset_discards_halted_time() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0, 50.0);
        let resumed = t0 + Duration::from_secs(90);
        clock.reset(resumed);
        clock.update_at(resumed + Duration::from_millis(10));
        assert!((clock.delta_ms() - 10.0).abs() < 0.01);
    }

    #[test]
    fn fixed_steps_drain_accumulator() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0, 100.0);
        clock.set_fixed_step_ms(Some(10.0));
        clock.update_at(t0 + Duration::from_millis(35));
        let mut steps = 0;
        while let Some(step) = clock.next_fixed_step() {
            assert_eq!(step, 10.0);
            steps += 1;
        }
        assert_eq!(steps, 3);
        // Remaining 5 ms carries into the next frame.
        clock.update_at(t0 + Duration::from_millis(43));
        assert_eq!(clock.next_fixed_step(), Some(10.0));
        assert_eq!(clock.next_fixed_step(), None);
    }

    #[test]
    fn variable_mode_has_no_fixed_steps() {
        let mut clock = FrameClock::default();
        clock.update();
        assert_eq!(clock.next_fixed_step(), None);
    }
}
