//! Pointer input for the flight controls.
//!
//! The simulation only ever sees a normalized pointer in `[-1, 1]` on both
//! axes (+x right, +y up). Window-space cursor and touch positions are
//! converted here, together with the two one-shot actions the game needs:
//! a click (start / replay) and a fire press.

use glam::Vec2;

/// Anything that can report the normalized pointer once per frame.
pub trait PointerSource {
    fn pointer(&self) -> Vec2;
}

/// A fixed pointer, handy for scripted runs and tests.
impl PointerSource for Vec2 {
    fn pointer(&self) -> Vec2 {
        *self
    }
}

impl<T: PointerSource + ?Sized> PointerSource for &T {
    fn pointer(&self) -> Vec2 {
        (**self).pointer()
    }
}

/// Tracks the pointer and action edges for the current frame.
#[derive(Debug, Clone)]
pub struct PointerState {
    /// Window size in physical pixels.
    window_size: Vec2,
    /// Normalized pointer position.
    pointer: Vec2,
    /// A click (left button or touch release) waiting to be consumed.
    click: bool,
    /// A fire press waiting to be consumed.
    fire: bool,
    /// Fire key is down; further presses are ignored until release.
    fire_latched: bool,
}

impl Default for PointerState {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl PointerState {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            window_size: Vec2::new(width.max(1.0), height.max(1.0)),
            pointer: Vec2::ZERO,
            click: false,
            fire: false,
            fire_latched: false,
        }
    }

    /// Process a window resize.
    pub fn process_resize(&mut self, width: u32, height: u32) {
        self.window_size = Vec2::new(width.max(1) as f32, height.max(1) as f32);
    }

    /// Process cursor (or touch) position in window coordinates.
    pub fn process_cursor_position(&mut self, position: (f64, f64)) {
        let px = position.0 as f32;
        let py = position.1 as f32;
        let x = -1.0 + px / self.window_size.x * 2.0;
        let y = 1.0 - py / self.window_size.y * 2.0;
        self.pointer = Vec2::new(x, y).clamp(Vec2::NEG_ONE, Vec2::ONE);
    }

    /// Process a mouse button event. A left-button release counts as a click.
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left && state == ElementState::Released {
            self.click = true;
        }
    }

    /// Process a keyboard event. Space fires once per press.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        if key != KeyCode::Space {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.fire_latched {
                    self.fire = true;
                    self.fire_latched = true;
                }
            }
            ElementState::Released => self.fire_latched = false,
        }
    }

    /// Dispatch the window events the flight controls care about.
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::Resized(size) => self.process_resize(size.width, size.height),
            WindowEvent::CursorMoved { position, .. } => {
                self.process_cursor_position((position.x, position.y));
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.process_mouse_button(*button, *state);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.process_keyboard(key, event.state);
                }
            }
            WindowEvent::Touch(touch) => {
                self.process_cursor_position((touch.location.x, touch.location.y));
                if touch.phase == TouchPhase::Ended {
                    self.click = true;
                }
            }
            _ => {}
        }
    }

    /// Consume a pending click.
    pub fn take_click(&mut self) -> bool {
        std::mem::take(&mut self.click)
    }

    /// Consume a pending fire press.
    pub fn take_fire(&mut self) -> bool {
        std::mem::take(&mut self.fire)
    }
}

impl PointerSource for PointerState {
    fn pointer(&self) -> Vec2 {
        self.pointer
    }
}

// Re-export for convenience
pub use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};
pub use winit::keyboard::{KeyCode, PhysicalKey};
