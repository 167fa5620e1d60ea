//! Display backlight abstraction.
//!
//! The front camera has no torch, so burst illumination is emulated by
//! driving the screen to full brightness. This trait is the only part of
//! the display the crate touches.

use std::sync::{Arc, Mutex, MutexGuard};
use tracing::trace;

/// Access to the display backlight.
pub trait Screen: Send {
    /// Current brightness in [0, 1].
    fn brightness(&self) -> f32;

    /// Sets the brightness, clamped to [0, 1] by implementations.
    fn set_brightness(&mut self, value: f32);
}

#[derive(Debug)]
struct ScreenState {
    brightness: f32,
    history: Vec<f32>,
}

/// In-memory screen whose state is shared between clones, so a test can
/// keep a handle after moving the screen into a flash coordinator.
#[derive(Debug, Clone)]
pub struct MockScreen {
    state: Arc<Mutex<ScreenState>>,
}

impl MockScreen {
    /// Creates a screen at the given initial brightness.
    pub fn new(brightness: f32) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScreenState {
                brightness: brightness.clamp(0.0, 1.0),
                history: Vec::new(),
            })),
        }
    }

    /// Every brightness value ever written, in order.
    pub fn history(&self) -> Vec<f32> {
        self.state().history.clone()
    }

    fn state(&self) -> MutexGuard<'_, ScreenState> {
        self.state.lock().unwrap()
    }
}

impl Default for MockScreen {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Screen for MockScreen {
    fn brightness(&self) -> f32 {
        self.state().brightness
    }

    fn set_brightness(&mut self, value: f32) {
        let value = value.clamp(0.0, 1.0);
        trace!(brightness = value, "screen brightness set");
        let mut s = self.state();
        s.brightness = value;
        s.history.push(value);
    }
}
