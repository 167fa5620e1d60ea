//! Session lifecycle and captured frame types.
//!
//! The session is the single owned handle to the camera hardware;
//! configuration, flash, and burst components all borrow it.

mod frame;
mod session;

pub use frame::{CapturedFrame, Orientation, PreviewFrames};
pub use session::{CaptureSession, SessionState};
