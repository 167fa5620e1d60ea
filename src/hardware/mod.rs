//! Platform seam: camera driver and screen abstractions plus mock
//! implementations for tests and demos.
//!
//! Everything above this module is written against the [`CameraDriver`]
//! and [`Screen`] traits; nothing else in the crate talks to hardware.

mod driver;
mod mock;
mod screen;

pub use driver::{
    AuthorizationStatus, CameraDriver, CameraError, ConfigGuard, ExposureMode, FlashMode,
    FocusMode, FrameData, PreviewSurface, SensorPoint,
};
pub use mock::{MockDriver, MockProbe};
pub use screen::{MockScreen, Screen};
