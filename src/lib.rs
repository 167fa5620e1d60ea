//! Alive Camera capture core
//!
//! Session lifecycle and timed burst capture for a camera screen that
//! shoots either a single still photo or a five-frame "Alive" burst
//! played back as a short loop.
//!
//! # Architecture
//!
//! The crate is layered around one exclusively owned session handle:
//!
//! ```text
//! hardware (driver + screen traits, mocks)
//!     ↓
//! device (discovery/classification) → session (lifecycle, capture)
//!     ↓                                  ↓
//! control (locked configuration) ← flash (plans) ← burst (scheduler)
//! ```
//!
//! # Design Principles
//!
//! - **One owner**: the session owns the driver; configurator, flash
//!   coordinator, and scheduler borrow it per call — no globals.
//! - **Serialized captures**: a new photo request is never issued while
//!   one is outstanding; the burst scheduler only advances on results.
//! - **Side effects revert exactly once**: torch and screen-blast plans
//!   are deactivated on completion, failure, and cancellation alike.
//! - **Locks never leak**: every device configuration write goes
//!   through a guard that releases the lock on all exit paths.
//!
//! # Example
//!
//! ```no_run
//! use alive_camera::{
//!     burst::BurstScheduler,
//!     config::CameraConfig,
//!     control::DeviceConfigurator,
//!     flash::FlashCoordinator,
//!     hardware::{MockDriver, MockScreen},
//!     session::CaptureSession,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let config = CameraConfig::default();
//! let mut session = CaptureSession::new(Box::new(MockDriver::new()));
//! session.prepare().await.unwrap();
//!
//! let mut configurator = DeviceConfigurator::new(config.tap, config.zoom);
//! let mut flash = FlashCoordinator::new(Box::new(MockScreen::default()));
//! let mut scheduler = BurstScheduler::new(config.burst);
//!
//! let alive = scheduler
//!     .run(&mut session, &mut configurator, &mut flash, true, |n| {
//!         println!("captured {n}/5");
//!     })
//!     .await
//!     .unwrap();
//! assert!(alive.is_burst());
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod burst;
pub mod config;
pub mod control;
pub mod device;
pub mod flash;
pub mod hardware;
pub mod session;

// Re-export commonly used types at crate root
pub use burst::{BurstPhase, BurstScheduler, FRAMES_PER_BURST};
pub use config::{BurstTiming, CameraConfig, ConfigError, ZoomLimits};
pub use control::{DeviceConfigurator, PinchPhase, ScreenGeometry, ScreenPoint, TapMargins};
pub use device::{CameraDevice, CameraPosition, DeviceRegistry};
pub use flash::{CaptureMode, FlashCoordinator, FlashPlan};
pub use hardware::{
    AuthorizationStatus, CameraDriver, CameraError, FlashMode, MockDriver, MockScreen, Screen,
};
pub use session::{CapturedFrame, CaptureSession, Orientation, PreviewFrames, SessionState};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
