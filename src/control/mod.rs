//! Locked device configuration: focus, exposure, zoom, torch, and the
//! tap-to-focus coordinate mapping.

mod configurator;
mod point;

pub use configurator::{DeviceConfigurator, PinchPhase};
pub use point::{sensor_point, ScreenGeometry, ScreenPoint, TapMargins};
