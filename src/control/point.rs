//! Screen-to-sensor coordinate mapping for tap-to-focus.
//!
//! The sensor's normalized coordinate space is rotated relative to the
//! portrait screen, so a screen tap maps with swapped and inverted axes:
//! `sensorX = screenY / height`, `sensorY = 1 − screenX / width`.

use crate::hardware::SensorPoint;
use serde::{Deserialize, Serialize};

/// A point in screen space, in pixels from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    /// Horizontal pixel coordinate.
    pub x: f32,
    /// Vertical pixel coordinate.
    pub y: f32,
}

/// Screen dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenGeometry {
    /// Screen width in pixels.
    pub width: f32,
    /// Screen height in pixels.
    pub height: f32,
}

/// Vertical bands at the screen edges reserved for interface controls;
/// taps inside them never reach the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapMargins {
    /// Pixels reserved at the top of the screen.
    pub top: f32,
    /// Pixels reserved at the bottom of the screen.
    pub bottom: f32,
}

impl Default for TapMargins {
    fn default() -> Self {
        Self {
            top: 50.0,
            bottom: 100.0,
        }
    }
}

impl TapMargins {
    /// True when the tap lands between the reserved bands.
    pub fn accepts(&self, tap: ScreenPoint, geometry: ScreenGeometry) -> bool {
        tap.y > self.top && tap.y < geometry.height - self.bottom
    }
}

/// Maps a screen tap into the device's normalized sensor space.
pub fn sensor_point(tap: ScreenPoint, geometry: ScreenGeometry) -> SensorPoint {
    SensorPoint {
        x: tap.y / geometry.height,
        y: 1.0 - tap.x / geometry.width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const GEOMETRY: ScreenGeometry = ScreenGeometry {
        width: 1000.0,
        height: 2000.0,
    };

    #[test]
    fn test_tap_maps_with_swapped_inverted_axes() {
        let point = sensor_point(ScreenPoint { x: 50.0, y: 900.0 }, GEOMETRY);
        assert!((point.x - 0.45).abs() < f32::EPSILON);
        assert!((point.y - 0.95).abs() < f32::EPSILON);
    }

    #[test]
    fn test_margins_reject_reserved_bands() {
        let margins = TapMargins::default();

        assert!(margins.accepts(ScreenPoint { x: 500.0, y: 900.0 }, GEOMETRY));
        assert!(!margins.accepts(ScreenPoint { x: 500.0, y: 49.0 }, GEOMETRY));
        assert!(!margins.accepts(ScreenPoint { x: 500.0, y: 50.0 }, GEOMETRY));
        assert!(!margins.accepts(ScreenPoint { x: 500.0, y: 1900.0 }, GEOMETRY));
        assert!(!margins.accepts(ScreenPoint { x: 500.0, y: 1950.0 }, GEOMETRY));
    }

    proptest! {
        #[test]
        fn prop_sensor_point_stays_normalized(x in 0.0f32..1000.0, y in 0.0f32..2000.0) {
            let point = sensor_point(ScreenPoint { x, y }, GEOMETRY);
            prop_assert!((0.0..=1.0).contains(&point.x));
            prop_assert!((0.0..=1.0).contains(&point.y));
        }

        #[test]
        fn prop_accepted_taps_avoid_margins(x in 0.0f32..1000.0, y in 0.0f32..2000.0) {
            let margins = TapMargins::default();
            let tap = ScreenPoint { x, y };
            if margins.accepts(tap, GEOMETRY) {
                prop_assert!(y > margins.top);
                prop_assert!(y < GEOMETRY.height - margins.bottom);
            }
        }
    }
}
