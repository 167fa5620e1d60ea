//! Exclusive device configuration: focus, exposure, zoom, torch.
//!
//! Every operation acquires the device's configuration lock through a
//! [`ConfigGuard`] so the lock is released on every exit path. While a
//! burst holds the session, all public operations are refused.

use super::point::{sensor_point, ScreenGeometry, ScreenPoint, TapMargins};
use crate::config::ZoomLimits;
use crate::hardware::{
    CameraError, ConfigGuard, ExposureMode, FocusMode, SensorPoint,
};
use crate::session::CaptureSession;
use tracing::debug;

/// Phase of a pinch-to-zoom gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinchPhase {
    /// Fingers still moving; zoom tracks the gesture live.
    Changed,
    /// Gesture finished; the reached factor becomes the new baseline.
    Ended,
}

/// Performs locked configuration changes against the session's active
/// device.
///
/// Holds the committed zoom baseline so pinch gestures scale from the
/// last gesture's end value rather than from 1.0.
pub struct DeviceConfigurator {
    margins: TapMargins,
    zoom: ZoomLimits,
    last_zoom: f32,
}

impl DeviceConfigurator {
    /// Creates a configurator with the given tap margins and zoom
    /// limits.
    pub fn new(margins: TapMargins, zoom: ZoomLimits) -> Self {
        Self {
            margins,
            zoom,
            last_zoom: 1.0,
        }
    }

    fn reject_if_busy(session: &CaptureSession) -> Result<(), CameraError> {
        if session.is_busy() {
            return Err(CameraError::InvalidOperation);
        }
        Ok(())
    }

    fn clamp(&self, session: &CaptureSession, factor: f32) -> Result<f32, CameraError> {
        let device_max = session.active_device()?.capabilities().max_zoom_factor;
        Ok(factor.clamp(self.zoom.min, self.zoom.max.min(device_max)))
    }

    /// Re-enables continuous auto-focus/-exposure and subject-area
    /// monitoring on the active device. Unsupported capabilities are
    /// skipped, not errors.
    pub fn restore_continuous_auto(
        &self,
        session: &mut CaptureSession,
    ) -> Result<(), CameraError> {
        Self::reject_if_busy(session)?;
        let device = session.active_device()?;
        let id = device.id().clone();
        let caps = *device.capabilities();

        let mut guard = ConfigGuard::acquire(session.driver_mut(), id)?;
        guard.set_subject_area_monitoring(true)?;
        if caps.supports_continuous_focus {
            guard.set_focus_mode(FocusMode::ContinuousAuto)?;
        }
        if caps.supports_continuous_exposure {
            guard.set_exposure_mode(ExposureMode::ContinuousAuto)?;
        }
        Ok(())
    }

    /// Maps a screen tap to a sensor focus/exposure point and applies
    /// one-shot focus and exposure there.
    ///
    /// Taps inside the reserved screen margins are ignored and return
    /// `Ok(None)` without touching the device.
    pub fn focus_tap(
        &self,
        session: &mut CaptureSession,
        tap: ScreenPoint,
        geometry: ScreenGeometry,
    ) -> Result<Option<SensorPoint>, CameraError> {
        Self::reject_if_busy(session)?;
        if !self.margins.accepts(tap, geometry) {
            return Ok(None);
        }
        let point = sensor_point(tap, geometry);

        let device = session.active_device()?;
        let id = device.id().clone();
        let caps = *device.capabilities();

        let mut guard = ConfigGuard::acquire(session.driver_mut(), id)?;
        if caps.supports_focus_poi {
            guard.set_focus_point(point)?;
            guard.set_focus_mode(FocusMode::OneShotAuto)?;
        }
        if caps.supports_exposure_poi {
            guard.set_exposure_point(point)?;
            guard.set_exposure_mode(ExposureMode::OneShotAuto)?;
        }
        debug!(x = point.x, y = point.y, "focus point applied");
        Ok(Some(point))
    }

    /// Sets an absolute zoom factor, clamped to the configured limits
    /// and the device's own maximum. Returns the applied factor.
    pub fn set_zoom(
        &mut self,
        session: &mut CaptureSession,
        factor: f32,
    ) -> Result<f32, CameraError> {
        Self::reject_if_busy(session)?;
        let clamped = self.clamp(session, factor)?;
        let id = session.active_device()?.id().clone();

        let mut guard = ConfigGuard::acquire(session.driver_mut(), id)?;
        guard.set_zoom_factor(clamped)?;
        self.last_zoom = clamped;
        Ok(clamped)
    }

    /// Applies a pinch gesture: the gesture's scale multiplies the last
    /// committed baseline. `Ended` commits the reached factor as the new
    /// baseline. Returns the applied factor.
    pub fn pinch(
        &mut self,
        session: &mut CaptureSession,
        scale: f32,
        phase: PinchPhase,
    ) -> Result<f32, CameraError> {
        Self::reject_if_busy(session)?;
        let clamped = self.clamp(session, scale * self.last_zoom)?;
        let id = session.active_device()?.id().clone();

        let mut guard = ConfigGuard::acquire(session.driver_mut(), id)?;
        guard.set_zoom_factor(clamped)?;
        if phase == PinchPhase::Ended {
            self.last_zoom = clamped;
        }
        Ok(clamped)
    }

    /// Resets zoom to 1.0 and clears the pinch baseline. Called after a
    /// camera switch, which resets device zoom.
    pub fn reset_zoom(&mut self, session: &mut CaptureSession) -> Result<(), CameraError> {
        Self::reject_if_busy(session)?;
        let id = session.active_device()?.id().clone();

        let mut guard = ConfigGuard::acquire(session.driver_mut(), id)?;
        guard.set_zoom_factor(1.0)?;
        self.last_zoom = 1.0;
        Ok(())
    }

    /// Turns the active device's torch on (at maximum level) or off.
    /// A silent no-op when the device has no torch.
    pub fn set_torch(&self, session: &mut CaptureSession, enabled: bool) -> Result<(), CameraError> {
        Self::reject_if_busy(session)?;
        self.apply_torch(session, enabled)
    }

    /// Torch control for burst flash plans, which legitimately run while
    /// the session is busy.
    pub(crate) fn apply_torch(
        &self,
        session: &mut CaptureSession,
        enabled: bool,
    ) -> Result<(), CameraError> {
        let device = session.active_device()?;
        if !device.capabilities().has_torch {
            return Ok(());
        }
        let id = device.id().clone();

        let mut guard = ConfigGuard::acquire(session.driver_mut(), id)?;
        guard.set_torch(enabled)?;
        Ok(())
    }
}

impl Default for DeviceConfigurator {
    fn default() -> Self {
        Self::new(TapMargins::default(), ZoomLimits::default())
    }
}
