//! Platform camera driver abstraction.
//!
//! This module defines a trait-based seam over the platform's camera
//! stack, allowing both real hardware backends and mock implementations
//! for testing. The driver exposes the raw primitives the session layer
//! composes: device enumeration, session graph plumbing, locked device
//! configuration, and asynchronous photo capture.

use crate::device::{CameraDevice, DeviceId};
use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by the camera stack.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    /// No physical camera was found during discovery.
    #[error("no cameras available")]
    NoCamerasAvailable,
    /// The capture session does not exist or is not running.
    #[error("capture session is missing or not running")]
    CaptureSessionMissing,
    /// The operation is illegal in the current state (bad switch target,
    /// overlapping burst, configuration during a burst).
    #[error("invalid operation for the current session state")]
    InvalidOperation,
    /// The session rejected a device input.
    #[error("device input rejected by the session")]
    InputsInvalid,
    /// The device configuration lock could not be acquired; the
    /// requested change was not applied.
    #[error("device configuration failed")]
    ConfigurationFailed,
    /// Camera authorization has not been requested from the user yet.
    #[error("camera authorization required")]
    AuthorizationRequired,
    /// Camera authorization was denied or restricted by the user.
    #[error("camera authorization denied")]
    AuthorizationDenied,
    /// The photo pipeline reported a hardware error for one frame.
    #[error("photo capture failed: {0}")]
    CaptureFailed(String),
}

/// OS-level camera authorization state, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    /// The user has not been asked yet.
    NotDetermined,
    /// Camera usage is authorized.
    Authorized,
    /// Camera usage was denied or is restricted.
    Denied,
}

/// Per-request hardware flash setting for a single photo.
///
/// Burst captures never use this directly; continuous illumination for a
/// burst is coordinated through a flash plan instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlashMode {
    /// No flash.
    #[default]
    Off,
    /// Fire the hardware flash for this request.
    On,
}

/// Focus mode applied to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMode {
    /// Continuously refocus as the scene changes.
    ContinuousAuto,
    /// Focus once on the configured point of interest, then hold.
    OneShotAuto,
}

/// Exposure mode applied to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExposureMode {
    /// Continuously adjust exposure as the scene changes.
    ContinuousAuto,
    /// Expose once for the configured point of interest, then hold.
    OneShotAuto,
}

/// A focus/exposure point of interest in the device's normalized
/// [0,1]×[0,1] sensor coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorPoint {
    /// Horizontal sensor coordinate in [0, 1].
    pub x: f32,
    /// Vertical sensor coordinate in [0, 1].
    pub y: f32,
}

/// Opaque token for the live preview surface a surrounding view draws
/// into. The core never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewSurface(u64);

impl PreviewSurface {
    /// Creates a surface token from a backend handle.
    pub fn new(token: u64) -> Self {
        Self(token)
    }

    /// Returns the backend handle.
    pub fn token(&self) -> u64 {
        self.0
    }
}

/// Raw image payload delivered by the driver for one capture request.
#[derive(Debug, Clone)]
pub struct FrameData {
    /// Encoded or raw pixel bytes; opaque to the session layer.
    pub pixels: Vec<u8>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

/// Trait over the platform camera stack.
///
/// The session layer owns exactly one driver and serializes all access to
/// it; implementations may use internal threads, but every trait method is
/// invoked from the single coordinating context. Only `capture_photo` is
/// asynchronous — it resolves once the photo pipeline delivers the frame
/// or reports an error.
#[async_trait]
pub trait CameraDriver: Send {
    /// Reports the current OS authorization state for camera usage.
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Enumerates the physical cameras visible to the driver.
    fn enumerate_devices(&mut self) -> Result<Vec<CameraDevice>, CameraError>;

    /// Allocates the underlying capture session object.
    fn create_session(&mut self) -> Result<(), CameraError>;

    /// Opens a configuration transaction on the session graph. Input
    /// changes between `begin_configuration` and `commit_configuration`
    /// are applied atomically, so observers never see a session with
    /// zero inputs mid-switch.
    fn begin_configuration(&mut self);

    /// Commits the open configuration transaction.
    fn commit_configuration(&mut self);

    /// Attaches a device input to the session.
    fn attach_input(&mut self, device: &DeviceId) -> Result<(), CameraError>;

    /// Detaches a device input from the session.
    fn detach_input(&mut self, device: &DeviceId) -> Result<(), CameraError>;

    /// Attaches the still-photo output endpoint to the session.
    fn attach_photo_output(&mut self) -> Result<(), CameraError>;

    /// Starts streaming on the session.
    fn start_streaming(&mut self) -> Result<(), CameraError>;

    /// Stops streaming and releases the pipeline.
    fn stop_streaming(&mut self);

    /// Returns true while the session is streaming.
    fn is_streaming(&self) -> bool;

    /// Returns the live preview surface token. Only valid while
    /// streaming.
    fn preview_surface(&self) -> Result<PreviewSurface, CameraError>;

    /// Captures one photo from the given device, resolving when the
    /// pipeline delivers the frame. Callers must serialize requests; a
    /// driver never has more than one capture outstanding.
    async fn capture_photo(
        &mut self,
        device: &DeviceId,
        flash: FlashMode,
    ) -> Result<FrameData, CameraError>;

    /// Acquires the exclusive configuration lock for a device. All
    /// `set_*` configuration calls require the lock to be held.
    fn lock_configuration(&mut self, device: &DeviceId) -> Result<(), CameraError>;

    /// Releases the configuration lock. Must be called exactly once per
    /// successful `lock_configuration`.
    fn unlock_configuration(&mut self, device: &DeviceId);

    /// Sets the focus mode.
    fn set_focus_mode(&mut self, device: &DeviceId, mode: FocusMode) -> Result<(), CameraError>;

    /// Sets the focus point of interest.
    fn set_focus_point(&mut self, device: &DeviceId, point: SensorPoint)
        -> Result<(), CameraError>;

    /// Sets the exposure mode.
    fn set_exposure_mode(
        &mut self,
        device: &DeviceId,
        mode: ExposureMode,
    ) -> Result<(), CameraError>;

    /// Sets the exposure point of interest.
    fn set_exposure_point(
        &mut self,
        device: &DeviceId,
        point: SensorPoint,
    ) -> Result<(), CameraError>;

    /// Enables or disables subject-area-change monitoring.
    fn set_subject_area_monitoring(
        &mut self,
        device: &DeviceId,
        enabled: bool,
    ) -> Result<(), CameraError>;

    /// Sets the video zoom factor.
    fn set_zoom_factor(&mut self, device: &DeviceId, factor: f32) -> Result<(), CameraError>;

    /// Returns the current zoom factor for a device.
    fn zoom_factor(&self, device: &DeviceId) -> f32;

    /// Turns the torch on (at maximum level) or off.
    fn set_torch(&mut self, device: &DeviceId, enabled: bool) -> Result<(), CameraError>;
}

/// RAII wrapper pairing `lock_configuration` with a guaranteed
/// `unlock_configuration` on every exit path.
///
/// The underlying hardware must never be left locked; all configuration
/// writes in this crate go through a guard.
pub struct ConfigGuard<'a> {
    driver: &'a mut dyn CameraDriver,
    device: DeviceId,
}

impl<'a> ConfigGuard<'a> {
    /// Acquires the configuration lock for `device`.
    ///
    /// A lock-acquisition failure is reported as
    /// [`CameraError::ConfigurationFailed`] and nothing is changed.
    pub fn acquire(
        driver: &'a mut dyn CameraDriver,
        device: DeviceId,
    ) -> Result<Self, CameraError> {
        driver
            .lock_configuration(&device)
            .map_err(|_| CameraError::ConfigurationFailed)?;
        Ok(Self { driver, device })
    }

    /// Sets the focus mode on the locked device.
    pub fn set_focus_mode(&mut self, mode: FocusMode) -> Result<(), CameraError> {
        self.driver.set_focus_mode(&self.device, mode)
    }

    /// Sets the focus point of interest on the locked device.
    pub fn set_focus_point(&mut self, point: SensorPoint) -> Result<(), CameraError> {
        self.driver.set_focus_point(&self.device, point)
    }

    /// Sets the exposure mode on the locked device.
    pub fn set_exposure_mode(&mut self, mode: ExposureMode) -> Result<(), CameraError> {
        self.driver.set_exposure_mode(&self.device, mode)
    }

    /// Sets the exposure point of interest on the locked device.
    pub fn set_exposure_point(&mut self, point: SensorPoint) -> Result<(), CameraError> {
        self.driver.set_exposure_point(&self.device, point)
    }

    /// Enables or disables subject-area-change monitoring on the locked
    /// device.
    pub fn set_subject_area_monitoring(&mut self, enabled: bool) -> Result<(), CameraError> {
        self.driver.set_subject_area_monitoring(&self.device, enabled)
    }

    /// Sets the zoom factor on the locked device.
    pub fn set_zoom_factor(&mut self, factor: f32) -> Result<(), CameraError> {
        self.driver.set_zoom_factor(&self.device, factor)
    }

    /// Turns the torch on or off on the locked device.
    pub fn set_torch(&mut self, enabled: bool) -> Result<(), CameraError> {
        self.driver.set_torch(&self.device, enabled)
    }
}

impl Drop for ConfigGuard<'_> {
    fn drop(&mut self) {
        self.driver.unlock_configuration(&self.device);
    }
}
