//! Capture session lifecycle.
//!
//! `CaptureSession` owns the driver and moves through a small state
//! machine: `Uninitialized → Configuring → Running ⇄ (input switch) →
//! Stopped`. It holds at most one attached device input at any time and
//! serializes every capture request; dependent components borrow the
//! session, they never own it.

use super::frame::{CapturedFrame, Orientation};
use crate::device::{CameraDevice, CameraPosition, DeviceId, DeviceRegistry, DeviceSet};
use crate::hardware::{
    AuthorizationStatus, CameraDriver, CameraError, ConfigGuard, FlashMode, PreviewSurface,
};
use tracing::{debug, info, warn};

/// Lifecycle state of a [`CaptureSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not yet prepared; `prepare` may be called.
    Uninitialized,
    /// `prepare` is in progress.
    Configuring,
    /// Streaming with exactly one attached input.
    Running,
    /// Torn down; the session cannot be reused.
    Stopped,
}

/// Owns the hardware session, the active device input, and the photo
/// output.
pub struct CaptureSession {
    driver: Box<dyn CameraDriver>,
    state: SessionState,
    devices: DeviceSet,
    attached: Option<CameraPosition>,
    flash_mode: FlashMode,
    busy: bool,
}

impl CaptureSession {
    /// Creates an unprepared session around a driver.
    pub fn new(driver: Box<dyn CameraDriver>) -> Self {
        Self {
            driver,
            state: SessionState::Uninitialized,
            devices: DeviceSet::default(),
            attached: None,
            flash_mode: FlashMode::Off,
            busy: false,
        }
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the position of the attached camera, if any.
    pub fn current_position(&self) -> Option<CameraPosition> {
        self.attached
    }

    /// Returns the stored per-request flash mode for still captures.
    pub fn flash_mode(&self) -> FlashMode {
        self.flash_mode
    }

    /// Stores the per-request flash mode applied to still captures.
    pub fn set_flash_mode(&mut self, mode: FlashMode) {
        self.flash_mode = mode;
    }

    /// True while a burst holds the session (configuration and input
    /// switching are refused).
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub(crate) fn mark_busy(&mut self) {
        self.busy = true;
    }

    pub(crate) fn clear_busy(&mut self) {
        self.busy = false;
    }

    pub(crate) fn driver_mut(&mut self) -> &mut dyn CameraDriver {
        self.driver.as_mut()
    }

    /// Prepares the session: creates the hardware session, discovers
    /// devices, attaches the preferred input (rear when present) and the
    /// photo output, and starts streaming.
    ///
    /// Fails with [`CameraError::AuthorizationRequired`] /
    /// [`CameraError::AuthorizationDenied`] before touching hardware when
    /// camera usage is not authorized; the caller is expected to obtain
    /// permission and call `prepare` again. Any failure leaves the state
    /// `Uninitialized` and the call safely retryable.
    pub async fn prepare(&mut self) -> Result<(), CameraError> {
        if self.state != SessionState::Uninitialized {
            return Err(CameraError::InvalidOperation);
        }
        match self.driver.authorization_status() {
            AuthorizationStatus::Authorized => {}
            AuthorizationStatus::NotDetermined => return Err(CameraError::AuthorizationRequired),
            AuthorizationStatus::Denied => return Err(CameraError::AuthorizationDenied),
        }

        self.state = SessionState::Configuring;
        match self.configure() {
            Ok(position) => {
                self.attached = Some(position);
                self.state = SessionState::Running;
                info!(%position, "capture session running");
                Ok(())
            }
            Err(e) => {
                self.attached = None;
                self.state = SessionState::Uninitialized;
                warn!(error = %e, "capture session preparation failed");
                Err(e)
            }
        }
    }

    fn configure(&mut self) -> Result<CameraPosition, CameraError> {
        self.driver.create_session()?;
        self.devices = DeviceRegistry::discover(self.driver.as_mut())?;

        let preferred = self
            .devices
            .preferred()
            .ok_or(CameraError::NoCamerasAvailable)?;
        let (id, position) = (preferred.id().clone(), preferred.position());

        self.driver.attach_input(&id)?;
        self.driver.attach_photo_output()?;
        self.driver.start_streaming()?;
        Ok(position)
    }

    /// Atomically swaps the attached input for the other position's
    /// camera. Legal only while `Running` and not busy; the swap happens
    /// inside one configuration transaction so the session is never
    /// observed with zero inputs. Switching resets the new device's zoom
    /// factor to 1.0.
    pub fn switch_input(&mut self) -> Result<CameraPosition, CameraError> {
        if self.state != SessionState::Running {
            return Err(CameraError::CaptureSessionMissing);
        }
        if self.busy {
            return Err(CameraError::InvalidOperation);
        }
        let current = self.attached.ok_or(CameraError::InvalidOperation)?;
        let target_position = current.opposite();
        let target = self
            .devices
            .get(target_position)
            .ok_or(CameraError::InvalidOperation)?;
        let target_id = target.id().clone();
        let current_id = self
            .devices
            .get(current)
            .ok_or(CameraError::InvalidOperation)?
            .id()
            .clone();

        self.driver.begin_configuration();
        let swap = self.swap_inputs(&current_id, &target_id);
        self.driver.commit_configuration();
        swap?;

        self.attached = Some(target_position);
        self.reset_zoom(&target_id);
        debug!(position = %target_position, "switched camera input");
        Ok(target_position)
    }

    fn swap_inputs(&mut self, current: &DeviceId, target: &DeviceId) -> Result<(), CameraError> {
        self.driver.detach_input(current)?;
        if let Err(e) = self.driver.attach_input(target) {
            // Put the previous input back so the session stays usable.
            if let Err(rollback) = self.driver.attach_input(current) {
                warn!(error = %rollback, "failed to restore previous input");
            }
            return Err(e);
        }
        Ok(())
    }

    fn reset_zoom(&mut self, device: &DeviceId) {
        match ConfigGuard::acquire(self.driver.as_mut(), device.clone()) {
            Ok(mut guard) => {
                if let Err(e) = guard.set_zoom_factor(1.0) {
                    warn!(error = %e, "zoom reset after switch failed");
                }
            }
            Err(e) => warn!(error = %e, "zoom reset after switch failed"),
        }
    }

    /// Captures one photo from the active device with the given
    /// per-request flash mode. Legal only while `Running`; the `&mut`
    /// receiver serializes requests, so a new capture can never be
    /// issued while one is outstanding.
    pub async fn capture_one_photo(
        &mut self,
        flash: FlashMode,
    ) -> Result<CapturedFrame, CameraError> {
        if self.state != SessionState::Running {
            return Err(CameraError::CaptureSessionMissing);
        }
        let device = self.active_device()?;
        let (id, position) = (device.id().clone(), device.position());

        let data = self.driver.capture_photo(&id, flash).await?;
        let orientation = match position {
            CameraPosition::Front => Orientation::LeftMirrored,
            CameraPosition::Rear => Orientation::Upright,
        };
        Ok(CapturedFrame::new(data, orientation, 0))
    }

    /// Returns the currently attached device.
    pub fn active_device(&self) -> Result<&CameraDevice, CameraError> {
        let position = self.attached.ok_or(CameraError::CaptureSessionMissing)?;
        self.devices
            .get(position)
            .ok_or(CameraError::CaptureSessionMissing)
    }

    /// Returns the active device's current zoom factor.
    pub fn current_zoom(&self) -> Result<f32, CameraError> {
        let id = self.active_device()?.id().clone();
        Ok(self.driver.zoom_factor(&id))
    }

    /// Returns the live preview surface token for the surrounding view.
    pub fn preview_surface(&self) -> Result<PreviewSurface, CameraError> {
        if self.state != SessionState::Running {
            return Err(CameraError::CaptureSessionMissing);
        }
        self.driver.preview_surface()
    }

    /// Stops streaming and retires the session.
    pub fn stop(&mut self) {
        self.driver.stop_streaming();
        self.attached = None;
        self.state = SessionState::Stopped;
        info!("capture session stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::{MockDriver, MockProbe};

    async fn running_session(driver: MockDriver) -> (CaptureSession, MockProbe) {
        let probe = driver.probe();
        let mut session = CaptureSession::new(Box::new(driver));
        session.prepare().await.unwrap();
        (session, probe)
    }

    #[tokio::test]
    async fn test_prepare_prefers_rear() {
        let (session, probe) = running_session(MockDriver::new()).await;

        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(session.current_position(), Some(CameraPosition::Rear));
        assert!(session.preview_surface().is_ok());
        assert_eq!(probe.attached_inputs().len(), 1);
    }

    #[tokio::test]
    async fn test_prepare_requires_authorization_then_retries() {
        let driver = MockDriver::new().with_authorization(AuthorizationStatus::NotDetermined);
        let probe = driver.probe();
        let mut session = CaptureSession::new(Box::new(driver));

        let err = session.prepare().await.unwrap_err();
        assert_eq!(err, CameraError::AuthorizationRequired);
        assert_eq!(session.state(), SessionState::Uninitialized);

        probe.grant_authorization();
        session.prepare().await.unwrap();
        assert_eq!(session.state(), SessionState::Running);
    }

    #[tokio::test]
    async fn test_prepare_reports_denied_authorization() {
        let driver = MockDriver::new().with_authorization(AuthorizationStatus::Denied);
        let mut session = CaptureSession::new(Box::new(driver));

        assert_eq!(
            session.prepare().await.unwrap_err(),
            CameraError::AuthorizationDenied
        );
    }

    #[tokio::test]
    async fn test_prepare_without_cameras_is_retryable() {
        let mut session = CaptureSession::new(Box::new(MockDriver::without_cameras()));

        assert_eq!(
            session.prepare().await.unwrap_err(),
            CameraError::NoCamerasAvailable
        );
        assert_eq!(session.state(), SessionState::Uninitialized);

        // A retry from Uninitialized is legal and fails the same way.
        assert_eq!(
            session.prepare().await.unwrap_err(),
            CameraError::NoCamerasAvailable
        );
    }

    #[tokio::test]
    async fn test_switch_without_front_camera_is_invalid() {
        let (mut session, _probe) = running_session(MockDriver::rear_only()).await;

        assert_eq!(session.current_position(), Some(CameraPosition::Rear));
        assert_eq!(
            session.switch_input().unwrap_err(),
            CameraError::InvalidOperation
        );
        // Session stays usable.
        assert_eq!(session.state(), SessionState::Running);
    }

    #[tokio::test]
    async fn test_switch_is_transactional_and_single_input() {
        let (mut session, probe) = running_session(MockDriver::new()).await;

        session.switch_input().unwrap();
        assert_eq!(session.current_position(), Some(CameraPosition::Front));
        session.switch_input().unwrap();
        assert_eq!(session.current_position(), Some(CameraPosition::Rear));

        assert_eq!(probe.attached_inputs().len(), 1);
        assert_eq!(probe.max_simultaneous_inputs(), 1);
        assert!(!probe.detached_outside_transaction());
    }

    #[tokio::test]
    async fn test_switch_resets_zoom() {
        let (mut session, probe) = running_session(MockDriver::new()).await;

        // Zoom in on the rear camera, then switch to front and back.
        let rear_id = session.active_device().unwrap().id().clone();
        {
            let mut guard =
                ConfigGuard::acquire(session.driver_mut(), rear_id.clone()).unwrap();
            guard.set_zoom_factor(3.0).unwrap();
        }
        assert_eq!(session.current_zoom().unwrap(), 3.0);

        session.switch_input().unwrap();
        assert_eq!(session.current_zoom().unwrap(), 1.0);

        session.switch_input().unwrap();
        assert_eq!(session.current_zoom().unwrap(), 1.0);
        assert_eq!(probe.zoom_factor(&rear_id), 1.0);
    }

    #[tokio::test]
    async fn test_switch_rolls_back_on_rejected_input() {
        let (mut session, probe) = running_session(MockDriver::new()).await;
        let front_id = DeviceId::new("mock-front-wide");
        probe.refuse_input(&front_id);

        assert_eq!(
            session.switch_input().unwrap_err(),
            CameraError::InputsInvalid
        );
        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(session.current_position(), Some(CameraPosition::Rear));
        assert_eq!(probe.attached_inputs().len(), 1);
    }

    #[tokio::test]
    async fn test_switch_refused_while_busy() {
        let (mut session, _probe) = running_session(MockDriver::new()).await;

        session.mark_busy();
        assert_eq!(
            session.switch_input().unwrap_err(),
            CameraError::InvalidOperation
        );
        session.clear_busy();
        session.switch_input().unwrap();
    }

    #[tokio::test]
    async fn test_capture_requires_running_session() {
        let mut session = CaptureSession::new(Box::new(MockDriver::new()));

        assert_eq!(
            session.capture_one_photo(FlashMode::Off).await.unwrap_err(),
            CameraError::CaptureSessionMissing
        );
    }

    #[tokio::test]
    async fn test_capture_passes_flash_and_orients_frames() {
        let (mut session, probe) = running_session(MockDriver::new()).await;

        let rear_frame = session.capture_one_photo(FlashMode::On).await.unwrap();
        assert_eq!(rear_frame.orientation(), Orientation::Upright);

        session.switch_input().unwrap();
        let front_frame = session.capture_one_photo(FlashMode::Off).await.unwrap();
        assert_eq!(front_frame.orientation(), Orientation::LeftMirrored);

        assert_eq!(
            probe.capture_flash_modes(),
            vec![FlashMode::On, FlashMode::Off]
        );
    }

    #[tokio::test]
    async fn test_stop_retires_session() {
        let (mut session, probe) = running_session(MockDriver::new()).await;

        session.stop();
        assert_eq!(session.state(), SessionState::Stopped);
        assert!(!probe.streaming());
        assert!(session.preview_surface().is_err());
    }
}
