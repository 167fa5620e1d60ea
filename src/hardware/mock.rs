//! Deterministic in-memory camera driver for tests and demos.
//!
//! `MockDriver` models the full driver contract: a two-camera device
//! (rear with torch, front without), the session graph, configuration
//! locking, and scripted capture latencies/failures. A [`MockProbe`]
//! shares the driver's state so tests can keep scripting and observing
//! it after the driver has been moved into a session.

use super::driver::{
    AuthorizationStatus, CameraDriver, CameraError, ExposureMode, FlashMode, FocusMode, FrameData,
    PreviewSurface, SensorPoint,
};
use crate::device::{Capabilities, CameraDevice, CameraPosition, DeviceId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

const FRAME_WIDTH: u32 = 64;
const FRAME_HEIGHT: u32 = 48;

/// One scripted capture: how long the pipeline takes and whether it
/// fails.
#[derive(Debug, Clone, Default)]
struct CaptureStep {
    latency: Duration,
    error: Option<String>,
}

/// Per-device mutable hardware state.
#[derive(Debug, Clone, Default)]
struct DeviceState {
    zoom: f32,
    torch_on: bool,
    focus_mode: Option<FocusMode>,
    exposure_mode: Option<ExposureMode>,
    focus_point: Option<SensorPoint>,
    exposure_point: Option<SensorPoint>,
    subject_monitoring: bool,
}

#[derive(Debug)]
struct MockState {
    authorization: AuthorizationStatus,
    devices: Vec<CameraDevice>,
    device_state: HashMap<DeviceId, DeviceState>,
    session_created: bool,
    inputs: Vec<DeviceId>,
    max_inputs_seen: usize,
    output_attached: bool,
    streaming: bool,
    config_depth: u32,
    detached_outside_transaction: bool,
    locked: HashSet<DeviceId>,
    lock_acquisitions: u32,
    refuse_locks: bool,
    refused_inputs: HashSet<DeviceId>,
    torch_on_calls: u32,
    torch_off_calls: u32,
    capture_script: VecDeque<CaptureStep>,
    capture_starts: Vec<Instant>,
    capture_flash_modes: Vec<FlashMode>,
    captures_taken: u64,
}

impl MockState {
    fn with_devices(devices: Vec<CameraDevice>) -> Self {
        let device_state = devices
            .iter()
            .map(|d| {
                (
                    d.id().clone(),
                    DeviceState {
                        zoom: 1.0,
                        ..DeviceState::default()
                    },
                )
            })
            .collect();
        Self {
            authorization: AuthorizationStatus::Authorized,
            devices,
            device_state,
            session_created: false,
            inputs: Vec::new(),
            max_inputs_seen: 0,
            output_attached: false,
            streaming: false,
            config_depth: 0,
            detached_outside_transaction: false,
            locked: HashSet::new(),
            lock_acquisitions: 0,
            refuse_locks: false,
            refused_inputs: HashSet::new(),
            torch_on_calls: 0,
            torch_off_calls: 0,
            capture_script: VecDeque::new(),
            capture_starts: Vec::new(),
            capture_flash_modes: Vec::new(),
            captures_taken: 0,
        }
    }
}

fn rear_device() -> CameraDevice {
    CameraDevice::new(
        DeviceId::new("mock-rear-wide"),
        CameraPosition::Rear,
        Capabilities {
            has_torch: true,
            supports_focus_poi: true,
            supports_exposure_poi: true,
            supports_continuous_focus: true,
            supports_continuous_exposure: true,
            max_zoom_factor: 16.0,
        },
    )
}

fn front_device() -> CameraDevice {
    CameraDevice::new(
        DeviceId::new("mock-front-wide"),
        CameraPosition::Front,
        Capabilities {
            has_torch: false,
            supports_focus_poi: true,
            supports_exposure_poi: true,
            supports_continuous_focus: true,
            supports_continuous_exposure: true,
            max_zoom_factor: 4.0,
        },
    )
}

/// Mock camera driver with deterministic, scriptable behavior.
#[derive(Debug)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    /// A device with both a rear and a front camera, authorized.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::with_devices(vec![
                rear_device(),
                front_device(),
            ]))),
        }
    }

    /// Hardware with only a rear camera.
    pub fn rear_only() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::with_devices(vec![rear_device()]))),
        }
    }

    /// Hardware with only a front camera.
    pub fn front_only() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::with_devices(vec![front_device()]))),
        }
    }

    /// Hardware with no cameras at all.
    pub fn without_cameras() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::with_devices(Vec::new()))),
        }
    }

    /// Overrides the initial authorization status.
    pub fn with_authorization(self, status: AuthorizationStatus) -> Self {
        self.state_mut().authorization = status;
        self
    }

    /// Returns a probe sharing this driver's state.
    pub fn probe(&self) -> MockProbe {
        MockProbe {
            state: Arc::clone(&self.state),
        }
    }

    fn state_mut(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CameraDriver for MockDriver {
    fn authorization_status(&self) -> AuthorizationStatus {
        self.state_mut().authorization
    }

    fn enumerate_devices(&mut self) -> Result<Vec<CameraDevice>, CameraError> {
        Ok(self.state_mut().devices.clone())
    }

    fn create_session(&mut self) -> Result<(), CameraError> {
        let mut s = self.state_mut();
        s.session_created = true;
        Ok(())
    }

    fn begin_configuration(&mut self) {
        self.state_mut().config_depth += 1;
    }

    fn commit_configuration(&mut self) {
        let mut s = self.state_mut();
        s.config_depth = s.config_depth.saturating_sub(1);
    }

    fn attach_input(&mut self, device: &DeviceId) -> Result<(), CameraError> {
        let mut s = self.state_mut();
        if !s.session_created {
            return Err(CameraError::CaptureSessionMissing);
        }
        if s.refused_inputs.contains(device) {
            return Err(CameraError::InputsInvalid);
        }
        if s.inputs.contains(device) {
            return Err(CameraError::InvalidOperation);
        }
        s.inputs.push(device.clone());
        s.max_inputs_seen = s.max_inputs_seen.max(s.inputs.len());
        Ok(())
    }

    fn detach_input(&mut self, device: &DeviceId) -> Result<(), CameraError> {
        let mut s = self.state_mut();
        let Some(index) = s.inputs.iter().position(|id| id == device) else {
            return Err(CameraError::InvalidOperation);
        };
        if s.config_depth == 0 && s.streaming {
            s.detached_outside_transaction = true;
        }
        s.inputs.remove(index);
        Ok(())
    }

    fn attach_photo_output(&mut self) -> Result<(), CameraError> {
        let mut s = self.state_mut();
        if !s.session_created {
            return Err(CameraError::CaptureSessionMissing);
        }
        s.output_attached = true;
        Ok(())
    }

    fn start_streaming(&mut self) -> Result<(), CameraError> {
        let mut s = self.state_mut();
        if !s.session_created || s.inputs.is_empty() || !s.output_attached {
            return Err(CameraError::CaptureSessionMissing);
        }
        s.streaming = true;
        Ok(())
    }

    fn stop_streaming(&mut self) {
        self.state_mut().streaming = false;
    }

    fn is_streaming(&self) -> bool {
        self.state_mut().streaming
    }

    fn preview_surface(&self) -> Result<PreviewSurface, CameraError> {
        let s = self.state_mut();
        if !s.streaming {
            return Err(CameraError::CaptureSessionMissing);
        }
        Ok(PreviewSurface::new(0x51D0))
    }

    async fn capture_photo(
        &mut self,
        _device: &DeviceId,
        flash: FlashMode,
    ) -> Result<FrameData, CameraError> {
        let (step, sequence) = {
            let mut s = self.state_mut();
            if !s.streaming {
                return Err(CameraError::CaptureSessionMissing);
            }
            s.capture_starts.push(Instant::now());
            s.capture_flash_modes.push(flash);
            s.captures_taken += 1;
            let step = s.capture_script.pop_front().unwrap_or_default();
            (step, s.captures_taken)
        };

        if !step.latency.is_zero() {
            tokio::time::sleep(step.latency).await;
        }
        if let Some(message) = step.error {
            return Err(CameraError::CaptureFailed(message));
        }

        let count = (FRAME_WIDTH * FRAME_HEIGHT) as usize;
        let pixels = (0..count)
            .map(|i| ((i as u64 ^ sequence) % 256) as u8)
            .collect();
        Ok(FrameData {
            pixels,
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
        })
    }

    fn lock_configuration(&mut self, device: &DeviceId) -> Result<(), CameraError> {
        let mut s = self.state_mut();
        if s.refuse_locks || s.locked.contains(device) {
            return Err(CameraError::ConfigurationFailed);
        }
        s.locked.insert(device.clone());
        s.lock_acquisitions += 1;
        Ok(())
    }

    fn unlock_configuration(&mut self, device: &DeviceId) {
        self.state_mut().locked.remove(device);
    }

    fn set_focus_mode(&mut self, device: &DeviceId, mode: FocusMode) -> Result<(), CameraError> {
        let mut s = self.state_mut();
        if !s.locked.contains(device) {
            return Err(CameraError::ConfigurationFailed);
        }
        if let Some(d) = s.device_state.get_mut(device) {
            d.focus_mode = Some(mode);
        }
        Ok(())
    }

    fn set_focus_point(
        &mut self,
        device: &DeviceId,
        point: SensorPoint,
    ) -> Result<(), CameraError> {
        let mut s = self.state_mut();
        if !s.locked.contains(device) {
            return Err(CameraError::ConfigurationFailed);
        }
        if let Some(d) = s.device_state.get_mut(device) {
            d.focus_point = Some(point);
        }
        Ok(())
    }

    fn set_exposure_mode(
        &mut self,
        device: &DeviceId,
        mode: ExposureMode,
    ) -> Result<(), CameraError> {
        let mut s = self.state_mut();
        if !s.locked.contains(device) {
            return Err(CameraError::ConfigurationFailed);
        }
        if let Some(d) = s.device_state.get_mut(device) {
            d.exposure_mode = Some(mode);
        }
        Ok(())
    }

    fn set_exposure_point(
        &mut self,
        device: &DeviceId,
        point: SensorPoint,
    ) -> Result<(), CameraError> {
        let mut s = self.state_mut();
        if !s.locked.contains(device) {
            return Err(CameraError::ConfigurationFailed);
        }
        if let Some(d) = s.device_state.get_mut(device) {
            d.exposure_point = Some(point);
        }
        Ok(())
    }

    fn set_subject_area_monitoring(
        &mut self,
        device: &DeviceId,
        enabled: bool,
    ) -> Result<(), CameraError> {
        let mut s = self.state_mut();
        if !s.locked.contains(device) {
            return Err(CameraError::ConfigurationFailed);
        }
        if let Some(d) = s.device_state.get_mut(device) {
            d.subject_monitoring = enabled;
        }
        Ok(())
    }

    fn set_zoom_factor(&mut self, device: &DeviceId, factor: f32) -> Result<(), CameraError> {
        let mut s = self.state_mut();
        if !s.locked.contains(device) {
            return Err(CameraError::ConfigurationFailed);
        }
        if let Some(d) = s.device_state.get_mut(device) {
            d.zoom = factor;
        }
        Ok(())
    }

    fn zoom_factor(&self, device: &DeviceId) -> f32 {
        self.state_mut()
            .device_state
            .get(device)
            .map(|d| d.zoom)
            .unwrap_or(1.0)
    }

    fn set_torch(&mut self, device: &DeviceId, enabled: bool) -> Result<(), CameraError> {
        let mut s = self.state_mut();
        if !s.locked.contains(device) {
            return Err(CameraError::ConfigurationFailed);
        }
        if enabled {
            s.torch_on_calls += 1;
        } else {
            s.torch_off_calls += 1;
        }
        if let Some(d) = s.device_state.get_mut(device) {
            d.torch_on = enabled;
        }
        Ok(())
    }
}

/// Shared-state handle for scripting and inspecting a [`MockDriver`]
/// after it has been moved into a session.
#[derive(Debug, Clone)]
pub struct MockProbe {
    state: Arc<Mutex<MockState>>,
}

impl MockProbe {
    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Marks camera usage as authorized.
    pub fn grant_authorization(&self) {
        self.state().authorization = AuthorizationStatus::Authorized;
    }

    /// Marks camera usage as denied.
    pub fn deny_authorization(&self) {
        self.state().authorization = AuthorizationStatus::Denied;
    }

    /// Appends one successful capture with the given pipeline latency.
    pub fn script_capture(&self, latency: Duration) {
        self.state().capture_script.push_back(CaptureStep {
            latency,
            error: None,
        });
    }

    /// Appends a sequence of successful captures with the given
    /// latencies.
    pub fn script_captures(&self, latencies: &[Duration]) {
        for &latency in latencies {
            self.script_capture(latency);
        }
    }

    /// Appends one failing capture with the given pipeline latency.
    pub fn script_capture_failure(&self, latency: Duration, message: &str) {
        self.state().capture_script.push_back(CaptureStep {
            latency,
            error: Some(message.to_string()),
        });
    }

    /// Makes future `attach_input` calls for `device` fail.
    pub fn refuse_input(&self, device: &DeviceId) {
        self.state().refused_inputs.insert(device.clone());
    }

    /// Makes future lock acquisitions fail.
    pub fn refuse_locks(&self) {
        self.state().refuse_locks = true;
    }

    /// Instants at which capture requests reached the pipeline.
    pub fn capture_starts(&self) -> Vec<Instant> {
        self.state().capture_starts.clone()
    }

    /// Flash modes passed with each capture request, in order.
    pub fn capture_flash_modes(&self) -> Vec<FlashMode> {
        self.state().capture_flash_modes.clone()
    }

    /// Currently attached device inputs.
    pub fn attached_inputs(&self) -> Vec<DeviceId> {
        self.state().inputs.clone()
    }

    /// The largest number of inputs ever attached simultaneously.
    pub fn max_simultaneous_inputs(&self) -> usize {
        self.state().max_inputs_seen
    }

    /// Whether any input was detached outside a configuration
    /// transaction while streaming.
    pub fn detached_outside_transaction(&self) -> bool {
        self.state().detached_outside_transaction
    }

    /// Whether the session is streaming.
    pub fn streaming(&self) -> bool {
        self.state().streaming
    }

    /// Whether the torch is currently on for `device`.
    pub fn torch_enabled(&self, device: &DeviceId) -> bool {
        self.state()
            .device_state
            .get(device)
            .map(|d| d.torch_on)
            .unwrap_or(false)
    }

    /// Number of `set_torch(true)` calls that reached the hardware.
    pub fn torch_on_calls(&self) -> u32 {
        self.state().torch_on_calls
    }

    /// Number of `set_torch(false)` calls that reached the hardware.
    pub fn torch_off_calls(&self) -> u32 {
        self.state().torch_off_calls
    }

    /// Current zoom factor for `device`.
    pub fn zoom_factor(&self, device: &DeviceId) -> f32 {
        self.state()
            .device_state
            .get(device)
            .map(|d| d.zoom)
            .unwrap_or(1.0)
    }

    /// Last focus mode applied to `device`.
    pub fn focus_mode(&self, device: &DeviceId) -> Option<FocusMode> {
        self.state().device_state.get(device).and_then(|d| d.focus_mode)
    }

    /// Last exposure mode applied to `device`.
    pub fn exposure_mode(&self, device: &DeviceId) -> Option<ExposureMode> {
        self.state()
            .device_state
            .get(device)
            .and_then(|d| d.exposure_mode)
    }

    /// Last focus point applied to `device`.
    pub fn focus_point(&self, device: &DeviceId) -> Option<SensorPoint> {
        self.state().device_state.get(device).and_then(|d| d.focus_point)
    }

    /// Whether subject-area monitoring is enabled for `device`.
    pub fn subject_area_monitoring(&self, device: &DeviceId) -> bool {
        self.state()
            .device_state
            .get(device)
            .map(|d| d.subject_monitoring)
            .unwrap_or(false)
    }

    /// Number of configuration locks currently held.
    pub fn outstanding_locks(&self) -> usize {
        self.state().locked.len()
    }

    /// Total successful lock acquisitions.
    pub fn lock_acquisitions(&self) -> u32 {
        self.state().lock_acquisitions
    }
}
