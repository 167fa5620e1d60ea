//! Discovery and classification of physical cameras.

use super::types::{CameraDevice, CameraPosition, DeviceSet};
use crate::hardware::{CameraDriver, CameraError, ConfigGuard, FocusMode};
use tracing::{debug, info};

/// Discovers available cameras and classifies them by position.
pub struct DeviceRegistry;

impl DeviceRegistry {
    /// Enumerates the driver's devices and returns the classified set.
    ///
    /// The first rear-facing wide-angle device becomes `rear`, the first
    /// front-facing device becomes `front`; hardware with only one of the
    /// two is legal. Fails with [`CameraError::NoCamerasAvailable`] when
    /// the driver reports no cameras at all.
    ///
    /// As a discovery-time side effect, continuous auto-focus is applied
    /// to the rear device when it supports it.
    pub fn discover(driver: &mut dyn CameraDriver) -> Result<DeviceSet, CameraError> {
        let devices = driver.enumerate_devices()?;
        if devices.is_empty() {
            return Err(CameraError::NoCamerasAvailable);
        }

        let mut front: Option<CameraDevice> = None;
        let mut rear: Option<CameraDevice> = None;

        for device in devices {
            match device.position() {
                CameraPosition::Front if front.is_none() => {
                    debug!(id = %device.id(), "classified front camera");
                    front = Some(device);
                }
                CameraPosition::Rear if rear.is_none() => {
                    debug!(id = %device.id(), "classified rear camera");
                    rear = Some(device);
                }
                position => {
                    debug!(id = %device.id(), %position, "ignoring extra camera");
                }
            }
        }

        if let Some(ref rear) = rear {
            if rear.capabilities().supports_continuous_focus {
                let mut guard = ConfigGuard::acquire(driver, rear.id().clone())?;
                guard.set_focus_mode(FocusMode::ContinuousAuto)?;
            }
        }

        info!(
            front = front.is_some(),
            rear = rear.is_some(),
            "camera discovery complete"
        );

        Ok(DeviceSet::new(front, rear))
    }
}
