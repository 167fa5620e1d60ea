//! Camera device descriptions produced by discovery.

use std::fmt;

/// Physical mounting position of a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraPosition {
    /// User-facing camera.
    Front,
    /// World-facing camera.
    Rear,
}

impl CameraPosition {
    /// Returns the other position.
    pub fn opposite(self) -> Self {
        match self {
            CameraPosition::Front => CameraPosition::Rear,
            CameraPosition::Rear => CameraPosition::Front,
        }
    }
}

impl fmt::Display for CameraPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraPosition::Front => write!(f, "front"),
            CameraPosition::Rear => write!(f, "rear"),
        }
    }
}

/// Stable identifier for a physical camera, assigned by the driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(String);

impl DeviceId {
    /// Creates an identifier from a driver-provided string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Capability flags reported by a device at discovery time.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    /// The device has a torch (continuous LED illumination).
    pub has_torch: bool,
    /// Focus point of interest can be set.
    pub supports_focus_poi: bool,
    /// Exposure point of interest can be set.
    pub supports_exposure_poi: bool,
    /// Continuous auto-focus is available.
    pub supports_continuous_focus: bool,
    /// Continuous auto-exposure is available.
    pub supports_continuous_exposure: bool,
    /// Maximum video zoom factor the device accepts.
    pub max_zoom_factor: f32,
}

/// A physical camera discovered on the device.
///
/// Immutable once discovered; the registry owns the canonical set and the
/// session layer refers to devices by clone of this description.
#[derive(Debug, Clone)]
pub struct CameraDevice {
    id: DeviceId,
    position: CameraPosition,
    capabilities: Capabilities,
}

impl CameraDevice {
    /// Creates a device description.
    pub fn new(id: DeviceId, position: CameraPosition, capabilities: Capabilities) -> Self {
        Self {
            id,
            position,
            capabilities,
        }
    }

    /// Returns the driver identifier.
    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    /// Returns the mounting position.
    pub fn position(&self) -> CameraPosition {
        self.position
    }

    /// Returns the capability flags.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }
}

/// The classified result of discovery: at most one camera per position.
#[derive(Debug, Clone, Default)]
pub struct DeviceSet {
    front: Option<CameraDevice>,
    rear: Option<CameraDevice>,
}

impl DeviceSet {
    /// Creates a set from classified devices.
    pub fn new(front: Option<CameraDevice>, rear: Option<CameraDevice>) -> Self {
        Self { front, rear }
    }

    /// Returns the device at `position`, if present.
    pub fn get(&self, position: CameraPosition) -> Option<&CameraDevice> {
        match position {
            CameraPosition::Front => self.front.as_ref(),
            CameraPosition::Rear => self.rear.as_ref(),
        }
    }

    /// Returns the preferred initial device: rear when present, front
    /// otherwise.
    pub fn preferred(&self) -> Option<&CameraDevice> {
        self.rear.as_ref().or(self.front.as_ref())
    }

    /// Returns true when no camera was discovered.
    pub fn is_empty(&self) -> bool {
        self.front.is_none() && self.rear.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps() -> Capabilities {
        Capabilities {
            has_torch: false,
            supports_focus_poi: true,
            supports_exposure_poi: true,
            supports_continuous_focus: true,
            supports_continuous_exposure: true,
            max_zoom_factor: 4.0,
        }
    }

    #[test]
    fn test_position_opposite() {
        assert_eq!(CameraPosition::Front.opposite(), CameraPosition::Rear);
        assert_eq!(CameraPosition::Rear.opposite(), CameraPosition::Front);
    }

    #[test]
    fn test_preferred_is_rear_when_both_present() {
        let front = CameraDevice::new(DeviceId::new("front-0"), CameraPosition::Front, caps());
        let rear = CameraDevice::new(DeviceId::new("rear-0"), CameraPosition::Rear, caps());
        let set = DeviceSet::new(Some(front), Some(rear));

        let preferred = set.preferred().unwrap();
        assert_eq!(preferred.position(), CameraPosition::Rear);
    }

    #[test]
    fn test_preferred_falls_back_to_front() {
        let front = CameraDevice::new(DeviceId::new("front-0"), CameraPosition::Front, caps());
        let set = DeviceSet::new(Some(front), None);

        assert_eq!(
            set.preferred().unwrap().position(),
            CameraPosition::Front
        );
        assert!(!set.is_empty());
        assert!(DeviceSet::default().is_empty());
    }
}
