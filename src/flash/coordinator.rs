//! Flash planning for still and burst captures.
//!
//! A still photo uses the per-request hardware flash. A burst cannot:
//! the hardware flash will not stay lit across five captures at a 250 ms
//! cadence, so burst illumination is emulated — rear camera by holding
//! the torch on for the whole sequence, front camera by blasting the
//! screen to full brightness and restoring it afterwards.

use crate::control::DeviceConfigurator;
use crate::device::CameraPosition;
use crate::hardware::{CameraError, FlashMode, Screen};
use crate::session::CaptureSession;
use tracing::{debug, warn};

/// Which capture experience the user selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Single still photo.
    Still,
    /// Five-frame Alive burst.
    Alive,
}

/// How burst illumination is provided for one sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum FlashPlan {
    /// No illumination.
    None,
    /// Rear torch held on for the duration of the burst.
    RearTorch,
    /// Screen driven to full brightness; the pre-burst value is
    /// restored on deactivation.
    FrontScreenBlast {
        /// Brightness to restore when the burst ends.
        previous_brightness: f32,
    },
}

/// An activated flash plan. Deactivation is idempotent; the side effect
/// is reverted exactly once no matter how the burst ends.
#[derive(Debug)]
pub struct ActiveFlash {
    plan: FlashPlan,
    live: bool,
}

impl ActiveFlash {
    /// Returns the underlying plan.
    pub fn plan(&self) -> &FlashPlan {
        &self.plan
    }

    /// True when the illumination needs warm-up time before the first
    /// frame (the torch takes a moment to stabilize; a brightness
    /// change is effectively instant).
    pub fn needs_priming(&self) -> bool {
        matches!(self.plan, FlashPlan::RearTorch)
    }

    /// True until the plan has been deactivated.
    pub fn is_live(&self) -> bool {
        self.live
    }
}

/// Decides and applies flash side effects per capture mode and active
/// camera.
pub struct FlashCoordinator {
    screen: Box<dyn Screen>,
}

impl FlashCoordinator {
    /// Creates a coordinator over the given screen backlight.
    pub fn new(screen: Box<dyn Screen>) -> Self {
        Self { screen }
    }

    /// Per-request flash mode for a still capture.
    pub fn still_flash(flash_requested: bool) -> FlashMode {
        if flash_requested {
            FlashMode::On
        } else {
            FlashMode::Off
        }
    }

    /// Re-derives the session's stored flash mode when the capture mode
    /// changes: bursts never use the per-request flash, stills follow
    /// the user's toggle.
    pub fn sync_capture_mode(
        &self,
        session: &mut CaptureSession,
        mode: CaptureMode,
        flash_requested: bool,
    ) {
        let flash = match mode {
            CaptureMode::Alive => FlashMode::Off,
            CaptureMode::Still => Self::still_flash(flash_requested),
        };
        session.set_flash_mode(flash);
    }

    /// Computes and applies the burst flash plan for the active camera.
    ///
    /// With flash requested, the rear camera turns its torch on and the
    /// front camera records the current brightness before driving the
    /// screen to maximum.
    pub fn activate(
        &mut self,
        session: &mut CaptureSession,
        configurator: &DeviceConfigurator,
        flash_requested: bool,
    ) -> Result<ActiveFlash, CameraError> {
        if !flash_requested {
            return Ok(ActiveFlash {
                plan: FlashPlan::None,
                live: false,
            });
        }

        let plan = match session.active_device()?.position() {
            CameraPosition::Rear => {
                configurator.apply_torch(session, true)?;
                FlashPlan::RearTorch
            }
            CameraPosition::Front => {
                let previous_brightness = self.screen.brightness();
                self.screen.set_brightness(1.0);
                FlashPlan::FrontScreenBlast {
                    previous_brightness,
                }
            }
        };
        debug!(?plan, "flash plan activated");
        Ok(ActiveFlash { plan, live: true })
    }

    /// Reverts an activated plan: torch off, or brightness restored to
    /// its pre-burst value. Calling this again on the same plan is a
    /// no-op.
    pub fn deactivate(
        &mut self,
        session: &mut CaptureSession,
        configurator: &DeviceConfigurator,
        active: &mut ActiveFlash,
    ) {
        if !active.live {
            return;
        }
        match active.plan {
            FlashPlan::None => {}
            FlashPlan::RearTorch => {
                if let Err(e) = configurator.apply_torch(session, false) {
                    warn!(error = %e, "failed to turn torch off");
                }
            }
            FlashPlan::FrontScreenBlast {
                previous_brightness,
            } => {
                self.screen.set_brightness(previous_brightness);
            }
        }
        active.live = false;
        debug!(plan = ?active.plan, "flash plan deactivated");
    }
}
