//! Flash, torch, and screen-blast coordination.

mod coordinator;

pub use coordinator::{ActiveFlash, CaptureMode, FlashCoordinator, FlashPlan};
