//! Five-frame Alive burst scheduling.

mod scheduler;

pub use scheduler::{BurstPhase, BurstScheduler, FRAMES_PER_BURST};
