//! Timed five-frame burst capture.
//!
//! The scheduler issues captures strictly one at a time, aiming for a
//! 250 ms cadence between frame starts. Each frame's wait is computed
//! from that frame's own start time: a capture that finished late pushes
//! the next one out immediately, while a fast capture waits out the
//! remainder of the interval. Illumination for the whole sequence is a
//! flash plan that is activated before the first frame and deactivated
//! exactly once — on completion, on a failed frame, or on cancellation.

use crate::config::BurstTiming;
use crate::control::DeviceConfigurator;
use crate::flash::{ActiveFlash, FlashCoordinator};
use crate::hardware::{CameraError, FlashMode};
use crate::session::{CapturedFrame, CaptureSession, PreviewFrames};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Number of frames in one Alive burst.
pub const FRAMES_PER_BURST: usize = 5;

/// Scheduler state, advanced frame by frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstPhase {
    /// No burst in flight.
    Idle,
    /// Flash plan activated, waiting out its warm-up.
    Priming,
    /// Waiting for frame `i`'s capture result.
    Capturing(u8),
    /// Waiting out the cadence remainder after frame `i`.
    Pausing(u8),
    /// Reverting flash side effects and handing off frames.
    Finalizing,
}

/// Decides the wait before the next capture from how long the previous
/// one took: `None` when the capture already overran the nominal
/// interval (issue immediately), otherwise the remainder of the
/// interval. Anchored to the frame's own start, so one slow frame only
/// delays the frame immediately after it.
fn pause_before_next(elapsed: Duration, interval: Duration) -> Option<Duration> {
    if elapsed < interval {
        Some(interval - elapsed)
    } else {
        None
    }
}

/// Orchestrates one five-frame burst at a time.
pub struct BurstScheduler {
    timing: BurstTiming,
    phase: BurstPhase,
    frames: Vec<CapturedFrame>,
    active_flash: Option<ActiveFlash>,
}

impl BurstScheduler {
    /// Creates a scheduler with the given timing.
    pub fn new(timing: BurstTiming) -> Self {
        Self {
            timing,
            phase: BurstPhase::Idle,
            frames: Vec::with_capacity(FRAMES_PER_BURST),
            active_flash: None,
        }
    }

    /// Returns the current phase.
    pub fn phase(&self) -> BurstPhase {
        self.phase
    }

    /// True when no burst is in flight.
    pub fn is_idle(&self) -> bool {
        self.phase == BurstPhase::Idle
    }

    /// Runs one complete burst and returns the five frames in sequence
    /// order.
    ///
    /// Refuses to start unless `Idle`. For the whole run the session is
    /// marked busy, so camera switching and configuration are rejected.
    /// `progress` is invoked with the number of frames collected so far
    /// after each capture. If any frame fails, the remaining frames are
    /// abandoned, the flash plan is still deactivated, and the error is
    /// returned with no frames retained.
    pub async fn run<F>(
        &mut self,
        session: &mut CaptureSession,
        configurator: &mut DeviceConfigurator,
        flash: &mut FlashCoordinator,
        flash_requested: bool,
        mut progress: F,
    ) -> Result<PreviewFrames, CameraError>
    where
        F: FnMut(usize),
    {
        if self.phase != BurstPhase::Idle {
            return Err(CameraError::InvalidOperation);
        }
        session.mark_busy();
        self.phase = BurstPhase::Priming;

        let active = match flash.activate(session, configurator, flash_requested) {
            Ok(active) => active,
            Err(e) => {
                self.finalize(session, configurator, flash);
                return Err(e);
            }
        };
        let needs_priming = active.needs_priming();
        self.active_flash = Some(active);
        if needs_priming {
            // Torch illumination needs a moment to stabilize before the
            // first frame.
            sleep(self.timing.torch_priming()).await;
        }

        info!(flash = flash_requested, "burst capture started");
        for index in 0..FRAMES_PER_BURST {
            self.phase = BurstPhase::Capturing(index as u8);
            let started = Instant::now();

            let frame = match session.capture_one_photo(FlashMode::Off).await {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(frame = index, error = %e, "burst frame failed, aborting");
                    self.frames.clear();
                    self.finalize(session, configurator, flash);
                    return Err(e);
                }
            };
            self.frames.push(frame.with_sequence(index as u32));
            progress(self.frames.len());

            let elapsed = started.elapsed();
            if index + 1 < FRAMES_PER_BURST {
                match pause_before_next(elapsed, self.timing.interval()) {
                    Some(pause) => {
                        self.phase = BurstPhase::Pausing(index as u8);
                        sleep(pause).await;
                    }
                    None => {
                        // Already behind the cadence; issue the next
                        // capture immediately.
                        debug!(frame = index, elapsed_ms = elapsed.as_millis() as u64,
                            "capture ran past the interval");
                    }
                }
            }
        }

        sleep(self.timing.finalize_grace()).await;
        let frames = std::mem::take(&mut self.frames);
        self.finalize(session, configurator, flash);
        info!(frames = frames.len(), "burst capture complete");
        Ok(PreviewFrames::burst(frames))
    }

    /// Reverts side effects after an interrupted burst.
    ///
    /// Call after dropping an in-flight `run` future (screen dismissal):
    /// deactivates the flash plan, discards any collected frames, and
    /// returns the scheduler to `Idle`. Safe to call when already idle.
    pub fn cancel(
        &mut self,
        session: &mut CaptureSession,
        configurator: &mut DeviceConfigurator,
        flash: &mut FlashCoordinator,
    ) {
        if self.phase == BurstPhase::Idle && self.active_flash.is_none() {
            return;
        }
        warn!(phase = ?self.phase, "burst cancelled");
        self.frames.clear();
        self.finalize(session, configurator, flash);
    }

    fn finalize(
        &mut self,
        session: &mut CaptureSession,
        configurator: &mut DeviceConfigurator,
        flash: &mut FlashCoordinator,
    ) {
        self.phase = BurstPhase::Finalizing;
        if let Some(mut active) = self.active_flash.take() {
            flash.deactivate(session, configurator, &mut active);
        }
        session.clear_busy();
        self.phase = BurstPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BurstTiming;
    use crate::hardware::{MockDriver, MockProbe, MockScreen, Screen};
    use crate::session::Orientation;
    use proptest::prelude::*;

    struct Rig {
        session: CaptureSession,
        configurator: DeviceConfigurator,
        flash: FlashCoordinator,
        scheduler: BurstScheduler,
        probe: MockProbe,
        screen: MockScreen,
    }

    async fn rig(driver: MockDriver) -> Rig {
        let probe = driver.probe();
        let mut session = CaptureSession::new(Box::new(driver));
        session.prepare().await.unwrap();
        let screen = MockScreen::new(0.4);
        Rig {
            session,
            configurator: DeviceConfigurator::default(),
            flash: FlashCoordinator::new(Box::new(screen.clone())),
            scheduler: BurstScheduler::new(BurstTiming::default()),
            probe,
            screen,
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_pause_decision_table() {
        // Fast capture: wait out the remainder.
        assert_eq!(pause_before_next(ms(50), ms(250)), Some(ms(200)));
        // Exactly on the interval: nothing left to wait.
        assert_eq!(pause_before_next(ms(250), ms(250)), None);
        // Overran: issue immediately.
        assert_eq!(pause_before_next(ms(300), ms(250)), None);
    }

    proptest! {
        #[test]
        fn prop_pause_never_exceeds_interval(elapsed_ms in 0u64..2000) {
            let pause = pause_before_next(ms(elapsed_ms), ms(250));
            match pause {
                Some(p) => prop_assert!(p + ms(elapsed_ms) == ms(250)),
                None => prop_assert!(elapsed_ms >= 250),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_drift_compensation_schedule() {
        let mut r = rig(MockDriver::new()).await;
        r.probe
            .script_captures(&[ms(50), ms(300), ms(100), ms(280), ms(50)]);

        let result = r
            .scheduler
            .run(&mut r.session, &mut r.configurator, &mut r.flash, false, |_| {})
            .await
            .unwrap();
        assert_eq!(result.frames().len(), FRAMES_PER_BURST);

        let starts = r.probe.capture_starts();
        assert_eq!(starts.len(), 5);
        let gaps: Vec<Duration> = starts.windows(2).map(|w| w[1] - w[0]).collect();

        // Frame 0 took 50 ms: wait out the 200 ms remainder.
        assert_eq!(gaps[0], ms(250));
        // Frame 1 took 300 ms, past the interval: next starts immediately.
        assert_eq!(gaps[1], ms(300));
        // Frame 2 took 100 ms: wait 150 ms.
        assert_eq!(gaps[2], ms(250));
        // Frame 3 took 280 ms: immediate again.
        assert_eq!(gaps[3], ms(280));
    }

    #[tokio::test(start_paused = true)]
    async fn test_output_is_ordered_and_flagged() {
        let mut r = rig(MockDriver::new()).await;

        let mut progress = Vec::new();
        let result = r
            .scheduler
            .run(
                &mut r.session,
                &mut r.configurator,
                &mut r.flash,
                false,
                |count| progress.push(count),
            )
            .await
            .unwrap();

        assert!(result.is_burst());
        let sequences: Vec<u32> = result.frames().iter().map(|f| f.sequence()).collect();
        assert_eq!(sequences, vec![0, 1, 2, 3, 4]);
        assert_eq!(progress, vec![1, 2, 3, 4, 5]);
        assert!(r.scheduler.is_idle());
        assert!(!r.session.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rear_flash_primes_torch_before_first_frame() {
        let mut r = rig(MockDriver::new()).await;
        let rear_id = r.session.active_device().unwrap().id().clone();
        let began = Instant::now();

        r.scheduler
            .run(&mut r.session, &mut r.configurator, &mut r.flash, true, |_| {})
            .await
            .unwrap();

        let starts = r.probe.capture_starts();
        assert_eq!(starts[0] - began, ms(100));
        // Torch held for the sequence, then released exactly once.
        assert!(!r.probe.torch_enabled(&rear_id));
        assert_eq!(r.probe.torch_on_calls(), 1);
        assert_eq!(r.probe.torch_off_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_front_flash_blasts_screen_for_whole_burst() {
        let mut r = rig(MockDriver::front_only()).await;
        let began = Instant::now();

        let result = r
            .scheduler
            .run(&mut r.session, &mut r.configurator, &mut r.flash, true, |_| {})
            .await
            .unwrap();

        // No torch on the front camera: brightness is blasted instead,
        // with no priming delay, and restored once at finalize.
        assert_eq!(r.probe.capture_starts()[0] - began, ms(0));
        assert_eq!(r.screen.history(), vec![1.0, 0.4]);
        assert_eq!(r.screen.brightness(), 0.4);
        assert!(result
            .frames()
            .iter()
            .all(|f| f.orientation() == Orientation::LeftMirrored));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_frame_aborts_but_deactivates_flash() {
        let mut r = rig(MockDriver::new()).await;
        r.probe.script_captures(&[ms(50), ms(50)]);
        r.probe.script_capture_failure(ms(10), "pipeline stalled");

        let err = r
            .scheduler
            .run(&mut r.session, &mut r.configurator, &mut r.flash, true, |_| {})
            .await
            .unwrap_err();

        assert_eq!(err, CameraError::CaptureFailed("pipeline stalled".into()));
        // Frame 2 of 5 failed: nothing is retained, no further captures
        // were issued, and the torch came back off exactly once.
        assert_eq!(r.probe.capture_starts().len(), 3);
        assert_eq!(r.probe.torch_off_calls(), 1);
        assert!(r.scheduler.is_idle());
        assert!(!r.session.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_finalize_grace_delays_completion() {
        let mut r = rig(MockDriver::new()).await;
        r.probe
            .script_captures(&[ms(50), ms(50), ms(50), ms(50), ms(50)]);
        let began = Instant::now();

        r.scheduler
            .run(&mut r.session, &mut r.configurator, &mut r.flash, false, |_| {})
            .await
            .unwrap();

        // Four 250 ms cadence slots, the last 50 ms capture, then the
        // 100 ms grace before hand-off.
        assert_eq!(Instant::now() - began, ms(4 * 250 + 50 + 100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_burst_reverts_flash_and_discards_frames() {
        let mut r = rig(MockDriver::new()).await;
        let rear_id = r.session.active_device().unwrap().id().clone();
        r.probe.script_captures(&[ms(300); 5]);

        {
            let fut = r.scheduler.run(
                &mut r.session,
                &mut r.configurator,
                &mut r.flash,
                true,
                |_| {},
            );
            tokio::pin!(fut);
            tokio::select! {
                _ = &mut fut => panic!("burst should not finish in 150 ms"),
                _ = sleep(ms(150)) => {}
            }
        }

        // The dropped run left the scheduler mid-burst and the session
        // soft-locked; a new burst is refused until cancellation.
        assert!(!r.scheduler.is_idle());
        assert!(r.session.is_busy());
        assert!(r.probe.torch_enabled(&rear_id));
        let err = r
            .scheduler
            .run(&mut r.session, &mut r.configurator, &mut r.flash, false, |_| {})
            .await
            .unwrap_err();
        assert_eq!(err, CameraError::InvalidOperation);

        r.scheduler
            .cancel(&mut r.session, &mut r.configurator, &mut r.flash);
        assert!(r.scheduler.is_idle());
        assert!(!r.session.is_busy());
        assert!(!r.probe.torch_enabled(&rear_id));
        assert_eq!(r.probe.torch_off_calls(), 1);

        // Cancel is idempotent.
        r.scheduler
            .cancel(&mut r.session, &mut r.configurator, &mut r.flash);
        assert_eq!(r.probe.torch_off_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_and_zoom_rejected_during_burst() {
        let mut r = rig(MockDriver::new()).await;
        r.probe.script_captures(&[ms(300); 5]);

        {
            let fut = r.scheduler.run(
                &mut r.session,
                &mut r.configurator,
                &mut r.flash,
                false,
                |_| {},
            );
            tokio::pin!(fut);
            tokio::select! {
                _ = &mut fut => panic!("burst should not finish in 150 ms"),
                _ = sleep(ms(150)) => {}
            }
        }

        assert_eq!(
            r.session.switch_input().unwrap_err(),
            CameraError::InvalidOperation
        );
        assert_eq!(
            r.configurator.set_zoom(&mut r.session, 2.0).unwrap_err(),
            CameraError::InvalidOperation
        );
        r.scheduler
            .cancel(&mut r.session, &mut r.configurator, &mut r.flash);
        r.session.switch_input().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_captures_never_request_hardware_flash() {
        let mut r = rig(MockDriver::new()).await;

        r.scheduler
            .run(&mut r.session, &mut r.configurator, &mut r.flash, true, |_| {})
            .await
            .unwrap();

        assert!(r
            .probe
            .capture_flash_modes()
            .iter()
            .all(|mode| *mode == FlashMode::Off));
    }
}
