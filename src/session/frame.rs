//! Captured frame types and the preview hand-off payload.

use crate::hardware::FrameData;

/// Display orientation hint for a captured frame, derived from which
/// camera produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Rear-camera frame, shown as captured.
    Upright,
    /// Front-camera frame, mirrored horizontally for a natural selfie.
    LeftMirrored,
}

/// One captured photo with its metadata.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    data: FrameData,
    orientation: Orientation,
    sequence: u32,
}

impl CapturedFrame {
    /// Creates a frame from a driver payload.
    pub fn new(data: FrameData, orientation: Orientation, sequence: u32) -> Self {
        Self {
            data,
            orientation,
            sequence,
        }
    }

    /// Returns the raw image payload.
    pub fn data(&self) -> &FrameData {
        &self.data
    }

    /// Returns the orientation hint.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Returns the sequence index (0 for single shots, 0..4 within a
    /// burst).
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Returns the frame re-tagged with a burst sequence index.
    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence;
        self
    }
}

/// The ordered frame payload handed to the preview collaborator.
///
/// Display, compression, and export are external concerns; this type only
/// guarantees ordering and the single/burst distinction.
#[derive(Debug, Clone)]
pub struct PreviewFrames {
    frames: Vec<CapturedFrame>,
    is_burst: bool,
}

impl PreviewFrames {
    /// Wraps a single still capture.
    pub fn still(frame: CapturedFrame) -> Self {
        Self {
            frames: vec![frame],
            is_burst: false,
        }
    }

    /// Wraps a completed burst, already in sequence order.
    pub fn burst(frames: Vec<CapturedFrame>) -> Self {
        Self {
            frames,
            is_burst: true,
        }
    }

    /// Returns the frames in sequence order.
    pub fn frames(&self) -> &[CapturedFrame] {
        &self.frames
    }

    /// True when this payload is a burst sequence.
    pub fn is_burst(&self) -> bool {
        self.is_burst
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(sequence: u32) -> CapturedFrame {
        CapturedFrame::new(
            FrameData {
                pixels: vec![0u8; 16],
                width: 4,
                height: 4,
            },
            Orientation::Upright,
            sequence,
        )
    }

    #[test]
    fn test_still_payload() {
        let payload = PreviewFrames::still(frame(0));
        assert!(!payload.is_burst());
        assert_eq!(payload.frames().len(), 1);
    }

    #[test]
    fn test_burst_payload_preserves_order() {
        let payload = PreviewFrames::burst((0..5).map(frame).collect());
        assert!(payload.is_burst());
        let sequences: Vec<u32> = payload.frames().iter().map(|f| f.sequence()).collect();
        assert_eq!(sequences, vec![0, 1, 2, 3, 4]);
    }
}
