// Classification types
// Postural state labels, per-frame classification results, and the frame buffer

use serde::{Deserialize, Serialize};

/// Frame geometry the classifier expects. Frames of any other shape are
/// rejected by the adapter before they reach a backend.
pub const FRAME_WIDTH: usize = 224;
pub const FRAME_HEIGHT: usize = 224;
pub const FRAME_CHANNELS: usize = 3;

/// Postural states recognized by the on-device classifier
/// Label order is fixed by the model artifact: {0: Relax, 1: Move, 2: Curl}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoseClass {
    /// Arms at rest, no exercise in progress
    Relax,

    /// Active motion - the lifting phase of a rep, or unrelated movement
    Move,

    /// Curl position held - the top of a rep
    Curl,
}

impl PoseClass {
    /// All labels in artifact order
    pub const LABELS: [PoseClass; 3] = [PoseClass::Relax, PoseClass::Move, PoseClass::Curl];

    /// Index of this label in the artifact's fixed order
    pub fn index(&self) -> usize {
        match self {
            PoseClass::Relax => 0,
            PoseClass::Move => 1,
            PoseClass::Curl => 2,
        }
    }

    /// Label at the given artifact index, if in range
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::LABELS.get(idx).copied()
    }

    /// Human-readable name for status display
    pub fn as_str(&self) -> &'static str {
        match self {
            PoseClass::Relax => "Relax",
            PoseClass::Move => "Move",
            PoseClass::Curl => "Curl",
        }
    }
}

/// Result of classifying one frame
/// Immutable; produced once per frame and never persisted
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    /// Raw output index the backend selected
    pub class_id: usize,

    /// Semantic label after mapping-table resolution
    pub class: PoseClass,

    /// Confidence score for the selected label [0.0, 1.0]
    pub confidence: f32,
}

impl ClassificationResult {
    /// Deterministic fallback returned when inference fails or produces a
    /// malformed output: lowest-index label, zero confidence.
    pub fn fallback() -> Self {
        ClassificationResult {
            class_id: 0,
            class: PoseClass::Relax,
            confidence: 0.0,
        }
    }
}

/// An RGB frame handed to the classifier. Row-major, 8-bit, 3 channels.
#[derive(Clone)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl Frame {
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Self {
        Frame {
            width,
            height,
            pixels,
        }
    }

    /// An all-black frame of the expected geometry
    pub fn black() -> Self {
        Frame {
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            pixels: vec![0; FRAME_WIDTH * FRAME_HEIGHT * FRAME_CHANNELS],
        }
    }

    /// Whether the buffer matches the geometry the classifier expects
    pub fn is_well_formed(&self) -> bool {
        self.width == FRAME_WIDTH
            && self.height == FRAME_HEIGHT
            && self.pixels.len() == FRAME_WIDTH * FRAME_HEIGHT * FRAME_CHANNELS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_order_matches_artifact() {
        assert_eq!(PoseClass::from_index(0), Some(PoseClass::Relax));
        assert_eq!(PoseClass::from_index(1), Some(PoseClass::Move));
        assert_eq!(PoseClass::from_index(2), Some(PoseClass::Curl));
        assert_eq!(PoseClass::from_index(3), None);
    }

    #[test]
    fn test_index_round_trip() {
        for label in PoseClass::LABELS {
            assert_eq!(PoseClass::from_index(label.index()), Some(label));
        }
    }

    #[test]
    fn test_fallback_is_lowest_index_zero_confidence() {
        let r = ClassificationResult::fallback();
        assert_eq!(r.class_id, 0);
        assert_eq!(r.class, PoseClass::Relax);
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn test_frame_well_formed() {
        assert!(Frame::black().is_well_formed());

        let short = Frame::new(FRAME_WIDTH, FRAME_HEIGHT, vec![0; 10]);
        assert!(!short.is_well_formed());

        let wrong_dims = Frame::new(64, 64, vec![0; 64 * 64 * 3]);
        assert!(!wrong_dims.is_well_formed());
    }
}
