// Classifier adapter
// Owns preprocessing, backend dispatch, and mapping-table resolution.
// Inference faults are contained here: the detection loop always receives a
// well-formed ClassificationResult.

use thiserror::Error;

use crate::classifier::heuristic::MotionHeuristic;
use crate::classifier::label_map::{LabelMap, LabelMapError};
#[cfg(feature = "onnx")]
use crate::classifier::onnx::OnnxModel;
use crate::classifier::types::{ClassificationResult, Frame};

/// Errors that can occur while building or running a classifier
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("model loading failed: {0}")]
    ModelLoad(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error(transparent)]
    LabelMap(#[from] LabelMapError),
}

/// Selected scoring backend
pub enum Backend {
    /// Rule-based motion heuristic; always available, needs no artifact
    Heuristic(MotionHeuristic),

    /// Pre-trained ONNX artifact (requires the `onnx` cargo feature)
    #[cfg(feature = "onnx")]
    Onnx(OnnxModel),
}

impl Backend {
    fn arity(&self) -> usize {
        match self {
            Backend::Heuristic(_) => 3,
            #[cfg(feature = "onnx")]
            Backend::Onnx(model) => model.arity(),
        }
    }

    fn score(&mut self, input: &[f32]) -> Result<Vec<f32>, ClassifierError> {
        match self {
            Backend::Heuristic(h) => Ok(h.score(input)),
            #[cfg(feature = "onnx")]
            Backend::Onnx(model) => model.score(input),
        }
    }
}

/// Wraps an opaque scoring backend behind the fixed label set.
///
/// `classify` never fails: malformed frames, inference errors, and
/// wrong-shape outputs all collapse to the deterministic fallback result so
/// a transient fault cannot take down the detection loop.
pub struct ClassifierAdapter {
    backend: Backend,
    labels: LabelMap,
}

impl ClassifierAdapter {
    /// Build an adapter, validating the mapping table against the backend's
    /// output arity once, up front.
    pub fn new(backend: Backend, labels: LabelMap) -> Result<Self, ClassifierError> {
        labels.validate(backend.arity())?;
        Ok(ClassifierAdapter { backend, labels })
    }

    /// Heuristic-backed adapter with the standard identity table
    pub fn heuristic() -> Self {
        ClassifierAdapter {
            backend: Backend::Heuristic(MotionHeuristic::new()),
            labels: LabelMap::standard(),
        }
    }

    /// Classify one frame
    pub fn classify(&mut self, frame: &Frame) -> ClassificationResult {
        if !frame.is_well_formed() {
            log::warn!(
                "dropping malformed frame ({}x{}, {} bytes)",
                frame.width,
                frame.height,
                frame.pixels.len()
            );
            return ClassificationResult::fallback();
        }

        let input = preprocess(frame);
        match self.backend.score(&input) {
            Ok(scores) => self.parse_scores(&scores),
            Err(e) => {
                log::warn!("inference failed, substituting fallback: {}", e);
                ClassificationResult::fallback()
            }
        }
    }

    /// Argmax over the score vector, resolved through the mapping table.
    /// A score vector whose length disagrees with the table is malformed
    /// output and yields the fallback.
    fn parse_scores(&self, scores: &[f32]) -> ClassificationResult {
        if scores.len() != self.labels.arity() {
            log::warn!(
                "malformed model output: {} scores, expected {}",
                scores.len(),
                self.labels.arity()
            );
            return ClassificationResult::fallback();
        }

        let (class_id, raw) = scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, &s)| (i, s))
            .unwrap_or((0, 0.0));

        ClassificationResult {
            class_id,
            class: self.labels.resolve(class_id),
            confidence: raw.clamp(0.0, 1.0),
        }
    }
}

/// Linear map from [0, 255] pixel values to the [-1, 1] range the model was
/// trained on, in row-major HWC order.
fn preprocess(frame: &Frame) -> Vec<f32> {
    frame
        .pixels
        .iter()
        .map(|&p| (p as f32 / 127.0) - 1.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::types::{PoseClass, FRAME_CHANNELS, FRAME_HEIGHT, FRAME_WIDTH};

    #[test]
    fn test_preprocess_range() {
        let mut frame = Frame::black();
        frame.pixels[0] = 255;
        let input = preprocess(&frame);
        assert!((input[0] - 1.007).abs() < 0.01);
        assert!((input[1] + 1.0).abs() < f32::EPSILON);
        assert_eq!(input.len(), FRAME_WIDTH * FRAME_HEIGHT * FRAME_CHANNELS);
    }

    #[test]
    fn test_malformed_frame_yields_fallback() {
        let mut adapter = ClassifierAdapter::heuristic();
        let bad = Frame::new(64, 64, vec![0; 64 * 64 * 3]);
        let result = adapter.classify(&bad);
        assert_eq!(result.class, PoseClass::Relax);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_wrong_length_scores_yield_fallback() {
        let adapter = ClassifierAdapter::heuristic();
        let result = adapter.parse_scores(&[0.1, 0.2, 0.3, 0.4]);
        assert_eq!(result.class_id, 0);
        assert_eq!(result.class, PoseClass::Relax);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_argmax_resolves_through_table() {
        let adapter = ClassifierAdapter::heuristic();
        let result = adapter.parse_scores(&[0.1, 0.2, 0.9]);
        assert_eq!(result.class_id, 2);
        assert_eq!(result.class, PoseClass::Curl);
        assert!((result.confidence - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_confidence_clamped_to_unit_range() {
        let adapter = ClassifierAdapter::heuristic();
        let result = adapter.parse_scores(&[3.0, 0.1, 0.2]);
        assert_eq!(result.class, PoseClass::Relax);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_mapping_table_validated_at_construction() {
        let backend = Backend::Heuristic(MotionHeuristic::new());
        let too_wide = LabelMap::with_folds(&[PoseClass::Move]);
        assert!(ClassifierAdapter::new(backend, too_wide).is_err());
    }

    #[test]
    fn test_classify_well_formed_frame() {
        let mut adapter = ClassifierAdapter::heuristic();
        let result = adapter.classify(&Frame::black());
        // First frame through the heuristic defaults to Relax
        assert_eq!(result.class, PoseClass::Relax);
        assert!(result.confidence > 0.0);
    }
}
