// ONNX model backend (enabled with the `onnx` cargo feature)
// Wraps an exported classifier artifact behind the same score-vector
// contract as the heuristic backend.

use std::path::Path;

use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;

use crate::classifier::adapter::ClassifierError;
use crate::classifier::types::{FRAME_CHANNELS, FRAME_HEIGHT, FRAME_WIDTH};

/// Session wrapper around a pre-trained posture classifier.
/// Loaded once at startup; a missing or unreadable artifact is fatal there.
pub struct OnnxModel {
    session: Session,
    input_name: String,
    output_name: String,
    arity: usize,
}

impl OnnxModel {
    pub fn load(model_path: &Path) -> Result<Self, ClassifierError> {
        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.commit_from_file(model_path))
            .map_err(|e| ClassifierError::ModelLoad(e.to_string()))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| ClassifierError::ModelLoad("model declares no inputs".into()))?;
        let output = session
            .outputs
            .first()
            .ok_or_else(|| ClassifierError::ModelLoad("model declares no outputs".into()))?;
        let output_name = output.name.clone();

        // Output arity must be static so the mapping table can be validated
        // before the first frame arrives.
        let arity = output
            .output_type
            .tensor_dimensions()
            .and_then(|dims| dims.last().copied())
            .filter(|&d| d > 0)
            .map(|d| d as usize)
            .ok_or_else(|| {
                ClassifierError::ModelLoad("model output arity is not static".into())
            })?;

        Ok(OnnxModel {
            session,
            input_name,
            output_name,
            arity,
        })
    }

    /// Number of scores one inference produces
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Run one inference over the adapter's normalized [-1, 1] HWC buffer.
    /// Returns the flattened score vector; the adapter checks its length.
    pub fn score(&mut self, input: &[f32]) -> Result<Vec<f32>, ClassifierError> {
        let array = Array4::from_shape_vec(
            (1, FRAME_HEIGHT, FRAME_WIDTH, FRAME_CHANNELS),
            input.to_vec(),
        )
        .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let tensor =
            Tensor::from_array(array).map_err(|e| ClassifierError::Inference(e.to_string()))?;
        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => tensor])
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let scores: ndarray::ArrayViewD<f32> = outputs[self.output_name.as_str()]
            .try_extract_array()
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        Ok(scores.iter().copied().collect())
    }
}
