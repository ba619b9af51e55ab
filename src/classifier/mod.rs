// Frame classification module
// Label types, the output-index mapping table, scoring backends, and the
// adapter that contains their failures

pub mod adapter;
pub mod heuristic;
pub mod label_map;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod types;

pub use adapter::{Backend, ClassifierAdapter, ClassifierError};
pub use heuristic::{HeuristicConfig, MotionHeuristic};
pub use label_map::{LabelMap, LabelMapError};
#[cfg(feature = "onnx")]
pub use onnx::OnnxModel;
pub use types::{
    ClassificationResult, Frame, PoseClass, FRAME_CHANNELS, FRAME_HEIGHT, FRAME_WIDTH,
};
