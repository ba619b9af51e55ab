// Runtime module
// Frame plumbing and the concurrent loops that drive detection

pub mod frames;
pub mod loops;

pub use frames::{FrameSlot, FrameSource, SyntheticFrameSource};
pub use loops::{spawn_acquisition, spawn_detection, PostureCell};
