// Presentation module
// Counter rendering and in-session keyboard control

pub mod console;
pub mod control;

pub use console::{spawn_display, ConsoleSink, PresentationSink};
pub use control::{handle_command, spawn_control};
