// External device listeners
// Two selectable wearable protocols: a TCP symbol stream (edge-triggered,
// debounced) and an HTTP absolute-count push (last-write-wins)

pub mod http;
pub mod socket;

pub use http::{router, HttpState};
