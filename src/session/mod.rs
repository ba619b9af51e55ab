// Session counting module
// Rep events, the two-source aggregator, and its snapshot view

pub mod aggregator;
pub mod types;

pub use aggregator::SessionAggregator;
pub use types::{CompletionPolicy, RepEvent, RepSource, SessionSnapshot};
