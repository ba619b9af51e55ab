// Console presentation sink
// Thin rendering edge: polls aggregator snapshots and redraws one status
// line. A desktop window is just another PresentationSink implementation.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::classifier::PoseClass;
use crate::runtime::PostureCell;
use crate::session::{SessionAggregator, SessionSnapshot};

/// Renders counter snapshots. Implementations must not block the loops
/// feeding the aggregator.
pub trait PresentationSink: Send {
    fn render(&mut self, snapshot: &SessionSnapshot, posture: PoseClass);
}

/// Side-by-side counter line on stdout
pub struct ConsoleSink;

impl PresentationSink for ConsoleSink {
    fn render(&mut self, snapshot: &SessionSnapshot, posture: PoseClass) {
        let done = if snapshot.completed { "  [target reached]" } else { "" };
        print!(
            "\rTFLite: {}  |  M5Stack: {}  |  Status: {}  |  Weighted: {}{}   ",
            snapshot.camera_count,
            snapshot.external_count,
            posture.as_str(),
            snapshot.weighted,
            done
        );
        let _ = std::io::stdout().flush();
    }
}

/// Redraw the sink on an interval until shutdown
pub fn spawn_display(
    mut sink: Box<dyn PresentationSink>,
    aggregator: Arc<SessionAggregator>,
    posture: Arc<PostureCell>,
    interval: Duration,
    shutdown: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while !shutdown.load(Ordering::SeqCst) {
            sink.render(&aggregator.snapshot(), posture.get());
            thread::sleep(interval);
        }
        // Leave the status line on its own row
        println!();
    })
}
