// Acquisition and detection loops
// Two OS threads sharing the frame slot: one pumps the frame source, the
// other classifies the latest frame and drives the rep detector. Both poll
// the shared shutdown flag every iteration.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::classifier::{ClassifierAdapter, PoseClass};
use crate::detector::RepDetector;
use crate::runtime::frames::{FrameSlot, FrameSource};
use crate::session::SessionAggregator;

/// Most recent classified posture, for the presentation layer
pub struct PostureCell(AtomicU8);

impl PostureCell {
    pub fn new() -> Self {
        PostureCell(AtomicU8::new(PoseClass::Relax.index() as u8))
    }

    pub fn set(&self, class: PoseClass) {
        self.0.store(class.index() as u8, Ordering::SeqCst);
    }

    pub fn get(&self) -> PoseClass {
        PoseClass::from_index(self.0.load(Ordering::SeqCst) as usize).unwrap_or(PoseClass::Relax)
    }
}

impl Default for PostureCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Pump the frame source into the shared slot at the frame interval
pub fn spawn_acquisition(
    mut source: Box<dyn FrameSource>,
    slot: Arc<FrameSlot>,
    interval: Duration,
    shutdown: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        log::info!("acquisition loop started");
        while !shutdown.load(Ordering::SeqCst) {
            if let Some(frame) = source.next_frame() {
                slot.publish(frame);
            }
            thread::sleep(interval);
        }
        log::info!("acquisition loop stopped");
    })
}

/// Classify the latest frame and drive the rep detector. A missing frame is
/// skipped, never waited on; classification faults surface as the adapter's
/// fallback result and the loop keeps going.
pub fn spawn_detection(
    mut adapter: ClassifierAdapter,
    mut detector: RepDetector,
    slot: Arc<FrameSlot>,
    aggregator: Arc<SessionAggregator>,
    posture: Arc<PostureCell>,
    interval: Duration,
    shutdown: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        log::info!("detection loop started");
        while !shutdown.load(Ordering::SeqCst) {
            if detector.sync_epoch(aggregator.epoch()) {
                log::debug!("detector state cleared by session reset");
            }

            if let Some(frame) = slot.take() {
                let result = adapter.classify(&frame);
                log::debug!(
                    "prediction: {} ({:.2})",
                    result.class.as_str(),
                    result.confidence
                );
                posture.set(result.class);

                if let Some(event) = detector.observe(result.class, Instant::now()) {
                    aggregator.record(&event);
                }
            }

            thread::sleep(interval);
        }
        log::info!("detection loop stopped");
    })
}
