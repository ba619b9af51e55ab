// Rep detection state machine
// Consumes the per-frame classification stream and emits one event per
// completed curl-to-relax cycle. The classifier output is noisy frame to
// frame, so a rep requires the exact transition pair, not a single frame,
// and the debounce window rejects a second count inside the same motion.

use std::time::{Duration, Instant};

use crate::classifier::PoseClass;
use crate::detector::edge::EdgeTrigger;
use crate::session::{RepEvent, RepSource};

/// Two-state detector: `Idle` until a curl onset arms it, then back to
/// `Idle` on the direct Curl->Relax edge, counting if outside the debounce
/// window. Observing Move while armed leaves the armed flag untouched.
pub struct RepDetector {
    trigger: EdgeTrigger,
    prev: Option<PoseClass>,
    epoch: u64,
}

impl RepDetector {
    pub fn new(debounce: Duration) -> Self {
        RepDetector {
            trigger: EdgeTrigger::new(debounce),
            prev: None,
            epoch: 0,
        }
    }

    /// Feed the next classification. Returns a camera rep event when a
    /// cycle completes outside the debounce window.
    pub fn observe(&mut self, class: PoseClass, now: Instant) -> Option<RepEvent> {
        let prev = self.prev.replace(class);

        match (prev, class) {
            // Curl onset: anything-but-Curl -> Curl arms, no count yet
            (p, PoseClass::Curl) if p != Some(PoseClass::Curl) => {
                self.trigger.arm();
                log::debug!("curl position detected");
                None
            }
            // Only the direct Curl -> Relax edge disarms and may count
            (Some(PoseClass::Curl), PoseClass::Relax) => {
                if self.trigger.release(now) {
                    Some(RepEvent::new(RepSource::Camera, now))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.trigger.is_armed()
    }

    /// Return to `Idle`, dropping the armed flag and debounce history
    pub fn reset(&mut self) {
        self.trigger.clear();
        self.prev = None;
    }

    /// Clear detector state when the aggregator's reset epoch has moved.
    /// Returns true when a sync happened.
    pub fn sync_epoch(&mut self, epoch: u64) -> bool {
        if epoch == self.epoch {
            return false;
        }
        self.epoch = epoch;
        self.reset();
        true
    }
}
