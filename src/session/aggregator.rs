// Session aggregator
// Sole owner of the two rep counters. Every mutation goes through the
// methods here; the detection loop, the network listeners, and the
// presentation layer share one instance behind an Arc.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::session::types::{CompletionPolicy, RepEvent, RepSource, SessionSnapshot};

#[derive(Debug, Default)]
struct LastEvents {
    camera: Option<DateTime<Utc>>,
    external: Option<DateTime<Utc>>,
}

/// Process-lifetime counters for one exercise session.
///
/// Counters are monotonically non-decreasing between resets. A reset zeroes
/// both and bumps the epoch; increments racing a reset may be lost
/// (last-writer-wins), but a counter can never go negative.
pub struct SessionAggregator {
    camera: AtomicU64,
    external: AtomicU64,
    epoch: AtomicU64,
    completed: AtomicBool,
    target: Option<u64>,
    policy: CompletionPolicy,
    last_events: Mutex<LastEvents>,
    started_at: DateTime<Utc>,
}

impl SessionAggregator {
    pub fn new(target: Option<u64>, policy: CompletionPolicy) -> Self {
        SessionAggregator {
            camera: AtomicU64::new(0),
            external: AtomicU64::new(0),
            epoch: AtomicU64::new(0),
            completed: AtomicBool::new(false),
            target,
            policy,
            last_events: Mutex::new(LastEvents::default()),
            started_at: Utc::now(),
        }
    }

    /// Count one rep from the named source
    pub fn record(&self, event: &RepEvent) {
        let total = match event.source {
            RepSource::Camera => self.camera.fetch_add(1, Ordering::SeqCst) + 1,
            RepSource::External => self.external.fetch_add(1, Ordering::SeqCst) + 1,
        };
        self.touch(event.source);
        log::info!("{} count increased: {}", event.source.as_str(), total);
        self.check_completion();
    }

    /// Protocol (b): the wearable reports its own running total, which
    /// overwrites the external counter (absolute, not additive).
    pub fn set_external_absolute(&self, count: u64) {
        self.external.store(count, Ordering::SeqCst);
        self.touch(RepSource::External);
        log::info!("external count set to {}", count);
        self.check_completion();
    }

    /// Zero both counters and start a new epoch. Detector loops observe the
    /// epoch bump and clear their armed/debounce state before the next
    /// frame, so a stale armed flag can never fire across a reset.
    pub fn reset(&self) {
        self.camera.store(0, Ordering::SeqCst);
        self.external.store(0, Ordering::SeqCst);
        self.completed.store(false, Ordering::SeqCst);
        *self.last_events.lock().unwrap() = LastEvents::default();
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        log::info!("counts reset to zero (epoch {})", epoch);
    }

    /// Current reset epoch
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }

    /// Read-only view of the counters. Does not block increments beyond the
    /// snapshot itself.
    pub fn snapshot(&self) -> SessionSnapshot {
        let camera = self.camera.load(Ordering::SeqCst);
        let external = self.external.load(Ordering::SeqCst);
        let last = self.last_events.lock().unwrap();

        SessionSnapshot {
            camera_count: camera,
            external_count: external,
            weighted: camera.min(external),
            completed: self.completed.load(Ordering::SeqCst),
            epoch: self.epoch.load(Ordering::SeqCst),
            started_at: self.started_at,
            last_camera_event: last.camera,
            last_external_event: last.external,
        }
    }

    fn touch(&self, source: RepSource) {
        let mut last = self.last_events.lock().unwrap();
        match source {
            RepSource::Camera => last.camera = Some(Utc::now()),
            RepSource::External => last.external = Some(Utc::now()),
        }
    }

    /// Fires the completion signal exactly once per epoch
    fn check_completion(&self) {
        let Some(target) = self.target else {
            return;
        };
        let camera = self.camera.load(Ordering::SeqCst);
        let external = self.external.load(Ordering::SeqCst);
        let fused = match self.policy {
            CompletionPolicy::Sum => camera + external,
            CompletionPolicy::Camera => camera,
            CompletionPolicy::External => external,
        };
        if fused >= target && !self.completed.swap(true, Ordering::SeqCst) {
            log::info!("session target of {} reps reached", target);
        }
    }
}
