// Edge-triggered debounce gate
// One primitive shared by both counting paths: the camera detector arms on
// curl onset, the wearable's symbol protocol arms on "1". Releasing while
// armed fires at most once per debounce window.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct EdgeTrigger {
    armed: bool,
    last_fire: Option<Instant>,
    window: Duration,
}

impl EdgeTrigger {
    pub fn new(window: Duration) -> Self {
        EdgeTrigger {
            armed: false,
            last_fire: None,
            window,
        }
    }

    /// Rising edge. Arming an already-armed trigger is a no-op.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Falling edge. Always disarms; returns true only when the trigger was
    /// armed and the last accepted fire is further back than the window.
    pub fn release(&mut self, now: Instant) -> bool {
        if !self.armed {
            return false;
        }
        self.armed = false;

        match self.last_fire {
            Some(t) if now.duration_since(t) <= self.window => false,
            _ => {
                self.last_fire = Some(now);
                true
            }
        }
    }

    /// Drop the armed flag and the debounce history (session reset)
    pub fn clear(&mut self) {
        self.armed = false;
        self.last_fire = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(1);

    #[test]
    fn test_release_without_arm_is_noop() {
        let mut t = EdgeTrigger::new(WINDOW);
        assert!(!t.release(Instant::now()));
    }

    #[test]
    fn test_arm_then_release_fires() {
        let mut t = EdgeTrigger::new(WINDOW);
        t.arm();
        assert!(t.is_armed());
        assert!(t.release(Instant::now()));
        assert!(!t.is_armed());
    }

    #[test]
    fn test_second_release_needs_rearm() {
        let mut t = EdgeTrigger::new(WINDOW);
        let base = Instant::now();
        t.arm();
        assert!(t.release(base));
        // Not re-armed: the falling edge alone does nothing
        assert!(!t.release(base + Duration::from_secs(5)));
    }

    #[test]
    fn test_fire_inside_window_is_suppressed() {
        let mut t = EdgeTrigger::new(WINDOW);
        let base = Instant::now();
        t.arm();
        assert!(t.release(base));

        t.arm();
        assert!(!t.release(base + Duration::from_millis(200)));
        // The suppressed release still disarmed
        assert!(!t.is_armed());
    }

    #[test]
    fn test_fire_at_exactly_the_window_is_suppressed() {
        let mut t = EdgeTrigger::new(WINDOW);
        let base = Instant::now();
        t.arm();
        assert!(t.release(base));

        t.arm();
        assert!(!t.release(base + WINDOW));
    }

    #[test]
    fn test_fire_beyond_window_is_accepted() {
        let mut t = EdgeTrigger::new(WINDOW);
        let base = Instant::now();
        t.arm();
        assert!(t.release(base));

        t.arm();
        assert!(t.release(base + WINDOW + Duration::from_millis(1)));
    }

    #[test]
    fn test_suppressed_fire_does_not_extend_the_window() {
        let mut t = EdgeTrigger::new(WINDOW);
        let base = Instant::now();
        t.arm();
        assert!(t.release(base));

        // Suppressed attempt at +0.9s must not push the window forward
        t.arm();
        assert!(!t.release(base + Duration::from_millis(900)));
        t.arm();
        assert!(t.release(base + Duration::from_millis(1100)));
    }

    #[test]
    fn test_clear_drops_armed_and_history() {
        let mut t = EdgeTrigger::new(WINDOW);
        let base = Instant::now();
        t.arm();
        assert!(t.release(base));

        t.arm();
        t.clear();
        assert!(!t.is_armed());
        // History cleared: a fire right after reset is accepted again
        t.arm();
        assert!(t.release(base + Duration::from_millis(100)));
    }
}
