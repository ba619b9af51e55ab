// Frame acquisition plumbing
// The frame source is an external collaborator: anything that can fill an
// RGB buffer on demand. Acquisition and detection share a single
// latest-frame slot; there is no queue, a slow consumer just misses frames.

use std::sync::Mutex;

use crate::classifier::types::{Frame, FRAME_CHANNELS, FRAME_HEIGHT, FRAME_WIDTH};

/// Supplies frames on demand. Camera capture backends implement this;
/// the shipped synthetic source drives the pipeline without hardware.
pub trait FrameSource: Send {
    /// The next frame, or None when none is ready yet. Must not block
    /// longer than one frame interval.
    fn next_frame(&mut self) -> Option<Frame>;
}

/// Single-slot handoff between the acquisition and detection loops.
/// Publishing overwrites; taking empties the slot (latest-frame-wins).
#[derive(Default)]
pub struct FrameSlot {
    latest: Mutex<Option<Frame>>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, frame: Frame) {
        *self.latest.lock().unwrap() = Some(frame);
    }

    pub fn take(&self) -> Option<Frame> {
        self.latest.lock().unwrap().take()
    }
}

/// Scripted stand-in for a camera: a bright square that holds low, lifts,
/// holds high, and lowers again, cycling forever. One full cycle walks the
/// classifier through Relax, Move, Curl and back, so the end-to-end
/// pipeline counts reps without any capture hardware.
pub struct SyntheticFrameSource {
    pattern: Vec<usize>,
    step: usize,
}

impl SyntheticFrameSource {
    /// Blob positions (top edge, px) for one rep cycle
    const BOTTOM: usize = 170;
    const TOP: usize = 10;
    const HOLD_FRAMES: usize = 8;

    pub fn new() -> Self {
        let mut pattern = Vec::new();
        pattern.extend(std::iter::repeat(Self::BOTTOM).take(Self::HOLD_FRAMES));
        pattern.extend([130, 90, 50]);
        pattern.extend(std::iter::repeat(Self::TOP).take(Self::HOLD_FRAMES));
        pattern.extend([50, 90, 130]);
        SyntheticFrameSource { pattern, step: 0 }
    }

    fn render(blob_y: usize) -> Frame {
        let mut pixels = vec![10u8; FRAME_WIDTH * FRAME_HEIGHT * FRAME_CHANNELS];
        for y in blob_y..(blob_y + 42).min(FRAME_HEIGHT) {
            for x in 91..133 {
                let base = (y * FRAME_WIDTH + x) * FRAME_CHANNELS;
                pixels[base] = 245;
                pixels[base + 1] = 245;
                pixels[base + 2] = 245;
            }
        }
        Frame::new(FRAME_WIDTH, FRAME_HEIGHT, pixels)
    }
}

impl Default for SyntheticFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for SyntheticFrameSource {
    fn next_frame(&mut self) -> Option<Frame> {
        let blob_y = self.pattern[self.step % self.pattern.len()];
        self.step += 1;
        Some(Self::render(blob_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_is_latest_wins() {
        let slot = FrameSlot::new();
        assert!(slot.take().is_none());

        slot.publish(Frame::black());
        let mut marked = Frame::black();
        marked.pixels[0] = 99;
        slot.publish(marked);

        let frame = slot.take().unwrap();
        assert_eq!(frame.pixels[0], 99);
        // Taking empties the slot
        assert!(slot.take().is_none());
    }

    #[test]
    fn test_synthetic_frames_are_well_formed() {
        let mut source = SyntheticFrameSource::new();
        for _ in 0..30 {
            assert!(source.next_frame().unwrap().is_well_formed());
        }
    }

    #[test]
    fn test_synthetic_pattern_cycles() {
        let mut source = SyntheticFrameSource::new();
        let len = source.pattern.len();
        let first = source.next_frame().unwrap();
        for _ in 1..len {
            source.next_frame();
        }
        let wrapped = source.next_frame().unwrap();
        assert_eq!(first.pixels, wrapped.pixels);
    }
}
