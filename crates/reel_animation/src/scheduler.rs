//! Frame scheduler
//!
//! One-shot frame requests in the style of `requestAnimationFrame`: a
//! request fires on the next [`FrameScheduler::begin_frame`] and is then
//! consumed. Requests made while handling a frame fire on the frame after.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::time::{Duration, Instant};

new_key_type! {
    pub struct FrameRequestId;
}

/// Result of starting a frame
#[derive(Clone, Debug, Default)]
pub struct FrameTick {
    /// Frame counter, starting at 1 for the first frame
    pub frame: u64,
    /// Wall time since the previous frame
    pub dt: Duration,
    /// Requests that fired on this frame
    pub fired: SmallVec<[FrameRequestId; 4]>,
}

impl FrameTick {
    /// Check whether a request fired on this frame
    pub fn fired(&self, id: FrameRequestId) -> bool {
        self.fired.contains(&id)
    }
}

/// Hands out frame requests and fires them once per display frame
pub struct FrameScheduler {
    pending: SlotMap<FrameRequestId, u64>,
    frame: u64,
    last_frame: Instant,
    target_fps: u32,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            pending: SlotMap::with_key(),
            frame: 0,
            last_frame: Instant::now(),
            target_fps: 60,
        }
    }

    pub fn set_target_fps(&mut self, fps: u32) {
        self.target_fps = fps.max(1);
    }

    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    /// Time between frames at the target frame rate
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.target_fps))
    }

    /// Request a callback on the next frame
    pub fn request_frame(&mut self) -> FrameRequestId {
        self.pending.insert(self.frame)
    }

    /// Cancel a pending request. Cancelling twice is harmless.
    pub fn cancel_frame(&mut self, id: FrameRequestId) -> bool {
        self.pending.remove(id).is_some()
    }

    pub fn is_pending(&self, id: FrameRequestId) -> bool {
        self.pending.contains_key(id)
    }

    /// Number of requests waiting for the next frame
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Frames started so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Start a frame, consuming every pending request
    pub fn begin_frame(&mut self) -> FrameTick {
        let now = Instant::now();
        let dt = now - self.last_frame;
        self.last_frame = now;
        self.frame += 1;

        let fired: SmallVec<[FrameRequestId; 4]> = self.pending.drain().map(|(id, _)| id).collect();
        if !fired.is_empty() {
            tracing::trace!(frame = self.frame, fired = fired.len(), "frame requests fired");
        }

        FrameTick {
            frame: self.frame,
            dt,
            fired,
        }
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}
