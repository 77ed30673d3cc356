// Audio timing - the scheduler clock of the real-time backend
// Time is the number of frames rendered by the output callback

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared frame counter, advanced by the audio callback and read by the control thread
#[derive(Clone, Debug)]
pub struct AudioTiming {
    frames_rendered: Arc<AtomicU64>,
    sample_rate: f64,
}

impl AudioTiming {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            frames_rendered: Arc::new(AtomicU64::new(0)),
            sample_rate: sample_rate as f64,
        }
    }

    /// Frames rendered so far (called from the control thread)
    pub fn current_frame(&self) -> u64 {
        self.frames_rendered.load(Ordering::Acquire)
    }

    /// Advance by one rendered buffer (called from the audio callback)
    pub fn advance(&self, frames: usize) {
        self.frames_rendered
            .fetch_add(frames as u64, Ordering::Release);
    }

    /// Current clock time in seconds
    pub fn current_time(&self) -> f64 {
        self.frames_to_seconds(self.current_frame())
    }

    pub fn frames_to_seconds(&self, frames: u64) -> f64 {
        frames as f64 / self.sample_rate
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate as f32
    }
}
