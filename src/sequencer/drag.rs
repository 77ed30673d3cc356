// Clip drag gesture - pointer movement in pixels to clip start time in seconds

use crate::sequencer::clip::ClipId;
use crate::sequencer::timeline::TimeScale;

/// An in-progress horizontal drag of one clip
///
/// Every pointer update produces an absolute start time computed from the
/// position where the gesture began, so intermediate updates never
/// accumulate rounding error. The last update wins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipDrag {
    clip_id: ClipId,
    origin_x: f64,
    origin_left_px: f64,
}

impl ClipDrag {
    /// Starts dragging `clip_id`, currently at `start_time`, from pointer `pointer_x`
    pub fn begin(clip_id: ClipId, start_time: f64, pointer_x: f64, scale: TimeScale) -> Self {
        Self {
            clip_id,
            origin_x: pointer_x,
            origin_left_px: scale.seconds_to_pixels(start_time),
        }
    }

    pub fn clip_id(&self) -> ClipId {
        self.clip_id
    }

    /// Start time for the clip with the pointer at `pointer_x`, never negative
    pub fn start_time_at(&self, pointer_x: f64, scale: TimeScale) -> f64 {
        let left_px = (self.origin_left_px + pointer_x - self.origin_x).max(0.0);
        scale.pixels_to_seconds(left_px)
    }
}
