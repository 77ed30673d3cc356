// Track - one independent layer of the arrangement

use crate::sequencer::clip::{Clip, ClipId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for tracks, allocated sequentially by the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub u32);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "track-{}", self.0)
    }
}

/// An ordered collection of clips
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    id: TrackId,
    clips: Vec<Clip>,
}

impl Track {
    pub fn new(id: TrackId) -> Self {
        Self {
            id,
            clips: Vec::new(),
        }
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn add_clip(&mut self, clip: Clip) -> ClipId {
        let id = clip.id();
        self.clips.push(clip);
        id
    }

    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id() == id)
    }

    pub fn clip_mut(&mut self, id: ClipId) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| c.id() == id)
    }

    /// Total number of note events across all clips
    pub fn note_count(&self) -> usize {
        self.clips.iter().map(|c| c.notes().len()).sum()
    }

    /// Latest clip end on this track (0 for an empty track)
    pub fn end_time(&self) -> f64 {
        self.clips.iter().map(Clip::end_time).fold(0.0, f64::max)
    }
}
