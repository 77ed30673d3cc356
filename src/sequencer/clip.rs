// Clip - a recorded take placed on a track
// Notes are fixed at creation, only the start time moves

use crate::sequencer::note::NoteEvent;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Shortest length a clip can have, in seconds, so it stays selectable
pub const MIN_CLIP_DURATION: f64 = 1.0;

/// Unique identifier for clips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipId(Uuid);

impl ClipId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Short form used in labels
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clip-{}", self.0)
    }
}

/// A group of note events placed at `start_time` on a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    id: ClipId,
    start_time: f64,
    duration: f64,
    notes: Vec<NoteEvent>,
}

impl Clip {
    /// Creates a clip at time 0 from a recorded take.
    /// Returns None for an empty take.
    pub fn from_notes(notes: &[NoteEvent]) -> Option<Self> {
        if notes.is_empty() {
            return None;
        }

        Some(Self {
            id: ClipId::new(),
            start_time: 0.0,
            duration: Self::span_of(notes),
            notes: notes.to_vec(),
        })
    }

    /// Length covered by `notes`, never shorter than `MIN_CLIP_DURATION`
    pub fn span_of(notes: &[NoteEvent]) -> f64 {
        notes
            .iter()
            .map(NoteEvent::end)
            .fold(MIN_CLIP_DURATION, f64::max)
    }

    pub fn id(&self) -> ClipId {
        self.id
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    pub fn notes(&self) -> &[NoteEvent] {
        &self.notes
    }

    /// Moves the clip. Negative or non-finite times are clamped to 0.
    /// Returns the start time actually applied.
    pub fn set_start_time(&mut self, start_time: f64) -> f64 {
        self.start_time = if start_time.is_finite() {
            start_time.max(0.0)
        } else {
            0.0
        };
        self.start_time
    }

    pub fn label(&self) -> String {
        format!("Clip {}", self.id.short())
    }
}
