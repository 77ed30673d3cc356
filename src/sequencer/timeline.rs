// Timeline - tracks of clips on a seconds-based time axis
// Handles committing takes, moving clips, deleting tracks and pixel layout

use crate::sequencer::clip::{Clip, ClipId};
use crate::sequencer::note::NoteEvent;
use crate::sequencer::track::{Track, TrackId};
use serde::{Deserialize, Serialize};

/// Default horizontal zoom of the timeline
pub const DEFAULT_PIXELS_PER_SECOND: f64 = 100.0;

/// Errors for timeline edits addressing something that does not exist
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimelineError {
    #[error("no clip with id {0}")]
    UnknownClip(ClipId),

    #[error("no track with id {0}")]
    UnknownTrack(TrackId),
}

/// Conversion between seconds and timeline pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeScale {
    pixels_per_second: f64,
}

impl TimeScale {
    pub fn new(pixels_per_second: f64) -> Self {
        assert!(
            pixels_per_second.is_finite() && pixels_per_second > 0.0,
            "pixels_per_second must be > 0"
        );
        Self { pixels_per_second }
    }

    pub fn pixels_per_second(&self) -> f64 {
        self.pixels_per_second
    }

    pub fn seconds_to_pixels(&self, seconds: f64) -> f64 {
        seconds * self.pixels_per_second
    }

    pub fn pixels_to_seconds(&self, pixels: f64) -> f64 {
        pixels / self.pixels_per_second
    }
}

impl Default for TimeScale {
    fn default() -> Self {
        Self::new(DEFAULT_PIXELS_PER_SECOND)
    }
}

/// Identifiers created by a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    pub track_id: TrackId,
    pub clip_id: ClipId,
}

/// Layout of one clip, in seconds and pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipLayout {
    pub id: ClipId,
    pub label: String,
    pub start_time: f64,
    pub duration: f64,
    pub left_px: f64,
    pub width_px: f64,
}

/// Layout of one track row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackLayout {
    pub id: TrackId,
    pub label: String,
    pub clips: Vec<ClipLayout>,
}

/// The arrangement: an ordered list of tracks
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    tracks: Vec<Track>,
    track_counter: u32,
    scale: TimeScale,
}

impl Timeline {
    pub fn new(scale: TimeScale) -> Self {
        Self {
            tracks: Vec::new(),
            track_counter: 0,
            scale,
        }
    }

    pub fn scale(&self) -> TimeScale {
        self.scale
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id() == id)
    }

    /// Places a take on a new track as a clip starting at 0.
    /// An empty take creates nothing.
    pub fn commit(&mut self, notes: &[NoteEvent]) -> Option<CommitReceipt> {
        let clip = Clip::from_notes(notes)?;

        self.track_counter += 1;
        let mut track = Track::new(TrackId(self.track_counter));
        let clip_id = track.add_clip(clip);
        let track_id = track.id();
        self.tracks.push(track);

        tracing::info!(
            "Committed {} notes as {} on {}",
            notes.len(),
            clip_id,
            track_id
        );

        Some(CommitReceipt { track_id, clip_id })
    }

    /// Appends a take as an extra clip on an existing track.
    /// Returns Ok(None) for an empty take.
    pub fn add_clip(
        &mut self,
        track_id: TrackId,
        notes: &[NoteEvent],
    ) -> Result<Option<ClipId>, TimelineError> {
        let track = self
            .tracks
            .iter_mut()
            .find(|t| t.id() == track_id)
            .ok_or(TimelineError::UnknownTrack(track_id))?;

        Ok(Clip::from_notes(notes).map(|clip| track.add_clip(clip)))
    }

    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.tracks.iter().find_map(|t| t.clip(id))
    }

    /// Track that owns the clip
    pub fn track_of(&self, id: ClipId) -> Option<TrackId> {
        self.tracks
            .iter()
            .find(|t| t.clip(id).is_some())
            .map(Track::id)
    }

    /// Moves a clip to `start_time`, clamped to >= 0.
    /// Returns the start time actually applied.
    pub fn move_clip(&mut self, id: ClipId, start_time: f64) -> Result<f64, TimelineError> {
        let clip = self
            .tracks
            .iter_mut()
            .find_map(|t| t.clip_mut(id))
            .ok_or(TimelineError::UnknownClip(id))?;

        Ok(clip.set_start_time(start_time))
    }

    /// Removes a track and all of its clips
    pub fn delete_track(&mut self, id: TrackId) -> Result<Track, TimelineError> {
        let index = self
            .tracks
            .iter()
            .position(|t| t.id() == id)
            .ok_or(TimelineError::UnknownTrack(id))?;

        let track = self.tracks.remove(index);
        tracing::info!("Deleted {} ({} clips)", id, track.clips().len());
        Ok(track)
    }

    /// End of the latest clip on any track
    pub fn duration(&self) -> f64 {
        self.tracks.iter().map(Track::end_time).fold(0.0, f64::max)
    }

    /// Position and size of every clip, track by track
    pub fn layout(&self) -> Vec<TrackLayout> {
        self.tracks
            .iter()
            .enumerate()
            .map(|(index, track)| TrackLayout {
                id: track.id(),
                label: format!("Track {}", index + 1),
                clips: track
                    .clips()
                    .iter()
                    .map(|clip| ClipLayout {
                        id: clip.id(),
                        label: clip.label(),
                        start_time: clip.start_time(),
                        duration: clip.duration(),
                        left_px: self.scale.seconds_to_pixels(clip.start_time()),
                        width_px: self.scale.seconds_to_pixels(clip.duration()),
                    })
                    .collect(),
            })
            .collect()
    }
}
