// Sequencer player - turns the arrangement into scheduled tones
//
// Playback is one batch: every note of every clip of every track is
// submitted at once against a single reading of the scheduler clock, so the
// relative timing between tracks does not depend on how long submission takes.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::audio::scheduler::{SchedulerError, ToneHandle, ToneRequest, ToneScheduler};
use crate::sequencer::track::Track;

/// Transport state of the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
}

impl TransportState {
    pub fn is_playing(&self) -> bool {
        matches!(self, TransportState::Playing)
    }
}

/// Gain envelope parameters shared by every tone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneShape {
    /// Seconds to reach the peak
    pub attack: f64,
    /// Peak gain at full volume
    pub peak_gain: f32,
}

impl Default for ToneShape {
    fn default() -> Self {
        Self {
            attack: 0.01,
            peak_gain: 0.3,
        }
    }
}

impl ToneShape {
    /// Peak gain for a master volume in 0.0 - 1.0
    pub fn peak_at(&self, volume: f32) -> f32 {
        self.peak_gain * volume.clamp(0.0, 1.0)
    }
}

/// Computes the tone of every note for playback starting at `now`
///
/// Each note sounds at `now + clip.start_time + note.offset`. Pure: the same
/// arrangement gives the same requests, shifted by `now`.
pub fn plan_playback(tracks: &[Track], now: f64, volume: f32, shape: &ToneShape) -> Vec<ToneRequest> {
    let peak_gain = shape.peak_at(volume);

    tracks
        .iter()
        .flat_map(|track| track.clips())
        .flat_map(|clip| {
            clip.notes().iter().map(move |note| ToneRequest {
                frequency: note.frequency(),
                start_time: now + clip.start_time() + note.offset(),
                duration: note.duration(),
                peak_gain,
                attack: shape.attack,
            })
        })
        .collect()
}

/// Submits playback batches and cancels them on stop
#[derive(Debug, Default)]
pub struct PlaybackEngine {
    state: TransportState,
    handles: Vec<ToneHandle>,
    started_at: Option<f64>,
}

impl PlaybackEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    /// Handles submitted by the current playback
    pub fn handles(&self) -> &[ToneHandle] {
        &self.handles
    }

    /// Clock time the current playback started at
    pub fn started_at(&self) -> Option<f64> {
        self.started_at
    }

    /// Schedules the whole arrangement. Returns false if already playing.
    ///
    /// Notes the backend refuses are skipped; the rest still play.
    pub fn start<S: ToneScheduler + ?Sized>(
        &mut self,
        scheduler: &mut S,
        tracks: &[Track],
        volume: f32,
        shape: &ToneShape,
    ) -> bool {
        if self.is_playing() {
            debug!("Playback already running, start ignored");
            return false;
        }

        self.state = TransportState::Playing;

        let now = scheduler.current_time();
        self.started_at = Some(now);

        let plan = plan_playback(tracks, now, volume, shape);
        let mut skipped = 0usize;
        for request in plan {
            match scheduler.schedule_tone(request) {
                Ok(handle) => self.handles.push(handle),
                Err(err) => {
                    skipped += 1;
                    warn!("Could not schedule tone at {:.3}s: {}", request.start_time, err);
                }
            }
        }

        info!(
            "Playback started at {:.3}s: {} tones over {} tracks ({} skipped)",
            now,
            self.handles.len(),
            tracks.len(),
            skipped
        );
        true
    }

    /// Cancels everything submitted by the last start. Idempotent.
    /// Returns the number of tones that were still pending or sounding.
    ///
    /// Tones the backend refuses to cancel one by one are stopped with a
    /// single `cancel_all`. If that is refused too they stay tracked and the
    /// next stop retries them.
    pub fn stop<S: ToneScheduler + ?Sized>(&mut self, scheduler: &mut S) -> usize {
        let mut cancelled = 0usize;
        let mut refused = Vec::new();
        for handle in self.handles.drain(..) {
            match scheduler.cancel(handle) {
                Ok(()) => cancelled += 1,
                Err(SchedulerError::AlreadyStopped(_)) => {}
                Err(err) => {
                    debug!("Could not cancel {}: {}", handle, err);
                    refused.push(handle);
                }
            }
        }

        if !refused.is_empty() {
            match scheduler.cancel_all() {
                Ok(()) => {
                    info!("Cancelled all tones ({} refused one by one)", refused.len());
                    cancelled += refused.len();
                }
                Err(err) => {
                    warn!("Could not cancel {} tones: {}", refused.len(), err);
                    self.handles = refused;
                }
            }
        }

        if self.is_playing() {
            info!("Playback stopped ({} tones cancelled)", cancelled);
        }
        self.state = TransportState::Stopped;
        self.started_at = None;
        cancelled
    }

    /// Same as `stop`: scheduled tones cannot be suspended and resumed
    pub fn pause<S: ToneScheduler + ?Sized>(&mut self, scheduler: &mut S) -> usize {
        self.stop(scheduler)
    }
}
