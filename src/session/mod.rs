// Session - the single owner of recorder, timeline, player and scheduler
//
// Every input handler runs to completion on the control thread. Invalid
// transitions (stop while idle, commit while recording, play while playing)
// are silent no-ops reported through the return value.

pub mod command;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::audio::scheduler::{ToneHandle, ToneRequest, ToneScheduler};
use crate::config::{ConfigError, StudioConfig};
use crate::sequencer::clip::ClipId;
use crate::sequencer::drag::ClipDrag;
use crate::sequencer::note::{NoteEvent, NoteName};
use crate::sequencer::pitch::{self, Octave};
use crate::sequencer::player::PlaybackEngine;
use crate::sequencer::recorder::NoteRecorder;
use crate::sequencer::timeline::{
    CommitReceipt, TimeScale, Timeline, TimelineError, TrackLayout,
};
use crate::sequencer::track::{Track, TrackId};

pub use command::{CommandOutcome, StudioCommand};

/// Snapshot of the flags an input layer needs to enable its controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub recording: bool,
    pub playing: bool,
    pub can_commit: bool,
    pub recorded_note_count: usize,
    pub active_note_count: usize,
    pub octave: u8,
    pub track_count: usize,
}

/// What a key press did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyPress {
    pub frequency: f64,
    /// Preview tone, if one was scheduled
    pub preview: Option<ToneHandle>,
    /// True if the press started a held note in the current take
    pub recorded: bool,
}

pub struct Session<S: ToneScheduler> {
    config: StudioConfig,
    scheduler: S,
    recorder: NoteRecorder,
    timeline: Timeline,
    player: PlaybackEngine,
    octave: Octave,
    drag: Option<ClipDrag>,
}

impl<S: ToneScheduler> Session<S> {
    /// Creates a session, rejecting configs that fail `StudioConfig::validate`
    pub fn new(scheduler: S, config: StudioConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            recorder: NoteRecorder::new(config.repress_policy),
            timeline: Timeline::new(TimeScale::new(config.pixels_per_second)),
            player: PlaybackEngine::new(),
            octave: config.octave(),
            drag: None,
            scheduler,
            config,
        })
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn tracks(&self) -> &[Track] {
        self.timeline.tracks()
    }

    pub fn layout(&self) -> Vec<TrackLayout> {
        self.timeline.layout()
    }

    /// The current (or last stopped) take
    pub fn recorded_notes(&self) -> &[NoteEvent] {
        self.recorder.recorded_notes()
    }

    pub fn octave(&self) -> Octave {
        self.octave
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            recording: self.recorder.is_recording(),
            playing: self.player.is_playing(),
            can_commit: self.recorder.can_commit(),
            recorded_note_count: self.recorder.recorded_notes().len(),
            active_note_count: self.recorder.active_note_count(),
            octave: self.octave.value(),
            track_count: self.timeline.track_count(),
        }
    }

    // ========== Keyboard ==========

    /// Key pressed: previews the tone and, while recording, starts a held note
    pub fn note_on(&mut self, note: NoteName) -> KeyPress {
        let frequency = pitch::frequency(note, self.octave);
        let preview = self.preview(frequency);

        let now = self.scheduler.current_time();
        let recorded = self.recorder.note_on(note, frequency, now);
        if self.recorder.is_recording() && !recorded {
            debug!("{} already held, press ignored", note);
        }

        KeyPress {
            frequency,
            preview,
            recorded,
        }
    }

    /// Key released: finalizes the held note while recording
    pub fn note_off(&mut self, note: NoteName) -> Option<NoteEvent> {
        let now = self.scheduler.current_time();
        self.recorder.note_off(note, now)
    }

    /// Key press coming from a name-based input layer.
    /// Unknown names preview the fallback tone and are never recorded.
    pub fn note_on_named(&mut self, name: &str) -> KeyPress {
        match name.parse::<NoteName>() {
            Ok(note) => self.note_on(note),
            Err(_) => {
                let frequency = pitch::frequency_for_name(name, self.octave);
                KeyPress {
                    frequency,
                    preview: self.preview(frequency),
                    recorded: false,
                }
            }
        }
    }

    pub fn note_off_named(&mut self, name: &str) -> Option<NoteEvent> {
        match name.parse::<NoteName>() {
            Ok(note) => self.note_off(note),
            Err(err) => {
                debug!("{}, release ignored", err);
                None
            }
        }
    }

    pub fn shift_octave(&mut self, delta: i32) -> Octave {
        self.octave = self.octave.shifted(delta);
        debug!("Octave is now {}", self.octave);
        self.octave
    }

    pub fn set_octave(&mut self, octave: u8) -> Octave {
        self.octave = Octave::new(octave);
        self.octave
    }

    fn preview(&mut self, frequency: f64) -> Option<ToneHandle> {
        if !self.config.preview_enabled {
            return None;
        }

        let request = ToneRequest {
            frequency,
            start_time: self.scheduler.current_time(),
            duration: self.config.preview_duration,
            peak_gain: self.config.tone.peak_gain,
            attack: self.config.tone.attack,
        };
        match self.scheduler.schedule_tone(request) {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!("Preview tone dropped: {}", err);
                None
            }
        }
    }

    // ========== Recording ==========

    /// Starts a new take, discarding the uncommitted one
    pub fn start_recording(&mut self) -> bool {
        let now = self.scheduler.current_time();
        let started = self.recorder.start(now);
        if started {
            info!("Recording started at {:.3}s", now);
        } else {
            debug!("Already recording, start ignored");
        }
        started
    }

    /// Ends the take. Returns the number of held notes closed by the stop.
    pub fn stop_recording(&mut self) -> Option<usize> {
        let now = self.scheduler.current_time();
        let closed = self.recorder.stop(now);
        match closed {
            Some(closed) => info!(
                "Recording stopped: {} notes ({} still held)",
                self.recorder.recorded_notes().len(),
                closed
            ),
            None => debug!("Not recording, stop ignored"),
        }
        closed
    }

    /// Places the stopped take on a new track and clears the buffer
    pub fn commit_to_timeline(&mut self) -> Option<CommitReceipt> {
        if self.recorder.is_recording() {
            debug!("Recording in progress, commit ignored");
            return None;
        }

        let receipt = self.timeline.commit(self.recorder.recorded_notes())?;
        self.recorder.take_recorded();
        Some(receipt)
    }

    // ========== Playback ==========

    /// Schedules every note of every track relative to now
    pub fn start_playback(&mut self, volume: f32) -> bool {
        self.player.start(
            &mut self.scheduler,
            self.timeline.tracks(),
            volume,
            &self.config.tone,
        )
    }

    pub fn stop_playback(&mut self) -> usize {
        self.player.stop(&mut self.scheduler)
    }

    /// Same as stop: scheduled tones cannot be resumed
    pub fn pause_playback(&mut self) -> usize {
        self.player.pause(&mut self.scheduler)
    }

    // ========== Arrangement ==========

    pub fn move_clip(&mut self, clip_id: ClipId, start_time: f64) -> Result<f64, TimelineError> {
        self.timeline.move_clip(clip_id, start_time)
    }

    /// Starts dragging a clip from pointer position `pointer_x` (pixels)
    pub fn begin_clip_drag(&mut self, clip_id: ClipId, pointer_x: f64) -> Result<(), TimelineError> {
        let clip = self
            .timeline
            .clip(clip_id)
            .ok_or(TimelineError::UnknownClip(clip_id))?;

        self.drag = Some(ClipDrag::begin(
            clip_id,
            clip.start_time(),
            pointer_x,
            self.timeline.scale(),
        ));
        Ok(())
    }

    /// Moves the dragged clip to follow the pointer. Returns the new start time.
    pub fn drag_clip_to(&mut self, pointer_x: f64) -> Option<f64> {
        let drag = self.drag?;
        let start_time = drag.start_time_at(pointer_x, self.timeline.scale());

        match self.timeline.move_clip(drag.clip_id(), start_time) {
            Ok(applied) => Some(applied),
            Err(err) => {
                debug!("{}, drag ended", err);
                self.drag = None;
                None
            }
        }
    }

    /// Ends the gesture. Returns the dragged clip's final start time if it still exists.
    pub fn end_clip_drag(&mut self) -> Option<f64> {
        let drag = self.drag.take()?;
        self.timeline
            .clip(drag.clip_id())
            .map(|clip| clip.start_time())
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Deletes a track. Playback is stopped first, even when the track is unknown.
    pub fn delete_track(&mut self, track_id: TrackId) -> Result<Track, TimelineError> {
        self.stop_playback();
        self.timeline.delete_track(track_id)
    }

    // ========== Commands ==========

    pub fn dispatch(&mut self, command: StudioCommand) -> CommandOutcome {
        match command {
            StudioCommand::NoteOn { note } => {
                let press = self.note_on_named(&note);
                CommandOutcome::Key {
                    frequency: press.frequency,
                }
            }
            StudioCommand::NoteOff { note } => {
                applied_if(self.note_off_named(&note).is_some())
            }
            StudioCommand::StartRecording => applied_if(self.start_recording()),
            StudioCommand::StopRecording => applied_if(self.stop_recording().is_some()),
            StudioCommand::Commit => match self.commit_to_timeline() {
                Some(receipt) => CommandOutcome::Committed(receipt),
                None => CommandOutcome::Ignored,
            },
            StudioCommand::Play { volume } => {
                let volume = volume.unwrap_or(self.config.master_volume);
                applied_if(self.start_playback(volume))
            }
            StudioCommand::Stop => {
                let was_playing = self.is_playing();
                self.stop_playback();
                applied_if(was_playing)
            }
            StudioCommand::Pause => {
                let was_playing = self.is_playing();
                self.pause_playback();
                applied_if(was_playing)
            }
            StudioCommand::MoveClip {
                clip_id,
                start_time,
            } => match self.move_clip(clip_id, start_time) {
                Ok(start_time) => CommandOutcome::ClipMoved {
                    clip_id,
                    start_time,
                },
                Err(err) => rejected(err),
            },
            StudioCommand::BeginDrag { clip_id, pointer_x } => {
                match self.begin_clip_drag(clip_id, pointer_x) {
                    Ok(()) => CommandOutcome::Applied,
                    Err(err) => rejected(err),
                }
            }
            StudioCommand::DragTo { pointer_x } => {
                let clip_id = self.drag.map(|drag| drag.clip_id());
                match (clip_id, self.drag_clip_to(pointer_x)) {
                    (Some(clip_id), Some(start_time)) => CommandOutcome::ClipMoved {
                        clip_id,
                        start_time,
                    },
                    _ => CommandOutcome::Ignored,
                }
            }
            StudioCommand::EndDrag => applied_if(self.end_clip_drag().is_some()),
            StudioCommand::DeleteTrack { track_id } => match self.delete_track(track_id) {
                Ok(_) => CommandOutcome::TrackDeleted { track_id },
                Err(err) => rejected(err),
            },
            StudioCommand::OctaveUp => CommandOutcome::Octave {
                octave: self.shift_octave(1).value(),
            },
            StudioCommand::OctaveDown => CommandOutcome::Octave {
                octave: self.shift_octave(-1).value(),
            },
            StudioCommand::SetOctave { octave } => CommandOutcome::Octave {
                octave: self.set_octave(octave).value(),
            },
            StudioCommand::Status => CommandOutcome::Status(self.status()),
        }
    }
}

fn applied_if(changed: bool) -> CommandOutcome {
    if changed {
        CommandOutcome::Applied
    } else {
        CommandOutcome::Ignored
    }
}

fn rejected(err: TimelineError) -> CommandOutcome {
    CommandOutcome::Rejected {
        reason: err.to_string(),
    }
}
