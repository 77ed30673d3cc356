// Studio commands - input events as data
//
// Input layers (keyboard mapping, buttons, a remote client) describe what the
// user did as a `StudioCommand`; `Session::dispatch` applies it and reports
// a `CommandOutcome`. Both are JSON-friendly.

use serde::{Deserialize, Serialize};

use crate::sequencer::clip::ClipId;
use crate::sequencer::timeline::CommitReceipt;
use crate::sequencer::track::TrackId;
use crate::session::SessionStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StudioCommand {
    /// Key pressed. `note` is a name like "C#"; unknown names only preview.
    NoteOn { note: String },
    NoteOff { note: String },
    StartRecording,
    StopRecording,
    Commit,
    /// Play every track; `volume` defaults to the configured master volume
    Play {
        #[serde(default)]
        volume: Option<f32>,
    },
    Stop,
    Pause,
    MoveClip { clip_id: ClipId, start_time: f64 },
    BeginDrag { clip_id: ClipId, pointer_x: f64 },
    DragTo { pointer_x: f64 },
    EndDrag,
    DeleteTrack { track_id: TrackId },
    OctaveUp,
    OctaveDown,
    SetOctave { octave: u8 },
    Status,
}

impl StudioCommand {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Result of one dispatched command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// The command changed the session
    Applied,
    /// Not valid in the current state; nothing changed
    Ignored,
    Key { frequency: f64 },
    Committed(CommitReceipt),
    ClipMoved { clip_id: ClipId, start_time: f64 },
    TrackDeleted { track_id: TrackId },
    Octave { octave: u8 },
    Status(SessionStatus),
    /// The command addressed something that does not exist
    Rejected { reason: String },
}
