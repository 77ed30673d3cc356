// Sequencer - recording takes, arranging clips on tracks, scheduling playback

pub mod clip;
pub mod drag;
pub mod note;
pub mod pitch;
pub mod player;
pub mod recorder;
pub mod timeline;
pub mod track;

pub use clip::{Clip, ClipId};
pub use note::{NoteEvent, NoteName};
pub use pitch::Octave;
pub use player::{PlaybackEngine, ToneShape, TransportState};
pub use recorder::{NoteRecorder, RecorderState, RepressPolicy};
pub use timeline::{CommitReceipt, TimeScale, Timeline, TimelineError};
pub use track::{Track, TrackId};
