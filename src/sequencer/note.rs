// Note representation for the recorder and the timeline
// A note event is one finished key press: name, pitch, offset and duration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shortest duration a recorded note can have, in seconds.
/// Applied when a note is finalized so that very quick taps stay audible.
pub const MIN_NOTE_DURATION: f64 = 0.1;

/// The twelve chromatic note names of the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NoteName {
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C#")]
    CSharp,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "D#")]
    DSharp,
    #[serde(rename = "E")]
    E,
    #[serde(rename = "F")]
    F,
    #[serde(rename = "F#")]
    FSharp,
    #[serde(rename = "G")]
    G,
    #[serde(rename = "G#")]
    GSharp,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A#")]
    ASharp,
    #[serde(rename = "B")]
    B,
}

impl NoteName {
    /// All note names in ascending chromatic order
    pub const ALL: [NoteName; 12] = [
        NoteName::C,
        NoteName::CSharp,
        NoteName::D,
        NoteName::DSharp,
        NoteName::E,
        NoteName::F,
        NoteName::FSharp,
        NoteName::G,
        NoteName::GSharp,
        NoteName::A,
        NoteName::ASharp,
        NoteName::B,
    ];

    /// Name as written on the keyboard (e.g. "C#")
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteName::C => "C",
            NoteName::CSharp => "C#",
            NoteName::D => "D",
            NoteName::DSharp => "D#",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::FSharp => "F#",
            NoteName::G => "G",
            NoteName::GSharp => "G#",
            NoteName::A => "A",
            NoteName::ASharp => "A#",
            NoteName::B => "B",
        }
    }

    /// True for the five black keys
    pub fn is_sharp(&self) -> bool {
        self.as_str().ends_with('#')
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the twelve note names
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown note name: {0:?}")]
pub struct ParseNoteError(pub String);

impl FromStr for NoteName {
    type Err = ParseNoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NoteName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseNoteError(s.to_string()))
    }
}

/// A finalized note, immutable once created
///
/// `offset` is measured in seconds from the start of the recording,
/// `duration` in seconds from `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    note: NoteName,
    frequency: f64,
    offset: f64,
    duration: f64,
}

impl NoteEvent {
    /// Creates a note event, enforcing `offset >= 0` and
    /// `duration >= MIN_NOTE_DURATION`
    pub fn new(note: NoteName, frequency: f64, offset: f64, duration: f64) -> Self {
        assert!(frequency > 0.0, "Note frequency must be > 0");

        Self {
            note,
            frequency,
            offset: offset.max(0.0),
            duration: duration.max(MIN_NOTE_DURATION),
        }
    }

    pub fn note(&self) -> NoteName {
        self.note
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Offset at which the note stops sounding, relative to recording start
    pub fn end(&self) -> f64 {
        self.offset + self.duration
    }
}

/// A note currently held down during a recording
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveNote {
    pub note: NoteName,
    pub frequency: f64,
    /// Seconds since the recording epoch when the key went down
    pub start_offset: f64,
}

impl ActiveNote {
    /// Closes the held note at `release_offset` (seconds since the epoch)
    pub fn finalize(&self, release_offset: f64) -> NoteEvent {
        let held_for = release_offset - self.start_offset;
        NoteEvent::new(self.note, self.frequency, self.start_offset, held_for)
    }
}
