// Pitch - note name + octave to frequency

use crate::sequencer::note::NoteName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base frequency used for names that are not on the keyboard.
/// It is scaled by the octave like any other base frequency.
pub const FALLBACK_FREQUENCY: f64 = 440.0;

/// Octave of the base frequency table
pub const REFERENCE_OCTAVE: u8 = 4;

impl NoteName {
    /// Frequency in Hz at the reference octave (4)
    pub fn base_frequency(&self) -> f64 {
        match self {
            NoteName::C => 261.63,
            NoteName::CSharp => 277.18,
            NoteName::D => 293.66,
            NoteName::DSharp => 311.13,
            NoteName::E => 329.63,
            NoteName::F => 349.23,
            NoteName::FSharp => 369.99,
            NoteName::G => 392.00,
            NoteName::GSharp => 415.30,
            NoteName::A => 440.00,
            NoteName::ASharp => 466.16,
            NoteName::B => 493.88,
        }
    }
}

/// Keyboard octave, always within `Octave::MIN..=Octave::MAX`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Octave(u8);

impl Octave {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 8;

    /// Creates an octave, clamping out-of-range values
    pub fn new(value: u8) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Octave moved by `delta`, clamped to the keyboard range
    pub fn shifted(&self, delta: i32) -> Self {
        let target = (self.0 as i32 + delta).clamp(Self::MIN as i32, Self::MAX as i32);
        Self(target as u8)
    }

    /// Frequency multiplier relative to the reference octave: 2^(octave - 4)
    pub fn multiplier(&self) -> f64 {
        2f64.powi(self.0 as i32 - REFERENCE_OCTAVE as i32)
    }
}

impl Default for Octave {
    fn default() -> Self {
        Self(REFERENCE_OCTAVE)
    }
}

impl From<u8> for Octave {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<Octave> for u8 {
    fn from(octave: Octave) -> Self {
        octave.0
    }
}

impl fmt::Display for Octave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Frequency of `note` in `octave`
pub fn frequency(note: NoteName, octave: Octave) -> f64 {
    note.base_frequency() * octave.multiplier()
}

/// Frequency lookup by name, as received from an input layer
///
/// Unknown names never fail: they use `FALLBACK_FREQUENCY` as their base.
pub fn frequency_for_name(name: &str, octave: Octave) -> f64 {
    let base = match name.parse::<NoteName>() {
        Ok(note) => note.base_frequency(),
        Err(err) => {
            tracing::debug!("{}, using {} Hz", err, FALLBACK_FREQUENCY);
            FALLBACK_FREQUENCY
        }
    };
    base * octave.multiplier()
}
