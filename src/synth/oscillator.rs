// Oscillators - waveform generators for scheduled tones

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WaveformType {
    #[default]
    Sine,
    Triangle,
    Square,
    Saw,
}

/// Phase-accumulating oscillator with a fixed frequency
///
/// Phase is kept in f64 so long tones at low frequencies do not drift.
#[derive(Clone, Debug)]
pub struct ToneOscillator {
    waveform: WaveformType,
    phase: f64,
    phase_increment: f64,
}

impl ToneOscillator {
    pub fn new(waveform: WaveformType, frequency: f64, sample_rate: f32) -> Self {
        Self {
            waveform,
            phase: 0.0,
            phase_increment: frequency / sample_rate as f64,
        }
    }

    pub fn next_sample(&mut self) -> f32 {
        let p = self.phase;
        let sample = match self.waveform {
            WaveformType::Sine => (p * TAU).sin(),
            WaveformType::Triangle => {
                if p < 0.5 {
                    p * 4.0 - 1.0
                } else {
                    3.0 - p * 4.0
                }
            }
            WaveformType::Square => {
                if p < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            WaveformType::Saw => p * 2.0 - 1.0,
        };

        self.phase = (self.phase + self.phase_increment).fract();
        sample as f32
    }
}
