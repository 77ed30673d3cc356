// Voice - one scheduled tone while it sounds

use super::envelope::ToneEnvelope;
use super::oscillator::{ToneOscillator, WaveformType};
use crate::audio::scheduler::{ToneHandle, ToneRequest};

pub struct ToneVoice {
    handle: ToneHandle,
    oscillator: ToneOscillator,
    envelope: ToneEnvelope,
    sample_period: f64,
    /// Samples rendered since the tone started
    position: u64,
}

impl ToneVoice {
    pub fn new(
        handle: ToneHandle,
        request: &ToneRequest,
        waveform: WaveformType,
        sample_rate: f32,
    ) -> Self {
        Self {
            handle,
            oscillator: ToneOscillator::new(waveform, request.frequency, sample_rate),
            envelope: ToneEnvelope::new(request.attack, request.duration, request.peak_gain),
            sample_period: 1.0 / sample_rate as f64,
            position: 0,
        }
    }

    pub fn handle(&self) -> ToneHandle {
        self.handle
    }

    pub fn is_active(&self) -> bool {
        !self.envelope.is_finished(self.elapsed())
    }

    pub fn next_sample(&mut self) -> f32 {
        let gain = self.envelope.gain_at(self.elapsed());
        let sample = self.oscillator.next_sample() * gain;
        self.position += 1;
        sample
    }

    fn elapsed(&self) -> f64 {
        self.position as f64 * self.sample_period
    }
}
