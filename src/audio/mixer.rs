// Tone mixer - pending tones, sounding voices and the per-sample mix
//
// Owned by the audio callback. Tones wait in a queue sorted by start frame
// and become voices when the frame counter reaches them.

use std::collections::VecDeque;

use tracing::debug;

use crate::audio::dsp_utils::{flush_denormals_to_zero, soft_clip};
use crate::audio::scheduler::{ToneHandle, ToneRequest};
use crate::synth::oscillator::WaveformType;
use crate::synth::voice::ToneVoice;

/// Default voice limit; the oldest voice is stolen beyond it
pub const MAX_VOICES: usize = 64;

/// Pending tones kept without reallocating
const PENDING_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct PendingTone {
    handle: ToneHandle,
    start_frame: u64,
    request: ToneRequest,
}

pub struct ToneMixer {
    sample_rate: f32,
    waveform: WaveformType,
    pending: VecDeque<PendingTone>,
    /// Sounding voices, oldest first
    voices: Vec<ToneVoice>,
    max_voices: usize,
    stolen: u64,
    current_frame: u64,
}

impl ToneMixer {
    pub fn new(sample_rate: f32, waveform: WaveformType) -> Self {
        Self::with_voice_limit(sample_rate, waveform, MAX_VOICES)
    }

    /// Mixer sounding at most `max_voices` tones (at least one)
    pub fn with_voice_limit(sample_rate: f32, waveform: WaveformType, max_voices: usize) -> Self {
        let max_voices = max_voices.max(1);
        Self {
            sample_rate,
            waveform,
            pending: VecDeque::with_capacity(PENDING_CAPACITY),
            voices: Vec::with_capacity(max_voices),
            max_voices,
            stolen: 0,
            current_frame: 0,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Frame that the next call to `next_sample` renders
    pub fn current_frame(&self) -> u64 {
        self.current_frame
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn max_voices(&self) -> usize {
        self.max_voices
    }

    /// Voices cut short to make room since the mixer was created
    pub fn stolen_count(&self) -> u64 {
        self.stolen
    }

    /// Frame at which a tone starting at `time` seconds begins
    pub fn time_to_frame(&self, time: f64) -> u64 {
        (time.max(0.0) * self.sample_rate as f64).round() as u64
    }

    /// Queues a tone. Tones whose start is already past begin on the next frame.
    pub fn schedule(&mut self, handle: ToneHandle, request: ToneRequest) {
        let start_frame = self.time_to_frame(request.start_time);
        let index = self.pending.partition_point(|p| p.start_frame <= start_frame);
        self.pending.insert(
            index,
            PendingTone {
                handle,
                start_frame,
                request,
            },
        );
    }

    /// Removes a tone whether pending or sounding. Returns false if it was not found.
    pub fn cancel(&mut self, handle: ToneHandle) -> bool {
        if let Some(index) = self.pending.iter().position(|p| p.handle == handle) {
            self.pending.remove(index);
            return true;
        }

        if let Some(index) = self.voices.iter().position(|v| v.handle() == handle) {
            self.voices.remove(index);
            return true;
        }

        false
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
        self.voices.clear();
    }

    /// Renders one mono frame and advances the frame counter
    pub fn next_sample(&mut self) -> f32 {
        while let Some(front) = self.pending.front() {
            if front.start_frame > self.current_frame {
                break; // Sorted, nothing else is due
            }

            if let Some(tone) = self.pending.pop_front() {
                self.start_voice(tone);
            }
        }

        let mut mixed = 0.0f32;
        for voice in &mut self.voices {
            mixed += voice.next_sample();
        }
        self.voices.retain(ToneVoice::is_active);

        self.current_frame += 1;
        soft_clip(flush_denormals_to_zero(mixed))
    }

    /// Renders `output.len()` mono frames
    pub fn render(&mut self, output: &mut [f32]) {
        for sample in output.iter_mut() {
            *sample = self.next_sample();
        }
    }

    fn start_voice(&mut self, tone: PendingTone) {
        if self.voices.len() >= self.max_voices {
            let stolen = self.voices.remove(0);
            self.stolen += 1;
            debug!(
                "Voice limit {} reached, stealing {} for {}",
                self.max_voices,
                stolen.handle(),
                tone.handle
            );
        }

        self.voices.push(ToneVoice::new(
            tone.handle,
            &tone.request,
            self.waveform,
            self.sample_rate,
        ));
    }
}
