// Audio engine - real-time tone backend on a cpal output stream
//
// # Threads
//
// The control thread (the session) is the only producer of a lock-free
// command ring buffer; the output callback is its only consumer and the only
// owner of the `ToneMixer`. Nothing on the audio path locks or allocates
// once the stream is running, except when the pending queue outgrows its
// initial capacity.
//
// # Clock
//
// `current_time()` is frames rendered / sample rate, read from an atomic
// advanced by the callback. Tones scheduled at the current time therefore
// start with the next rendered buffer.
//
// # Format Support
//
// The mixer renders f32. F32, I16 and U16 devices are supported, the sample
// conversion happens when writing the interleaved frame.

use std::collections::HashMap;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use ringbuf::traits::Consumer;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::audio::format_conversion::{write_mono_to_interleaved_frame, write_silence};
use crate::audio::mixer::{MAX_VOICES, ToneMixer};
use crate::audio::scheduler::{SchedulerError, ToneHandle, ToneRequest, ToneScheduler};
use crate::audio::timing::AudioTiming;
use crate::messaging::channels::{
    CommandConsumer, CommandProducer, create_command_channel, push_command,
};
use crate::messaging::command::AudioCommand;
use crate::synth::oscillator::WaveformType;

/// Settings of the real-time backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Commands that can wait for the callback; bounds one playback burst
    pub command_capacity: usize,
    pub waveform: WaveformType,
    /// Voices that can sound at once before the oldest is stolen
    pub max_voices: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            command_capacity: 4096,
            waveform: WaveformType::Sine,
            max_voices: MAX_VOICES,
        }
    }
}

/// Fatal errors while opening the output device
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no audio output device found")]
    NoDevice,

    #[error("unsupported sample format: {0:?} (supported: F32, I16, U16)")]
    UnsupportedFormat(SampleFormat),

    #[error("audio configuration error: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("error in stream creation: {0}")]
    Build(#[from] cpal::BuildStreamError),

    #[error("error starting stream: {0}")]
    Play(#[from] cpal::PlayStreamError),
}

pub struct AudioEngine {
    _device: Device,
    _stream: Stream,
    timing: AudioTiming,
    command_tx: CommandProducer,
    next_handle: u64,
    /// End time of every tone not yet known to be over
    live: HashMap<ToneHandle, f64>,
}

impl AudioEngine {
    /// Opens the default output device and starts the stream
    pub fn new(config: &AudioConfig) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        info!("Audio host: {:?}", host.id());

        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
        info!(
            "Audio device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let supported_config = device.default_output_config()?;
        let sample_format = supported_config.sample_format();
        let sample_rate = supported_config.sample_rate().0 as f32;
        let channels = supported_config.channels() as usize;
        debug!("Audio config: {:?}", supported_config);

        let stream_config: StreamConfig = supported_config.into();
        let timing = AudioTiming::new(sample_rate);
        let (command_tx, command_rx) = create_command_channel(config.command_capacity);
        let mixer = ToneMixer::with_voice_limit(sample_rate, config.waveform, config.max_voices);

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(
                &device,
                &stream_config,
                channels,
                command_rx,
                mixer,
                timing.clone(),
            ),
            SampleFormat::I16 => Self::build_stream::<i16>(
                &device,
                &stream_config,
                channels,
                command_rx,
                mixer,
                timing.clone(),
            ),
            SampleFormat::U16 => Self::build_stream::<u16>(
                &device,
                &stream_config,
                channels,
                command_rx,
                mixer,
                timing.clone(),
            ),
            other => return Err(AudioError::UnsupportedFormat(other)),
        }?;

        stream.play()?;
        info!("Audio engine started: {} Hz, {} channels", sample_rate, channels);

        Ok(Self {
            _device: device,
            _stream: stream,
            timing,
            command_tx,
            next_handle: 0,
            live: HashMap::new(),
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.timing.sample_rate()
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        channels: usize,
        mut command_rx: CommandConsumer,
        mut mixer: ToneMixer,
        timing: AudioTiming,
    ) -> Result<Stream, AudioError>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                while let Some(command) = command_rx.try_pop() {
                    match command {
                        AudioCommand::Schedule { handle, request } => {
                            mixer.schedule(handle, request)
                        }
                        AudioCommand::Cancel(handle) => {
                            mixer.cancel(handle);
                        }
                        AudioCommand::CancelAll => mixer.cancel_all(),
                    }
                }

                if channels == 0 {
                    write_silence(data);
                    return;
                }

                for frame in data.chunks_mut(channels) {
                    write_mono_to_interleaved_frame(mixer.next_sample(), frame);
                }
                timing.advance(data.len() / channels);
            },
            |err| error!("Audio stream error: {}", err),
            None,
        )?;

        Ok(stream)
    }

    fn push(&mut self, command: AudioCommand) -> Result<(), SchedulerError> {
        if push_command(&mut self.command_tx, command) {
            Ok(())
        } else {
            Err(SchedulerError::QueueFull)
        }
    }

    fn prune_finished(&mut self) {
        let now = self.timing.current_time();
        self.live.retain(|_, end| *end > now);
    }
}

impl ToneScheduler for AudioEngine {
    fn current_time(&self) -> f64 {
        self.timing.current_time()
    }

    fn schedule_tone(&mut self, request: ToneRequest) -> Result<ToneHandle, SchedulerError> {
        let handle = ToneHandle(self.next_handle + 1);
        self.push(AudioCommand::Schedule { handle, request })?;

        self.next_handle += 1;
        if self.live.len() >= 1024 {
            self.prune_finished();
        }
        self.live.insert(handle, request.end_time());
        Ok(handle)
    }

    fn cancel(&mut self, handle: ToneHandle) -> Result<(), SchedulerError> {
        let now = self.timing.current_time();
        match self.live.remove(&handle) {
            Some(end) if end > now => {
                if self.push(AudioCommand::Cancel(handle)).is_err() {
                    self.live.insert(handle, end);
                    return Err(SchedulerError::QueueFull);
                }
                Ok(())
            }
            _ => Err(SchedulerError::AlreadyStopped(handle)),
        }
    }

    fn cancel_all(&mut self) -> Result<(), SchedulerError> {
        self.push(AudioCommand::CancelAll)?;
        debug!("Cancel all ({} live tones)", self.live.len());
        self.live.clear();
        Ok(())
    }
}
