// Audio Studio - Library exports for the binary, tests and benchmarks

pub mod audio;
pub mod config;
pub mod messaging;
pub mod sequencer;
pub mod session;
pub mod synth;

// Re-export commonly used types for convenience
pub use audio::engine::{AudioConfig, AudioEngine, AudioError};
pub use audio::scheduler::{SchedulerError, ToneHandle, ToneRequest, ToneScheduler};
pub use audio::timing::AudioTiming;
pub use audio::virtual_scheduler::VirtualScheduler;
pub use config::{ConfigError, StudioConfig};
pub use messaging::channels::create_command_channel;
pub use sequencer::{
    Clip, ClipId, CommitReceipt, NoteEvent, NoteName, NoteRecorder, Octave, PlaybackEngine,
    RecorderState, RepressPolicy, TimeScale, Timeline, TimelineError, ToneShape, Track, TrackId,
    TransportState,
};
pub use session::{CommandOutcome, Session, SessionStatus, StudioCommand};
pub use synth::oscillator::WaveformType;
