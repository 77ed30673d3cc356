// Tone scheduler - the sound output capability used by the sequencer
//
// A backend plays one tone per request at an absolute time on its own clock.
// Submission never blocks on the tone's duration; cancellation is immediate.

use std::fmt;

/// Handle to one scheduled tone, unique per scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToneHandle(pub u64);

impl fmt::Display for ToneHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tone#{}", self.0)
    }
}

/// One tone to synthesize
///
/// The gain rises linearly from 0 to `peak_gain` over `attack` seconds,
/// then falls linearly to 0 at `start_time + duration`, where the tone stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneRequest {
    /// Hz
    pub frequency: f64,
    /// Absolute time on the scheduler clock, in seconds
    pub start_time: f64,
    /// Seconds
    pub duration: f64,
    /// 0.0 - 1.0
    pub peak_gain: f32,
    /// Seconds
    pub attack: f64,
}

impl ToneRequest {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

/// Errors reported by a tone backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    /// The tone already finished, was already cancelled, or never existed.
    /// Callers treat this as benign.
    #[error("{0} is already stopped")]
    AlreadyStopped(ToneHandle),

    /// The backend cannot accept more requests right now
    #[error("tone queue is full")]
    QueueFull,
}

/// Backend capability: schedule a tone, cancel a tone, read the clock
pub trait ToneScheduler {
    /// Current time of the scheduler clock, in seconds
    fn current_time(&self) -> f64;

    /// Arranges for `request` to sound. Returns immediately.
    fn schedule_tone(&mut self, request: ToneRequest) -> Result<ToneHandle, SchedulerError>;

    /// Stops a pending or sounding tone
    fn cancel(&mut self, handle: ToneHandle) -> Result<(), SchedulerError>;

    /// Stops every pending and sounding tone at once.
    /// Must succeed even when single cancellations are refused.
    fn cancel_all(&mut self) -> Result<(), SchedulerError>;
}

impl<S: ToneScheduler + ?Sized> ToneScheduler for Box<S> {
    fn current_time(&self) -> f64 {
        (**self).current_time()
    }

    fn schedule_tone(&mut self, request: ToneRequest) -> Result<ToneHandle, SchedulerError> {
        (**self).schedule_tone(request)
    }

    fn cancel(&mut self, handle: ToneHandle) -> Result<(), SchedulerError> {
        (**self).cancel(handle)
    }

    fn cancel_all(&mut self) -> Result<(), SchedulerError> {
        (**self).cancel_all()
    }
}
