// Virtual scheduler - a manual clock and a log of requested tones
//
// Used for dry runs and tests: nothing is synthesized, time only moves when
// the owner calls advance() or set_time().

use crate::audio::scheduler::{SchedulerError, ToneHandle, ToneRequest, ToneScheduler};

/// A tone as seen by the virtual scheduler
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledTone {
    pub handle: ToneHandle,
    pub request: ToneRequest,
    /// Clock time at which the tone was cancelled, if it was
    pub cancelled_at: Option<f64>,
}

impl ScheduledTone {
    /// True if the tone is audible at time `t`
    pub fn is_sounding_at(&self, t: f64) -> bool {
        let started = t >= self.request.start_time;
        let ended = t >= self.request.end_time();
        let cancelled = self.cancelled_at.is_some_and(|c| t >= c);
        started && !ended && !cancelled
    }

    /// True if the tone has not finished nor been cancelled at time `t`
    pub fn is_live_at(&self, t: f64) -> bool {
        self.cancelled_at.is_none() && t < self.request.end_time()
    }
}

#[derive(Debug, Default)]
pub struct VirtualScheduler {
    now: f64,
    next_handle: u64,
    tones: Vec<ScheduledTone>,
    /// Reject requests once this many tones are live
    capacity: Option<usize>,
    /// Commands a real backend could hold before its consumer runs
    queue_limit: Option<usize>,
    queued: usize,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduler that refuses requests beyond `capacity` live tones
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Scheduler whose command queue holds `limit` schedule or cancel
    /// commands and is only emptied by `drain_queue`. `cancel_all` always
    /// fits, like the reserved slot of the audio engine.
    pub fn with_queue_limit(limit: usize) -> Self {
        Self {
            queue_limit: Some(limit),
            ..Self::default()
        }
    }

    /// Empties the modelled command queue, as the audio callback would
    pub fn drain_queue(&mut self) {
        self.queued = 0;
    }

    fn enqueue(&mut self) -> Result<(), SchedulerError> {
        if let Some(limit) = self.queue_limit {
            if self.queued >= limit {
                return Err(SchedulerError::QueueFull);
            }
            self.queued += 1;
        }
        Ok(())
    }

    /// Moves the clock forward by `seconds`
    pub fn advance(&mut self, seconds: f64) {
        self.now += seconds.max(0.0);
    }

    /// Sets the clock, never moving it backwards
    pub fn set_time(&mut self, now: f64) {
        self.now = self.now.max(now);
    }

    /// Every tone ever requested, in request order
    pub fn tones(&self) -> &[ScheduledTone] {
        &self.tones
    }

    pub fn tone(&self, handle: ToneHandle) -> Option<&ScheduledTone> {
        self.tones.iter().find(|t| t.handle == handle)
    }

    /// Handles of tones that are pending or sounding now
    pub fn live_handles(&self) -> Vec<ToneHandle> {
        self.tones
            .iter()
            .filter(|t| t.is_live_at(self.now))
            .map(|t| t.handle)
            .collect()
    }

    /// Tones audible at time `t`
    pub fn sounding_at(&self, t: f64) -> Vec<&ScheduledTone> {
        self.tones.iter().filter(|t2| t2.is_sounding_at(t)).collect()
    }

    /// Forgets every tone, keeping the clock
    pub fn clear(&mut self) {
        self.tones.clear();
    }
}

impl ToneScheduler for VirtualScheduler {
    fn current_time(&self) -> f64 {
        self.now
    }

    fn schedule_tone(&mut self, request: ToneRequest) -> Result<ToneHandle, SchedulerError> {
        if let Some(capacity) = self.capacity {
            let live = self.tones.iter().filter(|t| t.is_live_at(self.now)).count();
            if live >= capacity {
                return Err(SchedulerError::QueueFull);
            }
        }
        self.enqueue()?;

        self.next_handle += 1;
        let handle = ToneHandle(self.next_handle);
        self.tones.push(ScheduledTone {
            handle,
            request,
            cancelled_at: None,
        });
        Ok(handle)
    }

    fn cancel(&mut self, handle: ToneHandle) -> Result<(), SchedulerError> {
        let now = self.now;
        let Some(index) = self.tones.iter().position(|t| t.handle == handle && t.is_live_at(now))
        else {
            return Err(SchedulerError::AlreadyStopped(handle));
        };
        self.enqueue()?;
        self.tones[index].cancelled_at = Some(now);
        Ok(())
    }

    fn cancel_all(&mut self) -> Result<(), SchedulerError> {
        let now = self.now;
        for tone in self.tones.iter_mut().filter(|t| t.is_live_at(now)) {
            tone.cancelled_at = Some(now);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(start_time: f64, duration: f64) -> ToneRequest {
        ToneRequest {
            frequency: 440.0,
            start_time,
            duration,
            peak_gain: 0.3,
            attack: 0.01,
        }
    }

    #[test]
    fn test_schedule_and_query() {
        let mut scheduler = VirtualScheduler::new();
        let a = scheduler.schedule_tone(request(1.0, 0.5)).unwrap();
        let b = scheduler.schedule_tone(request(2.0, 0.5)).unwrap();
        assert_ne!(a, b);

        assert!(scheduler.sounding_at(0.5).is_empty());
        assert_eq!(scheduler.sounding_at(1.2).len(), 1);
        assert_eq!(scheduler.sounding_at(2.2)[0].handle, b);
        assert_eq!(scheduler.live_handles().len(), 2);
    }

    #[test]
    fn test_clock() {
        let mut scheduler = VirtualScheduler::new();
        scheduler.advance(1.5);
        scheduler.advance(-3.0);
        assert_eq!(scheduler.current_time(), 1.5);
        scheduler.set_time(1.0);
        assert_eq!(scheduler.current_time(), 1.5);
        scheduler.set_time(4.0);
        assert_eq!(scheduler.current_time(), 4.0);
    }

    #[test]
    fn test_cancel_pending_tone() {
        let mut scheduler = VirtualScheduler::new();
        let handle = scheduler.schedule_tone(request(1.0, 0.5)).unwrap();

        assert_eq!(scheduler.cancel(handle), Ok(()));
        assert!(scheduler.sounding_at(1.2).is_empty());
        assert!(scheduler.live_handles().is_empty());

        // Second cancel is reported as benign
        assert_eq!(
            scheduler.cancel(handle),
            Err(SchedulerError::AlreadyStopped(handle))
        );
    }

    #[test]
    fn test_cancel_finished_tone() {
        let mut scheduler = VirtualScheduler::new();
        let handle = scheduler.schedule_tone(request(0.0, 0.5)).unwrap();
        scheduler.advance(1.0);
        assert_eq!(
            scheduler.cancel(handle),
            Err(SchedulerError::AlreadyStopped(handle))
        );
        assert!(scheduler.cancel(ToneHandle(999)).is_err());
    }

    #[test]
    fn test_cancel_all_stops_only_live_tones() {
        let mut scheduler = VirtualScheduler::new();
        let finished = scheduler.schedule_tone(request(0.0, 0.5)).unwrap();
        let sounding = scheduler.schedule_tone(request(0.5, 1.0)).unwrap();
        let pending = scheduler.schedule_tone(request(3.0, 1.0)).unwrap();
        scheduler.advance(1.0);

        assert_eq!(scheduler.cancel_all(), Ok(()));
        assert!(scheduler.live_handles().is_empty());
        assert_eq!(scheduler.tone(finished).unwrap().cancelled_at, None);
        assert_eq!(scheduler.tone(sounding).unwrap().cancelled_at, Some(1.0));
        assert_eq!(scheduler.tone(pending).unwrap().cancelled_at, Some(1.0));
        assert!(scheduler.sounding_at(3.5).is_empty());
    }

    #[test]
    fn test_queue_limit_refuses_cancel_but_not_cancel_all() {
        let mut scheduler = VirtualScheduler::with_queue_limit(2);
        let a = scheduler.schedule_tone(request(0.0, 1.0)).unwrap();
        let b = scheduler.schedule_tone(request(0.0, 1.0)).unwrap();
        assert_eq!(scheduler.schedule_tone(request(0.0, 1.0)), Err(SchedulerError::QueueFull));
        assert_eq!(scheduler.cancel(a), Err(SchedulerError::QueueFull));
        assert_eq!(scheduler.live_handles(), vec![a, b]);

        assert_eq!(scheduler.cancel_all(), Ok(()));
        assert!(scheduler.live_handles().is_empty());

        scheduler.drain_queue();
        assert!(scheduler.schedule_tone(request(0.0, 1.0)).is_ok());
    }

    #[test]
    fn test_capacity() {
        let mut scheduler = VirtualScheduler::with_capacity(1);
        scheduler.schedule_tone(request(0.0, 0.5)).unwrap();
        assert_eq!(
            scheduler.schedule_tone(request(0.0, 0.5)),
            Err(SchedulerError::QueueFull)
        );

        scheduler.advance(1.0);
        assert!(scheduler.schedule_tone(request(1.0, 0.5)).is_ok());
    }
}
