// Note recorder - turns key presses and releases into note events
// Times are seconds on the scheduler clock, offsets are relative to the recording epoch

use crate::sequencer::note::{ActiveNote, NoteEvent, NoteName};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Recorder state machine: Idle -> Recording -> Idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecorderState {
    #[default]
    Idle,
    Recording,
}

/// What to do when a key is pressed again while it is still held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RepressPolicy {
    /// Keep the first press, the repeat is dropped
    #[default]
    Ignore,
    /// Discard the held press and start timing again from the repeat
    Restart,
}

/// Records held notes relative to a recording epoch
#[derive(Debug, Default)]
pub struct NoteRecorder {
    state: RecorderState,
    epoch: f64,
    active_notes: HashMap<NoteName, ActiveNote>,
    recorded_notes: Vec<NoteEvent>,
    repress_policy: RepressPolicy,
}

impl NoteRecorder {
    pub fn new(repress_policy: RepressPolicy) -> Self {
        Self {
            repress_policy,
            ..Self::default()
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    pub fn repress_policy(&self) -> RepressPolicy {
        self.repress_policy
    }

    pub fn set_repress_policy(&mut self, policy: RepressPolicy) {
        self.repress_policy = policy;
    }

    /// Starts a new take at `now`, clearing the previous buffer.
    /// Returns false if a take is already running.
    pub fn start(&mut self, now: f64) -> bool {
        if self.is_recording() {
            return false;
        }

        self.active_notes.clear();
        self.recorded_notes.clear();
        self.epoch = now;
        self.state = RecorderState::Recording;
        true
    }

    /// Registers a key press. Returns true if a new held note was started.
    pub fn note_on(&mut self, note: NoteName, frequency: f64, now: f64) -> bool {
        if !self.is_recording() {
            return false;
        }

        if self.active_notes.contains_key(&note) && self.repress_policy == RepressPolicy::Ignore {
            return false;
        }

        let active = ActiveNote {
            note,
            frequency,
            start_offset: self.offset_at(now),
        };
        self.active_notes.insert(note, active);
        true
    }

    /// Registers a key release and returns the finished event, if any
    pub fn note_off(&mut self, note: NoteName, now: f64) -> Option<NoteEvent> {
        if !self.is_recording() {
            return None;
        }

        let active = self.active_notes.remove(&note)?;
        let event = active.finalize(self.offset_at(now));
        self.recorded_notes.push(event);
        Some(event)
    }

    /// Ends the take, finalizing every note still held.
    /// Returns the number of held notes that were closed, or None if idle.
    pub fn stop(&mut self, now: f64) -> Option<usize> {
        if !self.is_recording() {
            return None;
        }

        let release_offset = self.offset_at(now);
        let mut held: Vec<ActiveNote> = self.active_notes.drain().map(|(_, a)| a).collect();
        held.sort_by(|a, b| {
            a.start_offset
                .total_cmp(&b.start_offset)
                .then_with(|| a.note.cmp(&b.note))
        });

        let closed = held.len();
        self.recorded_notes
            .extend(held.iter().map(|active| active.finalize(release_offset)));
        self.state = RecorderState::Idle;
        Some(closed)
    }

    /// True once a take with at least one note has been stopped
    pub fn can_commit(&self) -> bool {
        !self.is_recording() && !self.recorded_notes.is_empty()
    }

    pub fn recorded_notes(&self) -> &[NoteEvent] {
        &self.recorded_notes
    }

    pub fn active_note_count(&self) -> usize {
        self.active_notes.len()
    }

    pub fn is_held(&self, note: NoteName) -> bool {
        self.active_notes.contains_key(&note)
    }

    /// Drains the recorded buffer
    pub fn take_recorded(&mut self) -> Vec<NoteEvent> {
        std::mem::take(&mut self.recorded_notes)
    }

    fn offset_at(&self, now: f64) -> f64 {
        (now - self.epoch).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::note::MIN_NOTE_DURATION;

    const C4: f64 = 261.63;
    const E4: f64 = 329.63;

    #[test]
    fn test_basic_recording() {
        let mut recorder = NoteRecorder::default();
        assert!(recorder.start(10.0));

        assert!(recorder.note_on(NoteName::C, C4, 10.0));
        let event = recorder.note_off(NoteName::C, 10.3).unwrap();

        assert_eq!(event.note(), NoteName::C);
        assert_eq!(event.frequency(), C4);
        assert_eq!(event.offset(), 0.0);
        assert!((event.duration() - 0.3).abs() < 1e-9);

        recorder.stop(11.0);
        assert_eq!(recorder.recorded_notes().len(), 1);
        assert!(recorder.can_commit());
    }

    #[test]
    fn test_zero_length_press_gets_minimum_duration() {
        let mut recorder = NoteRecorder::default();
        recorder.start(0.0);
        recorder.note_on(NoteName::E, E4, 2.0);
        let event = recorder.note_off(NoteName::E, 2.0).unwrap();
        assert_eq!(event.duration(), MIN_NOTE_DURATION);
        assert_eq!(event.offset(), 2.0);
    }

    #[test]
    fn test_events_ignored_while_idle() {
        let mut recorder = NoteRecorder::default();
        assert!(!recorder.note_on(NoteName::C, C4, 0.0));
        assert!(recorder.note_off(NoteName::C, 1.0).is_none());
        assert!(recorder.stop(1.0).is_none());
        assert!(!recorder.can_commit());
    }

    #[test]
    fn test_release_without_press_is_noop() {
        let mut recorder = NoteRecorder::default();
        recorder.start(0.0);
        assert!(recorder.note_off(NoteName::A, 1.0).is_none());
        assert!(recorder.recorded_notes().is_empty());
    }

    #[test]
    fn test_start_twice_keeps_take() {
        let mut recorder = NoteRecorder::default();
        recorder.start(0.0);
        recorder.note_on(NoteName::C, C4, 0.5);
        assert!(!recorder.start(1.0));
        assert!(recorder.is_held(NoteName::C));
    }

    #[test]
    fn test_stop_finalizes_held_notes_once() {
        let mut recorder = NoteRecorder::default();
        recorder.start(0.0);
        recorder.note_on(NoteName::E, E4, 0.2);
        recorder.note_on(NoteName::C, C4, 0.1);
        recorder.note_on(NoteName::C, C4, 0.4); // repeat while held

        assert_eq!(recorder.stop(1.0), Some(2));
        assert_eq!(recorder.active_note_count(), 0);

        let notes = recorder.recorded_notes();
        assert_eq!(notes.len(), 2);
        // Closed in press order
        assert_eq!(notes[0].note(), NoteName::C);
        assert!((notes[0].duration() - 0.9).abs() < 1e-9);
        assert_eq!(notes[1].note(), NoteName::E);
        assert!((notes[1].duration() - 0.8).abs() < 1e-9);

        // Release after stop does nothing
        assert!(recorder.note_off(NoteName::C, 1.5).is_none());
        assert_eq!(recorder.recorded_notes().len(), 2);
    }

    #[test]
    fn test_repress_ignore_keeps_first_press() {
        let mut recorder = NoteRecorder::new(RepressPolicy::Ignore);
        recorder.start(0.0);
        assert!(recorder.note_on(NoteName::C, C4, 0.1));
        assert!(!recorder.note_on(NoteName::C, C4, 0.5));

        let event = recorder.note_off(NoteName::C, 0.9).unwrap();
        assert!((event.offset() - 0.1).abs() < 1e-9);
        assert!((event.duration() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_repress_restart_restarts_timer() {
        let mut recorder = NoteRecorder::new(RepressPolicy::Restart);
        recorder.start(0.0);
        assert!(recorder.note_on(NoteName::C, C4, 0.1));
        assert!(recorder.note_on(NoteName::C, C4, 0.5));

        let event = recorder.note_off(NoteName::C, 0.9).unwrap();
        assert!((event.offset() - 0.5).abs() < 1e-9);
        assert!((event.duration() - 0.4).abs() < 1e-9);
        assert_eq!(recorder.recorded_notes().len(), 1);
    }

    #[test]
    fn test_new_take_clears_previous_buffer() {
        let mut recorder = NoteRecorder::default();
        recorder.start(0.0);
        recorder.note_on(NoteName::C, C4, 0.0);
        recorder.note_off(NoteName::C, 0.5);
        recorder.stop(1.0);

        recorder.start(5.0);
        assert!(recorder.recorded_notes().is_empty());
        assert!(!recorder.can_commit());

        recorder.note_on(NoteName::E, E4, 5.5);
        recorder.note_off(NoteName::E, 6.0);
        recorder.stop(6.0);
        assert_eq!(recorder.recorded_notes()[0].offset(), 0.5);
    }

    #[test]
    fn test_take_recorded_drains() {
        let mut recorder = NoteRecorder::default();
        recorder.start(0.0);
        recorder.note_on(NoteName::C, C4, 0.0);
        recorder.stop(0.5);

        let notes = recorder.take_recorded();
        assert_eq!(notes.len(), 1);
        assert!(!recorder.can_commit());
    }
}
