//! Edge case tests and robustness validation
//!
//! Extreme and randomized inputs for the timeline, drag gestures, frequency
//! lookup and the scheduler, which must never panic or break their invariants.

use audio_studio::audio::scheduler::SchedulerError;
use audio_studio::sequencer::drag::ClipDrag;
use audio_studio::sequencer::pitch::{FALLBACK_FREQUENCY, frequency, frequency_for_name};
use audio_studio::{
    ClipId, NoteEvent, NoteName, Octave, PlaybackEngine, Session, StudioConfig, TimeScale,
    Timeline, ToneScheduler, ToneShape, VirtualScheduler,
};
use rand::Rng;

fn one_clip_timeline() -> (Timeline, ClipId) {
    let mut timeline = Timeline::default();
    let receipt = timeline
        .commit(&[NoteEvent::new(NoteName::C, 261.63, 0.0, 0.3)])
        .unwrap();
    (timeline, receipt.clip_id)
}

/// move_clip never produces a negative start, whatever the delta
#[test]
fn test_random_moves_never_go_negative() {
    let mut rng = rand::thread_rng();
    let (mut timeline, clip_id) = one_clip_timeline();

    for _ in 0..10_000 {
        let current = timeline.clip(clip_id).unwrap().start_time();
        let delta: f64 = match rng.gen_range(0..3) {
            0 => rng.gen_range(-10.0..10.0),
            1 => rng.gen_range(-1e12..1e12),
            _ => -current - rng.gen_range(0.0..1e6),
        };

        let applied = timeline.move_clip(clip_id, current + delta).unwrap();
        assert!(applied >= 0.0);
        assert_eq!(timeline.clip(clip_id).unwrap().start_time(), applied);
    }
}

/// Non-finite start times land at 0
#[test]
fn test_non_finite_moves() {
    let (mut timeline, clip_id) = one_clip_timeline();

    for value in [f64::NAN, f64::NEG_INFINITY, f64::INFINITY] {
        timeline.move_clip(clip_id, 5.0).unwrap();
        assert_eq!(timeline.move_clip(clip_id, value).unwrap(), 0.0);
    }
}

/// Random pointer paths keep every drag update non-negative
#[test]
fn test_random_drag_paths() {
    let mut rng = rand::thread_rng();
    let scale = TimeScale::default();

    for _ in 0..200 {
        let start = rng.gen_range(0.0..30.0);
        let origin = rng.gen_range(-2000.0..2000.0);
        let drag = ClipDrag::begin(ClipId::new(), start, origin, scale);

        for _ in 0..50 {
            let pointer = rng.gen_range(-1e6..1e6);
            assert!(drag.start_time_at(pointer, scale) >= 0.0);
        }
        assert!((drag.start_time_at(origin, scale) - start).abs() < 1e-9);
    }
}

/// Unknown names and every octave still give a positive frequency
#[test]
fn test_frequency_lookup_never_fails() {
    for name in ["", "H", "c#", "Db", "C##", " A ", "🎹"] {
        let hz = frequency_for_name(name, Octave::default());
        assert!(hz > 0.0 && hz.is_finite());
    }
    assert_eq!(frequency_for_name("H", Octave::new(5)), FALLBACK_FREQUENCY * 2.0);
    assert_eq!(frequency_for_name("c#", Octave::default()), 277.18);

    for octave in Octave::MIN..=Octave::MAX {
        for note in NoteName::ALL {
            assert!(frequency(note, Octave::new(octave)) > 0.0);
        }
    }
    assert_eq!(Octave::new(0).shifted(-5), Octave::new(0));
    assert_eq!(Octave::new(8).shifted(5), Octave::new(8));
}

/// Transitions in the wrong state are silent no-ops
#[test]
fn test_out_of_order_session_calls() {
    let mut session = Session::new(VirtualScheduler::new(), StudioConfig::default()).unwrap();

    assert!(session.note_off(NoteName::C).is_none());
    assert!(session.stop_recording().is_none());
    assert!(session.commit_to_timeline().is_none());
    assert_eq!(session.stop_playback(), 0);
    assert_eq!(session.pause_playback(), 0);
    assert!(session.drag_clip_to(10.0).is_none());
    assert!(session.end_clip_drag().is_none());

    assert!(session.start_recording());
    assert!(!session.start_recording());
    assert!(session.stop_recording().is_some());
    assert!(session.stop_recording().is_none());

    assert!(session.move_clip(ClipId::new(), 1.0).is_err());
}

/// A scheduler that refuses everything still leaves the player consistent
#[test]
fn test_full_backend_queue() {
    let mut timeline = Timeline::default();
    timeline
        .commit(&[
            NoteEvent::new(NoteName::C, 261.63, 0.0, 0.3),
            NoteEvent::new(NoteName::D, 293.66, 0.3, 0.3),
        ])
        .unwrap();

    let mut scheduler = VirtualScheduler::with_capacity(0);
    let mut player = PlaybackEngine::new();

    assert!(player.start(&mut scheduler, timeline.tracks(), 1.0, &ToneShape::default()));
    assert!(player.handles().is_empty());
    assert_eq!(player.stop(&mut scheduler), 0);

    assert_eq!(
        scheduler.schedule_tone(audio_studio::ToneRequest {
            frequency: 440.0,
            start_time: 0.0,
            duration: 1.0,
            peak_gain: 0.3,
            attack: 0.01,
        }),
        Err(SchedulerError::QueueFull)
    );
}

/// Deleting a playing track silences it even when the backend queue has no
/// room left for single cancellations
#[test]
fn test_delete_track_with_saturated_queue() {
    let config = StudioConfig {
        preview_enabled: false,
        ..StudioConfig::default()
    };
    let mut session = Session::new(VirtualScheduler::with_queue_limit(16), config).unwrap();

    session.start_recording();
    for note in NoteName::ALL {
        session.note_on(note);
    }
    session.scheduler_mut().advance(0.5);
    session.stop_recording();
    let receipt = session.commit_to_timeline().unwrap();

    assert!(session.start_playback(1.0));
    assert_eq!(session.scheduler().live_handles().len(), 12);

    session.delete_track(receipt.track_id).unwrap();
    assert!(session.scheduler().live_handles().is_empty());
    assert!(!session.is_playing());
    assert_eq!(session.stop_playback(), 0);
}

/// Extreme note data is sanitized when events are built
#[test]
fn test_note_event_sanitizing() {
    let event = NoteEvent::new(NoteName::B, 493.88, -3.0, 0.0);
    assert_eq!(event.offset(), 0.0);
    assert_eq!(event.duration(), 0.1);

    let long = NoteEvent::new(NoteName::B, 493.88, 1e6, 1e6);
    let mut timeline = Timeline::default();
    let receipt = timeline.commit(&[long]).unwrap();
    assert_eq!(timeline.clip(receipt.clip_id).unwrap().duration(), 2e6);
}

#[test]
#[should_panic(expected = "Note frequency must be > 0")]
fn test_zero_frequency_rejected() {
    NoteEvent::new(NoteName::A, 0.0, 0.0, 1.0);
}
