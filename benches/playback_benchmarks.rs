use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use audio_studio::audio::mixer::ToneMixer;
use audio_studio::sequencer::player::plan_playback;
use audio_studio::synth::oscillator::{ToneOscillator, WaveformType};
use audio_studio::{NoteEvent, NoteName, Timeline, ToneHandle, ToneRequest, ToneShape};

/// Arrangement of `tracks` tracks, each with one clip of 64 notes
fn arrangement(tracks: usize) -> Timeline {
    let mut timeline = Timeline::default();
    for t in 0..tracks {
        let notes: Vec<NoteEvent> = (0..64)
            .map(|i| {
                let note = NoteName::ALL[i % NoteName::ALL.len()];
                NoteEvent::new(note, note.base_frequency(), i as f64 * 0.125, 0.1)
            })
            .collect();
        let receipt = timeline.commit(&notes).expect("clip with notes");
        timeline
            .move_clip(receipt.clip_id, t as f64)
            .expect("clip was just committed");
    }
    timeline
}

/// Benchmark batch planning (runs on the control thread at play time)
fn bench_plan_playback(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_playback");
    let shape = ToneShape::default();

    for tracks in [1, 8, 32] {
        let timeline = arrangement(tracks);
        group.bench_with_input(BenchmarkId::from_parameter(tracks), &timeline, |b, timeline| {
            b.iter(|| black_box(plan_playback(timeline.tracks(), black_box(12.5), 0.8, &shape)));
        });
    }
    group.finish();
}

/// Benchmark oscillator generation (critical for real-time performance)
fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("oscillator");
    let buffer_size = 512;

    for waveform in [
        WaveformType::Sine,
        WaveformType::Square,
        WaveformType::Saw,
        WaveformType::Triangle,
    ] {
        let mut osc = ToneOscillator::new(waveform, 440.0, 48000.0);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", waveform)),
            &buffer_size,
            |b, &size| {
                b.iter(|| {
                    for _ in 0..size {
                        black_box(osc.next_sample());
                    }
                });
            },
        );
    }
    group.finish();
}

/// Benchmark one 512-frame callback with many overlapping tones
fn bench_mixer_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixer_render");
    let sample_rate = 48000.0;

    for voices in [1, 16, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(voices), &voices, |b, &voices| {
            let mut buffer = vec![0.0f32; 512];
            b.iter_batched(
                || {
                    let mut mixer = ToneMixer::new(sample_rate, WaveformType::Sine);
                    for i in 0..voices {
                        let request = ToneRequest {
                            frequency: 220.0 + i as f64 * 11.0,
                            start_time: 0.0,
                            duration: 10.0,
                            peak_gain: 0.3,
                            attack: 0.01,
                        };
                        mixer.schedule(ToneHandle(i as u64), request);
                    }
                    mixer
                },
                |mut mixer| {
                    mixer.render(&mut buffer);
                    black_box(buffer[511])
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_plan_playback, bench_oscillator, bench_mixer_render);
criterion_main!(benches);
