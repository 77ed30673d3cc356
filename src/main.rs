// Audio Studio - records a short phrase, arranges it on two tracks and plays it back

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use audio_studio::{
    AudioEngine, NoteName, Session, StudioConfig, ToneScheduler, VirtualScheduler,
};

#[derive(Parser)]
#[command(name = "audio_studio")]
#[command(about = "Piano keyboard sequencer: record, arrange and play back note clips")]
struct Cli {
    /// RON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use a virtual clock instead of the sound card and print the schedule
    #[arg(long)]
    dry_run: bool,

    /// Playback volume (0.0 - 1.0), defaults to the configured master volume
    #[arg(short, long)]
    volume: Option<f32>,

    /// Keyboard octave (0 - 8)
    #[arg(short, long)]
    octave: Option<u8>,
}

/// Seconds after the arrangement ends before playback is stopped
const TAIL: f64 = 0.5;

/// (note, press time, release time) relative to the start of the take
const DEMO_PHRASE: [(NoteName, f64, f64); 4] = [
    (NoteName::C, 0.0, 0.3),
    (NoteName::E, 0.4, 0.7),
    (NoteName::G, 0.8, 1.1),
    (NoteName::C, 1.2, 1.8),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => StudioConfig::load(path)?,
        None => StudioConfig::default(),
    };
    if let Some(octave) = cli.octave {
        config.default_octave = octave;
    }
    config.validate()?;
    let volume = cli.volume.unwrap_or(config.master_volume).clamp(0.0, 1.0);

    if cli.dry_run {
        info!("Dry run with a virtual clock");
        let mut session = Session::new(VirtualScheduler::new(), config)?;
        run_demo(&mut session, volume, |session, seconds| {
            session.scheduler_mut().advance(seconds)
        });
        print_schedule(session.scheduler());
    } else {
        let engine = AudioEngine::new(&config.audio)?;
        let mut session = Session::new(engine, config)?;
        run_demo(&mut session, volume, |_, seconds| {
            thread::sleep(Duration::from_secs_f64(seconds))
        });
    }

    Ok(())
}

/// Drives the session through record, commit, arrange and play.
/// `wait` lets time pass on the scheduler clock.
fn run_demo<S, W>(session: &mut Session<S>, volume: f32, mut wait: W)
where
    S: ToneScheduler,
    W: FnMut(&mut Session<S>, f64),
{
    record_phrase(session, &mut wait);
    let Some(first) = session.commit_to_timeline() else {
        info!("Nothing recorded");
        return;
    };
    info!("First take committed as {} on {}", first.clip_id, first.track_id);

    // Same phrase one octave up, placed two seconds later
    session.shift_octave(1);
    record_phrase(session, &mut wait);
    if let Some(second) = session.commit_to_timeline() {
        if let Err(err) = session.move_clip(second.clip_id, 2.0) {
            warn!("Could not place {}: {}", second.clip_id, err);
        }
    }

    for track in session.layout() {
        for clip in &track.clips {
            info!(
                "{} / {}: {:.2}s - {:.2}s ({:.0}px wide)",
                track.label,
                clip.label,
                clip.start_time,
                clip.start_time + clip.duration,
                clip.width_px
            );
        }
    }

    session.start_playback(volume);
    let length = session.timeline().duration() + TAIL;
    wait(session, length);
    session.stop_playback();

    info!("Done: {:?}", session.status());
}

fn record_phrase<S, W>(session: &mut Session<S>, wait: &mut W)
where
    S: ToneScheduler,
    W: FnMut(&mut Session<S>, f64),
{
    let mut events: Vec<(f64, NoteName, bool)> = DEMO_PHRASE
        .iter()
        .flat_map(|&(note, on, off)| [(on, note, true), (off, note, false)])
        .collect();
    events.sort_by(|a, b| a.0.total_cmp(&b.0));

    session.start_recording();
    let mut elapsed = 0.0;
    for (at, note, pressed) in events {
        wait(session, at - elapsed);
        elapsed = at;
        if pressed {
            session.note_on(note);
        } else {
            session.note_off(note);
        }
    }
    wait(session, 0.2);
    session.stop_recording();
}

fn print_schedule(scheduler: &VirtualScheduler) {
    println!("{:>8} {:>10} {:>10} {:>8} {:>6}", "tone", "start", "freq", "dur", "gain");
    for tone in scheduler.tones() {
        println!(
            "{:>8} {:>10.3} {:>10.2} {:>8.3} {:>6.3}{}",
            tone.handle.to_string(),
            tone.request.start_time,
            tone.request.frequency,
            tone.request.duration,
            tone.request.peak_gain,
            match tone.cancelled_at {
                Some(t) => format!("  cancelled at {:.3}", t),
                None => String::new(),
            }
        );
    }
}
