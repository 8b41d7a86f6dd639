//! Bell Pulse entry point
//!
//! The web build is driven from JS through `platform::CourseHandle`. The
//! native binary plays the demo course headless with jittered frame times and
//! logs every cue.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::error::Error;

    use bell_pulse::sim::{BellIndex, CueSink, NoteWave, level};
    use bell_pulse::{FrameOutcome, SessionState, Settings, platform, update};
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    /// Give up if a run has not finished after this long
    const MAX_SESSION_MS: f64 = 120_000.0;

    /// Writes cues to the log with the frame time they arrived on
    #[derive(Default)]
    struct LogCues {
        now_ms: f64,
        bells: usize,
    }

    impl CueSink for LogCues {
        fn on_bell_rung(&mut self, bell: BellIndex) {
            self.bells += 1;
            let hz = bell_pulse::audio::bell_frequency(bell).unwrap_or_default();
            log::info!("{:>8.1}ms  bell {} ({:.2} Hz)", self.now_ms, bell, hz);
        }

        fn on_click_beat(&mut self) {
            log::debug!("{:>8.1}ms  click", self.now_ms);
        }

        fn on_boing(&mut self) {
            log::warn!("{:>8.1}ms  boing", self.now_ms);
        }

        fn push_note_wave(&mut self, wave: &NoteWave) {
            log::debug!(
                "{:>8.1}ms  wave at {} (correct: {})",
                self.now_ms,
                wave.position,
                wave.correct
            );
        }

        fn on_song_stopped(&mut self) {
            log::info!("{:>8.1}ms  song stopped", self.now_ms);
        }

        fn on_run_completed(&mut self) {
            log::info!("{:>8.1}ms  run completed", self.now_ms);
        }
    }

    fn load_settings() -> Result<Settings, Box<dyn Error>> {
        match std::env::args().nth(1) {
            Some(path) => {
                let json = std::fs::read_to_string(&path)?;
                log::info!("Settings loaded from {}", path);
                Ok(Settings::from_json(&json)?)
            }
            None => Ok(Settings::default()),
        }
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        let settings = load_settings()?;
        let mut course = level::demo_course(&settings)?;
        let mut session = SessionState::new();
        let mut cues = LogCues::default();

        let seed = std::env::var("BELL_PULSE_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(42u64);
        let mut rng = Pcg32::seed_from_u64(seed);
        log::info!("Frame jitter seed: {}", seed);

        // Preview first, then solve, on one host clock
        let mut now = 0.0;
        session.start_preview(&mut course, now);
        loop {
            cues.now_ms = session.elapsed(now);
            if update(&mut session, &mut course, now, &mut cues) == FrameOutcome::PreviewStopped {
                break;
            }
            now += rng.random_range(8.0..40.0);
        }

        session.start_run(&mut course, now);
        loop {
            cues.now_ms = session.elapsed(now);
            if update(&mut session, &mut course, now, &mut cues) == FrameOutcome::RunCompleted {
                break;
            }
            if session.elapsed(now) > MAX_SESSION_MS {
                return Err("run did not finish".into());
            }
            now += rng.random_range(8.0..40.0);
        }

        log::info!(
            "Bells rung: {}, full score: {}",
            cues.bells,
            course.score().is_full_score()
        );
        println!("{}", course.view(session.elapsed(now)).to_json()?);
        Ok(())
    }

    pub fn init() {
        platform::init_logging();
        log::info!("Bell Pulse (native) starting...");
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::init();
    if let Err(e) = native::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::CourseHandle, this is just to satisfy the compiler
}
