//! Driver-side session state
//!
//! The host loop owns a `SessionState` and hands it to `update` once per
//! animation frame together with the course and a cue sink. The simulation
//! itself never sees wall-clock time, only elapsed session time.

use serde::{Deserialize, Serialize};

use crate::sim::{CourseState, CueSink, PreviewStatus, advance, track_answer};

/// What the session is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionMode {
    /// Board is editable, nothing is ticking
    #[default]
    Editing,
    /// The pulse is travelling
    Running,
    /// The reference tune is playing on the board
    Previewing,
}

/// Result of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Idle,
    Running,
    RunCompleted,
    Previewing,
    PreviewStopped,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub mode: SessionMode,
    /// Host timestamp (ms) the current run or preview started
    pub start_ms: f64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put the pulse back on its generator and start the clock at `now_ms`
    pub fn start_run(&mut self, course: &mut CourseState, now_ms: f64) {
        course.reset();
        self.mode = SessionMode::Running;
        self.start_ms = now_ms;
        log::info!("Session: run started");
    }

    /// Play the reference tune from the top at `now_ms`
    pub fn start_preview(&mut self, course: &mut CourseState, now_ms: f64) {
        course.restart_preview();
        self.mode = SessionMode::Previewing;
        self.start_ms = now_ms;
        log::info!("Session: preview started");
    }

    /// Stop whatever is playing and return to editing
    pub fn stop(&mut self) {
        if self.mode != SessionMode::Editing {
            log::info!("Session: stopped ({:?})", self.mode);
        }
        self.mode = SessionMode::Editing;
    }

    pub fn elapsed(&self, now_ms: f64) -> f64 {
        now_ms - self.start_ms
    }
}

/// Drive one animation frame
///
/// Cues produced during the frame are dispatched to `sink` before returning.
pub fn update<S: CueSink + ?Sized>(
    session: &mut SessionState,
    course: &mut CourseState,
    now_ms: f64,
    sink: &mut S,
) -> FrameOutcome {
    let elapsed = session.elapsed(now_ms);
    let outcome = match session.mode {
        SessionMode::Editing => FrameOutcome::Idle,
        SessionMode::Running => {
            if advance(course, elapsed) {
                session.stop();
                FrameOutcome::RunCompleted
            } else {
                FrameOutcome::Running
            }
        }
        SessionMode::Previewing => match track_answer(course, elapsed) {
            PreviewStatus::Playing => FrameOutcome::Previewing,
            PreviewStatus::Stopped => {
                session.stop();
                FrameOutcome::PreviewStopped
            }
        },
    };
    course.dispatch_cues(sink);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::level;
    use crate::sim::{Cue, PulsePhase};

    #[derive(Default)]
    struct CountingSink {
        bells: usize,
        clicks: usize,
        completed: usize,
        stopped: usize,
    }

    impl CueSink for CountingSink {
        fn on_bell_rung(&mut self, _bell: u8) {
            self.bells += 1;
        }
        fn on_click_beat(&mut self) {
            self.clicks += 1;
        }
        fn on_run_completed(&mut self) {
            self.completed += 1;
        }
        fn on_song_stopped(&mut self) {
            self.stopped += 1;
        }
    }

    #[test]
    fn test_editing_does_not_tick() {
        let mut course = level::demo_course(&Settings::default()).expect("demo course");
        let mut session = SessionState::new();
        let mut sink = CountingSink::default();
        assert_eq!(
            update(&mut session, &mut course, 5000.0, &mut sink),
            FrameOutcome::Idle
        );
        assert_eq!(course.phase(), PulsePhase::Idle);
    }

    #[test]
    fn test_run_uses_time_since_start() {
        let mut course = level::demo_course(&Settings::default()).expect("demo course");
        let mut session = SessionState::new();
        let mut sink = CountingSink::default();

        // Host clock is far from zero when the run starts
        let start = 123_456.0;
        session.start_run(&mut course, start);
        let mut now = start;
        let mut outcome = FrameOutcome::Running;
        while outcome == FrameOutcome::Running {
            outcome = update(&mut session, &mut course, now, &mut sink);
            now += 16.0;
        }
        assert_eq!(outcome, FrameOutcome::RunCompleted);
        assert_eq!(session.mode, SessionMode::Editing);
        assert_eq!(sink.bells, 3);
        assert_eq!(sink.completed, 1);
        assert!(sink.clicks > 0);
        assert!(course.score().is_full_score());
    }

    #[test]
    fn test_preview_then_stop() {
        let mut course = level::demo_course(&Settings::default()).expect("demo course");
        let mut session = SessionState::new();
        let mut sink = CountingSink::default();

        session.start_preview(&mut course, 1000.0);
        assert_eq!(
            update(&mut session, &mut course, 1000.0, &mut sink),
            FrameOutcome::Previewing
        );
        assert_eq!(sink.bells, 1);

        // Ten answer slots: stops on tick 10 (3000ms in)
        assert_eq!(
            update(&mut session, &mut course, 4000.0, &mut sink),
            FrameOutcome::PreviewStopped
        );
        assert_eq!(sink.bells, 3);
        assert_eq!(sink.stopped, 1);
        assert_eq!(session.mode, SessionMode::Editing);
    }

    #[test]
    fn test_restart_run_resets_course() {
        let mut course = level::demo_course(&Settings::default()).expect("demo course");
        let mut session = SessionState::new();
        let mut cues: Vec<Cue> = Vec::new();

        session.start_run(&mut course, 0.0);
        update(&mut session, &mut course, 1500.0, &mut cues);
        assert_ne!(course.logical_position(), course.pulse().spawn_position());

        session.start_run(&mut course, 2000.0);
        assert_eq!(course.logical_position(), course.pulse().spawn_position());
        assert_eq!(course.phase(), PulsePhase::Idle);
    }
}
