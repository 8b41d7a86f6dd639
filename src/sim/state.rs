//! Course state and the cues it emits
//!
//! A `CourseState` owns everything the simulation mutates: the board, the
//! pulse, both song trackers, the score bar and the note-wave queue.
//! Renderers read it through `CourseView`; audio and visuals react to the
//! `Cue`s it queues.

use glam::{IVec2, Vec2};
use serde::Serialize;
use thiserror::Error;

use super::direction::Direction;
use super::grid::{BellIndex, Grid};
use super::pulse::{Pulse, PulsePhase};
use super::score::ScoreBar;
use super::song::SongTracker;
use super::wave::{NoteWave, NoteWaves};
use crate::consts::{BELL_CLASSES, LEAD_IN_BEATS, MIN_GRID_SIZE};
use crate::settings::{Settings, SettingsError};

/// Course setup failures; a course that fails validation never runs
#[derive(Debug, Error)]
pub enum CourseError {
    #[error("grid is {rows}x{cols}, at least 3x3 is required")]
    GridTooSmall { rows: usize, cols: usize },
    #[error("board has no pulse generator")]
    NoGenerator,
    #[error("board has {0} pulse generators, exactly one is required")]
    MultipleGenerators(usize),
    #[error("generator at {position} heading {heading:?} must sit on the border facing inward")]
    GeneratorNotOnBorder { position: IVec2, heading: Direction },
    #[error("board has no terminal bell")]
    NoTerminal,
    #[error("terminal {0} lies outside the board")]
    TerminalOutOfGrid(IVec2),
    #[error("terminal {0} holds no bell")]
    TerminalWithoutBell(IVec2),
    #[error("answer sequence holds no bells")]
    EmptyAnswer,
    #[error("bell class {bell} is out of range (0..4)")]
    BellOutOfRange { bell: BellIndex },
    #[error("answer expects bell {bell} at tick {tick} but no board cell holds it")]
    BellMissingFromBoard { bell: BellIndex, tick: usize },
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Outward event for audio and visual collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cue {
    BellRung { bell: BellIndex },
    ClickBeat,
    /// Penalty sound for a wrong or missed bell
    Boing,
    NoteWave(NoteWave),
    SongStopped,
    RunCompleted,
}

/// Receiver for cues; every hook defaults to doing nothing
pub trait CueSink {
    fn on_bell_rung(&mut self, _bell: BellIndex) {}
    fn on_click_beat(&mut self) {}
    fn on_boing(&mut self) {}
    fn push_note_wave(&mut self, _wave: &NoteWave) {}
    fn on_song_stopped(&mut self) {}
    fn on_run_completed(&mut self) {}
}

impl Cue {
    pub fn dispatch<S: CueSink + ?Sized>(&self, sink: &mut S) {
        match self {
            Cue::BellRung { bell } => sink.on_bell_rung(*bell),
            Cue::ClickBeat => sink.on_click_beat(),
            Cue::Boing => sink.on_boing(),
            Cue::NoteWave(wave) => sink.push_note_wave(wave),
            Cue::SongStopped => sink.on_song_stopped(),
            Cue::RunCompleted => sink.on_run_completed(),
        }
    }
}

/// Collects cues as values
impl CueSink for Vec<Cue> {
    fn on_bell_rung(&mut self, bell: BellIndex) {
        self.push(Cue::BellRung { bell });
    }
    fn on_click_beat(&mut self) {
        self.push(Cue::ClickBeat);
    }
    fn on_boing(&mut self) {
        self.push(Cue::Boing);
    }
    fn push_note_wave(&mut self, wave: &NoteWave) {
        self.push(Cue::NoteWave(*wave));
    }
    fn on_song_stopped(&mut self) {
        self.push(Cue::SongStopped);
    }
    fn on_run_completed(&mut self) {
        self.push(Cue::RunCompleted);
    }
}

/// Complete simulation state for one puzzle
#[derive(Debug, Clone)]
pub struct CourseState {
    pub(crate) grid: Grid,
    /// Expected bell per course tick
    pub(crate) answer: Vec<Option<BellIndex>>,
    pub(crate) ms_per_tile: f64,
    pub(crate) click_track: bool,
    pub(crate) pulse: Pulse,
    /// Drives the pulse on the course clock
    pub(crate) tracker: SongTracker,
    /// Drives the melody preview on the session clock
    pub(crate) preview: SongTracker,
    pub(crate) score: ScoreBar,
    pub(crate) note_waves: NoteWaves,
    pub(crate) outbox: Vec<Cue>,
    pub(crate) completion_reported: bool,
}

impl CourseState {
    /// Validate the board and answer, then place the pulse on its generator
    pub fn new(
        grid: Grid,
        answer: Vec<Option<BellIndex>>,
        settings: &Settings,
    ) -> Result<Self, CourseError> {
        settings.validate()?;
        let (spawn, heading) = validate_grid(&grid)?;
        validate_answer(&grid, &answer)?;

        let score = ScoreBar::for_answer(&answer);
        log::info!(
            "Course ready: {}x{} board, {} ticks, {} expected bells",
            grid.rows(),
            grid.cols(),
            answer.len(),
            score.size()
        );

        Ok(Self {
            grid,
            answer,
            ms_per_tile: settings.ms_per_tile,
            click_track: settings.click_track,
            pulse: Pulse::spawn(spawn, heading),
            tracker: SongTracker::new(settings.ms_per_tile),
            preview: SongTracker::new(settings.ms_per_tile),
            score,
            note_waves: NoteWaves::new(settings.note_wave_lifetime_ms),
            outbox: Vec::new(),
            completion_reported: false,
        })
    }

    /// Return the pulse to its generator and clear the run
    ///
    /// A full score bar survives the reset.
    pub fn reset(&mut self) {
        self.pulse.reset();
        self.tracker.reset();
        self.preview.reset();
        self.score.reset();
        self.note_waves.clear();
        self.outbox.clear();
        self.completion_reported = false;
    }

    /// Rewind the melody preview
    pub fn restart_preview(&mut self) {
        self.preview.reset();
        self.note_waves.clear();
    }

    /// Course clock for a session time: the lead-in beat comes first
    #[inline]
    pub fn course_time(&self, elapsed_ms: f64) -> f64 {
        elapsed_ms - LEAD_IN_BEATS * self.ms_per_tile
    }

    /// Session time at which course tick `tick` begins
    pub fn course_tick_start_ms(&self, tick: i64) -> f64 {
        self.tracker.tick_start_ms(tick) + LEAD_IN_BEATS * self.ms_per_tile
    }

    /// Answer slot for `tick`; ticks outside the answer expect nothing
    pub fn expected_bell(&self, tick: i64) -> Option<BellIndex> {
        usize::try_from(tick)
            .ok()
            .and_then(|i| self.answer.get(i).copied().flatten())
    }

    /// Take every cue queued since the last drain
    pub fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.outbox)
    }

    /// Drain queued cues straight into a sink
    pub fn dispatch_cues<S: CueSink + ?Sized>(&mut self, sink: &mut S) {
        for cue in self.outbox.drain(..) {
            cue.dispatch(sink);
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn answer(&self) -> &[Option<BellIndex>] {
        &self.answer
    }

    pub fn ms_per_tile(&self) -> f64 {
        self.ms_per_tile
    }

    pub fn pulse(&self) -> &Pulse {
        &self.pulse
    }

    pub fn phase(&self) -> PulsePhase {
        self.pulse.phase
    }

    pub fn logical_position(&self) -> IVec2 {
        self.pulse.logical_position
    }

    pub fn draw_position(&self) -> Vec2 {
        self.pulse.draw_position
    }

    pub fn direction(&self) -> Direction {
        self.pulse.direction
    }

    pub fn score(&self) -> &ScoreBar {
        &self.score
    }

    pub fn note_waves(&self) -> &NoteWaves {
        &self.note_waves
    }

    /// Current course tick of the running pulse
    pub fn current_tick(&self) -> i64 {
        self.tracker.current_tick()
    }

    /// Immutable snapshot for a renderer at session time `now`
    pub fn view(&self, now: f64) -> CourseView<'_> {
        CourseView {
            grid: &self.grid,
            phase: self.pulse.phase,
            logical_position: self.pulse.logical_position,
            draw_position: self.pulse.draw_position,
            direction: self.pulse.direction,
            beat_count: self.pulse.beat_count,
            score: self.score.entries(),
            full_score: self.score.is_full_score(),
            note_waves: self.note_waves.active(now).copied().collect(),
        }
    }
}

fn validate_grid(grid: &Grid) -> Result<(IVec2, Direction), CourseError> {
    if grid.rows() < MIN_GRID_SIZE || grid.cols() < MIN_GRID_SIZE {
        return Err(CourseError::GridTooSmall {
            rows: grid.rows(),
            cols: grid.cols(),
        });
    }

    let generators: Vec<_> = grid.generators().collect();
    let spawn = match generators.as_slice() {
        [] => return Err(CourseError::NoGenerator),
        [one] => *one,
        many => return Err(CourseError::MultipleGenerators(many.len())),
    };

    // A path that starts from the border can never loop back onto itself
    let (position, heading) = spawn;
    let step = heading.vector();
    if grid.contains(position - step) || !grid.in_bounds(position + step) {
        return Err(CourseError::GeneratorNotOnBorder { position, heading });
    }

    if let Some((_, bell)) = grid.invalid_bells().next() {
        return Err(CourseError::BellOutOfRange { bell });
    }

    let terminal = grid.terminal().ok_or(CourseError::NoTerminal)?;
    if !grid.contains(terminal) {
        return Err(CourseError::TerminalOutOfGrid(terminal));
    }
    if !grid.has_bell(terminal) {
        return Err(CourseError::TerminalWithoutBell(terminal));
    }

    Ok(spawn)
}

fn validate_answer(grid: &Grid, answer: &[Option<BellIndex>]) -> Result<(), CourseError> {
    if answer.iter().flatten().next().is_none() {
        return Err(CourseError::EmptyAnswer);
    }
    for (tick, bell) in answer.iter().enumerate() {
        let Some(bell) = *bell else { continue };
        if bell >= BELL_CLASSES {
            return Err(CourseError::BellOutOfRange { bell });
        }
        if grid.bell_cells(bell).next().is_none() {
            return Err(CourseError::BellMissingFromBoard { bell, tick });
        }
    }
    Ok(())
}

/// Borrowed, serializable snapshot handed to renderers
#[derive(Debug, Serialize)]
pub struct CourseView<'a> {
    pub grid: &'a Grid,
    pub phase: PulsePhase,
    pub logical_position: IVec2,
    pub draw_position: Vec2,
    pub direction: Direction,
    pub beat_count: f64,
    pub score: &'a [Option<bool>],
    pub full_score: bool,
    pub note_waves: Vec<NoteWave>,
}

impl CourseView<'_> {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
