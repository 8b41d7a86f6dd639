//! Song tracking: half-beat tick counter and the melody preview
//!
//! The tracker quantizes elapsed time into ticks at twice the beat rate.
//! The preview plays the reference answer on the board without running
//! the pulse.

use serde::{Deserialize, Serialize};

use super::state::{CourseState, Cue};
use super::wave::NoteWave;
use crate::tick_at;

/// Tick value before anything has been tracked, so tick 0 is observed
pub const START_TICK: i64 = -1;

/// Monotonic half-beat counter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SongTracker {
    last_tick: i64,
    initial_tick: i64,
    ms_per_tile: f64,
}

impl SongTracker {
    pub fn new(ms_per_tile: f64) -> Self {
        Self::starting_at(ms_per_tile, START_TICK)
    }

    /// Tracker that has already consumed every tick up to `initial_tick`
    pub fn starting_at(ms_per_tile: f64, initial_tick: i64) -> Self {
        Self {
            last_tick: initial_tick,
            initial_tick,
            ms_per_tile,
        }
    }

    /// Advance by exactly one tick if the clock at `elapsed_ms` is ahead
    ///
    /// Returns false (and changes nothing) once caught up, including when
    /// time runs backwards.
    pub fn tick(&mut self, elapsed_ms: f64) -> bool {
        if tick_at(elapsed_ms, self.ms_per_tile) > self.last_tick {
            self.last_tick += 1;
            true
        } else {
            false
        }
    }

    /// Clicks land on even ticks, once per full beat
    pub fn is_click_frame(&self) -> bool {
        self.last_tick.rem_euclid(2) == 0 && self.last_tick >= 0
    }

    pub fn current_tick(&self) -> i64 {
        self.last_tick
    }

    /// Session time (ms) at which `tick` begins
    pub fn tick_start_ms(&self, tick: i64) -> f64 {
        tick as f64 * self.ms_per_tile / 2.0
    }

    pub fn reset(&mut self) {
        self.last_tick = self.initial_tick;
    }
}

/// Whether the melody preview is still sounding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewStatus {
    Playing,
    Stopped,
}

/// Play the reference answer against the board at `elapsed_ms`
///
/// Every new tick rings its bell (if the slot holds one) and pings every
/// board cell of that bell class. Clicks fire on even ticks. Once the
/// tracker runs past the answer the preview stops.
pub fn track_answer(state: &mut CourseState, elapsed_ms: f64) -> PreviewStatus {
    let answer_len = state.answer.len() as i64;
    if state.preview.current_tick() >= answer_len {
        return PreviewStatus::Stopped;
    }

    while state.preview.tick(elapsed_ms) {
        let tick = state.preview.current_tick();
        if tick >= answer_len {
            log::info!("Preview finished after {} ticks", answer_len);
            state.outbox.push(Cue::SongStopped);
            state.note_waves.prune(elapsed_ms);
            return PreviewStatus::Stopped;
        }

        if let Some(bell) = state.expected_bell(tick) {
            log::debug!("Preview tick {}: bell {}", tick, bell);
            state.outbox.push(Cue::BellRung { bell });
            let at = state.preview.tick_start_ms(tick);
            let positions: Vec<_> = state.grid.bell_cells(bell).collect();
            for position in positions {
                let wave = NoteWave::new(position, true, at);
                state.note_waves.push(wave);
                state.outbox.push(Cue::NoteWave(wave));
            }
        }

        if state.click_track && state.preview.is_click_frame() {
            state.outbox.push(Cue::ClickBeat);
        }
    }

    state.note_waves.prune(elapsed_ms);
    PreviewStatus::Playing
}
