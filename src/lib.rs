//! Bell Pulse - a tile-based rhythm puzzle
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, pulse engine, song tracking, scoring)
//! - `session`: Per-frame driver state owned by the host loop
//! - `audio`: Audio collaborator (voice pool, Web Audio cues)
//! - `platform`: Browser bindings
//! - `settings`: Tempo and audio configuration

pub mod audio;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;

pub use session::{FrameOutcome, SessionMode, SessionState, update};
pub use settings::{Settings, SettingsError};

/// Game configuration constants
pub mod consts {
    /// Default tempo: milliseconds for the pulse to cross one normal tile
    pub const DEFAULT_MS_PER_TILE: f64 = 600.0;
    /// Default lifetime of a note wave ping
    pub const NOTE_WAVE_LIFETIME_MS: f64 = 400.0;

    /// Beat count the pulse holds while sitting on its generator
    pub const SPAWN_BEAT_COUNT: f64 = -1.0;
    /// Beats of lead-in before the first move off the generator
    pub const LEAD_IN_BEATS: f64 = -SPAWN_BEAT_COUNT;

    /// Beat cost of crossing a normal tile
    pub const TILE_BEAT_COST: f64 = 1.0;
    /// Beat cost of crossing a boosted tile
    pub const BOOST_BEAT_COST: f64 = 0.5;
    /// Extra beats the pulse rests on the terminal bell before the run is judged
    pub const TERMINAL_GRACE_BEATS: f64 = 1.0;

    /// Number of distinct bell classes
    pub const BELL_CLASSES: u8 = 4;

    /// Smallest grid that still has an interior ring
    pub const MIN_GRID_SIZE: usize = 3;
}

/// Discrete half-beat tick reached at `elapsed_ms`
///
/// Negative times floor toward negative infinity, so the counter never
/// reaches tick 0 before the clock does.
#[inline]
pub fn tick_at(elapsed_ms: f64, ms_per_tile: f64) -> i64 {
    (elapsed_ms * 2.0 / ms_per_tile).floor() as i64
}

/// Wall-clock offset (ms) of a beat on the course clock
#[inline]
pub fn beat_to_ms(beat: f64, ms_per_tile: f64) -> f64 {
    beat * ms_per_tile
}
