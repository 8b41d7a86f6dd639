//! Deterministic simulation module
//!
//! All puzzle logic lives here. This module must be pure and deterministic:
//! - Time enters only as a session timestamp, quantized to half-beat ticks
//! - Stable iteration order (row-major over the grid)
//! - No rendering, audio or platform dependencies; those react to `Cue`s

pub mod direction;
pub mod grid;
pub mod level;
pub mod pulse;
pub mod score;
pub mod song;
pub mod state;
pub mod tick;
pub mod wave;

pub use direction::{Direction, Mirror};
pub use grid::{BellIndex, Cell, Grid};
pub use pulse::{Pulse, PulsePhase, Step};
pub use score::ScoreBar;
pub use song::{PreviewStatus, SongTracker, track_answer};
pub use state::{CourseError, CourseState, CourseView, Cue, CueSink};
pub use tick::advance;
pub use wave::{NoteWave, NoteWaves};
