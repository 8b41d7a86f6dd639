//! The pulse: the token that travels the board
//!
//! Movement is quantized to half-beat ticks. The pulse only steps once the
//! tick counter has caught up with the beat it would arrive on, so the
//! path is identical however the frames fall.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::grid::{BellIndex, Cell, Grid};
use crate::beat_to_ms;
use crate::consts::{SPAWN_BEAT_COUNT, TERMINAL_GRACE_BEATS, TILE_BEAT_COST};

/// Run lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PulsePhase {
    /// Not started, or reset
    Idle,
    Running,
    /// Terminal hold fully elapsed
    Finished,
}

/// Result of offering one tick to the pulse
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// The tick has not reached the next arrival beat
    Waiting,
    /// Resting on the terminal bell (or after being lost)
    Holding,
    Moved {
        position: IVec2,
        bell: Option<BellIndex>,
        reached_terminal: bool,
    },
    /// Stepped off the board; the run ends at this beat
    Lost,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pulse {
    /// Authoritative cell
    pub logical_position: IVec2,
    /// Interpolated position in cell units (x = column, y = row)
    pub draw_position: Vec2,
    /// Heading the pulse arrived on
    pub direction: Direction,
    /// Beats travelled; +1 per normal tile, +0.5 per boost
    pub beat_count: f64,
    /// Beat at which the run is judged complete
    pub beat_count_end: Option<f64>,
    /// Last session time handed to the engine
    pub last_timestep: f64,
    pub phase: PulsePhase,
    spawn_position: IVec2,
    spawn_direction: Direction,
}

impl Pulse {
    /// A pulse waiting on its generator
    pub fn spawn(position: IVec2, direction: Direction) -> Self {
        Self {
            logical_position: position,
            draw_position: position.as_vec2(),
            direction,
            beat_count: SPAWN_BEAT_COUNT,
            beat_count_end: None,
            last_timestep: 0.0,
            phase: PulsePhase::Idle,
            spawn_position: position,
            spawn_direction: direction,
        }
    }

    /// Back to the generator with the clock cleared
    pub fn reset(&mut self) {
        *self = Self::spawn(self.spawn_position, self.spawn_direction);
    }

    pub fn spawn_position(&self) -> IVec2 {
        self.spawn_position
    }

    /// Offer course tick `tick` to the pulse
    ///
    /// Reflection is resolved on the cell being left, before the step, so a
    /// mirror on the arrival cell only matters for the following move.
    pub fn step(&mut self, grid: &Grid, tick: i64) -> Step {
        let Some(cell) = grid.cell(self.logical_position) else {
            return Step::Holding;
        };
        if self.beat_count_end.is_some() && grid.terminal() == Some(self.logical_position) {
            return Step::Holding;
        }

        let next_beat = self.beat_count + cell.beat_cost();
        if self.beat_count_end.is_some_and(|end| next_beat >= end) {
            return Step::Holding;
        }
        if next_beat > tick as f64 / 2.0 {
            return Step::Waiting;
        }

        let heading = self.direction.through(cell.mirror);
        let target = self.logical_position + heading.vector();
        self.direction = heading;
        self.beat_count = next_beat;

        let Some(arrived) = grid.cell(target) else {
            self.beat_count_end = Some(next_beat);
            return Step::Lost;
        };

        self.logical_position = target;
        let reached_terminal = grid.terminal() == Some(target) && self.beat_count_end.is_none();
        if reached_terminal {
            self.beat_count_end = Some(next_beat + TERMINAL_GRACE_BEATS);
        }
        Step::Moved {
            position: target,
            bell: arrived.bell,
            reached_terminal,
        }
    }

    /// Resting on the final cell: snap instead of interpolating
    pub fn in_terminal_hold(&self, course_ms: f64, ms_per_tile: f64) -> bool {
        self.beat_count_end
            .is_some_and(|end| course_ms >= beat_to_ms(end - 0.5, ms_per_tile))
    }

    /// The run's end beat has fully elapsed
    pub fn run_over(&self, course_ms: f64, ms_per_tile: f64) -> bool {
        self.beat_count_end
            .is_some_and(|end| course_ms >= beat_to_ms(end, ms_per_tile))
    }

    /// Recompute `draw_position` for course time `course_ms`
    ///
    /// The pulse enters a tile at its edge and leaves at the opposite edge;
    /// any turn happens at the centre, so the heading switches to the
    /// reflected one halfway across.
    pub fn update_draw_position(&mut self, grid: &Grid, course_ms: f64, ms_per_tile: f64) {
        let here = self.logical_position.as_vec2();
        if self.in_terminal_hold(course_ms, ms_per_tile) {
            self.draw_position = here;
            return;
        }

        let cell = grid.cell(self.logical_position);
        let cost = cell.map_or(TILE_BEAT_COST, Cell::beat_cost);
        let mut offset_rate =
            ((course_ms / ms_per_tile - self.beat_count) / cost).clamp(0.0, 1.0);
        // Nothing enters the generator: wait at its centre until departure
        if self.beat_count <= SPAWN_BEAT_COUNT {
            offset_rate = offset_rate.max(0.5);
        }
        let heading = if offset_rate < 0.5 {
            self.direction
        } else {
            self.direction.through(cell.and_then(|c| c.mirror))
        };
        self.draw_position = here + heading.vector().as_vec2() * (offset_rate - 0.5) as f32;
    }
}
