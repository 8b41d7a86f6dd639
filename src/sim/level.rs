//! Built-in content: the demo course and the reference tune

use glam::IVec2;

use super::direction::{Direction, Mirror};
use super::grid::{BellIndex, Grid};
use super::state::{CourseError, CourseState};
use crate::settings::Settings;

/// Reference tune, one slot per half-beat tick
#[rustfmt::skip]
pub const BELL_SONG: [Option<BellIndex>; 50] = [
    Some(1), None, Some(2), None, Some(1), None, None, None, None, None,
    Some(1), Some(3), None, Some(2), Some(1), None, Some(1), None, Some(2), None,
    Some(1), None, None, None, None, None, Some(1), Some(3), None, Some(2),
    Some(1), None, Some(1), None, None, Some(2), None, None, Some(1), None,
    None, Some(3), None, None, Some(2), None, None, Some(1), Some(0), None,
];

/// Melody the demo course is solved against
#[rustfmt::skip]
pub const DEMO_ANSWER: [Option<BellIndex>; 10] = [
    Some(1), None, None, None, None, Some(2), None, None, None, Some(3),
];

/// 6x7 board whose pulse path rings bells 1, 2, 3 on ticks 0, 5, 9
///
/// ```text
///   . . . . . . .
///   G 1 \ . . . .
///   . . B . 0 . .
///   . . 2 . B . .
///   . 3 / . . . .
///   . . . . . . .
/// ```
///
/// Bell 0 sits off the path so the full tune can be previewed.
pub fn demo_grid() -> Grid {
    let mut grid = Grid::new(6, 7);
    grid.set_generator(IVec2::new(0, 1), Direction::Right);
    grid.set_bell(IVec2::new(1, 1), Some(1));
    grid.set_mirror(IVec2::new(2, 1), Some(Mirror::UpLeft));
    grid.set_boost(IVec2::new(2, 2), true);
    grid.set_bell(IVec2::new(2, 3), Some(2));
    grid.set_mirror(IVec2::new(2, 4), Some(Mirror::UpRight));
    grid.set_bell(IVec2::new(1, 4), Some(3));
    grid.set_terminal(IVec2::new(1, 4));

    grid.set_bell(IVec2::new(4, 2), Some(0));
    grid.set_boost(IVec2::new(4, 3), true);
    grid
}

pub fn demo_course(settings: &Settings) -> Result<CourseState, CourseError> {
    CourseState::new(demo_grid(), DEMO_ANSWER.to_vec(), settings)
}

/// Demo board set to preview the full reference tune
pub fn song_course(settings: &Settings) -> Result<CourseState, CourseError> {
    CourseState::new(demo_grid(), BELL_SONG.to_vec(), settings)
}
