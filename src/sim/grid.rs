//! Board cells and the grid that holds them
//!
//! The grid is authored once (by an editor or `level`) and read in place by
//! the pulse engine. Positions are `IVec2` with `x` = column, `y` = row.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::direction::{Direction, Mirror};
use crate::consts::BELL_CLASSES;

/// Bell class (0..BELL_CLASSES)
pub type BellIndex = u8;

/// A single board tile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Halves the beat cost of crossing this tile
    pub boost: bool,
    pub mirror: Option<Mirror>,
    pub bell: Option<BellIndex>,
    /// Spawn heading if this is the pulse generator
    pub generator: Option<Direction>,
}

impl Cell {
    pub fn has_mirror(&self) -> bool {
        self.mirror.is_some()
    }

    pub fn has_bell(&self) -> bool {
        self.bell.is_some()
    }

    pub fn is_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Beats the pulse spends crossing this tile
    pub fn beat_cost(&self) -> f64 {
        use crate::consts::{BOOST_BEAT_COST, TILE_BEAT_COST};
        if self.boost {
            BOOST_BEAT_COST
        } else {
            TILE_BEAT_COST
        }
    }
}

/// Fixed-size board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    /// Row-major cells
    cells: Vec<Cell>,
    /// Bell cell that ends a run
    terminal: Option<IVec2>,
}

impl Grid {
    /// Create a grid with every cell empty
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::default(); rows * cols],
            terminal: None,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// True if `pos` lies anywhere on the board
    #[inline]
    pub fn contains(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.cols && (pos.y as usize) < self.rows
    }

    /// True if `pos` lies strictly inside the border ring
    ///
    /// The border is reserved for generators and mirrors; bells and boosts
    /// are placed inside.
    pub fn in_bounds(&self, pos: IVec2) -> bool {
        pos.x > 0
            && pos.y > 0
            && (pos.x as usize) < self.cols.saturating_sub(1)
            && (pos.y as usize) < self.rows.saturating_sub(1)
    }

    #[inline]
    fn index(&self, pos: IVec2) -> Option<usize> {
        self.contains(pos)
            .then(|| pos.y as usize * self.cols + pos.x as usize)
    }

    pub fn cell(&self, pos: IVec2) -> Option<&Cell> {
        self.index(pos).map(|i| &self.cells[i])
    }

    pub fn cell_mut(&mut self, pos: IVec2) -> Option<&mut Cell> {
        self.index(pos).map(move |i| &mut self.cells[i])
    }

    pub fn has_mirror(&self, pos: IVec2) -> bool {
        self.cell(pos).is_some_and(Cell::has_mirror)
    }

    pub fn has_bell(&self, pos: IVec2) -> bool {
        self.cell(pos).is_some_and(Cell::has_bell)
    }

    pub fn boost(&self, pos: IVec2) -> bool {
        self.cell(pos).is_some_and(|c| c.boost)
    }

    /// Iterate `(position, cell)` in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, &Cell)> {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (IVec2::new((i % cols) as i32, (i / cols) as i32), cell))
    }

    /// All generator cells with their spawn headings
    pub fn generators(&self) -> impl Iterator<Item = (IVec2, Direction)> + '_ {
        self.iter()
            .filter_map(|(pos, cell)| cell.generator.map(|dir| (pos, dir)))
    }

    /// The single generator, if exactly one is placed
    pub fn generator(&self) -> Option<(IVec2, Direction)> {
        let mut gens = self.generators();
        let first = gens.next()?;
        gens.next().is_none().then_some(first)
    }

    /// Positions of every cell holding `bell`
    pub fn bell_cells(&self, bell: BellIndex) -> impl Iterator<Item = IVec2> + '_ {
        self.iter()
            .filter(move |(_, cell)| cell.bell == Some(bell))
            .map(|(pos, _)| pos)
    }

    pub fn terminal(&self) -> Option<IVec2> {
        self.terminal
    }

    /// Mark the bell cell that ends a run
    pub fn set_terminal(&mut self, pos: IVec2) {
        self.terminal = Some(pos);
    }

    // Authoring helpers; out-of-grid positions are ignored

    pub fn set_boost(&mut self, pos: IVec2, boost: bool) {
        if let Some(cell) = self.cell_mut(pos) {
            cell.boost = boost;
        }
    }

    pub fn set_mirror(&mut self, pos: IVec2, mirror: Option<Mirror>) {
        if let Some(cell) = self.cell_mut(pos) {
            cell.mirror = mirror;
        }
    }

    /// Assign a bell class; indices outside `BELL_CLASSES` are stored and
    /// rejected later by course validation
    pub fn set_bell(&mut self, pos: IVec2, bell: Option<BellIndex>) {
        if let Some(cell) = self.cell_mut(pos) {
            cell.bell = bell;
        }
    }

    /// Place the generator, clearing any previous one
    pub fn set_generator(&mut self, pos: IVec2, heading: Direction) {
        if !self.contains(pos) {
            return;
        }
        for cell in &mut self.cells {
            cell.generator = None;
        }
        if let Some(cell) = self.cell_mut(pos) {
            cell.generator = Some(heading);
        }
    }

    /// Bell classes in use that fall outside the valid range
    pub(crate) fn invalid_bells(&self) -> impl Iterator<Item = (IVec2, BellIndex)> + '_ {
        self.iter()
            .filter_map(|(pos, cell)| cell.bell.map(|b| (pos, b)))
            .filter(|&(_, b)| b >= BELL_CLASSES)
    }
}
