//! The 10×10 attack surface owned by one side.

use core::fmt;

use crate::common::{Axis, Coord, EngineError, PlacementError};
use crate::config::BOARD_SIZE;
use crate::vessel::{footprint, Vessel, VesselRef};

/// One grid square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub struct Cell {
    pub hit: bool,
    pub occupant: Option<VesselRef>,
}

/// Row-major snapshot of a grid.
pub type Cells = [[Cell; BOARD_SIZE]; BOARD_SIZE];

/// Grid state: occupancy, hits and whether attacks are still accepted.
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Cells,
    accepting: bool,
}

impl Grid {
    /// An empty grid that accepts attacks.
    pub fn new() -> Self {
        Self {
            cells: [[Cell::default(); BOARD_SIZE]; BOARD_SIZE],
            accepting: true,
        }
    }

    /// Clear every placement and hit.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// Stop processing further attacks.
    pub fn close(&mut self) {
        self.accepting = false;
    }

    /// The cell at `coord`, if on the grid.
    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        self.cells.get(coord.row).and_then(|row| row.get(coord.col))
    }

    /// Vessel projection at `coord`, regardless of whether it was hit.
    pub fn occupant(&self, coord: Coord) -> Option<&VesselRef> {
        self.cell(coord).and_then(|c| c.occupant.as_ref())
    }

    /// Claim `vessel.length()` cells from (`row`, `col`) along `axis`.
    /// Neither the grid nor the vessel change on failure.
    pub fn place_vessel(
        &mut self,
        vessel: &mut Vessel,
        row: usize,
        col: usize,
        axis: Axis,
    ) -> Result<(), PlacementError> {
        let cells = footprint(Coord::new(row, col), vessel.length(), axis)
            .ok_or(PlacementError::OutOfBounds)?;
        if cells.iter().any(|&c| self.cells[c.row][c.col].occupant.is_some()) {
            return Err(PlacementError::Overlaps);
        }
        vessel.set_positions(cells.clone())?;
        for (segment, c) in cells.into_iter().enumerate() {
            self.cells[c.row][c.col].occupant = Some(VesselRef {
                name: vessel.name(),
                length: vessel.length(),
                segment,
                sunk: false,
                axis,
            });
        }
        Ok(())
    }

    /// Mark the cell at (`row`, `col`) as hit. Returns `Ok(true)` exactly
    /// once per cell; `Ok(false)` for repeats or when no longer accepting.
    pub fn resolve_attack(&mut self, row: usize, col: usize) -> Result<bool, EngineError> {
        let coord = Coord::new(row, col);
        if !coord.in_bounds() {
            return Err(EngineError::OutOfBounds { row, col });
        }
        if !self.accepting {
            return Ok(false);
        }
        let cell = &mut self.cells[row][col];
        if cell.hit {
            return Ok(false);
        }
        cell.hit = true;
        Ok(true)
    }

    /// Flag the vessel projection at (`row`, `col`) as sunk.
    pub fn mark_sunk(&mut self, row: usize, col: usize) {
        if let Some(occupant) = self
            .cells
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .and_then(|c| c.occupant.as_mut())
        {
            occupant.sunk = true;
        }
    }

    /// Full grid including unhit vessel cells. Only for the owning side.
    pub fn owner_view(&self) -> Cells {
        self.cells
    }

    /// Grid with occupants hidden on every cell that has not been hit.
    pub fn public_view(&self) -> Cells {
        let mut masked = self.cells;
        for cell in masked.iter_mut().flatten() {
            if !cell.hit {
                cell.occupant = None;
            }
        }
        masked
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid {{ accepting: {} }}", self.accepting)?;
        for row in self.cells.iter() {
            for cell in row.iter() {
                let glyph = match (cell.hit, cell.occupant) {
                    (true, Some(v)) if v.sunk => '#',
                    (true, Some(_)) => 'X',
                    (true, None) => 'o',
                    (false, Some(_)) => '■',
                    (false, None) => '·',
                };
                write!(f, "{} ", glyph)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
