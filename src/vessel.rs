//! Vessel definitions and hit tracking.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
use core::fmt;

use crate::common::{Axis, Coord, PlacementError};
use crate::config::CellSet;

/// Kind of vessel: name and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub struct VesselDef {
    name: &'static str,
    length: usize,
}

impl VesselDef {
    pub const fn new(name: &'static str, length: usize) -> Self {
        Self { name, length }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

/// Read-only projection of a vessel stored in each grid cell it occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub struct VesselRef {
    pub name: &'static str,
    pub length: usize,
    /// Index of this cell along the vessel, starting at the origin.
    pub segment: usize,
    pub sunk: bool,
    pub axis: Axis,
}

/// A vessel and the cells it occupies once placed.
#[derive(Clone, PartialEq, Eq)]
pub struct Vessel {
    def: VesselDef,
    cells: Vec<Coord>,
    hits: CellSet,
}

impl Vessel {
    /// A vessel that has not been placed yet.
    pub fn new(def: VesselDef) -> Self {
        Self {
            def,
            cells: Vec::new(),
            hits: CellSet::new(),
        }
    }

    pub fn def(&self) -> VesselDef {
        self.def
    }

    pub fn name(&self) -> &'static str {
        self.def.name()
    }

    pub fn length(&self) -> usize {
        self.def.length()
    }

    /// Occupied cells in placement order; empty before placement.
    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    pub fn is_placed(&self) -> bool {
        !self.cells.is_empty()
    }

    /// Fix the vessel's cells. Only succeeds once, and only with exactly
    /// `length` cells.
    pub fn set_positions(&mut self, cells: Vec<Coord>) -> Result<(), PlacementError> {
        if self.is_placed() {
            return Err(PlacementError::PositionsFixed);
        }
        if cells.len() != self.length() {
            return Err(PlacementError::LengthMismatch {
                expected: self.length(),
                got: cells.len(),
            });
        }
        self.cells = cells;
        Ok(())
    }

    /// Register a hit at `coord`. Returns `true` if the vessel occupies it.
    pub fn register_hit(&mut self, coord: Coord) -> bool {
        if !self.cells.contains(&coord) {
            return false;
        }
        // Occupied cells are on the grid, so the insert cannot fail.
        let _ = self.hits.insert(coord);
        true
    }

    /// Number of distinct segments hit so far.
    pub fn hit_count(&self) -> usize {
        self.hits.len()
    }

    /// A placed vessel is sunk once every segment is hit.
    pub fn is_sunk(&self) -> bool {
        self.is_placed() && self.hits.len() == self.length()
    }
}

impl fmt::Debug for Vessel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Vessel {{ name: {:?}, cells: {:?}, hits: {}, sunk: {} }}",
            self.name(),
            self.cells,
            self.hits.len(),
            self.is_sunk(),
        )
    }
}

/// Cells a vessel of `length` would cover from `origin` along `axis`, or
/// `None` if any of them falls off the grid.
pub fn footprint(origin: Coord, length: usize, axis: Axis) -> Option<Vec<Coord>> {
    if !origin.in_bounds() {
        return None;
    }
    let cells: Vec<Coord> = (0..length).map(|i| axis.offset(origin, i)).collect();
    cells.iter().all(Coord::in_bounds).then_some(cells)
}
