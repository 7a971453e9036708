//! One side's grid, vessel roster and sunk history.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::common::{Axis, Coord, EngineError, PlacementError, ShotOutcome};
use crate::config::{fleet_def, FLEET, NUM_VESSELS};
use crate::grid::{Cells, Grid};
use crate::vessel::{Vessel, VesselDef};

/// Entry in the roster or sunk log as shown to players.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub struct VesselSummary {
    pub name: &'static str,
    pub length: usize,
}

impl From<VesselDef> for VesselSummary {
    fn from(def: VesselDef) -> Self {
        VesselSummary {
            name: def.name(),
            length: def.length(),
        }
    }
}

/// What the owning side sees: every vessel and the unmasked grid.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub struct SelfView {
    pub ships: Vec<VesselSummary>,
    pub board: Cells,
}

/// What the other side sees: sunk vessels only and the masked grid.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub struct OpponentView {
    pub ships: Vec<VesselSummary>,
    pub board: Cells,
}

/// A side's full game state.
#[derive(Debug, Clone, Default)]
pub struct Combatant {
    grid: Grid,
    vessels: Vec<Vessel>,
    sunk_log: Vec<VesselSummary>,
}

impl Combatant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn vessels(&self) -> &[Vessel] {
        &self.vessels
    }

    /// Vessels in the order they were sunk.
    pub fn sunk_log(&self) -> &[VesselSummary] {
        &self.sunk_log
    }

    /// Whether every fleet vessel has been placed.
    pub fn fleet_complete(&self) -> bool {
        self.vessels.len() == NUM_VESSELS
    }

    /// Whether the side has placed vessels and all of them are sunk.
    pub fn is_eliminated(&self) -> bool {
        !self.vessels.is_empty() && self.vessels.iter().all(Vessel::is_sunk)
    }

    /// Place a fleet vessel. Refused once five vessels are placed, for a
    /// name already on the grid, and for anything the grid rejects.
    pub fn place_vessel(
        &mut self,
        def: VesselDef,
        row: usize,
        col: usize,
        axis: Axis,
    ) -> Result<(), PlacementError> {
        if self.vessels.len() >= NUM_VESSELS {
            return Err(PlacementError::FleetFull);
        }
        if !FLEET.contains(&def) {
            return Err(PlacementError::UnknownVessel);
        }
        if self.vessels.iter().any(|v| v.name() == def.name()) {
            return Err(PlacementError::AlreadyPlaced);
        }
        let mut vessel = Vessel::new(def);
        self.grid.place_vessel(&mut vessel, row, col, axis)?;
        self.vessels.push(vessel);
        Ok(())
    }

    /// Place a vessel by its wire name and length.
    pub fn place_named(
        &mut self,
        name: &str,
        length: usize,
        row: usize,
        col: usize,
        axis: Axis,
    ) -> Result<(), PlacementError> {
        let def = fleet_def(name, length).ok_or(PlacementError::UnknownVessel)?;
        self.place_vessel(def, row, col, axis)
    }

    /// Resolve an incoming shot at (`row`, `col`).
    pub fn receive_shot(&mut self, row: usize, col: usize) -> Result<ShotOutcome, EngineError> {
        if !self.grid.resolve_attack(row, col)? {
            return Ok(ShotOutcome::MISS);
        }
        let coord = Coord::new(row, col);
        let name = match self.grid.occupant(coord) {
            Some(occupant) => occupant.name,
            None => return Ok(ShotOutcome::MISS),
        };
        let vessel = self
            .vessels
            .iter_mut()
            .find(|v| v.name() == name)
            .ok_or(EngineError::UnknownVessel(name))?;
        vessel.register_hit(coord);
        if !vessel.is_sunk() {
            return Ok(ShotOutcome::HIT);
        }

        for c in vessel.cells() {
            self.grid.mark_sunk(c.row, c.col);
        }
        self.sunk_log.push(vessel.def().into());

        if self.vessels.iter().all(Vessel::is_sunk) {
            self.grid.close();
            Ok(ShotOutcome::eliminated(name))
        } else {
            Ok(ShotOutcome::sunk(name))
        }
    }

    pub fn self_view(&self) -> SelfView {
        SelfView {
            ships: self.vessels.iter().map(|v| v.def().into()).collect(),
            board: self.grid.owner_view(),
        }
    }

    pub fn opponent_view(&self) -> OpponentView {
        OpponentView {
            ships: self.sunk_log.clone(),
            board: self.grid.public_view(),
        }
    }

    /// Remove every vessel and hit.
    pub fn reset(&mut self) {
        self.grid.reset();
        self.vessels.clear();
        self.sunk_log.clear();
    }
}
