//! Scripted opponent: random fleet placement and hunt-and-destroy targeting.
//!
//! The opponent keeps two pieces of state for its whole lifetime: the set of
//! coordinates it has already fired at and a FIFO queue of follow-up
//! coordinates. When the queue is empty it hunts a random untargeted cell.
//!
//! In [`TargetingMode::Omniscient`] (the default) the opponent reads vessel
//! occupancy straight off the unmasked grid it is handed: a hunt pick that
//! lands on a vessel expands into the rest of that vessel plus one probe cell
//! past each end, so located vessels are always finished. In
//! [`TargetingMode::Fair`] it never looks at the grid and learns only from
//! the outcomes fed back through [`ScriptedOpponent::observe`].

#[cfg(not(feature = "std"))]
use alloc::{collections::VecDeque, vec::Vec};
#[cfg(feature = "std")]
use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::combatant::Combatant;
use crate::common::{Axis, Coord, PlacementError, ShotOutcome};
use crate::config::{CellSet, BOARD_SIZE, FLEET};
use crate::grid::Grid;

/// Orthogonal steps: north, south, west, east.
const DIRECTIONS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// How the scripted opponent decides whether a hunt pick struck a vessel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetingMode {
    /// Read occupancy from the target's full grid.
    #[default]
    Omniscient,
    /// Only use the outcomes of its own shots.
    Fair,
}

/// Fill `combatant` with the whole fleet at random positions.
///
/// Each vessel is retried with a fresh uniform origin and axis until it fits.
pub fn place_fleet<R: Rng + ?Sized>(
    rng: &mut R,
    combatant: &mut Combatant,
) -> Result<(), PlacementError> {
    for def in FLEET.iter() {
        loop {
            let axis = if rng.random() { Axis::Row } else { Axis::Column };
            let row = rng.random_range(0..BOARD_SIZE);
            let col = rng.random_range(0..BOARD_SIZE);
            match combatant.place_vessel(*def, row, col, axis) {
                Ok(()) => break,
                Err(PlacementError::OutOfBounds | PlacementError::Overlaps) => continue,
                Err(e) => return Err(e),
            }
        }
    }
    Ok(())
}

/// Targeting state of a scripted side.
#[derive(Debug, Clone)]
pub struct ScriptedOpponent {
    rng: SmallRng,
    mode: TargetingMode,
    targeted: CellSet,
    follow_up: VecDeque<Coord>,
}

impl ScriptedOpponent {
    pub fn new(rng: SmallRng, mode: TargetingMode) -> Self {
        Self {
            rng,
            mode,
            targeted: CellSet::new(),
            follow_up: VecDeque::new(),
        }
    }

    pub fn mode(&self) -> TargetingMode {
        self.mode
    }

    /// Coordinates already fired at.
    pub fn targeted(&self) -> CellSet {
        self.targeted
    }

    /// Pending follow-up coordinates, front first.
    pub fn follow_up(&self) -> impl Iterator<Item = &Coord> {
        self.follow_up.iter()
    }

    /// Place the scripted side's fleet using the opponent's own RNG.
    pub fn place_fleet(&mut self, combatant: &mut Combatant) -> Result<(), PlacementError> {
        place_fleet(&mut self.rng, combatant)
    }

    /// Pick the next coordinate to fire at on `target`. Returns `None` only
    /// when every cell has been targeted and nothing is queued.
    pub fn next_move(&mut self, target: &Grid) -> Option<Coord> {
        match self.mode {
            TargetingMode::Omniscient => self.next_omniscient(target),
            TargetingMode::Fair => self.next_fair(),
        }
    }

    /// Feed back the outcome of a shot this opponent made.
    pub fn observe(&mut self, coord: Coord, outcome: ShotOutcome) {
        if self.mode != TargetingMode::Fair {
            return;
        }
        if outcome.report.is_sink() {
            self.follow_up.clear();
        } else if outcome.report.is_hit() {
            let mut dirs = DIRECTIONS;
            dirs.shuffle(&mut self.rng);
            for (dr, dc) in dirs {
                if let Some(next) = coord.step(dr, dc) {
                    if !self.targeted.contains(next) && !self.follow_up.contains(&next) {
                        self.follow_up.push_back(next);
                    }
                }
            }
        }
    }

    fn next_omniscient(&mut self, target: &Grid) -> Option<Coord> {
        if let Some(next) = self.pop_follow_up() {
            return Some(next);
        }
        let pick = self.random_untargeted()?;
        let ship = match target.occupant(pick) {
            Some(occupant) => occupant.name,
            None => {
                self.mark(pick);
                return Some(pick);
            }
        };

        self.follow_up.push_back(pick);
        let mut dirs = DIRECTIONS;
        dirs.shuffle(&mut self.rng);
        for (dr, dc) in dirs {
            let mut cursor = pick;
            while let Some(next) = cursor.step(dr, dc) {
                match target.occupant(next) {
                    Some(occupant) if occupant.name == ship => {
                        self.follow_up.push_back(next);
                        cursor = next;
                    }
                    Some(_) => break,
                    None => {
                        self.follow_up.push_back(next);
                        break;
                    }
                }
            }
        }
        self.pop_follow_up()
    }

    fn next_fair(&mut self) -> Option<Coord> {
        while let Some(next) = self.follow_up.pop_front() {
            if !self.targeted.contains(next) {
                self.mark(next);
                return Some(next);
            }
        }
        let pick = self.random_untargeted()?;
        self.mark(pick);
        Some(pick)
    }

    fn pop_follow_up(&mut self) -> Option<Coord> {
        let next = self.follow_up.pop_front()?;
        self.mark(next);
        Some(next)
    }

    fn random_untargeted(&mut self) -> Option<Coord> {
        let open: Vec<Coord> = (!self.targeted).iter().collect();
        if open.is_empty() {
            return None;
        }
        Some(open[self.rng.random_range(0..open.len())])
    }

    fn mark(&mut self, coord: Coord) {
        // Targets come from the grid or its neighbours, always in bounds.
        let _ = self.targeted.insert(coord);
    }
}
