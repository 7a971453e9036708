//! Common types: coordinates, axes, shot outcomes, identifiers and errors.

use core::fmt;

use crate::config::BOARD_SIZE;

/// A zero-based grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Whether the coordinate lies on the grid.
    pub fn in_bounds(&self) -> bool {
        self.row < BOARD_SIZE && self.col < BOARD_SIZE
    }

    /// The neighbouring coordinate one step along `(dr, dc)`, if on the grid.
    pub fn step(&self, dr: isize, dc: isize) -> Option<Coord> {
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        let next = Coord::new(row, col);
        next.in_bounds().then_some(next)
    }
}

impl From<(usize, usize)> for Coord {
    fn from((row, col): (usize, usize)) -> Self {
        Coord::new(row, col)
    }
}

/// Direction a vessel extends from its origin cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// Along the row: increasing column.
    #[cfg_attr(feature = "std", serde(rename = "x"))]
    Row,
    /// Along the column: increasing row.
    #[cfg_attr(feature = "std", serde(rename = "y"))]
    Column,
}

impl Axis {
    /// Cell `offset` steps away from `origin` along this axis.
    pub fn offset(self, origin: Coord, offset: usize) -> Coord {
        match self {
            Axis::Row => Coord::new(origin.row, origin.col + offset),
            Axis::Column => Coord::new(origin.row + offset, origin.col),
        }
    }
}

/// Outcome code of a shot, as seen by both players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(serde::Serialize), serde(into = "u8"))]
pub enum ShotReport {
    /// Empty water, or a cell that was already resolved.
    Miss = 0,
    /// Hit a vessel that is still afloat.
    Hit = 1,
    /// Hit completed a vessel.
    Sunk = 2,
    /// Hit completed the side's last vessel.
    Eliminated = 3,
}

impl ShotReport {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether the shot struck a vessel.
    pub fn is_hit(self) -> bool {
        self != ShotReport::Miss
    }

    /// Whether the shot completed a vessel.
    pub fn is_sink(self) -> bool {
        matches!(self, ShotReport::Sunk | ShotReport::Eliminated)
    }
}

impl From<ShotReport> for u8 {
    fn from(report: ShotReport) -> u8 {
        report.code()
    }
}

/// Name of the vessel a shot sank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub struct ShotDetails {
    pub ship: &'static str,
}

/// Result of resolving one shot against a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub struct ShotOutcome {
    pub report: ShotReport,
    pub details: Option<ShotDetails>,
}

impl ShotOutcome {
    pub const MISS: ShotOutcome = ShotOutcome {
        report: ShotReport::Miss,
        details: None,
    };

    pub const HIT: ShotOutcome = ShotOutcome {
        report: ShotReport::Hit,
        details: None,
    };

    pub fn sunk(ship: &'static str) -> Self {
        ShotOutcome {
            report: ShotReport::Sunk,
            details: Some(ShotDetails { ship }),
        }
    }

    pub fn eliminated(ship: &'static str) -> Self {
        ShotOutcome {
            report: ShotReport::Eliminated,
            details: Some(ShotDetails { ship }),
        }
    }

    /// Vessel named by the outcome, if it sank one.
    pub fn ship(&self) -> Option<&'static str> {
        self.details.map(|d| d.ship)
    }
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:016x}", self.0)
            }
        }

        impl core::str::FromStr for $name {
            type Err = core::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                u64::from_str_radix(s, 16).map($name)
            }
        }

        #[cfg(feature = "std")]
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        #[cfg(feature = "std")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <std::string::String as serde::Deserialize>::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

opaque_id!(
    /// Opaque identifier of one match participant.
    SideId
);
opaque_id!(
    /// Opaque identifier of a room and the match it hosts.
    RoomId
);

/// Reasons a vessel placement is refused. These are validation failures:
/// the caller may retry with different input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    /// Some cell of the vessel would fall outside the grid.
    OutOfBounds,
    /// Some cell of the vessel is already claimed.
    Overlaps,
    /// The side already has its full fleet on the grid.
    FleetFull,
    /// A vessel with this name is already on the grid.
    AlreadyPlaced,
    /// The name/length pair is not part of the fleet.
    UnknownVessel,
    /// The number of cells supplied differs from the vessel length.
    LengthMismatch { expected: usize, got: usize },
    /// The vessel already has a position.
    PositionsFixed,
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::OutOfBounds => write!(f, "Vessel placement is out of bounds"),
            PlacementError::Overlaps => write!(f, "Vessel placement overlaps another vessel"),
            PlacementError::FleetFull => write!(f, "All vessels are already placed"),
            PlacementError::AlreadyPlaced => write!(f, "Vessel is already placed"),
            PlacementError::UnknownVessel => write!(f, "Vessel is not part of the fleet"),
            PlacementError::LengthMismatch { expected, got } => write!(
                f,
                "Invalid number of positions. Expected {}, got {}",
                expected, got
            ),
            PlacementError::PositionsFixed => write!(f, "Vessel positions are already set"),
        }
    }
}

/// Errors returned by engine operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// Attack coordinate outside the grid.
    OutOfBounds { row: usize, col: usize },
    /// A hit cell names a vessel missing from the roster. Fatal to the match.
    UnknownVessel(&'static str),
    /// No side with this id takes part in the match.
    UnknownSide(SideId),
    /// A side with this id already takes part in the match.
    DuplicateSide(SideId),
    /// The match already has two sides.
    MatchFull,
    /// Readiness requested before the full fleet is placed.
    FleetIncomplete,
    /// A scripted side could not place its fleet.
    Placement(PlacementError),
}

impl From<PlacementError> for EngineError {
    fn from(err: PlacementError) -> Self {
        EngineError::Placement(err)
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::OutOfBounds { row, col } => {
                write!(f, "Attack position out of bounds: ({}, {})", row, col)
            }
            EngineError::UnknownVessel(name) => write!(f, "Cannot find vessel {:?}", name),
            EngineError::UnknownSide(id) => write!(f, "Side {} is not part of this match", id),
            EngineError::DuplicateSide(id) => write!(f, "Side {} already joined this match", id),
            EngineError::MatchFull => write!(f, "Match already has two sides"),
            EngineError::FleetIncomplete => write!(f, "Place every vessel before starting"),
            EngineError::Placement(e) => write!(f, "Placement failed: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PlacementError {}

#[cfg(feature = "std")]
impl std::error::Error for EngineError {}
