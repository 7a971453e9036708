//! Commonly used types for ease of import.

pub use crate::{
    Axis, Combatant, Coord, EngineError, Grid, Match, MatchStatus, ScriptedOpponent, ShotOutcome,
    ShotReport, SideId, TargetingMode, BOARD_SIZE, FLEET,
};

#[cfg(feature = "std")]
pub use crate::{
    protocol::{Event, OpponentKind, Request},
    transport::{in_memory, Inbound, Incoming, Outbound},
    RoomRegistry, RoomSettings,
};
