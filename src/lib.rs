#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod bitboard;
mod combatant;
mod common;
mod config;
mod game;
mod grid;
mod opponent;
mod vessel;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
pub mod registry;
#[cfg(feature = "std")]
pub mod room;
#[cfg(feature = "std")]
pub mod server;
#[cfg(feature = "std")]
pub mod transport;
pub mod prelude;

pub use bitboard::{BitBoard, BitBoardError, Coords};
pub use combatant::*;
pub use common::*;
pub use config::*;
pub use game::*;
pub use grid::*;
pub use opponent::*;
pub use vessel::*;
#[cfg(feature = "std")]
pub use logging::init_logging;
#[cfg(feature = "std")]
pub use protocol::*;
#[cfg(feature = "std")]
pub use registry::RoomRegistry;
#[cfg(feature = "std")]
pub use room::{Outbox, Room};
