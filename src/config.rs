use crate::bitboard::BitBoard;
use crate::vessel::VesselDef;

pub const BOARD_SIZE: usize = 10;
pub const NUM_VESSELS: usize = 5;
pub const FLEET: [VesselDef; NUM_VESSELS] = [
    VesselDef::new("carrier", 5),
    VesselDef::new("battleship", 4),
    VesselDef::new("destroyer", 3),
    VesselDef::new("submarine", 3),
    VesselDef::new("patrol boat", 2),
];

/// Total number of vessel segments in the standard fleet.
pub const TOTAL_VESSEL_CELLS: usize = 5 + 4 + 3 + 3 + 2;

/// Pause before the scripted opponent answers a shot.
pub const DEFAULT_THINK_TIME_MS: u64 = 4000;

/// Coordinate set covering the whole grid.
pub type CellSet = BitBoard<u128, BOARD_SIZE>;

/// Look up the fleet definition for a vessel name (case-insensitive) and
/// length. Returns `None` when the pair is not part of the fixed fleet.
pub fn fleet_def(name: &str, length: usize) -> Option<VesselDef> {
    FLEET
        .iter()
        .find(|def| def.name().eq_ignore_ascii_case(name) && def.length() == length)
        .copied()
}

#[cfg(feature = "std")]
pub use settings::*;

#[cfg(feature = "std")]
mod settings {
    use std::net::SocketAddr;
    use std::time::Duration;

    use crate::opponent::TargetingMode;

    /// Default timeout for writing one frame.
    pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(30);

    /// Largest accepted frame body (1 MB).
    pub const MAX_FRAME_SIZE: u32 = 1_000_000;

    /// Per-room behaviour chosen at server start.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RoomSettings {
        /// Delay before a scripted counter-move.
        pub think_time: Duration,
        /// How scripted opponents pick their targets.
        pub targeting: TargetingMode,
    }

    impl Default for RoomSettings {
        fn default() -> Self {
            Self {
                think_time: Duration::from_millis(super::DEFAULT_THINK_TIME_MS),
                targeting: TargetingMode::Omniscient,
            }
        }
    }

    /// Everything `serve` needs to run.
    #[derive(Debug, Clone)]
    pub struct ServerConfig {
        pub bind: SocketAddr,
        pub room: RoomSettings,
        /// Fixed seed for ids and scripted opponents; random when absent.
        pub seed: Option<u64>,
    }
}
