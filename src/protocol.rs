#![cfg(feature = "std")]
//! Wire messages. Every message is a `{ "type": ..., "data": { ... } }`
//! envelope encoded as JSON.

use serde::{Deserialize, Serialize};

use crate::combatant::{OpponentView, SelfView};
use crate::common::{Axis, RoomId, ShotOutcome, SideId};
use crate::game::{MatchSummary, Profile, ShotResolution, StartNotice};

/// Opponent requested at matchmaking time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpponentKind {
    Human,
    #[serde(alias = "computer")]
    Scripted,
}

/// Vessel named in a placement request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipSpec {
    pub name: String,
    pub length: usize,
}

/// Messages a client sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    /// Find or create a room.
    UserPref { name: String, opponent: OpponentKind },
    /// Place one vessel.
    SetupShips {
        room_id: RoomId,
        ship: ShipSpec,
        row: usize,
        col: usize,
        axis: Axis,
    },
    /// Declare readiness.
    StartGame { room_id: RoomId },
    /// Fire at the opponent's grid.
    FireShot { room_id: RoomId, row: usize, col: usize },
    /// Leave the room and tear it down.
    Reset { room_id: RoomId },
}

/// Messages the server pushes or replies with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    /// First message on every connection.
    Connected { side_id: SideId },
    /// The caller's room and own state after matchmaking.
    RoomData {
        room_id: RoomId,
        room: MatchSummary,
        user: SelfView,
    },
    /// Answer to `SETUP_SHIPS`.
    ValidPlacement {
        accepted: bool,
        user: Option<SelfView>,
    },
    /// Readiness recorded, the other side is not ready yet.
    ConnectedAndWaiting { room_id: RoomId },
    /// The match has started.
    StartGame {
        room: MatchSummary,
        user: SelfView,
        opponent: OpponentView,
        opponent_profile: Profile,
    },
    /// Result of the recipient's own shot.
    FireShot {
        hit_data: ShotOutcome,
        room: MatchSummary,
        opponent: OpponentView,
    },
    /// Result of a shot against the recipient.
    ReceivedShot {
        hit_data: ShotOutcome,
        room: MatchSummary,
        user: SelfView,
    },
    /// The other side left; the room is gone.
    OpponentQuit,
    /// The request could not be carried out.
    Rejected { reason: String },
}

impl Event {
    /// Event tag as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Connected { .. } => "CONNECTED",
            Event::RoomData { .. } => "ROOM_DATA",
            Event::ValidPlacement { .. } => "VALID_PLACEMENT",
            Event::ConnectedAndWaiting { .. } => "CONNECTED_AND_WAITING",
            Event::StartGame { .. } => "START_GAME",
            Event::FireShot { .. } => "FIRE_SHOT",
            Event::ReceivedShot { .. } => "RECEIVED_SHOT",
            Event::OpponentQuit => "OPPONENT_QUIT",
            Event::Rejected { .. } => "REJECTED",
        }
    }

    /// Shot result for the attacking side.
    pub fn fire_shot(res: &ShotResolution) -> Self {
        Event::FireShot {
            hit_data: res.outcome,
            room: res.room.clone(),
            opponent: res.receiver_public.clone(),
        }
    }

    /// Shot result for the receiving side.
    pub fn received_shot(res: &ShotResolution) -> Self {
        Event::ReceivedShot {
            hit_data: res.outcome,
            room: res.room.clone(),
            user: res.receiver_view.clone(),
        }
    }

    pub fn rejected(err: impl std::fmt::Display) -> Self {
        Event::Rejected {
            reason: err.to_string(),
        }
    }
}

impl From<StartNotice> for Event {
    fn from(notice: StartNotice) -> Self {
        Event::StartGame {
            room: notice.room,
            user: notice.user,
            opponent: notice.opponent,
            opponent_profile: notice.opponent_profile,
        }
    }
}

/// Encode an event as its JSON envelope.
pub fn encode_event(event: &Event) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec(event).map_err(|e| anyhow::anyhow!("Serialization error: {}", e))
}

/// Decode a request from its JSON envelope.
pub fn decode_request(bytes: &[u8]) -> anyhow::Result<Request> {
    serde_json::from_slice(bytes).map_err(|e| anyhow::anyhow!("Deserialization error: {}", e))
}
