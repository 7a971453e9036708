//! Match state machine: two sides, readiness, strict turn alternation and
//! shot arbitration.

#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};

use crate::combatant::{Combatant, OpponentView, SelfView};
use crate::common::{Axis, Coord, EngineError, RoomId, ShotOutcome, ShotReport, SideId};
use crate::opponent::ScriptedOpponent;

/// Lifecycle of a match. `Ended` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize), serde(rename_all = "lowercase"))]
pub enum MatchStatus {
    Waiting,
    Started,
    Ended,
}

/// Who drives a side's moves.
#[derive(Debug, Clone)]
pub enum SideKind {
    Human,
    Scripted(ScriptedOpponent),
}

/// One participant: identity, readiness and game state.
#[derive(Debug, Clone)]
pub struct Side {
    id: SideId,
    name: String,
    ready: bool,
    combatant: Combatant,
    kind: SideKind,
}

impl Side {
    pub fn id(&self) -> SideId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_scripted(&self) -> bool {
        matches!(self.kind, SideKind::Scripted(_))
    }

    pub fn combatant(&self) -> &Combatant {
        &self.combatant
    }
}

/// Room-level facts shared with both players.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub struct MatchSummary {
    pub room_id: RoomId,
    pub status: MatchStatus,
    pub turn: Option<SideId>,
    pub winner: Option<SideId>,
    pub is_full: bool,
}

/// Public identity of the other side.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub struct Profile {
    pub side_id: SideId,
    pub name: String,
}

/// Answer to a placement request.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub struct Placement {
    pub accepted: bool,
    /// The caller's updated view, present only when accepted.
    pub user: Option<SelfView>,
}

/// What one side is told when the match starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartNotice {
    pub recipient: SideId,
    pub room: MatchSummary,
    pub user: SelfView,
    pub opponent: OpponentView,
    pub opponent_profile: Profile,
}

/// Everything that changed because of one resolved shot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShotResolution {
    pub attacker: SideId,
    pub receiver: SideId,
    pub coord: Coord,
    pub outcome: ShotOutcome,
    pub room: MatchSummary,
    /// Receiver's full view, for the receiver.
    pub receiver_view: SelfView,
    /// Receiver's masked view, for the attacker.
    pub receiver_public: OpponentView,
    /// The receiver is scripted and should answer after its think time.
    pub counter_move_due: bool,
}

/// A match between two sides.
#[derive(Debug, Clone)]
pub struct Match {
    room_id: RoomId,
    sides: Vec<Side>,
    turn: Option<SideId>,
    status: MatchStatus,
    winner: Option<SideId>,
}

impl Match {
    pub fn new(room_id: RoomId) -> Self {
        Self {
            room_id,
            sides: Vec::with_capacity(2),
            turn: None,
            status: MatchStatus::Waiting,
            winner: None,
        }
    }

    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn turn(&self) -> Option<SideId> {
        self.turn
    }

    pub fn winner(&self) -> Option<SideId> {
        self.winner
    }

    pub fn sides(&self) -> &[Side] {
        &self.sides
    }

    pub fn is_full(&self) -> bool {
        self.sides.len() == 2
    }

    /// Waiting with a single human side and room for another.
    pub fn is_open_for_human(&self) -> bool {
        self.status == MatchStatus::Waiting
            && self.sides.len() == 1
            && !self.sides[0].is_scripted()
    }

    /// Started, and the side to move is scripted.
    pub fn scripted_to_move(&self) -> bool {
        self.status == MatchStatus::Started
            && self
                .turn
                .and_then(|id| self.side(id).ok())
                .is_some_and(Side::is_scripted)
    }

    pub fn side(&self, id: SideId) -> Result<&Side, EngineError> {
        self.sides
            .iter()
            .find(|s| s.id == id)
            .ok_or(EngineError::UnknownSide(id))
    }

    fn index_of(&self, id: SideId) -> Result<usize, EngineError> {
        self.sides
            .iter()
            .position(|s| s.id == id)
            .ok_or(EngineError::UnknownSide(id))
    }

    /// The other side, if it has joined.
    pub fn opponent_of(&self, id: SideId) -> Result<Option<&Side>, EngineError> {
        let idx = self.index_of(id)?;
        Ok(self.sides.get(1 - idx))
    }

    pub fn summary(&self) -> MatchSummary {
        MatchSummary {
            room_id: self.room_id,
            status: self.status,
            turn: self.turn,
            winner: self.winner,
            is_full: self.is_full(),
        }
    }

    fn add_side(&mut self, side: Side) -> Result<(), EngineError> {
        if self.is_full() {
            return Err(EngineError::MatchFull);
        }
        if self.sides.iter().any(|s| s.id == side.id) {
            return Err(EngineError::DuplicateSide(side.id));
        }
        self.sides.push(side);
        Ok(())
    }

    /// Add a human side with an empty grid.
    pub fn join_human(&mut self, id: SideId, name: impl Into<String>) -> Result<(), EngineError> {
        self.add_side(Side {
            id,
            name: name.into(),
            ready: false,
            combatant: Combatant::new(),
            kind: SideKind::Human,
        })
    }

    /// Add a scripted side. Its fleet is placed immediately and it counts as
    /// ready from the start.
    pub fn join_scripted(
        &mut self,
        id: SideId,
        name: impl Into<String>,
        mut opponent: ScriptedOpponent,
    ) -> Result<(), EngineError> {
        if self.is_full() {
            return Err(EngineError::MatchFull);
        }
        let mut combatant = Combatant::new();
        opponent.place_fleet(&mut combatant)?;
        self.add_side(Side {
            id,
            name: name.into(),
            ready: true,
            combatant,
            kind: SideKind::Scripted(opponent),
        })
    }

    /// Place one vessel for `side`. Validation failures come back as
    /// `accepted: false`; only an unknown side is an error.
    pub fn place_vessel(
        &mut self,
        side: SideId,
        name: &str,
        length: usize,
        row: usize,
        col: usize,
        axis: Axis,
    ) -> Result<Placement, EngineError> {
        let idx = self.index_of(side)?;
        if self.status != MatchStatus::Waiting {
            return Ok(Placement {
                accepted: false,
                user: None,
            });
        }
        let combatant = &mut self.sides[idx].combatant;
        Ok(match combatant.place_named(name, length, row, col, axis) {
            Ok(()) => Placement {
                accepted: true,
                user: Some(combatant.self_view()),
            },
            Err(_) => Placement {
                accepted: false,
                user: None,
            },
        })
    }

    /// Mark `side` ready. Once both sides are present and ready the match
    /// starts with the caller to move, and one notice per side is returned.
    pub fn mark_ready(&mut self, side: SideId) -> Result<Option<Vec<StartNotice>>, EngineError> {
        let idx = self.index_of(side)?;
        if self.status != MatchStatus::Waiting {
            return Ok(None);
        }
        if !self.sides[idx].combatant.fleet_complete() {
            return Err(EngineError::FleetIncomplete);
        }
        self.sides[idx].ready = true;
        if !self.is_full() || !self.sides.iter().all(|s| s.ready) {
            return Ok(None);
        }

        self.status = MatchStatus::Started;
        self.turn = Some(side);
        let room = self.summary();
        let notices = (0..2)
            .map(|i| {
                let me = &self.sides[i];
                let them = &self.sides[1 - i];
                StartNotice {
                    recipient: me.id,
                    room: room.clone(),
                    user: me.combatant.self_view(),
                    opponent: them.combatant.opponent_view(),
                    opponent_profile: Profile {
                        side_id: them.id,
                        name: them.name.clone(),
                    },
                }
            })
            .collect();
        Ok(Some(notices))
    }

    /// Fire from `side` at (`row`, `col`) on the other side's grid.
    ///
    /// Returns `Ok(None)` without touching anything when the match is not
    /// started or it is not `side`'s turn. An off-grid coordinate is an
    /// error and also leaves the match unchanged. Otherwise the turn passes
    /// to the receiver whatever the outcome.
    pub fn fire(
        &mut self,
        side: SideId,
        row: usize,
        col: usize,
    ) -> Result<Option<ShotResolution>, EngineError> {
        if self.status != MatchStatus::Started || self.turn != Some(side) {
            return Ok(None);
        }
        let coord = Coord::new(row, col);
        if !coord.in_bounds() {
            return Err(EngineError::OutOfBounds { row, col });
        }
        let attacker_idx = self.index_of(side)?;
        let receiver_idx = 1 - attacker_idx;

        let outcome = self.sides[receiver_idx].combatant.receive_shot(row, col)?;
        let receiver = self.sides[receiver_idx].id;
        self.turn = Some(receiver);
        if outcome.report == ShotReport::Eliminated {
            self.status = MatchStatus::Ended;
            self.winner = Some(side);
        }
        if let SideKind::Scripted(opponent) = &mut self.sides[attacker_idx].kind {
            opponent.observe(coord, outcome);
        }

        let receiver_side = &self.sides[receiver_idx];
        Ok(Some(ShotResolution {
            attacker: side,
            receiver,
            coord,
            outcome,
            room: self.summary(),
            receiver_view: receiver_side.combatant.self_view(),
            receiver_public: receiver_side.combatant.opponent_view(),
            counter_move_due: receiver_side.is_scripted() && self.status == MatchStatus::Started,
        }))
    }

    /// The scripted side whose turn it is and its next target against the
    /// other side's full grid.
    pub fn next_scripted_move(&mut self) -> Option<(SideId, Coord)> {
        if self.status != MatchStatus::Started {
            return None;
        }
        let idx = self.index_of(self.turn?).ok()?;
        let (left, right) = self.sides.split_at_mut(1);
        let (me, them) = if idx == 0 {
            (&mut left[0], &right[0])
        } else {
            (&mut right[0], &left[0])
        };
        match &mut me.kind {
            SideKind::Scripted(opponent) => {
                let coord = opponent.next_move(them.combatant.grid())?;
                Some((me.id, coord))
            }
            SideKind::Human => None,
        }
    }

    /// Own full view for `side`.
    pub fn self_view(&self, side: SideId) -> Result<SelfView, EngineError> {
        Ok(self.side(side)?.combatant.self_view())
    }

    /// Masked view of `side`'s grid, as its opponent sees it.
    pub fn opponent_view(&self, side: SideId) -> Result<OpponentView, EngineError> {
        Ok(self.side(side)?.combatant.opponent_view())
    }
}
