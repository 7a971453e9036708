#![cfg(feature = "std")]
//! A room hosts one match and serializes every operation on it.
//!
//! All match mutations happen under the room's mutex. Shot results and the
//! match start are pushed to each human side's outbox. When a human fires at
//! a scripted side, the scripted answer is scheduled as a task that sleeps
//! for the think time, then re-enters the room and fires if it is still the
//! scripted side's turn. That task is aborted when the match ends or the
//! room closes, and holds only a weak reference so it never outlives the
//! room.
//!
//! A room created by the registry reports its id on the retirement channel
//! once its match has ended or been aborted.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use log::{debug, error, info, warn};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::common::{Axis, EngineError, RoomId, SideId};
use crate::config::RoomSettings;
use crate::game::{Match, MatchStatus, MatchSummary, Placement, ShotResolution};
use crate::opponent::ScriptedOpponent;
use crate::protocol::Event;

/// Where events for one human side are delivered.
pub type Outbox = mpsc::UnboundedSender<Event>;

struct RoomState {
    game: Match,
    outboxes: HashMap<SideId, Outbox>,
    pending_move: Option<JoinHandle<()>>,
    closed: bool,
}

impl RoomState {
    fn push(&self, side: SideId, event: Event) {
        if let Some(outbox) = self.outboxes.get(&side) {
            if outbox.send(event).is_err() {
                debug!("side {} outbox closed, dropping event", side);
            }
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending_move.take() {
            handle.abort();
        }
    }

    fn ensure_open(&self) -> anyhow::Result<()> {
        if self.closed {
            Err(anyhow::anyhow!("Room {} is closed", self.game.room_id()))
        } else {
            Ok(())
        }
    }
}

pub struct Room {
    id: RoomId,
    settings: RoomSettings,
    retired: Option<mpsc::UnboundedSender<RoomId>>,
    state: Mutex<RoomState>,
}

impl Room {
    pub fn new(id: RoomId, settings: RoomSettings) -> Arc<Self> {
        Self::build(id, settings, None)
    }

    /// A room that sends its id on `retire` when its match is over.
    pub fn with_retirement(
        id: RoomId,
        settings: RoomSettings,
        retire: mpsc::UnboundedSender<RoomId>,
    ) -> Arc<Self> {
        Self::build(id, settings, Some(retire))
    }

    fn build(
        id: RoomId,
        settings: RoomSettings,
        retire: Option<mpsc::UnboundedSender<RoomId>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id,
            settings,
            retired: retire,
            state: Mutex::new(RoomState {
                game: Match::new(id),
                outboxes: HashMap::new(),
                pending_move: None,
                closed: false,
            }),
        })
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub async fn summary(&self) -> MatchSummary {
        self.state.lock().await.game.summary()
    }

    pub async fn is_open_for_human(&self) -> bool {
        let state = self.state.lock().await;
        !state.closed && state.game.is_open_for_human()
    }

    /// Whether a counter-move is currently scheduled.
    pub async fn has_pending_move(&self) -> bool {
        let state = self.state.lock().await;
        state
            .pending_move
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub async fn join_human(&self, side: SideId, name: &str, outbox: Outbox) -> anyhow::Result<()> {
        let mut state = self.state.lock().await;
        state.ensure_open()?;
        state.game.join_human(side, name)?;
        state.outboxes.insert(side, outbox);
        info!("room {}: {} ({}) joined", self.id, name, side);
        Ok(())
    }

    pub async fn join_scripted(
        &self,
        side: SideId,
        opponent: ScriptedOpponent,
    ) -> anyhow::Result<()> {
        let mut state = self.state.lock().await;
        state.ensure_open()?;
        state.game.join_scripted(side, "Computer", opponent)?;
        info!("room {}: scripted opponent {} joined", self.id, side);
        Ok(())
    }

    /// The `ROOM_DATA` reply for `side`.
    pub async fn room_data(&self, side: SideId) -> anyhow::Result<Event> {
        let state = self.state.lock().await;
        Ok(Event::RoomData {
            room_id: self.id,
            room: state.game.summary(),
            user: state.game.self_view(side)?,
        })
    }

    pub async fn place_vessel(
        &self,
        side: SideId,
        name: &str,
        length: usize,
        row: usize,
        col: usize,
        axis: Axis,
    ) -> anyhow::Result<Placement> {
        let mut state = self.state.lock().await;
        state.ensure_open()?;
        let placement = state.game.place_vessel(side, name, length, row, col, axis)?;
        debug!(
            "room {}: {} placed {} at ({}, {}) {:?}: {}",
            self.id, side, name, row, col, axis, placement.accepted
        );
        Ok(placement)
    }

    /// Mark `side` ready. Returns `true` if this started the match, in which
    /// case every human side has been sent `START_GAME`. Readiness after the
    /// match has left `waiting` is an error.
    pub async fn mark_ready(&self, side: SideId) -> anyhow::Result<bool> {
        let mut state = self.state.lock().await;
        state.ensure_open()?;
        if state.game.status() != MatchStatus::Waiting {
            return Err(anyhow::anyhow!(
                "Match in room {} is already {:?}",
                self.id,
                state.game.status()
            ));
        }
        match state.game.mark_ready(side)? {
            Some(notices) => {
                info!("room {}: match started, {} to move", self.id, side);
                for notice in notices {
                    let recipient = notice.recipient;
                    state.push(recipient, notice.into());
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Fire from `side`. Out-of-turn and post-game shots are ignored; an
    /// off-grid coordinate is an error.
    pub async fn fire(self: &Arc<Self>, side: SideId, row: usize, col: usize) -> anyhow::Result<()> {
        let mut state = self.state.lock().await;
        state.ensure_open()?;
        let resolution = match state.game.fire(side, row, col) {
            Ok(Some(res)) => res,
            Ok(None) => {
                debug!("room {}: ignored shot from {}", self.id, side);
                return Ok(());
            }
            Err(e @ EngineError::UnknownVessel(_)) => {
                self.abort_match(&mut state, e);
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };
        self.deliver(&mut state, resolution);
        Ok(())
    }

    /// Close the room because `leaving` quit. The pending counter-move is
    /// cancelled and the remaining human side is told.
    pub async fn close(&self, leaving: SideId) {
        let mut state = self.state.lock().await;
        if state.closed {
            return;
        }
        state.closed = true;
        state.cancel_pending();
        let others: Vec<SideId> = state
            .outboxes
            .keys()
            .copied()
            .filter(|&id| id != leaving)
            .collect();
        for other in others {
            state.push(other, Event::OpponentQuit);
        }
        state.outboxes.clear();
        info!("room {}: closed after {} left", self.id, leaving);
    }

    fn deliver(self: &Arc<Self>, state: &mut RoomState, res: ShotResolution) {
        debug!(
            "room {}: {} fired at ({}, {}) -> {}",
            self.id,
            res.attacker,
            res.coord.row,
            res.coord.col,
            res.outcome.report.code()
        );
        state.push(res.attacker, Event::fire_shot(&res));
        state.push(res.receiver, Event::received_shot(&res));

        if res.room.status == MatchStatus::Ended {
            info!("room {}: {} won", self.id, res.attacker);
            state.cancel_pending();
            self.retire();
        } else if res.counter_move_due {
            self.schedule_counter_move(state);
        }
    }

    fn schedule_counter_move(self: &Arc<Self>, state: &mut RoomState) {
        state.cancel_pending();
        let room: Weak<Room> = Arc::downgrade(self);
        let delay = self.settings.think_time;
        state.pending_move = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(room) = room.upgrade() {
                room.play_scripted_turn().await;
            }
        }));
    }

    async fn play_scripted_turn(self: &Arc<Self>) {
        let mut state = self.state.lock().await;
        // This task is the pending one; dropping its handle only detaches it.
        state.pending_move = None;
        if state.closed {
            return;
        }
        if !state.game.scripted_to_move() {
            debug!("room {}: turn already passed, counter-move dropped", self.id);
            return;
        }
        let Some((side, coord)) = state.game.next_scripted_move() else {
            warn!("room {}: scripted side has no move", self.id);
            return;
        };
        match state.game.fire(side, coord.row, coord.col) {
            Ok(Some(res)) => self.deliver(&mut state, res),
            Ok(None) => warn!("room {}: scripted shot from {} was ignored", self.id, side),
            Err(e) => self.abort_match(&mut state, e),
        }
    }

    fn abort_match(&self, state: &mut RoomState, err: EngineError) {
        error!("room {}: aborting match: {}", self.id, err);
        state.closed = true;
        state.cancel_pending();
        let sides: Vec<SideId> = state.outboxes.keys().copied().collect();
        for side in sides {
            state.push(side, Event::rejected(format!("match aborted: {}", err)));
        }
        state.outboxes.clear();
        self.retire();
    }

    fn retire(&self) {
        if let Some(retired) = &self.retired {
            if retired.send(self.id).is_err() {
                debug!("room {}: registry gone, nothing to retire", self.id);
            }
        }
    }
}

impl Drop for RoomState {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
