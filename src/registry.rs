#![cfg(feature = "std")]
//! Room registry: matchmaking and routing of requests to rooms.
//!
//! The registry lock is always taken before any room lock. Find-or-create
//! runs entirely under the registry lock, so concurrent matchmaking requests
//! cannot create two rooms for one open slot.
//!
//! Rooms whose match has ended or been aborted report themselves on a
//! retirement channel. Every acquisition of the registry lock drains it and
//! discards those rooms, so their sides are free to matchmake again.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use anyhow::Context;
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{mpsc, Mutex, MutexGuard};

use crate::common::{Axis, RoomId, SideId};
use crate::config::RoomSettings;
use crate::game::Placement;
use crate::opponent::ScriptedOpponent;
use crate::protocol::{Event, OpponentKind};
use crate::room::{Outbox, Room};

struct Rooms {
    by_id: HashMap<RoomId, Arc<Room>>,
    /// Rooms with one human waiting for another, oldest first.
    open: VecDeque<RoomId>,
    membership: HashMap<SideId, RoomId>,
    retired: mpsc::UnboundedReceiver<RoomId>,
}

impl Rooms {
    /// Drop a finished room without notifying anyone.
    fn discard(&mut self, room_id: RoomId) {
        self.membership.retain(|_, id| *id != room_id);
        self.open.retain(|id| *id != room_id);
        if self.by_id.remove(&room_id).is_some() {
            debug!("room {} discarded", room_id);
        }
    }
}

pub struct RoomRegistry {
    settings: RoomSettings,
    rng: std::sync::Mutex<SmallRng>,
    retire: mpsc::UnboundedSender<RoomId>,
    rooms: Mutex<Rooms>,
}

impl RoomRegistry {
    /// A registry whose ids and scripted opponents derive from `seed`, or
    /// from OS entropy when `seed` is `None`.
    pub fn new(settings: RoomSettings, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => SmallRng::from_rng(&mut rand::rng()),
        };
        let (retire, retired) = mpsc::unbounded_channel();
        Self {
            settings,
            rng: std::sync::Mutex::new(rng),
            retire,
            rooms: Mutex::new(Rooms {
                by_id: HashMap::new(),
                open: VecDeque::new(),
                membership: HashMap::new(),
                retired,
            }),
        }
    }

    /// Take the registry lock, discarding rooms that have finished since.
    async fn lock_rooms(&self) -> MutexGuard<'_, Rooms> {
        let mut rooms = self.rooms.lock().await;
        while let Ok(room_id) = rooms.retired.try_recv() {
            rooms.discard(room_id);
        }
        rooms
    }

    fn new_room(&self) -> Arc<Room> {
        Room::with_retirement(RoomId(self.next_u64()), self.settings, self.retire.clone())
    }

    pub fn settings(&self) -> RoomSettings {
        self.settings
    }

    fn next_u64(&self) -> u64 {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.random()
    }

    /// Fresh identifier for a connecting side.
    pub fn new_side_id(&self) -> SideId {
        SideId(self.next_u64())
    }

    fn scripted_opponent(&self) -> ScriptedOpponent {
        ScriptedOpponent::new(SmallRng::seed_from_u64(self.next_u64()), self.settings.targeting)
    }

    /// Place `side` in a room. A scripted opponent always gets a new room; a
    /// human opponent joins the oldest room waiting for one, or opens a new
    /// room. A side already in a room leaves it first.
    pub async fn create_or_join(
        &self,
        side: SideId,
        name: &str,
        preferred: OpponentKind,
        outbox: Outbox,
    ) -> anyhow::Result<(RoomId, Event)> {
        let mut rooms = self.lock_rooms().await;
        if let Some(previous) = rooms.membership.get(&side).copied() {
            Self::remove_locked(&mut rooms, previous, side).await;
        }

        let room = match preferred {
            OpponentKind::Scripted => {
                let room = self.new_room();
                room.join_human(side, name, outbox).await?;
                room.join_scripted(SideId(self.next_u64()), self.scripted_opponent())
                    .await?;
                room
            }
            OpponentKind::Human => {
                let mut joined = None;
                while let Some(id) = rooms.open.pop_front() {
                    let Some(room) = rooms.by_id.get(&id).cloned() else {
                        continue;
                    };
                    if room.is_open_for_human().await {
                        room.join_human(side, name, outbox.clone()).await?;
                        joined = Some(room);
                        break;
                    }
                }
                match joined {
                    Some(room) => room,
                    None => {
                        let room = self.new_room();
                        room.join_human(side, name, outbox).await?;
                        rooms.open.push_back(room.id());
                        room
                    }
                }
            }
        };

        let id = room.id();
        rooms.membership.insert(side, id);
        rooms.by_id.insert(id, Arc::clone(&room));
        info!("{} ({}) is in room {} against {:?}", name, side, id, preferred);
        let data = room.room_data(side).await?;
        Ok((id, data))
    }

    async fn room_for(&self, room_id: RoomId, side: SideId) -> anyhow::Result<Arc<Room>> {
        let rooms = self.lock_rooms().await;
        match rooms.membership.get(&side) {
            Some(&id) if id == room_id => {}
            _ => return Err(anyhow::anyhow!("Side {} is not in room {}", side, room_id)),
        }
        rooms
            .by_id
            .get(&room_id)
            .cloned()
            .with_context(|| format!("Unknown room {}", room_id))
    }

    pub async fn place_vessel(
        &self,
        room_id: RoomId,
        side: SideId,
        name: &str,
        length: usize,
        row: usize,
        col: usize,
        axis: Axis,
    ) -> anyhow::Result<Placement> {
        self.room_for(room_id, side)
            .await?
            .place_vessel(side, name, length, row, col, axis)
            .await
    }

    /// Returns `true` if this call started the match.
    pub async fn mark_ready(&self, room_id: RoomId, side: SideId) -> anyhow::Result<bool> {
        self.room_for(room_id, side).await?.mark_ready(side).await
    }

    pub async fn fire(
        &self,
        room_id: RoomId,
        side: SideId,
        row: usize,
        col: usize,
    ) -> anyhow::Result<()> {
        self.room_for(room_id, side).await?.fire(side, row, col).await
    }

    /// Tear down `room_id` on behalf of `side`.
    pub async fn abandon(&self, room_id: RoomId, side: SideId) -> anyhow::Result<()> {
        let mut rooms = self.lock_rooms().await;
        match rooms.membership.get(&side) {
            Some(&id) if id == room_id => {
                Self::remove_locked(&mut rooms, room_id, side).await;
                Ok(())
            }
            _ => Err(anyhow::anyhow!("Side {} is not in room {}", side, room_id)),
        }
    }

    /// Tear down whatever room `side` was in after its connection ended.
    pub async fn disconnect(&self, side: SideId) {
        let mut rooms = self.lock_rooms().await;
        if let Some(room_id) = rooms.membership.get(&side).copied() {
            Self::remove_locked(&mut rooms, room_id, side).await;
        }
    }

    async fn remove_locked(rooms: &mut Rooms, room_id: RoomId, leaving: SideId) {
        rooms.membership.retain(|_, id| *id != room_id);
        rooms.open.retain(|id| *id != room_id);
        if let Some(room) = rooms.by_id.remove(&room_id) {
            room.close(leaving).await;
        }
    }

    /// Number of live rooms.
    pub async fn room_count(&self) -> usize {
        self.lock_rooms().await.by_id.len()
    }

    pub async fn room(&self, room_id: RoomId) -> Option<Arc<Room>> {
        self.lock_rooms().await.by_id.get(&room_id).cloned()
    }
}
