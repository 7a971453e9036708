use std::collections::HashMap;
use std::sync::Arc;

use broadside::{
    Axis, Event, MatchStatus, OpponentKind, RoomId, RoomRegistry, RoomSettings, ShotReport,
    SideId, FLEET,
};
use tokio::sync::mpsc;

fn registry() -> RoomRegistry {
    RoomRegistry::new(RoomSettings::default(), Some(12345))
}

#[tokio::test]
async fn test_humans_pair_into_one_room() {
    let reg = registry();
    let (a, b) = (reg.new_side_id(), reg.new_side_id());
    assert_ne!(a, b);
    let (tx_a, _rx_a) = mpsc::unbounded_channel();
    let (tx_b, _rx_b) = mpsc::unbounded_channel();

    let (room_a, data) = reg
        .create_or_join(a, "alice", OpponentKind::Human, tx_a)
        .await
        .unwrap();
    match data {
        Event::RoomData { room, user, .. } => {
            assert!(!room.is_full);
            assert_eq!(room.status, MatchStatus::Waiting);
            assert!(user.ships.is_empty());
        }
        other => panic!("expected ROOM_DATA, got {}", other.kind()),
    }

    let (room_b, data) = reg
        .create_or_join(b, "bob", OpponentKind::Human, tx_b)
        .await
        .unwrap();
    assert_eq!(room_a, room_b);
    match data {
        Event::RoomData { room, .. } => assert!(room.is_full),
        other => panic!("expected ROOM_DATA, got {}", other.kind()),
    }
    assert_eq!(reg.room_count().await, 1);

    // a third human opens a fresh room
    let c = reg.new_side_id();
    let (tx_c, _rx_c) = mpsc::unbounded_channel();
    let (room_c, _) = reg
        .create_or_join(c, "carol", OpponentKind::Human, tx_c)
        .await
        .unwrap();
    assert_ne!(room_c, room_a);
    assert_eq!(reg.room_count().await, 2);
}

#[tokio::test]
async fn test_scripted_opponent_gets_own_room() {
    let reg = registry();
    let a = reg.new_side_id();
    let (tx, _rx) = mpsc::unbounded_channel();
    let (room_id, data) = reg
        .create_or_join(a, "alice", OpponentKind::Scripted, tx)
        .await
        .unwrap();
    match data {
        Event::RoomData { room, .. } => {
            assert!(room.is_full);
            assert_eq!(room.status, MatchStatus::Waiting);
        }
        other => panic!("expected ROOM_DATA, got {}", other.kind()),
    }
    let room = reg.room(room_id).await.unwrap();
    assert!(!room.is_open_for_human().await);

    // a human looking for a human does not land in the scripted room
    let b = reg.new_side_id();
    let (tx_b, _rx_b) = mpsc::unbounded_channel();
    let (other_room, _) = reg
        .create_or_join(b, "bob", OpponentKind::Human, tx_b)
        .await
        .unwrap();
    assert_ne!(other_room, room_id);
}

#[tokio::test]
async fn test_requests_need_membership() {
    let reg = registry();
    let a = reg.new_side_id();
    let stranger = SideId(0xfeed);
    let (tx, _rx) = mpsc::unbounded_channel();
    let (room_id, _) = reg
        .create_or_join(a, "alice", OpponentKind::Scripted, tx)
        .await
        .unwrap();

    assert!(reg
        .place_vessel(room_id, stranger, "carrier", 5, 0, 0, Axis::Row)
        .await
        .is_err());
    assert!(reg.fire(room_id, stranger, 0, 0).await.is_err());
    assert!(reg.abandon(room_id, stranger).await.is_err());

    let placed = reg
        .place_vessel(room_id, a, "carrier", 5, 0, 0, Axis::Row)
        .await
        .unwrap();
    assert!(placed.accepted);
    // readiness needs the whole fleet
    assert!(reg.mark_ready(room_id, a).await.is_err());
}

#[tokio::test]
async fn test_scripted_match_starts_on_ready() {
    let reg = registry();
    let a = reg.new_side_id();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let (room_id, _) = reg
        .create_or_join(a, "alice", OpponentKind::Scripted, tx)
        .await
        .unwrap();
    for (i, def) in FLEET.iter().enumerate() {
        reg.place_vessel(room_id, a, def.name(), def.length(), 0, i * 2, Axis::Column)
            .await
            .unwrap();
    }
    assert!(reg.mark_ready(room_id, a).await.unwrap());
    match rx.recv().await.unwrap() {
        Event::StartGame {
            room,
            opponent_profile,
            ..
        } => {
            assert_eq!(room.turn, Some(a));
            assert_eq!(opponent_profile.name, "Computer");
        }
        other => panic!("expected START_GAME, got {}", other.kind()),
    }
}

#[tokio::test]
async fn test_leaving_notifies_opponent_and_drops_room() {
    let reg = registry();
    let (a, b) = (reg.new_side_id(), reg.new_side_id());
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    let (room_id, _) = reg
        .create_or_join(a, "alice", OpponentKind::Human, tx_a)
        .await
        .unwrap();
    reg.create_or_join(b, "bob", OpponentKind::Human, tx_b)
        .await
        .unwrap();

    reg.abandon(room_id, a).await.unwrap();
    assert!(matches!(rx_b.recv().await, Some(Event::OpponentQuit)));
    // the leaving side is not told, and its outbox is released
    assert!(rx_a.recv().await.is_none());
    assert_eq!(reg.room_count().await, 0);
    assert!(reg.fire(room_id, b, 0, 0).await.is_err());
}

#[tokio::test]
async fn test_disconnect_of_waiting_side_frees_slot() {
    let reg = registry();
    let a = reg.new_side_id();
    let (tx_a, _rx_a) = mpsc::unbounded_channel();
    let (first, _) = reg
        .create_or_join(a, "alice", OpponentKind::Human, tx_a)
        .await
        .unwrap();
    reg.disconnect(a).await;
    assert_eq!(reg.room_count().await, 0);

    let b = reg.new_side_id();
    let (tx_b, _rx_b) = mpsc::unbounded_channel();
    let (second, data) = reg
        .create_or_join(b, "bob", OpponentKind::Human, tx_b)
        .await
        .unwrap();
    assert_ne!(first, second);
    match data {
        Event::RoomData { room, .. } => assert!(!room.is_full),
        other => panic!("expected ROOM_DATA, got {}", other.kind()),
    }
}

#[tokio::test]
async fn test_rejoining_leaves_previous_room() {
    let reg = registry();
    let a = reg.new_side_id();
    let (tx, _rx) = mpsc::unbounded_channel();
    let (first, _) = reg
        .create_or_join(a, "alice", OpponentKind::Scripted, tx.clone())
        .await
        .unwrap();
    let (second, _) = reg
        .create_or_join(a, "alice", OpponentKind::Scripted, tx)
        .await
        .unwrap();
    assert_ne!(first, second);
    assert_eq!(reg.room_count().await, 1);
    assert!(reg.room(first).await.is_none());
}

#[tokio::test]
async fn test_seeded_ids_are_reproducible() {
    let one = registry();
    let two = registry();
    assert_eq!(one.new_side_id(), two.new_side_id());
    assert_eq!(one.new_side_id(), two.new_side_id());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_humans_never_share_or_split_rooms() {
    const SIDES: usize = 32;
    let reg = Arc::new(registry());
    let mut tasks = Vec::new();
    for i in 0..SIDES {
        let reg = Arc::clone(&reg);
        tasks.push(tokio::spawn(async move {
            let side = reg.new_side_id();
            let (tx, rx) = mpsc::unbounded_channel();
            let (room_id, _) = reg
                .create_or_join(side, &format!("player{}", i), OpponentKind::Human, tx)
                .await
                .unwrap();
            (room_id, rx)
        }));
    }

    let mut seats: HashMap<RoomId, usize> = HashMap::new();
    let mut outboxes = Vec::new();
    for task in tasks {
        let (room_id, rx) = task.await.unwrap();
        *seats.entry(room_id).or_default() += 1;
        outboxes.push(rx);
    }
    assert_eq!(seats.len(), SIDES / 2);
    assert!(seats.values().all(|&n| n == 2));
    assert_eq!(reg.room_count().await, SIDES / 2);
    for room_id in seats.keys() {
        assert!(reg.room(*room_id).await.unwrap().summary().await.is_full);
    }
}

#[tokio::test]
async fn test_ended_match_is_discarded() {
    let reg = registry();
    let (a, b) = (reg.new_side_id(), reg.new_side_id());
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    let (room_id, _) = reg
        .create_or_join(a, "alice", OpponentKind::Human, tx_a)
        .await
        .unwrap();
    reg.create_or_join(b, "bob", OpponentKind::Human, tx_b)
        .await
        .unwrap();
    for side in [a, b] {
        for (i, def) in FLEET.iter().enumerate() {
            reg.place_vessel(room_id, side, def.name(), def.length(), i * 2, 0, Axis::Row)
                .await
                .unwrap();
        }
    }
    assert!(!reg.mark_ready(room_id, a).await.unwrap());
    assert!(reg.mark_ready(room_id, b).await.unwrap());

    // bob moves first and sinks alice's fleet; alice shoots at empty odd rows
    let targets: Vec<(usize, usize)> = FLEET
        .iter()
        .enumerate()
        .flat_map(|(i, def)| (0..def.length()).map(move |c| (i * 2, c)))
        .collect();
    for (n, &(row, col)) in targets.iter().enumerate() {
        reg.fire(room_id, b, row, col).await.unwrap();
        if n + 1 < targets.len() {
            reg.fire(room_id, a, 1 + 2 * (n / 10), n % 10).await.unwrap();
        }
    }

    let mut last = None;
    while let Ok(event) = rx_b.try_recv() {
        last = Some(event);
    }
    match last {
        Some(Event::FireShot { hit_data, room, .. }) => {
            assert_eq!(hit_data.report, ShotReport::Eliminated);
            assert_eq!(room.winner, Some(b));
        }
        other => panic!("expected final FIRE_SHOT, got {:?}", other),
    }
    while let Ok(event) = rx_a.try_recv() {
        assert!(!matches!(event, Event::OpponentQuit));
    }

    assert_eq!(reg.room_count().await, 0);
    assert!(reg.room(room_id).await.is_none());
    assert!(reg.fire(room_id, a, 9, 9).await.is_err());

    // both sides can matchmake again, into one fresh room
    let (tx_a, _rx_a) = mpsc::unbounded_channel();
    let (tx_b, _rx_b) = mpsc::unbounded_channel();
    let (next_a, _) = reg
        .create_or_join(a, "alice", OpponentKind::Human, tx_a)
        .await
        .unwrap();
    let (next_b, _) = reg
        .create_or_join(b, "bob", OpponentKind::Human, tx_b)
        .await
        .unwrap();
    assert_eq!(next_a, next_b);
    assert_ne!(next_a, room_id);
}
