use std::sync::Arc;
use std::time::Duration;

use broadside::{
    Axis, Event, MatchStatus, Room, RoomId, RoomSettings, ScriptedOpponent, ShotReport, SideId,
    TargetingMode, FLEET,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tokio::time::Instant;

const HUMAN: SideId = SideId(0x1);
const SCRIPTED: SideId = SideId(0x2);
const THINK: Duration = Duration::from_millis(4000);

fn settings() -> RoomSettings {
    RoomSettings {
        think_time: THINK,
        targeting: TargetingMode::Omniscient,
    }
}

/// A started human-vs-scripted room with the human to move.
async fn started_room() -> (Arc<Room>, mpsc::UnboundedReceiver<Event>) {
    let room = Room::new(RoomId(7), settings());
    let (tx, mut rx) = mpsc::unbounded_channel();
    room.join_human(HUMAN, "alice", tx).await.unwrap();
    room.join_scripted(
        SCRIPTED,
        ScriptedOpponent::new(SmallRng::seed_from_u64(3), TargetingMode::Omniscient),
    )
    .await
    .unwrap();
    for (i, def) in FLEET.iter().enumerate() {
        let placed = room
            .place_vessel(HUMAN, def.name(), def.length(), i * 2, 0, Axis::Row)
            .await
            .unwrap();
        assert!(placed.accepted);
    }
    assert!(room.mark_ready(HUMAN).await.unwrap());
    match rx.recv().await.unwrap() {
        Event::StartGame { room: summary, .. } => {
            assert_eq!(summary.status, MatchStatus::Started);
            assert_eq!(summary.turn, Some(HUMAN));
        }
        other => panic!("expected START_GAME, got {}", other.kind()),
    }
    (room, rx)
}

#[tokio::test(start_paused = true)]
async fn test_counter_move_after_think_time() {
    let (room, mut rx) = started_room().await;
    let start = Instant::now();
    room.fire(HUMAN, 9, 9).await.unwrap();

    match rx.recv().await.unwrap() {
        Event::FireShot { room: summary, .. } => assert_eq!(summary.turn, Some(SCRIPTED)),
        other => panic!("expected FIRE_SHOT, got {}", other.kind()),
    }
    assert!(room.has_pending_move().await);
    assert!(rx.try_recv().is_err());

    match rx.recv().await.unwrap() {
        Event::ReceivedShot { room: summary, .. } => assert_eq!(summary.turn, Some(HUMAN)),
        other => panic!("expected RECEIVED_SHOT, got {}", other.kind()),
    }
    assert!(start.elapsed() >= THINK);
    assert!(!room.has_pending_move().await);
}

#[tokio::test(start_paused = true)]
async fn test_shots_out_of_turn_are_ignored() {
    let (room, mut rx) = started_room().await;
    room.fire(HUMAN, 0, 0).await.unwrap();
    rx.recv().await.unwrap();
    // still the scripted side's turn
    room.fire(HUMAN, 0, 1).await.unwrap();
    assert!(rx.try_recv().is_err());
    assert_eq!(room.summary().await.turn, Some(SCRIPTED));
}

#[tokio::test(start_paused = true)]
async fn test_close_cancels_counter_move() {
    let (room, mut rx) = started_room().await;
    room.fire(HUMAN, 9, 9).await.unwrap();
    assert!(matches!(rx.recv().await, Some(Event::FireShot { .. })));

    room.close(HUMAN).await;
    assert!(!room.has_pending_move().await);
    tokio::time::sleep(THINK * 2).await;
    assert_eq!(room.summary().await.turn, Some(SCRIPTED));
    // the outbox was dropped with the room's senders
    assert!(rx.recv().await.is_none());

    // a closed room refuses further play
    assert!(room.fire(SCRIPTED, 0, 0).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_off_grid_shot_is_error() {
    let (room, mut rx) = started_room().await;
    assert!(room.fire(HUMAN, 10, 0).await.is_err());
    assert!(rx.try_recv().is_err());
    assert!(!room.has_pending_move().await);
    assert_eq!(room.summary().await.turn, Some(HUMAN));
}

#[tokio::test(start_paused = true)]
async fn test_full_match_against_scripted_side() {
    let (room, mut rx) = started_room().await;
    let mut winner = None;
    'rows: for row in 0..10 {
        for col in 0..10 {
            room.fire(HUMAN, row, col).await.unwrap();
            let (hit_data, summary) = match rx.recv().await.unwrap() {
                Event::FireShot { hit_data, room, .. } => (hit_data, room),
                other => panic!("expected FIRE_SHOT, got {}", other.kind()),
            };
            if summary.status == MatchStatus::Ended {
                assert_eq!(hit_data.report, ShotReport::Eliminated);
                winner = summary.winner;
                break 'rows;
            }
            let summary = match rx.recv().await.unwrap() {
                Event::ReceivedShot { room, .. } => room,
                other => panic!("expected RECEIVED_SHOT, got {}", other.kind()),
            };
            if summary.status == MatchStatus::Ended {
                winner = summary.winner;
                break 'rows;
            }
        }
    }
    let winner = winner.unwrap();
    assert_eq!(room.summary().await.winner, Some(winner));
    assert!(!room.has_pending_move().await);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_room_cancels_counter_move() {
    let (room, mut rx) = started_room().await;
    room.fire(HUMAN, 9, 9).await.unwrap();
    assert!(matches!(rx.recv().await, Some(Event::FireShot { .. })));

    // the pending task does not keep the room alive
    drop(room);
    tokio::time::sleep(THINK * 2).await;
    assert!(rx.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_ready_after_start_is_error() {
    let (room, mut rx) = started_room().await;
    assert!(room.mark_ready(HUMAN).await.is_err());
    assert!(rx.try_recv().is_err());
    assert_eq!(room.summary().await.turn, Some(HUMAN));
}
