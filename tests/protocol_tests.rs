use broadside::{
    decode_request, encode_event, Axis, Event, OpponentKind, Request, RoomId, ShipSpec,
    ShotOutcome, SideId,
};
use serde_json::{json, Value};

fn encoded(event: &Event) -> Value {
    serde_json::from_slice(&encode_event(event).unwrap()).unwrap()
}

#[test]
fn test_decode_requests() {
    let req = decode_request(
        br#"{"type":"USER_PREF","data":{"name":"alice","opponent":"human"}}"#,
    )
    .unwrap();
    assert_eq!(
        req,
        Request::UserPref {
            name: "alice".into(),
            opponent: OpponentKind::Human
        }
    );

    let req = decode_request(
        br#"{"type":"SETUP_SHIPS","data":{"room_id":"00000000000000ff","ship":{"name":"Carrier","length":5},"row":1,"col":2,"axis":"y"}}"#,
    )
    .unwrap();
    assert_eq!(
        req,
        Request::SetupShips {
            room_id: RoomId(0xff),
            ship: ShipSpec {
                name: "Carrier".into(),
                length: 5
            },
            row: 1,
            col: 2,
            axis: Axis::Column,
        }
    );

    let req = decode_request(br#"{"type":"FIRE_SHOT","data":{"room_id":"a","row":9,"col":0}}"#)
        .unwrap();
    assert_eq!(
        req,
        Request::FireShot {
            room_id: RoomId(0xa),
            row: 9,
            col: 0
        }
    );
}

#[test]
fn test_decode_rejects_garbage() {
    assert!(decode_request(b"not json").is_err());
    assert!(decode_request(br#"{"type":"LAUNCH_MISSILES","data":{}}"#).is_err());
    assert!(decode_request(br#"{"type":"RESET","data":{"room_id":"xyz"}}"#).is_err());
    assert!(decode_request(
        br#"{"type":"SETUP_SHIPS","data":{"room_id":"1","ship":{"name":"carrier","length":5},"row":0,"col":0,"axis":"z"}}"#
    )
    .is_err());
    // negative coordinates never reach the engine
    assert!(decode_request(br#"{"type":"FIRE_SHOT","data":{"room_id":"1","row":-1,"col":0}}"#).is_err());
}

#[test]
fn test_event_envelopes() {
    let v = encoded(&Event::Connected {
        side_id: SideId(0x2a),
    });
    assert_eq!(
        v,
        json!({ "type": "CONNECTED", "data": { "side_id": "000000000000002a" } })
    );

    let v = encoded(&Event::OpponentQuit);
    assert_eq!(v["type"], "OPPONENT_QUIT");

    let v = encoded(&Event::rejected("Side 1 is not in room 2"));
    assert_eq!(v["data"]["reason"], "Side 1 is not in room 2");
}

#[test]
fn test_shot_outcome_wire_shape() {
    assert_eq!(
        serde_json::to_value(ShotOutcome::MISS).unwrap(),
        json!({ "report": 0, "details": null })
    );
    assert_eq!(
        serde_json::to_value(ShotOutcome::sunk("submarine")).unwrap(),
        json!({ "report": 2, "details": { "ship": "submarine" } })
    );
    assert_eq!(
        serde_json::to_value(ShotOutcome::eliminated("carrier")).unwrap()["report"],
        3
    );
}

#[test]
fn test_event_kind_matches_tag() {
    let events = [
        Event::OpponentQuit,
        Event::ConnectedAndWaiting { room_id: RoomId(1) },
        Event::rejected("nope"),
    ];
    for event in &events {
        assert_eq!(encoded(event)["type"], event.kind());
    }
}
