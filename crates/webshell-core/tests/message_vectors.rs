//! Wire message vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use serde_json::Value;

use webshell_core::protocol::message::{Message, MessageType};

use vector_loader::load;

#[test]
fn message_vectors() {
    let files = [
        "call_add.json",
        "call_no_args.json",
        "result_object.json",
        "error_not_found.json",
        "event_broadcast.json",
        "unknown_type.json",
        "malformed.json",
        "missing_type.json",
    ];

    for f in files {
        let v = load(f);
        let res = Message::from_json(&v.wire_text());

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.error_code().as_i32(), err.code, "vector={}", v.description);
            continue;
        }

        let msg = res.expect("expected ok message");
        let ex = v.expect.expect("missing expect block");

        assert_eq!(msg.id, ex["id"].as_str().unwrap(), "vector={}", v.description);
        assert_eq!(msg.msg_type.as_str(), ex["type"].as_str().unwrap(), "vector={}", v.description);

        if let Some(method) = ex.get("method") {
            assert_eq!(msg.method, method.as_str().unwrap(), "vector={}", v.description);
        }
        if let Some(n) = ex.get("args_len") {
            assert_eq!(msg.raw_args().unwrap().len() as u64, n.as_u64().unwrap(), "vector={}", v.description);
        }
        if let Some(result) = ex.get("result") {
            let got: Value = msg.parse_result().unwrap().unwrap();
            assert_eq!(&got, result, "vector={}", v.description);
        }
        if let Some(code) = ex.get("error_code") {
            let payload = msg.error.as_ref().unwrap();
            assert_eq!(payload.code as i64, code.as_i64().unwrap(), "vector={}", v.description);
            assert_eq!(payload.details, ex["details"].as_str().unwrap(), "vector={}", v.description);
        }
        if let Some(event) = ex.get("event") {
            assert_eq!(msg.event, event.as_str().unwrap(), "vector={}", v.description);
            let got: Value = msg.parse_data().unwrap().unwrap();
            assert_eq!(&got, &ex["data"], "vector={}", v.description);
        }
        if let Some(ts) = ex.get("timestamp") {
            assert_eq!(msg.timestamp, ts.as_i64().unwrap(), "vector={}", v.description);
        }
    }
}

#[test]
fn unknown_type_survives_reencoding() {
    let msg = Message::from_json(r#"{"id":"q1","type":"ping"}"#).unwrap();
    assert_eq!(msg.msg_type, MessageType::Unknown("ping".into()));

    let text = msg.to_json().unwrap();
    let back: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(back["type"], "ping");
    assert_eq!(back["id"], "q1");
}
