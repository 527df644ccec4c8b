//! Bridge routing: inbound messages, outbound scripts and native -> web calls.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};

use webshell_bridge::{Bridge, BridgeOptions, ChannelEvaluator, Evaluator};
use webshell_core::error::{BridgeError, Result};
use webshell_core::protocol::message::{Message, MessageType};
use webshell_core::ErrorCode;

/// Evaluator that records every script it is given.
fn recording() -> (Arc<dyn Evaluator>, Arc<Mutex<Vec<String>>>) {
    let scripts = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&scripts);
    let eval: Arc<dyn Evaluator> = Arc::new(move |script: &str| -> Result<()> {
        sink.lock().unwrap().push(script.to_string());
        Ok(())
    });
    (eval, scripts)
}

fn bridge_with_add() -> (Bridge, Arc<Mutex<Vec<String>>>) {
    let (eval, scripts) = recording();
    let bridge = Bridge::new(eval);
    bridge.bind("add", |a: i64, b: i64| a + b).unwrap();
    (bridge, scripts)
}

/// Message JSON embedded in a delivery script such as
/// `window.ns && window.ns._handleCall({...})`.
fn embedded_message(script: &str) -> Message {
    let start = script.find('{').unwrap();
    let end = script.rfind('}').unwrap();
    Message::from_json(&script[start..=end]).unwrap()
}

#[test]
fn call_is_answered_with_result() {
    let (bridge, _) = bridge_with_add();
    let reply = bridge.handle_message(r#"{"id":"x1","type":"call","method":"add","args":[3,4]}"#);
    let reply: Value = serde_json::from_str(&reply).unwrap();
    assert_eq!(reply["id"], "x1");
    assert_eq!(reply["type"], "result");
    assert_eq!(reply["result"], 7);
    assert!(reply.get("error").is_none());
}

#[test]
fn unknown_method_is_answered_with_error() {
    let (bridge, _) = bridge_with_add();
    let reply = bridge.handle_message(r#"{"id":"x2","type":"call","method":"sub","args":[3,4]}"#);
    let reply = Message::from_json(&reply).unwrap();
    assert_eq!(reply.id, "x2");
    assert_eq!(reply.msg_type, MessageType::Error);
    assert_eq!(reply.error.unwrap().error_code(), ErrorCode::MethodNotFound);
}

#[test]
fn malformed_input_gets_uncorrelated_error() {
    let (bridge, _) = bridge_with_add();
    let reply = Message::from_json(&bridge.handle_message("not json at all")).unwrap();
    assert_eq!(reply.id, "");
    let err = reply.error.unwrap();
    assert_eq!(err.code, -1);
    assert_eq!(err.message, "failed to parse message");
    assert!(!err.details.is_empty());
}

#[test]
fn unknown_type_is_rejected() {
    let (bridge, _) = bridge_with_add();
    let reply = Message::from_json(&bridge.handle_message(r#"{"id":"u1","type":"bogus"}"#)).unwrap();
    assert_eq!(reply.id, "u1");
    let err = reply.error.unwrap();
    assert_eq!(err.code, -1);
    assert_eq!(err.message, "unknown message type: bogus");
}

#[test]
fn stray_result_produces_no_reply() {
    let (bridge, scripts) = bridge_with_add();
    assert_eq!(bridge.handle_message(r#"{"id":"native_99","type":"result","result":1}"#), "");
    assert_eq!(bridge.handle_message(r#"{"id":"native_98","type":"error","error":{"code":-4,"message":"x"}}"#), "");
    assert!(scripts.lock().unwrap().is_empty());
}

#[test]
fn handle_and_respond_evaluates_reply() {
    let (bridge, scripts) = bridge_with_add();
    bridge
        .handle_and_respond(r#"{"id":"x1","type":"call","method":"add","args":[3,4]}"#)
        .unwrap();

    let scripts = scripts.lock().unwrap();
    assert_eq!(scripts.len(), 1);
    assert!(scripts[0].starts_with("window.webshell && window.webshell._handleResponse("));
    let reply = embedded_message(&scripts[0]);
    assert_eq!(reply.parse_result::<i64>().unwrap(), Some(7));
}

#[test]
fn emit_delivers_event_script() {
    let (bridge, scripts) = bridge_with_add();
    bridge.emit("app:ready", &json!({"version": 1})).unwrap();

    let scripts = scripts.lock().unwrap();
    assert!(scripts[0].contains("._handleEvent("));
    let msg = embedded_message(&scripts[0]);
    assert_eq!(msg.msg_type, MessageType::Event);
    assert_eq!(msg.event, "app:ready");
    assert_eq!(msg.id, "");
    assert_eq!(msg.parse_data::<Value>().unwrap(), Some(json!({"version": 1})));
}

#[test]
fn emit_reports_evaluator_failure() {
    let eval = |_: &str| -> Result<()> { Err(BridgeError::Eval("surface gone".into())) };
    let bridge = Bridge::new(Arc::new(eval));
    assert!(matches!(bridge.emit("x", &1), Err(BridgeError::Eval(_))));
}

#[test]
fn init_injects_companion_once() {
    let (eval, scripts) = recording();
    let bridge = Bridge::with_options(
        eval,
        BridgeOptions {
            namespace: "myApp".into(),
            ..BridgeOptions::default()
        },
    );
    assert!(!bridge.is_initialized());
    bridge.init().unwrap();
    bridge.init().unwrap();
    assert!(bridge.is_initialized());

    let scripts = scripts.lock().unwrap();
    assert_eq!(scripts.len(), 1);
    assert!(scripts[0].contains("window.myApp = {"));
    assert_eq!(scripts[0], bridge.companion_script());
}

#[test]
fn failed_init_can_be_retried() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&attempts);
    let eval = move |_: &str| -> Result<()> {
        if seen.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(BridgeError::Eval("not ready".into()));
        }
        Ok(())
    };
    let bridge = Bridge::new(Arc::new(eval));

    let err = bridge.init().unwrap_err();
    assert!(err.to_string().contains("failed to inject bridge code"));
    assert!(!bridge.is_initialized());

    bridge.init().unwrap();
    assert!(bridge.is_initialized());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn bindings_are_managed_through_bridge() {
    let (bridge, _) = bridge_with_add();
    assert!(bridge.is_bound("add"));
    assert_eq!(bridge.list_bindings(), vec!["add".to_string()]);
    assert!(bridge.bind("add", || 0).is_err());
    assert!(bridge.unbind("add"));
    assert!(!bridge.is_bound("add"));
}

#[test]
fn web_events_reach_native_listeners() {
    let (bridge, _) = bridge_with_add();
    let got = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&got);
    let id = bridge.on("page:loaded", move |data| sink.lock().unwrap().push(data.clone()));

    let reply = bridge.handle_message(r#"{"type":"event","event":"page:loaded","data":{"url":"/"}}"#);
    assert_eq!(reply, "");
    assert_eq!(*got.lock().unwrap(), vec![json!({"url": "/"})]);

    assert!(bridge.off("page:loaded", Some(id)));
    bridge.handle_message(r#"{"type":"event","event":"page:loaded","data":null}"#);
    assert_eq!(got.lock().unwrap().len(), 1);
}

#[test]
fn panicking_listener_does_not_stop_others() {
    let (bridge, _) = bridge_with_add();
    let hits = Arc::new(AtomicUsize::new(0));
    bridge.on("tick", |_| panic!("listener failure"));
    let counter = Arc::clone(&hits);
    bridge.on("tick", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(bridge.handle_message(r#"{"type":"event","event":"tick"}"#), "");
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    assert!(bridge.off("tick", None));
    assert!(!bridge.off("tick", None));
}

#[tokio::test]
async fn call_web_resolves_with_page_reply() {
    let (eval, mut rx) = ChannelEvaluator::channel();
    let bridge = Arc::new(Bridge::new(Arc::new(eval)));

    let page = Arc::clone(&bridge);
    let responder = tokio::spawn(async move {
        let script = rx.recv().await.unwrap();
        assert!(script.contains("._handleCall("));
        let call = embedded_message(&script);
        assert_eq!(call.msg_type, MessageType::Call);
        assert_eq!(call.method, "pageInfo");
        assert!(call.id.starts_with("native_"));

        let reply = Message::result(call.id.clone(), &json!({"title": "demo"})).unwrap();
        let text = reply.to_json().unwrap();
        assert_eq!(page.handle_message(&text), "");
        // second delivery of the same response is ignored
        assert_eq!(page.handle_message(&text), "");
    });

    let info: Value = bridge.call_web("pageInfo", &json!([]), None).await.unwrap();
    assert_eq!(info, json!({"title": "demo"}));
    responder.await.unwrap();
    assert_eq!(bridge.pending_calls(), 0);
}

#[tokio::test]
async fn call_web_surfaces_remote_error() {
    let (eval, mut rx) = ChannelEvaluator::channel();
    let bridge = Arc::new(Bridge::new(Arc::new(eval)));

    let page = Arc::clone(&bridge);
    tokio::spawn(async move {
        let call = embedded_message(&rx.recv().await.unwrap());
        let reply = Message::error(call.id, ErrorCode::MethodNotFound, "method not found: nope", "");
        page.handle_message(&reply.to_json().unwrap());
    });

    let err = bridge.call_web::<Value, _>("nope", &json!([]), None).await.unwrap_err();
    match err {
        BridgeError::Remote { code, message } => {
            assert_eq!(code, -2);
            assert_eq!(message, "method not found: nope");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn call_web_error_reply_without_payload_is_still_an_error() {
    let (eval, mut rx) = ChannelEvaluator::channel();
    let bridge = Arc::new(Bridge::new(Arc::new(eval)));

    let page = Arc::clone(&bridge);
    tokio::spawn(async move {
        let call = embedded_message(&rx.recv().await.unwrap());
        let bare = json!({"id": call.id, "type": "error"}).to_string();
        page.handle_message(&bare);
    });

    let err = bridge.call_web::<Value, _>("pageInfo", &json!([]), None).await.unwrap_err();
    assert!(matches!(err, BridgeError::Remote { code: -1, .. }), "got {err:?}");
}

#[tokio::test]
async fn call_web_times_out_and_clears_pending() {
    let (eval, _rx) = ChannelEvaluator::channel();
    let bridge = Bridge::new(Arc::new(eval));

    let err = bridge
        .call_web::<Value, _>("slow", &json!([1, 2]), Some(Duration::from_millis(50)))
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::Timeout(ref m) if m == "slow"));
    assert_eq!(bridge.pending_calls(), 0);

    // a late answer finds nobody waiting
    let late = Message::result("native_1", &1).unwrap().to_json().unwrap();
    assert_eq!(bridge.handle_message(&late), "");
}

#[tokio::test]
async fn call_web_fails_fast_when_script_cannot_be_delivered() {
    let (eval, rx) = ChannelEvaluator::channel();
    drop(rx);
    let bridge = Bridge::new(Arc::new(eval));

    let err = bridge.call_web::<Value, _>("pageInfo", &json!([]), None).await.unwrap_err();
    assert!(matches!(err, BridgeError::Eval(_)));
    assert_eq!(bridge.pending_calls(), 0);
}

#[tokio::test]
async fn call_web_ids_are_unique() {
    let (eval, mut rx) = ChannelEvaluator::channel();
    let bridge = Bridge::new(Arc::new(eval));

    for _ in 0..3 {
        let _ = bridge
            .call_web::<Value, _>("f", &json!([]), Some(Duration::from_millis(1)))
            .await;
    }
    let mut ids = Vec::new();
    while let Ok(script) = rx.try_recv() {
        ids.push(embedded_message(&script).id);
    }
    assert_eq!(ids, vec!["native_1", "native_2", "native_3"]);
}
