//! Development host wiring: config -> bridge, page and routes.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use serde_json::Value;

use webshell_bridge::{app_state::AppState, config};
use webshell_core::error::BridgeError;

fn state(yaml: &str) -> AppState {
    AppState::new(config::load_from_str(yaml).unwrap()).unwrap()
}

#[test]
fn inline_content_is_rendered_with_bridge() {
    let app = state(
        r#"
version: 1
content:
  html: "<html><head></head><body>hello</body></html>"
bridge:
  namespace: "shell"
"#,
    );
    assert!(app.page().contains("hello"));
    assert!(app.page().contains("window.shell = {"));
    assert!(app.page().contains("/v1/bridge"));
    assert_eq!(app.cfg().bridge.namespace, "shell");
}

#[test]
fn default_page_is_demo() {
    let app = state("version: 1\nwindow:\n  title: Demo Shell\n");
    assert!(app.page().contains("<title>Demo Shell</title>"));
    assert!(app.page().contains("window.webshell.call("));
}

#[test]
fn missing_html_file_fails_startup() {
    let cfg = config::load_from_str("version: 1\ncontent:\n  html_file: /nonexistent/index.html\n").unwrap();
    let err = AppState::new(cfg).err().unwrap();
    assert!(matches!(err, BridgeError::Internal(_)));
}

#[test]
fn demo_bindings_answer_calls() {
    let app = state("version: 1");
    let bridge = app.bridge();
    for name in ["getVersion", "greet", "add", "getUser", "divide", "longTask"] {
        assert!(bridge.is_bound(name), "{name} not bound");
    }

    let reply: Value = serde_json::from_str(
        &bridge.handle_message(r#"{"id":"a","type":"call","method":"greet","args":["Ada"]}"#),
    )
    .unwrap();
    assert_eq!(reply["result"], "Hello, Ada!");

    let reply: Value = serde_json::from_str(
        &bridge.handle_message(r#"{"id":"b","type":"call","method":"getUser","args":[7]}"#),
    )
    .unwrap();
    assert_eq!(reply["result"]["id"], 7);
    assert_eq!(reply["result"]["is_active"], true);

    let reply: Value = serde_json::from_str(
        &bridge.handle_message(r#"{"id":"c","type":"call","method":"divide","args":[1,0]}"#),
    )
    .unwrap();
    assert_eq!(reply["error"]["code"], -4);
    assert_eq!(reply["error"]["message"], "division by zero");
}

#[test]
fn emit_without_connected_page_fails() {
    let app = state("version: 1");
    assert!(app.hub().is_empty());
    assert!(matches!(app.bridge().emit("x", &1), Err(BridgeError::Eval(_))));
}
