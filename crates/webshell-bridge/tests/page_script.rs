#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use webshell_bridge::{demo, page, script};

#[test]
fn companion_uses_namespace() {
    let js = script::companion("myApp");
    assert!(js.contains("window.myApp = {"));
    assert!(js.contains("_handleResponse"));
    assert!(js.contains("_handleEvent"));
    assert!(js.contains("_handleCall"));
    assert!(!js.contains("__NS__"));
    // transmission order: webview IPC, then the host hook, then external.invoke
    let ipc = js.find("window.ipc.postMessage(text)").unwrap();
    let hook = js.find("window.__webshell_post(text)").unwrap();
    let external = js.find("window.external.invoke(text)").unwrap();
    assert!(ipc < hook && hook < external);
    assert!(js.contains(script::POST_HOOK));
}

#[test]
fn delivery_scripts_guard_on_namespace() {
    let json = r#"{"id":"x1","type":"result","result":7}"#;
    assert_eq!(
        script::response("webshell", json),
        format!("window.webshell && window.webshell._handleResponse({json})")
    );
    assert!(script::event("ns", "{}").ends_with("._handleEvent({})"));
    assert!(script::call("ns", "{}").ends_with("._handleCall({})"));
}

#[test]
fn line_separators_are_escaped() {
    let json = "{\"data\":\"a\u{2028}b\u{2029}c\"}";
    let out = script::js_literal(json);
    assert_eq!(out, r#"{"data":"a\u2028b\u2029c"}"#);
}

#[test]
fn render_injects_before_head_end() {
    let html = "<html><HEAD><title>t</title></HEAD><body>hi</body></html>";
    let out = page::render(html, "/*companion*/");
    let injected = out.find("/*companion*/").unwrap();
    assert!(injected < out.find("</HEAD>").unwrap());
    assert!(out.contains(page::BRIDGE_PATH));
    assert!(out.ends_with("<body>hi</body></html>"));
}

#[test]
fn render_without_head_prepends() {
    let out = page::render("<p>bare</p>", "/*companion*/");
    assert!(out.starts_with("<script>"));
    assert!(out.ends_with("<p>bare</p>"));
}

#[test]
fn demo_page_fills_placeholders() {
    let html = demo::demo_page("myApp", "My Title");
    assert!(html.contains("<title>My Title</title>"));
    assert!(html.contains("window.myApp.call("));
    assert!(!html.contains("__NS__") && !html.contains("__TITLE__"));
}
