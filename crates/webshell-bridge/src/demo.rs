//! Built-in demo bindings and page for the development host.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::json;

use webshell_core::error::Result;

use crate::bridge::Bridge;
use crate::registry::Json;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: u64,
    pub is_active: bool,
}

fn unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Bind the demo functions the built-in page exercises.
pub fn bind_demo(bridge: &Bridge) -> Result<()> {
    bridge.bind("getVersion", || concat!("webshell v", env!("CARGO_PKG_VERSION")))?;

    bridge.bind("greet", |name: String| {
        tracing::info!(%name, "greet called");
        format!("Hello, {name}!")
    })?;

    bridge.bind("add", |a: i64, b: i64| {
        tracing::info!(a, b, "add called");
        a + b
    })?;

    bridge.bind("getUser", |id: i64| {
        Json(User {
            id,
            username: "webshell".into(),
            email: "demo@example.com".into(),
            created_at: unix_secs(),
            is_active: true,
        })
    })?;

    bridge.bind("divide", |a: f64, b: f64| -> std::result::Result<f64, String> {
        tracing::info!(a, b, "divide called");
        if b == 0.0 {
            return Err("division by zero".into());
        }
        Ok(a / b)
    })?;

    bridge.bind("longTask", |seconds: u64| {
        tracing::info!(seconds, "longTask started");
        std::thread::sleep(Duration::from_secs(seconds.min(30)));
        format!("finished after {seconds} seconds")
    })?;

    Ok(())
}

/// Periodically broadcast `app:notification` and ask the page for its
/// `pageInfo`, exercising both native -> web directions.
pub fn spawn_notifier(bridge: Arc<Bridge>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(every);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tick.tick().await;
        loop {
            tick.tick().await;
            let payload = json!({ "message": "backend ready", "time": unix_secs() });
            if let Err(e) = bridge.emit("app:notification", &payload) {
                tracing::debug!(error = %e, "notification not delivered");
                continue;
            }
            match bridge
                .call_web::<serde_json::Value, _>("pageInfo", &json!([]), Some(Duration::from_secs(5)))
                .await
            {
                Ok(info) => tracing::info!(%info, "page info"),
                Err(e) => tracing::debug!(error = %e, "pageInfo call failed"),
            }
        }
    })
}

/// Demo page. `__NS__` is replaced with the bridge namespace.
pub const DEMO_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>__TITLE__</title>
<style>
  body { font-family: system-ui, sans-serif; background: #16213e; color: #eee; padding: 20px; }
  .card { background: rgba(255,255,255,0.08); border-radius: 8px; padding: 16px; margin-bottom: 16px; }
  input { padding: 6px; margin-right: 6px; }
  button { padding: 6px 14px; cursor: pointer; }
  .result { margin-top: 8px; font-family: monospace; white-space: pre-wrap; }
  .error { color: #f66; }
</style>
</head>
<body>
<h1>webshell bridge</h1>

<div class="card">
  <button onclick="run('version', 'getVersion')">getVersion()</button>
  <div id="version" class="result"></div>
</div>

<div class="card">
  <input id="name" value="Ada">
  <button onclick="run('greet', 'greet', val('name'))">greet(name)</button>
  <div id="greet" class="result"></div>
</div>

<div class="card">
  <input id="a" type="number" value="5"><input id="b" type="number" value="3">
  <button onclick="run('add', 'add', num('a'), num('b'))">add(a, b)</button>
  <button onclick="run('add', 'divide', num('a'), num('b'))">divide(a, b)</button>
  <div id="add" class="result"></div>
</div>

<div class="card">
  <input id="uid" type="number" value="1">
  <button onclick="run('user', 'getUser', num('uid'))">getUser(id)</button>
  <div id="user" class="result"></div>
</div>

<div class="card">
  <input id="secs" type="number" value="2">
  <button onclick="run('long', 'longTask', num('secs'))">longTask(seconds)</button>
  <div id="long" class="result"></div>
</div>

<div class="card">
  <h3>events</h3>
  <div id="events" class="result">waiting...</div>
</div>

<script>
  const val = (id) => document.getElementById(id).value;
  const num = (id) => Number(val(id));

  async function run(target, method, ...args) {
    const el = document.getElementById(target);
    el.className = 'result';
    el.textContent = '...';
    try {
      const result = await window.__NS__.call(method, ...args);
      el.textContent = typeof result === 'object' ? JSON.stringify(result, null, 2) : String(result);
    } catch (e) {
      el.className = 'result error';
      el.textContent = 'error ' + e.code + ': ' + e.message;
    }
  }

  window.__NS__.on('app:notification', (data) => {
    const log = document.getElementById('events');
    log.textContent = new Date().toLocaleTimeString() + ' ' + JSON.stringify(data) + '\n' + log.textContent;
  });

  window.__NS__.expose('pageInfo', () => ({ title: document.title, url: location.href, time: Date.now() }));
  window.__NS__.emit('page:loaded', { url: location.href });
</script>
</body>
</html>
"#;

/// Demo page with the namespace and title filled in.
pub fn demo_page(namespace: &str, title: &str) -> String {
    DEMO_PAGE.replace("__NS__", namespace).replace("__TITLE__", title)
}
