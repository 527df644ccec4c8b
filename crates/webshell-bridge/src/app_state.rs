//! Shared application state for the development host.
//!
//! - Wire the bridge to the session hub and bind the demo functions.
//! - Render the initial page once at startup.
//! - Make startup errors explicit (Result instead of panic).

use std::fs;
use std::sync::Arc;

use webshell_core::error::{BridgeError, Result};

use crate::bridge::Bridge;
use crate::config::ShellConfig;
use crate::eval::Evaluator;
use crate::transport::hub::SessionHub;
use crate::{demo, page};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ShellConfig,
    bridge: Arc<Bridge>,
    hub: Arc<SessionHub>,
    page: String,
}

impl AppState {
    /// Build application state.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: ShellConfig) -> Result<Self> {
        let hub = Arc::new(SessionHub::new());
        let evaluator: Arc<dyn Evaluator> = hub.clone();
        let bridge = Arc::new(Bridge::with_options(evaluator, cfg.bridge.options()));

        demo::bind_demo(&bridge)?;
        bridge.on("page:loaded", |data| {
            tracing::info!(%data, "page loaded");
        });

        let html = match (&cfg.content.html_file, &cfg.content.html) {
            (Some(path), _) => fs::read_to_string(path)
                .map_err(|e| BridgeError::Internal(format!("read {path} failed: {e}")))?,
            (None, Some(inline)) => inline.clone(),
            (None, None) => demo::demo_page(bridge.namespace(), &cfg.window.title),
        };
        let page = page::render(&html, &bridge.companion_script());

        tracing::debug!(bindings = ?bridge.list_bindings(), "bridge ready");

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                bridge,
                hub,
                page,
            }),
        })
    }

    pub fn cfg(&self) -> &ShellConfig {
        &self.inner.cfg
    }

    pub fn bridge(&self) -> Arc<Bridge> {
        Arc::clone(&self.inner.bridge)
    }

    pub fn hub(&self) -> Arc<SessionHub> {
        Arc::clone(&self.inner.hub)
    }

    /// Rendered page, with the shim and companion script injected.
    pub fn page(&self) -> &str {
        &self.inner.page
    }
}
