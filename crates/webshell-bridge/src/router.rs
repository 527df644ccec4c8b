//! Axum router wiring for the development host.
//!
//! `/` serves the page, `/v1/bridge` upgrades to the bridge WebSocket.

use axum::{extract::State, response::Html, routing::get, Router};

use crate::{app_state::AppState, ops, page, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route(page::BRIDGE_PATH, get(transport::ws::ws_upgrade))
        .route("/healthz", get(ops::healthz))
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(state.page().to_string())
}
