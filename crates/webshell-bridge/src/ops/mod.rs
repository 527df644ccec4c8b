//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness, plus how many pages are connected

use axum::extract::State;
use axum::{http::StatusCode, response::IntoResponse};

use crate::app_state::AppState;

pub async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, format!("ok sessions={}", state.hub().len()))
}
