use axum::{Json, extract::State};
use serde::Serialize;

use crate::server::ServerState;

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
    db_healthy: bool,
}

pub async fn health(State(state): State<ServerState>) -> Json<Health> {
    let db_healthy = match state.db.ping().await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!("database ping failed: {err}");
            false
        }
    };

    Json(Health {
        status: "ok",
        db_healthy,
    })
}
