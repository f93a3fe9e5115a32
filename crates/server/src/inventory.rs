//! Inventory endpoints. Every route is scoped to `/users/{id}`.

use api_types::inventory::{InventoryAdd, InventoryEntry, InventoryPatch, InventoryReplace};
use axum::{Extension, extract::State, http::StatusCode};
use engine::{Caller, NewInventoryLine};
use uuid::Uuid;

use crate::{
    ServerError,
    extract::{Json, Path},
    server::ServerState,
    views,
};

fn entries(entries: Vec<engine::InventoryEntry>) -> Vec<InventoryEntry> {
    entries.into_iter().map(views::inventory_entry).collect()
}

pub async fn list(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<InventoryEntry>>, ServerError> {
    let inventory = state.engine.inventory(user_id, &caller).await?;
    Ok(Json(entries(inventory)))
}

pub async fn add(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<InventoryAdd>,
) -> Result<Json<InventoryEntry>, ServerError> {
    let entry = state
        .engine
        .add_to_inventory(user_id, payload.item_id, payload.quantity, &caller)
        .await?;
    Ok(Json(views::inventory_entry(entry)))
}

pub async fn update(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path((user_id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<InventoryPatch>,
) -> Result<Json<InventoryEntry>, ServerError> {
    let patch = engine::InventoryPatch {
        quantity: payload.quantity,
        favorite: payload.favorite,
        equipped: payload.equipped,
    };
    if patch.is_empty() {
        return Err(ServerError::Generic(
            "provide at least one of quantity, favorite or equipped".to_string(),
        ));
    }

    let entry = state
        .engine
        .update_inventory_line(user_id, item_id, patch, &caller)
        .await?;
    Ok(Json(views::inventory_entry(entry)))
}

pub async fn remove(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path((user_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .remove_from_inventory(user_id, item_id, &caller)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Swap the whole inventory for the given lines.
pub async fn replace(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<InventoryReplace>,
) -> Result<Json<Vec<InventoryEntry>>, ServerError> {
    let lines = payload
        .lines
        .into_iter()
        .map(|line| {
            NewInventoryLine::new(line.item_id, line.quantity)
                .favorite(line.favorite)
                .equipped(line.equipped)
        })
        .collect();
    let inventory = state
        .engine
        .replace_inventory(user_id, lines, &caller)
        .await?;
    Ok(Json(entries(inventory)))
}
