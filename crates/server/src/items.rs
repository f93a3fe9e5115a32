//! Catalog item endpoints.

use api_types::{
    item::{CatalogCounts, ItemNew, ItemView},
    user::PictureUpdated,
};
use axum::{Extension, body::Bytes, extract::State, http::StatusCode};
use engine::{Caller, ItemFields};
use uuid::Uuid;

use crate::{
    ServerError,
    blob::{ITEM_FOLDER, swap_picture},
    extract::{Json, Path},
    server::ServerState,
    views,
};

fn item_fields(payload: ItemNew) -> ItemFields {
    ItemFields::new(payload.name, payload.description)
        .categories(views::category_refs(payload.category))
        .value(payload.value)
        .rarity(views::rarity_in(payload.rarity))
        .equippable(payload.equippable)
        .private(payload.private)
}

pub async fn counts(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
) -> Result<Json<CatalogCounts>, ServerError> {
    let counts = state.engine.catalog_counts(&caller).await?;
    Ok(Json(CatalogCounts {
        items: counts.items,
        categories: counts.categories,
    }))
}

pub async fn list(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ItemView>>, ServerError> {
    let items = state
        .engine
        .list_items(&caller)
        .await?
        .into_iter()
        .map(views::item)
        .collect();
    Ok(Json(items))
}

pub async fn equippable(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ItemView>>, ServerError> {
    let items = state
        .engine
        .list_equippable_items(&caller)
        .await?
        .into_iter()
        .map(views::item)
        .collect();
    Ok(Json(items))
}

pub async fn create(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Json(payload): Json<ItemNew>,
) -> Result<(StatusCode, Json<ItemView>), ServerError> {
    let item = state
        .engine
        .create_item(item_fields(payload), &caller)
        .await?;
    Ok((StatusCode::CREATED, Json(views::item(item))))
}

pub async fn get(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<ItemView>, ServerError> {
    let item = state.engine.item(item_id, &caller).await?;
    Ok(Json(views::item(item)))
}

pub async fn update(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<ItemNew>,
) -> Result<Json<ItemView>, ServerError> {
    let item = state
        .engine
        .update_item(item_id, item_fields(payload), &caller)
        .await?;
    Ok(Json(views::item(item)))
}

pub async fn delete(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(item_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let item = state.engine.delete_item(item_id, &caller).await?;
    if let Some(picture) = item.picture {
        if let Err(err) = state.blobs.delete(ITEM_FOLDER, &picture).await {
            tracing::warn!(item_id = %item_id, "failed to delete item picture: {err}");
        }
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Replace the item picture with the raw request body.
pub async fn picture(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(item_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<PictureUpdated>, ServerError> {
    // Fail on missing or foreign items before anything is uploaded.
    let item = state.engine.item(item_id, &caller).await?;
    if !engine::can_act(&caller, item.creator) {
        return Err(
            engine::EngineError::Forbidden("not allowed to modify this item".to_string()).into(),
        );
    }

    let url = swap_picture(state.blobs.as_ref(), ITEM_FOLDER, body.to_vec(), |url| {
        state.engine.set_item_picture(item_id, url, &caller)
    })
    .await?;
    Ok(Json(PictureUpdated { url }))
}
