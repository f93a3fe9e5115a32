//! Categories API endpoints.

use api_types::category::{CategoryDetail, CategoryNew, CategoryUpdate, CategoryView};
use axum::{Extension, extract::State, http::StatusCode};
use engine::{Caller, CategoryFields, CategoryPatch};
use uuid::Uuid;

use crate::{
    ServerError,
    extract::{Json, Path},
    server::ServerState,
    views,
};

pub async fn list(
    _: Extension<Caller>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state
        .engine
        .list_categories()
        .await?
        .into_iter()
        .map(views::category)
        .collect();

    Ok(Json(categories))
}

pub async fn create(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let fields = CategoryFields::new(payload.name).default_category(payload.is_default);
    let category = state.engine.create_category(fields, &caller).await?;
    Ok((StatusCode::CREATED, Json(views::category(category))))
}

pub async fn get(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(category_id): Path<Uuid>,
) -> Result<Json<CategoryDetail>, ServerError> {
    let detail = state.engine.category(category_id, &caller).await?;
    Ok(Json(views::category_detail(detail)))
}

pub async fn update(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(category_id): Path<Uuid>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<CategoryView>, ServerError> {
    if payload.name.is_none() && payload.is_default.is_none() {
        return Err(ServerError::Generic(
            "provide at least one of name or is_default".to_string(),
        ));
    }

    let patch = CategoryPatch {
        name: payload.name,
        is_default: payload.is_default,
    };
    let category = state
        .engine
        .update_category(category_id, patch, &caller)
        .await?;
    Ok(Json(views::category(category)))
}

pub async fn delete(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(category_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_category(category_id, &caller).await?;
    Ok(StatusCode::NO_CONTENT)
}
