use axum::{
    Router,
    extract::{DefaultBodyLimit, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use sea_orm::DatabaseConnection;

use std::sync::Arc;

use crate::{
    BlobStore, ServerError, TokenConfig, blob, categories, gold, health, inventory, items,
    user, verify_token,
};
use engine::Engine;

/// Largest accepted picture upload.
const MAX_PICTURE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
    pub tokens: Arc<TokenConfig>,
    pub blobs: Arc<dyn BlobStore>,
}

impl ServerState {
    pub fn new(
        engine: Engine,
        db: DatabaseConnection,
        tokens: TokenConfig,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            engine: Arc::new(engine),
            db,
            tokens: Arc::new(tokens),
            blobs,
        }
    }
}

/// Resolve the bearer token into an [`engine::Caller`] request extension.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(Authorization(bearer))) = auth_header else {
        return Err(ServerError::Unauthorized("missing bearer token".to_string()));
    };

    let claims = verify_token(bearer.token(), &state.tokens).map_err(|err| {
        tracing::debug!("rejected token: {err}");
        ServerError::Unauthorized("invalid or expired token".to_string())
    })?;

    request.extensions_mut().insert(claims.caller());
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/catalog", get(items::counts))
        .route("/catalog/items", get(items::list).post(items::create))
        .route("/catalog/items/equippable", get(items::equippable))
        .route(
            "/catalog/items/{id}",
            get(items::get).put(items::update).delete(items::delete),
        )
        .route("/catalog/items/{id}/picture", put(items::picture))
        .route(
            "/catalog/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/catalog/categories/{id}",
            get(categories::get)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route("/users/{id}", get(user::profile))
        .route("/users/{id}/picture", put(user::picture))
        .route(
            "/users/{id}/inventory",
            get(inventory::list).put(inventory::replace),
        )
        .route("/users/{id}/inventory/add", post(inventory::add))
        .route(
            "/users/{id}/inventory/{item_id}",
            put(inventory::update).delete(inventory::remove),
        )
        .route(
            "/users/{id}/gold",
            get(gold::get).put(gold::set).post(gold::record),
        )
        .route(
            "/users/{id}/gold/transactions/{tx_id}",
            put(gold::amend).delete(gold::remove),
        )
        .layer(DefaultBodyLimit::max(MAX_PICTURE_BYTES))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/health", get(health::health))
        .route("/auth/sign-up", post(user::sign_up))
        .route("/auth/log-in", post(user::log_in))
        .route("/blobs/{folder}/{id}", get(blob::serve))
        .merge(protected)
        .with_state(state)
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}
