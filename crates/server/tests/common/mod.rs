#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc};

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use engine::Engine;
use migration::MigratorTrait;
use server::{LocalBlobStore, ServerState, TokenConfig};

pub struct TestApp {
    pub router: Router,
    pub state: ServerState,
    pub blob_root: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.blob_root);
    }
}

pub async fn app() -> TestApp {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();

    let blob_root = std::env::temp_dir().join(format!("hoard-server-{}", Uuid::new_v4()));
    let blobs = LocalBlobStore::new(&blob_root, "http://localhost/blobs");
    let state = ServerState::new(
        engine,
        db,
        TokenConfig::new("test-secret"),
        Arc::new(blobs),
    );

    TestApp {
        router: server::router(state.clone()),
        state,
        blob_root,
    }
}

pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    }
}

pub async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

pub async fn send_bytes(app: &TestApp, uri: &str, token: &str, bytes: &[u8]) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .body(Body::from(bytes.to_vec()))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

/// Unauthenticated GET returning the raw body.
pub async fn get_bytes(app: &TestApp, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

/// Signed-up user: bearer token and id.
pub struct Session {
    pub token: String,
    pub id: Uuid,
}

pub async fn sign_up(app: &TestApp, username: &str) -> Session {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/sign-up",
        None,
        Some(json!({
            "username": username,
            "password": "hunter22",
            "confirm_password": "hunter22",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    Session {
        token: body["token"].as_str().unwrap().to_string(),
        id: body["user"]["id"].as_str().unwrap().parse().unwrap(),
    }
}

/// Admins cannot sign up; they are created directly and log in.
pub async fn admin(app: &TestApp, username: &str) -> Session {
    let hash = server::hash_password("hunter22").unwrap();
    app.state
        .engine
        .create_user(username, &hash, true)
        .await
        .unwrap();
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/log-in",
        None,
        Some(json!({ "username": username, "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    Session {
        token: body["token"].as_str().unwrap().to_string(),
        id: body["user"]["id"].as_str().unwrap().parse().unwrap(),
    }
}

pub async fn create_item(app: &TestApp, session: &Session, body: Value) -> Uuid {
    let (status, body) = send(
        app,
        Method::POST,
        "/catalog/items",
        Some(&session.token),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().parse().unwrap()
}
