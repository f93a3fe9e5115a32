//! Gold balance and transaction log endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{admin, send, sign_up};
use serde_json::json;

#[tokio::test]
async fn record_amend_and_remove() {
    let app = common::app().await;
    let alice = sign_up(&app, "alice").await;
    let gold = format!("/users/{}/gold", alice.id);

    let (status, body) = send(&app, Method::GET, &gold, Some(&alice.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity"], 0);
    assert!(body["transactions"].as_array().unwrap().is_empty());

    let (status, body) = send(
        &app,
        Method::POST,
        &gold,
        Some(&alice.token),
        Some(json!({ "quantity": 120, "date": "2024-03-01T12:00:00Z", "note": "Dragon hoard" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["quantity"], 120);
    assert_eq!(body["transactions"][0]["prior_quantity"], 0);
    let first = body["transactions"][0]["id"].as_i64().unwrap();

    let (_, body) = send(
        &app,
        Method::POST,
        &gold,
        Some(&alice.token),
        Some(json!({ "quantity": 80, "date": "2024-03-02T12:00:00+02:00", "note": "Inn" })),
    )
    .await;
    assert_eq!(body["quantity"], 80);
    assert_eq!(body["transactions"][1]["prior_quantity"], 120);
    assert_eq!(body["transactions"][1]["date"], "2024-03-02T10:00:00Z");

    let tx = format!("{gold}/transactions/{first}");
    let (status, body) = send(
        &app,
        Method::PUT,
        &tx,
        Some(&alice.token),
        Some(json!({ "quantity": 5, "date": "2024-03-01T12:00:00Z", "note": "Fixed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity"], 80);
    assert_eq!(body["transactions"][0]["prior_quantity"], 5);
    assert_eq!(body["transactions"][0]["note"], "Fixed");

    let (status, body) = send(&app, Method::DELETE, &tx, Some(&alice.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transactions"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::DELETE, &tx, Some(&alice.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn set_overwrites_without_logging() {
    let app = common::app().await;
    let alice = sign_up(&app, "alice").await;
    let gold = format!("/users/{}/gold", alice.id);

    let (status, body) = send(
        &app,
        Method::PUT,
        &gold,
        Some(&alice.token),
        Some(json!({ "quantity": 42 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity"], 42);
    assert!(body["transactions"].as_array().unwrap().is_empty());

    let (status, body) = send(
        &app,
        Method::PUT,
        &gold,
        Some(&alice.token),
        Some(json!({ "quantity": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "quantity");
}

#[tokio::test]
async fn invalid_entry_is_rejected() {
    let app = common::app().await;
    let alice = sign_up(&app, "alice").await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/users/{}/gold", alice.id),
        Some(&alice.token),
        Some(json!({ "quantity": -5, "date": "2024-03-01T12:00:00Z", "note": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<_> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(fields, ["quantity", "note"]);
}

#[tokio::test]
async fn gold_belongs_to_its_owner() {
    let app = common::app().await;
    let alice = sign_up(&app, "alice").await;
    let bob = sign_up(&app, "bob").await;
    let root = admin(&app, "root").await;
    let gold = format!("/users/{}/gold", alice.id);
    let entry = json!({ "quantity": 10, "date": "2024-03-01T12:00:00Z", "note": "Tip" });

    let (status, _) = send(&app, Method::POST, &gold, Some(&bob.token), Some(entry.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, Method::GET, &gold, Some(&bob.token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::POST, &gold, Some(&root.token), Some(entry)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["quantity"], 10);

    let stranger = format!("/users/{}/gold", uuid::Uuid::new_v4());
    let (status, _) = send(&app, Method::GET, &stranger, Some(&root.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
