//! Inventory endpoints and ownership rules.

mod common;

use axum::http::{Method, StatusCode};
use common::{admin, create_item, send, sign_up};
use serde_json::json;

#[tokio::test]
async fn owner_adds_and_stranger_is_forbidden() {
    let app = common::app().await;
    let alice = sign_up(&app, "alice").await;
    let bob = sign_up(&app, "bob").await;
    let arrow = create_item(&app, &alice, json!({ "name": "Arrow", "description": "Pointy" })).await;
    let add = format!("/users/{}/inventory/add", alice.id);

    for _ in 0..2 {
        let (status, _) = send(
            &app,
            Method::POST,
            &add,
            Some(&alice.token),
            Some(json!({ "item_id": arrow, "quantity": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/users/{}/inventory/{arrow}", alice.id),
        Some(&bob.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let (status, _) = send(
        &app,
        Method::POST,
        &add,
        Some(&bob.token),
        Some(json!({ "item_id": arrow })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let inventory = format!("/users/{}/inventory", alice.id);
    let (status, body) = send(&app, Method::GET, &inventory, Some(&alice.token), None).await;
    assert_eq!(status, StatusCode::OK);
    let lines = body.as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 4);
    assert_eq!(lines[0]["item"]["name"], "Arrow");

    let (status, _) = send(&app, Method::GET, &inventory, Some(&bob.token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn line_errors_are_distinguished() {
    let app = common::app().await;
    let alice = sign_up(&app, "alice").await;
    let rope = create_item(&app, &alice, json!({ "name": "Rope", "description": "50 ft" })).await;
    let line = format!("/users/{}/inventory/{rope}", alice.id);

    let (status, body) = send(&app, Method::DELETE, &line, Some(&alice.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_in_inventory");

    let missing = format!("/users/{}/inventory/{}", alice.id, uuid::Uuid::new_v4());
    let (status, body) = send(&app, Method::DELETE, &missing, Some(&alice.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/users/{}/inventory/add", alice.id),
        Some(&alice.token),
        Some(json!({ "item_id": rope, "quantity": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "quantity");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/users/{}/inventory/add", alice.id),
        Some(&alice.token),
        Some(json!({ "item_id": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_failed");
    assert_eq!(body["fields"][0]["field"], "body");
}

#[tokio::test]
async fn patch_and_equip() {
    let app = common::app().await;
    let alice = sign_up(&app, "alice").await;
    let sword = create_item(
        &app,
        &alice,
        json!({ "name": "Sword", "description": "Sharp", "equippable": true }),
    )
    .await;
    let rope = create_item(&app, &alice, json!({ "name": "Rope", "description": "50 ft" })).await;
    for item in [sword, rope] {
        send(
            &app,
            Method::POST,
            &format!("/users/{}/inventory/add", alice.id),
            Some(&alice.token),
            Some(json!({ "item_id": item })),
        )
        .await;
    }

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/users/{}/inventory/{sword}", alice.id),
        Some(&alice.token),
        Some(json!({ "equipped": true, "favorite": true, "quantity": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["equipped"], true);
    assert_eq!(body["favorite"], true);
    assert_eq!(body["quantity"], 3);

    let rope_line = format!("/users/{}/inventory/{rope}", alice.id);
    let (status, body) = send(
        &app,
        Method::PUT,
        &rope_line,
        Some(&alice.token),
        Some(json!({ "equipped": true })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "equipped");

    let (status, _) = send(&app, Method::PUT, &rope_line, Some(&alice.token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn replace_and_admin_access() {
    let app = common::app().await;
    let alice = sign_up(&app, "alice").await;
    let root = admin(&app, "root").await;
    let gem = create_item(
        &app,
        &alice,
        json!({ "name": "Gem", "description": "Shiny", "value": 50 }),
    )
    .await;
    let inventory = format!("/users/{}/inventory", alice.id);

    let (status, body) = send(
        &app,
        Method::PUT,
        &inventory,
        Some(&root.token),
        Some(json!({ "lines": [
            { "item_id": gem, "quantity": 1 },
            { "item_id": gem, "quantity": 2, "favorite": true },
        ] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let lines = body.as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 3);
    assert_eq!(lines[0]["favorite"], true);

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/users/{}", alice.id),
        Some(&alice.token),
        None,
    )
    .await;
    assert_eq!(body["net_worth"], 150);

    let (status, body) = send(
        &app,
        Method::PUT,
        &inventory,
        Some(&alice.token),
        Some(json!({ "lines": [{ "item_id": uuid::Uuid::new_v4() }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "items");

    let (_, body) = send(&app, Method::GET, &inventory, Some(&alice.token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}
