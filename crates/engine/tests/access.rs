mod common;

use engine::{EngineError, InventoryPatch, NewInventoryLine};

use common::{engine_with_db, entry, item, user};

fn forbidden<T: std::fmt::Debug>(result: Result<T, EngineError>) -> bool {
    matches!(result, Err(EngineError::Forbidden(_)))
}

#[tokio::test]
async fn stranger_cannot_remove_from_inventory() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let bob = user(&engine, "bob").await;
    let x = item(&engine, "X", 1, &alice).await;

    engine.add_to_inventory(alice.id, x.id, 2, &alice).await.unwrap();
    engine.add_to_inventory(alice.id, x.id, 2, &alice).await.unwrap();

    assert!(forbidden(
        engine.remove_from_inventory(alice.id, x.id, &bob).await
    ));

    let inventory = engine.inventory(alice.id, &alice).await.unwrap();
    assert_eq!(inventory.len(), 1);
    assert_eq!(inventory[0].quantity, 4);
}

#[tokio::test]
async fn stranger_cannot_touch_inventory_or_gold() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let bob = user(&engine, "bob").await;
    let x = item(&engine, "X", 1, &alice).await;
    engine.add_to_inventory(alice.id, x.id, 1, &alice).await.unwrap();
    let account = engine
        .record_transaction(alice.id, entry(10, 1, "start"), &alice)
        .await
        .unwrap();
    let tx_id = account.transactions[0].id;

    assert!(forbidden(engine.add_to_inventory(alice.id, x.id, 1, &bob).await));
    assert!(forbidden(
        engine
            .update_inventory_line(
                alice.id,
                x.id,
                InventoryPatch {
                    quantity: Some(9),
                    ..InventoryPatch::default()
                },
                &bob,
            )
            .await
    ));
    assert!(forbidden(
        engine
            .replace_inventory(alice.id, vec![NewInventoryLine::new(x.id, 9)], &bob)
            .await
    ));
    assert!(forbidden(engine.inventory(alice.id, &bob).await));
    assert!(forbidden(engine.set_gold(alice.id, 0, &bob).await));
    assert!(forbidden(
        engine
            .record_transaction(alice.id, entry(0, 2, "steal"), &bob)
            .await
    ));
    assert!(forbidden(
        engine
            .update_transaction(alice.id, tx_id, entry(0, 2, "steal"), &bob)
            .await
    ));
    assert!(forbidden(
        engine.delete_transaction(alice.id, tx_id, &bob).await
    ));
    assert!(forbidden(engine.gold(alice.id, &bob).await));
    assert!(forbidden(
        engine
            .set_profile_picture(alice.id, "http://x/y".to_string(), &bob)
            .await
    ));

    let inventory = engine.inventory(alice.id, &alice).await.unwrap();
    assert_eq!(inventory[0].quantity, 1);
    let account_after = engine.gold(alice.id, &alice).await.unwrap();
    assert_eq!(account_after, account);
}

#[tokio::test]
async fn admin_can_act_for_others() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let root = common::admin(&engine, "root").await;
    let x = item(&engine, "X", 1, &alice).await;

    engine.add_to_inventory(alice.id, x.id, 2, &root).await.unwrap();
    engine.remove_from_inventory(alice.id, x.id, &root).await.unwrap();
    assert!(engine.inventory(alice.id, &alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn usernames_are_unique() {
    let (engine, _db) = engine_with_db().await;
    user(&engine, "alice").await;

    assert!(matches!(
        engine.create_user("alice", "hash", false).await,
        Err(EngineError::ExistingKey(_))
    ));
    let credentials = engine.user_credentials("alice").await.unwrap();
    assert_eq!(credentials.password_hash, "hash");
    assert!(!credentials.user.is_admin);

    let promoted = engine.set_user_admin("alice", true).await.unwrap();
    assert!(promoted.is_admin);
}
