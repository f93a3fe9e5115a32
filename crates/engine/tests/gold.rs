mod common;

use engine::{EngineError, LedgerEdit};
use uuid::Uuid;

use common::{admin, engine_with_db, entry, user};

#[tokio::test]
async fn new_account_is_empty() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;

    let account = engine.gold(alice.id, &alice).await.unwrap();
    assert_eq!(account.quantity, 0);
    assert!(account.transactions.is_empty());
}

#[tokio::test]
async fn record_logs_the_prior_balance() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    engine.set_gold(alice.id, 40, &alice).await.unwrap();

    let account = engine
        .record_transaction(alice.id, entry(100, 1, "  sold loot "), &alice)
        .await
        .unwrap();
    assert_eq!(account.quantity, 100);
    assert_eq!(account.transactions.len(), 1);
    assert_eq!(account.transactions[0].prior_quantity, 40);
    assert_eq!(account.transactions[0].note, "sold loot");

    let account = engine
        .record_transaction(alice.id, entry(70, 2, "bought rope"), &alice)
        .await
        .unwrap();
    assert_eq!(account.quantity, 70);
    let priors: Vec<_> = account
        .transactions
        .iter()
        .map(|t| t.prior_quantity)
        .collect();
    assert_eq!(priors, vec![40, 100]);
}

#[tokio::test]
async fn set_gold_does_not_log() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;

    let account = engine.set_gold(alice.id, 12, &alice).await.unwrap();
    assert_eq!(account.quantity, 12);
    assert!(account.transactions.is_empty());

    assert!(matches!(
        engine.set_gold(alice.id, -1, &alice).await,
        Err(EngineError::Validation(_))
    ));
}

#[tokio::test]
async fn invalid_entries_change_nothing() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;

    for bad in [entry(-5, 1, "note"), entry(5, 1, "   "), entry(5, 1, &"n".repeat(101))] {
        assert!(matches!(
            engine.record_transaction(alice.id, bad, &alice).await,
            Err(EngineError::Validation(_))
        ));
    }
    let account = engine.gold(alice.id, &alice).await.unwrap();
    assert_eq!(account.quantity, 0);
    assert!(account.transactions.is_empty());
}

#[tokio::test]
async fn amend_rewrites_entry_but_not_balance() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let account = engine
        .record_transaction(alice.id, entry(30, 1, "first"), &alice)
        .await
        .unwrap();
    let tx_id = account.transactions[0].id;

    let account = engine
        .update_transaction(alice.id, tx_id, entry(999, 5, "fixed"), &alice)
        .await
        .unwrap();
    assert_eq!(account.quantity, 30);
    assert_eq!(account.transactions[0].id, tx_id);
    assert_eq!(account.transactions[0].prior_quantity, 999);
    assert_eq!(account.transactions[0].note, "fixed");
    assert_eq!(account.transactions[0].date, entry(0, 5, "x").date);
}

#[tokio::test]
async fn delete_leaves_other_entries_untouched() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    for (quantity, day) in [(10, 1), (20, 2), (30, 3)] {
        engine
            .record_transaction(alice.id, entry(quantity, day, "tx"), &alice)
            .await
            .unwrap();
    }
    let before = engine.gold(alice.id, &alice).await.unwrap();
    let middle = before.transactions[1].id;

    let after = engine
        .delete_transaction(alice.id, middle, &alice)
        .await
        .unwrap();
    assert_eq!(after.quantity, 30);
    assert_eq!(
        after.transactions,
        vec![before.transactions[0].clone(), before.transactions[2].clone()]
    );
}

#[tokio::test]
async fn deleted_transaction_is_gone_for_update_and_delete() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let account = engine
        .record_transaction(alice.id, entry(10, 1, "tx"), &alice)
        .await
        .unwrap();
    let tx_id = account.transactions[0].id;

    engine
        .delete_transaction(alice.id, tx_id, &alice)
        .await
        .unwrap();

    assert!(matches!(
        engine.delete_transaction(alice.id, tx_id, &alice).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine
            .update_transaction(alice.id, tx_id, entry(1, 1, "again"), &alice)
            .await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn transactions_of_other_users_are_not_reachable() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let bob = user(&engine, "bob").await;
    let account = engine
        .record_transaction(alice.id, entry(10, 1, "alice"), &alice)
        .await
        .unwrap();
    let tx_id = account.transactions[0].id;

    assert!(matches!(
        engine
            .edit_ledger(bob.id, LedgerEdit::Remove(tx_id), &bob)
            .await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert_eq!(
        engine.gold(alice.id, &alice).await.unwrap().transactions.len(),
        1
    );
}

#[tokio::test]
async fn admin_can_edit_any_account() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let root = admin(&engine, "root").await;

    let account = engine
        .edit_ledger(alice.id, LedgerEdit::Append(entry(5, 1, "gift")), &root)
        .await
        .unwrap();
    assert_eq!(account.quantity, 5);
    assert!(matches!(
        engine.gold(Uuid::new_v4(), &root).await,
        Err(EngineError::KeyNotFound(_))
    ));
}
