use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, Statement,
    TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Caller, EngineError, FieldErrors, GoldAccount, GoldTransaction, LedgerEdit, LedgerEntry,
    ResultEngine, gold_transactions, users,
    util::{NOTE_MAX_CHARS, non_negative, required_text},
};

use super::{Engine, with_tx};

/// Validate a ledger entry and return it with its note trimmed.
fn validate_entry(entry: LedgerEntry) -> ResultEngine<LedgerEntry> {
    let mut errors = FieldErrors::default();
    non_negative(&mut errors, "quantity", entry.quantity);
    let note = required_text(&mut errors, "note", &entry.note, NOTE_MAX_CHARS);
    errors.into_result()?;
    Ok(LedgerEntry {
        note: note.unwrap_or_default(),
        ..entry
    })
}

fn transaction_not_found(tx_id: i32) -> EngineError {
    EngineError::KeyNotFound(format!("gold transaction {tx_id}"))
}

impl Engine {
    async fn gold_account(
        &self,
        db: &DatabaseTransaction,
        user: &users::Model,
    ) -> ResultEngine<GoldAccount> {
        let quantity = users::Entity::find_by_id(user.id.clone())
            .one(db)
            .await?
            .map_or(user.gold_quantity, |fresh| fresh.gold_quantity);
        let transactions = gold_transactions::Entity::find()
            .filter(gold_transactions::Column::UserId.eq(user.id.clone()))
            .order_by_asc(gold_transactions::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(GoldTransaction::from)
            .collect();
        Ok(GoldAccount {
            quantity,
            transactions,
        })
    }

    async fn write_balance(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        quantity: i64,
    ) -> ResultEngine<()> {
        users::Entity::update_many()
            .col_expr(users::Column::GoldQuantity, Expr::value(quantity))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(user_id.to_string()))
            .exec(db)
            .await?;
        Ok(())
    }

    /// Return a user's gold balance and transaction log.
    pub async fn gold(&self, user_id: Uuid, caller: &Caller) -> ResultEngine<GoldAccount> {
        with_tx!(self, |db_tx| {
            let user = self.require_account(&db_tx, user_id, caller).await?;
            self.gold_account(&db_tx, &user).await
        })
    }

    /// Overwrite the balance without recording a transaction.
    pub async fn set_gold(
        &self,
        user_id: Uuid,
        quantity: i64,
        caller: &Caller,
    ) -> ResultEngine<GoldAccount> {
        if quantity < 0 {
            return Err(EngineError::invalid("quantity", "quantity must be >= 0"));
        }
        with_tx!(self, |db_tx| {
            let user = self.require_account(&db_tx, user_id, caller).await?;
            self.write_balance(&db_tx, &user.id, quantity).await?;
            self.gold_account(&db_tx, &user).await
        })
    }

    /// Apply one change to a user's gold log.
    ///
    /// See [`LedgerEdit`] for what each variant does to the balance.
    pub async fn edit_ledger(
        &self,
        user_id: Uuid,
        edit: LedgerEdit,
        caller: &Caller,
    ) -> ResultEngine<GoldAccount> {
        let edit = match edit {
            LedgerEdit::Append(entry) => LedgerEdit::Append(validate_entry(entry)?),
            LedgerEdit::Amend(tx_id, entry) => LedgerEdit::Amend(tx_id, validate_entry(entry)?),
            remove @ LedgerEdit::Remove(_) => remove,
        };

        with_tx!(self, |db_tx| {
            let user = self.require_account(&db_tx, user_id, caller).await?;
            match edit {
                LedgerEdit::Append(entry) => {
                    // The prior balance is read by the insert itself.
                    let backend = db_tx.get_database_backend();
                    db_tx
                        .execute(Statement::from_sql_and_values(
                            backend,
                            "INSERT INTO gold_transactions (user_id, prior_quantity, date, note) \
                             SELECT id, gold_quantity, ?, ? FROM users WHERE id = ?",
                            vec![entry.date.into(), entry.note.into(), user.id.clone().into()],
                        ))
                        .await?;
                    self.write_balance(&db_tx, &user.id, entry.quantity).await?;
                    tracing::debug!(
                        user_id = %user_id,
                        quantity = entry.quantity,
                        "gold transaction recorded"
                    );
                }
                LedgerEdit::Amend(tx_id, entry) => {
                    let stored = gold_transactions::Entity::find_by_id(tx_id)
                        .filter(gold_transactions::Column::UserId.eq(user.id.clone()))
                        .one(&db_tx)
                        .await?
                        .ok_or_else(|| transaction_not_found(tx_id))?;
                    let mut active: gold_transactions::ActiveModel = stored.into();
                    active.prior_quantity = ActiveValue::Set(entry.quantity);
                    active.date = ActiveValue::Set(entry.date);
                    active.note = ActiveValue::Set(entry.note);
                    active.update(&db_tx).await?;
                }
                LedgerEdit::Remove(tx_id) => {
                    let result = gold_transactions::Entity::delete_many()
                        .filter(gold_transactions::Column::Id.eq(tx_id))
                        .filter(gold_transactions::Column::UserId.eq(user.id.clone()))
                        .exec(&db_tx)
                        .await?;
                    if result.rows_affected == 0 {
                        return Err(transaction_not_found(tx_id));
                    }
                }
            }
            self.gold_account(&db_tx, &user).await
        })
    }

    /// Record a transaction: log the current balance, then move it to
    /// `entry.quantity`.
    pub async fn record_transaction(
        &self,
        user_id: Uuid,
        entry: LedgerEntry,
        caller: &Caller,
    ) -> ResultEngine<GoldAccount> {
        self.edit_ledger(user_id, LedgerEdit::Append(entry), caller)
            .await
    }

    /// Rewrite a logged transaction. The balance is not changed.
    pub async fn update_transaction(
        &self,
        user_id: Uuid,
        tx_id: i32,
        entry: LedgerEntry,
        caller: &Caller,
    ) -> ResultEngine<GoldAccount> {
        self.edit_ledger(user_id, LedgerEdit::Amend(tx_id, entry), caller)
            .await
    }

    /// Drop a logged transaction. The balance is not changed.
    pub async fn delete_transaction(
        &self,
        user_id: Uuid,
        tx_id: i32,
        caller: &Caller,
    ) -> ResultEngine<GoldAccount> {
        self.edit_ledger(user_id, LedgerEdit::Remove(tx_id), caller)
            .await
    }
}
