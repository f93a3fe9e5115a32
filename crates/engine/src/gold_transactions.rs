//! Gold accounts and their transaction log.
//!
//! The balance is `users.gold_quantity`. Every recorded transaction keeps the
//! balance as it was before the change (`prior_quantity`), together with the
//! date and a note. The log is an editable history: entries can be amended
//! or removed afterwards without touching the balance.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GoldTransaction {
    pub id: i32,
    pub prior_quantity: i64,
    pub date: DateTime<Utc>,
    pub note: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GoldAccount {
    pub quantity: i64,
    /// Oldest first.
    pub transactions: Vec<GoldTransaction>,
}

/// The data of one ledger entry as sent by a client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerEntry {
    pub quantity: i64,
    pub date: DateTime<Utc>,
    pub note: String,
}

impl LedgerEntry {
    pub fn new(quantity: i64, date: DateTime<Utc>, note: impl Into<String>) -> Self {
        Self {
            quantity,
            date,
            note: note.into(),
        }
    }
}

/// A change to a gold account's log.
///
/// - `Append`: record a new transaction and move the balance to `quantity`.
/// - `Amend`: rewrite a stored entry in place; `quantity` becomes its
///   `prior_quantity`. The balance is left alone.
/// - `Remove`: drop a stored entry. The balance is left alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerEdit {
    Append(LedgerEntry),
    Amend(i32, LedgerEntry),
    Remove(i32),
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "gold_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: String,
    pub prior_quantity: i64,
    pub date: DateTimeUtc,
    pub note: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for GoldTransaction {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            prior_quantity: model.prior_quantity,
            date: model.date,
            note: model.note,
        }
    }
}
