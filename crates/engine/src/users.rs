//! Users table.
//!
//! A user row also carries the current gold balance; the balance history is in
//! [`crate::GoldTransaction`].

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub is_admin: bool,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// What the token service needs to log a user in.
#[derive(Clone, Debug)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Public profile. `net_worth` is only present when the caller may act on
/// the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub user: User,
    pub net_worth: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub username: String,
    pub password: String,
    pub admin: bool,
    pub gold_quantity: i64,
    pub profile_picture: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::inventory_lines::Entity")]
    InventoryLines,
    #[sea_orm(has_many = "super::gold_transactions::Entity")]
    GoldTransactions,
}

impl Related<super::inventory_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryLines.def()
    }
}

impl Related<super::gold_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GoldTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Model> for User {
    type Error = EngineError;

    fn try_from(model: &Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "user")?,
            username: model.username.clone(),
            is_admin: model.admin,
            profile_picture: model.profile_picture.clone(),
            created_at: model.created_at,
        })
    }
}
