use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    #[default]
    Unknown,
    Common,
    Uncommon,
    Rare,
    VeryRare,
    Legendary,
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SignUp {
        pub username: String,
        pub password: String,
        pub confirm_password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LogIn {
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuthResponse {
        /// Bearer token to send in the `Authorization` header.
        pub token: String,
        pub user: user::UserView,
    }
}

pub mod user {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub username: String,
        pub is_admin: bool,
        pub profile_picture: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserProfile {
        pub user: UserView,
        /// Only present for the user themselves and for admins.
        #[serde(skip_serializing_if = "Option::is_none")]
        pub net_worth: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PictureUpdated {
        pub url: String,
    }
}

pub mod category {
    use super::*;

    /// Categories of an item as sent by clients: a single id or a list.
    ///
    /// Leaving the field out means no category.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum CategoryInput {
        One(Uuid),
        Many(Vec<Uuid>),
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        #[serde(default)]
        pub is_default: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        pub is_default: Option<bool>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub owner: Option<Uuid>,
        pub is_default: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryDetail {
        pub category: CategoryView,
        pub items: Vec<item::ItemView>,
    }
}

pub mod item {
    use super::*;

    /// Body of item create and update.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemNew {
        pub name: String,
        pub description: String,
        #[serde(default)]
        pub category: Option<category::CategoryInput>,
        #[serde(default)]
        pub value: i64,
        #[serde(default)]
        pub rarity: Rarity,
        #[serde(default)]
        pub equippable: bool,
        #[serde(default)]
        pub private: bool,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ItemView {
        pub id: Uuid,
        pub name: String,
        pub description: String,
        pub categories: Vec<category::CategoryView>,
        pub value: i64,
        pub rarity: Rarity,
        pub equippable: bool,
        pub private: bool,
        pub creator: Option<Uuid>,
        pub picture: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CatalogCounts {
        pub items: u64,
        pub categories: u64,
    }
}

pub mod inventory {
    use super::*;

    fn one() -> i64 {
        1
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InventoryAdd {
        pub item_id: Uuid,
        #[serde(default = "one")]
        pub quantity: i64,
    }

    /// Partial update of a held item; missing fields are left unchanged.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct InventoryPatch {
        pub quantity: Option<i64>,
        pub favorite: Option<bool>,
        pub equipped: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InventoryLine {
        pub item_id: Uuid,
        #[serde(default = "one")]
        pub quantity: i64,
        #[serde(default)]
        pub favorite: bool,
        #[serde(default)]
        pub equipped: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InventoryReplace {
        pub lines: Vec<InventoryLine>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InventoryEntry {
        pub item: item::ItemView,
        pub quantity: i64,
        pub favorite: bool,
        pub equipped: bool,
        pub added_at: DateTime<Utc>,
    }
}

pub mod gold {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoldSet {
        pub quantity: i64,
    }

    /// A ledger entry. For a new transaction `quantity` is the new balance;
    /// for an amended one it replaces the stored prior balance.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoldEntry {
        pub quantity: i64,
        /// RFC3339 timestamp with offset.
        pub date: DateTime<FixedOffset>,
        pub note: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoldTransaction {
        pub id: i32,
        pub prior_quantity: i64,
        pub date: DateTime<Utc>,
        pub note: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoldAccount {
        pub quantity: i64,
        pub transactions: Vec<GoldTransaction>,
    }
}

pub mod error {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FieldError {
        pub field: String,
        pub message: String,
    }

    /// JSON body of every error response.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ErrorBody {
        pub error: String,
        /// Machine readable kind, e.g. `not_found` or `validation_failed`.
        pub code: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub fields: Option<Vec<FieldError>>,
    }
}
