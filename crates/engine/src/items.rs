//! Catalog items.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Category, EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
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

impl Rarity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::VeryRare => "very_rare",
            Self::Legendary => "legendary",
        }
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Common => "Common",
            Self::Uncommon => "Uncommon",
            Self::Rare => "Rare",
            Self::VeryRare => "Very Rare",
            Self::Legendary => "Legendary",
        }
    }
}

impl TryFrom<&str> for Rarity {
    type Error = EngineError;

    /// Accepts both the storage form (`very_rare`) and the label
    /// (`Very Rare`), case-insensitively.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let key = value.trim().to_lowercase().replace([' ', '-'], "_");
        match key.as_str() {
            "unknown" => Ok(Self::Unknown),
            "common" => Ok(Self::Common),
            "uncommon" => Ok(Self::Uncommon),
            "rare" => Ok(Self::Rare),
            "very_rare" => Ok(Self::VeryRare),
            "legendary" => Ok(Self::Legendary),
            _ => Err(EngineError::invalid(
                "rarity",
                format!("invalid rarity: {value}"),
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub categories: Vec<Category>,
    pub value: i64,
    pub rarity: Rarity,
    pub equippable: bool,
    pub private: bool,
    pub creator: Option<Uuid>,
    pub picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    pub(crate) fn from_model(model: Model, categories: Vec<Category>) -> ResultEngine<Self> {
        let creator = model
            .creator_id
            .as_deref()
            .map(|id| parse_uuid(id, "creator"))
            .transpose()?;
        Ok(Self {
            id: parse_uuid(&model.id, "item")?,
            name: model.name,
            description: model.description,
            categories,
            value: model.value,
            rarity: Rarity::try_from(model.rarity.as_str())?,
            equippable: model.equippable,
            private: model.private,
            creator,
            picture: model.picture,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub value: i64,
    pub rarity: String,
    pub equippable: bool,
    pub private: bool,
    pub creator_id: Option<String>,
    pub picture: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatorId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Creator,
    #[sea_orm(has_many = "super::item_categories::Entity")]
    ItemCategories,
    #[sea_orm(has_many = "super::inventory_lines::Entity")]
    InventoryLines,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::item_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemCategories.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        super::item_categories::Relation::Category.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::item_categories::Relation::Item.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Item> for ActiveModel {
    fn from(item: &Item) -> Self {
        Self {
            id: ActiveValue::Set(item.id.to_string()),
            name: ActiveValue::Set(item.name.clone()),
            description: ActiveValue::Set(item.description.clone()),
            value: ActiveValue::Set(item.value),
            rarity: ActiveValue::Set(item.rarity.as_str().to_string()),
            equippable: ActiveValue::Set(item.equippable),
            private: ActiveValue::Set(item.private),
            creator_id: ActiveValue::Set(item.creator.map(|id| id.to_string())),
            picture: ActiveValue::Set(item.picture.clone()),
            created_at: ActiveValue::Set(item.created_at),
            updated_at: ActiveValue::Set(item.updated_at),
        }
    }
}
