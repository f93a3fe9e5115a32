//! Shared item categories.
//!
//! Names are unique by their normalized key (see
//! [`crate::normalize_category_key`]), so `"Potion"` and `"potion"` cannot
//! both exist.

use std::collections::BTreeSet;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Item, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub owner: Option<Uuid>,
    pub is_default: bool,
}

/// A category with the items that reference it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryDetail {
    pub category: Category,
    pub items: Vec<Item>,
}

/// The set of categories an item belongs to.
///
/// Requests may send no category, one id or a list of ids; all three collapse
/// into this set, and repeated ids count once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryRefs(BTreeSet<Uuid>);

impl CategoryRefs {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.0.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Uuid> {
        self.0.iter()
    }
}

impl From<Uuid> for CategoryRefs {
    fn from(id: Uuid) -> Self {
        Self(BTreeSet::from([id]))
    }
}

impl From<Vec<Uuid>> for CategoryRefs {
    fn from(ids: Vec<Uuid>) -> Self {
        ids.into_iter().collect()
    }
}

impl<T: Into<CategoryRefs>> From<Option<T>> for CategoryRefs {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl FromIterator<Uuid> for CategoryRefs {
    fn from_iter<I: IntoIterator<Item = Uuid>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub name_norm: String,
    pub user_id: Option<String>,
    pub is_default: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Owner,
    #[sea_orm(has_many = "super::item_categories::Entity")]
    ItemCategories,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::item_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemCategories.def()
    }
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        super::item_categories::Relation::Item.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::item_categories::Relation::Category.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Model> for Category {
    type Error = EngineError;

    fn try_from(model: &Model) -> Result<Self, Self::Error> {
        let owner = model
            .user_id
            .as_deref()
            .map(|id| parse_uuid(id, "user"))
            .transpose()?;
        Ok(Self {
            id: parse_uuid(&model.id, "category")?,
            name: model.name.clone(),
            owner,
            is_default: model.is_default,
        })
    }
}
