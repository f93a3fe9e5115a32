//! Command structs for engine operations.
//!
//! These types group the parameters of write operations on the catalog and
//! on inventories, keeping call sites readable.

use uuid::Uuid;

use crate::{CategoryRefs, Rarity};

/// Editable fields of a catalog item, used by both create and update.
#[derive(Clone, Debug)]
pub struct ItemFields {
    pub name: String,
    pub description: String,
    pub categories: CategoryRefs,
    pub value: i64,
    pub rarity: Rarity,
    pub equippable: bool,
    pub private: bool,
}

impl ItemFields {
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            categories: CategoryRefs::none(),
            value: 0,
            rarity: Rarity::Unknown,
            equippable: false,
            private: false,
        }
    }

    #[must_use]
    pub fn categories(mut self, categories: impl Into<CategoryRefs>) -> Self {
        self.categories = categories.into();
        self
    }

    #[must_use]
    pub fn value(mut self, value: i64) -> Self {
        self.value = value;
        self
    }

    #[must_use]
    pub fn rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }

    #[must_use]
    pub fn equippable(mut self, equippable: bool) -> Self {
        self.equippable = equippable;
        self
    }

    #[must_use]
    pub fn private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }
}

#[derive(Clone, Debug)]
pub struct CategoryFields {
    pub name: String,
    pub is_default: bool,
}

impl CategoryFields {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_default: false,
        }
    }

    #[must_use]
    pub fn default_category(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }
}

/// Partial category update; `None` keeps the stored value.
#[derive(Clone, Debug, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub is_default: Option<bool>,
}

/// Partial inventory line update; `None` keeps the stored value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InventoryPatch {
    pub quantity: Option<i64>,
    pub favorite: Option<bool>,
    pub equipped: Option<bool>,
}

impl InventoryPatch {
    pub fn is_empty(&self) -> bool {
        self.quantity.is_none() && self.favorite.is_none() && self.equipped.is_none()
    }
}

/// One line of a bulk inventory replacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NewInventoryLine {
    pub item_id: Uuid,
    pub quantity: i64,
    pub favorite: bool,
    pub equipped: bool,
}

impl NewInventoryLine {
    #[must_use]
    pub fn new(item_id: Uuid, quantity: i64) -> Self {
        Self {
            item_id,
            quantity,
            favorite: false,
            equipped: false,
        }
    }

    #[must_use]
    pub fn favorite(mut self, favorite: bool) -> Self {
        self.favorite = favorite;
        self
    }

    #[must_use]
    pub fn equipped(mut self, equipped: bool) -> Self {
        self.equipped = equipped;
        self
    }
}
