//! Engine values to wire types.

use api_types::{
    Rarity,
    category::{CategoryDetail, CategoryInput, CategoryView},
    gold::{GoldAccount, GoldTransaction},
    inventory::InventoryEntry,
    item::ItemView,
    user::{UserProfile, UserView},
};
use engine::CategoryRefs;

pub(crate) fn rarity_in(rarity: Rarity) -> engine::Rarity {
    match rarity {
        Rarity::Unknown => engine::Rarity::Unknown,
        Rarity::Common => engine::Rarity::Common,
        Rarity::Uncommon => engine::Rarity::Uncommon,
        Rarity::Rare => engine::Rarity::Rare,
        Rarity::VeryRare => engine::Rarity::VeryRare,
        Rarity::Legendary => engine::Rarity::Legendary,
    }
}

fn rarity_out(rarity: engine::Rarity) -> Rarity {
    match rarity {
        engine::Rarity::Unknown => Rarity::Unknown,
        engine::Rarity::Common => Rarity::Common,
        engine::Rarity::Uncommon => Rarity::Uncommon,
        engine::Rarity::Rare => Rarity::Rare,
        engine::Rarity::VeryRare => Rarity::VeryRare,
        engine::Rarity::Legendary => Rarity::Legendary,
    }
}

/// Absent, one id or a list of ids, as a set.
pub(crate) fn category_refs(input: Option<CategoryInput>) -> CategoryRefs {
    match input {
        None => CategoryRefs::none(),
        Some(CategoryInput::One(id)) => CategoryRefs::from(id),
        Some(CategoryInput::Many(ids)) => CategoryRefs::from(ids),
    }
}

pub(crate) fn category(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        owner: category.owner,
        is_default: category.is_default,
    }
}

pub(crate) fn category_detail(detail: engine::CategoryDetail) -> CategoryDetail {
    CategoryDetail {
        category: category(detail.category),
        items: detail.items.into_iter().map(item).collect(),
    }
}

pub(crate) fn item(item: engine::Item) -> ItemView {
    ItemView {
        id: item.id,
        name: item.name,
        description: item.description,
        categories: item.categories.into_iter().map(category).collect(),
        value: item.value,
        rarity: rarity_out(item.rarity),
        equippable: item.equippable,
        private: item.private,
        creator: item.creator,
        picture: item.picture,
        created_at: item.created_at,
        updated_at: item.updated_at,
    }
}

pub(crate) fn inventory_entry(entry: engine::InventoryEntry) -> InventoryEntry {
    InventoryEntry {
        item: item(entry.item),
        quantity: entry.quantity,
        favorite: entry.favorite,
        equipped: entry.equipped,
        added_at: entry.added_at,
    }
}

pub(crate) fn gold_account(account: engine::GoldAccount) -> GoldAccount {
    GoldAccount {
        quantity: account.quantity,
        transactions: account
            .transactions
            .into_iter()
            .map(|tx| GoldTransaction {
                id: tx.id,
                prior_quantity: tx.prior_quantity,
                date: tx.date,
                note: tx.note,
            })
            .collect(),
    }
}

pub(crate) fn user(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        username: user.username,
        is_admin: user.is_admin,
        profile_picture: user.profile_picture,
        created_at: user.created_at,
    }
}

pub(crate) fn user_profile(profile: engine::UserProfile) -> UserProfile {
    UserProfile {
        user: user(profile.user),
        net_worth: profile.net_worth,
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn category_input_normalization() {
        let a = Uuid::new_v4();
        assert!(category_refs(None).is_empty());
        assert_eq!(category_refs(Some(CategoryInput::One(a))).len(), 1);
        assert_eq!(
            category_refs(Some(CategoryInput::Many(vec![a, a]))),
            CategoryRefs::from(a)
        );
        assert!(category_refs(Some(CategoryInput::Many(Vec::new()))).is_empty());
    }

    #[test]
    fn rarity_maps_both_ways() {
        for rarity in [Rarity::Unknown, Rarity::VeryRare, Rarity::Legendary] {
            assert_eq!(rarity_out(rarity_in(rarity)), rarity);
        }
    }
}
