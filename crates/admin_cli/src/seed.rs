//! Sample catalog for a fresh database.
//!
//! Seeding is idempotent: categories and items that already exist by name are
//! left alone, and gold is only granted to an account with an empty log.

use std::collections::HashSet;

use chrono::Utc;
use engine::{
    Caller, CategoryFields, Engine, EngineError, InventoryPatch, ItemFields, LedgerEntry, Rarity,
};
use uuid::Uuid;

const CATEGORIES: [&str; 4] = ["Weapon", "Potion", "Armor", "Magic"];

const STARTING_GOLD: i64 = 200;

struct SampleItem {
    name: &'static str,
    description: &'static str,
    categories: &'static [&'static str],
    quantity: i64,
    value: i64,
    rarity: Rarity,
    equippable: bool,
    equipped: bool,
}

const ITEMS: &[SampleItem] = &[
    SampleItem {
        name: "Adamantine Armor",
        description: "This suit of armor is reinforced with adamantine, one of the hardest \
                      substances in existence. While you're wearing it, any critical hit \
                      against you becomes a normal hit.",
        categories: &["Armor", "Magic"],
        quantity: 1,
        value: 500,
        rarity: Rarity::Uncommon,
        equippable: true,
        equipped: true,
    },
    SampleItem {
        name: "Potion of Healing (Greater)",
        description: "You regain 4d4 + 4 hit points when you drink this potion. The potion's \
                      red liquid glimmers when agitated.",
        categories: &["Potion"],
        quantity: 3,
        value: 100,
        rarity: Rarity::Uncommon,
        equippable: false,
        equipped: false,
    },
    SampleItem {
        name: "Potion of Water Breathing",
        description: "You can breathe underwater for 1 hour after drinking this potion. Its \
                      cloudy green fluid smells of the sea and has a jellyfish-like bubble \
                      floating in it.",
        categories: &["Potion"],
        quantity: 1,
        value: 200,
        rarity: Rarity::Uncommon,
        equippable: false,
        equipped: false,
    },
    SampleItem {
        name: "Battleaxe",
        description: "1d8 slashing. Proficiency with a battleaxe allows you to add your \
                      proficiency bonus to the attack roll for any attack you make with it.",
        categories: &["Weapon"],
        quantity: 1,
        value: 10,
        rarity: Rarity::Common,
        equippable: true,
        equipped: true,
    },
    SampleItem {
        name: "Dagger",
        description: "1d4 piercing. Proficiency with a dagger allows you to add your \
                      proficiency bonus to the attack roll for any attack you make with it.",
        categories: &["Weapon"],
        quantity: 1,
        value: 2,
        rarity: Rarity::Common,
        equippable: true,
        equipped: false,
    },
    SampleItem {
        name: "Spiked Armor",
        description: "14 + Dex modifier (max 2) AC. Stealth: Disadvantage. Spiked armor is a \
                      rare type of medium armor made by dwarves. It consists of a leather coat \
                      and leggings covered with spikes that are usually made of metal.",
        categories: &["Armor"],
        quantity: 1,
        value: 75,
        rarity: Rarity::Rare,
        equippable: true,
        equipped: false,
    },
    SampleItem {
        name: "Ring of Invisibility",
        description: "While wearing this ring, you can turn invisible as an action. Anything \
                      you are wearing or carrying is invisible with you.",
        categories: &["Magic"],
        quantity: 1,
        value: 1000,
        rarity: Rarity::Legendary,
        equippable: true,
        equipped: false,
    },
    SampleItem {
        name: "Arrows",
        description: "Arrows are used with a weapon that has the ammunition property to make \
                      a ranged attack. Each time you attack with the weapon, you expend one \
                      piece of ammunition.",
        categories: &["Weapon"],
        quantity: 50,
        value: 1,
        rarity: Rarity::Common,
        equippable: false,
        equipped: false,
    },
];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: usize,
    pub items: usize,
    pub gold: bool,
}

async fn category_id(
    engine: &Engine,
    name: &str,
    caller: &Caller,
    report: &mut SeedReport,
) -> Result<Uuid, EngineError> {
    if let Some(category) = engine.category_by_name(name).await? {
        return Ok(category.id);
    }
    let category = engine
        .create_category(CategoryFields::new(name).default_category(true), caller)
        .await?;
    report.categories += 1;
    Ok(category.id)
}

/// Fill the catalog, the inventory and the gold account of `admin`.
pub async fn seed(engine: &Engine, admin: &str) -> Result<SeedReport, EngineError> {
    let user = engine.user_credentials(admin).await?.user;
    if !user.is_admin {
        return Err(EngineError::Forbidden(format!("{admin} is not an admin")));
    }
    let caller = Caller::admin(user.id);
    let mut report = SeedReport::default();

    let mut ids = Vec::with_capacity(CATEGORIES.len());
    for name in CATEGORIES {
        ids.push((name, category_id(engine, name, &caller, &mut report).await?));
    }

    let existing: HashSet<String> = engine
        .list_items(&caller)
        .await?
        .into_iter()
        .map(|item| item.name)
        .collect();

    for sample in ITEMS.iter().filter(|s| !existing.contains(s.name)) {
        let categories: Vec<Uuid> = ids
            .iter()
            .filter(|(name, _)| sample.categories.contains(name))
            .map(|(_, id)| *id)
            .collect();
        let item = engine
            .create_item(
                ItemFields::new(sample.name, sample.description)
                    .categories(categories)
                    .value(sample.value)
                    .rarity(sample.rarity)
                    .equippable(sample.equippable),
                &caller,
            )
            .await?;
        engine
            .add_to_inventory(user.id, item.id, sample.quantity, &caller)
            .await?;
        if sample.equipped {
            let patch = InventoryPatch {
                equipped: Some(true),
                ..InventoryPatch::default()
            };
            engine
                .update_inventory_line(user.id, item.id, patch, &caller)
                .await?;
        }
        report.items += 1;
    }

    if engine.gold(user.id, &caller).await?.transactions.is_empty() {
        engine
            .record_transaction(
                user.id,
                LedgerEntry::new(STARTING_GOLD, Utc::now(), "Initial quantity"),
                &caller,
            )
            .await?;
        report.gold = true;
    }

    Ok(report)
}
