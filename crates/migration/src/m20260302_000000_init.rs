//! Initial schema migration.
//!
//! It creates the catalog and the per-user state:
//!
//! - `users`: credentials, admin flag and the current gold balance
//! - `categories`: shared item categories (unique normalized name)
//! - `items`: catalog items
//! - `item_categories`: many-to-many link between items and categories
//! - `inventory_lines`: what each user holds, one row per (user, item)
//!
//! Referential integrity between inventories, items and categories is enforced
//! with `RESTRICT` foreign keys so that a concurrent delete can never leave a
//! dangling reference behind.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    Password,
    Admin,
    GoldQuantity,
    ProfilePicture,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    NameNorm,
    UserId,
    IsDefault,
}

#[derive(Iden)]
enum Items {
    Table,
    Id,
    Name,
    Description,
    Value,
    Rarity,
    Equippable,
    Private,
    CreatorId,
    Picture,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ItemCategories {
    Table,
    ItemId,
    CategoryId,
}

#[derive(Iden)]
enum InventoryLines {
    Table,
    UserId,
    ItemId,
    Quantity,
    Favorite,
    Equipped,
    AddedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string().not_null())
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(
                        ColumnDef::new(Users::Admin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::GoldQuantity)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Users::GoldQuantity).gte(0)),
                    )
                    .col(ColumnDef::new(Users::ProfilePicture).string())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-username-unique")
                    .table(Users::Table)
                    .col(Users::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::NameNorm).string().not_null())
                    .col(ColumnDef::new(Categories::UserId).string())
                    .col(
                        ColumnDef::new(Categories::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categories-user_id")
                            .from(Categories::Table, Categories::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-name_norm-unique")
                    .table(Categories::Table)
                    .col(Categories::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Items::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Items::Name).string().not_null())
                    .col(ColumnDef::new(Items::Description).text().not_null())
                    .col(
                        ColumnDef::new(Items::Value)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Items::Value).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Items::Rarity)
                            .string()
                            .not_null()
                            .default("unknown"),
                    )
                    .col(
                        ColumnDef::new(Items::Equippable)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Items::Private).boolean().not_null())
                    .col(ColumnDef::new(Items::CreatorId).string())
                    .col(ColumnDef::new(Items::Picture).string())
                    .col(ColumnDef::new(Items::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Items::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-items-creator_id")
                            .from(Items::Table, Items::CreatorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-items-name")
                    .table(Items::Table)
                    .col(Items::Name)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Item ↔ Category links
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ItemCategories::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ItemCategories::ItemId).string().not_null())
                    .col(
                        ColumnDef::new(ItemCategories::CategoryId)
                            .string()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ItemCategories::ItemId)
                            .col(ItemCategories::CategoryId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-item_categories-item_id")
                            .from(ItemCategories::Table, ItemCategories::ItemId)
                            .to(Items::Table, Items::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-item_categories-category_id")
                            .from(ItemCategories::Table, ItemCategories::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-item_categories-category_id")
                    .table(ItemCategories::Table)
                    .col(ItemCategories::CategoryId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Inventory lines
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(InventoryLines::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(InventoryLines::UserId).string().not_null())
                    .col(ColumnDef::new(InventoryLines::ItemId).string().not_null())
                    .col(
                        ColumnDef::new(InventoryLines::Quantity)
                            .big_integer()
                            .not_null()
                            .default(1)
                            .check(Expr::col(InventoryLines::Quantity).gte(0)),
                    )
                    .col(
                        ColumnDef::new(InventoryLines::Favorite)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(InventoryLines::Equipped)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(InventoryLines::AddedAt)
                            .timestamp()
                            .not_null(),
                    )
                    // One line per (user, item): the add-or-merge upsert relies on it.
                    .primary_key(
                        Index::create()
                            .col(InventoryLines::UserId)
                            .col(InventoryLines::ItemId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-inventory_lines-user_id")
                            .from(InventoryLines::Table, InventoryLines::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-inventory_lines-item_id")
                            .from(InventoryLines::Table, InventoryLines::ItemId)
                            .to(Items::Table, Items::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-inventory_lines-item_id")
                    .table(InventoryLines::Table)
                    .col(InventoryLines::ItemId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(InventoryLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ItemCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Items::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
