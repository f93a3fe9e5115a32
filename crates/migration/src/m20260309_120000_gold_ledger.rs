//! Gold transaction log.
//!
//! The current balance lives in `users.gold_quantity`; this table keeps the
//! history. Entries are identified by an auto-increment id which also gives
//! the log order.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum GoldTransactions {
    Table,
    Id,
    UserId,
    PriorQuantity,
    Date,
    Note,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GoldTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GoldTransactions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GoldTransactions::UserId).string().not_null())
                    .col(
                        ColumnDef::new(GoldTransactions::PriorQuantity)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GoldTransactions::Date).timestamp().not_null())
                    .col(ColumnDef::new(GoldTransactions::Note).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-gold_transactions-user_id")
                            .from(GoldTransactions::Table, GoldTransactions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-gold_transactions-user_id")
                    .table(GoldTransactions::Table)
                    .col(GoldTransactions::UserId)
                    .col(GoldTransactions::Id)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GoldTransactions::Table).to_owned())
            .await?;
        Ok(())
    }
}
