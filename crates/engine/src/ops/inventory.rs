use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, Statement,
    TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Caller, EngineError, FieldErrors, InventoryEntry, InventoryPatch, NewInventoryLine,
    ResultEngine, error::map_constraint, inventory_lines, items,
};

use super::{Engine, with_tx};

/// Fold repeated item ids into one line: quantities are summed and flags
/// OR-ed. The first occurrence decides the position.
fn merge_lines(lines: Vec<NewInventoryLine>) -> Vec<NewInventoryLine> {
    let mut merged: Vec<NewInventoryLine> = Vec::with_capacity(lines.len());
    let mut index: HashMap<Uuid, usize> = HashMap::new();
    for line in lines {
        match index.get(&line.item_id) {
            Some(&pos) => {
                let existing = &mut merged[pos];
                existing.quantity = existing.quantity.saturating_add(line.quantity);
                existing.favorite |= line.favorite;
                existing.equipped |= line.equipped;
            }
            None => {
                index.insert(line.item_id, merged.len());
                merged.push(line);
            }
        }
    }
    merged
}

fn not_in_inventory(item_id: Uuid) -> EngineError {
    EngineError::NotInInventory(format!("item {item_id}"))
}

impl Engine {
    async fn inventory_entries(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<Vec<InventoryEntry>> {
        let rows = inventory_lines::Entity::find()
            .filter(inventory_lines::Column::UserId.eq(user_id.to_string()))
            .find_also_related(items::Entity)
            .order_by_asc(Expr::cust("inventory_lines.rowid"))
            .all(db)
            .await?;

        let (lines, models): (Vec<_>, Vec<_>) = rows
            .into_iter()
            .filter_map(|(line, item)| item.map(|item| (line, item)))
            .unzip();
        let items = self.hydrate_items(db, models).await?;

        Ok(lines
            .into_iter()
            .zip(items)
            .map(|(line, item)| InventoryEntry {
                item,
                quantity: line.quantity,
                favorite: line.favorite,
                equipped: line.equipped,
                added_at: line.added_at,
            })
            .collect())
    }

    async fn inventory_entry(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        item_id: Uuid,
    ) -> ResultEngine<InventoryEntry> {
        let line = inventory_lines::Entity::find_by_id((user_id.to_string(), item_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| not_in_inventory(item_id))?;
        let model = items::Entity::find_by_id(line.item_id.clone())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("item not exists".to_string()))?;
        let item = self.hydrate_item(db, model).await?;
        Ok(InventoryEntry {
            item,
            quantity: line.quantity,
            favorite: line.favorite,
            equipped: line.equipped,
            added_at: line.added_at,
        })
    }

    /// Return a user's inventory, oldest line first.
    pub async fn inventory(
        &self,
        user_id: Uuid,
        caller: &Caller,
    ) -> ResultEngine<Vec<InventoryEntry>> {
        with_tx!(self, |db_tx| {
            let user = self.require_account(&db_tx, user_id, caller).await?;
            self.inventory_entries(&db_tx, &user.id).await
        })
    }

    /// Add `quantity` of an item to a user's inventory.
    ///
    /// When the user already holds the item the quantities are summed on the
    /// existing line; a user never has two lines for the same item.
    pub async fn add_to_inventory(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        quantity: i64,
        caller: &Caller,
    ) -> ResultEngine<InventoryEntry> {
        if quantity < 1 {
            return Err(EngineError::invalid("quantity", "quantity must be >= 1"));
        }
        with_tx!(self, |db_tx| {
            let user = self.require_account(&db_tx, user_id, caller).await?;
            let item = self.require_visible_item(&db_tx, item_id, caller).await?;

            let backend = db_tx.get_database_backend();
            // The WHERE skips the update when the sum would leave the i64 range.
            let result = db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "INSERT INTO inventory_lines \
                     (user_id, item_id, quantity, favorite, equipped, added_at) \
                     VALUES (?, ?, ?, ?, ?, ?) \
                     ON CONFLICT(user_id, item_id) \
                     DO UPDATE SET quantity = inventory_lines.quantity + excluded.quantity \
                     WHERE inventory_lines.quantity <= ? - excluded.quantity",
                    vec![
                        user.id.clone().into(),
                        item.id.clone().into(),
                        quantity.into(),
                        false.into(),
                        false.into(),
                        Utc::now().into(),
                        i64::MAX.into(),
                    ],
                ))
                .await
                .map_err(|err| {
                    map_constraint(
                        err,
                        || EngineError::Conflict("inventory line already exists".to_string()),
                        || EngineError::KeyNotFound("item not exists".to_string()),
                    )
                })?;
            if result.rows_affected() == 0 {
                return Err(EngineError::invalid("quantity", "quantity too large"));
            }
            tracing::debug!(
                user_id = %user_id,
                item_id = %item_id,
                quantity,
                "item added to inventory"
            );
            self.inventory_entry(&db_tx, &user.id, item_id).await
        })
    }

    /// Change the quantity, favorite or equipped flag of a held item.
    ///
    /// `KeyNotFound` means the item is not in the catalog, `NotInInventory`
    /// that the user does not hold it.
    pub async fn update_inventory_line(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        patch: InventoryPatch,
        caller: &Caller,
    ) -> ResultEngine<InventoryEntry> {
        if let Some(quantity) = patch.quantity
            && quantity < 0
        {
            return Err(EngineError::invalid("quantity", "quantity must be >= 0"));
        }
        with_tx!(self, |db_tx| {
            let user = self.require_account(&db_tx, user_id, caller).await?;
            let item = items::Entity::find_by_id(item_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("item not exists".to_string()))?;
            let line = inventory_lines::Entity::find_by_id((user.id.clone(), item.id.clone()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| not_in_inventory(item_id))?;

            if patch.equipped == Some(true) && !item.equippable {
                return Err(EngineError::invalid("equipped", "item is not equippable"));
            }

            let mut active: inventory_lines::ActiveModel = line.into();
            if let Some(quantity) = patch.quantity {
                active.quantity = ActiveValue::Set(quantity);
            }
            if let Some(favorite) = patch.favorite {
                active.favorite = ActiveValue::Set(favorite);
            }
            if let Some(equipped) = patch.equipped {
                active.equipped = ActiveValue::Set(equipped);
            }
            if !patch.is_empty() {
                active.update(&db_tx).await?;
            }
            self.inventory_entry(&db_tx, &user.id, item_id).await
        })
    }

    /// Remove an item from a user's inventory.
    ///
    /// `KeyNotFound` means the item is not in the catalog, `NotInInventory`
    /// that the user does not hold it.
    pub async fn remove_from_inventory(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        caller: &Caller,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let user = self.require_account(&db_tx, user_id, caller).await?;
            let item = items::Entity::find_by_id(item_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("item not exists".to_string()))?;

            let result = inventory_lines::Entity::delete_many()
                .filter(inventory_lines::Column::UserId.eq(user.id))
                .filter(inventory_lines::Column::ItemId.eq(item.id))
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(not_in_inventory(item_id));
            }
            tracing::debug!(
                user_id = %user_id,
                item_id = %item_id,
                "item removed from inventory"
            );
            Ok(())
        })
    }

    /// Overwrite a user's whole inventory with `lines`.
    ///
    /// Repeated item ids are merged. Unknown items or a negative quantity
    /// fail validation and leave the inventory untouched.
    pub async fn replace_inventory(
        &self,
        user_id: Uuid,
        lines: Vec<NewInventoryLine>,
        caller: &Caller,
    ) -> ResultEngine<Vec<InventoryEntry>> {
        let mut errors = FieldErrors::default();
        if lines.iter().any(|line| line.quantity < 0) {
            errors.push("quantity", "quantity must be >= 0");
        }
        let lines = merge_lines(lines);

        with_tx!(self, |db_tx| {
            let user = self.require_account(&db_tx, user_id, caller).await?;

            let ids: Vec<String> = lines.iter().map(|l| l.item_id.to_string()).collect();
            let known: HashMap<String, items::Model> = if ids.is_empty() {
                HashMap::new()
            } else {
                items::Entity::find()
                    .filter(items::Column::Id.is_in(ids))
                    .all(&db_tx)
                    .await?
                    .into_iter()
                    .map(|model| (model.id.clone(), model))
                    .collect()
            };
            for line in &lines {
                match known.get(&line.item_id.to_string()) {
                    None => errors.push("items", format!("unknown item {}", line.item_id)),
                    Some(model) if line.equipped && !model.equippable => errors.push(
                        "equipped",
                        format!("item {} is not equippable", line.item_id),
                    ),
                    Some(_) => {}
                }
            }
            errors.into_result()?;

            inventory_lines::Entity::delete_many()
                .filter(inventory_lines::Column::UserId.eq(user.id.clone()))
                .exec(&db_tx)
                .await?;
            let now = Utc::now();
            // One insert per line keeps rowids in request order.
            for line in &lines {
                inventory_lines::ActiveModel {
                    user_id: ActiveValue::Set(user.id.clone()),
                    item_id: ActiveValue::Set(line.item_id.to_string()),
                    quantity: ActiveValue::Set(line.quantity),
                    favorite: ActiveValue::Set(line.favorite),
                    equipped: ActiveValue::Set(line.equipped),
                    added_at: ActiveValue::Set(now),
                }
                .insert(&db_tx)
                .await?;
            }
            tracing::debug!(user_id = %user_id, lines = lines.len(), "inventory replaced");
            self.inventory_entries(&db_tx, &user.id).await
        })
    }
}
