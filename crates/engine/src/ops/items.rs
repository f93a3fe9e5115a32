use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, ConnectionTrait, DatabaseTransaction, PaginatorTrait, QueryFilter,
    QueryOrder, Statement, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Caller, Category, CategoryRefs, EngineError, FieldErrors, Item, ItemFields, ResultEngine,
    can_act, categories,
    error::map_constraint,
    item_categories, items,
    util::{DESCRIPTION_MAX_CHARS, NAME_MAX_CHARS, non_negative, parse_uuid, required_text},
};

use super::{Engine, access::require_can_act, with_tx};

/// Item fields after trimming, ready to be stored.
struct ValidItem {
    name: String,
    description: String,
}

/// Check the fields that need no database access, collecting every failure.
fn validate_item_fields(fields: &ItemFields, errors: &mut FieldErrors) -> Option<ValidItem> {
    let name = required_text(errors, "name", &fields.name, NAME_MAX_CHARS);
    let description = required_text(
        errors,
        "description",
        &fields.description,
        DESCRIPTION_MAX_CHARS,
    );
    non_negative(errors, "value", fields.value);
    Some(ValidItem {
        name: name?,
        description: description?,
    })
}

/// Items not flagged private, plus the caller's own. Admins see everything.
pub(super) fn visible_to(caller: &Caller) -> Condition {
    if caller.is_admin {
        return Condition::all();
    }
    Condition::any()
        .add(items::Column::Private.eq(false))
        .add(items::Column::CreatorId.eq(caller.id.to_string()))
}

pub(super) fn is_visible(model: &items::Model, caller: &Caller) -> bool {
    if !model.private {
        return true;
    }
    let creator = model
        .creator_id
        .as_deref()
        .and_then(|id| Uuid::parse_str(id).ok());
    can_act(caller, creator)
}

fn item_owner(model: &items::Model) -> ResultEngine<Option<Uuid>> {
    model
        .creator_id
        .as_deref()
        .map(|id| parse_uuid(id, "creator"))
        .transpose()
}

impl Engine {
    /// Look up an item the caller is allowed to see.
    ///
    /// A private item of somebody else is reported as missing.
    pub(super) async fn require_visible_item(
        &self,
        db: &DatabaseTransaction,
        item_id: Uuid,
        caller: &Caller,
    ) -> ResultEngine<items::Model> {
        items::Entity::find_by_id(item_id.to_string())
            .one(db)
            .await?
            .filter(|model| is_visible(model, caller))
            .ok_or_else(|| EngineError::KeyNotFound("item not exists".to_string()))
    }

    /// Categories of every item in `item_ids`, keyed by item id and sorted by
    /// name.
    pub(super) async fn categories_by_item(
        &self,
        db: &DatabaseTransaction,
        item_ids: Vec<String>,
    ) -> ResultEngine<HashMap<String, Vec<Category>>> {
        let mut out: HashMap<String, Vec<Category>> = HashMap::new();
        if item_ids.is_empty() {
            return Ok(out);
        }
        let rows = item_categories::Entity::find()
            .filter(item_categories::Column::ItemId.is_in(item_ids))
            .find_also_related(categories::Entity)
            .order_by_asc(categories::Column::Name)
            .all(db)
            .await?;
        for (link, category) in rows {
            if let Some(category) = category {
                out.entry(link.item_id)
                    .or_default()
                    .push(Category::try_from(&category)?);
            }
        }
        Ok(out)
    }

    /// Turn item rows into domain items, attaching their categories.
    pub(super) async fn hydrate_items(
        &self,
        db: &DatabaseTransaction,
        models: Vec<items::Model>,
    ) -> ResultEngine<Vec<Item>> {
        let ids = models.iter().map(|m| m.id.clone()).collect();
        let mut categories = self.categories_by_item(db, ids).await?;
        models
            .into_iter()
            .map(|model| {
                let cats = categories.remove(&model.id).unwrap_or_default();
                Item::from_model(model, cats)
            })
            .collect()
    }

    pub(super) async fn hydrate_item(
        &self,
        db: &DatabaseTransaction,
        model: items::Model,
    ) -> ResultEngine<Item> {
        let mut items = self.hydrate_items(db, vec![model]).await?;
        items
            .pop()
            .ok_or_else(|| EngineError::KeyNotFound("item not exists".to_string()))
    }

    /// Record a `category` error when a referenced id does not exist.
    async fn check_categories(
        &self,
        db: &DatabaseTransaction,
        refs: &CategoryRefs,
        errors: &mut FieldErrors,
    ) -> ResultEngine<()> {
        if refs.is_empty() {
            return Ok(());
        }
        let ids: Vec<String> = refs.iter().map(ToString::to_string).collect();
        let found = categories::Entity::find()
            .filter(categories::Column::Id.is_in(ids.clone()))
            .count(db)
            .await?;
        if found != ids.len() as u64 {
            errors.push("category", "unknown category");
        }
        Ok(())
    }

    async fn link_categories(
        &self,
        db: &DatabaseTransaction,
        item_id: &str,
        refs: &CategoryRefs,
    ) -> ResultEngine<()> {
        item_categories::Entity::delete_many()
            .filter(item_categories::Column::ItemId.eq(item_id.to_string()))
            .exec(db)
            .await?;
        if refs.is_empty() {
            return Ok(());
        }
        let links = refs.iter().map(|category_id| item_categories::ActiveModel {
            item_id: ActiveValue::Set(item_id.to_string()),
            category_id: ActiveValue::Set(category_id.to_string()),
        });
        item_categories::Entity::insert_many(links)
            .exec(db)
            .await
            .map_err(|err| {
                map_constraint(
                    err,
                    || EngineError::invalid("category", "duplicate category"),
                    || EngineError::invalid("category", "unknown category"),
                )
            })?;
        Ok(())
    }

    /// Return a catalog item.
    pub async fn item(&self, item_id: Uuid, caller: &Caller) -> ResultEngine<Item> {
        with_tx!(self, |db_tx| {
            let model = self.require_visible_item(&db_tx, item_id, caller).await?;
            self.hydrate_item(&db_tx, model).await
        })
    }

    /// Return every item the caller can see, sorted by name.
    pub async fn list_items(&self, caller: &Caller) -> ResultEngine<Vec<Item>> {
        with_tx!(self, |db_tx| {
            let models = items::Entity::find()
                .filter(visible_to(caller))
                .order_by_asc(items::Column::Name)
                .all(&db_tx)
                .await?;
            self.hydrate_items(&db_tx, models).await
        })
    }

    /// Return the equippable items the caller can see, sorted by name.
    pub async fn list_equippable_items(&self, caller: &Caller) -> ResultEngine<Vec<Item>> {
        with_tx!(self, |db_tx| {
            let models = items::Entity::find()
                .filter(visible_to(caller))
                .filter(items::Column::Equippable.eq(true))
                .order_by_asc(items::Column::Name)
                .all(&db_tx)
                .await?;
            self.hydrate_items(&db_tx, models).await
        })
    }

    /// Add a new item to the catalog. The caller becomes its creator.
    pub async fn create_item(&self, fields: ItemFields, caller: &Caller) -> ResultEngine<Item> {
        let mut errors = FieldErrors::default();
        let valid = validate_item_fields(&fields, &mut errors);
        with_tx!(self, |db_tx| {
            self.check_categories(&db_tx, &fields.categories, &mut errors)
                .await?;
            errors.into_result()?;
            let Some(valid) = valid else {
                return Err(EngineError::invalid("name", "invalid item"));
            };

            let now = Utc::now();
            let item = Item {
                id: Uuid::new_v4(),
                name: valid.name,
                description: valid.description,
                categories: Vec::new(),
                value: fields.value,
                rarity: fields.rarity,
                equippable: fields.equippable,
                private: fields.private,
                creator: Some(caller.id),
                picture: None,
                created_at: now,
                updated_at: now,
            };
            let model = items::ActiveModel::from(&item).insert(&db_tx).await?;
            self.link_categories(&db_tx, &model.id, &fields.categories)
                .await?;
            tracing::debug!(item_id = %item.id, "item created");
            self.hydrate_item(&db_tx, model).await
        })
    }

    /// Replace the editable fields of an item.
    pub async fn update_item(
        &self,
        item_id: Uuid,
        fields: ItemFields,
        caller: &Caller,
    ) -> ResultEngine<Item> {
        let mut errors = FieldErrors::default();
        let valid = validate_item_fields(&fields, &mut errors);
        with_tx!(self, |db_tx| {
            let model = self.require_visible_item(&db_tx, item_id, caller).await?;
            require_can_act(caller, item_owner(&model)?, "this item")?;

            self.check_categories(&db_tx, &fields.categories, &mut errors)
                .await?;
            errors.into_result()?;
            let Some(valid) = valid else {
                return Err(EngineError::invalid("name", "invalid item"));
            };

            let mut active: items::ActiveModel = model.into();
            active.name = ActiveValue::Set(valid.name);
            active.description = ActiveValue::Set(valid.description);
            active.value = ActiveValue::Set(fields.value);
            active.rarity = ActiveValue::Set(fields.rarity.as_str().to_string());
            active.equippable = ActiveValue::Set(fields.equippable);
            active.private = ActiveValue::Set(fields.private);
            active.updated_at = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;

            self.link_categories(&db_tx, &model.id, &fields.categories)
                .await?;
            self.hydrate_item(&db_tx, model).await
        })
    }

    /// Delete an item from the catalog and return it.
    ///
    /// Fails with `Conflict` while any inventory holds the item. The check
    /// and the delete are a single statement, so an item can't be added to
    /// an inventory between the two.
    pub async fn delete_item(&self, item_id: Uuid, caller: &Caller) -> ResultEngine<Item> {
        with_tx!(self, |db_tx| {
            let model = self.require_visible_item(&db_tx, item_id, caller).await?;
            require_can_act(caller, item_owner(&model)?, "this item")?;
            let item = self.hydrate_item(&db_tx, model).await?;

            let id = item_id.to_string();
            let backend = db_tx.get_database_backend();
            let result = db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM items WHERE id = ? \
                     AND NOT EXISTS (SELECT 1 FROM inventory_lines WHERE item_id = ?)",
                    vec![id.clone().into(), id.into()],
                ))
                .await
                .map_err(|err| {
                    map_constraint(
                        err,
                        || EngineError::Conflict("item is in use".to_string()),
                        || EngineError::Conflict("item is in use".to_string()),
                    )
                })?;
            if result.rows_affected() == 0 {
                return Err(EngineError::Conflict(
                    "item is held in an inventory".to_string(),
                ));
            }
            tracing::debug!(item_id = %item.id, "item deleted");
            Ok(item)
        })
    }

    /// Store a new picture url for an item and return the previous one.
    pub async fn set_item_picture(
        &self,
        item_id: Uuid,
        picture: String,
        caller: &Caller,
    ) -> ResultEngine<Option<String>> {
        with_tx!(self, |db_tx| {
            let model = self.require_visible_item(&db_tx, item_id, caller).await?;
            require_can_act(caller, item_owner(&model)?, "this item")?;

            let previous = model.picture.clone();
            let mut active: items::ActiveModel = model.into();
            active.picture = ActiveValue::Set(Some(picture));
            active.updated_at = ActiveValue::Set(Utc::now());
            active.update(&db_tx).await?;
            Ok(previous)
        })
    }
}
