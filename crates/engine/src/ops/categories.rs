use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Statement, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    CatalogCounts, Caller, Category, CategoryDetail, CategoryFields, CategoryPatch, EngineError,
    ResultEngine, categories,
    error::map_constraint,
    item_categories, items,
    util::{normalize_category_display, normalize_category_key, parse_uuid},
};

use super::{
    Engine,
    access::require_can_act,
    items::{is_visible, visible_to},
    with_tx,
};

fn category_owner(model: &categories::Model) -> ResultEngine<Option<Uuid>> {
    model
        .user_id
        .as_deref()
        .map(|id| parse_uuid(id, "user"))
        .transpose()
}

fn existing_name(display: &str) -> impl FnOnce() -> EngineError + '_ {
    move || EngineError::ExistingKey(format!("category {display}"))
}

fn require_admin_for_default(caller: &Caller) -> ResultEngine<()> {
    if caller.is_admin {
        Ok(())
    } else {
        Err(EngineError::Forbidden(
            "only admins can manage default categories".to_string(),
        ))
    }
}

impl Engine {
    async fn require_category(
        &self,
        db: &DatabaseTransaction,
        category_id: Uuid,
    ) -> ResultEngine<categories::Model> {
        categories::Entity::find_by_id(category_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))
    }

    async fn ensure_name_free(
        &self,
        db: &DatabaseTransaction,
        name_norm: &str,
        display: &str,
        except: Option<&str>,
    ) -> ResultEngine<()> {
        let mut query =
            categories::Entity::find().filter(categories::Column::NameNorm.eq(name_norm));
        if let Some(id) = except {
            query = query.filter(categories::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(existing_name(display)());
        }
        Ok(())
    }

    /// Return all categories sorted by name.
    pub async fn list_categories(&self) -> ResultEngine<Vec<Category>> {
        with_tx!(self, |db_tx| {
            categories::Entity::find()
                .order_by_asc(categories::Column::Name)
                .all(&db_tx)
                .await?
                .iter()
                .map(Category::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Return a category with the items that belong to it.
    pub async fn category(
        &self,
        category_id: Uuid,
        caller: &Caller,
    ) -> ResultEngine<CategoryDetail> {
        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, category_id).await?;
            let category = Category::try_from(&model)?;

            let models = items::Entity::find()
                .join(JoinType::InnerJoin, items::Relation::ItemCategories.def())
                .filter(item_categories::Column::CategoryId.eq(model.id.clone()))
                .order_by_asc(items::Column::Name)
                .all(&db_tx)
                .await?
                .into_iter()
                .filter(|item| is_visible(item, caller))
                .collect();
            let items = self.hydrate_items(&db_tx, models).await?;
            Ok(CategoryDetail { category, items })
        })
    }

    /// Find a category by name, ignoring case, diacritics and punctuation.
    pub async fn category_by_name(&self, name: &str) -> ResultEngine<Option<Category>> {
        let name_norm = normalize_category_key(name)?;
        with_tx!(self, |db_tx| {
            categories::Entity::find()
                .filter(categories::Column::NameNorm.eq(name_norm))
                .one(&db_tx)
                .await?
                .as_ref()
                .map(Category::try_from)
                .transpose()
        })
    }

    /// Create a category.
    ///
    /// Default categories have no owner and can only be created by admins.
    /// Fails with `ExistingKey` when the normalized name is taken.
    pub async fn create_category(
        &self,
        fields: CategoryFields,
        caller: &Caller,
    ) -> ResultEngine<Category> {
        let display = normalize_category_display(&fields.name)?;
        let name_norm = normalize_category_key(&display)?;
        if fields.is_default {
            require_admin_for_default(caller)?;
        }
        with_tx!(self, |db_tx| {
            self.ensure_name_free(&db_tx, &name_norm, &display, None)
                .await?;

            let owner = (!fields.is_default).then(|| caller.id.to_string());
            let active = categories::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                name: ActiveValue::Set(display.clone()),
                name_norm: ActiveValue::Set(name_norm),
                user_id: ActiveValue::Set(owner),
                is_default: ActiveValue::Set(fields.is_default),
            };
            let model = active.insert(&db_tx).await.map_err(|err| {
                map_constraint(err, existing_name(&display), existing_name(&display))
            })?;
            Category::try_from(&model)
        })
    }

    /// Rename a category or change its default flag.
    pub async fn update_category(
        &self,
        category_id: Uuid,
        patch: CategoryPatch,
        caller: &Caller,
    ) -> ResultEngine<Category> {
        let name = patch
            .name
            .as_deref()
            .map(|name| -> ResultEngine<_> {
                let display = normalize_category_display(name)?;
                let key = normalize_category_key(&display)?;
                Ok((display, key))
            })
            .transpose()?;
        if patch.is_default.is_some() {
            require_admin_for_default(caller)?;
        }
        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, category_id).await?;
            require_can_act(caller, category_owner(&model)?, "this category")?;

            let mut active: categories::ActiveModel = model.clone().into();
            let mut display_name = model.name.clone();
            if let Some((display, key)) = name {
                self.ensure_name_free(&db_tx, &key, &display, Some(&model.id))
                    .await?;
                active.name = ActiveValue::Set(display.clone());
                active.name_norm = ActiveValue::Set(key);
                display_name = display;
            }
            if let Some(is_default) = patch.is_default {
                active.is_default = ActiveValue::Set(is_default);
                if is_default {
                    active.user_id = ActiveValue::Set(None);
                }
            }
            let model = active.update(&db_tx).await.map_err(|err| {
                map_constraint(err, existing_name(&display_name), existing_name(&display_name))
            })?;
            Category::try_from(&model)
        })
    }

    /// Delete a category and return it.
    ///
    /// Fails with `Conflict` while any item references it; the check and the
    /// delete are one statement.
    pub async fn delete_category(
        &self,
        category_id: Uuid,
        caller: &Caller,
    ) -> ResultEngine<Category> {
        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, category_id).await?;
            require_can_act(caller, category_owner(&model)?, "this category")?;
            let category = Category::try_from(&model)?;

            let backend = db_tx.get_database_backend();
            let result = db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM categories WHERE id = ? \
                     AND NOT EXISTS (SELECT 1 FROM item_categories WHERE category_id = ?)",
                    vec![model.id.clone().into(), model.id.clone().into()],
                ))
                .await
                .map_err(|err| {
                    map_constraint(
                        err,
                        || EngineError::Conflict("category is in use".to_string()),
                        || EngineError::Conflict("category is in use".to_string()),
                    )
                })?;
            if result.rows_affected() == 0 {
                return Err(EngineError::Conflict(
                    "category is used by one or more items".to_string(),
                ));
            }
            Ok(category)
        })
    }

    /// Number of categories and of the items `caller` can see.
    pub async fn catalog_counts(&self, caller: &Caller) -> ResultEngine<CatalogCounts> {
        with_tx!(self, |db_tx| {
            let items = items::Entity::find()
                .filter(visible_to(caller))
                .count(&db_tx)
                .await?;
            let categories = categories::Entity::find().count(&db_tx).await?;
            Ok(CatalogCounts { items, categories })
        })
    }
}
