use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, Statement, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    Caller, EngineError, FieldErrors, ResultEngine, User, UserCredentials, UserProfile, can_act,
    error::map_constraint,
    users,
    util::{NAME_MAX_CHARS, required_text},
};

use super::{Engine, access::require_can_act, with_tx};

fn username_taken(username: &str) -> EngineError {
    EngineError::ExistingKey(format!("username {username}"))
}

impl Engine {
    /// Gold plus the value of every held item, saturating at the `i64` range.
    async fn net_worth(&self, db: &DatabaseTransaction, user: &users::Model) -> ResultEngine<i64> {
        let backend = db.get_database_backend();
        let rows = db
            .query_all(Statement::from_sql_and_values(
                backend,
                "SELECT i.value, l.quantity \
                 FROM inventory_lines l JOIN items i ON i.id = l.item_id \
                 WHERE l.user_id = ?",
                vec![user.id.clone().into()],
            ))
            .await?;

        let mut total = user.gold_quantity;
        for row in rows {
            let value = row.try_get::<i64>("", "value")?;
            let quantity = row.try_get::<i64>("", "quantity")?;
            total = total.saturating_add(value.saturating_mul(quantity));
        }
        Ok(total)
    }

    /// Register a user. `password_hash` must already be hashed.
    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> ResultEngine<User> {
        let mut errors = FieldErrors::default();
        let username = required_text(&mut errors, "username", username, NAME_MAX_CHARS);
        errors.into_result()?;
        let username = username.unwrap_or_default();

        with_tx!(self, |db_tx| {
            let exists = users::Entity::find()
                .filter(users::Column::Username.eq(username.clone()))
                .one(&db_tx)
                .await?;
            if exists.is_some() {
                return Err(username_taken(&username));
            }

            let now = Utc::now();
            let model = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                username: ActiveValue::Set(username.clone()),
                password: ActiveValue::Set(password_hash.to_string()),
                admin: ActiveValue::Set(is_admin),
                gold_quantity: ActiveValue::Set(0),
                profile_picture: ActiveValue::Set(None),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await
            .map_err(|err| {
                map_constraint(err, || username_taken(&username), || username_taken(&username))
            })?;
            tracing::info!(username = %model.username, is_admin, "user created");
            User::try_from(&model)
        })
    }

    /// Return the stored credentials of `username`, for logging in.
    pub async fn user_credentials(&self, username: &str) -> ResultEngine<UserCredentials> {
        with_tx!(self, |db_tx| {
            let model = users::Entity::find()
                .filter(users::Column::Username.eq(username.trim()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
            Ok(UserCredentials {
                user: User::try_from(&model)?,
                password_hash: model.password,
            })
        })
    }

    /// Return a user's public profile.
    ///
    /// Net worth (gold plus the value of every held item) is only disclosed
    /// to the user and to admins.
    pub async fn user_profile(
        &self,
        user_id: Uuid,
        caller: &Caller,
    ) -> ResultEngine<UserProfile> {
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            let net_worth = if can_act(caller, Some(user_id)) {
                Some(self.net_worth(&db_tx, &model).await?)
            } else {
                None
            };
            Ok(UserProfile {
                user: User::try_from(&model)?,
                net_worth,
            })
        })
    }

    /// Grant or revoke admin rights.
    pub async fn set_user_admin(&self, username: &str, is_admin: bool) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = users::Entity::find()
                .filter(users::Column::Username.eq(username.trim()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
            let mut active: users::ActiveModel = model.into();
            active.admin = ActiveValue::Set(is_admin);
            active.updated_at = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            tracing::info!(username = %model.username, is_admin, "admin flag changed");
            User::try_from(&model)
        })
    }

    /// Store a new profile picture url and return the previous one.
    pub async fn set_profile_picture(
        &self,
        user_id: Uuid,
        picture: String,
        caller: &Caller,
    ) -> ResultEngine<Option<String>> {
        require_can_act(caller, Some(user_id), "this profile")?;
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            let previous = model.profile_picture.clone();
            let mut active: users::ActiveModel = model.into();
            active.profile_picture = ActiveValue::Set(Some(picture));
            active.updated_at = ActiveValue::Set(Utc::now());
            active.update(&db_tx).await?;
            Ok(previous)
        })
    }
}
