use sea_orm::{DatabaseTransaction, prelude::*};
use uuid::Uuid;

use crate::{Caller, EngineError, ResultEngine, can_act, users};

use super::Engine;

/// Fail with `Forbidden` unless `caller` may act on a resource owned by
/// `owner`.
pub(super) fn require_can_act(
    caller: &Caller,
    owner: Option<Uuid>,
    what: &str,
) -> ResultEngine<()> {
    if can_act(caller, owner) {
        Ok(())
    } else {
        Err(EngineError::Forbidden(format!("not allowed to modify {what}")))
    }
}

impl Engine {
    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    /// Resolve the owner of an inventory or gold account on behalf of
    /// `caller`.
    ///
    /// The access check runs first, so a stranger learns nothing about which
    /// users exist.
    pub(super) async fn require_account(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
        caller: &Caller,
    ) -> ResultEngine<users::Model> {
        if !can_act(caller, Some(user_id)) {
            return Err(EngineError::Forbidden(
                "not allowed to access another user's account".to_string(),
            ));
        }
        self.require_user(db, user_id).await
    }
}
