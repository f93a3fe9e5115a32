//! Gold balance and transaction log endpoints.

use api_types::gold::{GoldAccount, GoldEntry, GoldSet};
use axum::{Extension, extract::State, http::StatusCode};
use chrono::Utc;
use engine::{Caller, LedgerEdit, LedgerEntry};
use uuid::Uuid;

use crate::{
    ServerError,
    extract::{Json, Path},
    server::ServerState,
    views,
};

fn ledger_entry(entry: GoldEntry) -> LedgerEntry {
    LedgerEntry::new(entry.quantity, entry.date.with_timezone(&Utc), entry.note)
}

async fn edit(
    state: &ServerState,
    caller: &Caller,
    user_id: Uuid,
    edit: LedgerEdit,
) -> Result<GoldAccount, ServerError> {
    let account = state.engine.edit_ledger(user_id, edit, caller).await?;
    Ok(views::gold_account(account))
}

pub async fn get(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<GoldAccount>, ServerError> {
    let account = state.engine.gold(user_id, &caller).await?;
    Ok(Json(views::gold_account(account)))
}

/// Overwrite the balance without logging a transaction.
pub async fn set(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<GoldSet>,
) -> Result<Json<GoldAccount>, ServerError> {
    let account = state
        .engine
        .set_gold(user_id, payload.quantity, &caller)
        .await?;
    Ok(Json(views::gold_account(account)))
}

pub async fn record(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<GoldEntry>,
) -> Result<(StatusCode, Json<GoldAccount>), ServerError> {
    let account = edit(
        &state,
        &caller,
        user_id,
        LedgerEdit::Append(ledger_entry(payload)),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn amend(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path((user_id, tx_id)): Path<(Uuid, i32)>,
    Json(payload): Json<GoldEntry>,
) -> Result<Json<GoldAccount>, ServerError> {
    let account = edit(
        &state,
        &caller,
        user_id,
        LedgerEdit::Amend(tx_id, ledger_entry(payload)),
    )
    .await?;
    Ok(Json(account))
}

pub async fn remove(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path((user_id, tx_id)): Path<(Uuid, i32)>,
) -> Result<Json<GoldAccount>, ServerError> {
    let account = edit(&state, &caller, user_id, LedgerEdit::Remove(tx_id)).await?;
    Ok(Json(account))
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone};

    use super::*;

    #[test]
    fn entry_dates_are_normalized_to_utc() {
        let entry = GoldEntry {
            quantity: 10,
            date: DateTime::parse_from_rfc3339("2024-03-01T14:00:00+02:00").unwrap(),
            note: "loot".to_string(),
        };
        let entry = ledger_entry(entry);
        assert_eq!(entry.date, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        assert_eq!(entry.quantity, 10);
    }
}
