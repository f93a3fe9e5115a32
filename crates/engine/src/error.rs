//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when one or more input fields violate a constraint.
//!   It carries the field-level detail.
//! - [`KeyNotFound`] thrown when a user, item, category or gold transaction does
//!   not exist.
//! - [`NotInInventory`] thrown when the item exists in the catalog but the user
//!   does not hold it.
//! - [`Forbidden`] thrown when the caller is neither the owner nor an admin.
//! - [`Conflict`] thrown when a delete is blocked by a reference.
//! - [`ExistingKey`] thrown when a unique name is already taken.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`NotInInventory`]: EngineError::NotInInventory
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`Conflict`]: EngineError::Conflict
//!  [`ExistingKey`]: EngineError::ExistingKey
use std::fmt;

use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;

/// A single field that failed validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// All the field errors collected while validating one request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }

    /// `Ok(())` when nothing was collected, otherwise a
    /// [`EngineError::Validation`].
    pub fn into_result(self) -> Result<(), EngineError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Validation(self))
        }
    }
}

impl From<FieldError> for FieldErrors {
    fn from(value: FieldError) -> Self {
        Self(vec![value])
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
            first = false;
        }
        Ok(())
    }
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" not currently in inventory")]
    NotInInventory(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Shortcut for a validation error on one field.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(FieldError::new(field, message).into())
    }
}

impl From<FieldErrors> for EngineError {
    fn from(value: FieldErrors) -> Self {
        Self::Validation(value)
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::NotInInventory(a), Self::NotInInventory(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

/// Translate constraint violations raised by SQLite into domain errors.
///
/// `on_unique` is used for unique-index violations and `on_foreign_key` for
/// `RESTRICT` foreign keys; every other database error is passed through.
pub(crate) fn map_constraint(
    err: DbErr,
    on_unique: impl FnOnce() -> EngineError,
    on_foreign_key: impl FnOnce() -> EngineError,
) -> EngineError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => on_unique(),
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => on_foreign_key(),
        _ => EngineError::Database(err),
    }
}
