//! The Hoard engine.
//!
//! It owns the catalog (items and categories), every user's inventory and
//! gold account, and the access rule deciding who may change them. All state
//! lives in the database; each public operation on [`Engine`] runs inside one
//! database transaction.

pub use access::{Caller, can_act};
pub use categories::{Category, CategoryDetail, CategoryRefs};
pub use commands::{CategoryFields, CategoryPatch, InventoryPatch, ItemFields, NewInventoryLine};
pub use error::{EngineError, FieldError, FieldErrors};
pub use gold_transactions::{GoldAccount, GoldTransaction, LedgerEdit, LedgerEntry};
pub use inventory_lines::InventoryEntry;
pub use items::{Item, Rarity};
pub use ops::{CatalogCounts, Engine, EngineBuilder};
pub use users::{User, UserCredentials, UserProfile};
pub use util::{normalize_category_display, normalize_category_key};

mod access;
mod categories;
mod commands;
mod error;
mod gold_transactions;
mod inventory_lines;
mod item_categories;
mod items;
mod ops;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
