#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{Caller, Engine, Item, ItemFields, LedgerEntry};
use migration::MigratorTrait;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

/// SQLite file in the temp dir, removed on drop. Unlike `sqlite::memory:`
/// it is shared by every connection in the pool.
pub struct FileDb {
    path: PathBuf,
}

impl FileDb {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("hoard-{}.db", Uuid::new_v4()));
        Self { path }
    }

    pub async fn engine(&self) -> Engine {
        let url = format!("sqlite:{}?mode=rwc", self.path.display());
        let db = Database::connect(url).await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        Engine::builder().database(db).build().await.unwrap()
    }
}

impl Drop for FileDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let mut path = self.path.clone().into_os_string();
            path.push(suffix);
            let _ = std::fs::remove_file(path);
        }
    }
}

pub async fn user(engine: &Engine, username: &str) -> Caller {
    let user = engine.create_user(username, "hash", false).await.unwrap();
    Caller::user(user.id)
}

pub async fn admin(engine: &Engine, username: &str) -> Caller {
    let user = engine.create_user(username, "hash", true).await.unwrap();
    Caller::admin(user.id)
}

pub async fn item(engine: &Engine, name: &str, value: i64, caller: &Caller) -> Item {
    engine
        .create_item(
            ItemFields::new(name, format!("A {name}")).value(value),
            caller,
        )
        .await
        .unwrap()
}

pub fn entry(quantity: i64, day: u32, note: &str) -> LedgerEntry {
    let date = Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap();
    LedgerEntry::new(quantity, date, note)
}
