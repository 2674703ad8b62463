use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use chrono::Utc;
use entity::storage_slot;
use sea_orm::{ActiveValue::Set, EntityTrait, sea_query::OnConflict};

use crate::{DbError, DbPool, DbResult};

/// A string-keyed store of serialized blobs. Every `put` overwrites the whole
/// value held under `key`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> DbResult<Option<String>>;

    async fn put(&self, key: &str, value: &str) -> DbResult<()>;

    /// Whether the backing storage is currently reachable.
    async fn ping(&self) -> bool {
        true
    }
}

/// Slots stored as rows of the `storage_slot` table.
#[derive(Clone, Debug)]
pub struct SlotStore {
    pool: DbPool,
}

impl SlotStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for SlotStore {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let row = storage_slot::Entity::find_by_id(key.to_string())
            .one(&self.pool)
            .await?;
        Ok(row.map(|slot| slot.value))
    }

    async fn put(&self, key: &str, value: &str) -> DbResult<()> {
        let model = storage_slot::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            updated_at: Set(Utc::now().into()),
        };
        storage_slot::Entity::insert(model)
            .on_conflict(
                OnConflict::column(storage_slot::Column::Key)
                    .update_columns([storage_slot::Column::Value, storage_slot::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.pool)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> bool {
        self.pool.ping().await.is_ok()
    }
}

/// Process-local slots, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let slots = self.slots.lock().map_err(|_| DbError::Poisoned)?;
        Ok(slots.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> DbResult<()> {
        let mut slots = self.slots.lock().map_err(|_| DbError::Poisoned)?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
