//! In-memory implementation of `TransactionalStore`.
//!
//! Records are kept bincode-encoded so that every load hands out a fresh copy
//! and nothing a hook does to a loaded entity leaks into the store before
//! commit. All state is lost on restart.

use super::{LockToken, Locked, StoreError, StoredRecord, TransactionalStore};
use crate::core::State;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};
use uuid::Uuid;

struct Row {
    bytes: Vec<u8>,
    lock: Option<Uuid>,
}

/// Process-local store with row locks.
///
/// A second `load_for_update` on a locked row fails immediately with
/// `LockContention` instead of blocking.
pub struct InMemoryStore<S, E> {
    rows: Mutex<HashMap<String, Row>>,
    _phantom: PhantomData<fn() -> (S, E)>,
}

impl<S, E> InMemoryStore<S, E>
where
    S: State,
    E: Serialize + DeserializeOwned,
{
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            _phantom: PhantomData,
        }
    }

    /// Create a new record at version 0.
    pub fn insert(&self, id: &str, state: S, entity: E) -> Result<(), StoreError> {
        let mut rows = self.rows()?;
        if rows.contains_key(id) {
            return Err(StoreError::AlreadyExists { id: id.to_string() });
        }

        let record = StoredRecord {
            id: id.to_string(),
            state,
            entity,
            version: 0,
            updated_at: Utc::now(),
        };
        rows.insert(
            id.to_string(),
            Row {
                bytes: encode(&record)?,
                lock: None,
            },
        );
        Ok(())
    }

    /// Read the last committed record without locking it.
    pub fn get(&self, id: &str) -> Result<Option<StoredRecord<S, E>>, StoreError> {
        let rows = self.rows()?;
        rows.get(id).map(|row| decode(&row.bytes)).transpose()
    }

    pub fn is_locked(&self, id: &str) -> bool {
        self.rows()
            .map(|rows| rows.get(id).is_some_and(|row| row.lock.is_some()))
            .unwrap_or(false)
    }

    fn rows(&self) -> Result<MutexGuard<'_, HashMap<String, Row>>, StoreError> {
        self.rows
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl<S, E> Default for InMemoryStore<S, E>
where
    S: State,
    E: Serialize + DeserializeOwned,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, E> TransactionalStore<S, E> for InMemoryStore<S, E>
where
    S: State,
    E: Serialize + DeserializeOwned,
{
    fn load_for_update(&self, id: &str) -> Result<Locked<S, E>, StoreError> {
        let mut rows = self.rows()?;
        let row = rows
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        if row.lock.is_some() {
            warn!(entity_id = id, "row already locked");
            return Err(StoreError::LockContention { id: id.to_string() });
        }

        let record: StoredRecord<S, E> = decode(&row.bytes)?;
        let token = LockToken::new(id);
        row.lock = Some(token.id());
        debug!(entity_id = id, lock = %token.id(), state = record.state.name(), "row locked");

        Ok(Locked {
            token,
            state: record.state,
            entity: record.entity,
        })
    }

    fn commit(&self, token: &LockToken, state: &S, entity: &E) -> Result<(), StoreError> {
        let mut rows = self.rows()?;
        let id = token.entity_id();
        let row = rows
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        if row.lock != Some(token.id()) {
            return Err(StoreError::StaleLock {
                id: id.to_string(),
                token: token.id(),
            });
        }

        let previous: StoredRecord<S, E> = decode(&row.bytes)?;
        let record = StoredRecord {
            id: id.to_string(),
            state,
            entity,
            version: previous.version + 1,
            updated_at: Utc::now(),
        };
        row.bytes = encode(&record)?;
        row.lock = None;
        debug!(entity_id = id, version = record.version, state = state.name(), "row committed");
        Ok(())
    }

    fn rollback(&self, token: LockToken) {
        let Ok(mut rows) = self.rows() else {
            return;
        };
        if let Some(row) = rows.get_mut(token.entity_id()) {
            if row.lock == Some(token.id()) {
                row.lock = None;
                debug!(entity_id = token.entity_id(), "row lock released by rollback");
            }
        }
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    bincode::serialize(value).map_err(|e| StoreError::Encode(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Decode(e.to_string()))
}
