//! The transactional boundary around a persisted entity.
//!
//! A [`TransactionalStore`] loads an entity under a row lock, commits a new
//! state together with the mutated entity, or rolls back. [`UnitOfWork`]
//! drives one `fire` call through that sequence; [`InMemoryStore`] is a
//! process-local implementation with the same locking rules.

mod error;
mod memory;
mod unit_of_work;

pub use error::StoreError;
pub use memory::InMemoryStore;
pub use unit_of_work::{Committed, UnitOfWork, UnitOfWorkError};

use crate::core::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Proof that the holder owns the row lock of one entity.
///
/// Not `Clone`; `rollback` consumes it.
#[derive(Debug, PartialEq, Eq)]
pub struct LockToken {
    id: Uuid,
    entity_id: String,
    acquired_at: DateTime<Utc>,
}

impl LockToken {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            entity_id: entity_id.into(),
            acquired_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }
}

/// An entity loaded for update, with its state and the lock protecting it.
///
/// Dropping it does not release the lock; see [`TransactionalStore`].
#[derive(Debug)]
#[must_use = "the row stays locked until the token is committed or rolled back"]
pub struct Locked<S, E> {
    pub token: LockToken,
    pub state: S,
    pub entity: E,
}

/// Persisted layout of an entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize, E: Serialize",
    deserialize = "S: Deserialize<'de>, E: Deserialize<'de>"
))]
pub struct StoredRecord<S, E> {
    pub id: String,
    pub state: S,
    pub entity: E,
    /// Incremented on every commit
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}

/// Load-lock-commit-rollback primitives for one kind of entity.
///
/// Implementations must guarantee that at most one [`LockToken`] per entity
/// is outstanding. `commit` persists state and entity atomically and
/// releases the lock; after a failed commit the caller still owns the lock
/// and must `rollback`.
///
/// A token is plain data and releases nothing when dropped: a caller that
/// drops a [`Locked`] without committing or rolling back leaves the row
/// locked for as long as the store lives. [`UnitOfWork`] always releases the
/// lock, including when a hook panics.
pub trait TransactionalStore<S: State, E> {
    fn load_for_update(&self, id: &str) -> Result<Locked<S, E>, StoreError>;

    fn commit(&self, token: &LockToken, state: &S, entity: &E) -> Result<(), StoreError>;

    fn rollback(&self, token: LockToken);
}
