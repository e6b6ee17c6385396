//! The durability point of a transition.

use crate::core::State;
use crate::store::StoreError;

/// Persists a transition once its `on` hook has succeeded.
///
/// Called exactly once per selected transition, after `on` and before
/// `after`, with the destination state and the entity as `on` left it. An
/// error rolls the machine back exactly like a failing `on` hook.
pub trait CommitStep<S: State, E> {
    fn commit(&mut self, state: &S, entity: &E) -> Result<(), StoreError>;
}

/// Commit step for machines that are not backed by a store.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCommit;

impl<S: State, E> CommitStep<S, E> for NoopCommit {
    fn commit(&mut self, _state: &S, _entity: &E) -> Result<(), StoreError> {
        Ok(())
    }
}
