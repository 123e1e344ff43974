//! State store port: last known state per entity, used to restore entities
//! after a restart.

use std::future::Future;
use std::sync::Arc;

use dsbridge_domain::entity::EntityState;
use dsbridge_domain::error::DsBridgeError;
use dsbridge_domain::id::EntityId;
use dsbridge_domain::time::Timestamp;

pub trait StateRepository: Send + Sync {
    /// Last persisted state of `id`, if any.
    fn load(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<Option<EntityState>, DsBridgeError>> + Send;

    /// Persist `state` for `id`, replacing any previous value.
    fn save(
        &self,
        id: &EntityId,
        state: EntityState,
        changed_at: Timestamp,
    ) -> impl Future<Output = Result<(), DsBridgeError>> + Send;
}

impl<T: StateRepository> StateRepository for Arc<T> {
    fn load(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<Option<EntityState>, DsBridgeError>> + Send {
        (**self).load(id)
    }

    fn save(
        &self,
        id: &EntityId,
        state: EntityState,
        changed_at: Timestamp,
    ) -> impl Future<Output = Result<(), DsBridgeError>> + Send {
        (**self).save(id, state, changed_at)
    }
}
