use crate::core::MessageEntity;

/// One page of a redelivery scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedeliveryPage {
    /// More matching entities exist beyond `entities`.
    pub has_more: bool,
    /// Matches in scan order, oldest first.
    pub entities: Vec<MessageEntity>,
}

/// Storage backend contract used by the delivery subsystem.
///
/// Mutations report success as `bool`; lookups report misses as `None`.
pub trait MessageStore: Send + Sync {
    /// Lifecycle hook run before first use.
    fn start(&self);

    /// Lifecycle hook run at shutdown.
    fn stop(&self);

    /// Look up an entity by id.
    fn query(&self, message_id: &str) -> Option<MessageEntity>;

    /// Insert an entity, evicting the oldest one when the store is full.
    /// Re-saving a stored id replaces it but keeps a set commit flag.
    fn save(&self, entity: MessageEntity) -> bool;

    /// Mark an entity committed. Fails for an unknown id.
    fn commit(&self, message_id: &str) -> bool;

    /// Drop an entity. Succeeds for an unknown id.
    fn rollback(&self, message_id: &str) -> bool;

    /// Overwrite the redelivery tracking fields of the entity sharing
    /// `entity.message_id`. An unknown id is a successful no-op.
    fn update_entity(&self, entity: &MessageEntity) -> bool;

    /// Alias of `rollback`.
    fn delete(&self, message_id: &str) -> bool {
        self.rollback(message_id)
    }

    /// Runs `update_entity` on the calling thread.
    fn async_update(&self, entity: &MessageEntity) -> bool {
        self.update_entity(entity)
    }

    /// Runs `delete` on the calling thread.
    fn async_delete(&self, message_id: &str) -> bool {
        self.delete(message_id)
    }

    /// Runs `commit` on the calling thread.
    fn async_commit(&self, message_id: &str) -> bool {
        self.commit(message_id)
    }

    /// Scan for entities due for redelivery at `next_delivery_time`.
    ///
    /// `hash_key`, `kite_server` and `start_idx` address a partition in
    /// sharded backends.
    fn page_query_entity(
        &self,
        hash_key: &str,
        kite_server: &str,
        next_delivery_time: i64,
        start_idx: usize,
        limit: usize,
    ) -> RedeliveryPage;

    /// Number of stored entities.
    fn len(&self) -> usize;

    /// True when no entities are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
