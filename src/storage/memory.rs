use super::config::StoreConfig;
use super::engine::{MessageStore, RedeliveryPage};
use super::recency::{MAX_SLOTS, RecencyList, SlotIdx};
use crate::core::MessageEntity;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Upper bound on what `new` reserves up front; the arena grows on demand.
const PREALLOC_LIMIT: usize = 4096;

/// Point-in-time counters for a [`MemoryMessageStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub len: usize,
    pub max_capacity: usize,
    pub saved: u64,
    pub evicted: u64,
    pub rolled_back: u64,
}

struct StoreInner {
    /// Entities ordered by insertion, newest at the front
    entries: RecencyList<MessageEntity>,
    /// message id -> slot in `entries`
    index: HashMap<String, SlotIdx>,
    max_capacity: usize,
    saved: u64,
    evicted: u64,
    rolled_back: u64,
}

impl StoreInner {
    fn lookup(&self, message_id: &str) -> Option<&MessageEntity> {
        let idx = *self.index.get(message_id)?;
        self.entries.get(idx)
    }

    fn lookup_mut(&mut self, message_id: &str) -> Option<&mut MessageEntity> {
        let idx = *self.index.get(message_id)?;
        self.entries.get_mut(idx)
    }

    fn insert(&mut self, mut entity: MessageEntity) {
        self.saved += 1;

        if let Some(&idx) = self.index.get(&entity.message_id) {
            if let Some(old) = self.entries.get(idx) {
                // a committed entity stays committed across re-saves
                entity.commit |= old.commit;
            }
            self.entries.replace(idx, entity);
            self.entries.move_to_front(idx);
            return;
        }

        let len = self.entries.len();
        if len >= self.max_capacity
            && let Some(victim) = self.entries.back()
        {
            info!(len, max_capacity = self.max_capacity, "store overflow, evicting oldest entity");
            let message_id = entity.message_id.clone();
            if let Some(old) = self.entries.replace(victim, entity) {
                self.index.remove(&old.message_id);
            }
            self.index.insert(message_id, victim);
            self.entries.move_to_front(victim);
            self.evicted += 1;
            return;
        }

        let message_id = entity.message_id.clone();
        let idx = self.entries.push_front(entity);
        self.index.insert(message_id, idx);
    }

    fn remove(&mut self, message_id: &str) -> bool {
        let Some(idx) = self.index.remove(message_id) else {
            return false;
        };
        self.entries.remove(idx);
        self.rolled_back += 1;
        true
    }
}

/// Bounded in-memory store for in-flight messages.
///
/// Insertion order drives eviction: once `max_capacity` entities are held,
/// each new save reuses the oldest entity's slot. Reads never reorder.
/// The recency list and the id index share one lock so they always agree.
pub struct MemoryMessageStore {
    inner: RwLock<StoreInner>,
    path: String,
}

impl MemoryMessageStore {
    pub fn new(init_capacity: usize, max_capacity: usize) -> Self {
        let max_capacity = max_capacity.clamp(1, MAX_SLOTS);
        let init_capacity = init_capacity.min(max_capacity).min(PREALLOC_LIMIT);
        Self {
            inner: RwLock::new(StoreInner {
                entries: RecencyList::with_capacity(init_capacity),
                index: HashMap::with_capacity(init_capacity),
                max_capacity,
                saved: 0,
                evicted: 0,
                rolled_back: 0,
            }),
            path: ".".to_string(),
        }
    }

    pub fn with_config(config: &StoreConfig) -> Self {
        let mut store = Self::new(config.init_capacity, config.max_capacity);
        store.path = config.path.clone();
        store
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn capacity(&self) -> usize {
        self.read().max_capacity
    }

    pub fn stats(&self) -> StoreStats {
        let inner = self.read();
        StoreStats {
            len: inner.entries.len(),
            max_capacity: inner.max_capacity,
            saved: inner.saved,
            evicted: inner.evicted,
            rolled_back: inner.rolled_back,
        }
    }

    /// Stored ids, newest first.
    pub fn message_ids(&self) -> Vec<String> {
        self.read()
            .entries
            .iter_newest()
            .map(|(_, e)| e.message_id.clone())
            .collect()
    }

    /// True when every index entry points at a node holding the same id and
    /// every node is indexed exactly once.
    pub fn is_consistent(&self) -> bool {
        let inner = self.read();
        if inner.index.len() != inner.entries.len() {
            return false;
        }
        inner
            .entries
            .iter_newest()
            .all(|(idx, e)| inner.index.get(&e.message_id) == Some(&idx))
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(|err| {
            warn!("recovering poisoned store lock");
            PoisonError::into_inner(err)
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(|err| {
            warn!("recovering poisoned store lock");
            PoisonError::into_inner(err)
        })
    }
}

impl Default for MemoryMessageStore {
    fn default() -> Self {
        Self::with_config(&StoreConfig::default())
    }
}

impl MessageStore for MemoryMessageStore {
    fn start(&self) {
        debug!(path = %self.path, "memory message store started");
    }

    fn stop(&self) {
        debug!(path = %self.path, "memory message store stopped");
    }

    fn query(&self, message_id: &str) -> Option<MessageEntity> {
        // Lookups leave insertion order untouched
        self.read().lookup(message_id).cloned()
    }

    fn save(&self, entity: MessageEntity) -> bool {
        self.write().insert(entity);
        true
    }

    fn commit(&self, message_id: &str) -> bool {
        match self.write().lookup_mut(message_id) {
            Some(entity) => {
                entity.commit = true;
                true
            }
            None => false,
        }
    }

    fn rollback(&self, message_id: &str) -> bool {
        if self.write().remove(message_id) {
            debug!(message_id, "rolled back entity");
        }
        true
    }

    fn update_entity(&self, entity: &MessageEntity) -> bool {
        if let Some(stored) = self.write().lookup_mut(&entity.message_id) {
            stored.apply_delivery_state(entity);
        }
        true
    }

    fn page_query_entity(
        &self,
        _hash_key: &str,
        _kite_server: &str,
        next_delivery_time: i64,
        _start_idx: usize,
        limit: usize,
    ) -> RedeliveryPage {
        let inner = self.read();
        let mut entities = Vec::with_capacity(limit.saturating_add(1).min(inner.entries.len()));

        for (_, entity) in inner.entries.iter_oldest() {
            if !entity.is_redeliverable(next_delivery_time) {
                continue;
            }
            entities.push(entity.clone());
            if entities.len() > limit {
                entities.truncate(limit);
                return RedeliveryPage {
                    has_more: true,
                    entities,
                };
            }
        }

        RedeliveryPage {
            has_more: false,
            entities,
        }
    }

    fn len(&self) -> usize {
        self.read().entries.len()
    }
}
