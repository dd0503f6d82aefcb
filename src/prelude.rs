//! Common imports for store backends and their callers.

pub use crate::core::{MessageBody, MessageEntity, MessageHeader, Result, StoreError};
pub use crate::storage::{
    AsyncStoreHandle, AsyncStoreWorker, MemoryMessageStore, MessageStore, RedeliveryPage,
    StoreConfig, StoreStats, WorkerStats,
};
