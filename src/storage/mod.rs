pub mod config;
pub mod engine;
pub mod memory;
pub mod recency;
pub mod worker;

pub use config::StoreConfig;
pub use engine::{MessageStore, RedeliveryPage};
pub use memory::{MemoryMessageStore, StoreStats};
pub use recency::{RecencyList, SlotIdx};
pub use worker::{AsyncStoreHandle, AsyncStoreWorker, StoreCommand, WorkerStats};
