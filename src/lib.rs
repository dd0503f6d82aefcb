// ============================================================================
// KiteStore Library
// ============================================================================

pub mod core;
pub mod prelude;
pub mod storage;

// Re-export main types for convenience
pub use crate::core::{MessageBody, MessageEntity, MessageHeader, Result, StoreError};
pub use crate::storage::{
    AsyncStoreHandle, AsyncStoreWorker, MemoryMessageStore, MessageStore, RedeliveryPage,
    StoreCommand, StoreConfig, StoreStats, WorkerStats,
};

/// Open a store from a storage url.
///
/// # Examples
///
/// ```
/// use kitestore::{MessageStore, open};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = open("mmap://file=.&initcap=100&maxcap=1000")?;
/// store.start();
/// assert!(store.is_empty());
/// assert_eq!(store.capacity(), 1000);
/// # Ok(())
/// # }
/// ```
pub fn open(url: &str) -> Result<MemoryMessageStore> {
    StoreConfig::from_url(url)?.open()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_from_url() {
        let store = open("memory://initcap=1&maxcap=2").unwrap();
        assert_eq!(store.capacity(), 2);
    }

    #[test]
    fn test_open_rejects_bad_url() {
        assert!(matches!(open("file://x"), Err(StoreError::InvalidUrl(_))));
        assert!(matches!(
            open("mmap://maxcap=0"),
            Err(StoreError::InvalidConfig(_))
        ));
    }
}
