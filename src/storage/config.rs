use super::memory::MemoryMessageStore;
use super::recency::MAX_SLOTS;
use crate::core::{Result, StoreError};

const MMAP_SCHEME: &str = "mmap://";
const MEMORY_SCHEME: &str = "memory://";

/// Message store configuration
///
/// Mirrors the broker's storage url, e.g.
/// `mmap://file=/data/kite&initcap=1000&maxcap=10000`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Storage path (kept for url compatibility, never touched on disk)
    pub path: String,

    /// Initial capacity hint for the index
    pub init_capacity: usize,

    /// Hard ceiling on stored entities
    pub max_capacity: usize,

    /// Depth of the async worker queue
    pub async_queue_depth: usize,
}

impl StoreConfig {
    pub fn new(init_capacity: usize, max_capacity: usize) -> Self {
        Self {
            path: ".".to_string(),
            init_capacity,
            max_capacity,
            async_queue_depth: 1024,
        }
    }

    /// Set the storage path
    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Set the initial capacity hint
    pub fn init_capacity(mut self, init_capacity: usize) -> Self {
        self.init_capacity = init_capacity;
        self
    }

    /// Set the maximum capacity
    pub fn max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Set the async worker queue depth
    pub fn async_queue_depth(mut self, depth: usize) -> Self {
        self.async_queue_depth = depth;
        self
    }

    /// Parse from a storage url
    ///
    /// Formats:
    /// - `mmap://file=<path>&initcap=<n>&maxcap=<n>[&queue=<n>]`
    /// - `memory://initcap=<n>&maxcap=<n>[&queue=<n>]`
    pub fn from_url(url: &str) -> Result<Self> {
        let params = if let Some(rest) = url.strip_prefix(MMAP_SCHEME) {
            rest
        } else if let Some(rest) = url.strip_prefix(MEMORY_SCHEME) {
            rest
        } else {
            return Err(StoreError::InvalidUrl(format!(
                "'{}' must start with '{}' or '{}'",
                url, MMAP_SCHEME, MEMORY_SCHEME
            )));
        };

        let mut config = Self::default();
        for pair in params.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| StoreError::InvalidUrl(format!("missing '=' in '{}'", pair)))?;

            match key {
                "file" => config.path = value.to_string(),
                "initcap" => config.init_capacity = parse_number(key, value)?,
                "maxcap" => config.max_capacity = parse_number(key, value)?,
                "queue" => config.async_queue_depth = parse_number(key, value)?,
                other => {
                    return Err(StoreError::InvalidUrl(format!("unknown parameter '{}'", other)));
                }
            }
        }

        Ok(config)
    }

    /// Convert to a storage url
    pub fn to_url(&self) -> String {
        format!(
            "{}file={}&initcap={}&maxcap={}&queue={}",
            MMAP_SCHEME, self.path, self.init_capacity, self.max_capacity, self.async_queue_depth
        )
    }

    /// Validate configuration
    ///
    /// `maxcap` must fit the store's slot addressing and `initcap` must not
    /// exceed it.
    pub fn validate(&self) -> Result<()> {
        if self.max_capacity == 0 {
            return Err(StoreError::InvalidConfig("maxcap must be > 0".to_string()));
        }

        if self.max_capacity > MAX_SLOTS {
            return Err(StoreError::InvalidConfig(format!(
                "maxcap must be <= {}",
                MAX_SLOTS
            )));
        }

        if self.init_capacity > self.max_capacity {
            return Err(StoreError::InvalidConfig(
                "initcap cannot exceed maxcap".to_string(),
            ));
        }

        if self.async_queue_depth == 0 {
            return Err(StoreError::InvalidConfig("queue must be > 0".to_string()));
        }

        Ok(())
    }

    /// Validate and build the store
    pub fn open(&self) -> Result<MemoryMessageStore> {
        self.validate()?;
        Ok(MemoryMessageStore::with_config(self))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(1000, 10000)
    }
}

fn parse_number(key: &str, value: &str) -> Result<usize> {
    value
        .parse()
        .map_err(|_| StoreError::InvalidUrl(format!("'{}' is not a number for '{}'", value, key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::engine::MessageStore;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.path, ".");
        assert_eq!(config.init_capacity, 1000);
        assert_eq!(config.max_capacity, 10000);
        assert_eq!(config.async_queue_depth, 1024);
    }

    #[test]
    fn test_builder_pattern() {
        let config = StoreConfig::new(10, 20)
            .path("/data/kite")
            .max_capacity(50)
            .async_queue_depth(8);

        assert_eq!(config.path, "/data/kite");
        assert_eq!(config.init_capacity, 10);
        assert_eq!(config.max_capacity, 50);
        assert_eq!(config.async_queue_depth, 8);
    }

    #[test]
    fn test_from_mmap_url() {
        let config =
            StoreConfig::from_url("mmap://file=/data/kite&initcap=1000&maxcap=2000").unwrap();

        assert_eq!(config.path, "/data/kite");
        assert_eq!(config.init_capacity, 1000);
        assert_eq!(config.max_capacity, 2000);
        assert_eq!(config.async_queue_depth, 1024);
    }

    #[test]
    fn test_from_memory_url() {
        let config = StoreConfig::from_url("memory://initcap=5&maxcap=10&queue=16").unwrap();

        assert_eq!(config.path, ".");
        assert_eq!(config.init_capacity, 5);
        assert_eq!(config.max_capacity, 10);
        assert_eq!(config.async_queue_depth, 16);
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            StoreConfig::from_url("mysql://localhost"),
            Err(StoreError::InvalidUrl(_))
        ));
        assert!(StoreConfig::from_url("mmap://initcap").is_err());
        assert!(StoreConfig::from_url("mmap://maxcap=lots").is_err());
        assert!(StoreConfig::from_url("mmap://color=blue").is_err());
    }

    #[test]
    fn test_url_round_trip() {
        let config = StoreConfig::new(3, 9).path("/tmp/kite");
        assert_eq!(StoreConfig::from_url(&config.to_url()).unwrap(), config);
    }

    #[test]
    fn test_validate() {
        assert!(StoreConfig::default().validate().is_ok());
        assert!(StoreConfig::new(0, 0).validate().is_err());
        assert!(StoreConfig::default().async_queue_depth(0).validate().is_err());
        assert!(StoreConfig::new(20, 10).validate().is_err());
        assert!(StoreConfig::new(1, MAX_SLOTS).validate().is_ok());
        assert!(StoreConfig::new(1, MAX_SLOTS + 1).validate().is_err());
    }

    #[test]
    fn test_huge_initcap_is_rejected_or_bounded() {
        let config =
            StoreConfig::from_url("memory://initcap=1000000000000000&maxcap=1000000000000000")
                .unwrap();
        assert!(matches!(config.open(), Err(StoreError::InvalidConfig(_))));

        let store = StoreConfig::from_url("memory://initcap=4000000000&maxcap=4000000000")
            .unwrap()
            .open()
            .unwrap();
        assert_eq!(store.capacity(), 4_000_000_000);
        assert!(store.is_empty());
    }

    #[test]
    fn test_open_builds_store() {
        let store = StoreConfig::new(2, 4).path("/tmp/kite").open().unwrap();
        assert_eq!(store.capacity(), 4);
        assert_eq!(store.path(), "/tmp/kite");
        assert!(StoreConfig::new(1, 0).open().is_err());
    }
}
