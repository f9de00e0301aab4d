//! Sync configuration

use std::path::PathBuf;

use crate::network::Height;

/// Nanoseconds per second, for timestamp timeouts
const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Configuration for a partition's packet module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Port the module binds on every channel
    /// Default: "blog"
    pub port_id: String,

    /// Relative timestamp timeout for outbound packets (seconds)
    /// 0 disables the timestamp bound.
    /// Default: 600 (10 minutes)
    pub packet_timeout_secs: u64,

    /// Relative height timeout for outbound packets (blocks)
    /// 0 disables the height bound.
    /// Default: 0
    pub timeout_height_offset: u64,

    /// Path to the record store database
    /// If None, the caller decides (typically in-memory)
    pub db_path: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            port_id: "blog".to_string(),
            packet_timeout_secs: 600,
            timeout_height_offset: 0,
            db_path: None,
        }
    }
}

impl SyncConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Short timeouts for simulated networks
    pub fn for_testing() -> Self {
        Self {
            packet_timeout_secs: 10,
            timeout_height_offset: 5,
            ..Self::default()
        }
    }

    /// Set the module port
    pub fn with_port_id(mut self, port_id: impl Into<String>) -> Self {
        self.port_id = port_id.into();
        self
    }

    /// Set the relative timestamp timeout (seconds, 0 disables)
    pub fn with_packet_timeout_secs(mut self, secs: u64) -> Self {
        self.packet_timeout_secs = secs;
        self
    }

    /// Set the relative height timeout (blocks, 0 disables)
    pub fn with_timeout_height_offset(mut self, blocks: u64) -> Self {
        self.timeout_height_offset = blocks;
        self
    }

    /// Set the database path
    pub fn with_db_path(mut self, path: PathBuf) -> Self {
        self.db_path = Some(path);
        self
    }

    /// Check that the config can produce sendable packets
    pub fn validate(&self) -> Result<(), String> {
        if self.port_id.is_empty() {
            return Err("port_id cannot be empty".to_string());
        }
        if self.packet_timeout_secs == 0 && self.timeout_height_offset == 0 {
            return Err("at least one of packet_timeout_secs and timeout_height_offset must be set".to_string());
        }
        Ok(())
    }

    /// Absolute timeout height given the counterparty's latest height
    pub fn timeout_height(&self, counterparty_height: Height) -> Height {
        if self.timeout_height_offset == 0 {
            return Height::zero();
        }
        counterparty_height.increment_by(self.timeout_height_offset)
    }

    /// Absolute timeout timestamp (nanoseconds) given the current time
    pub fn timeout_timestamp(&self, now_nanos: u64) -> u64 {
        if self.packet_timeout_secs == 0 {
            return 0;
        }
        now_nanos.saturating_add(self.packet_timeout_secs.saturating_mul(NANOS_PER_SEC))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.port_id, "blog");
        assert_eq!(config.packet_timeout_secs, 600);
        assert_eq!(config.timeout_height_offset, 0);
        assert!(config.db_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = SyncConfig::new()
            .with_port_id("posts")
            .with_packet_timeout_secs(30)
            .with_timeout_height_offset(100)
            .with_db_path(PathBuf::from("/tmp/partition.db"));

        assert_eq!(config.port_id, "posts");
        assert_eq!(config.packet_timeout_secs, 30);
        assert_eq!(config.timeout_height_offset, 100);
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/partition.db")));
    }

    #[test]
    fn test_validate_rejects_no_timeout() {
        let config = SyncConfig::new()
            .with_packet_timeout_secs(0)
            .with_timeout_height_offset(0);
        assert!(config.validate().is_err());

        assert!(SyncConfig::new().with_port_id("").validate().is_err());
    }

    #[test]
    fn test_timeouts() {
        let config = SyncConfig::for_testing();
        assert_eq!(config.timeout_height(Height::new(0, 10)), Height::new(0, 15));
        assert_eq!(config.timeout_timestamp(1_000), 1_000 + 10 * NANOS_PER_SEC);

        let disabled = SyncConfig::new().with_packet_timeout_secs(0);
        assert_eq!(disabled.timeout_timestamp(1_000), 0);
        assert!(disabled.timeout_height(Height::new(0, 10)).is_zero());

        assert_eq!(SyncConfig::new().timeout_timestamp(u64::MAX), u64::MAX);
    }
}
