//! Store configuration

use serde::{Deserialize, Serialize};

/// Default block rotation threshold
pub const DEFAULT_BLOCK_TARGET_BYTES: u64 = 64 * 1024;

/// Configuration for a [`Store`](crate::Store)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Record bytes after which the next write opens a new block
    pub block_target_bytes: u64,
    /// Whether to sync each append to disk before closing the file
    pub sync_on_write: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            block_target_bytes: DEFAULT_BLOCK_TARGET_BYTES,
            sync_on_write: true,
        }
    }
}

impl StoreConfig {
    /// Small blocks for devices with little flash
    pub fn embedded() -> Self {
        Self {
            block_target_bytes: 4 * 1024,
            sync_on_write: true,
        }
    }

    /// Tiny blocks and no fsync, for tests
    pub fn testing() -> Self {
        Self {
            block_target_bytes: 128,
            sync_on_write: false,
        }
    }

    /// Set the rotation threshold
    pub fn with_block_target(mut self, bytes: u64) -> Self {
        self.block_target_bytes = bytes;
        self
    }

    /// Turn per-append sync on or off
    pub fn with_sync_on_write(mut self, enabled: bool) -> Self {
        self.sync_on_write = enabled;
        self
    }
}
