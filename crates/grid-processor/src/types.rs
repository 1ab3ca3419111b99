//! Small shared types.

use serde::{Deserialize, Serialize};

/// Which slice of a multi-dimensional variable to read.
///
/// `None` means the variable has no such dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DataSelection {
    pub time_index: Option<usize>,
    pub z_index: Option<usize>,
}

impl DataSelection {
    pub fn new(time_index: Option<usize>, z_index: Option<usize>) -> Self {
        Self {
            time_index,
            z_index,
        }
    }
}

/// Statistics about a result cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub evictions: u64,
    pub capacity: usize,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 - 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
