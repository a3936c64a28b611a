//! `[pipeline]` section.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::feed::MAX_CHANNEL_CAPACITY;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Items buffered between the fetch tasks and the aggregator.
    pub channel_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 16,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.channel_capacity == 0 {
            diag.error(
                FieldPath::new("pipeline.channel_capacity"),
                "channel capacity must be at least 1",
            );
        } else if self.channel_capacity > MAX_CHANNEL_CAPACITY {
            diag.error_with_hint(
                FieldPath::new("pipeline.channel_capacity"),
                format!("channel capacity {} is too large", self.channel_capacity),
                format!("use a value between 1 and {MAX_CHANNEL_CAPACITY}"),
            );
        }
    }
}
