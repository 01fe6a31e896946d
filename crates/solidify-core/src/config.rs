use serde::{Deserialize, Serialize};

/// Limits and buffering for a liquify or solidify session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Maximum nesting of objects inside objects while solidifying. Deeper
    /// input fails with `LimitExceeded` instead of exhausting the stack;
    /// each level costs a few stack frames, so a large value needs a thread
    /// with a matching stack. Writing is not limited.
    pub max_depth: usize,
    /// Largest string or array length written or accepted, checked before
    /// anything is allocated or recorded in a cache.
    pub max_length: usize,
    /// Capacity of the buffer wrapping the stream.
    pub buffer_capacity: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: 1024,
            max_length: 64 * 1024 * 1024,
            buffer_capacity: 8 * 1024,
        }
    }
}

impl CodecConfig {
    /// Tight limits for decoding input from an untrusted peer.
    pub fn untrusted() -> Self {
        Self {
            max_depth: 64,
            max_length: 1024 * 1024,
            ..Default::default()
        }
    }
}
