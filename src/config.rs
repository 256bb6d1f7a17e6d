//! Engine-wide tunables. Plain, `serde`-deserializable configuration; no
//! CLI/env wiring here — the command-line surface is an external concern.

use serde::{Deserialize, Serialize};

///
/// EngineConfig
///

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default work allowance granted to a freshly scheduled request.
    pub default_budget: u64,
    /// Default work allowance granted when resuming a suspended request.
    pub resume_budget: u64,
    /// Locale name of the comparator used when a constraint omits one.
    pub default_comparator: String,
    /// Initial capacity hint for a request's arena.
    pub arena_block_size: usize,
    /// Maximum byte length of an encoded cursor string.
    pub max_cursor_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_budget: 10_000,
            resume_budget: 10_000,
            default_comparator: "default".to_owned(),
            arena_block_size: 64,
            max_cursor_len: 4 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EngineConfig;

    #[test]
    fn deserializes_partial_overrides() {
        let config: EngineConfig = serde_json::from_str(r#"{"default_budget": 500}"#).unwrap();

        assert_eq!(config.default_budget, 500);
        assert_eq!(config.default_comparator, "default");
    }
}
