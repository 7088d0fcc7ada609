//! State database configuration

use serde::{Deserialize, Serialize};

/// Default capacity of the code-size cache
pub const DEFAULT_CODE_SIZE_CACHE: usize = 100_000;

/// Construction parameters for [`crate::StateDb`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StateConfig {
    /// Nonce given to freshly created accounts
    pub starting_nonce: u64,
    /// Number of code hashes whose code length is cached
    pub code_size_cache: usize,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            starting_nonce: 0,
            code_size_cache: DEFAULT_CODE_SIZE_CACHE,
        }
    }
}

impl StateConfig {
    /// Config with a non-zero starting nonce (public test networks)
    pub fn with_starting_nonce(starting_nonce: u64) -> Self {
        Self {
            starting_nonce,
            ..Self::default()
        }
    }
}
