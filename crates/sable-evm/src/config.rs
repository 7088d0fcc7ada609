//! Interpreter configuration

use serde::{Deserialize, Serialize};

/// Interpreter switches
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VmConfig {
    /// Nested calls and creates succeed without running the callee
    pub no_recursion: bool,
    /// Report every step to the tracer
    pub debug: bool,
}
