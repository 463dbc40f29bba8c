//! Interpreter configuration

use serde::Deserialize;

/// Tunables for a run; every field has a default so partial files are valid
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Prefix of every error report line
    pub error_prefix: String,

    /// Emit a line naming the state when an intent is activated
    pub announce_states: bool,

    /// Default tracing filter used by the command-line runner
    pub log_filter: String,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            error_prefix: "Error: ".to_string(),
            announce_states: true,
            log_filter: "warn".to_string(),
        }
    }
}
