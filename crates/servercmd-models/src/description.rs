//! Public command descriptions.

use serde::{Deserialize, Serialize};

/// Public descriptor of a registered command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandDescription {
    /// Unique name, scoped to one engine.
    pub command_name: String,

    /// Names of the expected arguments. Informational: callers should pass
    /// an argument vector of the same length; parsing is up to the command.
    pub argument_names: Vec<String>,

    /// Text describing what the command does.
    pub description: String,
}
