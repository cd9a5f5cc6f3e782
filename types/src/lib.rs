pub mod formatting;

use serde::{Deserialize, Serialize};

/// Persisted CLI settings.
///
/// Loaded by the CLI via confy; unknown or missing fields fall back to
/// defaults so older settings files keep working after upgrades.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory searched for captured logs when a relative path is given.
    /// Empty means "relative to the current directory".
    pub log_directory: String,
    /// Emit the timeline as JSON instead of text by default.
    pub json_output: bool,
}
