// ── Runtime core configuration ──
//
// Describes where the store lives and who is operating. Built by the
// CLI from its profile; core never reads config files.

use std::path::PathBuf;

use crate::access::Role;

/// Configuration for opening a [`Controller`](crate::Controller).
#[derive(Debug, Clone, Default)]
pub struct CoreConfig {
    /// JSON store file. `None` keeps everything in memory.
    pub data_path: Option<PathBuf>,
    /// Role every command and read is authorized against.
    pub role: Role,
}

impl CoreConfig {
    pub fn with_data_path(path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}
