//! Environment-wide values handed to every hosted application at start.

use std::path::Path;
use std::path::PathBuf;

/// Host-wide environment shared read-only with every hosted application of
/// one host process.
#[derive(Clone, Debug)]
pub struct AppServerContext {
    name: String,
    base_dir: PathBuf,
}

impl AppServerContext {
    pub fn new(name: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            base_dir: base_dir.into(),
        }
    }

    /// Identity of the host process.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory boundaries resolve their own configuration against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}
