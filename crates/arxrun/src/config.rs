//! Configuration capabilities supplied to and consumed by a boundary.

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

/// Capability a hosted application uses to fetch its own configuration.
///
/// Supplied by the caller at start time and registered into the container;
/// never owned by the host.
pub trait ConfigurationProvider: Send + Sync {
    /// Fetches the named configuration bundle.
    fn bundle(&self, name: &str) -> anyhow::Result<String>;
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            Self::Parse { path, source } => {
                write!(f, "Failed to parse {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// Optional per-boundary container settings.
///
/// Loaded from `container.<boundary>.toml` under the context base
/// directory. A missing file means default wiring; only a file that exists
/// but cannot be read or parsed is an error.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ContainerSettings {
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
}

impl ContainerSettings {
    pub fn load(base_dir: &Path, boundary: &str) -> Result<Self, ConfigError> {
        let path = base_dir.join(format!("container.{boundary}.toml"));
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_means_default_wiring() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ContainerSettings::load(dir.path(), "absent").unwrap();
        assert!(settings.settings.is_empty());
    }

    #[test]
    fn file_contents_are_parsed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("container.demo.toml"),
            "[settings]\ngreeting = \"hello\"\n",
        )
        .unwrap();

        let settings = ContainerSettings::load(dir.path(), "demo").unwrap();
        assert_eq!(settings.get("greeting"), Some("hello"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("container.bad.toml"), "not toml [").unwrap();

        let err = ContainerSettings::load(dir.path(), "bad").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
