//! Model of an installed application package.

use std::path::Path;
use std::path::PathBuf;

/// Identity of an installed package.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct PackageId {
    pub name: String,
    pub version: String,
}

impl PackageId {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl std::fmt::Display for PackageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}

/// An installed package's content tree on disk.
#[derive(Clone, Debug)]
pub struct Package {
    id: PackageId,
    root: PathBuf,
}

impl Package {
    pub fn new(id: PackageId, root: impl Into<PathBuf>) -> Self {
        Self {
            id,
            root: root.into(),
        }
    }

    pub fn id(&self) -> &PackageId {
        &self.id
    }

    /// Root directory of the package's content tree.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Target environment a package's exports are resolved against.
#[derive(Clone, Debug)]
pub struct ExecutionEnvironment {
    pub platform: String,
    pub profile: String,
}

impl ExecutionEnvironment {
    pub fn new(platform: impl Into<String>, profile: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            profile: profile.into(),
        }
    }
}
