//! Export discovery over a package's content tree.
//!
//! Each provider understands exactly one artifact kind. Probing a provider
//! with a kind it does not own yields an empty grouping, never an error, so
//! the same package can be offered to the whole provider set and each
//! provider claims only its own items.
//!
//! Discovery is a pure function of the package tree: items are immutable
//! snapshots, and no state is shared between calls.

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use walkdir::WalkDir;

use crate::package::ExecutionEnvironment;
use crate::package::Package;
use crate::package::PackageId;

/// Directory name reserved for native binary exports, compared
/// case-insensitively.
const NATIVE_DIR: &str = "unmanaged";

/// Extensions that name a loadable native module.
const NATIVE_EXTENSIONS: [&str; 3] = ["dll", "so", "dylib"];

#[derive(Debug)]
pub enum Error {
    Walk(walkdir::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Walk(e) => write!(f, "Failed to walk package tree: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Walk(e) => Some(e),
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(e: walkdir::Error) -> Self {
        Self::Walk(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Kinds of artifacts a package can export.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum ArtifactKind {
    NativeBinary,
    Assembly,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NativeBinary => write!(f, "native binary"),
            Self::Assembly => write!(f, "assembly"),
        }
    }
}

/// A discovered file inside a package. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportItem {
    /// Location within the package's export tree, `/`-separated.
    pub logical_path: String,
    pub package: PackageId,
    pub file: PathBuf,
}

/// Discovered artifacts grouped by logical path. Duplicate logical paths
/// coalesce into one group.
pub type ExportGroups = BTreeMap<String, Vec<ExportItem>>;

/// A capability probe for one artifact kind.
pub trait ExportProvider: Send + Sync {
    /// The artifact kind this provider understands.
    fn kind(&self) -> ArtifactKind;

    /// Enumerates matching artifacts, grouped by logical path.
    ///
    /// Returns an empty grouping when `kind` is not this provider's own.
    fn items(
        &self,
        package: &Package,
        env: &ExecutionEnvironment,
        kind: ArtifactKind,
    ) -> Result<ExportGroups>;
}

/// Discovers loadable native modules under the reserved `unmanaged`
/// directory of a package.
pub struct NativeBinaryExporter;

impl ExportProvider for NativeBinaryExporter {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::NativeBinary
    }

    fn items(
        &self,
        package: &Package,
        _env: &ExecutionEnvironment,
        kind: ArtifactKind,
    ) -> Result<ExportGroups> {
        if kind != self.kind() {
            return Ok(ExportGroups::new());
        }

        let mut groups = ExportGroups::new();
        for entry in WalkDir::new(package.root()) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(package.root()) else {
                continue;
            };
            if !in_native_dir(relative) || !is_native_module(relative) {
                continue;
            }
            let logical = logical_path(relative);
            groups.entry(logical.clone()).or_default().push(ExportItem {
                logical_path: logical,
                package: package.id().clone(),
                file: entry.path().to_path_buf(),
            });
        }
        Ok(groups)
    }
}

/// Probes every provider in the set and merges the groups they claim.
pub fn discover(
    providers: &[&dyn ExportProvider],
    package: &Package,
    env: &ExecutionEnvironment,
    kind: ArtifactKind,
) -> Result<ExportGroups> {
    let mut merged = ExportGroups::new();
    for provider in providers {
        for (path, mut items) in provider.items(package, env, kind)? {
            merged.entry(path).or_default().append(&mut items);
        }
    }
    Ok(merged)
}

fn in_native_dir(relative: &Path) -> bool {
    let mut components = relative.components();
    let Some(first) = components.next().and_then(|c| c.as_os_str().to_str()) else {
        return false;
    };
    first.eq_ignore_ascii_case(NATIVE_DIR) && components.next().is_some()
}

fn is_native_module(relative: &Path) -> bool {
    relative
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            NATIVE_EXTENSIONS
                .iter()
                .any(|native| ext.eq_ignore_ascii_case(native))
        })
}

fn logical_path(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect::<Vec<_>>()
        .join("/")
}
