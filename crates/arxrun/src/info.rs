//! Description of one hosted application.

use std::path::PathBuf;

use arxpack::ArtifactKind;
use arxpack::ExecutionEnvironment;
use arxpack::ExportProvider;
use arxpack::NativeBinaryExporter;
use arxpack::Package;

/// Identifies one hosted application and the binaries its boundary must
/// preload before any application code runs.
///
/// Immutable once handed to the factory; at most one live boundary exists
/// for it at a time.
#[derive(Clone, Debug)]
pub struct HostedAppInfo {
    name: String,
    app_type: String,
    assemblies: Vec<PathBuf>,
    native_libraries: Vec<PathBuf>,
}

impl HostedAppInfo {
    pub fn new(name: impl Into<String>, app_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            app_type: app_type.into(),
            assemblies: Vec::new(),
            native_libraries: Vec::new(),
        }
    }

    pub fn with_assembly(mut self, path: impl Into<PathBuf>) -> Self {
        self.assemblies.push(path.into());
        self
    }

    pub fn with_native_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.native_libraries.push(path.into());
        self
    }

    /// Appends the native binaries a package exports for the given
    /// environment.
    pub fn with_package_exports(
        mut self,
        package: &Package,
        env: &ExecutionEnvironment,
    ) -> arxpack::Result<Self> {
        let groups = NativeBinaryExporter.items(package, env, ArtifactKind::NativeBinary)?;
        for items in groups.into_values() {
            for item in items {
                self.native_libraries.push(item.file);
            }
        }
        Ok(self)
    }

    /// Name of the hosted application, unique per host instance.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered application-type name used to locate the blueprint.
    pub fn app_type(&self) -> &str {
        &self.app_type
    }

    pub fn assemblies(&self) -> &[PathBuf] {
        &self.assemblies
    }

    pub fn native_libraries(&self) -> &[PathBuf] {
        &self.native_libraries
    }
}
