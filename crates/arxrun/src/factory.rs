//! Creates isolation boundaries for hosted applications.

use std::sync::Arc;

use tracing::info;

use crate::boundary::Boundary;
use crate::boundary::BoundaryError;
use crate::info::HostedAppInfo;
use crate::proxy::HostProxy;
use crate::registry::AppTypeRegistry;
use crate::registry::RegistryError;
use crate::status::StatusCell;

#[derive(Debug)]
pub enum CreateError {
    /// The application type named in the app info is not registered.
    TypeResolution(RegistryError),
    /// The boundary could not be created; no proxy exists.
    Boundary(BoundaryError),
}

impl std::fmt::Display for CreateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TypeResolution(e) => write!(f, "Failed to resolve application type: {}", e),
            Self::Boundary(e) => write!(f, "Failed to create isolation boundary: {}", e),
        }
    }
}

impl std::error::Error for CreateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TypeResolution(e) => Some(e),
            Self::Boundary(e) => Some(e),
        }
    }
}

impl From<BoundaryError> for CreateError {
    fn from(e: BoundaryError) -> Self {
        Self::Boundary(e)
    }
}

/// Creates one isolation boundary per hosted application and hands its
/// ownership to the returned proxy.
pub struct HostFactory {
    registry: Arc<AppTypeRegistry>,
}

impl HostFactory {
    pub fn new(registry: Arc<AppTypeRegistry>) -> Self {
        Self { registry }
    }

    /// Resolves the application type, launches a boundary preloaded with
    /// the binaries the app info lists, and returns the controlling proxy.
    pub async fn create(&self, info: HostedAppInfo) -> Result<HostProxy, CreateError> {
        // Resolve before anything exists, so a bad type name never leaves
        // a boundary running.
        let blueprint = self
            .registry
            .resolve(info.app_type())
            .map_err(CreateError::TypeResolution)?;

        info!(
            app = info.name(),
            app_type = info.app_type(),
            "creating isolation boundary"
        );
        let status = StatusCell::new();
        let boundary = Boundary::launch(info.clone(), blueprint, status.clone()).await?;
        Ok(HostProxy::new(info, status, boundary))
    }
}
