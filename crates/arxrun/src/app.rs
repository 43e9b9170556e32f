//! Capability surface between the host and a hosted application.

use async_trait::async_trait;

use crate::container::Container;
use crate::container::ContainerError;

/// Entry point of a hosted application.
///
/// `start` runs once per lifecycle inside the boundary. There is no stop
/// hook; teardown happens through `Drop` when the container is disposed.
#[async_trait]
pub trait HostedApplication: Send {
    async fn start(&mut self) -> anyhow::Result<()>;
}

/// Registry entry binding an application-type name to explicit wiring and
/// construction.
///
/// Replaces reflective instantiation: the application declares its bindings
/// through `install` and its constructor through `construct`, both invoked
/// by the runtime in a fixed order after the server context and
/// configuration provider are registered.
pub trait AppBlueprint: Send + Sync + 'static {
    /// Installs the application's own declared bindings. The default is no
    /// extra wiring.
    fn install(&self, _container: &mut Container) -> Result<(), ContainerError> {
        Ok(())
    }

    /// Constructs the application from the populated container.
    fn construct(&self, container: &Container)
    -> Result<Box<dyn HostedApplication>, ContainerError>;
}

impl std::fmt::Debug for dyn AppBlueprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AppBlueprint")
    }
}
