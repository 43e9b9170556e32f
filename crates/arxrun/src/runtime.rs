//! Hosted application runtime: the lifecycle state machine running inside
//! an isolation boundary.
//!
//! ## Invariants
//!
//! - The container exists exactly while the status is Starting or Started
//! - A failed start always rolls the container back and returns to
//!   NotStarted; the caller sees the original cause, and a disposal failure
//!   during rollback is combined with it rather than replacing it
//! - Start and Stop are serialized by the boundary's command loop

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::info;
use tracing::warn;

use crate::app::AppBlueprint;
use crate::app::HostedApplication;
use crate::config::ConfigError;
use crate::config::ConfigurationProvider;
use crate::config::ContainerSettings;
use crate::container::Container;
use crate::container::ContainerError;
use crate::container::DisposeError;
use crate::context::AppServerContext;
use crate::info::HostedAppInfo;
use crate::status::HostedAppStatus;
use crate::status::StatusCell;
use crate::telemetry;

#[derive(Debug)]
pub enum StartError {
    /// An active container already exists.
    AlreadyStarted,
    /// The per-boundary container settings file exists but is unusable.
    Config(ConfigError),
    /// Wiring installation, registration, or construction failed.
    Container(ContainerError),
    /// The application's own start hook failed.
    Hook(anyhow::Error),
    /// The start hook panicked; the boundary survives.
    HookPanic(String),
    /// Rollback of the partially built container failed too. Both causes
    /// are preserved, since losing either makes diagnosis impossible.
    Rollback {
        start: Box<StartError>,
        dispose: DisposeError,
    },
    /// The boundary thread is gone.
    BoundaryLost,
}

impl std::fmt::Display for StartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyStarted => write!(f, "Host is already started"),
            Self::Config(e) => write!(f, "Failed to start: {}", e),
            Self::Container(e) => write!(f, "Failed to start: {}", e),
            Self::Hook(e) => write!(f, "Failed to start: {}", e),
            Self::HookPanic(msg) => write!(f, "Failed to start: start hook panicked: {}", msg),
            Self::Rollback { start, dispose } => {
                write!(
                    f,
                    "{}; container disposal during rollback also failed: {}",
                    start, dispose
                )
            }
            Self::BoundaryLost => write!(f, "Isolation boundary is gone"),
        }
    }
}

impl std::error::Error for StartError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Container(e) => Some(e),
            Self::Hook(e) => Some(e.as_ref()),
            Self::Rollback { start, .. } => Some(start.as_ref()),
            _ => None,
        }
    }
}

impl From<ConfigError> for StartError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ContainerError> for StartError {
    fn from(e: ContainerError) -> Self {
        Self::Container(e)
    }
}

#[derive(Debug)]
pub enum StopError {
    /// No active container to stop.
    NotStarted,
    Dispose(DisposeError),
    /// The boundary thread is gone.
    BoundaryLost,
}

impl std::fmt::Display for StopError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "Host is not started"),
            Self::Dispose(e) => write!(f, "Failed to stop: {}", e),
            Self::BoundaryLost => write!(f, "Isolation boundary is gone"),
        }
    }
}

impl std::error::Error for StopError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Dispose(e) => Some(e),
            _ => None,
        }
    }
}

/// Lifecycle driver for one hosted application.
///
/// Owns the DI container exclusively. Runs on the boundary thread, where
/// the command loop hands it one lifecycle call at a time.
pub(crate) struct AppRuntime {
    info: HostedAppInfo,
    blueprint: Arc<dyn AppBlueprint>,
    status: StatusCell,
    active: Option<ActiveApp>,
}

struct ActiveApp {
    app: Box<dyn HostedApplication>,
    container: Container,
}

impl AppRuntime {
    pub(crate) fn new(
        info: HostedAppInfo,
        blueprint: Arc<dyn AppBlueprint>,
        status: StatusCell,
    ) -> Self {
        status.set(HostedAppStatus::NotStarted);
        Self {
            info,
            blueprint,
            status,
            active: None,
        }
    }

    pub(crate) async fn start(
        &mut self,
        provider: Arc<dyn ConfigurationProvider>,
        context: AppServerContext,
    ) -> Result<(), StartError> {
        if self.active.is_some() {
            return Err(StartError::AlreadyStarted);
        }
        self.status.set(HostedAppStatus::Starting);
        info!(app = self.info.name(), "starting hosted application");

        match self.start_inner(provider, context).await {
            Ok(active) => {
                self.active = Some(active);
                self.status.set(HostedAppStatus::Started);
                info!(app = self.info.name(), "hosted application started");
                Ok(())
            }
            Err((err, container)) => {
                self.status.set(HostedAppStatus::NotStarted);
                warn!(app = self.info.name(), error = %err, "start failed, rolling back");
                match container.map(Container::dispose).transpose() {
                    Ok(_) => Err(err),
                    Err(dispose) => Err(StartError::Rollback {
                        start: Box::new(err),
                        dispose,
                    }),
                }
            }
        }
    }

    /// The ordered start sequence. On failure, hands back the partially
    /// built container so the caller can roll it back.
    async fn start_inner(
        &mut self,
        provider: Arc<dyn ConfigurationProvider>,
        context: AppServerContext,
    ) -> Result<ActiveApp, (StartError, Option<Container>)> {
        telemetry::register_boundary_rendering();

        let mut container = Container::new();

        // Optional per-boundary settings; a missing file is default wiring.
        let settings = match ContainerSettings::load(context.base_dir(), self.info.name()) {
            Ok(settings) => settings,
            Err(e) => return Err((e.into(), Some(container))),
        };
        container.insert(settings);
        container.insert(context);
        container.insert_arc(provider);

        if let Err(e) = self.blueprint.install(&mut container) {
            return Err((e.into(), Some(container)));
        }

        let mut app = match self.blueprint.construct(&container) {
            Ok(app) => app,
            Err(e) => return Err((e.into(), Some(container))),
        };

        // A panicking hook must not take the boundary down with it.
        match AssertUnwindSafe(app.start()).catch_unwind().await {
            Ok(Ok(())) => Ok(ActiveApp { app, container }),
            Ok(Err(e)) => {
                drop(app);
                Err((StartError::Hook(e), Some(container)))
            }
            Err(payload) => {
                drop(app);
                Err((StartError::HookPanic(panic_message(payload)), Some(container)))
            }
        }
    }

    pub(crate) fn stop(&mut self) -> Result<(), StopError> {
        let Some(active) = self.active.take() else {
            return Err(StopError::NotStarted);
        };
        self.status.set(HostedAppStatus::Stopping);
        info!(app = self.info.name(), "stopping hosted application");

        // The application is dropped before its wired dependencies.
        drop(active.app);
        let result = active.container.dispose();

        self.status.set(HostedAppStatus::NotStarted);
        result.map_err(StopError::Dispose)
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "opaque panic payload".to_string()
    }
}
