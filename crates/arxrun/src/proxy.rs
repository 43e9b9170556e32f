//! Caller-side handle to a hosted application running inside an isolation
//! boundary.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use tokio::sync::mpsc;
use tokio::sync::oneshot;

use crate::boundary::Boundary;
use crate::boundary::Command;
use crate::config::ConfigurationProvider;
use crate::context::AppServerContext;
use crate::info::HostedAppInfo;
use crate::runtime::StartError;
use crate::runtime::StopError;
use crate::status::HostedAppStatus;
use crate::status::StatusCell;

/// Forwards lifecycle calls across the isolation boundary and owns the
/// boundary's teardown.
///
/// The boundary never expires on its own: it stays alive until this proxy
/// destroys it after a successful `stop`, or until the proxy is dropped
/// (abandonment closes the command channel and the boundary thread exits).
#[derive(Debug)]
pub struct HostProxy {
    info: HostedAppInfo,
    status: StatusCell,
    boundary: Mutex<Option<Boundary>>,
}

impl HostProxy {
    pub(crate) fn new(info: HostedAppInfo, status: StatusCell, boundary: Boundary) -> Self {
        Self {
            info,
            status,
            boundary: Mutex::new(Some(boundary)),
        }
    }

    pub fn app_info(&self) -> &HostedAppInfo {
        &self.info
    }

    /// Last completed lifecycle transition. Never blocks on an in-flight
    /// Start or Stop.
    pub fn status(&self) -> HostedAppStatus {
        self.status.get()
    }

    /// True while the boundary thread is running. After a successful `stop`
    /// this is always false.
    pub fn is_boundary_alive(&self) -> bool {
        self.boundary
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(Boundary::is_alive)
    }

    /// Starts the hosted application inside the boundary, blocking until
    /// its start hook completes or fails.
    pub async fn start(
        &self,
        provider: Arc<dyn ConfigurationProvider>,
        context: AppServerContext,
    ) -> Result<(), StartError> {
        let Some(commands) = self.commands() else {
            return Err(StartError::BoundaryLost);
        };
        let (reply_tx, reply_rx) = oneshot::channel();
        commands
            .send(Command::Start {
                provider,
                context,
                reply: reply_tx,
            })
            .await
            .map_err(|_| StartError::BoundaryLost)?;
        reply_rx.await.map_err(|_| StartError::BoundaryLost)?
    }

    /// Stops the hosted application, then destroys the boundary.
    ///
    /// A failed stop leaves the boundary alive and propagates the error;
    /// the caller decides between retry and abandonment.
    pub async fn stop(&self) -> Result<(), StopError> {
        let Some(commands) = self.commands() else {
            return Err(StopError::BoundaryLost);
        };
        let (reply_tx, reply_rx) = oneshot::channel();
        commands
            .send(Command::Stop { reply: reply_tx })
            .await
            .map_err(|_| StopError::BoundaryLost)?;
        reply_rx.await.map_err(|_| StopError::BoundaryLost)??;
        drop(commands);

        // Teardown happens only after a stop the runtime accepted.
        let boundary = self
            .boundary
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(boundary) = boundary {
            boundary.destroy();
        }
        Ok(())
    }

    fn commands(&self) -> Option<mpsc::Sender<Command>> {
        self.boundary
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|boundary| boundary.commands.clone())
    }
}
