//! Isolation boundary: a dedicated, named OS thread owning one hosted
//! application runtime.
//!
//! Bootstrap preloads exactly the binaries listed in the app info before
//! any application code runs. Only full paths from the allow-list are ever
//! opened; there is no search-path probing and no discovery of other
//! applications' binaries.
//!
//! The command loop serves lifecycle calls one at a time over a channel,
//! which is the per-instance serialization of Start and Stop. The boundary
//! has no ambient expiry: it lives until its proxy destroys it.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use libloading::Library;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tracing::debug;
use tracing::info;

use crate::app::AppBlueprint;
use crate::config::ConfigurationProvider;
use crate::context::AppServerContext;
use crate::info::HostedAppInfo;
use crate::runtime::AppRuntime;
use crate::runtime::StartError;
use crate::runtime::StopError;
use crate::status::StatusCell;

#[derive(Debug)]
pub enum BoundaryError {
    /// The boundary thread or its runtime could not be created.
    Spawn(String),
    /// A listed binary could not be loaded during bootstrap.
    Preload { path: PathBuf, message: String },
    /// The boundary thread is gone.
    Lost,
}

impl std::fmt::Display for BoundaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn(msg) => write!(f, "Failed to create boundary: {}", msg),
            Self::Preload { path, message } => {
                write!(f, "Failed to preload {}: {}", path.display(), message)
            }
            Self::Lost => write!(f, "Isolation boundary is gone"),
        }
    }
}

impl std::error::Error for BoundaryError {}

pub(crate) enum Command {
    Start {
        provider: Arc<dyn ConfigurationProvider>,
        context: AppServerContext,
        reply: oneshot::Sender<Result<(), StartError>>,
    },
    Stop {
        reply: oneshot::Sender<Result<(), StopError>>,
    },
}

/// Handle to a live boundary. Owned exclusively by the proxy and destroyed
/// at most once.
#[derive(Debug)]
pub(crate) struct Boundary {
    pub(crate) commands: mpsc::Sender<Command>,
    thread: JoinHandle<()>,
}

impl Boundary {
    /// Spawns the boundary thread, runs bootstrap preloading, and waits for
    /// the boundary to come up. A bootstrap failure leaves no thread
    /// running.
    pub(crate) async fn launch(
        info: HostedAppInfo,
        blueprint: Arc<dyn AppBlueprint>,
        status: StatusCell,
    ) -> Result<Self, BoundaryError> {
        let (tx, mut rx) = mpsc::channel::<Command>(16);
        let (ready_tx, ready_rx) = oneshot::channel::<Result<(), BoundaryError>>();

        let thread_name = format!("boundary-{}", info.name());
        let thread = std::thread::Builder::new()
            .name(thread_name)
            .spawn(move || {
                // Bootstrap runs before any application type is touched.
                let libraries = match preload(&info) {
                    Ok(libraries) => libraries,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let _ = ready_tx.send(Err(BoundaryError::Spawn(e.to_string())));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));

                let mut app_runtime = AppRuntime::new(info, blueprint, status);
                runtime.block_on(async move {
                    while let Some(command) = rx.recv().await {
                        match command {
                            Command::Start {
                                provider,
                                context,
                                reply,
                            } => {
                                let result = app_runtime.start(provider, context).await;
                                let _ = reply.send(result);
                            }
                            Command::Stop { reply } => {
                                let _ = reply.send(app_runtime.stop());
                            }
                        }
                    }
                });
                // Preloaded binaries stay resident for the boundary's whole
                // lifetime.
                drop(libraries);
                debug!("boundary thread exiting");
            })
            .map_err(|e| BoundaryError::Spawn(e.to_string()))?;

        match ready_rx.await {
            Ok(Ok(())) => Ok(Self {
                commands: tx,
                thread,
            }),
            Ok(Err(e)) => {
                // Bootstrap failed; the thread has already returned.
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread.join();
                Err(BoundaryError::Lost)
            }
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        !self.thread.is_finished()
    }

    /// Tears the boundary down: closing the command channel ends the loop,
    /// and the join waits for the thread to finish.
    pub(crate) fn destroy(self) {
        drop(self.commands);
        let _ = self.thread.join();
    }
}

/// Loads the allow-listed binaries, native libraries first so assemblies
/// can link against them.
fn preload(info: &HostedAppInfo) -> Result<Vec<Library>, BoundaryError> {
    let mut libraries = Vec::new();
    for path in info.native_libraries().iter().chain(info.assemblies()) {
        info!(path = %path.display(), "preloading binary");
        let library =
            unsafe { Library::new(path) }.map_err(|e| BoundaryError::Preload {
                path: path.clone(),
                message: e.to_string(),
            })?;
        libraries.push(library);
    }
    Ok(libraries)
}
