//! Lifecycle status of a hosted application.

use std::sync::Arc;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering;

/// Lifecycle states of one hosted application instance.
///
/// Transitions are driven exclusively by the runtime inside the boundary:
/// NotStarted → Starting → Started → Stopping → NotStarted. A failed start
/// returns to NotStarted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HostedAppStatus {
    NotStarted,
    Starting,
    Started,
    Stopping,
}

impl std::fmt::Display for HostedAppStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not started"),
            Self::Starting => write!(f, "starting"),
            Self::Started => write!(f, "started"),
            Self::Stopping => write!(f, "stopping"),
        }
    }
}

/// Shared status cell.
///
/// The runtime publishes each completed transition; the proxy reads without
/// blocking on an in-flight Start or Stop, and only ever observes the last
/// published value.
#[derive(Clone, Debug)]
pub(crate) struct StatusCell(Arc<AtomicU8>);

impl StatusCell {
    pub(crate) fn new() -> Self {
        Self(Arc::new(AtomicU8::new(HostedAppStatus::NotStarted as u8)))
    }

    pub(crate) fn set(&self, status: HostedAppStatus) {
        self.0.store(status as u8, Ordering::Release);
    }

    pub(crate) fn get(&self) -> HostedAppStatus {
        match self.0.load(Ordering::Acquire) {
            0 => HostedAppStatus::NotStarted,
            1 => HostedAppStatus::Starting,
            2 => HostedAppStatus::Started,
            _ => HostedAppStatus::Stopping,
        }
    }
}
