// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Graceful shutdown coordination.
//!
//! OS signals (SIGTERM, SIGINT, SIGQUIT on Unix; Ctrl+C elsewhere) and
//! manual requests both end up in [`ShutdownCoordinator::initiate_shutdown`],
//! which wakes every [`ShutdownSignal`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use tokio::sync::watch;
use tracing::{info, warn};

// =============================================================================
// ShutdownCoordinator
// =============================================================================

/// Coordinates graceful shutdown of the server.
///
/// ```ignore
/// let coordinator = ShutdownCoordinator::new();
/// let signal = coordinator.shutdown_signal();
///
/// tokio::spawn({
///     let coordinator = coordinator.clone();
///     async move { coordinator.wait_for_shutdown().await }
/// });
///
/// server.run_with_shutdown(signal).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
    sender: Arc<watch::Sender<bool>>,
    shutdown_initiated: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    /// Creates a new shutdown coordinator.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
            shutdown_initiated: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns a future that resolves once shutdown is initiated.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        let mut receiver = self.sender.subscribe();
        ShutdownSignal {
            inner: Box::pin(async move {
                // A closed channel means the coordinator is gone: stop too.
                let _ = receiver.wait_for(|initiated| *initiated).await;
            }),
        }
    }

    /// Initiates shutdown. Idempotent.
    pub fn initiate_shutdown(&self) {
        if self
            .shutdown_initiated
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!("Shutdown initiated");
            self.sender.send_replace(true);
        }
    }

    /// Returns true if shutdown has been initiated.
    pub fn is_shutdown_initiated(&self) -> bool {
        self.shutdown_initiated.load(Ordering::SeqCst)
    }

    /// Waits for an OS signal or a manual request, then initiates shutdown.
    pub async fn wait_for_shutdown(&self) {
        if self.is_shutdown_initiated() {
            return;
        }

        let manual = self.shutdown_signal();
        tokio::select! {
            _ = os_signal() => {}
            _ = manual => {}
        }

        self.initiate_shutdown();
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
async fn os_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let (sigterm, sigint, sigquit) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
        signal(SignalKind::quit()),
    ) {
        (Ok(term), Ok(int), Ok(quit)) => (term, int, quit),
        _ => {
            warn!("Failed to register Unix signal handlers, falling back to Ctrl+C");
            ctrl_c().await;
            return;
        }
    };
    let (mut sigterm, mut sigint, mut sigquit) = (sigterm, sigint, sigquit);

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM"),
        _ = sigint.recv() => info!("Received SIGINT"),
        _ = sigquit.recv() => info!("Received SIGQUIT"),
    }
}

#[cfg(not(unix))]
async fn os_signal() {
    ctrl_c().await;
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C"),
        Err(e) => {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

// =============================================================================
// ShutdownSignal
// =============================================================================

/// A future that resolves when shutdown is initiated.
///
/// Suitable for axum's `with_graceful_shutdown`.
pub struct ShutdownSignal {
    inner: Pin<Box<dyn Future<Output = ()> + Send>>,
}

impl Future for ShutdownSignal {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl std::fmt::Debug for ShutdownSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownSignal").finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_signal_resolves_after_initiate() {
        let coordinator = ShutdownCoordinator::new();
        let signal = coordinator.shutdown_signal();

        let trigger = coordinator.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.initiate_shutdown();
        });

        tokio::time::timeout(Duration::from_secs(1), signal)
            .await
            .expect("shutdown signal should resolve");
        assert!(coordinator.is_shutdown_initiated());
    }

    #[tokio::test]
    async fn test_signal_created_after_initiate_resolves() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.initiate_shutdown();

        tokio::time::timeout(Duration::from_millis(100), coordinator.shutdown_signal())
            .await
            .expect("late signal should resolve immediately");
    }

    #[tokio::test]
    async fn test_wait_for_shutdown_returns_on_manual_request() {
        let coordinator = ShutdownCoordinator::new();

        let trigger = coordinator.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.initiate_shutdown();
        });

        tokio::time::timeout(Duration::from_secs(1), coordinator.wait_for_shutdown())
            .await
            .expect("wait_for_shutdown should return");
    }

    #[tokio::test]
    async fn test_double_shutdown() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.initiate_shutdown();
        coordinator.initiate_shutdown();
        assert!(coordinator.is_shutdown_initiated());
    }
}
