// Signal handling module
//
// - SIGTERM: graceful shutdown
// - SIGINT:  graceful shutdown (Ctrl+C)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Shutdown signal shared between the signal task and the server loop
pub struct SignalHandler {
    pub shutdown: Arc<Notify>,
    pub shutdown_requested: Arc<AtomicBool>,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self {
            shutdown: Arc::new(Notify::new()),
            shutdown_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Mark shutdown and wake the server loop
    ///
    /// Uses `notify_one` so the permit is kept if the loop is not waiting yet.
    pub fn request_shutdown(&self, reason: &str) {
        if self.shutdown_requested.swap(true, Ordering::SeqCst) {
            return;
        }
        logger::log_info(&format!("[SIGNAL] {reason} received, initiating graceful shutdown"));
        self.shutdown.notify_one();
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Start signal handlers (Unix)
#[cfg(unix)]
pub fn start_signal_handler(handler: Arc<SignalHandler>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => handler.request_shutdown("SIGTERM"),
            _ = sigint.recv() => handler.request_shutdown("SIGINT"),
        }
    });

    logger::log_debug(&format!(
        "[SIGNAL] SIGTERM/SIGINT handlers registered (pid {})",
        std::process::id()
    ));
    Ok(())
}

/// Non-unix fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(handler: Arc<SignalHandler>) -> std::io::Result<()> {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            handler.request_shutdown("Ctrl+C");
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_request_shutdown_stores_permit() {
        let handler = SignalHandler::new();
        handler.request_shutdown("test");
        assert!(handler.shutdown_requested.load(Ordering::SeqCst));

        // Permit was stored before anyone waited
        tokio::time::timeout(std::time::Duration::from_secs(1), handler.shutdown.notified())
            .await
            .unwrap();
    }

    #[test]
    fn test_request_shutdown_is_idempotent() {
        let handler = SignalHandler::new();
        handler.request_shutdown("first");
        handler.request_shutdown("second");
        assert!(handler.shutdown_requested.load(Ordering::SeqCst));
    }
}
