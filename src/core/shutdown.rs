use tokio::signal;

/// Resolves on SIGINT or SIGTERM. A handler that fails to install simply never fires.
pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(err) => {
                tracing::error!(error = %err, "Failed to install Ctrl+C handler");
                std::future::pending::<&'static str>().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                "SIGTERM"
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<&'static str>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    let received = tokio::select! {
        name = ctrl_c => name,
        name = terminate => name,
    };

    tracing::info!(signal = received, "Shutdown signal received, draining connections");
}
