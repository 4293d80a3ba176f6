use std::future::Future;

use tokio_util::sync::CancellationToken;

/// Resolve on the first SIGTERM or SIGINT (Ctrl+C elsewhere).
pub async fn wait_for_shutdown() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::signal;
        use tokio::signal::unix::SignalKind;

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = sigterm.recv() => tracing::info!(signal = "SIGTERM", "Shutdown signal received"),
            _ = sigint.recv() => tracing::info!(signal = "SIGINT", "Shutdown signal received"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        tracing::info!(signal = "ctrl_c", "Shutdown signal received");
    }

    Ok(())
}

/// Cancel `token` once `signal` resolves.
///
/// A signal listener that cannot be installed cancels as well.
pub async fn cancel_on<F>(signal: F, token: CancellationToken)
where
    F: Future<Output = anyhow::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!(error = %e, "Unable to listen for shutdown signals, stopping");
    }
    token.cancel();
}
