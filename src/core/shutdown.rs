//! # Termination signal wait.
//!
//! [`wait_for_termination`] completes on the first termination request the
//! process receives. Used by
//! [`Coordinator::run_until_signal`](crate::Coordinator::run_until_signal).
//!
//! Unix: SIGINT, SIGTERM, SIGQUIT. Elsewhere: Ctrl-C.

use crate::error::RuntimeError;

#[cfg(unix)]
pub(crate) async fn wait_for_termination() -> Result<(), RuntimeError> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    let which = tokio::select! {
        _ = sigint.recv() => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
        _ = sigquit.recv() => "SIGQUIT",
    };
    tracing::info!(signal = which, "termination requested");
    Ok(())
}

#[cfg(not(unix))]
pub(crate) async fn wait_for_termination() -> Result<(), RuntimeError> {
    tokio::signal::ctrl_c().await?;
    tracing::info!(signal = "ctrl_c", "termination requested");
    Ok(())
}
