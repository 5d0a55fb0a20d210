//! Inbound shutdown signals.
//!
//! The signal source never touches supervisor state directly: it resolves
//! a future the control loop races against, and the control loop owns the
//! shutdown from there.

/// Wait for SIGINT or SIGTERM and return the signal number received.
///
/// On non-unix platforms (or if handler registration fails) this degrades
/// to Ctrl-C, reported as SIGINT.
pub async fn wait_for_signal() -> i32 {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        if let (Ok(mut interrupt), Ok(mut terminate)) = (
            signal(SignalKind::interrupt()),
            signal(SignalKind::terminate()),
        ) {
            return tokio::select! {
                _ = interrupt.recv() => 2,
                _ = terminate.recv() => 15,
            };
        }
    }

    let _ = tokio::signal::ctrl_c().await;
    2
}
