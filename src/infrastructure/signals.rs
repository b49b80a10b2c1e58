//! OS termination signals

use crate::application::lifecycle::ShutdownReason;

/// Wait for the first termination signal.
///
/// Ctrl-C maps to `Interrupt`; on Unix SIGTERM, SIGUSR1 and SIGUSR2 map to
/// `Signal`. If a listener can't be installed, that signal is not awaited.
pub async fn wait_for_termination() -> ShutdownReason {
    let interrupt = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => ShutdownReason::Interrupt,
            Err(e) => {
                tracing::warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        async fn named(kind: SignalKind, name: &'static str) -> ShutdownReason {
            match signal(kind) {
                Ok(mut stream) => {
                    stream.recv().await;
                    ShutdownReason::Signal(name)
                }
                Err(e) => {
                    tracing::warn!("Failed to listen for {}: {}", name, e);
                    std::future::pending().await
                }
            }
        }

        tokio::select! {
            reason = interrupt => reason,
            reason = named(SignalKind::terminate(), "SIGTERM") => reason,
            reason = named(SignalKind::user_defined1(), "SIGUSR1") => reason,
            reason = named(SignalKind::user_defined2(), "SIGUSR2") => reason,
        }
    }

    #[cfg(not(unix))]
    {
        interrupt.await
    }
}
