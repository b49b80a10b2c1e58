//! Bot runner - connect, dispatch loop, reply delivery

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinError;

use crate::application::errors::{panic_message, BotError};
use crate::application::lifecycle::{LifecycleCoordinator, ShutdownReason};
use crate::application::messaging::Dispatcher;
use crate::domain::entities::Reply;
use crate::domain::traits::Transport;
use crate::infrastructure::plugins::PluginRegistry;

/// How long queued replies may take to flush once the loop stops
const REPLY_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Drives one transport: one message at a time through the dispatcher
pub struct BotRunner<T: Transport + 'static> {
    name: String,
    transport: Arc<T>,
    dispatcher: Dispatcher,
    coordinator: Arc<LifecycleCoordinator>,
}

impl<T: Transport + 'static> BotRunner<T> {
    pub fn new(
        name: impl Into<String>,
        transport: Arc<T>,
        registry: Arc<PluginRegistry>,
        coordinator: Arc<LifecycleCoordinator>,
    ) -> Self {
        Self {
            name: name.into(),
            transport,
            dispatcher: Dispatcher::new(registry),
            coordinator,
        }
    }

    /// Run until `shutdown` resolves, the message source closes, or a fatal
    /// transport error occurs.
    pub async fn run<S>(self, shutdown: S) -> Result<ShutdownReason, BotError>
    where
        S: Future<Output = ShutdownReason>,
    {
        tokio::pin!(shutdown);

        let info = tokio::select! {
            reason = &mut shutdown => return Ok(reason),
            info = self.transport.connect() => info?,
        };
        tracing::info!("{} started as @{} on {}", self.name, info.username, self.transport.platform());
        self.coordinator.mark_running();

        let (replies, outbox) = mpsc::unbounded_channel();
        let mut sender = tokio::spawn(deliver(self.transport.clone(), outbox));

        let outcome = loop {
            tokio::select! {
                reason = &mut shutdown => break Ok(reason),
                // Ends before the loop only if the task died
                joined = &mut sender => return Err(sender_failure(joined.err())),
                batch = self.transport.poll() => match batch {
                    Ok(Some(messages)) => {
                        for message in messages {
                            let message = message.with_reply_sink(replies.clone());
                            if let Err(e) = self.dispatcher.route(&message) {
                                tracing::warn!("Dispatch failed: {}", e);
                            }
                        }
                    }
                    Ok(None) => break Ok(ShutdownReason::Exit),
                    Err(e) => break Err(e),
                },
            }
        };

        drop(replies);
        match tokio::time::timeout(REPLY_FLUSH_TIMEOUT, sender).await {
            Ok(Ok(())) => outcome,
            Ok(Err(e)) => {
                let failure = sender_failure(Some(e));
                match outcome {
                    Ok(_) => Err(failure),
                    Err(e) => {
                        tracing::error!("{}", failure);
                        Err(e)
                    }
                }
            }
            Err(_) => {
                tracing::warn!("Gave up waiting for queued replies");
                outcome
            }
        }
    }
}

fn sender_failure(error: Option<JoinError>) -> BotError {
    match error {
        Some(e) if e.is_panic() => {
            BotError::Internal(format!("Reply sender panicked: {}", panic_message(e.into_panic().as_ref())))
        }
        Some(e) => BotError::Internal(format!("Reply sender stopped: {}", e)),
        None => BotError::Internal("Reply sender stopped".to_string()),
    }
}

/// Send every queued reply until all senders are gone
async fn deliver<T: Transport>(transport: Arc<T>, mut outbox: mpsc::UnboundedReceiver<Reply>) {
    while let Some(reply) = outbox.recv().await {
        if let Err(e) = transport.send(&reply).await {
            tracing::error!("Failed to send message: {}", e);
        }
    }
}
