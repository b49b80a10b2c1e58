//! Bot host - phase-ordered startup, serving and shutdown

use std::future::Future;
use std::sync::Arc;

use crate::application::errors::{panic_message, BotError};
use crate::application::lifecycle::{LifecycleCoordinator, ShutdownReason};
use crate::application::services::runner::BotRunner;
use crate::domain::traits::Transport;
use crate::infrastructure::config::Config;
use crate::infrastructure::plugins::PluginRegistry;
use crate::plugins::{BuiltinCatalog, LoadReport, PluginManager};

/// A configured host with its plugins loaded, not yet connected
pub struct BotHost {
    name: String,
    manager: PluginManager,
    report: LoadReport,
    coordinator: Arc<LifecycleCoordinator>,
}

impl BotHost {
    /// Load every plugin from the configured directory.
    pub fn start(config: &Config, catalog: BuiltinCatalog) -> Result<Self, BotError> {
        let manager = PluginManager::new(catalog);
        let report = manager.load_all(&config.plugin_directory, config.plugin_entries)?;
        tracing::info!("Plugins: {}", report);
        for plugin in manager.list_plugins() {
            tracing::debug!(
                "  {} - {} [{}]",
                plugin.name,
                plugin.description.as_deref().unwrap_or("no description"),
                plugin.commands.join(", ")
            );
        }

        let coordinator = Arc::new(LifecycleCoordinator::new(manager.registry()));
        Ok(Self {
            name: config.name.clone(),
            manager,
            report,
            coordinator,
        })
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn registry(&self) -> Arc<PluginRegistry> {
        self.manager.registry()
    }

    pub fn coordinator(&self) -> Arc<LifecycleCoordinator> {
        self.coordinator.clone()
    }

    /// Connect `transport`, dispatch until shutdown, then run the
    /// termination path. Returns the process exit status.
    ///
    /// The runner executes as its own task; an error or panic escaping it
    /// is treated as fatal.
    pub async fn serve<T, S>(&self, transport: Arc<T>, shutdown: S) -> u8
    where
        T: Transport + 'static,
        S: Future<Output = ShutdownReason> + Send + 'static,
    {
        let runner = BotRunner::new(self.name.clone(), transport, self.registry(), self.coordinator());

        let reason = match tokio::spawn(runner.run(shutdown)).await {
            Ok(Ok(reason)) => reason,
            Ok(Err(e)) => ShutdownReason::Fatal(e.to_string()),
            Err(e) if e.is_panic() => ShutdownReason::Fatal(format!("panicked: {}", panic_message(e.into_panic().as_ref()))),
            Err(e) => ShutdownReason::Fatal(e.to_string()),
        };

        self.coordinator.shutdown(reason).unwrap_or(0)
    }
}
