//! Lifecycle coordinator - Ready/Exit events and the shutdown state machine

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::application::errors::guarded;
use crate::infrastructure::plugins::PluginRegistry;
use crate::plugins::PluginEvent;

/// Process lifecycle: `Starting -> Running -> ShuttingDown -> Terminated`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LifecycleState {
    Starting = 0,
    Running = 1,
    ShuttingDown = 2,
    Terminated = 3,
}

impl LifecycleState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => LifecycleState::Starting,
            1 => LifecycleState::Running,
            2 => LifecycleState::ShuttingDown,
            _ => LifecycleState::Terminated,
        }
    }
}

/// Why the process is going down
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Message source closed or the host returned normally
    Exit,
    /// Ctrl-C / SIGINT
    Interrupt,
    /// Other termination signal, by name
    Signal(&'static str),
    /// Unrecoverable error
    Fatal(String),
}

impl ShutdownReason {
    /// Process exit status for this reason
    pub fn exit_code(&self) -> u8 {
        match self {
            ShutdownReason::Fatal(_) => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Exit => write!(f, "exit"),
            ShutdownReason::Interrupt => write!(f, "interrupt"),
            ShutdownReason::Signal(name) => write!(f, "signal {}", name),
            ShutdownReason::Fatal(err) => write!(f, "fatal error: {}", err),
        }
    }
}

/// Broadcasts lifecycle events to subscribed plugins.
///
/// `exit` is emitted at most once no matter how many termination paths fire;
/// the state transition is a single atomic step.
pub struct LifecycleCoordinator {
    state: AtomicU8,
    registry: Arc<PluginRegistry>,
}

impl LifecycleCoordinator {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self {
            state: AtomicU8::new(LifecycleState::Starting as u8),
            registry,
        }
    }

    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Transport is connected: enter `Running` and emit `ready`.
    ///
    /// Returns false if the coordinator was not `Starting`.
    pub fn mark_running(&self) -> bool {
        let moved = self.state
            .compare_exchange(
                LifecycleState::Starting as u8,
                LifecycleState::Running as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok();

        if moved {
            self.emit(PluginEvent::Ready);
        }
        moved
    }

    /// Run the termination path once.
    ///
    /// Returns the exit status the first time, `None` on every later call.
    pub fn shutdown(&self, reason: ShutdownReason) -> Option<u8> {
        let entered = self.state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |s| {
                (s < LifecycleState::ShuttingDown as u8).then_some(LifecycleState::ShuttingDown as u8)
            })
            .is_ok();

        if !entered {
            tracing::debug!("Ignoring repeated shutdown ({})", reason);
            return None;
        }

        if let ShutdownReason::Fatal(err) = &reason {
            tracing::error!("{}", err);
        } else {
            tracing::info!("Shutting down ({})", reason);
        }

        self.emit(PluginEvent::Exit);
        self.state.store(LifecycleState::Terminated as u8, Ordering::SeqCst);
        Some(reason.exit_code())
    }

    /// Invoke every subscriber synchronously; failures are logged and swallowed
    fn emit(&self, event: PluginEvent) {
        let subscribers = match self.registry.subscribers(event) {
            Ok(subscribers) => subscribers,
            Err(e) => {
                tracing::warn!("Can't emit '{}': {}", event, e);
                return;
            }
        };

        for (plugin, callback) in subscribers {
            if let Err(e) = guarded(|| callback()) {
                tracing::debug!("{} '{}' callback failed: {}", plugin, event, e);
            }
        }
    }
}

impl Drop for LifecycleCoordinator {
    fn drop(&mut self) {
        self.shutdown(ShutdownReason::Exit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::HandlerError;
    use crate::plugins::{Plugin, Register};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    struct Dummy;
    impl Plugin for Dummy {}

    fn registry_with(plugins: &[&str]) -> (Arc<PluginRegistry>, Vec<Register>) {
        let registry = Arc::new(PluginRegistry::new());
        let handles = plugins.iter()
            .map(|name| {
                registry.begin(name).unwrap();
                registry.activate(name, Box::new(Dummy), None, None).unwrap();
                Register::new(name, &registry)
            })
            .collect();
        (registry, handles)
    }

    #[test]
    fn test_exit_fires_once_across_signals() {
        let (registry, handles) = registry_with(&["alpha"]);
        let exits = Arc::new(AtomicUsize::new(0));
        let counter = exits.clone();
        handles[0].on_event(PluginEvent::Exit, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }).unwrap();

        let coordinator = LifecycleCoordinator::new(registry);
        assert!(coordinator.mark_running());
        assert_eq!(coordinator.shutdown(ShutdownReason::Interrupt), Some(0));
        assert_eq!(coordinator.shutdown(ShutdownReason::Signal("SIGUSR1")), None);
        assert_eq!(coordinator.shutdown(ShutdownReason::Fatal("late".into())), None);
        drop(coordinator);

        assert_eq!(exits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_state_machine_transitions() {
        let (registry, _) = registry_with(&[]);
        let coordinator = LifecycleCoordinator::new(registry);
        assert_eq!(coordinator.state(), LifecycleState::Starting);

        assert!(coordinator.mark_running());
        assert!(!coordinator.mark_running());
        assert_eq!(coordinator.state(), LifecycleState::Running);

        assert_eq!(coordinator.shutdown(ShutdownReason::Fatal("boom".into())), Some(1));
        assert_eq!(coordinator.state(), LifecycleState::Terminated);
        assert!(!coordinator.mark_running());
    }

    #[test]
    fn test_shutdown_before_running_still_emits_exit() {
        let (registry, handles) = registry_with(&["alpha"]);
        let events = Arc::new(Mutex::new(Vec::new()));
        for event in [PluginEvent::Ready, PluginEvent::Exit] {
            let events = events.clone();
            handles[0].on_event(event, move || {
                events.lock().unwrap().push(event);
                Ok(())
            }).unwrap();
        }

        let coordinator = LifecycleCoordinator::new(registry);
        coordinator.shutdown(ShutdownReason::Exit);
        assert_eq!(*events.lock().unwrap(), vec![PluginEvent::Exit]);
    }

    #[test]
    fn test_failing_subscribers_are_swallowed_in_order() {
        let (registry, handles) = registry_with(&["alpha", "beta"]);
        let order = Arc::new(Mutex::new(Vec::new()));

        handles[0].on_event(PluginEvent::Exit, || Err(HandlerError::Failed("flush failed".into()))).unwrap();
        handles[0].on_event(PluginEvent::Exit, || panic!("farewell bug")).unwrap();
        let o = order.clone();
        handles[1].on_event(PluginEvent::Exit, move || {
            o.lock().unwrap().push("beta");
            Ok(())
        }).unwrap();

        let coordinator = LifecycleCoordinator::new(registry);
        assert_eq!(coordinator.shutdown(ShutdownReason::Exit), Some(0));
        assert_eq!(*order.lock().unwrap(), vec!["beta"]);
    }

    #[test]
    fn test_drop_runs_normal_exit() {
        let (registry, handles) = registry_with(&["alpha"]);
        let exits = Arc::new(AtomicUsize::new(0));
        let counter = exits.clone();
        handles[0].on_event(PluginEvent::Exit, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }).unwrap();

        drop(LifecycleCoordinator::new(registry));
        assert_eq!(exits.load(Ordering::SeqCst), 1);
    }
}
