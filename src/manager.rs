use std::sync::{Arc, Mutex, MutexGuard};

use analytics_client::PropertyMap;
use tracing::info;

use crate::{
    config::RouterConfig,
    diagnostics::Diagnostics,
    error::ConfigError,
    router::Router,
};

#[derive(Debug, Default)]
struct State {
    router: Option<Arc<Router>>,
    diagnostics: Diagnostics,
}

/// Owns the router across its `Uninitialized → Initialized → Uninitialized`
/// lifecycle.
///
/// Lifecycle changes are serialized by one lock. Dispatch runs on a clone of
/// the live router after the lock is released, so a client may fire another
/// trigger from inside `send_event`.
///
/// Lifecycle misuse (double init, trigger before init) is reported with the
/// diagnostics of the last successful `initialize`, which outlive
/// `tear_down`. Before the first one, the diagnostics given at construction
/// apply.
#[derive(Debug, Default)]
pub struct AnalyticsManager {
    state: Mutex<State>,
}

impl AnalyticsManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_diagnostics(diagnostics: Diagnostics) -> Self {
        Self {
            state: Mutex::new(State {
                router: None,
                diagnostics,
            }),
        }
    }

    /// Build the router from `config`. A second call while initialized is
    /// reported and ignored.
    pub fn initialize(&self, config: RouterConfig) {
        let mut state = self.lock();
        if state.router.is_some() {
            state.diagnostics.report(ConfigError::AlreadyInitialized);
            return;
        }
        let router = Router::initialize(config);
        state.diagnostics = router.diagnostics().clone();
        state.router = Some(Arc::new(router));
    }

    /// Fire `trigger` with the caller's runtime props.
    pub fn trigger_event(&self, trigger: &str, props: Option<&PropertyMap>) {
        let router = {
            let state = self.lock();
            match &state.router {
                Some(router) => Arc::clone(router),
                None => {
                    state.diagnostics.report(ConfigError::NotInitialized);
                    return;
                }
            }
        };
        router.dispatch(trigger, props);
    }

    /// Drop the router with all its tables and clients. Safe to call twice.
    pub fn tear_down(&self) {
        if self.lock().router.take().is_some() {
            info!("analytics router torn down");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().router.is_some()
    }

    /// Run `f` against the live router, if any. The manager is not locked
    /// while `f` runs.
    pub fn with_router<T>(&self, f: impl FnOnce(&Router) -> T) -> Option<T> {
        let router = self.lock().router.clone()?;
        Some(f(&router))
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // a panicking client must not wedge the manager for good
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ChannelConfig,
        csv_loader::ResourceBundle,
        diagnostics::RecordingAlerter,
        overrides::{DevOverrides, TriggerMappings},
    };
    use analytics_client::{AnalyticsClient, test_util::RecordingClient};
    use indexmap::IndexMap;
    use std::{fs, sync::OnceLock};
    use tempfile::TempDir;

    fn config(dir: &TempDir, client: Arc<dyn AnalyticsClient>) -> RouterConfig {
        fs::write(dir.path().join("events.csv"), "trigger,k1\nt1,literal1\nt2,literal2\n").unwrap();
        let channels = IndexMap::from([("c1".to_string(), ChannelConfig::new("events", client))]);
        let mut mappings = TriggerMappings::new();
        for trigger in ["t1", "t2"] {
            mappings.insert(
                trigger.into(),
                IndexMap::from([("c1".to_string(), DevOverrides::new())]),
            );
        }
        RouterConfig::new(channels, mappings)
            .with_bundle(ResourceBundle::new(dir.path()))
            .with_alert_on_error(false)
    }

    #[test]
    fn test_trigger_before_initialize_alerts() {
        let alerter = RecordingAlerter::new();
        let manager = AnalyticsManager::with_diagnostics(Diagnostics::new(true, alerter.clone()));
        manager.trigger_event("t1", None);
        assert!(!manager.is_initialized());
        assert_eq!(alerter.alerts(), vec!["analytics router not initialized".to_string()]);
    }

    #[test]
    fn test_second_initialize_is_ignored() {
        let dir = TempDir::new().unwrap();
        let alerter = RecordingAlerter::new();
        let manager = AnalyticsManager::new();
        let first = RecordingClient::new();
        let second = RecordingClient::new();

        manager.initialize(
            config(&dir, first.clone())
                .with_alert_on_error(true)
                .with_alerter(alerter.clone()),
        );
        manager.initialize(config(&dir, second.clone()));
        assert_eq!(alerter.alerts(), vec!["already called initialize before".to_string()]);
        assert_eq!(second.setup_calls(), 0);

        manager.trigger_event("t1", None);
        assert_eq!(first.events().len(), 1);
        assert!(second.events().is_empty());
    }

    #[test]
    fn test_second_initialize_silent_without_alert_on_error() {
        let dir = TempDir::new().unwrap();
        let alerter = RecordingAlerter::new();
        let manager = AnalyticsManager::with_diagnostics(Diagnostics::new(true, alerter.clone()));
        let client = RecordingClient::new();

        manager.initialize(config(&dir, client.clone()).with_alerter(alerter.clone()));
        manager.initialize(config(&dir, client.clone()).with_alerter(alerter.clone()));
        assert!(alerter.alerts().is_empty());
        assert_eq!(client.setup_calls(), 1);
    }

    #[test]
    fn test_not_initialized_after_tear_down_keeps_last_alert_flag() {
        let dir = TempDir::new().unwrap();
        let alerter = RecordingAlerter::new();
        let manager = AnalyticsManager::with_diagnostics(Diagnostics::new(true, alerter.clone()));

        manager.initialize(config(&dir, RecordingClient::new()).with_alerter(alerter.clone()));
        manager.tear_down();
        manager.trigger_event("t1", None);
        assert!(alerter.alerts().is_empty());

        manager.initialize(
            config(&dir, RecordingClient::new())
                .with_alert_on_error(true)
                .with_alerter(alerter.clone()),
        );
        manager.tear_down();
        manager.trigger_event("t1", None);
        assert_eq!(alerter.alerts(), vec!["analytics router not initialized".to_string()]);
    }

    #[test]
    fn test_tear_down_is_idempotent_and_allows_reinit() {
        let dir = TempDir::new().unwrap();
        let manager = AnalyticsManager::new();
        let old = RecordingClient::new();
        manager.initialize(config(&dir, old.clone()));
        assert!(manager.is_initialized());

        manager.tear_down();
        assert!(!manager.is_initialized());
        manager.tear_down();
        assert!(!manager.is_initialized());

        let fresh = RecordingClient::new();
        manager.initialize(config(&dir, fresh.clone()));
        manager.trigger_event("t1", None);
        assert_eq!(fresh.events().len(), 1);
        assert!(old.events().is_empty());
        assert_eq!(manager.with_router(|r| r.channels().count()), Some(1));
    }

    /// Fires `t2` from inside the delivery of `t1`.
    #[derive(Default)]
    struct ChainingClient {
        manager: OnceLock<Arc<AnalyticsManager>>,
        sent: Mutex<Vec<PropertyMap>>,
    }

    impl AnalyticsClient for ChainingClient {
        fn setup(&self) {}

        fn send_event(&self, props: PropertyMap) {
            let first = props.get("k1").and_then(|v| v.as_str()) == Some("literal1");
            self.sent.lock().unwrap().push(props);
            if first {
                if let Some(manager) = self.manager.get() {
                    manager.trigger_event("t2", None);
                }
            }
        }
    }

    #[test]
    fn test_client_can_trigger_from_send_event() {
        let dir = TempDir::new().unwrap();
        let client = Arc::new(ChainingClient::default());
        let manager = Arc::new(AnalyticsManager::new());
        client.manager.set(manager.clone()).ok();

        manager.initialize(config(&dir, client.clone()));
        manager.trigger_event("t1", None);

        let sent: Vec<String> = client
            .sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|p| p.get("k1").and_then(|v| v.as_str()).map(str::to_string))
            .collect();
        assert_eq!(sent, vec!["literal1".to_string(), "literal2".to_string()]);
        manager.tear_down();
    }
}
