use std::{
    fmt,
    sync::{Arc, Mutex},
};

use tracing::{error, warn};

use crate::error::RouterError;

/// A user-facing side channel for errors, on top of the log.
pub trait Alerter: Send + Sync {
    fn alert(&self, title: &str, message: &str);
}

/// Default alerter: a `warn!` on the `alert` target, so a subscriber can
/// route alerts somewhere louder than the regular log.
#[derive(Clone, Debug, Default)]
pub struct TracingAlerter;

impl Alerter for TracingAlerter {
    fn alert(&self, title: &str, message: &str) {
        warn!(target: "alert", %title, "{message}");
    }
}

/// Keeps every alert in memory.
#[derive(Clone, Debug, Default)]
pub struct RecordingAlerter {
    alerts: Arc<Mutex<Vec<String>>>,
}

impl RecordingAlerter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl Alerter for RecordingAlerter {
    fn alert(&self, _title: &str, message: &str) {
        self.alerts.lock().unwrap_or_else(|p| p.into_inner()).push(message.to_string());
    }
}

/// Where every router error ends up. Nothing here ever fails.
#[derive(Clone)]
pub struct Diagnostics {
    alert_on_error: bool,
    alerter: Arc<dyn Alerter>,
}

impl Diagnostics {
    pub fn new(alert_on_error: bool, alerter: Arc<dyn Alerter>) -> Self {
        Self {
            alert_on_error,
            alerter,
        }
    }

    pub fn alert_on_error(&self) -> bool {
        self.alert_on_error
    }

    /// Log `err` and raise an alert if alerting is enabled.
    pub fn report(&self, err: impl Into<RouterError>) {
        let err = err.into();
        error!(kind = err.kind(), "AnalyticsError: {err}");
        if self.alert_on_error {
            self.alerter.alert("Analytics Error Message", &err.to_string());
        }
    }

    /// Log `err` only. Used where alerts would be spam, e.g. during init.
    pub fn log(&self, err: impl Into<RouterError>) {
        let err = err.into();
        error!(kind = err.kind(), "AnalyticsError: {err}");
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(true, Arc::new(TracingAlerter))
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("alert_on_error", &self.alert_on_error)
            .field("alerter", &"<dyn Alerter>")
            .finish()
    }
}
