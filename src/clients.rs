use std::{
    io::{self, Write},
    sync::Arc,
};

use analytics_client::{AnalyticsClient, PropertyMap, Value};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Clients that can be named in a router file.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinClient {
    /// Every event becomes an `info!` line on the `analytics_event` target.
    #[default]
    Log,
    /// Every event is written to stdout as one JSON line.
    Stdout,
}

impl BuiltinClient {
    pub fn build(self, channel: &str) -> Arc<dyn AnalyticsClient> {
        match self {
            BuiltinClient::Log => Arc::new(LogClient::new(channel)),
            BuiltinClient::Stdout => Arc::new(StdoutClient::new(channel)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogClient {
    channel: String,
}

impl LogClient {
    pub fn new(channel: &str) -> Self {
        Self {
            channel: channel.to_string(),
        }
    }
}

impl AnalyticsClient for LogClient {
    fn setup(&self) {
        debug!(channel = %self.channel, "log client ready");
    }

    fn send_event(&self, props: PropertyMap) {
        let event = Value::Map(props).to_json();
        info!(target: "analytics_event", channel = %self.channel, %event);
    }
}

#[derive(Debug, Clone)]
pub struct StdoutClient {
    channel: String,
}

impl StdoutClient {
    pub fn new(channel: &str) -> Self {
        Self {
            channel: channel.to_string(),
        }
    }

    fn line(&self, props: PropertyMap) -> String {
        serde_json::json!({
            "channel": self.channel,
            "event": Value::Map(props).to_json(),
        })
        .to_string()
    }
}

impl AnalyticsClient for StdoutClient {
    fn setup(&self) {}

    fn send_event(&self, props: PropertyMap) {
        let line = self.line(props);
        let mut out = io::stdout().lock();
        if let Err(e) = writeln!(out, "{line}") {
            error!(channel = %self.channel, "could not write event: {e}");
        }
    }
}
