use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use analytics_client::AnalyticsClient;
use anyhow::Context;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    Channel,
    clients::BuiltinClient,
    csv_loader::ResourceBundle,
    diagnostics::{Alerter, TracingAlerter},
    overrides::TriggerMappings,
};

/// One channel: where its csv lives and who receives its events.
#[derive(Clone)]
pub struct ChannelConfig {
    pub csv_file: Option<String>,
    pub client: Arc<dyn AnalyticsClient>,
}

impl ChannelConfig {
    pub fn new(csv_file: impl Into<String>, client: Arc<dyn AnalyticsClient>) -> Self {
        Self {
            csv_file: Some(csv_file.into()),
            client,
        }
    }
}

impl fmt::Debug for ChannelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelConfig")
            .field("csv_file", &self.csv_file)
            .field("client", &"<dyn AnalyticsClient>")
            .finish()
    }
}

/// Everything the router needs to initialize.
///
/// - `channels`: channel id → csv resource + client.
/// - `trigger_mappings`: trigger → channel → event key → dotted path into the
///   runtime props, e.g. `meta_context.name` reads
///   `{"meta_context": {"name": ..}}`.
/// - `strict_key_validation`: if set, an event with any unresolved key is not
///   sent. Otherwise the error is still reported and the partial event goes out.
/// - `alert_on_error`: raise an alert for every error, not only a log line.
/// - `bundle`: where csv resources are looked up; the working directory if unset.
#[derive(Clone)]
pub struct RouterConfig {
    pub channels: IndexMap<Channel, ChannelConfig>,
    pub trigger_mappings: TriggerMappings,
    pub strict_key_validation: bool,
    pub alert_on_error: bool,
    pub bundle: Option<ResourceBundle>,
    pub alerter: Arc<dyn Alerter>,
}

impl RouterConfig {
    pub fn new(channels: IndexMap<Channel, ChannelConfig>, trigger_mappings: TriggerMappings) -> Self {
        Self {
            channels,
            trigger_mappings,
            strict_key_validation: true,
            alert_on_error: true,
            bundle: None,
            alerter: Arc::new(TracingAlerter),
        }
    }

    pub fn with_strict_key_validation(mut self, strict: bool) -> Self {
        self.strict_key_validation = strict;
        self
    }

    pub fn with_alert_on_error(mut self, alert: bool) -> Self {
        self.alert_on_error = alert;
        self
    }

    pub fn with_bundle(mut self, bundle: ResourceBundle) -> Self {
        self.bundle = Some(bundle);
        self
    }

    pub fn with_alerter(mut self, alerter: Arc<dyn Alerter>) -> Self {
        self.alerter = alerter;
        self
    }
}

impl fmt::Debug for RouterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterConfig")
            .field("channels", &self.channels)
            .field("trigger_mappings", &self.trigger_mappings)
            .field("strict_key_validation", &self.strict_key_validation)
            .field("alert_on_error", &self.alert_on_error)
            .field("bundle", &self.bundle)
            .finish()
    }
}

fn default_true() -> bool {
    true
}

/// A channel entry in the router file.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ChannelFileEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv_file: Option<String>,
    #[serde(default)]
    pub client: BuiltinClient,
}

/// The on-disk (YAML) form of a router configuration.
///
/// # Example
/// ```yaml
/// bundle: csv
/// strict_key_validation: true
/// channels:
///   product:
///     csv_file: productEvents
///     client: log
/// triggers:
///   signup:
///     product:
///       user.id: account.id
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RouterFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub strict_key_validation: bool,
    #[serde(default = "default_true")]
    pub alert_on_error: bool,
    #[serde(default)]
    pub channels: IndexMap<Channel, ChannelFileEntry>,
    #[serde(default)]
    pub triggers: TriggerMappings,
}

impl RouterFile {
    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        serde_yaml_bw::from_str(text).context("invalid router file")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("could not read router file {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Build a `RouterConfig`, resolving a relative `bundle` against `base_dir`.
    pub fn into_config(self, base_dir: &Path) -> RouterConfig {
        let bundle = match self.bundle {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => base_dir.join(dir),
            None => base_dir.to_path_buf(),
        };
        let channels = self
            .channels
            .into_iter()
            .map(|(channel, entry)| {
                let config = ChannelConfig {
                    csv_file: entry.csv_file,
                    client: entry.client.build(&channel),
                };
                (channel, config)
            })
            .collect();

        RouterConfig::new(channels, self.triggers)
            .with_strict_key_validation(self.strict_key_validation)
            .with_alert_on_error(self.alert_on_error)
            .with_bundle(ResourceBundle::new(bundle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FILE: &str = r#"
bundle: csv
strict_key_validation: false
channels:
  product:
    csv_file: productEvents
    client: stdout
  audit:
    client: log
triggers:
  signup:
    product:
      user.id: account.id
    audit: {}
"#;

    #[test]
    fn test_parse_router_file() {
        let file = RouterFile::from_yaml(FILE).unwrap();
        assert_eq!(file.bundle, Some(PathBuf::from("csv")));
        assert!(!file.strict_key_validation);
        assert!(file.alert_on_error);
        assert_eq!(file.channels["product"].client, BuiltinClient::Stdout);
        assert_eq!(file.channels["audit"].csv_file, None);
        assert_eq!(
            file.triggers["signup"]["product"]["user.id"],
            "account.id".to_string()
        );
        assert!(file.triggers["signup"]["audit"].is_empty());
    }

    #[test]
    fn test_defaults() {
        let file = RouterFile::from_yaml("channels: {}").unwrap();
        assert!(file.strict_key_validation);
        assert!(file.alert_on_error);
        assert!(file.triggers.is_empty());
    }

    #[test]
    fn test_into_config_resolves_bundle() {
        let config = RouterFile::from_yaml(FILE)
            .unwrap()
            .into_config(Path::new("/etc/analytics"));
        assert_eq!(
            config.bundle,
            Some(ResourceBundle::new("/etc/analytics/csv"))
        );
        assert!(!config.strict_key_validation);
        assert_eq!(config.channels.len(), 2);
        assert_eq!(config.channels["product"].csv_file.as_deref(), Some("productEvents"));
    }

    #[test]
    fn test_load_from_disk() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(FILE.as_bytes()).unwrap();
        let file = RouterFile::load(tmp.path()).unwrap();
        assert_eq!(file.channels.len(), 2);

        assert!(RouterFile::load(Path::new("/nonexistent/router.yaml")).is_err());
    }

    #[test]
    fn test_builder_defaults() {
        let config = RouterConfig::new(IndexMap::new(), TriggerMappings::new());
        assert!(config.strict_key_validation);
        assert!(config.alert_on_error);
        assert!(config.bundle.is_none());
    }
}
