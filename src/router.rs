use std::{fmt, sync::Arc};

use analytics_client::{AnalyticsClient, PropertyMap};
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::{
    Channel,
    config::RouterConfig,
    csv_loader::ResourceBundle,
    diagnostics::Diagnostics,
    error::{ConfigError, MappingGapError},
    materializer::materialize,
    overrides::OverrideTable,
    schema::{SchemaTable, validate_overrides},
};

/// What happened to one trigger across its channels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Channels whose client received an event.
    pub sent: Vec<Channel>,
    /// Channels whose event was incomplete and held back by strict validation.
    pub suppressed: Vec<Channel>,
    /// Channels that could not be materialized at all.
    pub skipped: Vec<Channel>,
}

/// An initialized router: immutable tables plus one client per channel.
pub struct Router {
    schemas: IndexMap<Channel, SchemaTable>,
    clients: IndexMap<Channel, Arc<dyn AnalyticsClient>>,
    overrides: OverrideTable,
    strict_key_validation: bool,
    diagnostics: Diagnostics,
}

impl Router {
    /// Load every channel's csv, check it against the trigger mappings and
    /// set up its client. Problems are reported, never returned: a channel
    /// without a csv resource is left out, a channel whose csv cannot be read
    /// keeps its client with an empty table.
    pub fn initialize(config: RouterConfig) -> Self {
        let diagnostics = Diagnostics::new(config.alert_on_error, config.alerter.clone());
        let bundle = config.bundle.clone().unwrap_or_default();
        let overrides = OverrideTable::from(config.trigger_mappings);

        let mut schemas = IndexMap::new();
        let mut clients = IndexMap::new();
        for (channel, channel_config) in config.channels {
            let Some(csv_file) = channel_config.csv_file.as_deref() else {
                diagnostics.report(ConfigError::MissingCsvResource {
                    channel: channel.clone(),
                });
                continue;
            };

            let schema = load_schema(&bundle, csv_file, &diagnostics);
            validate_overrides(&channel, &schema, &overrides, &diagnostics);
            schemas.insert(channel.clone(), schema);
            channel_config.client.setup();
            clients.insert(channel, channel_config.client);
        }

        info!(
            channels = clients.len(),
            strict = config.strict_key_validation,
            "analytics router initialized"
        );
        Self {
            schemas,
            clients,
            overrides,
            strict_key_validation: config.strict_key_validation,
            diagnostics,
        }
    }

    /// Build and send the event for `trigger` on every channel mapped to it.
    ///
    /// A channel with a gap in its tables is skipped without affecting the
    /// others. An incomplete event is sent anyway unless strict key
    /// validation is on.
    pub fn dispatch(&self, trigger: &str, props: Option<&PropertyMap>) -> DispatchSummary {
        let mut summary = DispatchSummary::default();
        let Some(channels) = self.overrides.trigger(trigger) else {
            self.diagnostics.report(MappingGapError::TriggerNotMapped {
                trigger: trigger.to_string(),
            });
            return summary;
        };

        for (channel, dev_overrides) in channels {
            let Some(client) = self.clients.get(channel) else {
                self.diagnostics.report(MappingGapError::ChannelClientMissing {
                    channel: channel.clone(),
                    trigger: trigger.to_string(),
                });
                summary.skipped.push(channel.clone());
                continue;
            };
            let Some(schema) = self.schemas.get(channel) else {
                self.diagnostics.report(MappingGapError::ChannelSchemaMissing {
                    channel: channel.clone(),
                });
                summary.skipped.push(channel.clone());
                continue;
            };
            let Some(csv_properties) = schema.get(trigger) else {
                self.diagnostics.report(MappingGapError::TriggerNotInSchema {
                    trigger: trigger.to_string(),
                    channel: channel.clone(),
                });
                summary.skipped.push(channel.clone());
                continue;
            };

            let event = materialize(channel, trigger, csv_properties, dev_overrides, props);
            let complete = event.is_complete();
            if let Some(err) = event.error {
                self.diagnostics.report(err);
            }
            if complete || !self.strict_key_validation {
                debug!(%channel, %trigger, complete, "sending event");
                client.send_event(event.props);
                summary.sent.push(channel.clone());
            } else {
                debug!(%channel, %trigger, "incomplete event suppressed");
                summary.suppressed.push(channel.clone());
            }
        }
        summary
    }

    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.clients.keys()
    }

    pub fn schema(&self, channel: &str) -> Option<&SchemaTable> {
        self.schemas.get(channel)
    }

    pub fn strict_key_validation(&self) -> bool {
        self.strict_key_validation
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

fn load_schema(bundle: &ResourceBundle, csv_file: &str, diagnostics: &Diagnostics) -> SchemaTable {
    match bundle.load(csv_file) {
        Ok(rows) => SchemaTable::from_rows(rows),
        Err(err) => {
            diagnostics.log(err);
            SchemaTable::default()
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let channels: Vec<&Channel> = self.clients.keys().collect();
        f.debug_struct("Router")
            .field("channels", &channels)
            .field("schemas", &self.schemas)
            .field("overrides", &self.overrides)
            .field("strict_key_validation", &self.strict_key_validation)
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}
