use thiserror::Error;

/// Problems with how the router was configured or driven.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("missing csv file for channel: {channel}")]
    MissingCsvResource { channel: String },

    #[error("csv resource `{resource}` could not be read: {reason}")]
    ResourceUnreadable { resource: String, reason: String },

    #[error("already called initialize before")]
    AlreadyInitialized,

    #[error("analytics router not initialized")]
    NotInitialized,
}

/// A trigger or channel that one of the tables does not know about.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingGapError {
    #[error("trigger: {trigger} not present in trigger mappings provided")]
    TriggerNotMapped { trigger: String },

    #[error("channel {channel} client object not present as specified for trigger: {trigger}")]
    ChannelClientMissing { channel: String, trigger: String },

    #[error("channel {channel} doesn't have a csv file for defining triggers")]
    ChannelSchemaMissing { channel: String },

    #[error("trigger {trigger} not present in csv file for channel: {channel}")]
    TriggerNotInSchema { trigger: String, channel: String },

    #[error("event missing for trigger: {trigger} for channel: {channel}")]
    MissingOverride { trigger: String, channel: String },

    #[error("eventKey: {key} is developer provided but has no override for channel: {channel} trigger: {trigger}")]
    MissingOverrideKey {
        trigger: String,
        channel: String,
        key: String,
    },
}

/// A single event property that could not be resolved during materialization.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("eventKey: {key} needs to be overridden for channel: {channel} and trigger: {trigger}")]
    KeyNotOverridden {
        key: String,
        channel: String,
        trigger: String,
    },

    #[error("event trigger properties for channel: {channel} trigger: {trigger} are not provided")]
    PropsMissing { channel: String, trigger: String },

    #[error("path for key: {path} not present in props for channel: {channel} trigger: {trigger}")]
    PathNotFound {
        path: String,
        channel: String,
        trigger: String,
    },

    #[error("unable to set value for key: {key} in event props for channel: {channel} trigger: {trigger}")]
    PathConflict {
        key: String,
        channel: String,
        trigger: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouterError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    MappingGap(#[from] MappingGapError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

impl RouterError {
    pub fn kind(&self) -> &'static str {
        match self {
            RouterError::Config(_) => "config",
            RouterError::MappingGap(_) => "mapping_gap",
            RouterError::Resolution(_) => "resolution",
        }
    }
}
