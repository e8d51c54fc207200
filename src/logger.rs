use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::Subscriber;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, fmt::writer::BoxMakeWriter, prelude::*};

const EVENT_DIRECTIVE: &str = "analytics_event=info";

/// Where log output goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `analytics_router=debug`.
    pub log_level: String,
    /// Rolling plain-text log, in addition to stderr.
    pub log_file: Option<PathBuf>,
    /// Rolling newline-delimited JSON file of every event sent through the
    /// `log` client (target `analytics_event`).
    pub event_file: Option<PathBuf>,
}

impl LogConfig {
    pub fn new(log_level: &str) -> Self {
        Self {
            log_level: log_level.to_string(),
            log_file: None,
            event_file: None,
        }
    }
}

fn daily_appender(path: &Path) -> Result<RollingFileAppender> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("log path {} has no file name", path.display()))?;
    Ok(RollingFileAppender::new(Rotation::DAILY, dir, file_name))
}

fn level_filter(log_level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(log_level).with_context(|| format!("invalid log level `{log_level}`"))
}

/// `log_level` filters stderr and the text log only. The event writer always
/// receives `analytics_event` at info, whatever the log level.
fn build_subscriber(
    log_level: &str,
    stderr: BoxMakeWriter,
    log_file: Option<BoxMakeWriter>,
    event_file: Option<BoxMakeWriter>,
) -> Result<impl Subscriber + Send + Sync + 'static> {
    let stderr_layer = fmt::layer()
        .with_writer(stderr)
        .with_filter(level_filter(log_level)?)
        .boxed();

    let file_layer = match log_file {
        Some(writer) => Some(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(level_filter(log_level)?)
                .boxed(),
        ),
        None => None,
    };

    let event_layer = event_file.map(|writer| {
        fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_filter(EnvFilter::new(EVENT_DIRECTIVE))
            .boxed()
    });

    Ok(Registry::default()
        .with(stderr_layer)
        .with(file_layer)
        .with(event_layer))
}

/// Install the global tracing subscriber.
pub fn init_tracing(config: &LogConfig) -> Result<()> {
    let log_file = config
        .log_file
        .as_deref()
        .map(daily_appender)
        .transpose()?
        .map(BoxMakeWriter::new);
    let event_file = config
        .event_file
        .as_deref()
        .map(daily_appender)
        .transpose()?
        .map(BoxMakeWriter::new);

    build_subscriber(
        &config.log_level,
        BoxMakeWriter::new(std::io::stderr),
        log_file,
        event_file,
    )?
    .try_init()
    .context("a global tracing subscriber is already installed")?;
    Ok(())
}
