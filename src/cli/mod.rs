use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod schema;
pub mod trigger;
pub mod validate;

use schema::SchemaArgs;
use trigger::TriggerArgs;

#[derive(Parser, Debug)]
#[command(
    name = "analytics-router",
    about = "Route application triggers to analytics channels",
    version = "0.1.0"
)]
pub struct Cli {
    /// Log level directive (e.g. error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Also write logs to this (daily rolling) file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Write every event sent by `log` clients to this JSON-lines file
    #[arg(long, global = true)]
    pub event_file: Option<PathBuf>,

    /// Router file; defaults to `<root>/router.yaml`
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fire one trigger through every mapped channel
    Trigger(TriggerArgs),

    /// Load all channel csv files and report mapping gaps
    Validate,

    /// Emit the JSON-Schema of the router file
    Schema(SchemaArgs),
}

#[derive(Clone, Debug)]
pub struct CliContext {
    pub root: PathBuf,
    pub config_file: PathBuf,
}

impl CliContext {
    pub fn new(root: PathBuf, config_file: Option<PathBuf>) -> Self {
        let config_file = config_file.unwrap_or_else(|| root.join("router.yaml"));
        Self { root, config_file }
    }

    /// Directory relative csv bundles are resolved against.
    pub fn base_dir(&self) -> PathBuf {
        self.config_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| self.root.clone())
    }
}

pub fn execute(context: &CliContext, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Trigger(args) => trigger::execute(args, context),
        Commands::Validate => validate::execute(context),
        Commands::Schema(args) => schema::execute(args, context),
    }
}
