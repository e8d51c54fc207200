use std::{env, path::PathBuf, process};

use clap::Parser;
use tracing::error;

use analytics_router::logger::{LogConfig, init_tracing};

mod cli;

use cli::{Cli, CliContext};

/// Resolve the working root from the environment or use the current directory.
pub fn resolve_root_dir() -> PathBuf {
    if let Ok(path) = env::var("ANALYTICS_ROUTER_ROOT") {
        PathBuf::from(path)
    } else {
        PathBuf::from(".")
    }
}

fn main() {
    // a missing .env is fine
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_config = LogConfig {
        log_level: cli.log_level.clone(),
        log_file: cli.log_file.clone(),
        event_file: cli.event_file.clone(),
    };
    if let Err(err) = init_tracing(&log_config) {
        eprintln!("could not set up logging: {err:#}");
        process::exit(2);
    }

    let context = CliContext::new(resolve_root_dir(), cli.config);
    if let Err(err) = cli::execute(&context, cli.command) {
        error!("{err:#}");
        eprintln!("❌ {err:#}");
        process::exit(1);
    }
}
