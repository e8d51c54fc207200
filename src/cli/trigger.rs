use anyhow::{Context, bail};
use clap::Args;
use tracing::info;

use analytics_client::props_from_json;
use analytics_router::{config::RouterFile, manager::AnalyticsManager};

use super::CliContext;

#[derive(Args, Debug)]
pub struct TriggerArgs {
    /// Trigger name, as used in the csv `trigger` column
    pub trigger: String,

    /// Runtime properties as a JSON object
    #[arg(long)]
    pub props: Option<String>,
}

pub fn execute(args: TriggerArgs, context: &CliContext) -> anyhow::Result<()> {
    let props = match &args.props {
        Some(text) => {
            let json: serde_json::Value =
                serde_json::from_str(text).context("--props is not valid JSON")?;
            Some(props_from_json(json).context("--props must be a JSON object")?)
        }
        None => None,
    };

    let config = RouterFile::load(&context.config_file)?.into_config(&context.base_dir());
    let manager = AnalyticsManager::new();
    manager.initialize(config);

    let summary = manager
        .with_router(|router| router.dispatch(&args.trigger, props.as_ref()))
        .context("router did not initialize")?;
    manager.tear_down();

    info!(trigger = %args.trigger, sent = summary.sent.len(), "trigger dispatched");
    for channel in &summary.sent {
        eprintln!("✅ {channel}: event sent");
    }
    for channel in &summary.suppressed {
        eprintln!("❌ {channel}: incomplete event suppressed");
    }
    for channel in &summary.skipped {
        eprintln!("❌ {channel}: skipped");
    }
    if summary.sent.is_empty() {
        bail!("trigger `{}` was not sent to any channel", args.trigger);
    }
    Ok(())
}
