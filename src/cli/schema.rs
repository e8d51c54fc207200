use std::{fs, path::PathBuf};

use clap::Args;
use schemars::schema_for;

use analytics_router::config::RouterFile;

use super::CliContext;

#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Output directory; defaults to `<root>/schemas`
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn execute(args: SchemaArgs, context: &CliContext) -> anyhow::Result<()> {
    let out_dir = args.out.unwrap_or_else(|| context.root.join("schemas"));
    fs::create_dir_all(&out_dir)?;

    let schema = schema_for!(RouterFile);
    let path = out_dir.join("router.schema.json");
    fs::write(&path, serde_json::to_string_pretty(&schema)?)?;
    println!("Schema written to {}", path.display());
    Ok(())
}
