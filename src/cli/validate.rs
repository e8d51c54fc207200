use anyhow::bail;

use analytics_router::{
    config::RouterFile,
    diagnostics::Diagnostics,
    overrides::OverrideTable,
    schema::{SchemaTable, validate_overrides},
};

use super::CliContext;

pub fn execute(context: &CliContext) -> anyhow::Result<()> {
    let config = RouterFile::load(&context.config_file)?.into_config(&context.base_dir());
    let bundle = config.bundle.clone().unwrap_or_default();
    let overrides = OverrideTable::from(config.trigger_mappings);
    let diagnostics = Diagnostics::new(false, config.alerter);

    let mut problems = 0;
    for (channel, channel_config) in &config.channels {
        let Some(csv_file) = channel_config.csv_file.as_deref() else {
            eprintln!("❌ {channel}: no csv_file configured");
            problems += 1;
            continue;
        };
        match bundle.load(csv_file) {
            Ok(rows) => {
                let schema = SchemaTable::from_rows(rows);
                let gaps = validate_overrides(channel, &schema, &overrides, &diagnostics);
                if gaps == 0 {
                    println!("✅ {channel}: {} triggers mapped", schema.len());
                } else {
                    eprintln!("❌ {channel}: {gaps} mapping gaps");
                    problems += gaps;
                }
            }
            Err(err) => {
                eprintln!("❌ {channel}: {err}");
                problems += 1;
            }
        }
    }

    if problems > 0 {
        bail!("{problems} problems in {}", context.config_file.display());
    }
    Ok(())
}
