#![allow(unused_crate_dependencies)] // false positives because there is both a library and a binary

#[macro_use]
extern crate tracing;

use std::path::Path;

use anyhow::Context as _;
use mir2_dump::config::Config;
use mir2_dump::export;
use mir2_wis::{ImageLibrary as _, Wis};

fn main() -> anyhow::Result<()> {
    let config = Config::parse_args().context("CLI arguments parsing")?;

    setup_logging(config.log_file.as_deref()).context("unable to initialize logging")?;

    let palette = config.load_palette()?;

    let wis = Wis::try_open(&config.archive, palette)
        .with_context(|| format!("couldn't open {}", config.archive.display()))?;

    info!(archive = %config.archive.display(), count = wis.count(), "Exporting archive");

    let summary = export::export_all(&wis, &config.output_dir, &config.stem(), config.color_key)?;

    info!(written = summary.written, skipped = summary.skipped, "Export done");

    Ok(())
}

fn setup_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    use std::fs::OpenOptions;

    use tracing::metadata::LevelFilter;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var("MIR2_LOG")
        .from_env_lossy();

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match log_file {
        Some(log_file) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)
                .with_context(|| format!("couldn't open {}", log_file.display()))?;

            let fmt_layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(false)
                .with_writer(file);

            registry.with(fmt_layer).try_init()
        }
        None => {
            let fmt_layer = tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr);

            registry.with(fmt_layer).try_init()
        }
    };

    result.context("failed to set tracing global subscriber")?;

    Ok(())
}
