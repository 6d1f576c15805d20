mod commands;
mod config;
mod telemetry;

use std::io::{BufWriter, Write};

use clap::Parser;
use config::{CliArgs, Command, Config};
use snowmint::{GeneratorRegistry, SystemClock};
use telemetry::init_telemetry;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = Config::try_from(args)?;

    init_telemetry(config.log_json)?;
    log_startup_info(&config);

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match &config.command {
        Command::Mint { count, padded } => {
            let registry = GeneratorRegistry::with_time(config.epoch, SystemClock);
            let generator = registry.resolve_node(config.node)?;
            commands::mint(&generator, *count, *padded, &mut out)?;
        }
        Command::Decode { ids } => commands::decode(ids, config.epoch, &mut out)?,
    }

    out.flush()?;
    Ok(())
}

fn log_startup_info(config: &Config) {
    if cfg!(debug_assertions) {
        tracing::debug!("Starting with full config: {:#?}", config);
    } else {
        tracing::debug!(
            node = %config.node,
            epoch_ms = config.epoch.as_millis() as u64,
            "Starting"
        );
    }
}
