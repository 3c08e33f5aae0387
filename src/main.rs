use clap::Parser;
use filesorter::cli::{Args, run_cli_with_config};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))?;

    match run_cli_with_config(args.command(), args.folder.as_deref(), args.config.as_deref()) {
        Ok(status) => Ok(ExitCode::from(status.exit_code())),
        Err(e) => {
            tracing::debug!(error = ?e, "run failed");
            e.notify();
            Ok(ExitCode::from(e.exit_code()))
        }
    }
}
