use std::{fs::OpenOptions, sync::Mutex};

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

/// Installs the global subscriber. The pane owns the terminal, so interactive runs log only
/// to `--log-file`; one-shot runs log to stderr.
pub fn init(cli: &Cli) -> Result<()> {
    if cli.one_shot {
        return tracing_subscriber::fmt()
            .with_env_filter(env_filter("warn"))
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
            .map_err(|err| anyhow!("installing log subscriber failed: {err}"));
    }

    let Some(path) = cli.log_file.as_deref() else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {} failed", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("info"))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!("installing log subscriber failed: {err}"))
}

/// `RUST_LOG` when set and valid, otherwise `default`.
fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}
