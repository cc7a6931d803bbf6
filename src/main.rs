use clap::Parser;
use dumppad::cli::{run_cli, Cli};
use dumppad::logging::{init_logging_with_config, LogConfig};
use dumppad::runtime_config::RuntimeConfig;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Held until exit so buffered log lines are flushed.
    let _log_guard = init_logging_with_config(&LogConfig::from_env())?;

    let runtime = RuntimeConfig::from_env();
    runtime.apply();
    info!(stack_size = runtime.stack_size, "coroutine runtime configured");

    if let Err(err) = run_cli(cli) {
        error!(error = %format!("{err:#}"), "dumppad exited with error");
        return Err(err);
    }
    Ok(())
}
