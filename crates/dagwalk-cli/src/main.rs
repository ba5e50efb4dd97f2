use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);
    commands::run_command(cli)
}

/// `RUST_LOG` wins when set; otherwise `--verbose` picks debug over warn.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
