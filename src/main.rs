//! swup - OS bundle manager
//!
//! Parses the command line, sets up logging and dispatches to the command wrappers.
//! Errors are printed once here and mapped to the process exit status.

use std::io::IsTerminal;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use swup::cli::{Cli, Commands};
use swup::commands;
use swup::config::Config;
use swup::error::Result;

/// Environment variable holding a `tracing` filter, e.g. `SWUP_LOG=swup=trace`
const LOG_ENV: &str = "SWUP_LOG";

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    commands::helpers::load_config(cli.config.as_deref(), cli.overrides())
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::BundleList(args) => commands::bundle_list::run(&load_config(cli)?, args),
        Commands::BundleAdd(args) => commands::bundle_add::run(&load_config(cli)?, args),
        Commands::BundleRemove(args) => commands::bundle_remove::run(&load_config(cli)?, args),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code().as_i32());
    }
}
