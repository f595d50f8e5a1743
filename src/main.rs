use clap::Parser;
use dynatrace_k8s_metrics::{cli::Cli, config, run_command};
use log::debug;
use std::process;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> dynatrace_k8s_metrics::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    cli.init_logging();

    // Load configuration; missing credentials are fatal before any request
    let config = config::load_config(cli.config.as_deref())?;
    config.dynatrace.validate()?;
    debug!("Using Dynatrace environment {}", config.dynatrace.url);

    run_command(cli.command, &config)
}
