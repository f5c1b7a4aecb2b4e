//! Flag ID CLI - Identify flags in images.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::identify::IdentifyArgs;
use commands::{Cli, Commands, ExitCode};
use config::AppConfig;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = match cli.command {
        Some(Commands::Identify(args)) => run_identify(args),
        Some(Commands::Index(args)) => {
            match AppConfig::load()
                .map_err(anyhow::Error::from)
                .and_then(|config| commands::index::run(&args, &config))
            {
                Ok(()) => ExitCode::Success,
                Err(e) => {
                    eprintln!("error: {e:#}");
                    ExitCode::Error
                }
            }
        }
        None => {
            // Default behavior: run identify with flattened args
            if cli.identify.paths.is_empty() {
                eprintln!("error: No paths specified. Use --help for usage information.");
                return ExitCode::Error.into();
            }
            run_identify(cli.identify)
        }
    };

    exit_code.into()
}

fn run_identify(args: IdentifyArgs) -> ExitCode {
    let result = AppConfig::load()
        .map_err(anyhow::Error::from)
        .and_then(|config| commands::identify::run(&IdentifyArgs::with_config(args, &config)));

    match result {
        Ok(summary) => summary.exit_code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::Error
        }
    }
}
