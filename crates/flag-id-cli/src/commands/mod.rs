//! CLI command definitions and handlers.

pub mod identify;
pub mod index;

use clap::{Parser, Subcommand};

/// Flag ID - Identify flags in images by color and edge statistics
#[derive(Parser)]
#[command(name = "flag-id")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared identify arguments (paths, corpus, tolerances).
    #[command(flatten)]
    pub identify: identify::IdentifyArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Identify the flag shown in each image
    Identify(identify::IdentifyArgs),
    /// Print the dominant color bucket of every reference flag
    Index(index::IndexArgs),
}

/// Process exit status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExitCode {
    /// Every query resolved to exactly one flag.
    #[default]
    Success,
    /// At least one query was ambiguous, unmatched or skipped.
    Unresolved,
    /// Fatal error: bad configuration, unreadable corpus.
    Error,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        match code {
            ExitCode::Success => Self::SUCCESS,
            ExitCode::Unresolved => Self::from(1),
            ExitCode::Error => Self::from(2),
        }
    }
}
