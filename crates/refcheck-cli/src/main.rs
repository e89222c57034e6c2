//! Refcheck CLI - Command Line Interface for the Refcheck Conformance Engine
//!
//! The main entry point for the refcheck command-line tool.
//!
//! # Commands
//! - `refcheck run` - Run the conformance suite against the reference backend
//! - `refcheck list` - List the conformance cases
//! - `refcheck shape` - Infer pooling output and padding shapes
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// CLI-specific allowances
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::uninlined_format_args)]

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cli;
mod commands;
mod config;
mod error;

use cli::{Cli, Commands};
use error::CliResult;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    // Set verbosity level
    let default_filter = if cli.verbose {
        "refcheck=debug"
    } else {
        "refcheck=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::List(args) => commands::list::execute(args),
        Commands::Shape(args) => commands::shape::execute(args),
    }
}
