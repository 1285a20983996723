//! Main CLI entry point for the Fankai release pipeline

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use tracing_subscriber::EnvFilter;

mod commands;

/// Fankai release pipeline - build, redistribute and publish the utility suite
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    quiet: u8,

    /// Configuration file path (global option)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the native-binary release pipeline for one revision
    Release {
        /// Triggering revision identifier
        #[arg(long, value_name = "SHA")]
        rev: String,

        /// Override the redistribution commit message (defaults to the
        /// triggering revision's message)
        #[arg(short, long, value_name = "MSG")]
        message: Option<String>,

        /// Override the staging directory
        #[arg(long, value_name = "DIR")]
        staging: Option<PathBuf>,

        /// Number of parallel build tasks
        #[arg(short = 'j', long, value_name = "N")]
        jobs: Option<usize>,
    },

    /// Build and publish the multi-architecture container images
    Images {
        /// Triggering revision identifier
        #[arg(long, value_name = "SHA")]
        rev: String,
    },

    /// Print the build matrix for a revision without executing it
    Plan {
        /// Triggering revision identifier
        #[arg(long, value_name = "SHA")]
        rev: String,

        /// Emit the matrix as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize a new configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, value_name = "FILE", default_value = "fankai-release.yaml")]
        output: PathBuf,

        /// Force overwrite existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install color-eyre for better error reports
    color_eyre::install()?;

    // Parse command line arguments
    let cli = Cli::parse();

    // Set up logging
    setup_logging(cli.verbose, cli.quiet)?;

    // Determine config path
    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from("fankai-release.yaml"));

    // Handle commands
    let result = match cli.command {
        Commands::Release { rev, message, staging, jobs } => {
            let command = commands::ReleaseCommand::new(config_path, rev, message, staging, jobs);
            command.execute().await
        }

        Commands::Images { rev } => {
            let command = commands::ImagesCommand::new(config_path, rev);
            command.execute().await
        }

        Commands::Plan { rev, json } => {
            let command = commands::PlanCommand::new(config_path, rev, json);
            command.execute().await
        }

        Commands::Init { output, force } => {
            let command = commands::InitCommand::new(output, force);
            command.execute().await
        }
    };

    // Handle command execution result
    if let Err(e) = result {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn setup_logging(verbose: u8, quiet: u8) -> Result<()> {
    let log_level = match (verbose, quiet) {
        (0, 0) => "info",
        (1, 0) => "debug",
        (2, 0) => "trace",
        (v, 0) if v > 2 => "trace",
        (0, 1) => "warn",
        (0, 2) => "error",
        (0, q) if q > 2 => "off",
        _ => "info", // If both are set, default to info
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    Ok(())
}
