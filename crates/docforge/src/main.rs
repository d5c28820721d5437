//! docforge CLI - Main entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod features;
mod template;

use commands::{ApplyOptions, OutputFormat};

#[derive(Parser)]
#[command(name = "docforge")]
#[command(version)]
#[command(about = "Generate and maintain mkdocs.yml without losing hand edits", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge a template into the target configuration
    Merge {
        /// Template file ('-' reads stdin)
        #[arg(long)]
        template: String,

        /// Configuration file to update
        #[arg(long, default_value = "mkdocs.yml")]
        target: PathBuf,

        /// Report changes without writing the target
        #[arg(long)]
        dry_run: bool,

        /// Format of the summary and diagnostics
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Render the template from a features file and merge it into the target
    Sync {
        /// Project features (TOML)
        #[arg(long)]
        features: PathBuf,

        /// Configuration file to update
        #[arg(long, default_value = "mkdocs.yml")]
        target: PathBuf,

        /// Report changes without writing the target
        #[arg(long)]
        dry_run: bool,

        /// Format of the summary and diagnostics
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the template rendered from a features file
    Render {
        /// Project features (TOML)
        #[arg(long)]
        features: PathBuf,
    },
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docforge=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Merge {
            template,
            target,
            dry_run,
            format,
        } => commands::merge::execute(commands::merge::MergeArgs {
            template,
            target,
            options: ApplyOptions { dry_run, format },
        }),
        Commands::Sync {
            features,
            target,
            dry_run,
            format,
        } => commands::sync::execute(commands::sync::SyncArgs {
            features,
            target,
            options: ApplyOptions { dry_run, format },
        }),
        Commands::Render { features } => commands::render::execute(&features),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
