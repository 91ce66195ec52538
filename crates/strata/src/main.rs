//! strata CLI - Main entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod loader;

use commands::CascadeArgs;

#[derive(Parser)]
#[command(name = "strata")]
#[command(version)]
#[command(about = "Cascade YAML configuration files into one document", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cascade the sources and write the merged document as JSON
    Render {
        #[command(flatten)]
        cascade: CascadeArgs,

        /// Write output to FILE instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Write JSON on a single line
        #[arg(long)]
        compact: bool,

        /// Fail when any warning is reported
        #[arg(long)]
        deny_warnings: bool,
    },

    /// Show every pipeline stage of a cascade as a Markdown walkthrough
    Explain {
        #[command(flatten)]
        cascade: CascadeArgs,

        /// Write output to FILE instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so they never mix with the document on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "strata=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            cascade,
            output,
            compact,
            deny_warnings,
        } => commands::render::execute(commands::render::RenderArgs {
            cascade,
            output,
            compact,
            deny_warnings,
        }),
        Commands::Explain { cascade, output } => {
            commands::explain::execute(commands::explain::ExplainArgs { cascade, output })
        }
    }
}
