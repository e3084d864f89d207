//! SmartSpend CLI — the main entry point.
//!
//! Commands:
//! - `onboard`    — Initialize config
//! - `recommend`  — One-shot recommendation for a profile
//! - `gateway`    — Start the HTTP server
//! - `doctor`     — Diagnose system health

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "smartspend",
    about = "SmartSpend — budget recommendation service",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Compute a recommendation for one profile
    Recommend {
        /// Age in years
        #[arg(long)]
        age: f64,

        /// Monthly income
        #[arg(long)]
        income: f64,

        /// Category to allocate for (repeatable); none = all canonical
        #[arg(short, long = "category")]
        categories: Vec<String>,

        /// Split weight as NAME=WEIGHT (repeatable)
        #[arg(short, long = "weight")]
        weights: Vec<String>,

        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP gateway server
    Gateway {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Diagnose system health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Recommend {
            age,
            income,
            categories,
            weights,
            json,
        } => commands::recommend::run(age, income, categories, weights, json).await?,
        Commands::Gateway { port } => commands::gateway::run(port).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
