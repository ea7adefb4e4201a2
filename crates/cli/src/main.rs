//! Stockroom CLI - database migrations and demo data.
//!
//! # Usage
//!
//! ```bash
//! # Apply schema migrations
//! stockroom-cli migrate
//!
//! # Insert a demo store with products, items and an order
//! stockroom-cli seed
//! ```
//!
//! Both commands read `STOCKROOM_DATABASE_URL` (or `DATABASE_URL`), loading
//! `.env` first if present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "stockroom-cli")]
#[command(author, version, about = "Stockroom CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert a demo store with two products, items and one order
    Seed {
        /// Items to create per product
        #[arg(short, long, default_value_t = 3)]
        items: u32,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Seed { items } => commands::seed::run(items).await,
    }
}
