//! TikTokFlow CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! ttf-cli migrate
//!
//! # Seed the database with demo data
//! ttf-cli seed
//!
//! # Seed for a specific seller account
//! ttf-cli seed --seller 7b0d1c9e-4f2a-4f60-9f3b-1a2b3c4d5e6f
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed database with demo orders and products

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use uuid::Uuid;

mod commands;

#[derive(Parser)]
#[command(name = "ttf-cli")]
#[command(author, version, about = "TikTokFlow CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed database with demo orders and products
    Seed {
        /// Seller account to own the seeded rows (random if omitted)
        #[arg(short, long)]
        seller: Option<Uuid>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { seller } => commands::seed::run(seller).await?,
    }
    Ok(())
}
