//! Breadbox CLI - database migrations and operational tooling.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! breadbox-cli migrate
//!
//! # Create an admin account (password read from BREADBOX_ADMIN_PASSWORD)
//! breadbox-cli admin create -e owner@breadbox.test -n "Shop Owner"
//!
//! # Load the demo catalog into an empty shop
//! breadbox-cli seed
//! ```
//!
//! # Commands
//!
//! - `migrate` - Apply database migrations
//! - `admin create` - Create admin accounts
//! - `seed` - Seed the catalog with demo products

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "breadbox-cli")]
#[command(author, version, about = "Breadbox CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Migrate,
    /// Manage accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the catalog with demo products
    Seed,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create an admin account. The password is read from the
    /// `BREADBOX_ADMIN_PASSWORD` environment variable so it stays out
    /// of shell history.
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,
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
        Commands::Admin { action } => match action {
            AdminAction::Create { email, name } => {
                commands::admin::create(&email, &name).await?;
            }
        },
        Commands::Seed => commands::seed::run().await?,
    }
    Ok(())
}
