//! OnlineShop CLI - database migrations and account management.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! shop-cli migrate
//!
//! # Create an admin account
//! shop-cli admin create -e admin@example.com -p 'long random password'
//!
//! # Promote an existing account to admin
//! shop-cli admin promote --id 42
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Create an admin account
//! - `admin promote` - Grant the admin role to an existing account

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shop-cli")]
#[command(author, version, about = "OnlineShop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin password (min 8 characters)
        #[arg(short, long)]
        password: String,
    },
    /// Promote an existing account to admin
    Promote {
        /// Account ID
        #[arg(long)]
        id: i32,
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
            AdminAction::Create { email, password } => {
                commands::admin::create(&email, &password).await?;
            }
            AdminAction::Promote { id } => {
                commands::admin::promote(id).await?;
            }
        },
    }
    Ok(())
}
