//! Fernwood CLI - Database migrations and seeding.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! fernwood-cli migrate
//!
//! # Seed a demo account with a few products
//! fernwood-cli seed -e demo@example.com -p "a demo password"
//! ```
//!
//! # Environment Variables
//!
//! - `FERNWOOD_DATABASE_URL` - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "fernwood-cli")]
#[command(author, version, about = "Fernwood CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with a demo account and products
    Seed {
        /// Email for the demo account
        #[arg(short, long, default_value = "demo@fernwood.dev")]
        email: String,

        /// Password for the demo account
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { email, password } => commands::seed::run(&email, &password).await?,
    }
    Ok(())
}
