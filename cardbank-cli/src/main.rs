//! Cardbank CLI - card accounts in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod output;

use commands::{balance, close, config, create, deposit, menu, status, transfer};

/// Cardbank - card accounts in your terminal
#[derive(Parser)]
#[command(name = "cardbank", version, about, long_about = None)]
struct Cli {
    /// Database file name inside the data directory (at least 2 characters)
    #[arg(long, global = true)]
    file_name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new card account
    Create {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the balance of a card
    Balance {
        /// Card number
        #[arg(long)]
        number: String,
        /// Card PIN
        #[arg(long)]
        pin: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add income to a card
    Deposit {
        /// Card number
        #[arg(long)]
        number: String,
        /// Card PIN
        #[arg(long)]
        pin: String,
        /// Amount to add
        #[arg(long)]
        amount: String,
    },

    /// Transfer money to another card
    Transfer {
        /// Card number
        #[arg(long)]
        number: String,
        /// Card PIN
        #[arg(long)]
        pin: String,
        /// Destination card number
        #[arg(long)]
        to: String,
        /// Amount to transfer
        #[arg(long)]
        amount: String,
    },

    /// Close a card account
    Close {
        /// Card number
        #[arg(long)]
        number: String,
        /// Card PIN
        #[arg(long)]
        pin: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Show account count and total funds
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the interactive menu
    Menu,

    /// Show the database location, or save a new database file name
    Config {
        /// Database file name to save in settings.json
        #[arg(long)]
        db_file: Option<String>,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr, filtered by RUST_LOG (default: warn)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let file_name = cli.file_name.as_deref();
    match cli.command {
        Commands::Create { json } => create::run(file_name, json),
        Commands::Balance { number, pin, json } => balance::run(file_name, &number, &pin, json),
        Commands::Deposit { number, pin, amount } => deposit::run(file_name, &number, &pin, &amount),
        Commands::Transfer { number, pin, to, amount } => {
            transfer::run(file_name, &number, &pin, &to, &amount)
        }
        Commands::Close { number, pin, force } => close::run(file_name, &number, &pin, force),
        Commands::Status { json } => status::run(file_name, json),
        Commands::Menu => menu::run(file_name),
        Commands::Config { db_file } => config::run(db_file.as_deref()),
    }
}
