//! CLI command implementations

pub mod balance;
pub mod close;
pub mod config;
pub mod create;
pub mod deposit;
pub mod menu;
pub mod status;
pub mod transfer;

use std::path::PathBuf;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;

use cardbank_core::{Account, CardbankContext, OperationResult};

/// Environment variable pointing at the data directory
pub const DATA_DIR_ENV: &str = "CARDBANK_DIR";

/// Get the cardbank directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".cardbank"))
        .context("Could not find home directory; set CARDBANK_DIR")
}

/// Open the ledger in the data directory
pub fn get_context(file_name: Option<&str>) -> Result<CardbankContext> {
    let data_dir = get_data_dir()?;

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create cardbank directory: {:?}", data_dir))?;

    CardbankContext::new(&data_dir, file_name).context("Failed to open the card ledger")
}

/// Log in with a card number and PIN
pub fn login(ctx: &CardbankContext, number: &str, pin: &str) -> Result<Account> {
    ctx.ledger
        .authenticate(number, pin)
        .context("Wrong card number or PIN!")
}

/// Parse a money amount given on the command line
pub fn parse_amount(raw: &str) -> Result<Decimal> {
    raw.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Not a valid amount: {}", raw))
}

/// Print an operation result as JSON, exiting with 1 on failure
pub fn print_json<T: Serialize>(result: cardbank_core::Result<T>) -> Result<()> {
    let output = OperationResult::from(result);
    println!("{}", serde_json::to_string_pretty(&output)?);
    if !output.success {
        std::process::exit(1);
    }
    Ok(())
}
