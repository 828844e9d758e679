//! Create command - issue a new card

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use super::get_context;

/// JSON output; the only place a PIN is ever printed
#[derive(Serialize)]
struct CreatedCard {
    number: String,
    pin: String,
}

pub fn run(file_name: Option<&str>, json: bool) -> Result<()> {
    let mut ctx = get_context(file_name)?;
    let account = ctx.ledger.create_account()?;

    if json {
        let output = CreatedCard {
            number: account.number,
            pin: account.pin,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Your card has been created".green());
    println!("Your card number:");
    println!("{}", account.number.bold());
    println!("Your card PIN:");
    println!("{}", account.pin.bold());

    Ok(())
}
