//! Close command - close a card account

use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;

use super::{get_context, login};

pub fn run(file_name: Option<&str>, number: &str, pin: &str, force: bool) -> Result<()> {
    let mut ctx = get_context(file_name)?;
    let account = login(&ctx, number, pin)?;

    // Confirm closure unless --force
    if !force {
        println!(
            "\n{}",
            format!("This will close card {}.", account.masked_number()).yellow()
        );
        println!("{}\n", "The remaining balance is discarded.".dimmed());

        if !Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?
        {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    ctx.ledger.close_account(&account)?;
    println!("\n{} The account has been closed!\n", "✓".green());

    Ok(())
}
