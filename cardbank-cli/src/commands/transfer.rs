//! Transfer command - move money to another card

use anyhow::Result;

use cardbank_core::Error;

use super::{get_context, login, parse_amount};
use crate::output;

pub fn run(file_name: Option<&str>, number: &str, pin: &str, to: &str, amount: &str) -> Result<()> {
    let amount = parse_amount(amount)?;
    let mut ctx = get_context(file_name)?;
    let source = login(&ctx, number, pin)?;

    match ctx.ledger.transfer(&source, to, amount) {
        Ok(()) => {
            output::success("Success!");
            Ok(())
        }
        Err(e) => {
            let message = describe(&e);
            Err(anyhow::Error::new(e).context(message))
        }
    }
}

/// User-facing wording for a rejected transfer
pub fn describe(error: &Error) -> &'static str {
    match error {
        Error::InvalidIdentifier(_) => {
            "Probably you made a mistake in the card number. Please try again!"
        }
        Error::NotFound(_) => "Such a card does not exist.",
        Error::SelfTransfer => "You can't transfer money to the same account!",
        Error::InsufficientFunds => "Not enough money!",
        _ => "Operation was unsuccessful!",
    }
}
