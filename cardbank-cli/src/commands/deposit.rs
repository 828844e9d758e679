//! Deposit command - add income to a card

use anyhow::Result;

use super::{get_context, login, parse_amount};
use crate::output;

pub fn run(file_name: Option<&str>, number: &str, pin: &str, amount: &str) -> Result<()> {
    let amount = parse_amount(amount)?;
    let mut ctx = get_context(file_name)?;
    let account = login(&ctx, number, pin)?;

    let balance = ctx.ledger.deposit(&account, amount)?;
    output::success("Income was added!");
    println!("Balance: {}", balance);

    Ok(())
}
