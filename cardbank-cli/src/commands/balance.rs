//! Balance command

use anyhow::Result;

use super::{get_context, login, print_json};

pub fn run(file_name: Option<&str>, number: &str, pin: &str, json: bool) -> Result<()> {
    let ctx = get_context(file_name)?;

    if json {
        let result = ctx
            .ledger
            .authenticate(number, pin)
            .and_then(|account| ctx.ledger.balance(&account));
        return print_json(result);
    }

    let account = login(&ctx, number, pin)?;
    println!("Balance: {}", ctx.ledger.balance(&account)?);

    Ok(())
}
