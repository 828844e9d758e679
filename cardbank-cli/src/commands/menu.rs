//! Menu command - the interactive line-oriented banking session

use std::io::{self, BufRead, Write};

use anyhow::Result;
use rust_decimal::Decimal;

use cardbank_core::services::Ledger;
use cardbank_core::Account;

use super::get_context;
use super::transfer::describe;

const UNSUCCESSFUL: &str = "Operation was unsuccessful!";

pub fn run(file_name: Option<&str>) -> Result<()> {
    let mut ctx = get_context(file_name)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    Session::new(&mut ctx.ledger, stdin.lock(), stdout.lock()).run()
}

/// Whether the session keeps going after a logged-in stretch
enum Flow {
    Continue,
    Exit,
}

/// One interactive session over a ledger
pub struct Session<'a, R, W> {
    ledger: &'a mut Ledger,
    input: R,
    out: W,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(ledger: &'a mut Ledger, input: R, out: W) -> Self {
        Self { ledger, input, out }
    }

    /// Run until the user exits or input ends
    pub fn run(mut self) -> Result<()> {
        loop {
            writeln!(self.out, "1. Create an account")?;
            writeln!(self.out, "2. Log into account")?;
            writeln!(self.out, "0. Exit")?;

            let Some(choice) = self.read_line()? else {
                break;
            };
            match choice.trim() {
                "1" => self.create_account()?,
                "2" => {
                    if let Flow::Exit = self.log_in()? {
                        break;
                    }
                }
                "0" => break,
                _ => {}
            }
        }
        self.out.flush()?;
        Ok(())
    }

    /// Next input line without its terminator, None at end of input
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn create_account(&mut self) -> Result<()> {
        match self.ledger.create_account() {
            Ok(account) => {
                writeln!(self.out, "\nYour card has been created")?;
                writeln!(self.out, "Your card number:")?;
                writeln!(self.out, "{}", account.number)?;
                writeln!(self.out, "Your card PIN:")?;
                writeln!(self.out, "{}\n", account.pin)?;
            }
            Err(_) => writeln!(self.out, "\n{}\n", UNSUCCESSFUL)?,
        }
        Ok(())
    }

    fn log_in(&mut self) -> Result<Flow> {
        writeln!(self.out, "\nEnter your card number:")?;
        let Some(number) = self.read_line()? else {
            return Ok(Flow::Exit);
        };
        writeln!(self.out, "Enter your PIN:")?;
        let Some(pin) = self.read_line()? else {
            return Ok(Flow::Exit);
        };

        let account = match self.ledger.authenticate(number.trim(), pin.trim()) {
            Ok(account) => account,
            Err(_) => {
                writeln!(self.out, "\nWrong card number or PIN!\n")?;
                return Ok(Flow::Continue);
            }
        };
        writeln!(self.out, "\nYou have successfully logged in!\n")?;

        loop {
            writeln!(self.out, "1. Balance")?;
            writeln!(self.out, "2. Add income")?;
            writeln!(self.out, "3. Do transfer")?;
            writeln!(self.out, "4. Close account")?;
            writeln!(self.out, "5. Log out")?;
            writeln!(self.out, "0. Exit")?;

            let Some(choice) = self.read_line()? else {
                return Ok(Flow::Exit);
            };
            match choice.trim() {
                "1" => match self.ledger.balance(&account) {
                    Ok(balance) => writeln!(self.out, "\nBalance: {}\n", balance)?,
                    Err(_) => writeln!(self.out, "\n{}\n", UNSUCCESSFUL)?,
                },
                "2" => self.add_income(&account)?,
                "3" => self.do_transfer(&account)?,
                "4" => {
                    if self.ledger.close_account(&account).is_ok() {
                        writeln!(self.out, "\nThe account has been closed!\n")?;
                        return Ok(Flow::Continue);
                    }
                    writeln!(self.out, "{}\n", UNSUCCESSFUL)?;
                }
                "5" => {
                    writeln!(self.out, "\nYou have successfully logged out!\n")?;
                    return Ok(Flow::Continue);
                }
                "0" => return Ok(Flow::Exit),
                _ => {}
            }
        }
    }

    fn add_income(&mut self, account: &Account) -> Result<()> {
        writeln!(self.out, "\nEnter income:")?;
        let deposited = self
            .read_amount()?
            .map(|amount| self.ledger.deposit(account, amount).is_ok())
            .unwrap_or(false);

        if deposited {
            writeln!(self.out, "Income was added!\n")?;
        } else {
            writeln!(self.out, "{}\n", UNSUCCESSFUL)?;
        }
        Ok(())
    }

    fn do_transfer(&mut self, account: &Account) -> Result<()> {
        writeln!(self.out, "\nTransfer\nEnter card number:")?;
        let destination = self.read_line()?.unwrap_or_default();
        let destination = destination.trim();

        // Destination problems are reported before asking for an amount
        if let Err(e) = self.ledger.check_destination(account, destination) {
            writeln!(self.out, "{}\n", describe(&e))?;
            return Ok(());
        }

        writeln!(self.out, "Enter how much money you want to transfer:")?;
        let Some(amount) = self.read_amount()? else {
            writeln!(self.out, "{}\n", UNSUCCESSFUL)?;
            return Ok(());
        };

        match self.ledger.transfer(account, destination, amount) {
            Ok(()) => writeln!(self.out, "Success!\n")?,
            Err(e) => writeln!(self.out, "{}\n", describe(&e))?,
        }
        Ok(())
    }

    /// Parsed amount, None when the line is missing or not a number
    fn read_amount(&mut self) -> io::Result<Option<Decimal>> {
        Ok(self
            .read_line()?
            .and_then(|line| line.trim().parse::<Decimal>().ok()))
    }
}
