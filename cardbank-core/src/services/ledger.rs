//! Ledger service - accounts, authentication and balance mutations
//!
//! The ledger owns an in-memory mirror of every stored card, keyed by card
//! number. Each mutation is written to the repository first; the mirror is
//! only touched once the write is known to have succeeded, so a failed call
//! leaves mirror and store exactly as they were.

use std::collections::HashMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::domain::card_number;
use crate::domain::result::{Error, Result};
use crate::domain::{mask_number, Account};
use crate::ports::CardRepository;

/// Fractional digits the store keeps for balances
const AMOUNT_SCALE: u32 = 2;

/// Authoritative set of accounts, backed 1:1 by repository rows
pub struct Ledger {
    repository: Arc<dyn CardRepository>,
    accounts: HashMap<String, Account>,
    rng: Box<dyn RngCore + Send>,
}

impl Ledger {
    /// Open a ledger over `repository`, seeding card generation from OS entropy
    pub fn open(repository: Arc<dyn CardRepository>) -> Result<Self> {
        Self::with_rng(repository, Box::new(StdRng::from_entropy()))
    }

    /// Open a ledger with an explicit randomness source
    ///
    /// Ensures the schema exists and loads every stored card into the mirror.
    pub fn with_rng(repository: Arc<dyn CardRepository>, rng: Box<dyn RngCore + Send>) -> Result<Self> {
        repository.create_schema_if_absent()?;
        let mut accounts = HashMap::new();
        for mut account in repository.load_all()? {
            account.validate().map_err(|reason| {
                Error::persistence(format!("stored card {} is invalid: {}", account.masked_number(), reason))
            })?;
            account.balance = to_money(account.balance);
            accounts.insert(account.number.clone(), account);
        }
        debug!(accounts = accounts.len(), "loaded ledger");

        Ok(Self {
            repository,
            accounts,
            rng,
        })
    }

    /// Issue a new card with zero balance
    pub fn create_account(&mut self) -> Result<Account> {
        let account = Account::issue(&mut *self.rng);

        if let Err(e) = self.repository.insert_account(&account) {
            warn!(card = %account.masked_number(), error = %e, "failed to store new account");
            return Err(e);
        }

        info!(card = %account.masked_number(), "account created");
        self.accounts.insert(account.number.clone(), account.clone());
        Ok(account)
    }

    /// Find the account with this card number and PIN
    ///
    /// A wrong PIN and an unknown card number give the same `NotFound`.
    pub fn authenticate(&self, number: &str, pin: &str) -> Result<Account> {
        match self.accounts.get(number) {
            Some(account) if account.matches_pin(pin) => Ok(account.clone()),
            _ => Err(Error::not_found("wrong card number or PIN")),
        }
    }

    /// Current balance of an authenticated account
    pub fn balance(&self, account: &Account) -> Result<Decimal> {
        Ok(self.resolve(account)?.balance)
    }

    /// Add `amount` to the account, returning the new balance
    pub fn deposit(&mut self, account: &Account, amount: Decimal) -> Result<Decimal> {
        check_amount(amount)?;
        let amount = to_money(amount);
        let current = self.resolve(account)?;
        let number = current.number.clone();
        let new_balance = current
            .balance
            .checked_add(amount)
            .map(to_money)
            .ok_or_else(|| Error::invalid_amount("deposit would overflow the balance"))?;

        let updated = self.repository.update_balance(&number, new_balance)?;
        if updated != 1 {
            warn!(card = %current.masked_number(), rows = updated, "deposit did not update exactly one row");
            return Err(Error::persistence(format!(
                "deposit updated {} rows instead of 1",
                updated
            )));
        }

        if let Some(entry) = self.accounts.get_mut(&number) {
            entry.balance = new_balance;
        }
        info!(card = %account.masked_number(), "deposit stored");
        Ok(new_balance)
    }

    /// Check that `destination` can receive a transfer from `source`
    ///
    /// Runs the destination checks of [`Ledger::transfer`] in the same order:
    /// checksum, existence, self transfer.
    pub fn check_destination(&self, source: &Account, destination: &str) -> Result<()> {
        if !card_number::validate(destination) {
            return Err(Error::InvalidIdentifier(destination.to_string()));
        }
        if !self.accounts.contains_key(destination) {
            return Err(Error::not_found("no such card"));
        }
        if self.resolve(source)?.number == destination {
            return Err(Error::SelfTransfer);
        }
        Ok(())
    }

    /// Move `amount` from `source` to the card numbered `destination`
    ///
    /// Checks run in a fixed order, each with its own error: destination
    /// checksum, destination existence, self transfer, amount, funds.
    pub fn transfer(&mut self, source: &Account, destination: &str, amount: Decimal) -> Result<()> {
        self.check_destination(source, destination)?;
        check_amount(amount)?;
        let amount = to_money(amount);

        let source = self.resolve(source)?;
        if amount > source.balance {
            return Err(Error::InsufficientFunds);
        }
        let source_balance = to_money(source.balance - amount);
        let destination_balance = self
            .accounts
            .get(destination)
            .and_then(|to| to.balance.checked_add(amount))
            .map(to_money)
            .ok_or_else(|| Error::invalid_amount("transfer would overflow the destination balance"))?;

        let source_number = source.number.clone();
        if let Err(e) = self
            .repository
            .transfer_atomic(&source_number, destination, amount)
        {
            warn!(card = %source.masked_number(), error = %e, "transfer rolled back");
            return Err(e);
        }

        // Committed: mirror both sides
        if let Some(from) = self.accounts.get_mut(&source_number) {
            from.balance = source_balance;
        }
        if let Some(to) = self.accounts.get_mut(destination) {
            to.balance = destination_balance;
        }
        info!(
            from = %mask_number(&source_number),
            to = %mask_number(destination),
            "transfer committed"
        );
        Ok(())
    }

    /// Close the account, deleting its row and then its mirror entry
    pub fn close_account(&mut self, account: &Account) -> Result<()> {
        let number = self.resolve(account)?.number.clone();

        let deleted = self.repository.delete_account(&number)?;
        if deleted != 1 {
            warn!(card = %account.masked_number(), rows = deleted, "close did not delete exactly one row");
            return Err(Error::persistence(format!(
                "close deleted {} rows instead of 1",
                deleted
            )));
        }

        self.accounts.remove(&number);
        info!(card = %account.masked_number(), "account closed");
        Ok(())
    }

    /// Look up an account by card number
    pub fn get(&self, number: &str) -> Option<&Account> {
        self.accounts.get(number)
    }

    /// Every account in the mirror, in no particular order
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Sum of all balances
    pub fn total_funds(&self) -> Decimal {
        self.accounts.values().map(|a| a.balance).sum()
    }

    /// The mirror entry for an account handed back by `authenticate`
    fn resolve(&self, account: &Account) -> Result<&Account> {
        self.accounts
            .get(&account.number)
            .filter(|stored| stored.matches_pin(&account.pin))
            .ok_or_else(|| Error::not_found("account is closed or unknown"))
    }
}

/// Money at the scale the store keeps
fn to_money(mut amount: Decimal) -> Decimal {
    amount.rescale(AMOUNT_SCALE);
    amount
}

/// Amounts must be positive with at most two fractional digits
fn check_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::invalid_amount(format!("{} is not positive", amount)));
    }
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(Error::invalid_amount(format!(
            "{} has more than {} decimal places",
            amount, AMOUNT_SCALE
        )));
    }
    Ok(())
}
