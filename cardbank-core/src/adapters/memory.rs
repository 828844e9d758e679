//! In-memory repository with failure injection
//!
//! Behaves like the DuckDB adapter (row counts, all-or-nothing transfers)
//! but lets a test arm a one-shot failure at a chosen write, so every
//! persistence-failure path of the ledger can be exercised.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::{mask_number, Account};
use crate::ports::CardRepository;

/// Where the next injected failure happens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    /// `insert_account` returns an error
    Insert,
    /// `update_balance` reports zero affected rows
    UpdateBalance,
    /// `transfer_atomic` fails after the debit, before the credit
    Credit,
    /// `delete_account` reports zero affected rows
    Delete,
}

#[derive(Default)]
struct State {
    rows: BTreeMap<String, (String, Decimal)>,
    armed: Option<FailPoint>,
}

impl State {
    fn trip(&mut self, point: FailPoint) -> bool {
        if self.armed == Some(point) {
            self.armed = None;
            true
        } else {
            false
        }
    }

    fn transfer(&mut self, source: &str, destination: &str, amount: Decimal) -> Result<()> {
        let debit = self.rows.get_mut(source).ok_or_else(|| {
            Error::persistence(format!("debit of card {} affected 0 rows", mask_number(source)))
        })?;
        debit.1 = debit.1.checked_sub(amount).ok_or_else(|| {
            Error::persistence(format!("debit of card {} overflowed", mask_number(source)))
        })?;

        if self.trip(FailPoint::Credit) {
            return Err(Error::persistence("injected credit failure"));
        }

        let credit = self.rows.get_mut(destination).ok_or_else(|| {
            Error::persistence(format!("credit of card {} affected 0 rows", mask_number(destination)))
        })?;
        credit.1 = credit.1.checked_add(amount).ok_or_else(|| {
            Error::persistence(format!("credit of card {} overflowed", mask_number(destination)))
        })?;
        Ok(())
    }
}

/// Card repository kept entirely in memory
#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<State>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing rows
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let repo = Self::new();
        if let Ok(mut state) = repo.state.lock() {
            for account in accounts {
                state.rows.insert(account.number, (account.pin, account.balance));
            }
        }
        repo
    }

    /// Make the next write at `point` fail
    pub fn fail_next(&self, point: FailPoint) {
        if let Ok(mut state) = self.state.lock() {
            state.armed = Some(point);
        }
    }

    /// Current rows as accounts, ordered by number
    pub fn snapshot(&self) -> Vec<Account> {
        self.load_all().unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|e| Error::persistence(format!("memory store lock poisoned: {}", e)))
    }
}

impl CardRepository for MemoryRepository {
    fn create_schema_if_absent(&self) -> Result<()> {
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Account>> {
        let state = self.lock()?;
        Ok(state
            .rows
            .iter()
            .map(|(number, (pin, balance))| Account::new(number.clone(), pin.clone(), *balance))
            .collect())
    }

    fn insert_account(&self, account: &Account) -> Result<()> {
        let mut state = self.lock()?;
        if state.trip(FailPoint::Insert) {
            return Err(Error::persistence("injected insert failure"));
        }
        if state.rows.contains_key(&account.number) {
            return Err(Error::persistence(format!(
                "duplicate card number {}",
                account.masked_number()
            )));
        }
        state
            .rows
            .insert(account.number.clone(), (account.pin.clone(), account.balance));
        Ok(())
    }

    fn update_balance(&self, number: &str, balance: Decimal) -> Result<usize> {
        let mut state = self.lock()?;
        if state.trip(FailPoint::UpdateBalance) {
            return Ok(0);
        }
        match state.rows.get_mut(number) {
            Some(row) => {
                row.1 = balance;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn transfer_atomic(&self, source: &str, destination: &str, amount: Decimal) -> Result<()> {
        let mut state = self.lock()?;
        let before = state.rows.clone();
        let outcome = state.transfer(source, destination, amount);
        if outcome.is_err() {
            state.rows = before;
        }
        outcome
    }

    fn delete_account(&self, number: &str) -> Result<usize> {
        let mut state = self.lock()?;
        if state.trip(FailPoint::Delete) {
            return Ok(0);
        }
        Ok(usize::from(state.rows.remove(number).is_some()))
    }
}
