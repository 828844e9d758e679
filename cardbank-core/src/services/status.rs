//! Status service - ledger-wide summary

use rust_decimal::Decimal;
use serde::Serialize;

use super::Ledger;

/// Summarises the ledger without exposing any PIN
pub struct StatusService;

impl StatusService {
    /// Get overall status summary
    pub fn get_status(ledger: &Ledger) -> StatusSummary {
        let mut accounts: Vec<AccountSummary> = ledger
            .accounts()
            .map(|a| AccountSummary {
                card: a.masked_number(),
                balance: a.balance,
            })
            .collect();
        accounts.sort_by(|a, b| a.card.cmp(&b.card));

        StatusSummary {
            total_accounts: ledger.len(),
            total_funds: ledger.total_funds(),
            accounts,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub total_accounts: usize,
    pub total_funds: Decimal,
    pub accounts: Vec<AccountSummary>,
}

#[derive(Debug, Serialize)]
pub struct AccountSummary {
    /// Masked card number
    pub card: String,
    pub balance: Decimal,
}
