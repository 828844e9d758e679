//! Repository port - card storage abstraction

use rust_decimal::Decimal;

use crate::domain::result::Result;
use crate::domain::Account;

/// Card storage abstraction
///
/// This trait defines every storage operation the ledger relies on.
/// Implementations (adapters) provide the actual storage logic. All calls
/// are blocking.
pub trait CardRepository: Send + Sync {
    // === Schema ===

    /// Ensure the `card` table exists (idempotent)
    fn create_schema_if_absent(&self) -> Result<()>;

    // === Cards ===

    /// Get every stored card
    fn load_all(&self) -> Result<Vec<Account>>;

    /// Insert a new card row
    fn insert_account(&self, account: &Account) -> Result<()>;

    /// Set the balance of the card with `number`, returns the affected row count
    fn update_balance(&self, number: &str, balance: Decimal) -> Result<usize>;

    /// Move `amount` from `source` to `destination` in one transaction
    ///
    /// Either both balances change or neither does. Fails if either row is
    /// missing.
    fn transfer_atomic(&self, source: &str, destination: &str, amount: Decimal) -> Result<()>;

    /// Delete the card with `number`, returns the affected row count
    fn delete_account(&self, number: &str) -> Result<usize>;
}
