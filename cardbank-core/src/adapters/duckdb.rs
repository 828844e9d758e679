//! DuckDB repository implementation

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use duckdb::{params, Connection};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{mask_number, Account};
use crate::ports::CardRepository;
use crate::services::{MigrationResult, MigrationService, SchemaState};

/// Maximum number of attempts when the database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
        || lower.contains("could not set lock on file")
}

/// DuckDB-backed card repository
///
/// Holds one long-lived connection behind a mutex. Every operation takes the
/// guard for its own scope, so the connection is released on every exit path.
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbRepository {
    /// Open (or create) the card database at `db_path`
    ///
    /// Retries with exponential backoff while another process holds the
    /// file lock.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut attempt = 0;
        loop {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    debug!(path = %db_path.display(), "opened card database");
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    attempt += 1;
                    if !is_retryable_error(&err_msg) || attempt >= MAX_RETRIES {
                        return Err(Error::persistence(format!(
                            "failed to open {}: {}",
                            db_path.display(),
                            err_msg
                        )));
                    }
                    let delay = Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt - 1));
                    warn!(
                        attempt,
                        max = MAX_RETRIES,
                        delay_ms = delay.as_millis() as u64,
                        error = %err_msg,
                        "database busy, retrying"
                    );
                    thread::sleep(delay);
                }
            }
        }
    }

    /// Open a private in-memory database, mostly useful for tests
    pub fn open_in_memory() -> Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory_with_flags(config)?),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: &Path) -> std::result::Result<Connection, duckdb::Error> {
        // Extension autoloading stays off, nothing here needs an extension
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Connection::open_with_flags(db_path, config)
    }

    /// Location of the database file, `None` for in-memory databases
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::persistence(format!("connection lock poisoned: {}", e)))
    }

    /// Run pending migrations, returning what was applied
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.lock()?;
        MigrationService::new(&conn).run_pending()
    }

    /// Applied and pending schema migrations
    pub fn schema_state(&self) -> Result<SchemaState> {
        let conn = self.lock()?;
        MigrationService::new(&conn).state()
    }
}

fn parse_balance(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw).map_err(|e| Error::persistence(format!("bad stored balance '{}': {}", raw, e)))
}

impl CardRepository for DuckDbRepository {
    fn create_schema_if_absent(&self) -> Result<()> {
        let result = self.run_migrations()?;
        if result.applied.is_empty() {
            debug!(already_applied = result.already_applied, "schema is up to date");
        } else {
            info!(applied = ?result.applied, "applied schema migrations");
        }
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Account>> {
        let conn = self.lock()?;
        // Decimals are read as text so no precision is lost on the way in
        let mut stmt =
            conn.prepare("SELECT number, pin, CAST(balance AS VARCHAR) FROM card ORDER BY number")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(number, pin, balance)| Ok(Account::new(number, pin, parse_balance(&balance)?)))
            .collect()
    }

    fn insert_account(&self, account: &Account) -> Result<()> {
        let conn = self.lock()?;
        let inserted = conn.execute(
            "INSERT INTO card (number, pin, balance) VALUES (?, ?, CAST(? AS DECIMAL(18, 2)))",
            params![account.number, account.pin, account.balance.to_string()],
        )?;
        if inserted != 1 {
            return Err(Error::persistence(format!(
                "insert of card {} affected {} rows",
                account.masked_number(),
                inserted
            )));
        }
        Ok(())
    }

    fn update_balance(&self, number: &str, balance: Decimal) -> Result<usize> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE card SET balance = CAST(? AS DECIMAL(18, 2)) WHERE number = ?",
            params![balance.to_string(), number],
        )?;
        Ok(updated)
    }

    fn transfer_atomic(&self, source: &str, destination: &str, amount: Decimal) -> Result<()> {
        let mut conn = self.lock()?;
        let amount = amount.to_string();

        // Dropping `tx` without commit rolls both updates back
        let tx = conn.transaction()?;
        let debited = tx.execute(
            "UPDATE card SET balance = balance - CAST(? AS DECIMAL(18, 2)) WHERE number = ?",
            params![amount, source],
        )?;
        if debited != 1 {
            return Err(Error::persistence(format!(
                "debit of card {} affected {} rows",
                mask_number(source),
                debited
            )));
        }

        let credited = tx.execute(
            "UPDATE card SET balance = balance + CAST(? AS DECIMAL(18, 2)) WHERE number = ?",
            params![amount, destination],
        )?;
        if credited != 1 {
            return Err(Error::persistence(format!(
                "credit of card {} affected {} rows",
                mask_number(destination),
                credited
            )));
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_account(&self, number: &str) -> Result<usize> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM card WHERE number = ?", params![number])?;
        Ok(deleted)
    }
}
