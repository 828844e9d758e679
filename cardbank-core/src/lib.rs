//! Cardbank Core - card accounts, deposits and transfers
//!
//! This crate implements the ledger following hexagonal architecture:
//!
//! - **domain**: Accounts, the card number codec and error types
//! - **ports**: Trait definitions for storage (CardRepository)
//! - **services**: The ledger and its supporting services
//! - **adapters**: Concrete storage (DuckDB, in-memory)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use adapters::duckdb::DuckDbRepository;
use config::Config;
use services::{Ledger, SchemaState, StatusService, StatusSummary};

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult, Result};
pub use domain::{card_number, Account};

/// Main context for Cardbank operations
///
/// Holds the configuration, the open database and the ledger built on it.
pub struct CardbankContext {
    pub config: Config,
    pub data_dir: PathBuf,
    repository: Arc<DuckDbRepository>,
    pub ledger: Ledger,
}

impl CardbankContext {
    /// Open the ledger stored in `data_dir`
    ///
    /// `file_name` is the command line override for the database file.
    pub fn new(data_dir: &Path, file_name: Option<&str>) -> Result<Self> {
        let mut config = Config::load(data_dir)?;
        config.override_db_file(file_name);

        let db_path = config.db_path(data_dir);
        let repository = Arc::new(DuckDbRepository::new(&db_path)?);
        let ledger = Ledger::open(repository.clone())?;

        Ok(Self {
            config,
            data_dir: data_dir.to_path_buf(),
            repository,
            ledger,
        })
    }

    /// Summary of all accounts
    pub fn status(&self) -> StatusSummary {
        StatusService::get_status(&self.ledger)
    }

    /// Migration state of the open database
    pub fn schema_state(&self) -> Result<SchemaState> {
        self.repository.schema_state()
    }

    /// Location of the open database file
    pub fn db_path(&self) -> PathBuf {
        self.config.db_path(&self.data_dir)
    }
}
