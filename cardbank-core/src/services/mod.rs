//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions.

mod ledger;
pub mod migration;
mod status;

pub use ledger::Ledger;
pub use migration::{MigrationResult, MigrationService, SchemaState};
pub use status::{AccountSummary, StatusService, StatusSummary};
