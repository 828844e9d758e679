//! Integration tests for cardbank-core
//!
//! These tests run the ledger against a real DuckDB file in a temp directory.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::path::Path;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use tempfile::TempDir;

use cardbank_core::adapters::duckdb::DuckDbRepository;
use cardbank_core::ports::CardRepository;
use cardbank_core::services::Ledger;
use cardbank_core::{card_number, Account, CardbankContext, Error};

// ============================================================================
// Test Helpers
// ============================================================================

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// Open a ledger over the database file at `db_path`
fn open_ledger(db_path: &Path, seed: u64) -> (Arc<DuckDbRepository>, Ledger) {
    let repo = Arc::new(DuckDbRepository::new(db_path).expect("Failed to open repository"));
    let ledger = Ledger::with_rng(repo.clone(), Box::new(StdRng::seed_from_u64(seed)))
        .expect("Failed to open ledger");
    (repo, ledger)
}

/// Rows in the store, sorted by card number
fn stored(repo: &DuckDbRepository) -> Vec<Account> {
    repo.load_all().unwrap()
}

/// Mirror contents, sorted by card number
fn mirrored(ledger: &Ledger) -> Vec<Account> {
    let mut accounts: Vec<Account> = ledger.accounts().cloned().collect();
    accounts.sort_by(|a, b| a.number.cmp(&b.number));
    accounts
}

// ============================================================================
// Ledger over DuckDB
// ============================================================================

#[test]
fn test_full_scenario_against_duckdb() {
    let temp_dir = TempDir::new().unwrap();
    let (repo, mut ledger) = open_ledger(&temp_dir.path().join("card.s3db"), 1);

    let a = ledger.create_account().unwrap();
    assert_eq!(ledger.balance(&a).unwrap(), Decimal::ZERO);
    assert_eq!(ledger.deposit(&a, dec("100.00")).unwrap(), dec("100.00"));

    let b = ledger.create_account().unwrap();
    assert_eq!(ledger.balance(&b).unwrap(), Decimal::ZERO);

    ledger.transfer(&a, &b.number, dec("40.00")).unwrap();
    assert_eq!(ledger.balance(&a).unwrap(), dec("60.00"));
    assert_eq!(ledger.balance(&b).unwrap(), dec("40.00"));

    let err = ledger.transfer(&a, &b.number, dec("1000.00")).unwrap_err();
    assert!(matches!(err, Error::InsufficientFunds));
    assert_eq!(ledger.balance(&a).unwrap(), dec("60.00"));
    assert_eq!(ledger.balance(&b).unwrap(), dec("40.00"));

    assert_eq!(stored(&repo), mirrored(&ledger));
}

#[test]
fn test_reopen_rebuilds_mirror_from_disk() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("card.s3db");

    let (a, b) = {
        let (_repo, mut ledger) = open_ledger(&db_path, 2);
        let a = ledger.create_account().unwrap();
        let b = ledger.create_account().unwrap();
        ledger.deposit(&a, dec("10.25")).unwrap();
        ledger.transfer(&a, &b.number, dec("0.25")).unwrap();
        (a, b)
    };

    let (repo, ledger) = open_ledger(&db_path, 3);
    assert_eq!(ledger.len(), 2);
    let a = ledger.authenticate(&a.number, &a.pin).unwrap();
    let b = ledger.authenticate(&b.number, &b.pin).unwrap();
    assert_eq!(a.balance, dec("10.00"));
    assert_eq!(b.balance, dec("0.25"));
    assert_eq!(stored(&repo), mirrored(&ledger));
}

#[test]
fn test_deposits_are_additive_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("card.s3db");

    let (x, y) = {
        let (_repo, mut ledger) = open_ledger(&db_path, 4);
        let x = ledger.create_account().unwrap();
        let y = ledger.create_account().unwrap();
        ledger.deposit(&x, dec("3.10")).unwrap();
        ledger.deposit(&x, dec("4.05")).unwrap();
        ledger.deposit(&y, dec("7.15")).unwrap();
        (x, y)
    };

    let (_repo, ledger) = open_ledger(&db_path, 5);
    assert_eq!(ledger.balance(&x).unwrap(), ledger.balance(&y).unwrap());
}

#[test]
fn test_closed_account_stays_closed_after_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("card.s3db");

    let (closed, kept) = {
        let (_repo, mut ledger) = open_ledger(&db_path, 6);
        let closed = ledger.create_account().unwrap();
        let kept = ledger.create_account().unwrap();
        ledger.close_account(&closed).unwrap();
        assert!(matches!(
            ledger.authenticate(&closed.number, &closed.pin),
            Err(Error::NotFound(_))
        ));
        (closed, kept)
    };

    let (_repo, ledger) = open_ledger(&db_path, 7);
    assert!(matches!(
        ledger.authenticate(&closed.number, &closed.pin),
        Err(Error::NotFound(_))
    ));
    assert!(ledger.authenticate(&kept.number, &kept.pin).is_ok());
}

#[test]
fn test_rejected_transfers_leave_source_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let (repo, mut ledger) = open_ledger(&temp_dir.path().join("card.s3db"), 8);
    let a = ledger.create_account().unwrap();
    ledger.deposit(&a, dec("5.00")).unwrap();

    let mut malformed = a.number.clone();
    let last = malformed.pop().unwrap().to_digit(10).unwrap();
    malformed.push(char::from_digit((last + 1) % 10, 10).unwrap());
    assert!(!card_number::validate(&malformed));

    assert!(matches!(
        ledger.transfer(&a, &malformed, dec("1.00")),
        Err(Error::InvalidIdentifier(_))
    ));
    assert!(matches!(
        ledger.transfer(&a, "4000000000000002", dec("1.00")),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        ledger.transfer(&a, &a.number, dec("1.00")),
        Err(Error::SelfTransfer)
    ));

    assert_eq!(ledger.balance(&a).unwrap(), dec("5.00"));
    assert_eq!(stored(&repo), mirrored(&ledger));
}

// ============================================================================
// Repository-level atomicity
// ============================================================================

#[test]
fn test_transfer_atomic_rolls_back_on_missing_destination() {
    let temp_dir = TempDir::new().unwrap();
    let repo = DuckDbRepository::new(&temp_dir.path().join("card.s3db")).unwrap();
    repo.create_schema_if_absent().unwrap();
    repo.insert_account(&Account::new("4000000000000002", "0001", dec("50.00")))
        .unwrap();

    let result = repo.transfer_atomic("4000000000000002", "4000000000000010", dec("20.00"));
    assert!(matches!(result, Err(Error::Persistence(_))));

    let rows = repo.load_all().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].balance, dec("50.00"), "debit must be rolled back");
}

#[test]
fn test_sequential_connections() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("card.s3db");

    for _ in 0..5 {
        let repo = DuckDbRepository::new(&db_path).unwrap();
        repo.create_schema_if_absent().unwrap();
        assert_eq!(repo.db_path(), Some(db_path.as_path()));
        // Connection dropped at end of loop
    }
}

// ============================================================================
// Context
// ============================================================================

#[test]
fn test_context_honours_file_name_override() {
    let temp_dir = TempDir::new().unwrap();

    {
        let mut ctx = CardbankContext::new(temp_dir.path(), Some("cards.db")).unwrap();
        let account = ctx.ledger.create_account().unwrap();
        ctx.ledger.deposit(&account, dec("1.00")).unwrap();
        let status = ctx.status();
        assert_eq!(status.total_accounts, 1);
        assert_eq!(status.total_funds, dec("1.00"));
        assert!(ctx.schema_state().unwrap().pending.is_empty());
        assert_eq!(ctx.db_path(), temp_dir.path().join("cards.db"));
    }
    assert!(temp_dir.path().join("cards.db").exists());

    // A one-character override falls back to the configured file
    let ctx = CardbankContext::new(temp_dir.path(), Some("x")).unwrap();
    assert!(!temp_dir.path().join("x").exists());
    assert_ne!(ctx.config.db_file, "x");
}
