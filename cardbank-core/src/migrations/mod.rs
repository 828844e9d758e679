//! Schema migrations for the card database
//!
//! Each entry is a (name, sql) pair embedded with include_str!. Names sort in
//! application order; `000_migrations.sql` bootstraps the bookkeeping table.

/// Every migration, in the order it must be applied.
///
/// New migrations get the next NNN_ prefix and are appended here.
pub const MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    ("001_card.sql", include_str!("001_card.sql")),
];
