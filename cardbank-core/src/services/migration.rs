//! Migration service - brings the card database schema up to date
//!
//! Applied migrations are recorded in `sys_migrations`, so running the
//! service repeatedly is a no-op once the schema is current.

use duckdb::Connection;
use serde::Serialize;

use crate::domain::result::Result;
use crate::migrations::MIGRATIONS;

const BOOTSTRAP: &str = "000_migrations.sql";

/// Result of running migrations
#[derive(Debug)]
pub struct MigrationResult {
    /// Names of newly applied migrations
    pub applied: Vec<String>,
    /// Count of migrations that were already applied
    pub already_applied: usize,
}

/// Which migrations a database has and still needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaState {
    pub applied: Vec<String>,
    pub pending: Vec<String>,
}

/// Applies embedded migrations over a borrowed connection
pub struct MigrationService<'a> {
    conn: &'a Connection,
}

impl<'a> MigrationService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Apply every migration not yet recorded in `sys_migrations`
    pub fn run_pending(&self) -> Result<MigrationResult> {
        let mut applied = Vec::new();

        // The bookkeeping table has to exist before we can ask what ran
        let bootstrapped = !self.migrations_table_exists()?;
        if bootstrapped {
            if let Some((name, sql)) = MIGRATIONS.iter().find(|(n, _)| *n == BOOTSTRAP) {
                self.apply(name, sql)?;
                applied.push(name.to_string());
            }
        }

        let recorded = self.get_applied()?;
        let already_applied = recorded.len().saturating_sub(applied.len());

        for (name, sql) in MIGRATIONS.iter().filter(|(n, _)| *n != BOOTSTRAP) {
            if !recorded.iter().any(|r| r == name) {
                self.apply(name, sql)?;
                applied.push(name.to_string());
            }
        }

        Ok(MigrationResult {
            applied,
            already_applied,
        })
    }

    fn migrations_table_exists(&self) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = 'sys_migrations'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Names of migrations already applied, sorted
    pub fn get_applied(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT migration_name FROM sys_migrations ORDER BY migration_name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Names of migrations still waiting to run
    pub fn get_pending(&self) -> Result<Vec<String>> {
        let applied = self.get_applied()?;
        Ok(MIGRATIONS
            .iter()
            .filter(|(name, _)| !applied.iter().any(|a| a == name))
            .map(|(name, _)| name.to_string())
            .collect())
    }

    /// Applied and pending migrations; a database never migrated has
    /// everything pending
    pub fn state(&self) -> Result<SchemaState> {
        if !self.migrations_table_exists()? {
            return Ok(SchemaState {
                applied: Vec::new(),
                pending: MIGRATIONS.iter().map(|(name, _)| name.to_string()).collect(),
            });
        }
        Ok(SchemaState {
            applied: self.get_applied()?,
            pending: self.get_pending()?,
        })
    }

    fn apply(&self, name: &str, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        self.conn
            .execute("INSERT INTO sys_migrations (migration_name) VALUES (?)", [name])?;
        Ok(())
    }
}
