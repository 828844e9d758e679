//! Status command - show account count, total funds and schema state

use anyhow::Result;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use serde::Serialize;

use cardbank_core::services::{SchemaState, StatusSummary};

use super::get_context;
use crate::output;

/// JSON output: the ledger summary plus database details
#[derive(Serialize)]
struct StatusOutput {
    #[serde(flatten)]
    summary: StatusSummary,
    database: String,
    schema: SchemaState,
}

pub fn run(file_name: Option<&str>, json: bool) -> Result<()> {
    let ctx = get_context(file_name)?;
    let status = ctx.status();
    let schema = ctx.schema_state()?;
    let database = ctx.db_path().display().to_string();

    if json {
        let output = StatusOutput {
            summary: status,
            database,
            schema,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Card Ledger Status".bold());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec!["Accounts".to_string(), status.total_accounts.to_string()]);
    table.add_row(vec!["Total funds".to_string(), status.total_funds.to_string()]);
    table.add_row(vec!["Database".to_string(), database]);
    table.add_row(vec![
        "Migrations".to_string(),
        format!("{} applied, {} pending", schema.applied.len(), schema.pending.len()),
    ]);
    println!("{}", table);

    if !status.accounts.is_empty() {
        println!();
        let mut cards = output::create_table();
        cards.set_header(vec!["Card", "Balance"]);
        for account in &status.accounts {
            cards.add_row(vec![account.card.clone(), account.balance.to_string()]);
        }
        println!("{}", cards);
    }

    Ok(())
}
