//! `dashboard-server check`: connection diagnostic
//!
//! Prints what the dashboard would see: the tables in the database, the
//! configured log table's columns, a few sample rows and its row count.

use anyhow::{Context, Result};
use serde_json::Value;

use log_dashboard::{ConnectionManager, DatabaseProvider, Record, TableLayout};

const SAMPLE_ROWS: u64 = 3;

const LOG_LIKE: [&str; 3] = ["log", "event", "audit"];

pub async fn run_check(manager: &ConnectionManager, layout: &TableLayout) -> Result<()> {
    let settings = manager.settings();
    let builder = manager.dialect().query_builder();
    let table = layout.table();

    println!(
        "Connected to {} at {}:{} (database {})",
        settings.dialect,
        settings.host,
        settings.port(),
        settings.database
    );

    let tables = manager
        .fetch(&builder.build_list_tables())
        .await
        .context("Failed to list tables")?;
    let names: Vec<String> = tables.iter().map(|record| text(record, "table_name")).collect();

    println!("\nTables ({}):", names.len());
    for name in &names {
        println!("  - {}", name);
    }

    let log_tables: Vec<&String> = names.iter().filter(|name| is_log_like(name)).collect();
    if !log_tables.is_empty() {
        println!("\nPossible log tables:");
        for name in log_tables {
            println!("  * {}", name);
        }
    }

    let columns = manager
        .fetch(&builder.build_columns(table))
        .await
        .with_context(|| format!("Failed to describe table {}", table))?;
    if columns.is_empty() {
        println!("\nTable {} was not found; set LOG_TABLE to one of the tables above", table);
        return Ok(());
    }

    println!("\nColumns of {}:", table);
    for column in &columns {
        println!(
            "  {} {} {}",
            text(column, "column_name"),
            text(column, "data_type"),
            if text(column, "is_nullable").eq_ignore_ascii_case("yes") {
                "NULL"
            } else {
                "NOT NULL"
            }
        );
    }

    let sample = manager
        .fetch(&builder.build_sample(table, SAMPLE_ROWS))
        .await
        .with_context(|| format!("Failed to read sample rows from {}", table))?;
    println!("\nSample rows:");
    for record in &sample {
        println!("  {}", serde_json::to_string(record)?);
    }

    let count = manager
        .fetch(&layout.count().render(builder))
        .await
        .with_context(|| format!("Failed to count rows in {}", table))?;
    let total = count.first().map(|record| text(record, "count")).unwrap_or_default();
    println!("\nTotal rows: {}", total);

    Ok(())
}

fn is_log_like(table: &str) -> bool {
    let table = table.to_lowercase();
    LOG_LIKE.iter().any(|fragment| table.contains(fragment))
}

fn text(record: &Record, column: &str) -> String {
    match record.get(column) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
