//! Rendering of command results

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use promptvars_core::{PersistedVariable, VariableDiff};
use serde::Serialize;

use crate::cli::OutputFormat;

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output as JSON")
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn options(value: &Option<Vec<String>>) -> String {
    value.as_ref().map(|o| o.join(", ")).unwrap_or_default()
}

/// Table of stored variables
pub fn variables_table(rows: &[PersistedVariable]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "#", "Name", "Type", "Required", "Default", "Options", "Id",
    ]);

    for row in rows {
        table.add_row(vec![
            Cell::new(row.order_index),
            Cell::new(&row.name),
            Cell::new(row.var_type),
            Cell::new(if row.required { "yes" } else { "no" }),
            Cell::new(opt(&row.default_value)),
            Cell::new(options(&row.options)),
            Cell::new(&row.id),
        ]);
    }
    table
}

/// Table of planned changes
pub fn plan_table(diff: &VariableDiff) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Action", "#", "Name", "Type", "Required", "Id"]);

    for (action, record) in diff.planned() {
        table.add_row(vec![
            Cell::new(action.as_str()),
            Cell::new(record.order_index),
            Cell::new(&record.name),
            Cell::new(record.var_type),
            Cell::new(if record.required { "yes" } else { "no" }),
            Cell::new(record.id.as_deref().unwrap_or("(new)")),
        ]);
    }
    for id in &diff.to_delete_ids {
        table.add_row(vec!["delete", "", "", "", "", id.as_str()]);
    }
    table
}

pub fn print_variables(rows: &[PersistedVariable], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", to_json(rows)?),
        OutputFormat::Table if rows.is_empty() => println!("No variables."),
        OutputFormat::Table => println!("{}", variables_table(rows)),
    }
    Ok(())
}

pub fn print_plan(diff: &VariableDiff, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", to_json(diff)?),
        OutputFormat::Table => {
            let s = &diff.summary;
            println!(
                "{} insert, {} update, {} unchanged, {} delete",
                s.inserted, s.updated, s.unchanged, s.deleted
            );
            if !diff.to_upsert.is_empty() || !diff.to_delete_ids.is_empty() {
                println!("{}", plan_table(diff));
            }
        }
    }
    Ok(())
}
