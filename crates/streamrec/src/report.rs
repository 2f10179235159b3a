//! `srec report`: print or export statistical reports.

use anyhow::{bail, Context, Result};
use std::path::Path;

use streamrec_core::report;

use crate::catalog::clip;
use crate::config::Config;
use crate::persist::{write_table, Stores};

/// Default number of rows in a report.
pub const DEFAULT_REPORT_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    MostViewed,
    Categories,
    ActiveUsers,
    User(u32),
}

/// A rendered report: column names plus string rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub title: String,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

/// Build the rows for `kind`.
pub fn build_report(stores: &Stores, kind: ReportKind, limit: usize) -> Result<Table> {
    let table = match kind {
        ReportKind::MostViewed => Table {
            title: "Most viewed contents".to_string(),
            headers: vec!["id", "title", "views"],
            rows: report::most_viewed_contents(&stores.contents, limit)
                .iter()
                .map(|item| item.to_row())
                .collect(),
        },
        ReportKind::Categories => Table {
            title: "Most popular categories".to_string(),
            headers: vec!["category", "views"],
            rows: report::most_popular_categories(&stores.contents, limit)
                .iter()
                .map(|item| item.to_row())
                .collect(),
        },
        ReportKind::ActiveUsers => Table {
            title: "Most active users".to_string(),
            headers: vec!["id", "username", "interactions"],
            rows: report::most_active_users(&stores.users, limit)
                .iter()
                .map(|item| item.to_row())
                .collect(),
        },
        ReportKind::User(user_id) => {
            let Some(user) = stores.users.get_by_id(user_id) else {
                bail!("user not found: {}", user_id);
            };
            Table {
                title: format!("Interactions of {}", user.username),
                headers: vec!["id", "title", "interactions"],
                rows: report::user_interactions(&stores.users, &stores.contents, user_id, limit)
                    .iter()
                    .map(|item| item.to_row())
                    .collect(),
            }
        }
    };
    Ok(table)
}

pub async fn run_report(
    config: &Config,
    kind: ReportKind,
    limit: Option<usize>,
    export: Option<&Path>,
) -> Result<()> {
    let limit = limit.unwrap_or(DEFAULT_REPORT_LIMIT);
    let stores = Stores::load(config).await?;
    let table = build_report(&stores, kind, limit)?;

    if let Some(path) = export {
        let text = report::export_csv(&table.headers, &table.rows)
            .context("failed to encode report")?;
        write_table(path, &text).await?;
        println!("Exported {} rows to {}", table.rows.len(), path.display());
        return Ok(());
    }

    print_table(&table);
    Ok(())
}

fn print_table(table: &Table) {
    println!("{}", table.title);
    println!("{}", "=".repeat(table.title.chars().count()));
    if table.rows.is_empty() {
        println!("No data.");
        return;
    }

    let widths: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            table
                .rows
                .iter()
                .map(|row| row.get(col).map_or(0, |f| f.chars().count()))
                .max()
                .unwrap_or(0)
                .max(header.len())
                .min(40)
        })
        .collect();

    let header_line: Vec<String> = table
        .headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{:<w$}", h.to_uppercase(), w = *w))
        .collect();
    println!("  {}", header_line.join("  "));
    for row in &table.rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(field, w)| format!("{:<w$}", clip(field, *w), w = *w))
            .collect();
        println!("  {}", line.join("  "));
    }
}
