// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use csv::{QuoteStyle, WriterBuilder};
use rusqlite::Connection;

use crate::error::{LedgerError, Result};
use crate::utils::fmt_date;

pub const CSV_HEADER: &str = "Date,Amount,Type,Category,Account,Note";

/// Always-quoted field with embedded quotes doubled.
fn quoted(field: Option<String>) -> String {
    format!("\"{}\"", field.unwrap_or_default().replace('"', "\"\""))
}

/// Every transaction as CSV text, newest first. Date, amount and type are
/// bare; category, account and note are always quoted with embedded quotes
/// doubled.
pub fn export_csv(conn: &Connection) -> Result<String> {
    let mut stmt = conn.prepare(
        "SELECT t.date, t.amount, c.type, c.name, a.name, t.note
         FROM transactions t
         LEFT JOIN categories c ON t.category_id=c.id
         LEFT JOIN accounts a ON t.account_id=a.id
         ORDER BY t.date DESC, t.id DESC",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, i64>(1)?,
            r.get::<_, Option<String>>(2)?,
            r.get::<_, Option<String>>(3)?,
            r.get::<_, Option<String>>(4)?,
            r.get::<_, Option<String>>(5)?,
        ))
    })?;

    let mut out = format!("{}\n", CSV_HEADER).into_bytes();
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .from_writer(&mut out);
    let mut count = 0usize;
    for row in rows {
        let (date, amount, typ, category, account, note) = row?;
        wtr.write_record([
            fmt_date(date),
            amount.to_string(),
            typ.unwrap_or_default(),
            quoted(category),
            quoted(account),
            quoted(note),
        ])?;
        count += 1;
    }
    wtr.flush()?;
    drop(wtr);
    tracing::info!(rows = count, "transactions exported to csv");
    String::from_utf8(out).map_err(|e| LedgerError::Io(std::io::Error::other(e)))
}
