// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-only aggregations. Date buckets are computed in UTC.

use rusqlite::{Connection, params};
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemConsumption {
    pub name: String,
    pub unit: Option<String>,
    pub total_quantity: f64,
    pub total_spent: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    /// `DD` for daily trends, `YYYY-MM` for monthly ones.
    pub period: String,
    pub expense: i64,
}

/// What was bought, how much of it, and for how much, within `[start, end]`.
pub fn get_item_consumption_report(
    conn: &Connection,
    start: i64,
    end: i64,
) -> Result<Vec<ItemConsumption>> {
    let mut stmt = conn.prepare(
        "SELECT ti.name, ti.unit, SUM(ti.quantity), SUM(ti.quantity * ti.price_per_unit) AS spent
         FROM transaction_items ti
         JOIN transactions t ON ti.transaction_id=t.id
         WHERE t.date BETWEEN ?1 AND ?2
         GROUP BY ti.name, ti.unit
         ORDER BY spent DESC, ti.name",
    )?;
    let rows = stmt.query_map(params![start, end], |r| {
        Ok(ItemConsumption {
            name: r.get(0)?,
            unit: r.get(1)?,
            total_quantity: r.get(2)?,
            total_spent: r.get(3)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn expense_trend(conn: &Connection, bucket: &str, start: i64, end: i64) -> Result<Vec<TrendPoint>> {
    let sql = format!(
        "SELECT strftime('{}', t.date / 1000, 'unixepoch') AS period, SUM(t.amount)
         FROM transactions t
         JOIN categories c ON t.category_id=c.id
         WHERE c.type='expense' AND t.date BETWEEN ?1 AND ?2
         GROUP BY period
         ORDER BY period ASC",
        bucket
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![start, end], |r| {
        Ok(TrendPoint {
            period: r.get(0)?,
            expense: r.get(1)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Expense per day of month within `[start, end]`.
pub fn get_daily_trend(conn: &Connection, start: i64, end: i64) -> Result<Vec<TrendPoint>> {
    expense_trend(conn, "%d", start, end)
}

/// Expense per calendar month within `[start, end]`.
pub fn get_monthly_trend(conn: &Connection, start: i64, end: i64) -> Result<Vec<TrendPoint>> {
    expense_trend(conn, "%Y-%m", start, end)
}
