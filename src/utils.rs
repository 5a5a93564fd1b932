// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, params};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::Frequency;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Round a money amount to whole currency units, half away from zero.
///
/// Values outside the `i64` range saturate.
pub fn round_money(d: Decimal) -> i64 {
    let rounded = d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    rounded.to_i64().unwrap_or(if rounded.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Midnight UTC of `date` as epoch milliseconds.
pub fn date_to_millis(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_default()
}

pub fn millis_to_date(ms: i64) -> NaiveDate {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.date_naive())
        .unwrap_or_default()
}

pub fn fmt_date(ms: i64) -> String {
    millis_to_date(ms).format("%Y-%m-%d").to_string()
}

/// Step an epoch-millisecond instant forward by one `frequency` period.
///
/// Month arithmetic clamps to the last day of the target month
/// (Jan 31 + 1 month = Feb 28/29).
pub fn add_period(ms: i64, frequency: Frequency) -> i64 {
    add_periods(ms, frequency, 1)
}

/// Step forward `n` whole periods in one go, so month-end clamping is
/// applied once against the starting day rather than compounding
/// (Jan 31 + 3 months = Apr 30, not Apr 28).
pub fn add_periods(ms: i64, frequency: Frequency, n: u32) -> i64 {
    let Some(dt) = DateTime::<Utc>::from_timestamp_millis(ms) else {
        return ms;
    };
    let next = match frequency {
        Frequency::Daily => dt.checked_add_days(Days::new(u64::from(n))),
        Frequency::Weekly => dt.checked_add_days(Days::new(7 * u64::from(n))),
        Frequency::Monthly => dt.checked_add_months(Months::new(n)),
        Frequency::Yearly => n
            .checked_mul(12)
            .and_then(|months| dt.checked_add_months(Months::new(months))),
    };
    next.map(|d| d.timestamp_millis()).unwrap_or(ms)
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn id_for_account(conn: &Connection, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT id FROM accounts WHERE name=?1")?;
    let id: i64 = stmt
        .query_row(params![name], |r| r.get(0))
        .with_context(|| format!("Account '{}' not found", name))?;
    Ok(id)
}

pub fn id_for_category(conn: &Connection, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT id FROM categories WHERE name=?1 ORDER BY id LIMIT 1")?;
    let id: i64 = stmt
        .query_row(params![name], |r| r.get(0))
        .with_context(|| format!("Category '{}' not found", name))?;
    Ok(id)
}

pub fn maybe_print_json<T: serde::Serialize>(json_flag: bool, v: &T) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    Ok(false)
}
