// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;

use crate::utils::{date_to_millis, id_for_account, now_millis, parse_date};

pub mod accounts;
pub mod backup;
pub mod bills;
pub mod categories;
pub mod debts;
pub mod exporter;
pub mod loans;
pub mod reports;
pub mod settings;
pub mod transactions;
pub mod transfers;

/// Value of an argument clap has already made mandatory.
pub(crate) fn required<'a>(m: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    m.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing argument '{}'", name))
}

/// `--account` resolved by name, if given.
pub(crate) fn optional_account(conn: &Connection, m: &clap::ArgMatches) -> Result<Option<i64>> {
    m.get_one::<String>("account")
        .map(|name| id_for_account(conn, name))
        .transpose()
}

/// `--date` as epoch ms, or now when absent.
pub(crate) fn date_or_now(m: &clap::ArgMatches, name: &str) -> Result<i64> {
    match m.get_one::<String>(name) {
        Some(s) => Ok(date_to_millis(parse_date(s)?)),
        None => Ok(now_millis()),
    }
}

/// Inclusive `[--from, --to]` as epoch ms; `--to` covers its whole day.
pub(crate) fn date_range(m: &clap::ArgMatches) -> Result<(i64, i64)> {
    let from = parse_date(required(m, "from")?)?;
    let to = parse_date(required(m, "to")?)?;
    Ok((date_to_millis(from), end_of_day(to)))
}

fn end_of_day(date: NaiveDate) -> i64 {
    date_to_millis(date) + 86_400_000 - 1
}

pub(crate) fn fmt_money(currency: &str, amount: i64) -> String {
    if amount < 0 {
        format!("-{}{}", currency, -amount)
    } else {
        format!("{}{}", currency, amount)
    }
}
