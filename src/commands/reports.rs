// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::commands::{date_range, fmt_money};
use crate::ledger::reports::{
    TrendPoint, get_daily_trend, get_item_consumption_report, get_monthly_trend,
};
use crate::ledger::settings::get_currency;
use crate::ledger::transactions::get_balance;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("balance", sub)) => balance(conn, sub)?,
        Some(("items", sub)) => items(conn, sub)?,
        Some(("daily", sub)) => {
            let (start, end) = date_range(sub)?;
            trend(conn, sub, "Day", get_daily_trend(conn, start, end)?)?
        }
        Some(("monthly", sub)) => {
            let (start, end) = date_range(sub)?;
            trend(conn, sub, "Month", get_monthly_trend(conn, start, end)?)?
        }
        _ => {}
    }
    Ok(())
}

fn balance(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let summary = get_balance(conn)?;
    if maybe_print_json(sub.get_flag("json"), &summary)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let data = vec![vec![
        fmt_money(&ccy, summary.total_income),
        fmt_money(&ccy, summary.total_expense),
        fmt_money(&ccy, summary.balance),
    ]];
    println!("{}", pretty_table(&["Income", "Expense", "Balance"], data));
    Ok(())
}

fn items(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (start, end) = date_range(sub)?;
    let report = get_item_consumption_report(conn, start, end)?;
    if maybe_print_json(sub.get_flag("json"), &report)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let data = report
        .into_iter()
        .map(|i| {
            vec![
                i.name,
                format!("{} {}", i.total_quantity, i.unit.unwrap_or_default())
                    .trim_end()
                    .to_string(),
                format!("{}{:.2}", ccy, i.total_spent),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Item", "Quantity", "Spent"], data));
    Ok(())
}

fn trend(
    conn: &Connection,
    sub: &clap::ArgMatches,
    label: &str,
    points: Vec<TrendPoint>,
) -> Result<()> {
    if maybe_print_json(sub.get_flag("json"), &points)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let data = points
        .into_iter()
        .map(|p| vec![p.period, fmt_money(&ccy, p.expense)])
        .collect();
    println!("{}", pretty_table(&[label, "Expense"], data));
    Ok(())
}
