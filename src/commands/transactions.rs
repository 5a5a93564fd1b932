// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use rusqlite::Connection;

use crate::commands::{date_or_now, date_range, fmt_money, optional_account, required};
use crate::ledger::settings::get_currency;
use crate::ledger::transactions::{
    add_transaction, delete_transaction, get_transaction, get_transactions,
    get_transactions_by_range,
};
use crate::models::{
    NewAllocation, NewTransaction, NewTransactionItem, PendingDue, TransactionWithDisplay,
};
use crate::utils::{
    fmt_date, id_for_account, id_for_category, maybe_print_json, parse_decimal, pretty_table,
};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").context("missing id")?;
            delete_transaction(conn, id)?;
            println!("Removed transaction #{}", id);
        }
        _ => {}
    }
    Ok(())
}

/// `name:quantity:unit:price`, with an empty unit allowed.
pub fn parse_item(s: &str) -> Result<NewTransactionItem> {
    let parts: Vec<&str> = s.split(':').collect();
    let [name, qty, unit, price] = parts[..] else {
        bail!("Invalid item '{}', expected name:quantity:unit:price", s);
    };
    if name.trim().is_empty() {
        bail!("Invalid item '{}', name is empty", s);
    }
    let quantity: f64 = qty
        .trim()
        .parse()
        .with_context(|| format!("Invalid quantity '{}'", qty))?;
    let price_per_unit: f64 = price
        .trim()
        .parse()
        .with_context(|| format!("Invalid price '{}'", price))?;
    let unit = unit.trim();
    Ok(NewTransactionItem {
        name: name.trim().to_string(),
        quantity,
        unit: (!unit.is_empty()).then(|| unit.to_string()),
        price_per_unit,
    })
}

/// `Account=amount`, resolving the account by name.
pub fn parse_split(conn: &Connection, s: &str) -> Result<NewAllocation> {
    let (name, amount) = s
        .rsplit_once('=')
        .with_context(|| format!("Invalid split '{}', expected Account=amount", s))?;
    Ok(NewAllocation {
        account_id: id_for_account(conn, name.trim())?,
        amount: parse_decimal(amount.trim())?,
    })
}

pub fn build_new_transaction(conn: &Connection, sub: &clap::ArgMatches) -> Result<NewTransaction> {
    let amount = parse_decimal(required(sub, "amount")?)?;
    let category_id = id_for_category(conn, required(sub, "category")?)?;
    let date = date_or_now(sub, "date")?;
    let note = sub.get_one::<String>("note").map(String::as_str).unwrap_or("");

    let mut new = NewTransaction::new(amount, date, category_id, note);
    if let Some(account_id) = optional_account(conn, sub)? {
        new = new.account(account_id);
    }
    if let Some(items) = sub.get_many::<String>("item") {
        new = new.items(items.map(|s| parse_item(s)).collect::<Result<_>>()?);
    }
    if let Some(splits) = sub.get_many::<String>("split") {
        new = new.allocations(splits.map(|s| parse_split(conn, s)).collect::<Result<_>>()?);
    }
    if let Some(pending) = sub.get_one::<String>("pending") {
        new = new.pending(PendingDue {
            amount: parse_decimal(pending)?,
            contact_name: required(sub, "contact")?.to_string(),
            due_date: date_or_now(sub, "due")?,
        });
    }
    Ok(new)
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let new = build_new_transaction(conn, sub)?;
    let id = add_transaction(conn, &new)?;
    println!("Recorded transaction #{} ({} on {})", id, new.amount, fmt_date(new.date));
    if let Some(p) = &new.pending {
        println!("Pending {} owed to {} by {}", p.amount, p.contact_name, fmt_date(p.due_date));
    }
    Ok(())
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionWithDisplay>> {
    if sub.get_one::<String>("from").is_some() {
        let (start, end) = date_range(sub)?;
        return Ok(get_transactions_by_range(conn, start, end)?);
    }
    let limit = *sub.get_one::<i64>("limit").unwrap_or(&50);
    let offset = *sub.get_one::<i64>("offset").unwrap_or(&0);
    Ok(get_transactions(conn, limit, offset)?)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    if maybe_print_json(sub.get_flag("json"), &data)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let rows = data
        .into_iter()
        .map(|r| {
            vec![
                r.transaction.id.to_string(),
                fmt_date(r.transaction.date),
                fmt_money(&ccy, r.transaction.amount),
                r.category_type.map(|t| t.to_string()).unwrap_or_default(),
                r.category_name.unwrap_or_default(),
                r.account_name.unwrap_or_default(),
                r.transaction.note.unwrap_or_default(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Date", "Amount", "Type", "Category", "Account", "Note"],
            rows
        )
    );
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("missing id")?;
    let Some(detail) = get_transaction(conn, id)? else {
        bail!("Transaction #{} not found", id);
    };
    if maybe_print_json(sub.get_flag("json"), &detail)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let t = &detail.transaction.transaction;
    println!(
        "#{} {} {} [{}] {}",
        t.id,
        fmt_date(t.date),
        fmt_money(&ccy, t.amount),
        detail.transaction.category_name.as_deref().unwrap_or("-"),
        t.note.as_deref().unwrap_or("")
    );
    if !detail.items.is_empty() {
        let rows = detail
            .items
            .iter()
            .map(|i| {
                vec![
                    i.name.clone(),
                    i.quantity.to_string(),
                    i.unit.clone().unwrap_or_default(),
                    i.price_per_unit.to_string(),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Item", "Qty", "Unit", "Price"], rows));
    }
    if !detail.allocations.is_empty() {
        let rows = detail
            .allocations
            .iter()
            .map(|a| vec![a.account_id.to_string(), fmt_money(&ccy, a.amount)])
            .collect();
        println!("{}", pretty_table(&["Account", "Amount"], rows));
    }
    Ok(())
}
