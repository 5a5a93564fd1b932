// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rusqlite::Connection;

use crate::commands::{fmt_money, required};
use crate::ledger::accounts::{add_account, delete_account, get_account, get_accounts, update_account};
use crate::ledger::settings::get_currency;
use crate::utils::{id_for_account, maybe_print_json, parse_decimal, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = required(sub, "name")?;
            let typ = required(sub, "type")?;
            let balance = parse_decimal(required(sub, "balance")?)?;
            let color = sub.get_one::<String>("color").map(String::as_str);
            let icon = sub.get_one::<String>("icon").map(String::as_str);
            add_account(conn, name, typ, balance, color, icon)?;
            println!("Added account '{}' ({})", name, typ);
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => {
            let name = required(sub, "name")?;
            let id = id_for_account(conn, name)?;
            delete_account(conn, id)?;
            println!("Removed account '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let accounts = get_accounts(conn)?;
    if maybe_print_json(sub.get_flag("json"), &accounts)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let data = accounts
        .into_iter()
        .map(|a| vec![a.name, a.r#type, fmt_money(&ccy, a.balance)])
        .collect();
    println!("{}", pretty_table(&["Name", "Type", "Balance"], data));
    Ok(())
}

/// Unspecified fields keep their current value.
fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = required(sub, "name")?;
    let id = id_for_account(conn, name)?;
    let current = get_account(conn, id)?.with_context(|| format!("Account '{}' not found", name))?;

    let new_name = sub.get_one::<String>("rename").unwrap_or(&current.name);
    let typ = sub.get_one::<String>("type").unwrap_or(&current.r#type);
    let balance = match sub.get_one::<String>("balance") {
        Some(b) => parse_decimal(b)?,
        None => Decimal::from(current.balance),
    };
    let color = sub
        .get_one::<String>("color")
        .map(String::as_str)
        .or(current.color.as_deref());
    let icon = sub
        .get_one::<String>("icon")
        .map(String::as_str)
        .or(current.icon.as_deref());

    update_account(conn, id, new_name, typ, balance, color, icon)?;
    println!("Updated account '{}'", new_name);
    Ok(())
}
