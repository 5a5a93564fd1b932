// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::commands::{fmt_money, optional_account, required};
use crate::ledger::debts::{add_debt, delete_debt, get_debts, mark_debt_as_paid};
use crate::ledger::settings::get_currency;
use crate::models::DebtType;
use crate::utils::{
    date_to_millis, fmt_date, maybe_print_json, parse_date, parse_decimal,
    pretty_table,
};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let amount = parse_decimal(required(sub, "amount")?)?;
            let typ: DebtType = required(sub, "type")?.parse()?;
            let contact = required(sub, "contact")?;
            let due = date_to_millis(parse_date(required(sub, "due")?)?);
            let description = required(sub, "description")?;
            let account_id = optional_account(conn, sub)?;
            let id = add_debt(conn, amount, description, typ, due, contact, account_id)?;
            println!("Recorded debt #{} ({} {}, due {})", id, typ, contact, fmt_date(due));
        }
        Some(("list", sub)) => {
            let debts = get_debts(conn)?;
            if !maybe_print_json(sub.get_flag("json"), &debts)? {
                let ccy = get_currency(conn)?;
                let data = debts
                    .into_iter()
                    .map(|d| {
                        vec![
                            d.id.to_string(),
                            d.r#type.to_string(),
                            d.contact_name.unwrap_or_default(),
                            fmt_money(&ccy, d.amount),
                            d.due_date.map(fmt_date).unwrap_or_default(),
                            if d.is_paid { "paid" } else { "open" }.to_string(),
                            d.description.unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["ID", "Type", "Contact", "Amount", "Due", "Status", "Description"],
                        data
                    )
                );
            }
        }
        Some(("pay", sub)) => {
            let id = *sub.get_one::<i64>("id").context("missing id")?;
            let account_id = optional_account(conn, sub)?;
            mark_debt_as_paid(conn, id, account_id)?;
            println!("Debt #{} marked as paid", id);
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").context("missing id")?;
            delete_debt(conn, id)?;
            println!("Removed debt #{}", id);
        }
        _ => {}
    }
    Ok(())
}
