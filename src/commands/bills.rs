// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::Connection;

use crate::commands::{date_or_now, fmt_money, optional_account, required};
use crate::ledger::recurring::{
    add_recurring_payment, delete_recurring_payment, first_due_millis, get_recurring_payments,
    pay_bill,
};
use crate::ledger::settings::get_currency;
use crate::models::{Frequency, NewRecurringPayment};
use crate::utils::{fmt_date, id_for_category, maybe_print_json, parse_decimal, pretty_table};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let due_day = *sub.get_one::<u32>("due-day").context("missing due day")?;
            let new = NewRecurringPayment {
                amount: parse_decimal(required(sub, "amount")?)?,
                description: required(sub, "description")?.to_string(),
                category_id: id_for_category(conn, required(sub, "category")?)?,
                frequency: required(sub, "frequency")?.parse::<Frequency>()?,
                due_day: i64::from(due_day),
                next_due_date: first_due_millis(due_day, Utc::now().date_naive()),
                reminder_days_before: *sub.get_one::<i64>("reminder").unwrap_or(&3),
            };
            let id = add_recurring_payment(conn, &new)?;
            println!(
                "Added bill #{} '{}', next due {}",
                id,
                new.description,
                fmt_date(new.next_due_date)
            );
        }
        Some(("list", sub)) => {
            let bills = get_recurring_payments(conn)?;
            if !maybe_print_json(sub.get_flag("json"), &bills)? {
                let ccy = get_currency(conn)?;
                let data = bills
                    .into_iter()
                    .map(|b| {
                        vec![
                            b.payment.id.to_string(),
                            b.payment.description.unwrap_or_default(),
                            b.category_name.unwrap_or_default(),
                            fmt_money(&ccy, b.payment.amount),
                            b.payment.frequency.to_string(),
                            fmt_date(b.payment.next_due_date),
                            b.payment.last_paid_date.map(fmt_date).unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["ID", "Bill", "Category", "Amount", "Every", "Next due", "Last paid"],
                        data
                    )
                );
            }
        }
        Some(("pay", sub)) => {
            let id = *sub.get_one::<i64>("id").context("missing id")?;
            let account_id = optional_account(conn, sub)?;
            let paid_at = date_or_now(sub, "date")?;
            match pay_bill(conn, id, account_id, paid_at)? {
                Some(tx_id) => println!("Bill #{} paid (transaction #{})", id, tx_id),
                None => println!("Bill #{} not paid: missing bill or category", id),
            }
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").context("missing id")?;
            delete_recurring_payment(conn, id)?;
            println!("Removed bill #{}", id);
        }
        _ => {}
    }
    Ok(())
}
