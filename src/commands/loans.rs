// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use serde_json::json;

use crate::commands::{fmt_money, optional_account, required};
use crate::ledger::loans::{
    add_loan, delete_loan, get_loan, get_loan_installments, get_loans, pay_installment, plan_loan,
};
use crate::ledger::settings::get_currency;
use crate::models::{Frequency, LoanInstallment};
use crate::utils::{
    date_to_millis, fmt_date, maybe_print_json, parse_date, parse_decimal, pretty_table,
};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("pay", sub)) => {
            let installment = *sub.get_one::<i64>("installment").context("missing installment")?;
            let account_id = optional_account(conn, sub)?;
            pay_installment(conn, installment, account_id)?;
            println!("Installment #{} paid", installment);
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").context("missing id")?;
            delete_loan(conn, id)?;
            println!("Removed loan #{} and its installments", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let title = required(sub, "title")?;
    let principal = parse_decimal(required(sub, "principal")?)?;
    let rate = parse_decimal(required(sub, "rate")?)?;
    let frequency: Frequency = required(sub, "frequency")?.parse()?;
    let count = *sub.get_one::<u32>("count").context("missing count")?;
    let start = date_to_millis(parse_date(required(sub, "start")?)?);
    let description = sub.get_one::<String>("description").map(String::as_str);
    let account_id = optional_account(conn, sub)?;

    let (loan, installments) =
        plan_loan(title, principal, rate, frequency, count, start, description)?;
    let id = add_loan(conn, &loan, &installments, account_id)?;

    let ccy = get_currency(conn)?;
    println!(
        "Added loan #{} '{}': {} repayable in {} {} installments of {}",
        id,
        title,
        fmt_money(&ccy, loan.total_repayable),
        count,
        frequency,
        fmt_money(&ccy, loan.installment_amount)
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let loans = get_loans(conn)?;
    if maybe_print_json(sub.get_flag("json"), &loans)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let data = loans
        .into_iter()
        .map(|l| {
            vec![
                l.id.to_string(),
                l.title,
                fmt_date(l.start_date),
                fmt_money(&ccy, l.principal_amount),
                format!("{}%", l.interest_rate),
                fmt_money(&ccy, l.remaining_amount),
                l.status.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Title", "Start", "Principal", "Rate", "Remaining", "Status"],
            data
        )
    );
    Ok(())
}

fn installment_rows(ccy: &str, installments: &[LoanInstallment]) -> Vec<Vec<String>> {
    installments
        .iter()
        .map(|i| {
            vec![
                i.id.to_string(),
                fmt_date(i.due_date),
                fmt_money(ccy, i.amount),
                i.status.to_string(),
                i.paid_date.map(fmt_date).unwrap_or_default(),
            ]
        })
        .collect()
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("missing id")?;
    let Some(loan) = get_loan(conn, id)? else {
        bail!("Loan #{} not found", id);
    };
    let installments = get_loan_installments(conn, id)?;
    if maybe_print_json(
        sub.get_flag("json"),
        &json!({ "loan": loan, "installments": installments }),
    )? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    println!(
        "#{} {} [{}] remaining {} of {}",
        loan.id,
        loan.title,
        loan.status,
        fmt_money(&ccy, loan.remaining_amount),
        fmt_money(&ccy, loan.total_repayable)
    );
    println!(
        "{}",
        pretty_table(
            &["Installment", "Due", "Amount", "Status", "Paid"],
            installment_rows(&ccy, &installments)
        )
    );
    Ok(())
}
