// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Money borrowed from or lent to a contact.
//!
//! Borrowing into an account is posted as income to that account and
//! lending out of it as an expense. Settlement posts the opposite.

use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

use crate::error::Result;
use crate::ledger::categories::{AutoCategory, get_or_create_auto};
use crate::ledger::transactions::post;
use crate::models::{CategoryType, Debt, DebtType};
use crate::utils::{now_millis, round_money};

const DEBT_COLUMNS: &str =
    "id, amount, description, type, due_date, is_paid, contact_name, created_at, transaction_id";

pub(crate) fn map_debt(r: &Row) -> rusqlite::Result<Debt> {
    Ok(Debt {
        id: r.get(0)?,
        amount: r.get(1)?,
        description: r.get(2)?,
        r#type: r.get(3)?,
        due_date: r.get(4)?,
        is_paid: r.get(5)?,
        contact_name: r.get(6)?,
        created_at: r.get(7)?,
        transaction_id: r.get(8)?,
    })
}

fn creation_type(typ: DebtType) -> CategoryType {
    match typ {
        DebtType::Borrowed => CategoryType::Income,
        DebtType::Lent => CategoryType::Expense,
    }
}

fn settlement_type(typ: DebtType) -> CategoryType {
    match typ {
        DebtType::Borrowed => CategoryType::Expense,
        DebtType::Lent => CategoryType::Income,
    }
}

pub fn get_debts(conn: &Connection) -> Result<Vec<Debt>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM debts ORDER BY due_date ASC, id ASC",
        DEBT_COLUMNS
    ))?;
    let rows = stmt.query_map([], map_debt)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn get_debt(conn: &Connection, id: i64) -> Result<Option<Debt>> {
    let debt = conn
        .query_row(
            &format!("SELECT {} FROM debts WHERE id=?1", DEBT_COLUMNS),
            params![id],
            map_debt,
        )
        .optional()?;
    Ok(debt)
}

/// Record a debt; with an account, also post the money movement.
pub fn add_debt(
    conn: &mut Connection,
    amount: Decimal,
    description: &str,
    typ: DebtType,
    due_date: i64,
    contact_name: &str,
    account_id: Option<i64>,
) -> Result<i64> {
    let tx = conn.transaction()?;
    let amount = round_money(amount);
    let now = now_millis();
    let description = (!description.is_empty()).then_some(description);

    tx.execute(
        "INSERT INTO debts(amount, description, type, due_date, is_paid, contact_name, created_at)
         VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6)",
        params![amount, description, typ, due_date, contact_name, now],
    )?;
    let id = tx.last_insert_rowid();

    if let Some(account_id) = account_id {
        let cat_type = creation_type(typ);
        let category_id = get_or_create_auto(&tx, AutoCategory::Debt, cat_type)?;
        let direction = match typ {
            DebtType::Borrowed => "Borrowed from",
            DebtType::Lent => "Lent to",
        };
        let note = match description {
            Some(d) => format!("Debt: {} {} - {}", direction, contact_name, d),
            None => format!("Debt: {} {}", direction, contact_name),
        };
        post(&tx, amount, now, category_id, cat_type, &note, Some(account_id))?;
    }
    tx.commit()?;
    tracing::info!(id, amount, %typ, ?account_id, "debt added");
    Ok(id)
}

/// Flag a debt as paid. With an account, post the settlement.
///
/// A missing debt is a no-op. Flagging is one-way; nothing reopens a debt.
pub fn mark_debt_as_paid(conn: &mut Connection, id: i64, account_id: Option<i64>) -> Result<()> {
    let tx = conn.transaction()?;
    let Some(debt) = get_debt(&tx, id)? else {
        tracing::warn!(id, "mark paid on missing debt ignored");
        return Ok(());
    };
    tx.execute("UPDATE debts SET is_paid=1 WHERE id=?1", params![id])?;

    if let Some(account_id) = account_id {
        let cat_type = settlement_type(debt.r#type);
        let category_id = get_or_create_auto(&tx, AutoCategory::Debt, cat_type)?;
        let direction = match debt.r#type {
            DebtType::Borrowed => "Paid back to",
            DebtType::Lent => "Received from",
        };
        let note = format!(
            "Debt Repayment: {} {}",
            direction,
            debt.contact_name.as_deref().unwrap_or_default()
        );
        post(
            &tx,
            debt.amount,
            now_millis(),
            category_id,
            cat_type,
            &note,
            Some(account_id),
        )?;
    }
    tx.commit()?;
    tracing::info!(id, ?account_id, "debt marked paid");
    Ok(())
}

/// Remove the debt record only. Postings it produced stay in the ledger.
pub fn delete_debt(conn: &Connection, id: i64) -> Result<()> {
    conn.execute("DELETE FROM debts WHERE id=?1", params![id])?;
    tracing::info!(id, "debt deleted");
    Ok(())
}
