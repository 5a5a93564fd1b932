// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Postings, their reversal, transfers and the balance summary.
//!
//! Public mutating functions take `&mut Connection` and run as one SQLite
//! transaction. The `pub(crate)` helpers take `&Connection` so they can be
//! composed inside another operation's transaction.

use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

use crate::error::{LedgerError, Result};
use crate::ledger::accounts::{apply_delta, get_account};
use crate::ledger::categories::{AutoCategory, category_type, get_or_create_auto};
use crate::models::{
    BalanceSummary, CategoryType, DebtType, NewTransaction, Transaction, TransactionAllocation,
    TransactionDetail, TransactionItem, TransactionWithDisplay,
};
use crate::utils::{now_millis, round_money};

const DISPLAY_SELECT: &str = "SELECT t.id, t.amount, t.date, t.category_id, t.note, t.account_id,
        c.name, c.type, c.color, c.icon, a.name
    FROM transactions t
    LEFT JOIN categories c ON t.category_id=c.id
    LEFT JOIN accounts a ON t.account_id=a.id";

pub(crate) fn map_transaction(r: &Row) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: r.get(0)?,
        amount: r.get(1)?,
        date: r.get(2)?,
        category_id: r.get(3)?,
        note: r.get(4)?,
        account_id: r.get(5)?,
    })
}

fn map_display(r: &Row) -> rusqlite::Result<TransactionWithDisplay> {
    Ok(TransactionWithDisplay {
        transaction: map_transaction(r)?,
        category_name: r.get(6)?,
        category_type: r.get(7)?,
        category_color: r.get(8)?,
        category_icon: r.get(9)?,
        account_name: r.get(10)?,
    })
}

pub(crate) fn map_item(r: &Row) -> rusqlite::Result<TransactionItem> {
    Ok(TransactionItem {
        id: r.get(0)?,
        transaction_id: r.get(1)?,
        name: r.get(2)?,
        quantity: r.get(3)?,
        unit: r.get(4)?,
        price_per_unit: r.get(5)?,
    })
}

pub(crate) fn map_allocation(r: &Row) -> rusqlite::Result<TransactionAllocation> {
    Ok(TransactionAllocation {
        id: r.get(0)?,
        transaction_id: r.get(1)?,
        account_id: r.get(2)?,
        amount: r.get(3)?,
    })
}

fn non_negative(amount: i64) -> Result<i64> {
    if amount < 0 {
        return Err(LedgerError::NegativeAmount(amount));
    }
    Ok(amount)
}

pub(crate) fn insert_transaction(
    conn: &Connection,
    amount: i64,
    date: i64,
    category_id: Option<i64>,
    note: Option<&str>,
    account_id: Option<i64>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO transactions(amount, date, category_id, note, account_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![non_negative(amount)?, date, category_id, note, account_id],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert a single-account transaction and move its signed amount.
///
/// `typ` decides the sign, independently of whether a category id could be
/// resolved.
pub(crate) fn post(
    conn: &Connection,
    amount: i64,
    date: i64,
    category_id: Option<i64>,
    typ: CategoryType,
    note: &str,
    account_id: Option<i64>,
) -> Result<i64> {
    let id = insert_transaction(conn, amount, date, category_id, Some(note), account_id)?;
    if let Some(account_id) = account_id {
        apply_delta(conn, account_id, typ.signed(amount))?;
    }
    Ok(id)
}

/// Record a transaction with its items, allocations and optional pending
/// remainder as one unit of work. Returns the new transaction id.
///
/// All amounts are rounded to whole units before anything is written. When
/// allocations are given they carry the balance effect and `account_id` is
/// ignored for balances. Overdrafts are not checked.
pub fn add_transaction(conn: &mut Connection, new: &NewTransaction) -> Result<i64> {
    let tx = conn.transaction()?;
    let id = add_transaction_in(&tx, new)?;
    tx.commit()?;
    Ok(id)
}

pub(crate) fn add_transaction_in(conn: &Connection, new: &NewTransaction) -> Result<i64> {
    let total = non_negative(round_money(new.amount))?;
    let pending = new
        .pending
        .as_ref()
        .map(|p| (p, round_money(p.amount)))
        .filter(|(_, amt)| *amt > 0);
    let paid = match pending {
        Some((_, due)) => (total - due).max(0),
        None => total,
    };

    let note = (!new.note.is_empty()).then_some(new.note.as_str());
    let id = insert_transaction(conn, paid, new.date, Some(new.category_id), note, new.account_id)?;

    if let Some((p, due)) = pending {
        conn.execute(
            "INSERT INTO debts(amount, description, type, due_date, is_paid, contact_name, created_at, transaction_id)
             VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7)",
            params![
                due,
                note,
                DebtType::Borrowed,
                p.due_date,
                p.contact_name,
                now_millis(),
                id
            ],
        )?;
        tracing::info!(transaction_id = id, amount = due, contact = %p.contact_name, "pending remainder recorded as debt");
    }

    for item in &new.items {
        conn.execute(
            "INSERT INTO transaction_items(transaction_id, name, quantity, unit, price_per_unit)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, item.name, item.quantity, item.unit, item.price_per_unit],
        )?;
    }

    let Some(typ) = category_type(conn, new.category_id)? else {
        tracing::warn!(id, category_id = new.category_id, "unknown category, balances untouched");
        return Ok(id);
    };

    if !new.allocations.is_empty() {
        for alloc in &new.allocations {
            let amount = non_negative(round_money(alloc.amount))?;
            conn.execute(
                "INSERT INTO transaction_allocations(transaction_id, account_id, amount)
                 VALUES (?1, ?2, ?3)",
                params![id, alloc.account_id, amount],
            )?;
            apply_delta(conn, alloc.account_id, typ.signed(amount))?;
        }
    } else if let Some(account_id) = new.account_id {
        apply_delta(conn, account_id, typ.signed(paid))?;
    }

    tracing::info!(id, amount = paid, %typ, allocations = new.allocations.len(), "transaction added");
    Ok(id)
}

/// Reverse a transaction's balance effect, then delete it with its items
/// and allocations. Missing transaction or category is a no-op.
pub fn delete_transaction(conn: &mut Connection, id: i64) -> Result<()> {
    let tx = conn.transaction()?;
    delete_transaction_in(&tx, id)?;
    tx.commit()?;
    Ok(())
}

fn delete_transaction_in(conn: &Connection, id: i64) -> Result<()> {
    let Some(t) = get_transaction_row(conn, id)? else {
        tracing::warn!(id, "delete of missing transaction ignored");
        return Ok(());
    };
    let typ = match t.category_id {
        Some(cid) => category_type(conn, cid)?,
        None => None,
    };
    let Some(typ) = typ else {
        tracing::warn!(id, "transaction has no resolvable category, delete ignored");
        return Ok(());
    };

    let allocations = get_transaction_allocations(conn, id)?;
    if !allocations.is_empty() {
        for alloc in &allocations {
            apply_delta(conn, alloc.account_id, -typ.signed(alloc.amount))?;
        }
    } else if let Some(account_id) = t.account_id {
        apply_delta(conn, account_id, -typ.signed(t.amount))?;
    }

    conn.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    tracing::info!(id, amount = t.amount, %typ, "transaction deleted and reversed");
    Ok(())
}

/// Move money between two accounts, posting an expense leg on the source
/// and an income leg on the destination. Returns `(source_leg, dest_leg)`.
pub fn transfer_funds(
    conn: &mut Connection,
    from_id: i64,
    to_id: i64,
    amount: Decimal,
    date: i64,
) -> Result<(i64, i64)> {
    let tx = conn.transaction()?;
    let amount = non_negative(round_money(amount))?;

    let from_name = get_account(&tx, from_id)?.map(|a| a.name).unwrap_or_default();
    let to_name = get_account(&tx, to_id)?.map(|a| a.name).unwrap_or_default();

    let out_cat = get_or_create_auto(&tx, AutoCategory::Transfer, CategoryType::Expense)?;
    let in_cat = get_or_create_auto(&tx, AutoCategory::Transfer, CategoryType::Income)?;

    let out_id = post(
        &tx,
        amount,
        date,
        out_cat,
        CategoryType::Expense,
        &format!("Transfer to {}", to_name),
        Some(from_id),
    )?;
    let in_id = post(
        &tx,
        amount,
        date,
        in_cat,
        CategoryType::Income,
        &format!("Transfer from {}", from_name),
        Some(to_id),
    )?;
    tx.commit()?;
    tracing::info!(from_id, to_id, amount, "transfer completed");
    Ok((out_id, in_id))
}

fn get_transaction_row(conn: &Connection, id: i64) -> Result<Option<Transaction>> {
    let t = conn
        .query_row(
            "SELECT id, amount, date, category_id, note, account_id FROM transactions WHERE id=?1",
            params![id],
            map_transaction,
        )
        .optional()?;
    Ok(t)
}

pub fn get_transaction(conn: &Connection, id: i64) -> Result<Option<TransactionDetail>> {
    let t = conn
        .query_row(
            &format!("{} WHERE t.id=?1", DISPLAY_SELECT),
            params![id],
            map_display,
        )
        .optional()?;
    let Some(transaction) = t else {
        return Ok(None);
    };
    Ok(Some(TransactionDetail {
        items: get_transaction_items(conn, id)?,
        allocations: get_transaction_allocations(conn, id)?,
        transaction,
    }))
}

pub fn get_transaction_items(conn: &Connection, id: i64) -> Result<Vec<TransactionItem>> {
    let mut stmt = conn.prepare(
        "SELECT id, transaction_id, name, quantity, unit, price_per_unit
         FROM transaction_items WHERE transaction_id=?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![id], map_item)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn get_transaction_allocations(
    conn: &Connection,
    id: i64,
) -> Result<Vec<TransactionAllocation>> {
    let mut stmt = conn.prepare(
        "SELECT id, transaction_id, account_id, amount
         FROM transaction_allocations WHERE transaction_id=?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![id], map_allocation)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Newest first, one page at a time.
pub fn get_transactions(
    conn: &Connection,
    limit: i64,
    offset: i64,
) -> Result<Vec<TransactionWithDisplay>> {
    let mut stmt = conn.prepare(&format!(
        "{} ORDER BY t.date DESC, t.id DESC LIMIT ?1 OFFSET ?2",
        DISPLAY_SELECT
    ))?;
    let rows = stmt.query_map(params![limit, offset], map_display)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Transactions dated within `[start, end]` (epoch ms), newest first.
pub fn get_transactions_by_range(
    conn: &Connection,
    start: i64,
    end: i64,
) -> Result<Vec<TransactionWithDisplay>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE t.date BETWEEN ?1 AND ?2 ORDER BY t.date DESC, t.id DESC",
        DISPLAY_SELECT
    ))?;
    let rows = stmt.query_map(params![start, end], map_display)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Income and expense totals over all transactions, plus the sum of
/// account balances as the authoritative balance.
pub fn get_balance(conn: &Connection) -> Result<BalanceSummary> {
    let total_for = |typ: CategoryType| -> rusqlite::Result<i64> {
        conn.query_row(
            "SELECT IFNULL(SUM(t.amount), 0) FROM transactions t
             JOIN categories c ON t.category_id=c.id WHERE c.type=?1",
            params![typ],
            |r| r.get(0),
        )
    };
    let balance: i64 =
        conn.query_row("SELECT IFNULL(SUM(balance), 0) FROM accounts", [], |r| r.get(0))?;
    Ok(BalanceSummary {
        total_income: total_for(CategoryType::Income)?,
        total_expense: total_for(CategoryType::Expense)?,
        balance,
    })
}
