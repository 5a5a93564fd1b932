// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Recurring bills: payment templates with a rolling next due date.
//!
//! Due dates only move when a bill is paid; nothing advances on a timer.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

use crate::error::Result;
use crate::ledger::accounts::apply_delta;
use crate::ledger::transactions::insert_transaction;
use crate::models::{
    Frequency, NewRecurringPayment, RecurringPayment, RecurringPaymentWithCategory,
};
use crate::utils::{add_period, date_to_millis, round_money};

const SELECT_WITH_CATEGORY: &str = "SELECT r.id, r.amount, r.description, r.category_id, r.frequency,
        r.due_day, r.next_due_date, r.reminder_days_before, r.is_active, r.last_paid_date,
        c.name, c.color, c.icon
    FROM recurring_payments r
    LEFT JOIN categories c ON r.category_id=c.id";

pub(crate) fn map_recurring(r: &Row) -> rusqlite::Result<RecurringPayment> {
    Ok(RecurringPayment {
        id: r.get(0)?,
        amount: r.get(1)?,
        description: r.get(2)?,
        category_id: r.get(3)?,
        frequency: r.get(4)?,
        due_day: r.get(5)?,
        next_due_date: r.get(6)?,
        reminder_days_before: r.get(7)?,
        is_active: r.get(8)?,
        last_paid_date: r.get(9)?,
    })
}

fn map_with_category(r: &Row) -> rusqlite::Result<RecurringPaymentWithCategory> {
    Ok(RecurringPaymentWithCategory {
        payment: map_recurring(r)?,
        category_name: r.get(10)?,
        category_color: r.get(11)?,
        category_icon: r.get(12)?,
    })
}

/// First due date for a bill due on `day` of the month: this month if that
/// day has not passed yet, otherwise next month. Days past the end of a
/// month clamp to its last day.
pub fn first_due_date(day: u32, today: NaiveDate) -> NaiveDate {
    let this_month = day_in_month(today, day);
    if this_month >= today {
        return this_month;
    }
    let next = today
        .with_day(1)
        .and_then(|d| d.checked_add_months(Months::new(1)))
        .unwrap_or(today);
    day_in_month(next, day)
}

fn day_in_month(any_day: NaiveDate, day: u32) -> NaiveDate {
    let day = day.max(1);
    (1..=day)
        .rev()
        .find_map(|d| any_day.with_day(d))
        .unwrap_or(any_day)
}

/// The due date one period after `current`. Monthly and yearly bills land
/// back on their `due_day` where the month allows it, so a Feb 28 clamp
/// does not carry into March.
pub fn next_due_after(current: i64, frequency: Frequency, due_day: Option<i64>) -> i64 {
    let stepped = add_period(current, frequency);
    let day = due_day.and_then(|d| u32::try_from(d).ok());
    let (Frequency::Monthly | Frequency::Yearly, Some(day)) = (frequency, day) else {
        return stepped;
    };
    let Some(dt) = DateTime::<Utc>::from_timestamp_millis(stepped) else {
        return stepped;
    };
    day_in_month(dt.date_naive(), day)
        .and_time(dt.time())
        .and_utc()
        .timestamp_millis()
}

pub fn add_recurring_payment(conn: &Connection, new: &NewRecurringPayment) -> Result<i64> {
    conn.execute(
        "INSERT INTO recurring_payments(amount, description, category_id, frequency, due_day,
            next_due_date, reminder_days_before)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            round_money(new.amount),
            new.description,
            new.category_id,
            new.frequency,
            new.due_day,
            new.next_due_date,
            new.reminder_days_before
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(id, frequency = %new.frequency, "recurring payment added");
    Ok(id)
}

/// Advance a bill's schedule and post its payment as one unit of work.
///
/// Bills are always debits: the account, if any, is charged regardless of
/// the category's type.
#[allow(clippy::too_many_arguments)]
pub fn update_recurring_payment_next_date(
    conn: &mut Connection,
    id: i64,
    next_due_date: i64,
    last_paid_date: i64,
    amount: Decimal,
    category_id: i64,
    note: &str,
    account_id: Option<i64>,
) -> Result<i64> {
    let tx = conn.transaction()?;
    let amount = round_money(amount);
    tx.execute(
        "UPDATE recurring_payments SET next_due_date=?1, last_paid_date=?2 WHERE id=?3",
        params![next_due_date, last_paid_date, id],
    )?;
    let transaction_id = insert_transaction(
        &tx,
        amount,
        last_paid_date,
        Some(category_id),
        Some(note),
        account_id,
    )?;
    if let Some(account_id) = account_id {
        apply_delta(&tx, account_id, -amount)?;
    }
    tx.commit()?;
    tracing::info!(id, transaction_id, amount, ?account_id, "recurring payment paid");
    Ok(transaction_id)
}

/// Pay a bill for its stored amount and category, moving the next due date
/// one period forward from where it currently stands (see [next_due_after]).
///
/// Returns the posted transaction id, or `None` if the bill does not exist.
pub fn pay_bill(
    conn: &mut Connection,
    id: i64,
    account_id: Option<i64>,
    paid_at: i64,
) -> Result<Option<i64>> {
    let Some(bill) = get_recurring_payment(conn, id)? else {
        tracing::warn!(id, "payment of missing bill ignored");
        return Ok(None);
    };
    let Some(category_id) = bill.payment.category_id else {
        tracing::warn!(id, "bill has no category, payment ignored");
        return Ok(None);
    };
    let next = next_due_after(
        bill.payment.next_due_date,
        bill.payment.frequency,
        bill.payment.due_day,
    );
    let note = format!(
        "Bill: {}",
        bill.payment.description.as_deref().unwrap_or_default()
    );
    let transaction_id = update_recurring_payment_next_date(
        conn,
        id,
        next,
        paid_at,
        Decimal::from(bill.payment.amount),
        category_id,
        &note,
        account_id,
    )?;
    Ok(Some(transaction_id))
}

pub fn delete_recurring_payment(conn: &Connection, id: i64) -> Result<()> {
    conn.execute("DELETE FROM recurring_payments WHERE id=?1", params![id])?;
    tracing::info!(id, "recurring payment deleted");
    Ok(())
}

pub fn get_recurring_payments(conn: &Connection) -> Result<Vec<RecurringPaymentWithCategory>> {
    let mut stmt = conn.prepare(&format!(
        "{} ORDER BY r.next_due_date ASC, r.id ASC",
        SELECT_WITH_CATEGORY
    ))?;
    let rows = stmt.query_map([], map_with_category)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn get_recurring_payment(
    conn: &Connection,
    id: i64,
) -> Result<Option<RecurringPaymentWithCategory>> {
    let bill = conn
        .query_row(
            &format!("{} WHERE r.id=?1", SELECT_WITH_CATEGORY),
            params![id],
            map_with_category,
        )
        .optional()?;
    Ok(bill)
}

/// Epoch-ms form of [first_due_date].
pub fn first_due_millis(day: u32, today: NaiveDate) -> i64 {
    date_to_millis(first_due_date(day, today))
}
