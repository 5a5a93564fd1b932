// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use finledger::db::open_in_memory;
use finledger::ledger::accounts::get_account;
use finledger::ledger::recurring::{
    add_recurring_payment, delete_recurring_payment, get_recurring_payment,
    get_recurring_payments, pay_bill,
};
use finledger::ledger::transactions::get_transaction;
use finledger::models::{Frequency, NewRecurringPayment};
use finledger::utils::{date_to_millis, id_for_account, id_for_category};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn ms(y: i32, m: u32, d: u32) -> i64 {
    date_to_millis(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn cash_balance(conn: &Connection) -> i64 {
    let id = id_for_account(conn, "Cash").unwrap();
    get_account(conn, id).unwrap().unwrap().balance
}

fn bill(conn: &Connection, category: &str, frequency: Frequency, next: i64) -> i64 {
    add_recurring_payment(
        conn,
        &NewRecurringPayment {
            amount: Decimal::from(1200),
            description: "Rent".into(),
            category_id: id_for_category(conn, category).unwrap(),
            frequency,
            due_day: 31,
            next_due_date: next,
            reminder_days_before: 3,
        },
    )
    .unwrap()
}

#[test]
fn paying_a_bill_posts_and_advances_the_due_date() {
    let mut conn = open_in_memory().unwrap();
    let cash = id_for_account(&conn, "Cash").unwrap();
    let id = bill(&conn, "Housing", Frequency::Monthly, ms(2025, 1, 31));
    let paid_at = ms(2025, 1, 30);

    let tx_id = pay_bill(&mut conn, id, Some(cash), paid_at).unwrap().unwrap();
    assert_eq!(cash_balance(&conn), -1200);

    let bill = get_recurring_payment(&conn, id).unwrap().unwrap();
    assert_eq!(bill.payment.next_due_date, ms(2025, 2, 28));
    assert_eq!(bill.payment.last_paid_date, Some(paid_at));
    assert_eq!(bill.category_name.as_deref(), Some("Housing"));

    let posted = get_transaction(&conn, tx_id).unwrap().unwrap();
    assert_eq!(posted.transaction.transaction.note.as_deref(), Some("Bill: Rent"));
    assert_eq!(posted.transaction.transaction.date, paid_at);
}

#[test]
fn month_end_bill_returns_to_month_end_after_february() {
    let mut conn = open_in_memory().unwrap();
    let id = bill(&conn, "Housing", Frequency::Monthly, ms(2025, 1, 31));

    pay_bill(&mut conn, id, None, ms(2025, 1, 31)).unwrap();
    pay_bill(&mut conn, id, None, ms(2025, 2, 28)).unwrap();
    let bill = get_recurring_payment(&conn, id).unwrap().unwrap();
    assert_eq!(bill.payment.next_due_date, ms(2025, 3, 31));
}

#[test]
fn bills_always_debit_even_under_an_income_category() {
    let mut conn = open_in_memory().unwrap();
    let cash = id_for_account(&conn, "Cash").unwrap();
    let id = bill(&conn, "Salary", Frequency::Weekly, ms(2025, 3, 3));

    pay_bill(&mut conn, id, Some(cash), ms(2025, 3, 3)).unwrap();
    assert_eq!(cash_balance(&conn), -1200);
    let bill = get_recurring_payment(&conn, id).unwrap().unwrap();
    assert_eq!(bill.payment.next_due_date, ms(2025, 3, 10));
}

#[test]
fn bills_list_by_next_due_date_and_missing_ones_are_ignored() {
    let mut conn = open_in_memory().unwrap();
    let later = bill(&conn, "Housing", Frequency::Yearly, ms(2025, 6, 1));
    let sooner = bill(&conn, "Housing", Frequency::Daily, ms(2025, 2, 1));

    let ids: Vec<i64> = get_recurring_payments(&conn)
        .unwrap()
        .iter()
        .map(|b| b.payment.id)
        .collect();
    assert_eq!(ids, vec![sooner, later]);

    assert_eq!(pay_bill(&mut conn, 777, None, ms(2025, 2, 1)).unwrap(), None);

    delete_recurring_payment(&conn, later).unwrap();
    assert_eq!(get_recurring_payments(&conn).unwrap().len(), 1);
}
