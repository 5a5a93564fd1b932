// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use finledger::db::open_in_memory;
use finledger::ledger::accounts::get_account;
use finledger::ledger::categories::get_categories;
use finledger::ledger::debts::{add_debt, delete_debt, get_debt, get_debts, mark_debt_as_paid};
use finledger::ledger::transactions::get_transactions;
use finledger::models::{CategoryType, DebtType};
use finledger::utils::id_for_account;
use rusqlite::Connection;
use rust_decimal::Decimal;

const DUE: i64 = 1_743_465_600_000; // 2025-04-01T00:00:00Z

fn cash(conn: &Connection) -> (i64, i64) {
    let id = id_for_account(conn, "Cash").unwrap();
    (id, get_account(conn, id).unwrap().unwrap().balance)
}

#[test]
fn borrowing_into_an_account_and_paying_back() {
    let mut conn = open_in_memory().unwrap();
    let (cash_id, _) = cash(&conn);

    let id = add_debt(
        &mut conn,
        Decimal::from(500),
        "rent gap",
        DebtType::Borrowed,
        DUE,
        "Alice",
        Some(cash_id),
    )
    .unwrap();
    assert_eq!(cash(&conn).1, 500);

    let txs = get_transactions(&conn, 10, 0).unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(
        txs[0].transaction.note.as_deref(),
        Some("Debt: Borrowed from Alice - rent gap")
    );
    assert_eq!(txs[0].category_name.as_deref(), Some("Debt"));
    assert_eq!(txs[0].category_type, Some(CategoryType::Income));

    mark_debt_as_paid(&mut conn, id, Some(cash_id)).unwrap();
    assert_eq!(cash(&conn).1, 0);
    assert!(get_debt(&conn, id).unwrap().unwrap().is_paid);

    let txs = get_transactions(&conn, 10, 0).unwrap();
    assert_eq!(txs.len(), 2);
    assert!(txs.iter().any(|t| {
        t.transaction.note.as_deref() == Some("Debt Repayment: Paid back to Alice")
            && t.category_type == Some(CategoryType::Expense)
    }));

    let debt_categories: Vec<_> = get_categories(&conn, None)
        .unwrap()
        .into_iter()
        .filter(|c| c.name == "Debt")
        .collect();
    assert_eq!(debt_categories.len(), 2);
}

#[test]
fn lending_out_and_receiving_back() {
    let mut conn = open_in_memory().unwrap();
    let (cash_id, _) = cash(&conn);

    let id = add_debt(
        &mut conn,
        Decimal::from(300),
        "",
        DebtType::Lent,
        DUE,
        "Bob",
        Some(cash_id),
    )
    .unwrap();
    assert_eq!(cash(&conn).1, -300);
    let txs = get_transactions(&conn, 10, 0).unwrap();
    assert_eq!(txs[0].transaction.note.as_deref(), Some("Debt: Lent to Bob"));

    mark_debt_as_paid(&mut conn, id, Some(cash_id)).unwrap();
    assert_eq!(cash(&conn).1, 0);
}

#[test]
fn debts_without_an_account_post_nothing() {
    let mut conn = open_in_memory().unwrap();
    let id = add_debt(
        &mut conn,
        Decimal::from(80),
        "lunch",
        DebtType::Lent,
        DUE,
        "Carol",
        None,
    )
    .unwrap();
    mark_debt_as_paid(&mut conn, id, None).unwrap();

    assert!(get_transactions(&conn, 10, 0).unwrap().is_empty());
    let debt = get_debt(&conn, id).unwrap().unwrap();
    assert!(debt.is_paid);
    assert_eq!(debt.description.as_deref(), Some("lunch"));
    assert_eq!(cash(&conn).1, 0);
}

#[test]
fn missing_debt_is_ignored_and_delete_keeps_postings() {
    let mut conn = open_in_memory().unwrap();
    let (cash_id, _) = cash(&conn);
    mark_debt_as_paid(&mut conn, 42, Some(cash_id)).unwrap();
    assert_eq!(cash(&conn).1, 0);

    let id = add_debt(
        &mut conn,
        Decimal::from(10),
        "",
        DebtType::Borrowed,
        DUE,
        "Dan",
        Some(cash_id),
    )
    .unwrap();
    delete_debt(&conn, id).unwrap();
    assert!(get_debts(&conn).unwrap().is_empty());
    assert_eq!(get_transactions(&conn, 10, 0).unwrap().len(), 1);
    assert_eq!(cash(&conn).1, 10);
}
