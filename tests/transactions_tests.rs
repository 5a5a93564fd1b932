// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use finledger::db::open_in_memory;
use finledger::error::LedgerError;
use finledger::ledger::accounts::{add_account, get_account, get_accounts};
use finledger::ledger::categories::get_categories;
use finledger::ledger::debts::get_debts;
use finledger::ledger::transactions::{
    add_transaction, delete_transaction, get_balance, get_transaction,
    get_transaction_allocations, get_transactions, transfer_funds,
};
use finledger::models::{
    CategoryType, DebtType, NewAllocation, NewTransaction, NewTransactionItem, PendingDue,
};
use finledger::utils::{id_for_account, id_for_category};
use rusqlite::Connection;
use rust_decimal::Decimal;

const MAR_5: i64 = 1_741_132_800_000; // 2025-03-05T00:00:00Z

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn balance_of(conn: &Connection, name: &str) -> i64 {
    let id = id_for_account(conn, name).unwrap();
    get_account(conn, id).unwrap().unwrap().balance
}

fn category(conn: &Connection, name: &str) -> i64 {
    id_for_category(conn, name).unwrap()
}

fn transaction_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap()
}

#[test]
fn postings_move_the_account_by_category_type() {
    let mut conn = open_in_memory().unwrap();
    let cash = id_for_account(&conn, "Cash").unwrap();
    let salary = category(&conn, "Salary");
    let groceries = category(&conn, "Groceries");

    add_transaction(
        &mut conn,
        &NewTransaction::new(dec("1000"), MAR_5, salary, "March pay").account(cash),
    )
    .unwrap();
    add_transaction(
        &mut conn,
        &NewTransaction::new(dec("250.4"), MAR_5, groceries, "").account(cash),
    )
    .unwrap();

    assert_eq!(balance_of(&conn, "Cash"), 750);
    let summary = get_balance(&conn).unwrap();
    assert_eq!(summary.total_income, 1000);
    assert_eq!(summary.total_expense, 250);
    assert_eq!(summary.balance, 750);
}

#[test]
fn balance_is_sum_of_accounts_including_opening_balances() {
    let conn = open_in_memory().unwrap();
    add_account(&conn, "Savings", "Bank", dec("5000"), None, None).unwrap();
    let summary = get_balance(&conn).unwrap();
    assert_eq!(summary.total_income, 0);
    assert_eq!(summary.balance, 5000);
}

#[test]
fn deleting_a_transaction_restores_the_balance() {
    let mut conn = open_in_memory().unwrap();
    let cash = id_for_account(&conn, "Cash").unwrap();
    let transport = category(&conn, "Transport");

    let id = add_transaction(
        &mut conn,
        &NewTransaction::new(dec("120"), MAR_5, transport, "bus pass").account(cash),
    )
    .unwrap();
    assert_eq!(balance_of(&conn, "Cash"), -120);

    delete_transaction(&mut conn, id).unwrap();
    assert_eq!(balance_of(&conn, "Cash"), 0);
    assert!(get_transaction(&conn, id).unwrap().is_none());

    // already gone
    delete_transaction(&mut conn, id).unwrap();
    assert_eq!(balance_of(&conn, "Cash"), 0);
}

#[test]
fn split_transaction_charges_each_allocation() {
    let mut conn = open_in_memory().unwrap();
    let cash = id_for_account(&conn, "Cash").unwrap();
    let bank = id_for_account(&conn, "Bank").unwrap();
    let housing = category(&conn, "Housing");

    let id = add_transaction(
        &mut conn,
        &NewTransaction::new(dec("300"), MAR_5, housing, "rent").allocations(vec![
            NewAllocation {
                account_id: cash,
                amount: dec("100"),
            },
            NewAllocation {
                account_id: bank,
                amount: dec("200"),
            },
        ]),
    )
    .unwrap();

    assert_eq!(balance_of(&conn, "Cash"), -100);
    assert_eq!(balance_of(&conn, "Bank"), -200);
    let detail = get_transaction(&conn, id).unwrap().unwrap();
    assert_eq!(detail.transaction.transaction.account_id, None);
    assert_eq!(detail.allocations.len(), 2);

    delete_transaction(&mut conn, id).unwrap();
    assert_eq!(balance_of(&conn, "Cash"), 0);
    assert_eq!(balance_of(&conn, "Bank"), 0);
    assert!(get_transaction_allocations(&conn, id).unwrap().is_empty());
}

#[test]
fn overdraft_is_allowed() {
    let mut conn = open_in_memory().unwrap();
    let mobile = id_for_account(&conn, "Mobile Money").unwrap();
    let fun = category(&conn, "Entertainment");
    add_transaction(
        &mut conn,
        &NewTransaction::new(dec("50"), MAR_5, fun, "cinema").account(mobile),
    )
    .unwrap();
    assert_eq!(balance_of(&conn, "Mobile Money"), -50);
}

#[test]
fn negative_amounts_are_rejected_without_side_effects() {
    let mut conn = open_in_memory().unwrap();
    let cash = id_for_account(&conn, "Cash").unwrap();
    let groceries = category(&conn, "Groceries");

    let err = add_transaction(
        &mut conn,
        &NewTransaction::new(dec("-5"), MAR_5, groceries, "").account(cash),
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::NegativeAmount(-5)));
    assert_eq!(transaction_count(&conn), 0);
    assert_eq!(balance_of(&conn, "Cash"), 0);
}

#[test]
fn failed_allocation_rolls_back_the_whole_posting() {
    let mut conn = open_in_memory().unwrap();
    let cash = id_for_account(&conn, "Cash").unwrap();
    let groceries = category(&conn, "Groceries");

    let result = add_transaction(
        &mut conn,
        &NewTransaction::new(dec("30"), MAR_5, groceries, "").allocations(vec![
            NewAllocation {
                account_id: cash,
                amount: dec("40"),
            },
            NewAllocation {
                account_id: cash,
                amount: dec("-10"),
            },
        ]),
    );
    assert!(result.is_err());
    assert_eq!(transaction_count(&conn), 0);
    assert_eq!(balance_of(&conn, "Cash"), 0);
}

#[test]
fn items_are_stored_with_the_transaction() {
    let mut conn = open_in_memory().unwrap();
    let groceries = category(&conn, "Groceries");
    let id = add_transaction(
        &mut conn,
        &NewTransaction::new(dec("260"), MAR_5, groceries, "market").items(vec![
            NewTransactionItem {
                name: "Rice".into(),
                quantity: 2.0,
                unit: Some("kg".into()),
                price_per_unit: 80.0,
            },
            NewTransactionItem {
                name: "Eggs".into(),
                quantity: 12.0,
                unit: None,
                price_per_unit: 8.33,
            },
        ]),
    )
    .unwrap();

    let detail = get_transaction(&conn, id).unwrap().unwrap();
    assert_eq!(detail.items.len(), 2);
    assert_eq!(detail.items[0].name, "Rice");
    assert_eq!(detail.items[1].unit, None);
    assert_eq!(detail.transaction.category_name.as_deref(), Some("Groceries"));
    assert_eq!(detail.transaction.category_type, Some(CategoryType::Expense));

    delete_transaction(&mut conn, id).unwrap();
    let items: i64 = conn
        .query_row("SELECT COUNT(*) FROM transaction_items", [], |r| r.get(0))
        .unwrap();
    assert_eq!(items, 0);
}

#[test]
fn partial_payment_posts_the_paid_part_and_records_a_debt() {
    let mut conn = open_in_memory().unwrap();
    let cash = id_for_account(&conn, "Cash").unwrap();
    let groceries = category(&conn, "Groceries");

    let id = add_transaction(
        &mut conn,
        &NewTransaction::new(dec("1000"), MAR_5, groceries, "monthly stock")
            .account(cash)
            .pending(PendingDue {
                amount: dec("400"),
                contact_name: "Corner Shop".into(),
                due_date: MAR_5 + 7 * 86_400_000,
            }),
    )
    .unwrap();

    let detail = get_transaction(&conn, id).unwrap().unwrap();
    assert_eq!(detail.transaction.transaction.amount, 600);
    assert_eq!(balance_of(&conn, "Cash"), -600);

    let debts = get_debts(&conn).unwrap();
    assert_eq!(debts.len(), 1);
    assert_eq!(debts[0].amount, 400);
    assert_eq!(debts[0].r#type, DebtType::Borrowed);
    assert_eq!(debts[0].contact_name.as_deref(), Some("Corner Shop"));
    assert_eq!(debts[0].transaction_id, Some(id));
    assert!(!debts[0].is_paid);
}

#[test]
fn transfer_moves_money_and_reuses_auto_categories() {
    let mut conn = open_in_memory().unwrap();
    let wallet = add_account(&conn, "Wallet", "Cash", dec("500"), None, None).unwrap();
    let savings = add_account(&conn, "Savings", "Bank", dec("0"), None, None).unwrap();
    let total_before: i64 = get_accounts(&conn).unwrap().iter().map(|a| a.balance).sum();

    transfer_funds(&mut conn, wallet, savings, dec("200"), MAR_5).unwrap();
    let (out_id, in_id) = transfer_funds(&mut conn, wallet, savings, dec("50"), MAR_5).unwrap();

    assert_eq!(balance_of(&conn, "Wallet"), 250);
    assert_eq!(balance_of(&conn, "Savings"), 250);
    let total_after: i64 = get_accounts(&conn).unwrap().iter().map(|a| a.balance).sum();
    assert_eq!(total_before, total_after);

    let out_leg = get_transaction(&conn, out_id).unwrap().unwrap();
    let in_leg = get_transaction(&conn, in_id).unwrap().unwrap();
    assert_eq!(out_leg.transaction.transaction.note.as_deref(), Some("Transfer to Savings"));
    assert_eq!(in_leg.transaction.transaction.note.as_deref(), Some("Transfer from Wallet"));
    assert_eq!(out_leg.transaction.category_type, Some(CategoryType::Expense));
    assert_eq!(in_leg.transaction.category_type, Some(CategoryType::Income));

    let transfer_categories = get_categories(&conn, None)
        .unwrap()
        .into_iter()
        .filter(|c| c.name == "Transfer")
        .count();
    assert_eq!(transfer_categories, 2);
}

#[test]
fn transactions_page_newest_first() {
    let mut conn = open_in_memory().unwrap();
    let groceries = category(&conn, "Groceries");
    for day in 0..3 {
        add_transaction(
            &mut conn,
            &NewTransaction::new(dec("10"), MAR_5 + day * 86_400_000, groceries, ""),
        )
        .unwrap();
    }
    let page = get_transactions(&conn, 2, 0).unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].transaction.date, MAR_5 + 2 * 86_400_000);
    let rest = get_transactions(&conn, 2, 2).unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].transaction.date, MAR_5);
}
