// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use finledger::db::open_in_memory;
use finledger::error::LedgerError;
use finledger::ledger::accounts::{add_account, get_accounts};
use finledger::ledger::backup::{
    BackupDocument, export_backup, import_backup, reset_database, snapshot,
};
use finledger::ledger::crypto;
use finledger::ledger::debts::add_debt;
use finledger::ledger::loans::{add_loan, plan_loan};
use finledger::ledger::recurring::add_recurring_payment;
use finledger::ledger::settings::{get_currency, set_currency};
use finledger::ledger::transactions::add_transaction;
use finledger::models::{
    DebtType, Frequency, NewAllocation, NewRecurringPayment, NewTransaction, NewTransactionItem,
    PendingDue,
};
use finledger::utils::{id_for_account, id_for_category};
use rusqlite::Connection;
use rust_decimal::Decimal;

const MAR_5: i64 = 1_741_132_800_000;

fn populated() -> Connection {
    let mut conn = open_in_memory().unwrap();
    let cash = id_for_account(&conn, "Cash").unwrap();
    let bank = id_for_account(&conn, "Bank").unwrap();
    let groceries = id_for_category(&conn, "Groceries").unwrap();
    let housing = id_for_category(&conn, "Housing").unwrap();

    add_account(&conn, "Savings", "Bank", Decimal::from(2500), Some("#00f"), None).unwrap();
    add_transaction(
        &mut conn,
        &NewTransaction::new(Decimal::from(900), MAR_5, groceries, "weekly \"big\" shop")
            .account(cash)
            .items(vec![NewTransactionItem {
                name: "Rice".into(),
                quantity: 2.5,
                unit: Some("kg".into()),
                price_per_unit: 80.0,
            }])
            .pending(PendingDue {
                amount: Decimal::from(300),
                contact_name: "Corner Shop".into(),
                due_date: MAR_5,
            }),
    )
    .unwrap();
    add_transaction(
        &mut conn,
        &NewTransaction::new(Decimal::from(300), MAR_5, housing, "").allocations(vec![
            NewAllocation {
                account_id: cash,
                amount: Decimal::from(100),
            },
            NewAllocation {
                account_id: bank,
                amount: Decimal::from(200),
            },
        ]),
    )
    .unwrap();
    add_debt(
        &mut conn,
        Decimal::from(50),
        "",
        DebtType::Lent,
        MAR_5,
        "Bob",
        Some(bank),
    )
    .unwrap();
    let (loan, schedule) = plan_loan(
        "Laptop",
        Decimal::from(1200),
        "7.5".parse().unwrap(),
        Frequency::Monthly,
        4,
        MAR_5,
        None,
    )
    .unwrap();
    add_loan(&mut conn, &loan, &schedule, Some(bank)).unwrap();
    add_recurring_payment(
        &conn,
        &NewRecurringPayment {
            amount: Decimal::from(40),
            description: "Internet".into(),
            category_id: housing,
            frequency: Frequency::Monthly,
            due_day: 5,
            next_due_date: MAR_5,
            reminder_days_before: 2,
        },
    )
    .unwrap();
    set_currency(&conn, "$").unwrap();
    conn
}

fn comparable(mut doc: BackupDocument) -> BackupDocument {
    doc.timestamp = 0;
    doc
}

#[test]
fn export_then_import_restores_every_table() {
    let source = populated();
    let artifact = export_backup(&source, "correct horse").unwrap();

    let mut target = open_in_memory().unwrap();
    import_backup(&mut target, &artifact, "correct horse").unwrap();

    assert_eq!(
        comparable(snapshot(&target).unwrap()),
        comparable(snapshot(&source).unwrap())
    );
    assert_eq!(get_currency(&target).unwrap(), "$");
}

#[test]
fn wrong_password_leaves_the_store_untouched() {
    let source = populated();
    let artifact = export_backup(&source, "right").unwrap();

    let mut target = open_in_memory().unwrap();
    add_account(&target, "Keep me", "Cash", Decimal::from(7), None, None).unwrap();
    let before = comparable(snapshot(&target).unwrap());

    let err = import_backup(&mut target, &artifact, "wrong").unwrap_err();
    assert!(matches!(err, LedgerError::InvalidBackup(_)));
    assert_eq!(comparable(snapshot(&target).unwrap()), before);
}

#[test]
fn documents_without_required_collections_are_rejected() {
    let artifact =
        crypto::encrypt(r#"{"version":1,"timestamp":0,"transactions":[]}"#, "pw").unwrap();
    let mut target = open_in_memory().unwrap();
    let accounts_before = get_accounts(&target).unwrap().len();

    let err = import_backup(&mut target, &artifact, "pw").unwrap_err();
    assert!(matches!(err, LedgerError::InvalidBackup(_)));
    assert_eq!(get_accounts(&target).unwrap().len(), accounts_before);
}

#[test]
fn newer_backup_versions_are_rejected_before_restoring() {
    let artifact = crypto::encrypt(
        r#"{"version":2,"timestamp":0,"categories":[],"transactions":[]}"#,
        "pw",
    )
    .unwrap();
    let mut target = populated();
    let before = comparable(snapshot(&target).unwrap());

    let err = import_backup(&mut target, &artifact, "pw").unwrap_err();
    assert!(matches!(err, LedgerError::InvalidBackup(ref m) if m.contains("version 2")));
    assert_eq!(comparable(snapshot(&target).unwrap()), before);
}

#[test]
fn minimal_documents_restore_with_empty_optional_collections() {
    let artifact = crypto::encrypt(
        r#"{"version":1,"timestamp":0,"categories":[{"id":7,"name":"Food","type":"expense","color":null,"icon":null}],"transactions":[]}"#,
        "pw",
    )
    .unwrap();
    let mut target = populated();
    import_backup(&mut target, &artifact, "pw").unwrap();

    let doc = snapshot(&target).unwrap();
    assert_eq!(doc.categories.as_ref().map(Vec::len), Some(1));
    assert_eq!(doc.categories.unwrap()[0].id, 7);
    assert!(doc.accounts.is_empty());
    assert!(doc.loans.is_empty());
    assert!(doc.settings.is_empty());
}

#[test]
fn reset_empties_every_table() {
    let mut conn = populated();
    reset_database(&mut conn).unwrap();
    let doc = snapshot(&conn).unwrap();
    assert_eq!(doc.categories.as_ref().map(Vec::len), Some(0));
    assert_eq!(doc.transactions.as_ref().map(Vec::len), Some(0));
    assert!(doc.accounts.is_empty());
    assert!(doc.items.is_empty());
    assert!(doc.transaction_allocations.is_empty());
    assert!(doc.debts.is_empty());
    assert!(doc.recurring_payments.is_empty());
    assert!(doc.loans.is_empty());
    assert!(doc.loan_installments.is_empty());
    assert!(doc.settings.is_empty());
}
