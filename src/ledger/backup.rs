// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Full-data backup and all-or-nothing restore.

use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::ledger::accounts::map_account;
use crate::ledger::categories::map_category;
use crate::ledger::crypto;
use crate::ledger::debts::map_debt;
use crate::ledger::loans::{map_installment, map_loan};
use crate::ledger::recurring::map_recurring;
use crate::ledger::settings::get_settings;
use crate::ledger::transactions::{map_allocation, map_item, map_transaction};
use crate::models::{
    Account, Category, Debt, Loan, LoanInstallment, RecurringPayment, Setting, Transaction,
    TransactionAllocation, TransactionItem,
};
use crate::utils::now_millis;

pub const BACKUP_VERSION: u32 = 1;
pub const DEFAULT_BACKUP_NAME: &str = "finance_backup";

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)[^a-z0-9]").unwrap());

/// Every table of the store at one point in time.
///
/// `categories` and `transactions` are required on import; the remaining
/// collections default to empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub version: u32,
    pub timestamp: i64,
    pub categories: Option<Vec<Category>>,
    pub transactions: Option<Vec<Transaction>>,
    #[serde(default)]
    pub items: Vec<TransactionItem>,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub debts: Vec<Debt>,
    #[serde(default)]
    pub recurring_payments: Vec<RecurringPayment>,
    #[serde(default)]
    pub settings: Vec<Setting>,
    #[serde(default)]
    pub transaction_allocations: Vec<TransactionAllocation>,
    #[serde(default)]
    pub loans: Vec<Loan>,
    #[serde(default)]
    pub loan_installments: Vec<LoanInstallment>,
}

fn select_all<T>(
    conn: &Connection,
    sql: &str,
    map: fn(&rusqlite::Row) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], map)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Read every table in id order.
pub fn snapshot(conn: &Connection) -> Result<BackupDocument> {
    Ok(BackupDocument {
        version: BACKUP_VERSION,
        timestamp: now_millis(),
        categories: Some(select_all(
            conn,
            "SELECT id, name, type, color, icon FROM categories ORDER BY id",
            map_category,
        )?),
        transactions: Some(select_all(
            conn,
            "SELECT id, amount, date, category_id, note, account_id FROM transactions ORDER BY id",
            map_transaction,
        )?),
        items: select_all(
            conn,
            "SELECT id, transaction_id, name, quantity, unit, price_per_unit
             FROM transaction_items ORDER BY id",
            map_item,
        )?,
        accounts: select_all(
            conn,
            "SELECT id, name, type, balance, color, icon FROM accounts ORDER BY id",
            map_account,
        )?,
        debts: select_all(
            conn,
            "SELECT id, amount, description, type, due_date, is_paid, contact_name, created_at,
                transaction_id
             FROM debts ORDER BY id",
            map_debt,
        )?,
        recurring_payments: select_all(
            conn,
            "SELECT id, amount, description, category_id, frequency, due_day, next_due_date,
                reminder_days_before, is_active, last_paid_date
             FROM recurring_payments ORDER BY id",
            map_recurring,
        )?,
        settings: get_settings(conn)?,
        transaction_allocations: select_all(
            conn,
            "SELECT id, transaction_id, account_id, amount FROM transaction_allocations ORDER BY id",
            map_allocation,
        )?,
        loans: select_all(
            conn,
            "SELECT id, title, principal_amount, interest_rate, total_repayable, start_date,
                installment_frequency, installment_amount, status, description, remaining_amount
             FROM loans ORDER BY id",
            map_loan,
        )?,
        loan_installments: select_all(
            conn,
            "SELECT id, loan_id, due_date, amount, status, paid_date
             FROM loan_installments ORDER BY id",
            map_installment,
        )?,
    })
}

/// Serialize and encrypt the whole store with `passphrase`.
pub fn export_backup(conn: &Connection, passphrase: &str) -> Result<String> {
    let doc = snapshot(conn)?;
    let json = serde_json::to_string_pretty(&doc)?;
    let artifact = crypto::encrypt(&json, passphrase)?;
    tracing::info!(
        transactions = doc.transactions.as_ref().map_or(0, Vec::len),
        accounts = doc.accounts.len(),
        "backup exported"
    );
    Ok(artifact)
}

/// Decrypt and validate a backup artifact without touching the store.
pub fn decrypt_backup(artifact: &str, passphrase: &str) -> Result<BackupDocument> {
    let json = crypto::decrypt(artifact, passphrase)?;
    let doc: BackupDocument = serde_json::from_str(&json)
        .map_err(|e| LedgerError::InvalidBackup(format!("unreadable document: {}", e)))?;
    if doc.version != BACKUP_VERSION {
        return Err(LedgerError::InvalidBackup(format!(
            "unsupported backup version {}",
            doc.version
        )));
    }
    if doc.categories.is_none() || doc.transactions.is_none() {
        return Err(LedgerError::InvalidBackup(
            "document is missing categories or transactions".into(),
        ));
    }
    Ok(doc)
}

/// Replace the store's contents with a backup. Nothing is deleted unless
/// the artifact decrypts and validates.
pub fn import_backup(conn: &mut Connection, artifact: &str, passphrase: &str) -> Result<()> {
    let doc = decrypt_backup(artifact, passphrase)?;
    restore(conn, &doc)
}

/// Children before parents.
const CLEAR_ORDER: &[&str] = &[
    "transaction_items",
    "transaction_allocations",
    "debts",
    "loan_installments",
    "loans",
    "recurring_payments",
    "transactions",
    "categories",
    "accounts",
    "settings",
];

fn clear_all(conn: &Connection) -> Result<()> {
    for table in CLEAR_ORDER {
        conn.execute(&format!("DELETE FROM {}", table), [])?;
    }
    Ok(())
}

/// Delete every row of every table as one unit of work.
pub fn reset_database(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    clear_all(&tx)?;
    tx.commit()?;
    tracing::info!("database reset");
    Ok(())
}

/// Wipe the store and load `doc` with its ids, as one unit of work.
pub fn restore(conn: &mut Connection, doc: &BackupDocument) -> Result<()> {
    let (Some(categories), Some(transactions)) = (&doc.categories, &doc.transactions) else {
        return Err(LedgerError::InvalidBackup(
            "document is missing categories or transactions".into(),
        ));
    };

    let tx = conn.transaction()?;
    clear_all(&tx)?;

    for a in &doc.accounts {
        tx.execute(
            "INSERT INTO accounts(id, name, type, balance, color, icon) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![a.id, a.name, a.r#type, a.balance, a.color, a.icon],
        )?;
    }
    for c in categories {
        tx.execute(
            "INSERT INTO categories(id, name, type, color, icon) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![c.id, c.name, c.r#type, c.color, c.icon],
        )?;
    }
    for t in transactions {
        tx.execute(
            "INSERT INTO transactions(id, amount, date, category_id, note, account_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![t.id, t.amount, t.date, t.category_id, t.note, t.account_id],
        )?;
    }
    for i in &doc.items {
        tx.execute(
            "INSERT INTO transaction_items(id, transaction_id, name, quantity, unit, price_per_unit)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![i.id, i.transaction_id, i.name, i.quantity, i.unit, i.price_per_unit],
        )?;
    }
    for a in &doc.transaction_allocations {
        tx.execute(
            "INSERT INTO transaction_allocations(id, transaction_id, account_id, amount)
             VALUES (?1, ?2, ?3, ?4)",
            params![a.id, a.transaction_id, a.account_id, a.amount],
        )?;
    }
    for d in &doc.debts {
        tx.execute(
            "INSERT INTO debts(id, amount, description, type, due_date, is_paid, contact_name,
                created_at, transaction_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                d.id,
                d.amount,
                d.description,
                d.r#type,
                d.due_date,
                d.is_paid,
                d.contact_name,
                d.created_at,
                d.transaction_id
            ],
        )?;
    }
    for r in &doc.recurring_payments {
        tx.execute(
            "INSERT INTO recurring_payments(id, amount, description, category_id, frequency, due_day,
                next_due_date, reminder_days_before, is_active, last_paid_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                r.id,
                r.amount,
                r.description,
                r.category_id,
                r.frequency,
                r.due_day,
                r.next_due_date,
                r.reminder_days_before,
                r.is_active,
                r.last_paid_date
            ],
        )?;
    }
    for l in &doc.loans {
        tx.execute(
            "INSERT INTO loans(id, title, principal_amount, interest_rate, total_repayable, start_date,
                installment_frequency, installment_amount, status, description, remaining_amount)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                l.id,
                l.title,
                l.principal_amount,
                l.interest_rate.to_string(),
                l.total_repayable,
                l.start_date,
                l.installment_frequency,
                l.installment_amount,
                l.status,
                l.description,
                l.remaining_amount
            ],
        )?;
    }
    for i in &doc.loan_installments {
        tx.execute(
            "INSERT INTO loan_installments(id, loan_id, due_date, amount, status, paid_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![i.id, i.loan_id, i.due_date, i.amount, i.status, i.paid_date],
        )?;
    }
    for s in &doc.settings {
        tx.execute(
            "INSERT INTO settings(key, value) VALUES (?1, ?2)",
            params![s.key, s.value],
        )?;
    }
    tx.commit()?;
    tracing::info!(
        version = doc.version,
        transactions = transactions.len(),
        accounts = doc.accounts.len(),
        "backup restored"
    );
    Ok(())
}

/// File name for a backup artifact: lowercase, unsafe characters replaced
/// by `_`, always ending in `.enc`.
pub fn backup_file_name(name: Option<&str>) -> String {
    let stem = name
        .map(|n| n.trim())
        .map(|n| n.strip_suffix(".enc").unwrap_or(n))
        .filter(|n| !n.is_empty());
    match stem {
        Some(n) => format!("{}.enc", UNSAFE_CHARS.replace_all(n, "_").to_lowercase()),
        None => format!("{}.enc", DEFAULT_BACKUP_NAME),
    }
}
