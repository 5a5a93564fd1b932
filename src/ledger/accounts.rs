// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

use crate::error::Result;
use crate::models::Account;
use crate::utils::round_money;

const ACCOUNT_COLUMNS: &str = "id, name, type, balance, color, icon";

pub(crate) fn map_account(r: &Row) -> rusqlite::Result<Account> {
    Ok(Account {
        id: r.get(0)?,
        name: r.get(1)?,
        r#type: r.get(2)?,
        balance: r.get(3)?,
        color: r.get(4)?,
        icon: r.get(5)?,
    })
}

pub fn get_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM accounts ORDER BY name, id",
        ACCOUNT_COLUMNS
    ))?;
    let rows = stmt.query_map([], map_account)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn get_account(conn: &Connection, id: i64) -> Result<Option<Account>> {
    let acct = conn
        .query_row(
            &format!("SELECT {} FROM accounts WHERE id=?1", ACCOUNT_COLUMNS),
            params![id],
            map_account,
        )
        .optional()?;
    Ok(acct)
}

/// Create an account with a user-entered opening balance.
pub fn add_account(
    conn: &Connection,
    name: &str,
    typ: &str,
    balance: Decimal,
    color: Option<&str>,
    icon: Option<&str>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO accounts(name, type, balance, color, icon) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![name, typ, round_money(balance), color, icon],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(id, name, "account added");
    Ok(id)
}

/// Overwrite every account field, balance included.
pub fn update_account(
    conn: &Connection,
    id: i64,
    name: &str,
    typ: &str,
    balance: Decimal,
    color: Option<&str>,
    icon: Option<&str>,
) -> Result<()> {
    conn.execute(
        "UPDATE accounts SET name=?1, type=?2, balance=?3, color=?4, icon=?5 WHERE id=?6",
        params![name, typ, round_money(balance), color, icon, id],
    )?;
    tracing::info!(id, "account updated");
    Ok(())
}

pub fn delete_account(conn: &Connection, id: i64) -> Result<()> {
    conn.execute("DELETE FROM accounts WHERE id=?1", params![id])?;
    tracing::info!(id, "account deleted");
    Ok(())
}

/// Add `delta` to an account's running balance.
///
/// Every balance movement caused by a posting goes through here.
pub(crate) fn apply_delta(conn: &Connection, account_id: i64, delta: i64) -> Result<()> {
    let changed = conn.execute(
        "UPDATE accounts SET balance = balance + ?1 WHERE id=?2",
        params![delta, account_id],
    )?;
    if changed == 0 {
        tracing::warn!(account_id, delta, "balance update hit no account");
    } else {
        tracing::debug!(account_id, delta, "balance adjusted");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn accounts_list_by_name_and_update_sets_balance() {
        let conn = open_in_memory().unwrap();
        let id = add_account(&conn, "Aardvark Savings", "Bank", "99.5".parse().unwrap(), None, None)
            .unwrap();
        let all = get_accounts(&conn).unwrap();
        assert_eq!(all[0].name, "Aardvark Savings");
        assert_eq!(all[0].balance, 100);

        update_account(&conn, id, "Savings", "Bank", Decimal::from(5), Some("#fff"), None).unwrap();
        let acct = get_account(&conn, id).unwrap().unwrap();
        assert_eq!(acct.name, "Savings");
        assert_eq!(acct.balance, 5);
        assert_eq!(acct.color.as_deref(), Some("#fff"));

        delete_account(&conn, id).unwrap();
        assert!(get_account(&conn, id).unwrap().is_none());
    }

    #[test]
    fn apply_delta_is_relative() {
        let conn = open_in_memory().unwrap();
        let id = add_account(&conn, "W", "Cash", Decimal::from(10), None, None).unwrap();
        apply_delta(&conn, id, -25).unwrap();
        apply_delta(&conn, id, 5).unwrap();
        assert_eq!(get_account(&conn, id).unwrap().unwrap().balance, -10);
    }
}
