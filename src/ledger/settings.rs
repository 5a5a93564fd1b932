// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! App-wide scalar preferences kept in the `settings` key/value table.

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::Result;
use crate::models::Setting;

pub const CURRENCY_KEY: &str = "currency";
pub const DEFAULT_CURRENCY: &str = "৳";

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    tracing::debug!(key, "setting stored");
    Ok(())
}

pub fn get_settings(conn: &Connection) -> Result<Vec<Setting>> {
    let mut stmt = conn.prepare("SELECT key, value FROM settings ORDER BY key")?;
    let rows = stmt.query_map([], |r| {
        Ok(Setting {
            key: r.get(0)?,
            value: r.get(1)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Currency symbol used for display; falls back to the default when unset.
pub fn get_currency(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, CURRENCY_KEY)?.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()))
}

pub fn set_currency(conn: &Connection, symbol: &str) -> Result<()> {
    set_setting(conn, CURRENCY_KEY, symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn set_overwrites_existing_key() {
        let conn = open_in_memory().unwrap();
        assert_eq!(get_setting(&conn, "theme").unwrap(), None);
        set_setting(&conn, "theme", "dark").unwrap();
        set_setting(&conn, "theme", "light").unwrap();
        assert_eq!(get_setting(&conn, "theme").unwrap().as_deref(), Some("light"));
        assert_eq!(get_settings(&conn).unwrap().len(), 1);
    }

    #[test]
    fn currency_defaults_until_set() {
        let conn = open_in_memory().unwrap();
        assert_eq!(get_currency(&conn).unwrap(), DEFAULT_CURRENCY);
        set_currency(&conn, "$").unwrap();
        assert_eq!(get_currency(&conn).unwrap(), "$");
    }
}
