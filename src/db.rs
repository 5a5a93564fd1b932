// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, params};

use crate::error::{LedgerError, Result};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Finledger", "finledger"));

/// Environment variable that overrides the default store location.
pub const DB_ENV: &str = "FINLEDGER_DB";

/// Resolve where the store lives: `FINLEDGER_DB`, else the platform data dir.
pub fn db_path() -> anyhow::Result<PathBuf> {
    if let Ok(p) = std::env::var(DB_ENV) {
        if !p.trim().is_empty() {
            return Ok(PathBuf::from(p.trim()));
        }
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("finledger.sqlite"))
}

pub fn open_or_init(path: &Path) -> anyhow::Result<Connection> {
    let mut conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)
        .with_context(|| format!("Initialize schema at {}", path.display()))?;
    Ok(conn)
}

/// Fresh, fully initialized in-memory store.
pub fn open_in_memory() -> Result<Connection> {
    let mut conn = Connection::open_in_memory()?;
    init_schema(&mut conn)?;
    Ok(conn)
}

/// Create missing tables, apply additive migrations, seed defaults.
///
/// Safe to run on every startup. Seeding only touches empty tables.
pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(SCHEMA).map_err(|e| {
        tracing::error!(error = %e, "schema creation failed");
        LedgerError::Schema(e.to_string())
    })?;

    for (table, column, decl) in MIGRATIONS {
        add_column(conn, table, column, decl)?;
    }

    let tx = conn.transaction()?;
    seed_defaults(&tx)?;
    tx.commit()?;
    tracing::debug!("schema ready");
    Ok(())
}

const SCHEMA: &str = r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('income','expense')),
        color TEXT,
        icon TEXT
    );

    CREATE TABLE IF NOT EXISTS accounts(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        type TEXT NOT NULL,
        balance INTEGER NOT NULL DEFAULT 0,
        color TEXT,
        icon TEXT
    );

    -- date columns hold epoch milliseconds
    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        amount INTEGER NOT NULL,
        date INTEGER NOT NULL,
        category_id INTEGER,
        note TEXT,
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);

    CREATE TABLE IF NOT EXISTS transaction_items(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        transaction_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        quantity REAL NOT NULL DEFAULT 0,
        unit TEXT,
        price_per_unit REAL NOT NULL DEFAULT 0,
        FOREIGN KEY(transaction_id) REFERENCES transactions(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS transaction_allocations(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        transaction_id INTEGER NOT NULL,
        account_id INTEGER NOT NULL,
        amount INTEGER NOT NULL,
        FOREIGN KEY(transaction_id) REFERENCES transactions(id) ON DELETE CASCADE,
        FOREIGN KEY(account_id) REFERENCES accounts(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS debts(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        amount INTEGER NOT NULL,
        description TEXT,
        type TEXT NOT NULL CHECK(type IN ('borrowed','lent')),
        due_date INTEGER,
        is_paid INTEGER NOT NULL DEFAULT 0,
        contact_name TEXT,
        created_at INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS recurring_payments(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        amount INTEGER NOT NULL,
        description TEXT,
        category_id INTEGER,
        frequency TEXT NOT NULL,
        due_day INTEGER,
        next_due_date INTEGER NOT NULL,
        reminder_days_before INTEGER NOT NULL DEFAULT 1,
        is_active INTEGER NOT NULL DEFAULT 1,
        last_paid_date INTEGER,
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL
    );

    CREATE TABLE IF NOT EXISTS loans(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        principal_amount INTEGER NOT NULL,
        interest_rate TEXT NOT NULL DEFAULT '0',
        total_repayable INTEGER NOT NULL,
        start_date INTEGER NOT NULL,
        installment_frequency TEXT NOT NULL,
        installment_amount INTEGER NOT NULL,
        status TEXT NOT NULL DEFAULT 'active' CHECK(status IN ('active','completed')),
        description TEXT,
        remaining_amount INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS loan_installments(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        loan_id INTEGER NOT NULL,
        due_date INTEGER NOT NULL,
        amount INTEGER NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending' CHECK(status IN ('pending','paid')),
        paid_date INTEGER,
        FOREIGN KEY(loan_id) REFERENCES loans(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_installments_loan ON loan_installments(loan_id);
"#;

/// Columns added after the first release, applied in order.
const MIGRATIONS: &[(&str, &str, &str)] = &[
    (
        "transactions",
        "account_id",
        "INTEGER REFERENCES accounts(id) ON DELETE SET NULL",
    ),
    (
        "debts",
        "transaction_id",
        "INTEGER REFERENCES transactions(id) ON DELETE SET NULL",
    ),
];

/// `ALTER TABLE .. ADD COLUMN`, treating an existing column as already applied.
fn add_column(conn: &Connection, table: &str, column: &str, decl: &str) -> Result<()> {
    let sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, decl);
    match conn.execute(&sql, []) {
        Ok(_) => {
            tracing::info!(table, column, "migration applied");
            Ok(())
        }
        Err(e) if is_duplicate_column(&e) => Ok(()),
        Err(e) => {
            tracing::error!(table, column, error = %e, "migration failed");
            Err(LedgerError::Schema(format!(
                "adding {}.{}: {}",
                table, column, e
            )))
        }
    }
}

fn is_duplicate_column(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("duplicate column name")
    )
}

const DEFAULT_CATEGORIES: &[(&str, &str, &str, &str)] = &[
    ("Salary", "income", "#4CAF50", "cash"),
    ("Freelance", "income", "#8BC34A", "laptop"),
    ("Groceries", "expense", "#FF9800", "cart"),
    ("Transport", "expense", "#2196F3", "bus"),
    ("Housing", "expense", "#9C27B0", "home"),
    ("Entertainment", "expense", "#E91E63", "movie"),
    ("Health", "expense", "#F44336", "hospital"),
    ("Education", "expense", "#3F51B5", "school"),
];

const DEFAULT_ACCOUNTS: &[(&str, &str, &str, &str)] = &[
    ("Cash", "Cash", "#4CAF50", "cash"),
    ("Bank", "Bank", "#2196F3", "bank"),
    ("Mobile Money", "Mobile", "#E91E63", "cellphone"),
];

fn seed_defaults(conn: &Connection) -> Result<()> {
    let categories: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |r| r.get(0))?;
    if categories == 0 {
        for (name, typ, color, icon) in DEFAULT_CATEGORIES {
            conn.execute(
                "INSERT INTO categories(name, type, color, icon) VALUES (?1, ?2, ?3, ?4)",
                params![name, typ, color, icon],
            )?;
        }
        tracing::info!(count = DEFAULT_CATEGORIES.len(), "seeded default categories");
    }

    let accounts: i64 = conn.query_row("SELECT COUNT(*) FROM accounts", [], |r| r.get(0))?;
    if accounts == 0 {
        for (name, typ, color, icon) in DEFAULT_ACCOUNTS {
            conn.execute(
                "INSERT INTO accounts(name, type, balance, color, icon) VALUES (?1, ?2, 0, ?3, ?4)",
                params![name, typ, color, icon],
            )?;
        }
        tracing::info!(count = DEFAULT_ACCOUNTS.len(), "seeded default accounts");
    }
    Ok(())
}
