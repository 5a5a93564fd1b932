// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error type shared by every ledger engine operation.

/// Errors raised by the ledger engine.
///
/// Not-found conditions inside the engine are silent no-ops and therefore
/// have no variant here.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Any store-level failure. Aborts the enclosing unit of work.
    #[error("database error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// Schema creation or a migration failed for a reason other than the
    /// column already existing.
    #[error("schema initialization failed: {0}")]
    Schema(String),

    /// Transaction and allocation amounts carry their sign in the category
    /// type, so the stored amount must not be negative.
    #[error("amount {0} is negative")]
    NegativeAmount(i64),

    /// A value read from the store could not be mapped onto its enum.
    #[error("invalid {field} value '{value}'")]
    InvalidValue { field: &'static str, value: String },

    /// The backup artifact could not be decrypted or is structurally
    /// incomplete. Always raised before any destructive step.
    #[error("invalid file or wrong password: {0}")]
    InvalidBackup(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
