// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Declares a closed set of lowercase text values stored as TEXT columns.
macro_rules! text_enum {
    ($name:ident, $field:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = LedgerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(LedgerError::InvalidValue {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: LedgerError| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

text_enum!(CategoryType, "category type", {
    Income => "income",
    Expense => "expense",
});

text_enum!(DebtType, "debt type", {
    Borrowed => "borrowed",
    Lent => "lent",
});

text_enum!(LoanStatus, "loan status", {
    Active => "active",
    Completed => "completed",
});

text_enum!(InstallmentStatus, "installment status", {
    Pending => "pending",
    Paid => "paid",
});

text_enum!(Frequency, "frequency", {
    Daily => "daily",
    Weekly => "weekly",
    Monthly => "monthly",
    Yearly => "yearly",
});

impl CategoryType {
    /// Signed balance delta a posting of `amount` has on an account.
    pub fn signed(&self, amount: i64) -> i64 {
        match self {
            CategoryType::Income => amount,
            CategoryType::Expense => -amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub r#type: CategoryType,
    pub color: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub r#type: String,
    pub balance: i64,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// A posted money movement. `date` is epoch milliseconds.
///
/// `account_id` is `None` for split transactions whose balance effect lives in
/// their allocations, and for postings made without any account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub amount: i64,
    pub date: i64,
    pub category_id: Option<i64>,
    pub note: Option<String>,
    pub account_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionItem {
    pub id: i64,
    pub transaction_id: i64,
    pub name: String,
    pub quantity: f64,
    pub unit: Option<String>,
    pub price_per_unit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionAllocation {
    pub id: i64,
    pub transaction_id: i64,
    pub account_id: i64,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub id: i64,
    pub amount: i64,
    pub description: Option<String>,
    pub r#type: DebtType,
    pub due_date: Option<i64>,
    pub is_paid: bool,
    pub contact_name: Option<String>,
    pub created_at: i64,
    pub transaction_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringPayment {
    pub id: i64,
    pub amount: i64,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub frequency: Frequency,
    pub due_day: Option<i64>,
    pub next_due_date: i64,
    pub reminder_days_before: i64,
    pub is_active: bool,
    pub last_paid_date: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: i64,
    pub title: String,
    pub principal_amount: i64,
    pub interest_rate: Decimal, // percent
    pub total_repayable: i64,
    pub start_date: i64,
    pub installment_frequency: Frequency,
    pub installment_amount: i64,
    pub status: LoanStatus,
    pub description: Option<String>,
    pub remaining_amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInstallment {
    pub id: i64,
    pub loan_id: i64,
    pub due_date: i64,
    pub amount: i64,
    pub status: InstallmentStatus,
    pub paid_date: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

// Read models: joined rows carrying display attributes of related entities.

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionWithDisplay {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub category_name: Option<String>,
    pub category_type: Option<CategoryType>,
    pub category_color: Option<String>,
    pub category_icon: Option<String>,
    pub account_name: Option<String>,
}

/// A transaction together with its receipt lines and split allocations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionDetail {
    #[serde(flatten)]
    pub transaction: TransactionWithDisplay,
    pub items: Vec<TransactionItem>,
    pub allocations: Vec<TransactionAllocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecurringPaymentWithCategory {
    #[serde(flatten)]
    pub payment: RecurringPayment,
    pub category_name: Option<String>,
    pub category_color: Option<String>,
    pub category_icon: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceSummary {
    pub total_income: i64,
    pub total_expense: i64,
    /// Sum of all account balances. Not derived from income and expense.
    pub balance: i64,
}

// Inputs

#[derive(Debug, Clone, PartialEq)]
pub struct NewTransactionItem {
    pub name: String,
    pub quantity: f64,
    pub unit: Option<String>,
    pub price_per_unit: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAllocation {
    pub account_id: i64,
    pub amount: Decimal,
}

/// The unpaid remainder of a bill, recorded as a borrowed debt.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDue {
    pub amount: Decimal,
    pub contact_name: String,
    pub due_date: i64,
}

/// Input for [crate::ledger::transactions::add_transaction].
///
/// `amount` is the full bill. When `pending` is set, only the paid part
/// (`amount - pending.amount`) is posted against accounts.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub amount: Decimal,
    pub date: i64,
    pub category_id: i64,
    pub note: String,
    pub items: Vec<NewTransactionItem>,
    pub account_id: Option<i64>,
    pub allocations: Vec<NewAllocation>,
    pub pending: Option<PendingDue>,
}

impl NewTransaction {
    pub fn new(amount: Decimal, date: i64, category_id: i64, note: &str) -> Self {
        Self {
            amount,
            date,
            category_id,
            note: note.to_string(),
            items: Vec::new(),
            account_id: None,
            allocations: Vec::new(),
            pending: None,
        }
    }

    pub fn account(mut self, account_id: i64) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn allocations(mut self, allocations: Vec<NewAllocation>) -> Self {
        self.allocations = allocations;
        self
    }

    pub fn items(mut self, items: Vec<NewTransactionItem>) -> Self {
        self.items = items;
        self
    }

    pub fn pending(mut self, pending: PendingDue) -> Self {
        self.pending = Some(pending);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLoan {
    pub title: String,
    pub principal_amount: i64,
    pub interest_rate: Decimal,
    pub total_repayable: i64,
    pub start_date: i64,
    pub installment_frequency: Frequency,
    pub installment_amount: i64,
    pub description: Option<String>,
    pub remaining_amount: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewInstallment {
    pub due_date: i64,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRecurringPayment {
    pub amount: Decimal,
    pub description: String,
    pub category_id: i64,
    pub frequency: Frequency,
    pub due_day: i64,
    pub next_due_date: i64,
    pub reminder_days_before: i64,
}
