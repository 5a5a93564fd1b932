// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The ledger engine. Only this module changes account balances.

pub mod accounts;
pub mod backup;
pub mod categories;
pub mod crypto;
pub mod csv_export;
pub mod debts;
pub mod loans;
pub mod recurring;
pub mod reports;
pub mod settings;
pub mod transactions;
