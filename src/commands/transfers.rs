// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use rusqlite::Connection;

use crate::commands::{date_or_now, required};
use crate::ledger::transactions::transfer_funds;
use crate::utils::{id_for_account, parse_decimal};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    let from = required(m, "from")?;
    let to = required(m, "to")?;
    if from == to {
        bail!("Cannot transfer from '{}' to itself", from);
    }
    let from_id = id_for_account(conn, from)?;
    let to_id = id_for_account(conn, to)?;
    let amount = parse_decimal(required(m, "amount")?)?;
    let date = date_or_now(m, "date")?;

    let (out_id, in_id) = transfer_funds(conn, from_id, to_id, amount, date)?;
    println!(
        "Transferred {} from '{}' to '{}' (#{} / #{})",
        amount, from, to, out_id, in_id
    );
    Ok(())
}
