// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::ledger::csv_export::export_csv;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("csv", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let text = export_csv(conn)?;
    match sub.get_one::<String>("out") {
        Some(out) => {
            fs::write(out, &text).with_context(|| format!("Write CSV to {}", out))?;
            println!("Exported {} transactions to {}", text.lines().count().saturating_sub(1), out);
        }
        None => print!("{}", text),
    }
    Ok(())
}
