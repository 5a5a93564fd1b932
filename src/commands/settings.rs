// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::commands::required;
use crate::ledger::settings::{get_currency, get_setting, get_settings, set_currency, set_setting};
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            let key = required(sub, "key")?;
            match get_setting(conn, key)? {
                Some(v) => println!("{}", v),
                None => println!("'{}' is not set", key),
            }
        }
        Some(("set", sub)) => {
            let key = required(sub, "key")?;
            set_setting(conn, key, required(sub, "value")?)?;
            println!("Saved '{}'", key);
        }
        Some(("currency", sub)) => match sub.get_one::<String>("symbol") {
            Some(symbol) => {
                set_currency(conn, symbol)?;
                println!("Currency set to {}", symbol);
            }
            None => println!("{}", get_currency(conn)?),
        },
        Some(("list", sub)) => {
            let settings = get_settings(conn)?;
            if !maybe_print_json(sub.get_flag("json"), &settings)? {
                let data = settings.into_iter().map(|s| vec![s.key, s.value]).collect();
                println!("{}", pretty_table(&["Key", "Value"], data));
            }
        }
        _ => {}
    }
    Ok(())
}
