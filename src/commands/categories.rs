// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::commands::required;
use crate::ledger::categories::{add_category, delete_category, get_categories};
use crate::models::CategoryType;
use crate::utils::{id_for_category, maybe_print_json, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = required(sub, "name")?;
            let typ: CategoryType = required(sub, "type")?.parse()?;
            let color = sub.get_one::<String>("color").map(String::as_str);
            let icon = sub.get_one::<String>("icon").map(String::as_str);
            add_category(conn, name, typ, color, icon)?;
            println!("Added {} category '{}'", typ, name);
        }
        Some(("list", sub)) => {
            let typ = sub
                .get_one::<String>("type")
                .map(|t| t.parse::<CategoryType>())
                .transpose()?;
            let categories = get_categories(conn, typ)?;
            if !maybe_print_json(sub.get_flag("json"), &categories)? {
                let data = categories
                    .into_iter()
                    .map(|c| {
                        vec![
                            c.name,
                            c.r#type.to_string(),
                            c.color.unwrap_or_default(),
                            c.icon.unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Category", "Type", "Color", "Icon"], data));
            }
        }
        Some(("rm", sub)) => {
            let name = required(sub, "name")?;
            let id = id_for_category(conn, name)?;
            delete_category(conn, id)?;
            println!("Removed category '{}'", name);
        }
        _ => {}
    }
    Ok(())
}
