// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use rusqlite::Connection;

use crate::commands::required;
use crate::ledger::backup::{backup_file_name, export_backup, import_backup, reset_database};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("export", sub)) => {
            let password = required(sub, "password")?;
            let dir = Path::new(required(sub, "dir")?);
            let name = backup_file_name(sub.get_one::<String>("name").map(String::as_str));
            let artifact = export_backup(conn, password)?;
            let path = dir.join(name);
            fs::write(&path, artifact)
                .with_context(|| format!("Write backup to {}", path.display()))?;
            println!("Backup written to {}", path.display());
        }
        Some(("import", sub)) => {
            let file = required(sub, "file")?;
            let artifact =
                fs::read_to_string(file).with_context(|| format!("Read backup {}", file))?;
            import_backup(conn, &artifact, required(sub, "password")?)?;
            println!("Restored backup from {}", file);
        }
        _ => {}
    }
    Ok(())
}

pub fn reset(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    if !m.get_flag("yes") {
        bail!("Refusing to reset without --yes");
    }
    reset_database(conn)?;
    println!("All data deleted");
    Ok(())
}
