// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::settings;
use crate::utils::{arg, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            let mut rows = Vec::new();
            for (key, _) in settings::KNOWN {
                rows.push(vec![key.to_string(), settings::get(conn, key)?]);
            }
            println!("{}", pretty_table(&["Key", "Value"], rows));
        }
        Some(("set", sub)) => {
            let key = arg(sub, "key")?;
            let value = settings::set(conn, key, arg(sub, "value")?)?;
            println!("{} = {}", key, value);
        }
        _ => {}
    }
    Ok(())
}
