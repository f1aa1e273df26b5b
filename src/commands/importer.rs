// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::customers;
use crate::models::Customer;
use crate::utils::{arg, generate_id};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use rusqlite::Connection;
use serde::Deserialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("customers", sub)) => {
            let path = arg(sub, "path")?;
            let n = import_customers(conn, path)?;
            println!("Imported {} customers from {}", n, path);
            Ok(())
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Deserialize)]
struct CustomerRecord {
    name: String,
    email: Option<String>,
    phone: Option<String>,
    npwp: Option<String>,
    address: Option<String>,
    contact_person: Option<String>,
}

/// Loads `name,email,phone,npwp,address,contact_person` rows. Any invalid or
/// duplicate row aborts the whole file.
pub fn import_customers(conn: &mut Connection, path: &str) -> Result<usize> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let tx = conn.transaction()?;
    let mut n = 0;
    for (i, result) in rdr.deserialize::<CustomerRecord>().enumerate() {
        // header is line 1
        let line = i + 2;
        let rec = result.with_context(|| format!("Read {} line {}", path, line))?;
        let customer = Customer {
            id: generate_id("CUS"),
            name: rec.name,
            email: rec.email,
            phone: rec.phone,
            npwp: rec.npwp,
            address: rec.address,
            contact_person: rec.contact_person,
            created_at: String::new(),
            updated_at: String::new(),
        };
        customers::insert(&tx, &customer)
            .with_context(|| format!("{} line {} ({})", path, line, customer.name))?;
        n += 1;
    }
    tx.commit()?;
    tracing::info!(path, rows = n, "customers imported");
    Ok(n)
}
