// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Customer;
use crate::utils::{
    arg, ensure_unreferenced, generate_id, json_flags, map_unique_violation, maybe_print_json,
    opt_arg, patch_opt, pretty_table, resolve_customer,
};
use crate::validation::{validate_contact, ContactForm};
use anyhow::Result;
use rusqlite::{params, Connection, Row};

const COLUMNS: &str =
    "id, name, email, phone, npwp, address, contact_person, created_at, updated_at";

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let c = add(conn, sub)?;
            println!("Added customer '{}' ({})", c.name, c.id);
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("update", sub)) => {
            let c = update(conn, sub)?;
            println!("Updated customer '{}' ({})", c.name, c.id);
        }
        Some(("rm", sub)) => {
            let key = arg(sub, "key")?;
            let id = remove(conn, key)?;
            println!("Removed customer {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn from_row(r: &Row<'_>) -> rusqlite::Result<Customer> {
    Ok(Customer {
        id: r.get(0)?,
        name: r.get(1)?,
        email: r.get(2)?,
        phone: r.get(3)?,
        npwp: r.get(4)?,
        address: r.get(5)?,
        contact_person: r.get(6)?,
        created_at: r.get(7)?,
        updated_at: r.get(8)?,
    })
}

fn validate(c: &Customer) -> Result<()> {
    validate_contact(&ContactForm {
        name: &c.name,
        email: c.email.as_deref(),
        phone: c.phone.as_deref(),
        npwp: c.npwp.as_deref(),
    })?;
    Ok(())
}

pub fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<Customer> {
    let customer = Customer {
        id: generate_id("CUS"),
        name: arg(sub, "name")?.to_string(),
        email: opt_arg(sub, "email"),
        phone: opt_arg(sub, "phone"),
        npwp: opt_arg(sub, "npwp"),
        address: opt_arg(sub, "address"),
        contact_person: opt_arg(sub, "contact"),
        created_at: String::new(),
        updated_at: String::new(),
    };
    insert(conn, &customer)?;
    get(conn, &customer.id)
}

/// Validates and stores a new customer; shared with the CSV importer.
pub fn insert(conn: &Connection, c: &Customer) -> Result<()> {
    validate(c)?;
    conn.execute(
        "INSERT INTO customers(id, name, email, phone, npwp, address, contact_person)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            c.id,
            c.name,
            c.email,
            c.phone,
            c.npwp,
            c.address,
            c.contact_person
        ],
    )
    .map_err(|e| map_unique_violation(e, "customer", &c.name))?;
    tracing::info!(id = %c.id, name = %c.name, "customer created");
    Ok(())
}

pub fn get(conn: &Connection, key: &str) -> Result<Customer> {
    let id = resolve_customer(conn, key)?;
    let sql = format!("SELECT {} FROM customers WHERE id=?1", COLUMNS);
    Ok(conn.query_row(&sql, params![id], from_row)?)
}

pub fn query_rows(conn: &Connection, search: Option<&str>) -> Result<Vec<Customer>> {
    let mut sql = format!("SELECT {} FROM customers", COLUMNS);
    let pattern = search.map(|s| format!("%{}%", s.to_lowercase()));
    if pattern.is_some() {
        sql.push_str(" WHERE lower(name) LIKE ?1 OR lower(COALESCE(email,'')) LIKE ?1");
    }
    sql.push_str(" ORDER BY name");
    let mut stmt = conn.prepare(&sql)?;
    let rows = match pattern {
        Some(p) => stmt.query_map(params![p], from_row)?.collect::<Result<Vec<_>, _>>()?,
        None => stmt.query_map([], from_row)?.collect::<Result<Vec<_>, _>>()?,
    };
    Ok(rows)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let data = query_rows(conn, opt_arg(sub, "search").as_deref())?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .into_iter()
            .map(|c| {
                vec![
                    c.id,
                    c.name,
                    c.email.unwrap_or_default(),
                    c.phone.unwrap_or_default(),
                    c.npwp.unwrap_or_default(),
                    c.contact_person.unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Name", "Email", "Phone", "NPWP", "Contact"], rows)
        );
    }
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let c = get(conn, arg(sub, "key")?)?;
    if !maybe_print_json(json_flag, jsonl_flag, &c)? {
        let rows = vec![
            vec!["ID".into(), c.id],
            vec!["Name".into(), c.name],
            vec!["Email".into(), c.email.unwrap_or_default()],
            vec!["Phone".into(), c.phone.unwrap_or_default()],
            vec!["NPWP".into(), c.npwp.unwrap_or_default()],
            vec!["Address".into(), c.address.unwrap_or_default()],
            vec!["Contact".into(), c.contact_person.unwrap_or_default()],
            vec!["Created".into(), c.created_at],
            vec!["Updated".into(), c.updated_at],
        ];
        println!("{}", pretty_table(&["Field", "Value"], rows));
    }
    Ok(())
}

pub fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<Customer> {
    let current = get(conn, arg(sub, "key")?)?;
    let next = Customer {
        name: opt_arg(sub, "name").unwrap_or_else(|| current.name.clone()),
        email: patch_opt(sub, "email", current.email.clone()),
        phone: patch_opt(sub, "phone", current.phone.clone()),
        npwp: patch_opt(sub, "npwp", current.npwp.clone()),
        address: patch_opt(sub, "address", current.address.clone()),
        contact_person: patch_opt(sub, "contact", current.contact_person.clone()),
        ..current
    };
    validate(&next)?;
    conn.execute(
        "UPDATE customers SET name=?2, email=?3, phone=?4, npwp=?5, address=?6,
         contact_person=?7, updated_at=datetime('now') WHERE id=?1",
        params![
            next.id,
            next.name,
            next.email,
            next.phone,
            next.npwp,
            next.address,
            next.contact_person
        ],
    )
    .map_err(|e| map_unique_violation(e, "customer", &next.name))?;
    tracing::info!(id = %next.id, "customer updated");
    get(conn, &next.id)
}

pub fn remove(conn: &Connection, key: &str) -> Result<String> {
    let id = resolve_customer(conn, key)?;
    ensure_unreferenced(
        conn,
        "customer",
        &id,
        &[
            ("sales_orders", "customer_id", "sales orders"),
            ("invoices", "customer_id", "invoices"),
        ],
    )?;
    conn.execute("DELETE FROM customers WHERE id=?1", params![id])?;
    tracing::info!(id = %id, "customer removed");
    Ok(id)
}
