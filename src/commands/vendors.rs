// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Vendor;
use crate::utils::{
    arg, ensure_unreferenced, generate_id, json_flags, map_unique_violation, maybe_print_json,
    opt_arg, patch_opt, pretty_table, resolve_vendor,
};
use crate::validation::{validate_contact, ContactForm};
use anyhow::Result;
use rusqlite::{params, Connection, Row};

const COLUMNS: &str = "id, name, service_type, email, phone, npwp, address, created_at, updated_at";

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let v = add(conn, sub)?;
            println!("Added vendor '{}' ({})", v.name, v.id);
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("update", sub)) => {
            let v = update(conn, sub)?;
            println!("Updated vendor '{}' ({})", v.name, v.id);
        }
        Some(("rm", sub)) => {
            let id = remove(conn, arg(sub, "key")?)?;
            println!("Removed vendor {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn from_row(r: &Row<'_>) -> rusqlite::Result<Vendor> {
    Ok(Vendor {
        id: r.get(0)?,
        name: r.get(1)?,
        service_type: r.get(2)?,
        email: r.get(3)?,
        phone: r.get(4)?,
        npwp: r.get(5)?,
        address: r.get(6)?,
        created_at: r.get(7)?,
        updated_at: r.get(8)?,
    })
}

fn validate(v: &Vendor) -> Result<()> {
    validate_contact(&ContactForm {
        name: &v.name,
        email: v.email.as_deref(),
        phone: v.phone.as_deref(),
        npwp: v.npwp.as_deref(),
    })?;
    Ok(())
}

pub fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vendor> {
    let v = Vendor {
        id: generate_id("VEN"),
        name: arg(sub, "name")?.to_string(),
        service_type: opt_arg(sub, "service"),
        email: opt_arg(sub, "email"),
        phone: opt_arg(sub, "phone"),
        npwp: opt_arg(sub, "npwp"),
        address: opt_arg(sub, "address"),
        created_at: String::new(),
        updated_at: String::new(),
    };
    validate(&v)?;
    conn.execute(
        "INSERT INTO vendors(id, name, service_type, email, phone, npwp, address)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![v.id, v.name, v.service_type, v.email, v.phone, v.npwp, v.address],
    )
    .map_err(|e| map_unique_violation(e, "vendor", &v.name))?;
    tracing::info!(id = %v.id, name = %v.name, "vendor created");
    get(conn, &v.id)
}

pub fn get(conn: &Connection, key: &str) -> Result<Vendor> {
    let id = resolve_vendor(conn, key)?;
    let sql = format!("SELECT {} FROM vendors WHERE id=?1", COLUMNS);
    Ok(conn.query_row(&sql, params![id], from_row)?)
}

pub fn query_rows(conn: &Connection, search: Option<&str>) -> Result<Vec<Vendor>> {
    let mut sql = format!("SELECT {} FROM vendors", COLUMNS);
    let pattern = search.map(|s| format!("%{}%", s.to_lowercase()));
    if pattern.is_some() {
        sql.push_str(" WHERE lower(name) LIKE ?1 OR lower(COALESCE(service_type,'')) LIKE ?1");
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
            .map(|v| {
                vec![
                    v.id,
                    v.name,
                    v.service_type.unwrap_or_default(),
                    v.email.unwrap_or_default(),
                    v.phone.unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Name", "Service", "Email", "Phone"], rows)
        );
    }
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let v = get(conn, arg(sub, "key")?)?;
    if !maybe_print_json(json_flag, jsonl_flag, &v)? {
        let rows = vec![
            vec!["ID".into(), v.id],
            vec!["Name".into(), v.name],
            vec!["Service".into(), v.service_type.unwrap_or_default()],
            vec!["Email".into(), v.email.unwrap_or_default()],
            vec!["Phone".into(), v.phone.unwrap_or_default()],
            vec!["NPWP".into(), v.npwp.unwrap_or_default()],
            vec!["Address".into(), v.address.unwrap_or_default()],
        ];
        println!("{}", pretty_table(&["Field", "Value"], rows));
    }
    Ok(())
}

pub fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vendor> {
    let current = get(conn, arg(sub, "key")?)?;
    let next = Vendor {
        name: opt_arg(sub, "name").unwrap_or_else(|| current.name.clone()),
        service_type: patch_opt(sub, "service", current.service_type.clone()),
        email: patch_opt(sub, "email", current.email.clone()),
        phone: patch_opt(sub, "phone", current.phone.clone()),
        npwp: patch_opt(sub, "npwp", current.npwp.clone()),
        address: patch_opt(sub, "address", current.address.clone()),
        ..current
    };
    validate(&next)?;
    conn.execute(
        "UPDATE vendors SET name=?2, service_type=?3, email=?4, phone=?5, npwp=?6, address=?7,
         updated_at=datetime('now') WHERE id=?1",
        params![
            next.id,
            next.name,
            next.service_type,
            next.email,
            next.phone,
            next.npwp,
            next.address
        ],
    )
    .map_err(|e| map_unique_violation(e, "vendor", &next.name))?;
    tracing::info!(id = %next.id, "vendor updated");
    get(conn, &next.id)
}

pub fn remove(conn: &Connection, key: &str) -> Result<String> {
    let id = resolve_vendor(conn, key)?;
    ensure_unreferenced(
        conn,
        "vendor",
        &id,
        &[
            ("purchase_orders", "vendor_id", "purchase orders"),
            ("operational_costs", "vendor_id", "operational costs"),
        ],
    )?;
    conn.execute("DELETE FROM vendors WHERE id=?1", params![id])?;
    tracing::info!(id = %id, "vendor removed");
    Ok(id)
}
