// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::AppError;
use crate::models::{PurchaseOrder, PurchaseStatus};
use crate::settings;
use crate::utils::{
    arg, date_col, dec_col, enum_col, fmt_money, generate_id, json_flags, maybe_print_json,
    name_of, opt_arg, opt_date, parse_decimal, pretty_table, require_order, resolve_vendor, today,
};
use crate::validation::Validator;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMNS: &str =
    "id, vendor_id, sales_order_id, order_date, description, amount, currency, status";

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let po = add(conn, sub)?;
            println!(
                "Created purchase order {} ({} {})",
                po.id,
                po.currency,
                fmt_money(&po.amount)
            );
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("status", sub)) => {
            let to = arg(sub, "to")?.parse::<PurchaseStatus>()?;
            let po = set_status(conn, arg(sub, "key")?, to)?;
            println!("Purchase order {} is now {}", po.id, po.status);
        }
        Some(("rm", sub)) => {
            let id = remove(conn, arg(sub, "key")?)?;
            println!("Removed purchase order {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn from_row(r: &Row<'_>) -> rusqlite::Result<PurchaseOrder> {
    Ok(PurchaseOrder {
        id: r.get(0)?,
        vendor_id: r.get(1)?,
        sales_order_id: r.get(2)?,
        order_date: date_col(r, 3)?,
        description: r.get(4)?,
        amount: dec_col(r, 5)?,
        currency: r.get(6)?,
        status: enum_col(r, 7)?,
    })
}

pub fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<PurchaseOrder> {
    let vendor_id = resolve_vendor(conn, arg(sub, "vendor")?)?;
    let sales_order_id = opt_arg(sub, "order")
        .map(|id| require_order(conn, &id))
        .transpose()?;
    let currency = match opt_arg(sub, "currency") {
        Some(c) => c.to_uppercase(),
        None => settings::base_currency(conn)?,
    };
    let po = PurchaseOrder {
        id: generate_id("PO"),
        vendor_id,
        sales_order_id,
        order_date: opt_date(sub, "date")?.unwrap_or_else(today),
        description: arg(sub, "description")?.to_string(),
        amount: parse_decimal(arg(sub, "amount")?)?,
        currency,
        status: PurchaseStatus::Draft,
    };
    Validator::new()
        .required("description", &po.description)
        .positive("amount", po.amount)
        .finish()?;
    conn.execute(
        "INSERT INTO purchase_orders(id, vendor_id, sales_order_id, order_date, description,
            amount, currency, status)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
        params![
            po.id,
            po.vendor_id,
            po.sales_order_id,
            po.order_date.to_string(),
            po.description,
            po.amount.to_string(),
            po.currency,
            po.status.as_str()
        ],
    )?;
    tracing::info!(id = %po.id, vendor = %po.vendor_id, "purchase order created");
    Ok(po)
}

pub fn get(conn: &Connection, id: &str) -> Result<PurchaseOrder> {
    let sql = format!("SELECT {} FROM purchase_orders WHERE id=?1", COLUMNS);
    conn.query_row(&sql, params![id.trim()], from_row)
        .optional()?
        .ok_or_else(|| AppError::not_found("purchase order", id.trim()).into())
}

#[derive(Debug, Default)]
pub struct PurchaseFilter {
    pub status: Option<PurchaseStatus>,
    pub vendor_id: Option<String>,
    pub sales_order_id: Option<String>,
}

pub fn query_rows(conn: &Connection, filter: &PurchaseFilter) -> Result<Vec<PurchaseOrder>> {
    let mut sql = format!("SELECT {} FROM purchase_orders WHERE 1=1", COLUMNS);
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(status) = filter.status {
        sql.push_str(" AND status=?");
        params_vec.push(status.as_str().into());
    }
    if let Some(v) = &filter.vendor_id {
        sql.push_str(" AND vendor_id=?");
        params_vec.push(v.clone());
    }
    if let Some(o) = &filter.sales_order_id {
        sql.push_str(" AND sales_order_id=?");
        params_vec.push(o.clone());
    }
    sql.push_str(" ORDER BY order_date DESC, id DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(params_vec.iter()), from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let filter = PurchaseFilter {
        status: opt_arg(sub, "status")
            .map(|s| s.parse::<PurchaseStatus>())
            .transpose()?,
        vendor_id: opt_arg(sub, "vendor")
            .map(|v| resolve_vendor(conn, &v))
            .transpose()?,
        sales_order_id: opt_arg(sub, "order"),
    };
    let data = query_rows(conn, &filter)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let mut rows = Vec::new();
        for po in data {
            let vendor = name_of(conn, "vendors", &po.vendor_id)?
                .unwrap_or_else(|| format!("? {}", po.vendor_id));
            rows.push(vec![
                po.id,
                po.order_date.to_string(),
                vendor,
                po.sales_order_id.unwrap_or_default(),
                po.description,
                po.status.to_string(),
                fmt_money(&po.amount),
                po.currency,
            ]);
        }
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Vendor", "Sales Order", "Description", "Status", "Amount", "CCY"],
                rows
            )
        );
    }
    Ok(())
}

pub fn set_status(conn: &Connection, id: &str, to: PurchaseStatus) -> Result<PurchaseOrder> {
    let mut po = get(conn, id)?;
    if !po.status.can_transition_to(to) {
        return Err(AppError::InvalidTransition {
            entity: "purchase order",
            from: po.status.to_string(),
            to: to.to_string(),
        }
        .into());
    }
    conn.execute(
        "UPDATE purchase_orders SET status=?2, updated_at=datetime('now') WHERE id=?1",
        params![po.id, to.as_str()],
    )?;
    tracing::info!(id = %po.id, from = %po.status, to = %to, "purchase order status changed");
    po.status = to;
    Ok(po)
}

pub fn remove(conn: &Connection, id: &str) -> Result<String> {
    let po = get(conn, id)?;
    if !matches!(po.status, PurchaseStatus::Draft | PurchaseStatus::Cancelled) {
        return Err(AppError::InvalidState(format!(
            "purchase order {} is {}; only draft or cancelled orders can be removed",
            po.id, po.status
        ))
        .into());
    }
    conn.execute("DELETE FROM purchase_orders WHERE id=?1", params![po.id])?;
    tracing::info!(id = %po.id, "purchase order removed");
    Ok(po.id)
}
