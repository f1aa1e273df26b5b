// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::AppError;
use crate::models::{OperationalCost, SellingCost};
use crate::utils::{
    arg, date_col, dec_col, fmt_money, generate_id, json_flags, maybe_print_json, opt_arg,
    opt_date, parse_decimal, pretty_table, require_order, resolve_vendor, today,
};
use crate::validation::Validator;
use anyhow::Result;
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add-operational", sub)) => {
            let c = add_operational(conn, sub)?;
            println!(
                "Recorded operational cost {} {} for {} ({})",
                c.category,
                fmt_money(&c.amount),
                c.sales_order_id,
                c.id
            );
        }
        Some(("add-selling", sub)) => {
            let c = add_selling(conn, sub)?;
            println!(
                "Recorded selling cost '{}' {} for {} ({})",
                c.description,
                fmt_money(&c.amount),
                c.sales_order_id,
                c.id
            );
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let id = remove(conn, arg(sub, "key")?)?;
            println!("Removed cost {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn operational_from_row(r: &Row<'_>) -> rusqlite::Result<OperationalCost> {
    Ok(OperationalCost {
        id: r.get(0)?,
        sales_order_id: r.get(1)?,
        vendor_id: r.get(2)?,
        category: r.get(3)?,
        description: r.get(4)?,
        amount: dec_col(r, 5)?,
        date: date_col(r, 6)?,
    })
}

fn selling_from_row(r: &Row<'_>) -> rusqlite::Result<SellingCost> {
    Ok(SellingCost {
        id: r.get(0)?,
        sales_order_id: r.get(1)?,
        description: r.get(2)?,
        amount: dec_col(r, 3)?,
    })
}

pub fn add_operational(conn: &Connection, sub: &clap::ArgMatches) -> Result<OperationalCost> {
    let sales_order_id = require_order(conn, arg(sub, "order")?)?;
    let vendor_id = opt_arg(sub, "vendor")
        .map(|v| resolve_vendor(conn, &v))
        .transpose()?;
    let cost = OperationalCost {
        id: generate_id("OPC"),
        sales_order_id,
        vendor_id,
        category: arg(sub, "category")?.to_string(),
        description: opt_arg(sub, "description").unwrap_or_default(),
        amount: parse_decimal(arg(sub, "amount")?)?,
        date: opt_date(sub, "date")?.unwrap_or_else(today),
    };
    Validator::new()
        .required("category", &cost.category)
        .positive("amount", cost.amount)
        .finish()?;
    conn.execute(
        "INSERT INTO operational_costs(id, sales_order_id, vendor_id, category, description, amount, date)
         VALUES (?1,?2,?3,?4,?5,?6,?7)",
        params![
            cost.id,
            cost.sales_order_id,
            cost.vendor_id,
            cost.category,
            cost.description,
            cost.amount.to_string(),
            cost.date.to_string()
        ],
    )?;
    tracing::info!(id = %cost.id, order = %cost.sales_order_id, "operational cost recorded");
    Ok(cost)
}

pub fn add_selling(conn: &Connection, sub: &clap::ArgMatches) -> Result<SellingCost> {
    let sales_order_id = require_order(conn, arg(sub, "order")?)?;
    let cost = SellingCost {
        id: generate_id("SLC"),
        sales_order_id,
        description: arg(sub, "description")?.to_string(),
        amount: parse_decimal(arg(sub, "amount")?)?,
    };
    Validator::new()
        .required("description", &cost.description)
        .positive("amount", cost.amount)
        .finish()?;
    conn.execute(
        "INSERT INTO selling_costs(id, sales_order_id, description, amount) VALUES (?1,?2,?3,?4)",
        params![
            cost.id,
            cost.sales_order_id,
            cost.description,
            cost.amount.to_string()
        ],
    )?;
    tracing::info!(id = %cost.id, order = %cost.sales_order_id, "selling cost recorded");
    Ok(cost)
}

pub fn operational_for(conn: &Connection, order_id: &str) -> Result<Vec<OperationalCost>> {
    let mut stmt = conn.prepare(
        "SELECT id, sales_order_id, vendor_id, category, description, amount, date
         FROM operational_costs WHERE sales_order_id=?1 ORDER BY date, id",
    )?;
    let rows = stmt
        .query_map(params![order_id], operational_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn selling_for(conn: &Connection, order_id: &str) -> Result<Vec<SellingCost>> {
    let mut stmt = conn.prepare(
        "SELECT id, sales_order_id, description, amount
         FROM selling_costs WHERE sales_order_id=?1 ORDER BY created_at, id",
    )?;
    let rows = stmt
        .query_map(params![order_id], selling_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[derive(Debug, Serialize)]
pub struct OrderCosts {
    pub sales_order_id: String,
    pub operational: Vec<OperationalCost>,
    pub selling: Vec<SellingCost>,
    pub operational_total: Decimal,
    pub selling_total: Decimal,
}

pub fn for_order(conn: &Connection, order_id: &str) -> Result<OrderCosts> {
    let order_id = require_order(conn, order_id)?;
    let operational = operational_for(conn, &order_id)?;
    let selling = selling_for(conn, &order_id)?;
    Ok(OrderCosts {
        operational_total: operational.iter().map(|c| c.amount).sum(),
        selling_total: selling.iter().map(|c| c.amount).sum(),
        sales_order_id: order_id,
        operational,
        selling,
    })
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let costs = for_order(conn, arg(sub, "order")?)?;
    if maybe_print_json(json_flag, jsonl_flag, &costs)? {
        return Ok(());
    }
    let mut rows = Vec::new();
    for c in &costs.operational {
        rows.push(vec![
            c.id.clone(),
            "operational".into(),
            c.date.to_string(),
            c.category.clone(),
            c.description.clone(),
            fmt_money(&c.amount),
        ]);
    }
    for c in &costs.selling {
        rows.push(vec![
            c.id.clone(),
            "selling".into(),
            String::new(),
            String::new(),
            c.description.clone(),
            fmt_money(&c.amount),
        ]);
    }
    println!(
        "{}",
        pretty_table(
            &["ID", "Kind", "Date", "Category", "Description", "Amount"],
            rows
        )
    );
    println!(
        "Operational total: {}  Selling total: {}",
        fmt_money(&costs.operational_total),
        fmt_money(&costs.selling_total)
    );
    Ok(())
}

/// Removes an operational or selling cost by id.
pub fn remove(conn: &Connection, id: &str) -> Result<String> {
    let id = id.trim();
    let mut n = conn.execute("DELETE FROM operational_costs WHERE id=?1", params![id])?;
    n += conn.execute("DELETE FROM selling_costs WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(AppError::not_found("cost", id).into());
    }
    tracing::info!(id, "cost removed");
    Ok(id.to_string())
}
