// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{costs, hs_codes, purchases};
use crate::duty::{round_money, LandedCost};
use crate::error::AppError;
use crate::models::{
    OperationalCost, OrderStatus, PurchaseOrder, SalesOrder, SellingCost, ShipmentMode,
};
use crate::settings;
use crate::utils::{
    arg, date_col, dec_col, enum_col, ensure_unreferenced, fmt_money, generate_id, json_flags,
    maybe_print_json, name_of, opt_arg, opt_date, opt_dec_col, opt_decimal, parse_decimal,
    parse_month, pretty_table, require_hs_code, require_order, resolve_customer, today,
};
use crate::validation::Validator;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use serde::Serialize;

const COLUMNS: &str = "id, customer_id, order_date, mode, origin, destination, cargo, weight_kg, \
     volume_cbm, hs_code, cif_value, currency, estimated_cost, selling_price, status";

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let o = add(conn, sub)?;
            println!(
                "Created sales order {} {} -> {} ({} {})",
                o.id,
                o.origin,
                o.destination,
                o.currency,
                fmt_money(&o.selling_price)
            );
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("update", sub)) => {
            let o = update(conn, sub)?;
            println!("Updated sales order {}", o.id);
        }
        Some(("status", sub)) => {
            let to = arg(sub, "to")?.parse::<OrderStatus>()?;
            let o = set_status(conn, arg(sub, "key")?, to)?;
            println!("Sales order {} is now {}", o.id, o.status);
        }
        Some(("rm", sub)) => {
            let id = remove(conn, arg(sub, "key")?)?;
            println!("Removed sales order {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn from_row(r: &Row<'_>) -> rusqlite::Result<SalesOrder> {
    Ok(SalesOrder {
        id: r.get(0)?,
        customer_id: r.get(1)?,
        order_date: date_col(r, 2)?,
        mode: enum_col(r, 3)?,
        origin: r.get(4)?,
        destination: r.get(5)?,
        cargo: r.get(6)?,
        weight_kg: dec_col(r, 7)?,
        volume_cbm: dec_col(r, 8)?,
        hs_code: r.get(9)?,
        cif_value: opt_dec_col(r, 10)?,
        currency: r.get(11)?,
        estimated_cost: dec_col(r, 12)?,
        selling_price: dec_col(r, 13)?,
        status: enum_col(r, 14)?,
    })
}

fn validate(conn: &Connection, o: &SalesOrder) -> Result<()> {
    let mut v = Validator::new();
    v.required("origin", &o.origin)
        .required("destination", &o.destination)
        .required("cargo", &o.cargo)
        .non_negative("weight", o.weight_kg)
        .non_negative("volume", o.volume_cbm)
        .non_negative("cost", o.estimated_cost)
        .positive("price", o.selling_price)
        .check(
            o.selling_price > o.estimated_cost,
            "price",
            "selling price must exceed estimated cost",
        );
    if let Some(cif) = o.cif_value {
        v.non_negative("cif", cif);
    }
    if let Some(code) = &o.hs_code {
        v.hs_code("hs-code", code);
    }
    v.finish()?;
    if let Some(code) = &o.hs_code {
        require_hs_code(conn, code)?;
    }
    Ok(())
}

pub fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<SalesOrder> {
    let customer_id = resolve_customer(conn, arg(sub, "customer")?)?;
    let currency = match opt_arg(sub, "currency") {
        Some(c) => c.to_uppercase(),
        None => settings::base_currency(conn)?,
    };
    let order = SalesOrder {
        id: generate_id("SO"),
        customer_id,
        order_date: opt_date(sub, "date")?.unwrap_or_else(today),
        mode: arg(sub, "mode")?.parse::<ShipmentMode>()?,
        origin: arg(sub, "origin")?.to_string(),
        destination: arg(sub, "destination")?.to_string(),
        cargo: arg(sub, "cargo")?.to_string(),
        weight_kg: opt_decimal(sub, "weight")?.unwrap_or(Decimal::ZERO),
        volume_cbm: opt_decimal(sub, "volume")?.unwrap_or(Decimal::ZERO),
        hs_code: opt_arg(sub, "hs-code"),
        cif_value: opt_decimal(sub, "cif")?,
        currency,
        estimated_cost: parse_decimal(arg(sub, "cost")?)?,
        selling_price: parse_decimal(arg(sub, "price")?)?,
        status: OrderStatus::Draft,
    };
    validate(conn, &order)?;
    conn.execute(
        "INSERT INTO sales_orders(id, customer_id, order_date, mode, origin, destination, cargo,
            weight_kg, volume_cbm, hs_code, cif_value, currency, estimated_cost, selling_price, status)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15)",
        params![
            order.id,
            order.customer_id,
            order.order_date.to_string(),
            order.mode.as_str(),
            order.origin,
            order.destination,
            order.cargo,
            order.weight_kg.to_string(),
            order.volume_cbm.to_string(),
            order.hs_code,
            order.cif_value.map(|d| d.to_string()),
            order.currency,
            order.estimated_cost.to_string(),
            order.selling_price.to_string(),
            order.status.as_str()
        ],
    )?;
    tracing::info!(id = %order.id, customer = %order.customer_id, "sales order created");
    Ok(order)
}

pub fn get(conn: &Connection, id: &str) -> Result<SalesOrder> {
    let id = require_order(conn, id)?;
    let sql = format!("SELECT {} FROM sales_orders WHERE id=?1", COLUMNS);
    Ok(conn.query_row(&sql, params![id], from_row)?)
}

#[derive(Debug, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub customer_id: Option<String>,
    pub month: Option<String>,
    pub limit: Option<usize>,
}

pub fn query_rows(conn: &Connection, filter: &OrderFilter) -> Result<Vec<SalesOrder>> {
    let mut sql = format!("SELECT {} FROM sales_orders WHERE 1=1", COLUMNS);
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(status) = filter.status {
        sql.push_str(" AND status=?");
        params_vec.push(status.as_str().into());
    }
    if let Some(cid) = &filter.customer_id {
        sql.push_str(" AND customer_id=?");
        params_vec.push(cid.clone());
    }
    if let Some(month) = &filter.month {
        sql.push_str(" AND substr(order_date,1,7)=?");
        params_vec.push(month.clone());
    }
    sql.push_str(" ORDER BY order_date DESC, id DESC");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(params_vec.iter()), from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn filter_from_args(conn: &Connection, sub: &clap::ArgMatches) -> Result<OrderFilter> {
    Ok(OrderFilter {
        status: opt_arg(sub, "status")
            .map(|s| s.parse::<OrderStatus>())
            .transpose()?,
        customer_id: opt_arg(sub, "customer")
            .map(|c| resolve_customer(conn, &c))
            .transpose()?,
        month: opt_arg(sub, "month").map(|m| parse_month(&m)).transpose()?,
        limit: sub.get_one::<usize>("limit").copied(),
    })
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let data = query_rows(conn, &filter_from_args(conn, sub)?)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let mut rows = Vec::new();
        for o in data {
            let customer = name_of(conn, "customers", &o.customer_id)?
                .unwrap_or_else(|| format!("? {}", o.customer_id));
            rows.push(vec![
                o.id,
                o.order_date.to_string(),
                customer,
                o.mode.to_string(),
                format!("{} -> {}", o.origin, o.destination),
                o.status.to_string(),
                fmt_money(&o.estimated_cost),
                fmt_money(&o.selling_price),
                o.currency,
            ]);
        }
        println!(
            "{}",
            pretty_table(
                &[
                    "ID", "Date", "Customer", "Mode", "Route", "Status", "Est. Cost", "Price",
                    "CCY"
                ],
                rows
            )
        );
    }
    Ok(())
}

/// An order with everything booked against it.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    pub order: SalesOrder,
    pub customer_name: Option<String>,
    pub selling_costs: Vec<SellingCost>,
    pub operational_costs: Vec<OperationalCost>,
    pub purchase_orders: Vec<PurchaseOrder>,
    pub landed_cost: Option<LandedCost>,
    pub actual_cost: Decimal,
    pub gross_profit: Decimal,
    pub margin_pct: Decimal,
}

/// Gross profit against booked operational costs, falling back to the
/// estimate while nothing has been booked.
pub fn profit(
    selling_price: Decimal,
    estimated: Decimal,
    booked: Decimal,
    has_booked: bool,
) -> (Decimal, Decimal, Decimal) {
    let cost = if has_booked { booked } else { estimated };
    let profit = selling_price - cost;
    let margin = if selling_price.is_zero() {
        Decimal::ZERO
    } else {
        round_money(profit / selling_price * Decimal::ONE_HUNDRED)
    };
    (cost, profit, margin)
}

pub fn detail(conn: &Connection, id: &str) -> Result<OrderDetail> {
    let order = get(conn, id)?;
    let customer_name = name_of(conn, "customers", &order.customer_id)?;
    let selling_costs = costs::selling_for(conn, &order.id)?;
    let operational_costs = costs::operational_for(conn, &order.id)?;
    let purchase_orders = purchases::query_rows(
        conn,
        &purchases::PurchaseFilter {
            sales_order_id: Some(order.id.clone()),
            ..Default::default()
        },
    )?;
    let landed_cost = match (&order.hs_code, order.cif_value) {
        (Some(code), Some(cif)) => {
            let hs = hs_codes::get(conn, code)
                .with_context(|| format!("HS code of order {}", order.id))?;
            Some(LandedCost::compute(cif, &hs.rates()))
        }
        _ => None,
    };
    let booked: Decimal = operational_costs.iter().map(|c| c.amount).sum();
    let (actual_cost, gross_profit, margin_pct) = profit(
        order.selling_price,
        order.estimated_cost,
        booked,
        !operational_costs.is_empty(),
    );
    Ok(OrderDetail {
        order,
        customer_name,
        selling_costs,
        operational_costs,
        purchase_orders,
        landed_cost,
        actual_cost,
        gross_profit,
        margin_pct,
    })
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let d = detail(conn, arg(sub, "key")?)?;
    if maybe_print_json(json_flag, jsonl_flag, &d)? {
        return Ok(());
    }
    let o = &d.order;
    let rows = vec![
        vec!["ID".into(), o.id.clone()],
        vec![
            "Customer".into(),
            d.customer_name.clone().unwrap_or_else(|| o.customer_id.clone()),
        ],
        vec!["Date".into(), o.order_date.to_string()],
        vec!["Status".into(), o.status.to_string()],
        vec!["Mode".into(), o.mode.to_string()],
        vec!["Route".into(), format!("{} -> {}", o.origin, o.destination)],
        vec!["Cargo".into(), o.cargo.clone()],
        vec!["Weight (kg)".into(), o.weight_kg.to_string()],
        vec!["Volume (cbm)".into(), o.volume_cbm.to_string()],
        vec!["HS code".into(), o.hs_code.clone().unwrap_or_default()],
        vec![
            "CIF".into(),
            o.cif_value.map(|c| fmt_money(&c)).unwrap_or_default(),
        ],
        vec!["Estimated cost".into(), fmt_money(&o.estimated_cost)],
        vec!["Selling price".into(), fmt_money(&o.selling_price)],
        vec!["Cost basis".into(), fmt_money(&d.actual_cost)],
        vec!["Gross profit".into(), fmt_money(&d.gross_profit)],
        vec!["Margin %".into(), d.margin_pct.to_string()],
    ];
    println!("{}", pretty_table(&["Field", "Value"], rows));

    if let Some(lc) = &d.landed_cost {
        let rows = vec![
            vec!["CIF".into(), fmt_money(&lc.cif)],
            vec!["Import duty".into(), fmt_money(&lc.duty)],
            vec!["Import VAT".into(), fmt_money(&lc.vat)],
            vec!["Excise".into(), fmt_money(&lc.excise)],
            vec!["Landed cost".into(), fmt_money(&lc.total)],
        ];
        println!("{}", pretty_table(&["Landed cost", "Amount"], rows));
    }
    if !d.selling_costs.is_empty() {
        let rows = d
            .selling_costs
            .iter()
            .map(|c| vec![c.id.clone(), c.description.clone(), fmt_money(&c.amount)])
            .collect();
        println!("{}", pretty_table(&["Selling cost", "Description", "Amount"], rows));
    }
    if !d.operational_costs.is_empty() {
        let rows = d
            .operational_costs
            .iter()
            .map(|c| {
                vec![
                    c.id.clone(),
                    c.date.to_string(),
                    c.category.clone(),
                    c.description.clone(),
                    fmt_money(&c.amount),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Operational cost", "Date", "Category", "Description", "Amount"],
                rows
            )
        );
    }
    if !d.purchase_orders.is_empty() {
        let rows = d
            .purchase_orders
            .iter()
            .map(|p| {
                vec![
                    p.id.clone(),
                    p.description.clone(),
                    p.status.to_string(),
                    fmt_money(&p.amount),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Purchase order", "Description", "Status", "Amount"], rows)
        );
    }
    Ok(())
}

pub fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<SalesOrder> {
    let current = get(conn, arg(sub, "key")?)?;
    if !matches!(current.status, OrderStatus::Draft | OrderStatus::Confirmed) {
        return Err(AppError::InvalidState(format!(
            "sales order {} is {} and can no longer be edited",
            current.id, current.status
        ))
        .into());
    }
    let mode = match opt_arg(sub, "mode") {
        Some(m) => m.parse::<ShipmentMode>()?,
        None => current.mode,
    };
    let next = SalesOrder {
        mode,
        origin: opt_arg(sub, "origin").unwrap_or_else(|| current.origin.clone()),
        destination: opt_arg(sub, "destination").unwrap_or_else(|| current.destination.clone()),
        cargo: opt_arg(sub, "cargo").unwrap_or_else(|| current.cargo.clone()),
        weight_kg: opt_decimal(sub, "weight")?.unwrap_or(current.weight_kg),
        volume_cbm: opt_decimal(sub, "volume")?.unwrap_or(current.volume_cbm),
        hs_code: crate::utils::patch_opt(sub, "hs-code", current.hs_code.clone()),
        cif_value: crate::utils::patch_decimal(sub, "cif", current.cif_value)?,
        estimated_cost: opt_decimal(sub, "cost")?.unwrap_or(current.estimated_cost),
        selling_price: opt_decimal(sub, "price")?.unwrap_or(current.selling_price),
        ..current
    };
    validate(conn, &next)?;
    conn.execute(
        "UPDATE sales_orders SET mode=?2, origin=?3, destination=?4, cargo=?5, weight_kg=?6,
            volume_cbm=?7, hs_code=?8, cif_value=?9, estimated_cost=?10, selling_price=?11,
            updated_at=datetime('now')
         WHERE id=?1",
        params![
            next.id,
            next.mode.as_str(),
            next.origin,
            next.destination,
            next.cargo,
            next.weight_kg.to_string(),
            next.volume_cbm.to_string(),
            next.hs_code,
            next.cif_value.map(|d| d.to_string()),
            next.estimated_cost.to_string(),
            next.selling_price.to_string()
        ],
    )?;
    tracing::info!(id = %next.id, "sales order updated");
    Ok(next)
}

pub fn set_status(conn: &Connection, id: &str, to: OrderStatus) -> Result<SalesOrder> {
    let mut order = get(conn, id)?;
    if !order.status.can_transition_to(to) {
        return Err(AppError::InvalidTransition {
            entity: "sales order",
            from: order.status.to_string(),
            to: to.to_string(),
        }
        .into());
    }
    conn.execute(
        "UPDATE sales_orders SET status=?2, updated_at=datetime('now') WHERE id=?1",
        params![order.id, to.as_str()],
    )?;
    tracing::info!(id = %order.id, from = %order.status, to = %to, "sales order status changed");
    order.status = to;
    Ok(order)
}

/// Deletes the order with its costs; refused while invoices or purchase orders point at it.
pub fn remove(conn: &Connection, id: &str) -> Result<String> {
    let id = require_order(conn, id)?;
    ensure_unreferenced(
        conn,
        "sales order",
        &id,
        &[
            ("invoices", "sales_order_id", "invoices"),
            ("purchase_orders", "sales_order_id", "purchase orders"),
        ],
    )?;
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "DELETE FROM operational_costs WHERE sales_order_id=?1",
        params![id],
    )?;
    tx.execute("DELETE FROM selling_costs WHERE sales_order_id=?1", params![id])?;
    tx.execute("DELETE FROM sales_orders WHERE id=?1", params![id])?;
    tx.commit()?;
    tracing::info!(id = %id, "sales order removed");
    Ok(id)
}
