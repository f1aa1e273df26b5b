// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::commands::{costs, invoices, orders};
use crate::models::{InvoiceStatus, OrderStatus};
use crate::utils::{
    fmt_money, json_flags, maybe_print_json, name_of, opt_arg, opt_date, parse_month,
    pretty_table, today,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("profit", sub)) => profit_cmd(conn, sub)?,
        Some(("receivables", sub)) => receivables_cmd(conn, sub)?,
        Some(("revenue", sub)) => revenue_cmd(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderProfit {
    pub sales_order_id: String,
    pub customer: String,
    pub order_date: NaiveDate,
    pub status: OrderStatus,
    pub revenue: Decimal,
    pub operational_cost: Decimal,
    pub cost_basis: Decimal,
    pub gross_profit: Decimal,
    pub margin_pct: Decimal,
}

/// Per-order profit for every order that is not cancelled.
pub fn order_profit(conn: &Connection, month: Option<&str>) -> Result<Vec<OrderProfit>> {
    let filter = orders::OrderFilter {
        month: month.map(str::to_string),
        ..Default::default()
    };
    let mut out = Vec::new();
    for o in orders::query_rows(conn, &filter)? {
        if o.status == OrderStatus::Cancelled {
            continue;
        }
        let booked = costs::operational_for(conn, &o.id)
            .with_context(|| format!("Operational costs of {}", o.id))?;
        let operational_cost: Decimal = booked.iter().map(|c| c.amount).sum();
        let (cost_basis, gross_profit, margin_pct) = orders::profit(
            o.selling_price,
            o.estimated_cost,
            operational_cost,
            !booked.is_empty(),
        );
        out.push(OrderProfit {
            customer: name_of(conn, "customers", &o.customer_id)?
                .unwrap_or_else(|| format!("? {}", o.customer_id)),
            sales_order_id: o.id,
            order_date: o.order_date,
            status: o.status,
            revenue: o.selling_price,
            operational_cost,
            cost_basis,
            gross_profit,
            margin_pct,
        });
    }
    Ok(out)
}

fn profit_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let month = opt_arg(sub, "month").map(|m| parse_month(&m)).transpose()?;
    let data = order_profit(conn, month.as_deref())?;
    if maybe_print_json(json_flag, jsonl_flag, &data)? {
        return Ok(());
    }
    let revenue: Decimal = data.iter().map(|p| p.revenue).sum();
    let profit: Decimal = data.iter().map(|p| p.gross_profit).sum();
    let rows = data
        .into_iter()
        .map(|p| {
            vec![
                p.sales_order_id,
                p.order_date.to_string(),
                p.customer,
                p.status.to_string(),
                fmt_money(&p.revenue),
                fmt_money(&p.cost_basis),
                fmt_money(&p.gross_profit),
                format!("{}%", p.margin_pct),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Order", "Date", "Customer", "Status", "Revenue", "Cost", "Profit", "Margin"],
            rows
        )
    );
    println!("Revenue {}  Gross profit {}", fmt_money(&revenue), fmt_money(&profit));
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receivable {
    pub customer_id: String,
    pub customer: String,
    pub invoices: usize,
    pub current: Decimal,
    pub overdue: Decimal,
    pub total: Decimal,
}

/// Open invoice totals per customer as of a date, largest balance first.
pub fn receivables(conn: &Connection, as_of: NaiveDate) -> Result<Vec<Receivable>> {
    let open = invoices::query_rows(
        conn,
        &invoices::InvoiceFilter {
            status: None,
            customer_id: None,
            month: None,
            as_of,
        },
    )?;
    let mut by_customer: BTreeMap<String, Receivable> = BTreeMap::new();
    for inv in open {
        let overdue = match inv.status {
            InvoiceStatus::Unpaid => false,
            InvoiceStatus::Overdue => true,
            _ => continue,
        };
        let entry = match by_customer.entry(inv.customer_id.clone()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(v) => {
                let customer = name_of(conn, "customers", &inv.customer_id)?
                    .unwrap_or_else(|| format!("? {}", inv.customer_id));
                v.insert(Receivable {
                    customer_id: inv.customer_id.clone(),
                    customer,
                    invoices: 0,
                    current: Decimal::ZERO,
                    overdue: Decimal::ZERO,
                    total: Decimal::ZERO,
                })
            }
        };
        entry.invoices += 1;
        if overdue {
            entry.overdue += inv.total;
        } else {
            entry.current += inv.total;
        }
        entry.total += inv.total;
    }
    let mut out: Vec<Receivable> = by_customer.into_values().collect();
    out.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.customer.cmp(&b.customer)));
    Ok(out)
}

fn receivables_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let as_of = opt_date(sub, "as-of")?.unwrap_or_else(today);
    let data = receivables(conn, as_of)?;
    if maybe_print_json(json_flag, jsonl_flag, &data)? {
        return Ok(());
    }
    let rows = data
        .into_iter()
        .map(|r| {
            vec![
                r.customer,
                r.invoices.to_string(),
                fmt_money(&r.current),
                fmt_money(&r.overdue),
                fmt_money(&r.total),
            ]
        })
        .collect();
    println!("Receivables as of {}", as_of);
    println!(
        "{}",
        pretty_table(&["Customer", "Invoices", "Current", "Overdue", "Total"], rows)
    );
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthRevenue {
    pub month: String,
    pub invoiced: Decimal,
    pub paid: Decimal,
    pub outstanding: Decimal,
}

/// Invoiced totals for the latest `months` issue months, newest first.
pub fn revenue(conn: &Connection, months: usize) -> Result<Vec<MonthRevenue>> {
    let mut stmt = conn.prepare(
        "SELECT substr(issue_date,1,7) AS month, status, total
         FROM invoices WHERE status != 'cancelled'",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
        ))
    })?;
    let mut map: BTreeMap<String, MonthRevenue> = BTreeMap::new();
    for row in rows {
        let (month, status, total) = row?;
        let total: Decimal = total
            .parse()
            .with_context(|| format!("Invalid invoice total '{}' in {}", total, month))?;
        let entry = map.entry(month.clone()).or_insert(MonthRevenue {
            month,
            invoiced: Decimal::ZERO,
            paid: Decimal::ZERO,
            outstanding: Decimal::ZERO,
        });
        entry.invoiced += total;
        if status == InvoiceStatus::Paid.as_str() {
            entry.paid += total;
        } else {
            entry.outstanding += total;
        }
    }
    Ok(map.into_values().rev().take(months).collect())
}

fn revenue_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let months: usize = *sub.get_one::<usize>("months").unwrap_or(&12);
    let data = revenue(conn, months)?;
    if maybe_print_json(json_flag, jsonl_flag, &data)? {
        return Ok(());
    }
    let rows = data
        .into_iter()
        .map(|m| {
            vec![
                m.month,
                fmt_money(&m.invoiced),
                fmt_money(&m.paid),
                fmt_money(&m.outstanding),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Month", "Invoiced", "Paid", "Outstanding"], rows)
    );
    Ok(())
}
