// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::str::FromStr;

use crate::commands::{customers, invoices, orders, vendors};
use crate::error::AppError;
use crate::utils::{arg, today};
use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
}

impl FromStr for Format {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            other => Err(AppError::validation(
                "format",
                format!("unknown format '{}' (use csv|json)", other),
            )),
        }
    }
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let Some((target, sub)) = m.subcommand() else {
        return Ok(());
    };
    let format = arg(sub, "format")?.parse::<Format>()?;
    let out = arg(sub, "out")?;
    let n = export(conn, target, format, out)?;
    println!("Exported {} {} to {}", n, target, out);
    Ok(())
}

/// Writes one entity table to `out`, returning the number of records.
pub fn export(conn: &Connection, target: &str, format: Format, out: &str) -> Result<usize> {
    let n = match target {
        "customers" => {
            let rows = customers::query_rows(conn, None)?;
            let table = rows
                .iter()
                .map(|c| {
                    vec![
                        c.id.clone(),
                        c.name.clone(),
                        c.email.clone().unwrap_or_default(),
                        c.phone.clone().unwrap_or_default(),
                        c.npwp.clone().unwrap_or_default(),
                        c.address.clone().unwrap_or_default(),
                        c.contact_person.clone().unwrap_or_default(),
                    ]
                })
                .collect();
            write(
                format,
                out,
                &["id", "name", "email", "phone", "npwp", "address", "contact_person"],
                table,
                &rows,
            )?
        }
        "vendors" => {
            let rows = vendors::query_rows(conn, None)?;
            let table = rows
                .iter()
                .map(|v| {
                    vec![
                        v.id.clone(),
                        v.name.clone(),
                        v.service_type.clone().unwrap_or_default(),
                        v.email.clone().unwrap_or_default(),
                        v.phone.clone().unwrap_or_default(),
                        v.npwp.clone().unwrap_or_default(),
                        v.address.clone().unwrap_or_default(),
                    ]
                })
                .collect();
            write(
                format,
                out,
                &["id", "name", "service_type", "email", "phone", "npwp", "address"],
                table,
                &rows,
            )?
        }
        "orders" => {
            let rows = orders::query_rows(conn, &orders::OrderFilter::default())?;
            let table = rows
                .iter()
                .map(|o| {
                    vec![
                        o.id.clone(),
                        o.customer_id.clone(),
                        o.order_date.to_string(),
                        o.mode.to_string(),
                        o.origin.clone(),
                        o.destination.clone(),
                        o.cargo.clone(),
                        o.weight_kg.to_string(),
                        o.volume_cbm.to_string(),
                        o.hs_code.clone().unwrap_or_default(),
                        o.cif_value.map(|v| v.to_string()).unwrap_or_default(),
                        o.currency.clone(),
                        o.estimated_cost.to_string(),
                        o.selling_price.to_string(),
                        o.status.to_string(),
                    ]
                })
                .collect();
            write(
                format,
                out,
                &[
                    "id",
                    "customer_id",
                    "order_date",
                    "mode",
                    "origin",
                    "destination",
                    "cargo",
                    "weight_kg",
                    "volume_cbm",
                    "hs_code",
                    "cif_value",
                    "currency",
                    "estimated_cost",
                    "selling_price",
                    "status",
                ],
                table,
                &rows,
            )?
        }
        "invoices" => {
            let rows = invoices::query_rows(
                conn,
                &invoices::InvoiceFilter {
                    status: None,
                    customer_id: None,
                    month: None,
                    as_of: today(),
                },
            )?;
            let table = rows
                .iter()
                .map(|i| {
                    vec![
                        i.number.clone(),
                        i.customer_id.clone(),
                        i.sales_order_id.clone().unwrap_or_default(),
                        i.issue_date.to_string(),
                        i.due_date.to_string(),
                        i.subtotal.to_string(),
                        i.tax_rate.to_string(),
                        i.tax_amount.to_string(),
                        i.total.to_string(),
                        i.status.to_string(),
                    ]
                })
                .collect();
            write(
                format,
                out,
                &[
                    "number",
                    "customer_id",
                    "sales_order_id",
                    "issue_date",
                    "due_date",
                    "subtotal",
                    "tax_rate",
                    "tax_amount",
                    "total",
                    "status",
                ],
                table,
                &rows,
            )?
        }
        other => {
            return Err(AppError::validation(
                "target",
                format!("nothing to export for '{}'", other),
            )
            .into())
        }
    };
    tracing::info!(entity = target, out, records = n, "export written");
    Ok(n)
}

fn write<T: Serialize>(
    format: Format,
    out: &str,
    header: &[&str],
    table: Vec<Vec<String>>,
    records: &[T],
) -> Result<usize> {
    match format {
        Format::Csv => {
            let mut wtr =
                csv::Writer::from_path(out).with_context(|| format!("Create {}", out))?;
            wtr.write_record(header)?;
            for row in &table {
                wtr.write_record(row)?;
            }
            wtr.flush()?;
        }
        Format::Json => {
            std::fs::write(out, serde_json::to_string_pretty(records)?)
                .with_context(|| format!("Write {}", out))?;
        }
    }
    Ok(records.len())
}
