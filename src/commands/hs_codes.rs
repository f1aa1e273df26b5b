// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::duty::{cif_from_components, DutyRates, LandedCost};
use crate::error::AppError;
use crate::models::HsCode;
use crate::settings;
use crate::utils::{
    arg, dec_col, ensure_unreferenced, fmt_money, json_flags, map_unique_violation,
    maybe_print_json, opt_arg, opt_decimal, parse_decimal, pretty_table,
};
use crate::validation::Validator;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let hs = add(conn, sub)?;
            println!(
                "Added HS {} '{}' (duty {}%, VAT {}%, excise {}%)",
                hs.code, hs.description, hs.duty_rate, hs.vat_rate, hs.excise_rate
            );
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => {
            let (json_flag, jsonl_flag) = json_flags(sub);
            let hs = get(conn, arg(sub, "key")?)?;
            if !maybe_print_json(json_flag, jsonl_flag, &hs)? {
                print_codes(vec![hs]);
            }
        }
        Some(("update", sub)) => {
            let hs = update(conn, sub)?;
            println!("Updated HS {}", hs.code);
        }
        Some(("rm", sub)) => {
            let code = arg(sub, "key")?;
            remove(conn, code)?;
            println!("Removed HS {}", code);
        }
        Some(("calc", sub)) => calc(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn from_row(r: &Row<'_>) -> rusqlite::Result<HsCode> {
    Ok(HsCode {
        code: r.get(0)?,
        description: r.get(1)?,
        duty_rate: dec_col(r, 2)?,
        vat_rate: dec_col(r, 3)?,
        excise_rate: dec_col(r, 4)?,
    })
}

fn validate(hs: &HsCode) -> Result<()> {
    Validator::new()
        .hs_code("code", &hs.code)
        .required("description", &hs.description)
        .percentage("duty", hs.duty_rate)
        .percentage("vat", hs.vat_rate)
        .percentage("excise", hs.excise_rate)
        .finish()?;
    Ok(())
}

pub fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<HsCode> {
    let vat_rate = match opt_decimal(sub, "vat")? {
        Some(v) => v,
        None => settings::vat_rate(conn)?,
    };
    let hs = HsCode {
        code: arg(sub, "code")?.to_string(),
        description: arg(sub, "description")?.to_string(),
        duty_rate: parse_decimal(arg(sub, "duty")?)?,
        vat_rate,
        excise_rate: parse_decimal(arg(sub, "excise")?)?,
    };
    validate(&hs)?;
    conn.execute(
        "INSERT INTO hs_codes(code, description, duty_rate, vat_rate, excise_rate)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            hs.code,
            hs.description,
            hs.duty_rate.to_string(),
            hs.vat_rate.to_string(),
            hs.excise_rate.to_string()
        ],
    )
    .map_err(|e| map_unique_violation(e, "HS code", &hs.code))?;
    tracing::info!(code = %hs.code, "hs code created");
    Ok(hs)
}

pub fn find(conn: &Connection, code: &str) -> Result<Option<HsCode>> {
    Ok(conn
        .query_row(
            "SELECT code, description, duty_rate, vat_rate, excise_rate FROM hs_codes WHERE code=?1",
            params![code.trim()],
            from_row,
        )
        .optional()?)
}

pub fn get(conn: &Connection, code: &str) -> Result<HsCode> {
    find(conn, code)?.ok_or_else(|| AppError::not_found("HS code", code.trim()).into())
}

pub fn query_rows(conn: &Connection, search: Option<&str>) -> Result<Vec<HsCode>> {
    let mut sql =
        String::from("SELECT code, description, duty_rate, vat_rate, excise_rate FROM hs_codes");
    if search.is_some() {
        sql.push_str(" WHERE code LIKE ?1 || '%' OR lower(description) LIKE '%' || ?2 || '%'");
    }
    sql.push_str(" ORDER BY code");
    let mut stmt = conn.prepare(&sql)?;
    let rows = match search {
        Some(s) => stmt
            .query_map(params![s, s.to_lowercase()], from_row)?
            .collect::<Result<Vec<_>, _>>()?,
        None => stmt.query_map([], from_row)?.collect::<Result<Vec<_>, _>>()?,
    };
    Ok(rows)
}

fn print_codes(codes: Vec<HsCode>) {
    let rows = codes
        .into_iter()
        .map(|h| {
            vec![
                h.code,
                h.description,
                h.duty_rate.to_string(),
                h.vat_rate.to_string(),
                h.excise_rate.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Code", "Description", "Duty %", "VAT %", "Excise %"], rows)
    );
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let data = query_rows(conn, opt_arg(sub, "search").as_deref())?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        print_codes(data);
    }
    Ok(())
}

pub fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<HsCode> {
    let current = get(conn, arg(sub, "key")?)?;
    let next = HsCode {
        description: opt_arg(sub, "description").unwrap_or_else(|| current.description.clone()),
        duty_rate: opt_decimal(sub, "duty")?.unwrap_or(current.duty_rate),
        vat_rate: opt_decimal(sub, "vat")?.unwrap_or(current.vat_rate),
        excise_rate: opt_decimal(sub, "excise")?.unwrap_or(current.excise_rate),
        ..current
    };
    validate(&next)?;
    conn.execute(
        "UPDATE hs_codes SET description=?2, duty_rate=?3, vat_rate=?4, excise_rate=?5,
         updated_at=datetime('now') WHERE code=?1",
        params![
            next.code,
            next.description,
            next.duty_rate.to_string(),
            next.vat_rate.to_string(),
            next.excise_rate.to_string()
        ],
    )?;
    tracing::info!(code = %next.code, "hs code updated");
    Ok(next)
}

pub fn remove(conn: &Connection, code: &str) -> Result<()> {
    let hs = get(conn, code)?;
    ensure_unreferenced(
        conn,
        "HS code",
        &hs.code,
        &[("sales_orders", "hs_code", "sales orders")],
    )?;
    conn.execute("DELETE FROM hs_codes WHERE code=?1", params![hs.code])?;
    tracing::info!(code = %hs.code, "hs code removed");
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct DutyQuote {
    pub code: String,
    pub description: String,
    pub rates: DutyRates,
    pub landed: LandedCost,
}

pub fn quote(conn: &Connection, sub: &clap::ArgMatches) -> Result<DutyQuote> {
    let hs = get(conn, arg(sub, "code")?)?;
    let cif = match opt_decimal(sub, "cif")? {
        Some(cif) => cif,
        None => {
            let fob = opt_decimal(sub, "fob")?.ok_or_else(|| {
                AppError::validation("cif", "provide --cif or --fob [--insurance] [--freight]")
            })?;
            let insurance = opt_decimal(sub, "insurance")?.unwrap_or(Decimal::ZERO);
            let freight = opt_decimal(sub, "freight")?.unwrap_or(Decimal::ZERO);
            Validator::new()
                .non_negative("fob", fob)
                .non_negative("insurance", insurance)
                .non_negative("freight", freight)
                .finish()?;
            cif_from_components(fob, insurance, freight)
        }
    };
    Validator::new().non_negative("cif", cif).finish()?;
    let rates = hs.rates();
    Ok(DutyQuote {
        landed: LandedCost::compute(cif, &rates),
        code: hs.code,
        description: hs.description,
        rates,
    })
}

fn calc(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let q = quote(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &q)? {
        let ccy = settings::base_currency(conn)?;
        let lc = &q.landed;
        let rows = vec![
            vec!["CIF".into(), String::new(), fmt_money(&lc.cif)],
            vec![
                "Import duty".into(),
                format!("{}%", q.rates.duty),
                fmt_money(&lc.duty),
            ],
            vec![
                "Import VAT".into(),
                format!("{}%", q.rates.vat),
                fmt_money(&lc.vat),
            ],
            vec![
                "Excise".into(),
                format!("{}%", q.rates.excise),
                fmt_money(&lc.excise),
            ],
            vec!["Landed cost".into(), String::new(), fmt_money(&lc.total)],
        ];
        println!("HS {} {} ({})", q.code, q.description, ccy);
        println!("{}", pretty_table(&["Component", "Rate", "Amount"], rows));
    }
    Ok(())
}
