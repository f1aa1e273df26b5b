// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::ArgMatches;
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use crate::duty::round_money;
use crate::error::AppError;

static ID_SEQ: AtomicU32 = AtomicU32::new(0);

/// `<PREFIX>-<unix millis>-<seq>`; the sequence keeps ids minted in the same
/// millisecond apart.
pub fn generate_id(prefix: &str) -> String {
    let seq = ID_SEQ.fetch_add(1, Ordering::Relaxed) % 1000;
    format!("{}-{}-{:03}", prefix, Utc::now().timestamp_millis(), seq)
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_month(s: &str) -> Result<String> {
    let s = s.trim();
    NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok(s.to_string())
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Two decimals, half away from zero.
pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", round_money(*d))
}

/// Required argument, trimmed.
pub fn arg<'a>(m: &'a ArgMatches, name: &str) -> Result<&'a str> {
    m.get_one::<String>(name)
        .map(|s| s.trim())
        .with_context(|| format!("Missing required argument --{}", name))
}

/// Optional argument, trimmed; empty strings count as absent.
pub fn opt_arg(m: &ArgMatches, name: &str) -> Option<String> {
    m.get_one::<String>(name)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Update semantics for optional text: absent keeps `current`, empty clears.
pub fn patch_opt(m: &ArgMatches, name: &str, current: Option<String>) -> Option<String> {
    match m.get_one::<String>(name).map(|s| s.trim()) {
        Some("") => None,
        Some(v) => Some(v.to_string()),
        None => current,
    }
}

pub fn opt_decimal(m: &ArgMatches, name: &str) -> Result<Option<Decimal>> {
    opt_arg(m, name).map(|s| parse_decimal(&s)).transpose()
}

/// Like [`patch_opt`] for decimals: absent keeps `current`, empty clears.
pub fn patch_decimal(
    m: &ArgMatches,
    name: &str,
    current: Option<Decimal>,
) -> Result<Option<Decimal>> {
    match m.get_one::<String>(name).map(|s| s.trim()) {
        Some("") => Ok(None),
        Some(v) => parse_decimal(v).map(Some),
        None => Ok(current),
    }
}

pub fn opt_date(m: &ArgMatches, name: &str) -> Result<Option<NaiveDate>> {
    opt_arg(m, name).map(|s| parse_date(&s)).transpose()
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

pub fn json_flags(m: &ArgMatches) -> (bool, bool) {
    (m.get_flag("json"), m.get_flag("jsonl"))
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

/// Money and rate columns are stored as decimal text.
pub fn dec_col(r: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = r.get(idx)?;
    s.parse::<Decimal>().map_err(|e| conversion_error(idx, e))
}

pub fn opt_dec_col(r: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    let s: Option<String> = r.get(idx)?;
    s.map(|s| s.parse::<Decimal>().map_err(|e| conversion_error(idx, e)))
        .transpose()
}

pub fn date_col(r: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let s: String = r.get(idx)?;
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| conversion_error(idx, e))
}

pub fn enum_col<T>(r: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = AppError>,
{
    let s: String = r.get(idx)?;
    s.parse::<T>().map_err(|e| conversion_error(idx, e))
}

fn lookup(conn: &Connection, sql: &str, key: &str, entity: &'static str) -> Result<String> {
    let id: Option<String> = conn
        .query_row(sql, params![key], |r| r.get(0))
        .optional()?;
    id.ok_or_else(|| AppError::not_found(entity, key).into())
}

/// Customer id from either its id or its exact name.
pub fn resolve_customer(conn: &Connection, key: &str) -> Result<String> {
    lookup(
        conn,
        "SELECT id FROM customers WHERE id=?1 OR name=?1",
        key.trim(),
        "customer",
    )
}

pub fn resolve_vendor(conn: &Connection, key: &str) -> Result<String> {
    lookup(
        conn,
        "SELECT id FROM vendors WHERE id=?1 OR name=?1",
        key.trim(),
        "vendor",
    )
}

pub fn require_order(conn: &Connection, id: &str) -> Result<String> {
    lookup(
        conn,
        "SELECT id FROM sales_orders WHERE id=?1",
        id.trim(),
        "sales order",
    )
}

pub fn require_hs_code(conn: &Connection, code: &str) -> Result<String> {
    lookup(
        conn,
        "SELECT code FROM hs_codes WHERE code=?1",
        code.trim(),
        "HS code",
    )
}

pub fn name_of(conn: &Connection, table: &str, id: &str) -> Result<Option<String>> {
    let sql = format!("SELECT name FROM {} WHERE id=?1", table);
    Ok(conn.query_row(&sql, params![id], |r| r.get(0)).optional()?)
}

/// Rows of `table` whose `column` equals `value`.
pub fn count_refs(conn: &Connection, table: &str, column: &str, value: &str) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE {}=?1", table, column);
    Ok(conn.query_row(&sql, params![value], |r| r.get(0))?)
}

/// Refuses a delete while other rows point at the entity.
pub fn ensure_unreferenced(
    conn: &Connection,
    entity: &'static str,
    key: &str,
    refs: &[(&str, &str, &'static str)],
) -> Result<()> {
    for (table, column, referrer) in refs {
        let count = count_refs(conn, table, column, key)?;
        if count > 0 {
            return Err(AppError::InUse {
                entity,
                key: key.to_string(),
                count,
                referrer: *referrer,
            }
            .into());
        }
    }
    Ok(())
}

pub fn map_unique_violation(err: rusqlite::Error, entity: &'static str, key: &str) -> anyhow::Error {
    if let rusqlite::Error::SqliteFailure(e, _) = &err {
        if e.code == rusqlite::ErrorCode::ConstraintViolation {
            return AppError::Duplicate {
                entity,
                key: key.to_string(),
            }
            .into();
        }
    }
    AppError::Storage(err).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_prefixed_and_distinct() {
        let a = generate_id("CUS");
        let b = generate_id("CUS");
        assert!(a.starts_with("CUS-"));
        assert_ne!(a, b);
    }

    #[test]
    fn money_is_rounded_not_truncated() {
        let d = |s: &str| Decimal::from_str_exact(s).unwrap();
        assert_eq!(fmt_money(&d("100.999")), "101.00");
        assert_eq!(fmt_money(&d("2.675")), "2.68");
        assert_eq!(fmt_money(&d("-2.675")), "-2.68");
        assert_eq!(fmt_money(&d("4500000")), "4500000.00");
    }

    #[test]
    fn month_validation() {
        assert_eq!(parse_month(" 2025-02 ").unwrap(), "2025-02");
        assert!(parse_month("2025-13").is_err());
    }
}
