// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Typed access to the `settings` key/value table.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use crate::validation::Validator;

pub const BASE_CURRENCY: &str = "base_currency";
pub const VAT_RATE: &str = "vat_rate";
pub const PAYMENT_TERMS_DAYS: &str = "payment_terms_days";
pub const COMPANY_NAME: &str = "company_name";

/// Known keys with their defaults.
pub const KNOWN: &[(&str, &str)] = &[
    (BASE_CURRENCY, "IDR"),
    (VAT_RATE, "11"),
    (PAYMENT_TERMS_DAYS, "30"),
    (COMPANY_NAME, ""),
];

fn default_for(key: &str) -> Option<&'static str> {
    KNOWN.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

pub fn get(conn: &Connection, key: &str) -> Result<String> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v.or_else(|| default_for(key).map(str::to_string))
        .unwrap_or_default())
}

/// Validates and stores a setting; unknown keys are rejected.
pub fn set(conn: &Connection, key: &str, value: &str) -> Result<String> {
    let key = key.trim();
    let value = value.trim();
    let normalized = match key {
        BASE_CURRENCY => {
            let ccy = value.to_uppercase();
            Validator::new()
                .check(
                    ccy.len() == 3 && ccy.chars().all(|c| c.is_ascii_alphabetic()),
                    key,
                    "must be a 3-letter currency code",
                )
                .finish()?;
            ccy
        }
        VAT_RATE => {
            let rate = crate::utils::parse_decimal(value)?;
            Validator::new().percentage(key, rate).finish()?;
            rate.normalize().to_string()
        }
        PAYMENT_TERMS_DAYS => {
            let days: i64 = value
                .parse()
                .with_context(|| format!("Invalid number of days '{}'", value))?;
            Validator::new()
                .check((0..=365).contains(&days), key, "must be between 0 and 365")
                .finish()?;
            days.to_string()
        }
        COMPANY_NAME => value.to_string(),
        other => {
            return Err(crate::error::AppError::validation(
                "key",
                format!(
                    "unknown setting '{}', expected one of: {}",
                    other,
                    KNOWN.iter().map(|(k, _)| *k).collect::<Vec<_>>().join(", ")
                ),
            )
            .into());
        }
    };
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, normalized],
    )?;
    tracing::info!(key, value = %normalized, "setting updated");
    Ok(normalized)
}

pub fn base_currency(conn: &Connection) -> Result<String> {
    get(conn, BASE_CURRENCY)
}

pub fn vat_rate(conn: &Connection) -> Result<Decimal> {
    let s = get(conn, VAT_RATE)?;
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid stored VAT rate '{}'", s))
}

pub fn payment_terms_days(conn: &Connection) -> Result<i64> {
    let s = get(conn, PAYMENT_TERMS_DAYS)?;
    s.parse::<i64>()
        .with_context(|| format!("Invalid stored payment terms '{}'", s))
}
