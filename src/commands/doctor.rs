// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{invoices, orders};
use crate::models::OrderStatus;
use crate::utils::{pretty_table, today};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: &'static str,
    pub detail: String,
}

/// (kind, query returning (row id, dangling key)).
const DANGLING: &[(&str, &str)] = &[
    (
        "order_missing_customer",
        "SELECT o.id, o.customer_id FROM sales_orders o
         LEFT JOIN customers c ON c.id=o.customer_id WHERE c.id IS NULL",
    ),
    (
        "order_missing_hs_code",
        "SELECT o.id, o.hs_code FROM sales_orders o
         LEFT JOIN hs_codes h ON h.code=o.hs_code
         WHERE o.hs_code IS NOT NULL AND h.code IS NULL",
    ),
    (
        "po_missing_vendor",
        "SELECT p.id, p.vendor_id FROM purchase_orders p
         LEFT JOIN vendors v ON v.id=p.vendor_id WHERE v.id IS NULL",
    ),
    (
        "po_missing_order",
        "SELECT p.id, p.sales_order_id FROM purchase_orders p
         LEFT JOIN sales_orders o ON o.id=p.sales_order_id
         WHERE p.sales_order_id IS NOT NULL AND o.id IS NULL",
    ),
    (
        "cost_missing_order",
        "SELECT c.id, c.sales_order_id FROM operational_costs c
         LEFT JOIN sales_orders o ON o.id=c.sales_order_id WHERE o.id IS NULL
         UNION ALL
         SELECT c.id, c.sales_order_id FROM selling_costs c
         LEFT JOIN sales_orders o ON o.id=c.sales_order_id WHERE o.id IS NULL",
    ),
    (
        "cost_missing_vendor",
        "SELECT c.id, c.vendor_id FROM operational_costs c
         LEFT JOIN vendors v ON v.id=c.vendor_id
         WHERE c.vendor_id IS NOT NULL AND v.id IS NULL",
    ),
    (
        "invoice_missing_customer",
        "SELECT i.number, i.customer_id FROM invoices i
         LEFT JOIN customers c ON c.id=i.customer_id WHERE c.id IS NULL",
    ),
];

pub fn check(conn: &Connection) -> Result<Vec<Issue>> {
    let mut issues = Vec::new();

    for &(kind, sql) in DANGLING {
        let mut stmt = conn.prepare(sql)?;
        let mut cur = stmt.query([])?;
        while let Some(r) = cur.next()? {
            let id: String = r.get(0)?;
            let key: String = r.get(1)?;
            issues.push(Issue {
                kind,
                detail: format!("{} -> {}", id, key),
            });
        }
    }

    let all = invoices::query_rows(
        conn,
        &invoices::InvoiceFilter {
            status: None,
            customer_id: None,
            month: None,
            as_of: today(),
        },
    )?;
    for inv in all {
        let items = invoices::items(conn, &inv.id)?;
        let stored = invoices::InvoiceTotals {
            subtotal: inv.subtotal,
            tax_rate: inv.tax_rate,
            tax_amount: inv.tax_amount,
            total: inv.total,
        };
        if let Err(e) = stored.verify(&items) {
            issues.push(Issue {
                kind: "invoice_totals_mismatch",
                detail: format!("{}: {}", inv.number, e),
            });
        }
    }

    for o in orders::query_rows(conn, &orders::OrderFilter::default())? {
        if o.status != OrderStatus::Cancelled && o.selling_price <= o.estimated_cost {
            issues.push(Issue {
                kind: "order_not_profitable",
                detail: format!(
                    "{}: price {} <= estimated cost {}",
                    o.id, o.selling_price, o.estimated_cost
                ),
            });
        }
    }

    Ok(issues)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let issues = check(conn)?;
    if issues.is_empty() {
        println!("doctor: no issues found");
    } else {
        tracing::warn!(count = issues.len(), "doctor found issues");
        let rows = issues
            .into_iter()
            .map(|i| vec![i.kind.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
