// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{costs, hs_codes, orders};
use crate::duty::{round_money, LandedCost};
use crate::error::{AppError, FieldError};
use crate::models::{HsCode, Invoice, InvoiceItem, InvoiceStatus, OrderStatus, SalesOrder, SellingCost};
use crate::settings;
use crate::utils::{
    arg, date_col, dec_col, enum_col, fmt_money, generate_id, json_flags, maybe_print_json,
    name_of, opt_arg, opt_date, opt_decimal, parse_decimal, parse_month, pretty_table,
    resolve_customer, today,
};
use crate::validation::Validator;
use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use serde::Serialize;

const COLUMNS: &str = "id, number, customer_id, sales_order_id, issue_date, due_date, subtotal, \
     tax_rate, tax_amount, total, status, notes";

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("from-order", sub)) => {
            let inv = from_order(
                conn,
                arg(sub, "order")?,
                &InvoiceOptions::from_args(sub)?,
            )?;
            print_created(&inv);
        }
        Some(("add", sub)) => {
            let inv = add(conn, sub)?;
            print_created(&inv);
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("pay", sub)) => {
            let paid_on = opt_date(sub, "date")?.unwrap_or_else(today);
            let inv = pay(conn, arg(sub, "key")?, paid_on)?;
            println!("Invoice {} marked paid on {}", inv.number, paid_on);
        }
        Some(("cancel", sub)) => {
            let inv = cancel(conn, arg(sub, "key")?)?;
            println!("Invoice {} cancelled", inv.number);
        }
        Some(("rm", sub)) => {
            let number = remove(conn, arg(sub, "key")?)?;
            println!("Removed invoice {}", number);
        }
        _ => {}
    }
    Ok(())
}

fn print_created(inv: &Invoice) {
    println!(
        "Issued invoice {} ({}): subtotal {} + tax {} = {}, due {}",
        inv.number,
        inv.id,
        fmt_money(&inv.subtotal),
        fmt_money(&inv.tax_amount),
        fmt_money(&inv.total),
        inv.due_date
    );
}

fn from_row(r: &Row<'_>) -> rusqlite::Result<Invoice> {
    Ok(Invoice {
        id: r.get(0)?,
        number: r.get(1)?,
        customer_id: r.get(2)?,
        sales_order_id: r.get(3)?,
        issue_date: date_col(r, 4)?,
        due_date: date_col(r, 5)?,
        subtotal: dec_col(r, 6)?,
        tax_rate: dec_col(r, 7)?,
        tax_amount: dec_col(r, 8)?,
        total: dec_col(r, 9)?,
        status: enum_col(r, 10)?,
        notes: r.get(11)?,
    })
}

fn item_from_row(r: &Row<'_>) -> rusqlite::Result<InvoiceItem> {
    Ok(InvoiceItem {
        description: r.get(0)?,
        quantity: dec_col(r, 1)?,
        unit_price: dec_col(r, 2)?,
        amount: dec_col(r, 3)?,
        taxable: r.get(4)?,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

impl InvoiceTotals {
    /// Tax applies to taxable lines only; reimbursed duties pass through untaxed.
    pub fn from_items(items: &[InvoiceItem], tax_rate: Decimal) -> Self {
        let subtotal: Decimal = items.iter().map(|i| i.amount).sum();
        let taxable: Decimal = items.iter().filter(|i| i.taxable).map(|i| i.amount).sum();
        let tax_amount = round_money(taxable * tax_rate / Decimal::ONE_HUNDRED);
        InvoiceTotals {
            subtotal,
            tax_rate,
            tax_amount,
            total: subtotal + tax_amount,
        }
    }

    /// Checks stored figures against the line items.
    pub fn verify(&self, items: &[InvoiceItem]) -> Result<(), AppError> {
        let mut errors = Vec::new();
        for (i, item) in items.iter().enumerate() {
            if item.amount != round_money(item.quantity * item.unit_price) {
                errors.push(FieldError::new(
                    format!("items[{}]", i),
                    "amount must equal quantity x unit price",
                ));
            }
        }
        let expected = InvoiceTotals::from_items(items, self.tax_rate);
        if self.subtotal != expected.subtotal {
            errors.push(FieldError::new(
                "subtotal",
                format!(
                    "{} does not equal the sum of item amounts {}",
                    self.subtotal, expected.subtotal
                ),
            ));
        }
        if self.tax_amount != expected.tax_amount {
            errors.push(FieldError::new(
                "tax_amount",
                format!("{} should be {}", self.tax_amount, expected.tax_amount),
            ));
        }
        if self.total != self.subtotal + self.tax_amount {
            errors.push(FieldError::new(
                "total",
                "must equal subtotal plus tax",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors))
        }
    }
}

/// Line items for an order: selling costs (or the selling price as one
/// freight line), plus untaxed reimbursement lines for import taxes.
pub fn items_from_order(
    order: &SalesOrder,
    selling: &[SellingCost],
    hs: Option<&HsCode>,
) -> Vec<InvoiceItem> {
    let mut items: Vec<InvoiceItem> = if selling.is_empty() {
        vec![InvoiceItem::new(
            format!(
                "{} freight {} -> {}: {}",
                order.mode, order.origin, order.destination, order.cargo
            ),
            Decimal::ONE,
            order.selling_price,
            true,
        )]
    } else {
        selling
            .iter()
            .map(|c| InvoiceItem::new(c.description.clone(), Decimal::ONE, c.amount, true))
            .collect()
    };
    if let (Some(hs), Some(cif)) = (hs, order.cif_value) {
        let lc = LandedCost::compute(cif, &hs.rates());
        let lines = [
            (format!("Import duty HS {} ({}%)", hs.code, hs.duty_rate), lc.duty),
            (format!("Import VAT ({}%)", hs.vat_rate), lc.vat),
            (format!("Excise ({}%)", hs.excise_rate), lc.excise),
        ];
        for (desc, amount) in lines {
            if amount > Decimal::ZERO {
                items.push(InvoiceItem::new(desc, Decimal::ONE, amount, false));
            }
        }
    }
    items
}

/// Parses `description|quantity|unit price[|notax]`.
pub fn parse_item(raw: &str) -> Result<InvoiceItem> {
    let parts: Vec<&str> = raw.split('|').map(str::trim).collect();
    if !(3..=4).contains(&parts.len()) {
        return Err(AppError::validation(
            "item",
            format!(
                "'{}' must look like 'description|quantity|unit price[|notax]'",
                raw
            ),
        )
        .into());
    }
    let quantity = parse_decimal(parts[1])?;
    let unit_price = parse_decimal(parts[2])?;
    let taxable = match parts.get(3) {
        None => true,
        Some(flag) if flag.eq_ignore_ascii_case("notax") => false,
        Some(flag) => {
            return Err(AppError::validation(
                "item",
                format!("unknown item flag '{}', expected 'notax'", flag),
            )
            .into())
        }
    };
    Validator::new()
        .required("item.description", parts[0])
        .positive("item.quantity", quantity)
        .non_negative("item.unit_price", unit_price)
        .finish()?;
    Ok(InvoiceItem::new(parts[0], quantity, unit_price, taxable))
}

/// Next `INV-YYYYMM-NNNN` for the month of `issue_date`.
pub fn next_number(conn: &Connection, issue_date: NaiveDate) -> Result<String> {
    let prefix = format!("INV-{}-", issue_date.format("%Y%m"));
    // numeric order, so -10000 sorts after -9999
    let last: Option<String> = conn
        .query_row(
            "SELECT number FROM invoices WHERE number LIKE ?1 || '%'
             ORDER BY CAST(substr(number, length(?1) + 1) AS INTEGER) DESC LIMIT 1",
            params![prefix],
            |r| r.get(0),
        )
        .optional()?;
    let seq = match last {
        Some(n) => {
            n[prefix.len()..]
                .parse::<u32>()
                .with_context(|| format!("Invalid invoice number '{}'", n))?
                + 1
        }
        None => 1,
    };
    Ok(format!("{}{:04}", prefix, seq))
}

#[derive(Debug, Default, Clone)]
pub struct InvoiceOptions {
    pub issue_date: Option<NaiveDate>,
    pub tax_rate: Option<Decimal>,
    pub notes: Option<String>,
}

impl InvoiceOptions {
    pub fn from_args(sub: &clap::ArgMatches) -> Result<Self> {
        Ok(InvoiceOptions {
            issue_date: opt_date(sub, "date")?,
            tax_rate: opt_decimal(sub, "tax-rate")?,
            notes: opt_arg(sub, "notes"),
        })
    }
}

fn insert(
    conn: &Connection,
    customer_id: &str,
    sales_order_id: Option<&str>,
    items: &[InvoiceItem],
    opts: &InvoiceOptions,
) -> Result<Invoice> {
    if items.is_empty() {
        return Err(AppError::validation("items", "an invoice needs at least one item").into());
    }
    let tax_rate = match opts.tax_rate {
        Some(r) => r,
        None => settings::vat_rate(conn)?,
    };
    Validator::new().percentage("tax-rate", tax_rate).finish()?;
    let issue_date = opts.issue_date.unwrap_or_else(today);
    let due_date = issue_date + Duration::days(settings::payment_terms_days(conn)?);
    let totals = InvoiceTotals::from_items(items, tax_rate);
    totals.verify(items)?;

    let tx = conn.unchecked_transaction()?;
    let invoice = Invoice {
        id: generate_id("INV"),
        number: next_number(&tx, issue_date)?,
        customer_id: customer_id.to_string(),
        sales_order_id: sales_order_id.map(str::to_string),
        issue_date,
        due_date,
        subtotal: totals.subtotal,
        tax_rate: totals.tax_rate,
        tax_amount: totals.tax_amount,
        total: totals.total,
        status: InvoiceStatus::Unpaid,
        notes: opts.notes.clone(),
    };
    tx.execute(
        "INSERT INTO invoices(id, number, customer_id, sales_order_id, issue_date, due_date,
            subtotal, tax_rate, tax_amount, total, status, notes)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)",
        params![
            invoice.id,
            invoice.number,
            invoice.customer_id,
            invoice.sales_order_id,
            invoice.issue_date.to_string(),
            invoice.due_date.to_string(),
            invoice.subtotal.to_string(),
            invoice.tax_rate.to_string(),
            invoice.tax_amount.to_string(),
            invoice.total.to_string(),
            invoice.status.as_str(),
            invoice.notes
        ],
    )?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO invoice_items(invoice_id, description, quantity, unit_price, amount, taxable)
             VALUES (?1,?2,?3,?4,?5,?6)",
        )?;
        for item in items {
            stmt.execute(params![
                invoice.id,
                item.description,
                item.quantity.to_string(),
                item.unit_price.to_string(),
                item.amount.to_string(),
                item.taxable
            ])?;
        }
    }
    tx.commit()?;
    tracing::info!(
        id = %invoice.id,
        number = %invoice.number,
        total = %invoice.total,
        "invoice issued"
    );
    Ok(invoice)
}

/// An order is billable while confirmed, in transit or delivered, and only
/// until it carries a non-cancelled invoice.
fn ensure_billable(conn: &Connection, order: &SalesOrder) -> Result<()> {
    if matches!(order.status, OrderStatus::Draft | OrderStatus::Cancelled) {
        return Err(AppError::InvalidState(format!(
            "sales order {} is {} and cannot be invoiced",
            order.id, order.status
        ))
        .into());
    }
    let existing: Option<String> = conn
        .query_row(
            "SELECT number FROM invoices WHERE sales_order_id=?1 AND status!='cancelled' LIMIT 1",
            params![order.id],
            |r| r.get(0),
        )
        .optional()?;
    if let Some(number) = existing {
        return Err(AppError::InvalidState(format!(
            "sales order {} is already billed on invoice {}",
            order.id, number
        ))
        .into());
    }
    Ok(())
}

pub fn from_order(conn: &Connection, order_id: &str, opts: &InvoiceOptions) -> Result<Invoice> {
    let order = orders::get(conn, order_id)?;
    ensure_billable(conn, &order)?;
    let selling = costs::selling_for(conn, &order.id)?;
    let hs = match &order.hs_code {
        Some(code) => Some(hs_codes::get(conn, code)?),
        None => None,
    };
    let items = items_from_order(&order, &selling, hs.as_ref());
    insert(conn, &order.customer_id, Some(&order.id), &items, opts)
}

/// Manual invoice. With `--order` the order must be billable and belong to
/// the invoiced customer.
pub fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<Invoice> {
    let customer_id = resolve_customer(conn, arg(sub, "customer")?)?;
    let order = opt_arg(sub, "order")
        .map(|o| orders::get(conn, &o))
        .transpose()?;
    if let Some(order) = &order {
        if order.customer_id != customer_id {
            return Err(AppError::validation(
                "order",
                format!(
                    "sales order {} belongs to customer {}, not {}",
                    order.id, order.customer_id, customer_id
                ),
            )
            .into());
        }
        ensure_billable(conn, order)?;
    }
    let items = sub
        .get_many::<String>("item")
        .into_iter()
        .flatten()
        .map(|s| parse_item(s))
        .collect::<Result<Vec<_>>>()?;
    insert(
        conn,
        &customer_id,
        order.as_ref().map(|o| o.id.as_str()),
        &items,
        &InvoiceOptions::from_args(sub)?,
    )
}

pub fn get(conn: &Connection, key: &str) -> Result<Invoice> {
    let key = key.trim();
    let sql = format!("SELECT {} FROM invoices WHERE id=?1 OR number=?1", COLUMNS);
    conn.query_row(&sql, params![key], from_row)
        .optional()?
        .ok_or_else(|| AppError::not_found("invoice", key).into())
}

pub fn items(conn: &Connection, invoice_id: &str) -> Result<Vec<InvoiceItem>> {
    let mut stmt = conn.prepare(
        "SELECT description, quantity, unit_price, amount, taxable
         FROM invoice_items WHERE invoice_id=?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![invoice_id], item_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[derive(Debug, Clone)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    pub customer_id: Option<String>,
    pub month: Option<String>,
    pub as_of: NaiveDate,
}

/// Invoices with `status` already resolved to overdue where due.
pub fn query_rows(conn: &Connection, filter: &InvoiceFilter) -> Result<Vec<Invoice>> {
    let mut sql = format!("SELECT {} FROM invoices WHERE 1=1", COLUMNS);
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(cid) = &filter.customer_id {
        sql.push_str(" AND customer_id=?");
        params_vec.push(cid.clone());
    }
    if let Some(month) = &filter.month {
        sql.push_str(" AND substr(issue_date,1,7)=?");
        params_vec.push(month.clone());
    }
    sql.push_str(" ORDER BY issue_date DESC, number DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(params_vec.iter()), from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows
        .into_iter()
        .map(|mut inv| {
            inv.status = inv.status.effective(inv.due_date, filter.as_of);
            inv
        })
        .filter(|inv| filter.status.is_none_or(|s| s == inv.status))
        .collect())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let filter = InvoiceFilter {
        status: opt_arg(sub, "status")
            .map(|s| s.parse::<InvoiceStatus>())
            .transpose()?,
        customer_id: opt_arg(sub, "customer")
            .map(|c| resolve_customer(conn, &c))
            .transpose()?,
        month: opt_arg(sub, "month").map(|m| parse_month(&m)).transpose()?,
        as_of: today(),
    };
    let data = query_rows(conn, &filter)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let mut rows = Vec::new();
        for inv in data {
            let customer = name_of(conn, "customers", &inv.customer_id)?
                .unwrap_or_else(|| format!("? {}", inv.customer_id));
            rows.push(vec![
                inv.number,
                inv.issue_date.to_string(),
                inv.due_date.to_string(),
                customer,
                inv.sales_order_id.unwrap_or_default(),
                inv.status.to_string(),
                fmt_money(&inv.total),
            ]);
        }
        println!(
            "{}",
            pretty_table(
                &["Number", "Issued", "Due", "Customer", "Sales Order", "Status", "Total"],
                rows
            )
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct InvoiceDetail {
    pub invoice: Invoice,
    pub customer_name: Option<String>,
    pub items: Vec<InvoiceItem>,
}

pub fn detail(conn: &Connection, key: &str) -> Result<InvoiceDetail> {
    let mut invoice = get(conn, key)?;
    invoice.status = invoice.status.effective(invoice.due_date, today());
    Ok(InvoiceDetail {
        customer_name: name_of(conn, "customers", &invoice.customer_id)?,
        items: items(conn, &invoice.id)?,
        invoice,
    })
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let d = detail(conn, arg(sub, "key")?)?;
    if maybe_print_json(json_flag, jsonl_flag, &d)? {
        return Ok(());
    }
    let inv = &d.invoice;
    println!(
        "Invoice {}  customer {}  issued {}  due {}  [{}]",
        inv.number,
        d.customer_name.as_deref().unwrap_or(&inv.customer_id),
        inv.issue_date,
        inv.due_date,
        inv.status
    );
    let rows = d
        .items
        .iter()
        .map(|i| {
            vec![
                i.description.clone(),
                i.quantity.to_string(),
                fmt_money(&i.unit_price),
                fmt_money(&i.amount),
                if i.taxable { "yes".into() } else { "no".into() },
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Description", "Qty", "Unit Price", "Amount", "Taxable"], rows)
    );
    let totals = vec![
        vec!["Subtotal".into(), fmt_money(&inv.subtotal)],
        vec![format!("Tax ({}%)", inv.tax_rate), fmt_money(&inv.tax_amount)],
        vec!["Total".into(), fmt_money(&inv.total)],
    ];
    println!("{}", pretty_table(&["", "Amount"], totals));
    if let Some(notes) = &inv.notes {
        println!("Notes: {}", notes);
    }
    Ok(())
}

fn is_open(status: InvoiceStatus) -> bool {
    matches!(status, InvoiceStatus::Unpaid | InvoiceStatus::Overdue)
}

pub fn pay(conn: &Connection, key: &str, paid_on: NaiveDate) -> Result<Invoice> {
    let mut inv = get(conn, key)?;
    if !is_open(inv.status) {
        return Err(AppError::InvalidTransition {
            entity: "invoice",
            from: inv.status.to_string(),
            to: InvoiceStatus::Paid.to_string(),
        }
        .into());
    }
    conn.execute(
        "UPDATE invoices SET status='paid', paid_at=?2, updated_at=datetime('now') WHERE id=?1",
        params![inv.id, paid_on.to_string()],
    )?;
    tracing::info!(number = %inv.number, "invoice paid");
    inv.status = InvoiceStatus::Paid;
    Ok(inv)
}

pub fn cancel(conn: &Connection, key: &str) -> Result<Invoice> {
    let mut inv = get(conn, key)?;
    if !is_open(inv.status) {
        return Err(AppError::InvalidTransition {
            entity: "invoice",
            from: inv.status.to_string(),
            to: InvoiceStatus::Cancelled.to_string(),
        }
        .into());
    }
    conn.execute(
        "UPDATE invoices SET status='cancelled', updated_at=datetime('now') WHERE id=?1",
        params![inv.id],
    )?;
    tracing::info!(number = %inv.number, "invoice cancelled");
    inv.status = InvoiceStatus::Cancelled;
    Ok(inv)
}

/// Paid invoices are kept; everything else may be deleted with its items.
pub fn remove(conn: &Connection, key: &str) -> Result<String> {
    let inv = get(conn, key)?;
    if inv.status == InvoiceStatus::Paid {
        return Err(AppError::InvalidState(format!(
            "invoice {} is paid and cannot be deleted",
            inv.number
        ))
        .into());
    }
    conn.execute("DELETE FROM invoices WHERE id=?1", params![inv.id])?;
    tracing::info!(number = %inv.number, "invoice removed");
    Ok(inv.number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShipmentMode;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    fn order(cif: Option<Decimal>) -> SalesOrder {
        SalesOrder {
            id: "SO-1".into(),
            customer_id: "CUS-1".into(),
            order_date: NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(),
            mode: ShipmentMode::Sea,
            origin: "Shanghai".into(),
            destination: "Jakarta".into(),
            cargo: "Laptops".into(),
            weight_kg: d("1200"),
            volume_cbm: d("8.5"),
            hs_code: Some("8471.30".into()),
            cif_value: cif,
            currency: "IDR".into(),
            estimated_cost: d("3000000"),
            selling_price: d("4500000"),
            status: OrderStatus::Confirmed,
        }
    }

    fn hs() -> HsCode {
        HsCode {
            code: "8471.30".into(),
            description: "Portable computers".into(),
            duty_rate: d("10"),
            vat_rate: d("11"),
            excise_rate: Decimal::ZERO,
        }
    }

    #[test]
    fn order_without_selling_costs_bills_selling_price_and_duties() {
        let items = items_from_order(&order(Some(d("1000000"))), &[], Some(&hs()));
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].amount, d("4500000"));
        assert!(items[0].taxable);
        assert_eq!(items[1].amount, d("100000"));
        assert!(!items[1].taxable);
        assert_eq!(items[2].amount, d("121000"));

        let totals = InvoiceTotals::from_items(&items, d("11"));
        assert_eq!(totals.subtotal, d("4721000"));
        assert_eq!(totals.tax_amount, d("495000"));
        assert_eq!(totals.total, d("5216000"));
        assert!(totals.verify(&items).is_ok());
    }

    #[test]
    fn selling_costs_become_lines() {
        let selling = vec![
            SellingCost {
                id: "SLC-1".into(),
                sales_order_id: "SO-1".into(),
                description: "Ocean freight".into(),
                amount: d("3000000"),
            },
            SellingCost {
                id: "SLC-2".into(),
                sales_order_id: "SO-1".into(),
                description: "Customs clearance".into(),
                amount: d("750000"),
            },
        ];
        let items = items_from_order(&order(None), &selling, Some(&hs()));
        let descs: Vec<_> = items.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(descs, vec!["Ocean freight", "Customs clearance"]);
    }

    #[test]
    fn verify_flags_tampered_subtotal() {
        let items = vec![InvoiceItem::new("Trucking", d("2"), d("500"), true)];
        let mut totals = InvoiceTotals::from_items(&items, d("11"));
        totals.subtotal = d("999");
        match totals.verify(&items) {
            Err(AppError::Validation(errs)) => {
                assert!(errs.iter().any(|e| e.field == "subtotal"));
                assert!(errs.iter().any(|e| e.field == "total"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn item_text_parsing() {
        let item = parse_item(" Storage | 3 | 150000 ").unwrap();
        assert_eq!(item.amount, d("450000"));
        assert!(item.taxable);
        assert!(!parse_item("Duty|1|20000|notax").unwrap().taxable);
        assert!(parse_item("Duty|1").is_err());
        assert!(parse_item("Duty|0|100").is_err());
        assert!(parse_item("Duty|1|100|maybe").is_err());
    }
}
