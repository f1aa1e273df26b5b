// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use chrono::NaiveDate;
use common::{action, customer, error_code, laptops_hs, order, setup};
use freightdesk::commands::{costs, invoices, orders};
use freightdesk::models::{Invoice, InvoiceStatus, OrderStatus, SalesOrder};
use freightdesk::settings;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn issued_on(s: &str) -> invoices::InvoiceOptions {
    invoices::InvoiceOptions {
        issue_date: Some(date(s)),
        ..Default::default()
    }
}

fn confirmed_order(conn: &Connection, extra: &[&str]) -> SalesOrder {
    let o = order(conn, "PT Maju Jaya", extra);
    orders::set_status(conn, &o.id, OrderStatus::Confirmed).unwrap()
}

#[test]
fn from_order_adds_untaxed_duty_lines() {
    let conn = setup();
    customer(&conn, "PT Maju Jaya");
    laptops_hs(&conn);
    let o = confirmed_order(&conn, &["--hs-code", "8471.30", "--cif", "1000000"]);

    let inv = invoices::from_order(&conn, &o.id, &issued_on("2025-05-10")).unwrap();
    assert_eq!(inv.number, "INV-202505-0001");
    assert_eq!(inv.status, InvoiceStatus::Unpaid);
    assert_eq!(inv.due_date, date("2025-06-09"));
    assert_eq!(inv.tax_rate, d("11"));
    assert_eq!(inv.subtotal, d("4721000"));
    assert_eq!(inv.tax_amount, d("495000"));
    assert_eq!(inv.total, d("5216000"));

    let items = invoices::items(&conn, &inv.id).unwrap();
    let taxable: Vec<bool> = items.iter().map(|i| i.taxable).collect();
    assert_eq!(taxable, vec![true, false, false]);
    assert!(items[1].description.contains("8471.30"));
}

#[test]
fn selling_costs_drive_the_lines() {
    let conn = setup();
    customer(&conn, "PT Maju Jaya");
    let o = confirmed_order(&conn, &[]);
    for (desc, amount) in [("Ocean freight", "3500000"), ("Customs clearance", "650000")] {
        costs::add_selling(
            &conn,
            &action(&[
                "cost", "add-selling", "--order", &o.id, "--description", desc, "--amount", amount,
            ]),
        )
        .unwrap();
    }
    let inv = invoices::from_order(&conn, &o.id, &issued_on("2025-05-10")).unwrap();
    let items = invoices::items(&conn, &inv.id).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].description, "Ocean freight");
    assert_eq!(inv.subtotal, d("4150000"));
    assert_eq!(inv.tax_amount, d("456500"));
}

#[test]
fn numbers_run_per_issue_month() {
    let conn = setup();
    customer(&conn, "PT Maju Jaya");
    let a = confirmed_order(&conn, &[]);
    let b = confirmed_order(&conn, &[]);
    let c = confirmed_order(&conn, &[]);
    let first = invoices::from_order(&conn, &a.id, &issued_on("2025-05-10")).unwrap();
    let second = invoices::from_order(&conn, &b.id, &issued_on("2025-05-31")).unwrap();
    let june = invoices::from_order(&conn, &c.id, &issued_on("2025-06-01")).unwrap();
    assert_eq!(first.number, "INV-202505-0001");
    assert_eq!(second.number, "INV-202505-0002");
    assert_eq!(june.number, "INV-202506-0001");
    assert_eq!(
        invoices::next_number(&conn, date("2025-05-01")).unwrap(),
        "INV-202505-0003"
    );
}

#[test]
fn orders_are_billed_once_and_not_as_drafts() {
    let conn = setup();
    customer(&conn, "PT Maju Jaya");
    let draft = order(&conn, "PT Maju Jaya", &[]);
    let err = invoices::from_order(&conn, &draft.id, &issued_on("2025-05-10")).unwrap_err();
    assert_eq!(error_code(&err), "INVALID_STATE");

    let o = confirmed_order(&conn, &[]);
    let inv = invoices::from_order(&conn, &o.id, &issued_on("2025-05-10")).unwrap();
    let err = invoices::from_order(&conn, &o.id, &issued_on("2025-05-11")).unwrap_err();
    assert_eq!(error_code(&err), "INVALID_STATE");
    assert!(err.to_string().contains(&inv.number));

    invoices::cancel(&conn, &inv.number).unwrap();
    let again = invoices::from_order(&conn, &o.id, &issued_on("2025-05-11")).unwrap();
    assert_eq!(again.number, "INV-202505-0002");
}

#[test]
fn numbering_past_9999_stays_numeric() {
    let conn = setup();
    let c = customer(&conn, "PT Maju Jaya");
    for (id, number) in [("INV-a", "INV-202505-9999"), ("INV-b", "INV-202505-10000")] {
        conn.execute(
            "INSERT INTO invoices(id, number, customer_id, issue_date, due_date, subtotal,
                tax_rate, tax_amount, total)
             VALUES (?1, ?2, ?3, '2025-05-01', '2025-05-31', '0', '11', '0', '0')",
            rusqlite::params![id, number, c.id],
        )
        .unwrap();
    }
    assert_eq!(
        invoices::next_number(&conn, date("2025-05-20")).unwrap(),
        "INV-202505-10001"
    );
}

fn manual_for_order(conn: &Connection, customer: &str, order_id: &str) -> anyhow::Result<Invoice> {
    invoices::add(
        conn,
        &action(&[
            "invoice", "add", "--customer", customer, "--order", order_id, "--item",
            "Freight|1|100", "--date", "2025-05-20",
        ]),
    )
}

#[test]
fn manual_invoices_follow_the_order_billing_rules() {
    let conn = setup();
    customer(&conn, "PT Maju Jaya");
    customer(&conn, "PT Lain");

    let draft = order(&conn, "PT Maju Jaya", &[]);
    let err = manual_for_order(&conn, "PT Maju Jaya", &draft.id).unwrap_err();
    assert_eq!(error_code(&err), "INVALID_STATE");

    let o = confirmed_order(&conn, &[]);
    let err = manual_for_order(&conn, "PT Lain", &o.id).unwrap_err();
    assert_eq!(error_code(&err), "VALIDATION_ERROR");

    let first = manual_for_order(&conn, "PT Maju Jaya", &o.id).unwrap();
    assert_eq!(first.sales_order_id.as_deref(), Some(o.id.as_str()));

    let err = manual_for_order(&conn, "PT Maju Jaya", &o.id).unwrap_err();
    assert_eq!(error_code(&err), "INVALID_STATE");
    let err = invoices::from_order(&conn, &o.id, &issued_on("2025-05-21")).unwrap_err();
    assert_eq!(error_code(&err), "INVALID_STATE");
    assert!(err.to_string().contains(&first.number));
}

#[test]
fn manual_invoice_taxes_only_taxable_lines() {
    let conn = setup();
    customer(&conn, "PT Maju Jaya");
    let inv = invoices::add(
        &conn,
        &action(&[
            "invoice",
            "add",
            "--customer",
            "PT Maju Jaya",
            "--item",
            "Customs clearance|1|750000",
            "--item",
            "Storage|3|150000",
            "--item",
            "Duty advance|1|200000|notax",
            "--date",
            "2025-05-20",
            "--notes",
            "Job 42",
        ]),
    )
    .unwrap();
    assert_eq!(inv.subtotal, d("1400000"));
    assert_eq!(inv.tax_amount, d("132000"));
    assert_eq!(inv.total, d("1532000"));
    assert_eq!(inv.notes.as_deref(), Some("Job 42"));

    let err = invoices::add(
        &conn,
        &action(&["invoice", "add", "--customer", "PT Maju Jaya", "--item", "Storage|x|1"]),
    )
    .unwrap_err();
    assert!(err.to_string().contains("Invalid decimal"));
}

#[test]
fn tax_rate_falls_back_to_setting_and_due_date_to_terms() {
    let conn = setup();
    customer(&conn, "PT Maju Jaya");
    settings::set(&conn, settings::VAT_RATE, "12").unwrap();
    settings::set(&conn, settings::PAYMENT_TERMS_DAYS, "14").unwrap();
    let inv = invoices::add(
        &conn,
        &action(&[
            "invoice", "add", "--customer", "PT Maju Jaya", "--item", "Handling|1|1000",
            "--date", "2025-05-20",
        ]),
    )
    .unwrap();
    assert_eq!(inv.tax_amount, d("120"));
    assert_eq!(inv.due_date, date("2025-06-03"));

    let err = invoices::add(
        &conn,
        &action(&[
            "invoice", "add", "--customer", "PT Maju Jaya", "--item", "Handling|1|1000",
            "--tax-rate", "101",
        ]),
    )
    .unwrap_err();
    assert_eq!(error_code(&err), "VALIDATION_ERROR");
}

#[test]
fn payment_and_cancellation_rules() {
    let conn = setup();
    customer(&conn, "PT Maju Jaya");
    let a = confirmed_order(&conn, &[]);
    let b = confirmed_order(&conn, &[]);
    let paid = invoices::from_order(&conn, &a.id, &issued_on("2025-05-10")).unwrap();
    let open = invoices::from_order(&conn, &b.id, &issued_on("2025-05-10")).unwrap();

    invoices::pay(&conn, &paid.number, date("2025-05-25")).unwrap();
    let paid_at: String = conn
        .query_row("SELECT paid_at FROM invoices WHERE id=?1", [&paid.id], |r| r.get(0))
        .unwrap();
    assert_eq!(paid_at, "2025-05-25");
    assert_eq!(
        error_code(&invoices::cancel(&conn, &paid.id).unwrap_err()),
        "INVALID_TRANSITION"
    );
    assert_eq!(
        error_code(&invoices::remove(&conn, &paid.id).unwrap_err()),
        "INVALID_STATE"
    );

    invoices::cancel(&conn, &open.number).unwrap();
    assert_eq!(
        error_code(&invoices::pay(&conn, &open.number, date("2025-05-25")).unwrap_err()),
        "INVALID_TRANSITION"
    );
    invoices::remove(&conn, &open.number).unwrap();
    let items: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM invoice_items WHERE invoice_id=?1",
            [&open.id],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(items, 0);
    assert_eq!(
        error_code(&invoices::get(&conn, &open.number).unwrap_err()),
        "NOT_FOUND"
    );
}

#[test]
fn overdue_is_reported_from_due_date() {
    let conn = setup();
    customer(&conn, "PT Maju Jaya");
    let a = confirmed_order(&conn, &[]);
    let b = confirmed_order(&conn, &[]);
    invoices::from_order(&conn, &a.id, &issued_on("2025-04-01")).unwrap();
    invoices::from_order(&conn, &b.id, &issued_on("2025-05-20")).unwrap();

    let filter = |status| invoices::InvoiceFilter {
        status,
        customer_id: None,
        month: None,
        as_of: date("2025-06-01"),
    };
    let overdue = invoices::query_rows(&conn, &filter(Some(InvoiceStatus::Overdue))).unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].number, "INV-202504-0001");

    let unpaid = invoices::query_rows(&conn, &filter(Some(InvoiceStatus::Unpaid))).unwrap();
    assert_eq!(unpaid.len(), 1);
    assert_eq!(unpaid[0].number, "INV-202505-0001");

    let stored: String = conn
        .query_row(
            "SELECT status FROM invoices WHERE number='INV-202504-0001'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(stored, "unpaid");
}
