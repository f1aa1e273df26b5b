// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use chrono::NaiveDate;
use common::{action, customer, group, order, setup};
use freightdesk::commands::{costs, invoices, orders, reports};
use freightdesk::models::OrderStatus;
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn bill(conn: &rusqlite::Connection, customer: &str, item: &str, on: &str) -> String {
    invoices::add(
        conn,
        &action(&[
            "invoice", "add", "--customer", customer, "--item", item, "--date", on,
            "--tax-rate", "0",
        ]),
    )
    .unwrap()
    .number
}

#[test]
fn profit_skips_cancelled_orders_and_filters_by_month() {
    let conn = setup();
    customer(&conn, "PT Maju Jaya");
    let booked = order(&conn, "PT Maju Jaya", &[]);
    let estimated = order(&conn, "PT Maju Jaya", &["--date", "2025-05-20"]);
    let cancelled = order(&conn, "PT Maju Jaya", &[]);
    let june = order(&conn, "PT Maju Jaya", &["--date", "2025-06-01"]);
    orders::set_status(&conn, &cancelled.id, OrderStatus::Cancelled).unwrap();
    costs::add_operational(
        &conn,
        &action(&[
            "cost", "add-operational", "--order", &booked.id, "--category", "trucking",
            "--amount", "3600000",
        ]),
    )
    .unwrap();

    let may = reports::order_profit(&conn, Some("2025-05")).unwrap();
    assert_eq!(may.len(), 2);
    let b = may.iter().find(|p| p.sales_order_id == booked.id).unwrap();
    assert_eq!(b.operational_cost, d("3600000"));
    assert_eq!(b.gross_profit, d("900000"));
    assert_eq!(b.margin_pct, d("20"));
    let e = may.iter().find(|p| p.sales_order_id == estimated.id).unwrap();
    assert_eq!(e.operational_cost, Decimal::ZERO);
    assert_eq!(e.cost_basis, d("3000000"));
    assert_eq!(e.customer, "PT Maju Jaya");

    let all = reports::order_profit(&conn, None).unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().any(|p| p.sales_order_id == june.id));
}

#[test]
fn receivables_split_current_and_overdue() {
    let conn = setup();
    customer(&conn, "PT Maju Jaya");
    customer(&conn, "CV Sinar Abadi");
    bill(&conn, "PT Maju Jaya", "Freight|1|1000", "2025-04-01");
    bill(&conn, "PT Maju Jaya", "Freight|1|500", "2025-05-25");
    let paid = bill(&conn, "PT Maju Jaya", "Freight|1|9999", "2025-04-02");
    let cancelled = bill(&conn, "CV Sinar Abadi", "Freight|1|7777", "2025-04-02");
    bill(&conn, "CV Sinar Abadi", "Freight|1|2500", "2025-05-30");
    invoices::pay(&conn, &paid, date("2025-04-20")).unwrap();
    invoices::cancel(&conn, &cancelled).unwrap();

    let rows = reports::receivables(&conn, date("2025-06-01")).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].customer, "CV Sinar Abadi");
    assert_eq!(rows[0].current, d("2500"));
    assert_eq!(rows[0].overdue, Decimal::ZERO);
    assert_eq!(rows[1].customer, "PT Maju Jaya");
    assert_eq!(rows[1].invoices, 2);
    assert_eq!(rows[1].current, d("500"));
    assert_eq!(rows[1].overdue, d("1000"));
    assert_eq!(rows[1].total, d("1500"));
}

#[test]
fn revenue_groups_by_issue_month_newest_first() {
    let conn = setup();
    customer(&conn, "PT Maju Jaya");
    let paid = bill(&conn, "PT Maju Jaya", "Freight|1|1000", "2025-03-03");
    bill(&conn, "PT Maju Jaya", "Freight|1|400", "2025-03-20");
    bill(&conn, "PT Maju Jaya", "Freight|2|300", "2025-04-01");
    let cancelled = bill(&conn, "PT Maju Jaya", "Freight|1|5000", "2025-05-01");
    invoices::pay(&conn, &paid, date("2025-03-31")).unwrap();
    invoices::cancel(&conn, &cancelled).unwrap();

    let months = reports::revenue(&conn, 12).unwrap();
    let labels: Vec<&str> = months.iter().map(|m| m.month.as_str()).collect();
    assert_eq!(labels, vec!["2025-04", "2025-03"]);
    assert_eq!(months[1].invoiced, d("1400"));
    assert_eq!(months[1].paid, d("1000"));
    assert_eq!(months[1].outstanding, d("400"));
    assert_eq!(months[0].invoiced, d("600"));

    assert_eq!(reports::revenue(&conn, 1).unwrap().len(), 1);
}

#[test]
fn report_commands_print_json() {
    let conn = setup();
    customer(&conn, "PT Maju Jaya");
    order(&conn, "PT Maju Jaya", &[]);
    for args in [
        vec!["report", "profit", "--month", "2025-05", "--json"],
        vec!["report", "receivables", "--as-of", "2025-06-01", "--jsonl"],
        vec!["report", "revenue", "--months", "6"],
    ] {
        reports::handle(&conn, &group(&args)).unwrap();
    }
}
