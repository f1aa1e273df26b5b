// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{action, customer, order, setup};
use freightdesk::commands::{doctor, invoices};

fn kinds(conn: &rusqlite::Connection) -> Vec<&'static str> {
    doctor::check(conn).unwrap().into_iter().map(|i| i.kind).collect()
}

#[test]
fn clean_database_has_no_issues() {
    let conn = setup();
    customer(&conn, "PT Maju Jaya");
    order(&conn, "PT Maju Jaya", &[]);
    invoices::add(
        &conn,
        &action(&[
            "invoice", "add", "--customer", "PT Maju Jaya", "--item", "Freight|1|1000",
        ]),
    )
    .unwrap();
    assert!(kinds(&conn).is_empty());
    doctor::handle(&conn).unwrap();
}

#[test]
fn reports_dangling_references() {
    let conn = setup();
    conn.execute_batch(
        r#"
        INSERT INTO sales_orders(id, customer_id, order_date, mode, origin, destination, cargo,
            hs_code, currency, estimated_cost, selling_price)
        VALUES ('SO-1', 'CUS-gone', '2025-05-02', 'sea', 'A', 'B', 'C', '9999.99', 'IDR', '1', '2');
        INSERT INTO purchase_orders(id, vendor_id, sales_order_id, order_date, description, amount, currency)
        VALUES ('PO-1', 'VEN-gone', 'SO-gone', '2025-05-02', 'x', '1', 'IDR');
        INSERT INTO selling_costs(id, sales_order_id, description, amount)
        VALUES ('SLC-1', 'SO-gone', 'Freight', '1');
        "#,
    )
    .unwrap();
    let found = kinds(&conn);
    for kind in [
        "order_missing_customer",
        "order_missing_hs_code",
        "po_missing_vendor",
        "po_missing_order",
        "cost_missing_order",
    ] {
        assert!(found.contains(&kind), "{kind} missing from {found:?}");
    }
}

#[test]
fn reports_tampered_totals_and_unprofitable_orders() {
    let conn = setup();
    customer(&conn, "PT Maju Jaya");
    let o = order(&conn, "PT Maju Jaya", &[]);
    let inv = invoices::add(
        &conn,
        &action(&[
            "invoice", "add", "--customer", "PT Maju Jaya", "--item", "Freight|1|1000",
        ]),
    )
    .unwrap();
    conn.execute(
        "UPDATE invoices SET total='999999' WHERE id=?1",
        [&inv.id],
    )
    .unwrap();
    conn.execute(
        "UPDATE sales_orders SET estimated_cost='5000000' WHERE id=?1",
        [&o.id],
    )
    .unwrap();

    let issues = doctor::check(&conn).unwrap();
    let mismatch = issues
        .iter()
        .find(|i| i.kind == "invoice_totals_mismatch")
        .unwrap();
    assert!(mismatch.detail.starts_with(&inv.number));
    assert!(issues.iter().any(|i| i.kind == "order_not_profitable"));
}
