// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use clap::ArgMatches;
use freightdesk::models::{Customer, HsCode, SalesOrder, Vendor};
use freightdesk::{cli, commands, db};
use rusqlite::Connection;

pub fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

/// Parses `freightdesk <group> <action> ...` and returns the action's matches.
pub fn action(args: &[&str]) -> ArgMatches {
    let mut argv = vec!["freightdesk"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().try_get_matches_from(argv).unwrap();
    let (_, group) = matches.subcommand().expect("group subcommand");
    let (_, sub) = group.subcommand().expect("action subcommand");
    sub.clone()
}

/// Parses `freightdesk <group> ...` and returns the group's matches.
pub fn group(args: &[&str]) -> ArgMatches {
    let mut argv = vec!["freightdesk"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().try_get_matches_from(argv).unwrap();
    let (_, group) = matches.subcommand().expect("group subcommand");
    group.clone()
}

pub fn customer(conn: &Connection, name: &str) -> Customer {
    commands::customers::add(
        conn,
        &action(&["customer", "add", "--name", name, "--email", "ops@example.co.id"]),
    )
    .unwrap()
}

pub fn vendor(conn: &Connection, name: &str) -> Vendor {
    commands::vendors::add(
        conn,
        &action(&["vendor", "add", "--name", name, "--service", "trucking"]),
    )
    .unwrap()
}

/// HS 8471.30 at 10% duty, 11% VAT, no excise.
pub fn laptops_hs(conn: &Connection) -> HsCode {
    commands::hs_codes::add(
        conn,
        &action(&[
            "hs",
            "add",
            "--code",
            "8471.30",
            "--description",
            "Portable computers",
            "--duty",
            "10",
            "--vat",
            "11",
        ]),
    )
    .unwrap()
}

pub fn order(conn: &Connection, customer: &str, extra: &[&str]) -> SalesOrder {
    let mut args = vec![
        "order",
        "add",
        "--customer",
        customer,
        "--mode",
        "sea",
        "--origin",
        "Shanghai",
        "--destination",
        "Tanjung Priok",
        "--cargo",
        "Laptops",
        "--cost",
        "3000000",
        "--price",
        "4500000",
    ];
    if !extra.contains(&"--date") {
        args.extend_from_slice(&["--date", "2025-05-02"]);
    }
    args.extend_from_slice(extra);
    commands::orders::add(conn, &action(&args)).unwrap()
}

pub fn error_code(err: &anyhow::Error) -> &'static str {
    freightdesk::error::error_code(err)
}
