// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::process::ExitCode;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use freightdesk::{cli, commands, db, error};

fn init_tracing() {
    // stdout carries tables and JSON, so logs go to stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "freightdesk=warn".into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn run() -> Result<()> {
    let matches = cli::build_cli().get_matches();

    let mut conn = db::open_or_init()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("customer", sub)) => commands::customers::handle(&conn, sub)?,
        Some(("vendor", sub)) => commands::vendors::handle(&conn, sub)?,
        Some(("hs", sub)) => commands::hs_codes::handle(&conn, sub)?,
        Some(("order", sub)) => commands::orders::handle(&conn, sub)?,
        Some(("po", sub)) => commands::purchases::handle(&conn, sub)?,
        Some(("cost", sub)) => commands::costs::handle(&conn, sub)?,
        Some(("invoice", sub)) => commands::invoices::handle(&conn, sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("import", sub)) => commands::importer::handle(&mut conn, sub)?,
        Some(("config", sub)) => commands::config::handle(&conn, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = error::error_code(&err);
            tracing::error!(code, error = %format!("{:#}", err), "command failed");
            eprintln!("error[{}]: {:#}", code, err);
            ExitCode::FAILURE
        }
    }
}
