// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

fn opt(name: &'static str) -> Arg {
    Arg::new(name).long(name).num_args(1)
}

fn req(name: &'static str) -> Arg {
    opt(name).required(true)
}

fn key(help: &'static str) -> Arg {
    Arg::new("key").required(true).help(help)
}

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn contact_args(cmd: Command, name_required: bool) -> Command {
    let name = if name_required { req("name") } else { opt("name") };
    cmd.arg(name.help("Display name, unique"))
        .arg(opt("email"))
        .arg(opt("phone"))
        .arg(opt("npwp").help("Tax id, NN.NNN.NNN.N-NNN.NNN"))
        .arg(opt("address"))
}

fn customer_cmd() -> Command {
    Command::new("customer")
        .about("Manage customers")
        .subcommand_required(true)
        .subcommand(
            contact_args(Command::new("add").about("Add a customer"), true)
                .arg(opt("contact").help("Contact person")),
        )
        .subcommand(json_args(
            Command::new("list")
                .about("List customers")
                .arg(opt("search").help("Substring of name or email")),
        ))
        .subcommand(json_args(
            Command::new("show")
                .about("Show one customer")
                .arg(key("Customer id or name")),
        ))
        .subcommand(
            contact_args(
                Command::new("update")
                    .about("Update customer fields")
                    .arg(key("Customer id or name")),
                false,
            )
            .arg(opt("contact").help("Contact person")),
        )
        .subcommand(
            Command::new("rm")
                .about("Remove a customer")
                .arg(key("Customer id or name")),
        )
}

fn vendor_cmd() -> Command {
    Command::new("vendor")
        .about("Manage vendors")
        .subcommand_required(true)
        .subcommand(
            contact_args(Command::new("add").about("Add a vendor"), true)
                .arg(opt("service").help("Service type, e.g. trucking, shipping line")),
        )
        .subcommand(json_args(
            Command::new("list")
                .about("List vendors")
                .arg(opt("search").help("Substring of name or service type")),
        ))
        .subcommand(json_args(
            Command::new("show")
                .about("Show one vendor")
                .arg(key("Vendor id or name")),
        ))
        .subcommand(
            contact_args(
                Command::new("update")
                    .about("Update vendor fields")
                    .arg(key("Vendor id or name")),
                false,
            )
            .arg(opt("service")),
        )
        .subcommand(
            Command::new("rm")
                .about("Remove a vendor")
                .arg(key("Vendor id or name")),
        )
}

fn hs_cmd() -> Command {
    Command::new("hs")
        .about("Manage HS codes and compute landed cost")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Add an HS code")
                .arg(req("code"))
                .arg(req("description"))
                .arg(opt("duty").help("Import duty %").default_value("0"))
                .arg(opt("vat").help("Import VAT %, defaults to the vat_rate setting"))
                .arg(opt("excise").help("Excise %").default_value("0")),
        )
        .subcommand(json_args(
            Command::new("list")
                .about("List HS codes")
                .arg(opt("search").help("Prefix of code or substring of description")),
        ))
        .subcommand(json_args(
            Command::new("show").about("Show one HS code").arg(key("HS code")),
        ))
        .subcommand(
            Command::new("update")
                .about("Update an HS code")
                .arg(key("HS code"))
                .arg(opt("description"))
                .arg(opt("duty"))
                .arg(opt("vat"))
                .arg(opt("excise")),
        )
        .subcommand(Command::new("rm").about("Remove an HS code").arg(key("HS code")))
        .subcommand(json_args(
            Command::new("calc")
                .about("Landed cost from CIF or FOB + insurance + freight")
                .arg(req("code"))
                .arg(opt("cif").conflicts_with_all(["fob", "insurance", "freight"]))
                .arg(opt("fob"))
                .arg(opt("insurance"))
                .arg(opt("freight")),
        ))
}

fn order_fields(cmd: Command) -> Command {
    cmd.arg(opt("mode").help("sea | air | land"))
        .arg(opt("origin"))
        .arg(opt("destination"))
        .arg(opt("cargo").help("Cargo description"))
        .arg(opt("weight").help("Gross weight, kg"))
        .arg(opt("volume").help("Volume, cbm"))
        .arg(opt("hs-code"))
        .arg(opt("cif").help("CIF value for duty calculation"))
        .arg(opt("cost").help("Estimated cost"))
        .arg(opt("price").help("Selling price"))
}

fn order_cmd() -> Command {
    Command::new("order")
        .about("Manage sales orders")
        .subcommand_required(true)
        .subcommand(
            order_fields(
                Command::new("add")
                    .about("Create a sales order")
                    .arg(req("customer").help("Customer id or name"))
                    .arg(opt("date").help("YYYY-MM-DD, defaults to today"))
                    .arg(opt("currency").help("Defaults to the base currency")),
            )
            .mut_arg("mode", |a| a.required(true))
            .mut_arg("origin", |a| a.required(true))
            .mut_arg("destination", |a| a.required(true))
            .mut_arg("cargo", |a| a.required(true))
            .mut_arg("cost", |a| a.required(true))
            .mut_arg("price", |a| a.required(true)),
        )
        .subcommand(json_args(
            Command::new("list")
                .about("List sales orders")
                .arg(opt("status"))
                .arg(opt("customer"))
                .arg(opt("month").help("YYYY-MM"))
                .arg(
                    opt("limit")
                        .value_parser(value_parser!(usize))
                        .help("Show at most N orders"),
                ),
        ))
        .subcommand(json_args(
            Command::new("show")
                .about("Show an order with costs and landed cost")
                .arg(key("Sales order id")),
        ))
        .subcommand(order_fields(
            Command::new("update")
                .about("Update a draft or confirmed order")
                .arg(key("Sales order id")),
        ))
        .subcommand(
            Command::new("status")
                .about("Move an order to another status")
                .arg(key("Sales order id"))
                .arg(req("to").help("confirmed | in_transit | delivered | cancelled")),
        )
        .subcommand(
            Command::new("rm")
                .about("Remove an order and its costs")
                .arg(key("Sales order id")),
        )
}

fn po_cmd() -> Command {
    Command::new("po")
        .about("Manage purchase orders")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Create a purchase order")
                .arg(req("vendor").help("Vendor id or name"))
                .arg(opt("order").help("Linked sales order id"))
                .arg(opt("date"))
                .arg(req("description"))
                .arg(req("amount"))
                .arg(opt("currency")),
        )
        .subcommand(json_args(
            Command::new("list")
                .about("List purchase orders")
                .arg(opt("status"))
                .arg(opt("vendor"))
                .arg(opt("order")),
        ))
        .subcommand(
            Command::new("status")
                .about("Move a purchase order to another status")
                .arg(key("Purchase order id"))
                .arg(req("to").help("issued | received | paid | cancelled")),
        )
        .subcommand(
            Command::new("rm")
                .about("Remove a draft or cancelled purchase order")
                .arg(key("Purchase order id")),
        )
}

fn cost_cmd() -> Command {
    Command::new("cost")
        .about("Track operational and selling costs per order")
        .subcommand_required(true)
        .subcommand(
            Command::new("add-operational")
                .about("Record an operational cost")
                .arg(req("order"))
                .arg(opt("vendor"))
                .arg(req("category").help("e.g. trucking, THC, customs clearance"))
                .arg(opt("description").default_value(""))
                .arg(req("amount"))
                .arg(opt("date")),
        )
        .subcommand(
            Command::new("add-selling")
                .about("Record a selling cost billed to the customer")
                .arg(req("order"))
                .arg(req("description"))
                .arg(req("amount")),
        )
        .subcommand(json_args(
            Command::new("list")
                .about("List costs of an order")
                .arg(req("order")),
        ))
        .subcommand(Command::new("rm").about("Remove a cost").arg(key("Cost id")))
}

fn invoice_cmd() -> Command {
    Command::new("invoice")
        .about("Issue and track invoices")
        .subcommand_required(true)
        .subcommand(
            Command::new("from-order")
                .about("Generate an invoice from a sales order")
                .arg(req("order"))
                .arg(opt("date"))
                .arg(opt("tax-rate").help("VAT % on taxable lines, defaults to setting"))
                .arg(opt("notes")),
        )
        .subcommand(
            Command::new("add")
                .about("Create a manual invoice")
                .arg(req("customer"))
                .arg(
                    req("item")
                        .action(ArgAction::Append)
                        .help("Line item 'description|quantity|unit price[|notax]'"),
                )
                .arg(opt("order"))
                .arg(opt("date"))
                .arg(opt("tax-rate"))
                .arg(opt("notes")),
        )
        .subcommand(json_args(
            Command::new("list")
                .about("List invoices")
                .arg(opt("status").help("unpaid | paid | overdue | cancelled"))
                .arg(opt("customer"))
                .arg(opt("month")),
        ))
        .subcommand(json_args(
            Command::new("show")
                .about("Show an invoice with its items")
                .arg(key("Invoice id or number")),
        ))
        .subcommand(
            Command::new("pay")
                .about("Mark an invoice paid")
                .arg(key("Invoice id or number"))
                .arg(opt("date")),
        )
        .subcommand(
            Command::new("cancel")
                .about("Cancel an unpaid invoice")
                .arg(key("Invoice id or number")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete an unpaid or cancelled invoice")
                .arg(key("Invoice id or number")),
        )
}

fn report_cmd() -> Command {
    Command::new("report")
        .about("Finance reports")
        .subcommand_required(true)
        .subcommand(json_args(
            Command::new("profit")
                .about("Revenue, cost and margin per sales order")
                .arg(opt("month")),
        ))
        .subcommand(json_args(
            Command::new("receivables")
                .about("Outstanding invoices per customer")
                .arg(opt("as-of").help("YYYY-MM-DD, defaults to today")),
        ))
        .subcommand(json_args(
            Command::new("revenue")
                .about("Invoiced totals per month")
                .arg(opt("months").value_parser(value_parser!(usize))),
        ))
}

fn export_cmd() -> Command {
    let target = |name: &'static str| {
        Command::new(name)
            .about(format!("Export {}", name))
            .arg(req("format").help("csv | json"))
            .arg(req("out"))
    };
    Command::new("export")
        .about("Export data to CSV or JSON")
        .subcommand_required(true)
        .subcommand(target("customers"))
        .subcommand(target("vendors"))
        .subcommand(target("orders"))
        .subcommand(target("invoices"))
}

pub fn build_cli() -> Command {
    Command::new("freightdesk")
        .version(clap::crate_version!())
        .about("Freight-forwarding back office: orders, costs, invoices and import duty")
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(customer_cmd())
        .subcommand(vendor_cmd())
        .subcommand(hs_cmd())
        .subcommand(order_cmd())
        .subcommand(po_cmd())
        .subcommand(cost_cmd())
        .subcommand(invoice_cmd())
        .subcommand(report_cmd())
        .subcommand(export_cmd())
        .subcommand(
            Command::new("import")
                .about("Import data from CSV")
                .subcommand_required(true)
                .subcommand(
                    Command::new("customers")
                        .about("Import customers: name,email,phone,npwp,address,contact_person")
                        .arg(req("path")),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Show or change settings")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Show all settings"))
                .subcommand(
                    Command::new("set")
                        .about("Change a setting")
                        .arg(req("key"))
                        .arg(req("value")),
                ),
        )
        .subcommand(Command::new("doctor").about("Check references and stored totals"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        build_cli().debug_assert();
    }
}
