// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of a table")
}

fn account_opt(help: &'static str) -> Arg {
    Arg::new("account").long("account").help(help)
}

fn range_args() -> [Arg; 2] {
    [
        Arg::new("from")
            .long("from")
            .required(true)
            .help("Start date, YYYY-MM-DD (inclusive)"),
        Arg::new("to")
            .long("to")
            .required(true)
            .help("End date, YYYY-MM-DD (inclusive)"),
    ]
}

const LOAN_FREQUENCIES: [&str; 3] = ["daily", "weekly", "monthly"];
const BILL_FREQUENCIES: [&str; 4] = ["daily", "weekly", "monthly", "yearly"];

fn frequency_arg<const N: usize>(values: [&'static str; N]) -> Arg {
    Arg::new("frequency")
        .long("frequency")
        .default_value("monthly")
        .value_parser(values)
}

pub fn build_cli() -> Command {
    Command::new("finledger")
        .about("Personal finance ledger: accounts, transactions, debts, loans and bills")
        .version(crate_version!())
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .help("Path to the SQLite store (overrides FINLEDGER_DB)"),
        )
        .subcommand(Command::new("init").about("Create the store and seed defaults"))
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("type").long("type").default_value("Cash"))
                        .arg(
                            Arg::new("balance")
                                .long("balance")
                                .default_value("0")
                                .allow_hyphen_values(true)
                                .help("Opening balance"),
                        )
                        .arg(Arg::new("color").long("color"))
                        .arg(Arg::new("icon").long("icon")),
                )
                .subcommand(Command::new("list").arg(json_flag()))
                .subcommand(
                    Command::new("edit")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("rename").long("rename"))
                        .arg(Arg::new("type").long("type"))
                        .arg(
                            Arg::new("balance")
                                .long("balance")
                                .allow_hyphen_values(true),
                        )
                        .arg(Arg::new("color").long("color"))
                        .arg(Arg::new("icon").long("icon")),
                )
                .subcommand(Command::new("rm").arg(Arg::new("name").required(true))),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .value_parser(["income", "expense"]),
                        )
                        .arg(Arg::new("color").long("color"))
                        .arg(Arg::new("icon").long("icon")),
                )
                .subcommand(
                    Command::new("list")
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_parser(["income", "expense"]),
                        )
                        .arg(json_flag()),
                )
                .subcommand(Command::new("rm").arg(Arg::new("name").required(true))),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and inspect transactions")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .help("YYYY-MM-DD, defaults to now"),
                        )
                        .arg(account_opt("Account the whole amount moves through"))
                        .arg(Arg::new("note").long("note").default_value(""))
                        .arg(
                            Arg::new("item")
                                .long("item")
                                .action(ArgAction::Append)
                                .help("Line item as name:quantity:unit:price (unit may be empty)"),
                        )
                        .arg(
                            Arg::new("split")
                                .long("split")
                                .action(ArgAction::Append)
                                .conflicts_with("account")
                                .help("Allocation as Account=amount; repeat to split"),
                        )
                        .arg(
                            Arg::new("pending")
                                .long("pending")
                                .requires("contact")
                                .help("Unpaid part of the bill, recorded as a borrowed debt"),
                        )
                        .arg(Arg::new("contact").long("contact"))
                        .arg(Arg::new("due").long("due").help("Due date of the pending part")),
                )
                .subcommand(
                    Command::new("list")
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(i64))
                                .default_value("50"),
                        )
                        .arg(
                            Arg::new("offset")
                                .long("offset")
                                .value_parser(value_parser!(i64))
                                .default_value("0"),
                        )
                        .arg(Arg::new("from").long("from").requires("to"))
                        .arg(Arg::new("to").long("to").requires("from"))
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("show")
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("rm").arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                ),
        )
        .subcommand(
            Command::new("transfer")
                .about("Move money between two accounts")
                .arg(Arg::new("from").long("from").required(true))
                .arg(Arg::new("to").long("to").required(true))
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(Arg::new("date").long("date")),
        )
        .subcommand(
            Command::new("debt")
                .about("Track money borrowed and lent")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .value_parser(["borrowed", "lent"]),
                        )
                        .arg(Arg::new("contact").long("contact").required(true))
                        .arg(Arg::new("due").long("due").required(true))
                        .arg(Arg::new("description").long("description").default_value(""))
                        .arg(account_opt("Account the money moves through")),
                )
                .subcommand(Command::new("list").arg(json_flag()))
                .subcommand(
                    Command::new("pay")
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(account_opt("Account the settlement moves through")),
                )
                .subcommand(
                    Command::new("rm").arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                ),
        )
        .subcommand(
            Command::new("loan")
                .about("Loans with installment schedules")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("title").long("title").required(true))
                        .arg(Arg::new("principal").long("principal").required(true))
                        .arg(Arg::new("rate").long("rate").default_value("0"))
                        .arg(frequency_arg(LOAN_FREQUENCIES))
                        .arg(
                            Arg::new("count")
                                .long("count")
                                .required(true)
                                .value_parser(value_parser!(u32)),
                        )
                        .arg(Arg::new("start").long("start").required(true))
                        .arg(Arg::new("description").long("description"))
                        .arg(account_opt("Account that receives the disbursement")),
                )
                .subcommand(Command::new("list").arg(json_flag()))
                .subcommand(
                    Command::new("show")
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("pay")
                        .arg(
                            Arg::new("installment")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(account_opt("Account charged for the installment")),
                )
                .subcommand(
                    Command::new("rm").arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                ),
        )
        .subcommand(
            Command::new("bill")
                .about("Recurring payments")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("description").long("description").required(true))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(frequency_arg(BILL_FREQUENCIES))
                        .arg(
                            Arg::new("due-day")
                                .long("due-day")
                                .value_parser(value_parser!(u32).range(1..=31))
                                .default_value("1"),
                        )
                        .arg(
                            Arg::new("reminder")
                                .long("reminder")
                                .value_parser(value_parser!(i64))
                                .default_value("3")
                                .help("Days before the due date to remind"),
                        ),
                )
                .subcommand(Command::new("list").arg(json_flag()))
                .subcommand(
                    Command::new("pay")
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(account_opt("Account charged for the bill"))
                        .arg(Arg::new("date").long("date")),
                )
                .subcommand(
                    Command::new("rm").arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Summaries and trends")
                .subcommand(Command::new("balance").arg(json_flag()))
                .subcommand(Command::new("items").args(range_args()).arg(json_flag()))
                .subcommand(Command::new("daily").args(range_args()).arg(json_flag()))
                .subcommand(Command::new("monthly").args(range_args()).arg(json_flag())),
        )
        .subcommand(
            Command::new("export")
                .about("Export transactions")
                .subcommand(
                    Command::new("csv").arg(
                        Arg::new("out")
                            .long("out")
                            .help("Write to this file instead of stdout"),
                    ),
                ),
        )
        .subcommand(
            Command::new("backup")
                .about("Encrypted full backups")
                .subcommand(
                    Command::new("export")
                        .arg(Arg::new("password").long("password").required(true))
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("dir").long("dir").default_value(".")),
                )
                .subcommand(
                    Command::new("import")
                        .arg(Arg::new("file").required(true))
                        .arg(Arg::new("password").long("password").required(true)),
                ),
        )
        .subcommand(
            Command::new("settings")
                .about("Key/value preferences")
                .subcommand(Command::new("get").arg(Arg::new("key").required(true)))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                )
                .subcommand(Command::new("currency").arg(Arg::new("symbol")))
                .subcommand(Command::new("list").arg(json_flag())),
        )
        .subcommand(
            Command::new("reset")
                .about("Delete every row in the store")
                .arg(
                    Arg::new("yes")
                        .long("yes")
                        .action(ArgAction::SetTrue)
                        .help("Confirm the reset"),
                ),
        )
}
