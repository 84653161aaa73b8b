// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{arg, command, value_parser, Command};

pub fn build_cli() -> Command {
    command!()
        .name("folio")
        .about("Folio: append-only investment ledger, holdings, net worth, and dividend schedule")
        .subcommand_required(false)
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("add")
                        .about("Add an account")
                        .arg(arg!(--name <NAME>).required(true))
                        .arg(arg!(--currency <CCY> "USD, EUR, GBP, JPY or HKD").required(true))
                        .arg(arg!(--cash <AMOUNT> "Seed cash balance").required(false)),
                )
                .subcommand(
                    Command::new("list")
                        .about("List accounts")
                        .arg(arg!(--json))
                        .arg(arg!(--jsonl)),
                ),
        )
        .subcommand(
            Command::new("reset")
                .about("Wipe the whole portfolio (accounts, ledger, dividends, prices)")
                .arg(arg!(--yes "Confirm the wipe")),
        )
        .subcommand(
            Command::new("tx")
                .about("Append entries to the ledger")
                .subcommand(cash_entry_cmd("deposit", "Record a cash deposit"))
                .subcommand(cash_entry_cmd("withdraw", "Record a cash withdrawal"))
                .subcommand(trade_entry_cmd("buy", "Record a stock purchase"))
                .subcommand(trade_entry_cmd("sell", "Record a stock sale"))
                .subcommand(
                    Command::new("list")
                        .about("List ledger entries, newest first")
                        .arg(arg!(--account <ACCOUNT>).required(false))
                        .arg(arg!(--month <MONTH> "YYYY-MM").required(false))
                        .arg(
                            arg!(--limit <N>)
                                .required(false)
                                .value_parser(value_parser!(usize)),
                        )
                        .arg(arg!(--json))
                        .arg(arg!(--jsonl)),
                ),
        )
        .subcommand(
            Command::new("holdings")
                .about("Show derived holdings for an account")
                .arg(arg!(--account <ACCOUNT>).required(true))
                .arg(arg!(--json))
                .arg(arg!(--jsonl)),
        )
        .subcommand(
            Command::new("portfolio")
                .about("Aggregate across all accounts")
                .subcommand(
                    Command::new("summary")
                        .about("Net worth, cash/invested split, profit vs funding")
                        .arg(arg!(--json)),
                )
                .subcommand(
                    Command::new("allocation")
                        .about("Market value by symbol, largest first")
                        .arg(
                            arg!(--top <N> "Keep the N largest symbols")
                                .required(false)
                                .value_parser(value_parser!(usize)),
                        )
                        .arg(arg!(--json)),
                ),
        )
        .subcommand(
            Command::new("dividend")
                .about("Dividend schedule")
                .subcommand(
                    Command::new("generate")
                        .about("Project the next four quarterly payments for a holding")
                        .arg(arg!(--symbol <SYMBOL>).required(true))
                        .arg(arg!(--account <ACCOUNT>).required(true))
                        .arg(
                            arg!(--annual <AMOUNT> "Per-share annual dividend estimate")
                                .required(false),
                        )
                        .arg(arg!(--live "Fetch the estimate from Yahoo instead"))
                        .arg(arg!(--"as-of" <DATE> "Schedule start date, default today").required(false)),
                )
                .subcommand(
                    Command::new("list")
                        .about("List the schedule, earliest payment first")
                        .arg(arg!(--json))
                        .arg(arg!(--jsonl)),
                )
                .subcommand(
                    Command::new("toggle")
                        .about("Flip the received flag on one payment")
                        .arg(arg!(--id <ID>).required(true)),
                )
                .subcommand(
                    Command::new("summary")
                        .about("Received vs projected totals")
                        .arg(arg!(--json)),
                ),
        )
        .subcommand(
            Command::new("price")
                .about("Mark prices overriding the last-buy mark")
                .subcommand(
                    Command::new("set")
                        .about("Record a manual mark")
                        .arg(arg!(--symbol <SYMBOL>).required(true))
                        .arg(arg!(--price <PRICE>).required(true))
                        .arg(arg!(--date <DATE> "As-of date, default today").required(false)),
                )
                .subcommand(Command::new("fetch").about("Fetch Yahoo quotes for all held symbols"))
                .subcommand(Command::new("list").about("List stored marks, newest first")),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("snapshot")
                        .about("Write the full portfolio state as JSON")
                        .arg(arg!(--out <FILE>).required(true)),
                )
                .subcommand(
                    Command::new("transactions")
                        .about("Write the ledger as CSV or JSON")
                        .arg(arg!(--format <FORMAT> "csv or json").required(true))
                        .arg(arg!(--out <FILE>).required(true)),
                ),
        )
        .subcommand(
            Command::new("import").about("Import data").subcommand(
                Command::new("snapshot")
                    .about("Replace the portfolio with a snapshot file")
                    .arg(arg!(--file <FILE>).required(true)),
            ),
        )
        .subcommand(Command::new("doctor").about("Check the stored ledger for inconsistencies"))
}

fn cash_entry_cmd(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(arg!(--account <ACCOUNT>).required(true))
        .arg(arg!(--amount <AMOUNT>).required(true))
        .arg(arg!(--date <DATE> "YYYY-MM-DD").required(true))
        .arg(arg!(--fee <FEE>).required(false))
        .arg(arg!(--strict "Refuse entries that would overdraw the account"))
}

fn trade_entry_cmd(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(arg!(--account <ACCOUNT>).required(true))
        .arg(arg!(--symbol <SYMBOL>).required(true))
        .arg(arg!(--quantity <QTY>).required(true))
        .arg(arg!(--price <PRICE>).required(true))
        .arg(arg!(--date <DATE> "YYYY-MM-DD").required(true))
        .arg(arg!(--fee <FEE>).required(false))
        .arg(arg!(--name <NAME> "Company name carried onto the holding").required(false))
        .arg(arg!(--strict "Refuse entries that would overdraw the account"))
}
