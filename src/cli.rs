// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print one JSON object per line"),
    )
}

/// Fields shared by `trade add` and `trade edit`. Adding requires the core
/// prices; editing makes every field optional and keeps unspecified values.
fn trade_fields(cmd: Command, editing: bool) -> Command {
    let required = !editing;
    let cmd = cmd
        .arg(
            Arg::new("date")
                .long("date")
                .required(required)
                .help("Trade date, YYYY-MM-DD or DD/MM/YYYY"),
        )
        .arg(
            Arg::new("instrument")
                .long("instrument")
                .alias("symbol")
                .required(required)
                .help("Instrument, e.g. Nifty, Bank Nifty, Equity or a ticker"),
        )
        .arg(
            Arg::new("direction")
                .long("direction")
                .required(required)
                .help("Buy or Sell"),
        )
        .arg(
            Arg::new("entry")
                .long("entry")
                .allow_hyphen_values(true)
                .required(required)
                .help("Entry price"),
        )
        .arg(
            Arg::new("sl")
                .long("sl")
                .allow_hyphen_values(true)
                .required(required)
                .help("Stop-loss price"),
        )
        .arg(
            Arg::new("tp")
                .long("tp")
                .allow_hyphen_values(true)
                .required(required)
                .help("Take-profit price"),
        )
        .arg(
            Arg::new("pnl")
                .long("pnl")
                .allow_hyphen_values(true)
                .required(required)
                .help("Realised profit (negative for a loss)"),
        )
        .arg(
            Arg::new("exit")
                .long("exit")
                .allow_hyphen_values(true)
                .help("Exit price"),
        )
        .arg(
            Arg::new("qty")
                .long("qty")
                .value_parser(value_parser!(i64))
                .help("Quantity (at least 1)"),
        )
        .arg(
            Arg::new("outcome")
                .long("outcome")
                .help("TP Hit, SL Hit or Breakeven"),
        )
        .arg(Arg::new("tags").long("tags").help("Free-form tags"))
        .arg(Arg::new("notes").long("notes").help("Free-form notes"))
        .arg(
            Arg::new("fib")
                .long("fib")
                .help("Fibonacci retracement: 23.6, 38.2, 50, 61.8 or 78.6"),
        );

    if editing {
        cmd.arg(
            Arg::new("bos")
                .long("bos")
                .value_parser(value_parser!(bool))
                .help("Break of structure: true or false"),
        )
        .arg(
            Arg::new("retest")
                .long("retest")
                .value_parser(value_parser!(bool))
                .help("Retest entry: true or false"),
        )
    } else {
        cmd.arg(
            Arg::new("bos")
                .long("bos")
                .action(ArgAction::SetTrue)
                .help("Break of structure was present"),
        )
        .arg(
            Arg::new("retest")
                .long("retest")
                .action(ArgAction::SetTrue)
                .help("Entry was taken on a retest"),
        )
    }
}

fn id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .value_parser(value_parser!(i64))
        .help("Trade id")
}

pub fn build_cli() -> Command {
    Command::new("tradelog")
        .about("Trading journal: record trades, review win rate and the equity curve")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env("TRADELOG_DB")
                .help("Path to the journal database"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Log more (-v info, -vv debug)"),
        )
        .subcommand(Command::new("init").about("Create the journal database"))
        .subcommand(
            Command::new("trade")
                .about("Record and browse trades")
                .subcommand(trade_fields(Command::new("add").about("Record a trade"), false))
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List trades")
                        .arg(
                            Arg::new("order")
                                .long("order")
                                .value_parser(["date", "inserted"])
                                .default_value("date")
                                .help("Newest date first, or the order recorded"),
                        )
                        .arg(
                            Arg::new("instrument")
                                .long("instrument")
                                .help("Only this instrument"),
                        )
                        .arg(
                            Arg::new("match")
                                .long("match")
                                .help("Regex matched against tags and notes"),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(
                    Command::new("show")
                        .about("Show one trade")
                        .arg(id_arg())
                        .arg(Arg::new("json").long("json").action(ArgAction::SetTrue)),
                )
                .subcommand(trade_fields(
                    Command::new("edit")
                        .about("Replace a trade's fields; unspecified fields keep their value")
                        .arg(id_arg()),
                    true,
                ))
                .subcommand(Command::new("rm").about("Delete a trade").arg(id_arg())),
        )
        .subcommand(
            Command::new("rr")
                .about("Risk/reward for a planned trade, without saving")
                .arg(Arg::new("entry").long("entry").allow_hyphen_values(true).required(true))
                .arg(Arg::new("sl").long("sl").allow_hyphen_values(true).required(true))
                .arg(Arg::new("tp").long("tp").allow_hyphen_values(true).required(true))
                .arg(Arg::new("direction").long("direction").required(true)),
        )
        .subcommand(
            Command::new("report")
                .about("Statistics and the equity curve")
                .subcommand(json_flags(
                    Command::new("summary").about("Win rate, averages, profit factor").arg(
                        Arg::new("by-instrument")
                            .long("by-instrument")
                            .action(ArgAction::SetTrue),
                    ),
                ))
                .subcommand(json_flags(
                    Command::new("equity")
                        .about("Cumulative profit/loss per day")
                        .arg(
                            Arg::new("policy")
                                .long("policy")
                                .help("Same-day aggregation: 'last' or 'sum'"),
                        )
                        .arg(
                            Arg::new("smooth")
                                .long("smooth")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("raw")
                                .help("3-point centered moving average"),
                        )
                        .arg(
                            Arg::new("raw")
                                .long("raw")
                                .action(ArgAction::SetTrue)
                                .help("Disable smoothing even if configured"),
                        )
                        .arg(
                            Arg::new("csv")
                                .long("csv")
                                .help("Also write date,equity,smoothed to this file"),
                        ),
                )),
        )
        .subcommand(
            Command::new("import").about("Import data").subcommand(
                Command::new("trades")
                    .about("Import trades from CSV")
                    .arg(Arg::new("path").required(true)),
            ),
        )
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("trades")
                    .about("Export trades")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .default_value("csv")
                            .help("csv or json"),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(
            Command::new("config")
                .about("Journal preferences")
                .subcommand(Command::new("get").arg(Arg::new("key")))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Check stored trades for inconsistencies"))
}

/// Whether the command reads or writes the journal. `rr` works on its
/// arguments alone, so no database is opened or created for it.
pub fn uses_journal(matches: &clap::ArgMatches) -> bool {
    !matches!(matches.subcommand_name(), Some("rr"))
}
