// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use finance_tracker::rates::{self, Conversion};
use finance_tracker::reporter::{self, Granularity, Summary};
use finance_tracker::store::write_records;
use finance_tracker::{
    Currency, CsvStore, HttpRateLookup, Ledger, NewTransaction, SessionError, Settings,
    TransactionKind, TransactionRecord,
};
use rust_decimal::Decimal;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

type Session = finance_tracker::Session<CsvStore>;

/// Personal Finance Tracker - log income and expenses, see where the money goes
///
/// Transactions are kept in a CSV file. Totals, category breakdowns, and
/// period series are computed from it on demand.
#[derive(Parser, Debug)]
#[command(name = "finance-tracker")]
#[command(about = "A personal income and expense tracker", long_about = None)]
struct Args {
    /// Optional config file path (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the transaction CSV file
    #[arg(long, global = true, value_name = "FILE")]
    data_file: Option<PathBuf>,

    /// Override the budget limit used by the summary alert
    #[arg(long, global = true)]
    budget_limit: Option<Decimal>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record an income or expense
    Add {
        /// income or expense
        #[arg(long)]
        kind: TransactionKind,
        #[arg(long)]
        amount: Decimal,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Defaults to the base currency
        #[arg(long)]
        currency: Option<Currency>,
    },
    /// Show all transactions, oldest first
    List,
    /// Show total income, expenses, and net saving
    Summary {
        /// Also show the balance converted to this currency
        #[arg(long = "in", value_name = "CURRENCY")]
        target: Option<Currency>,
    },
    /// Show amounts per category
    Categories {
        /// Restrict to income or expense
        #[arg(long)]
        kind: Option<TransactionKind>,
    },
    /// Show net amount and running balance per period
    Periods {
        #[arg(long, default_value = "monthly")]
        granularity: Granularity,
    },
    /// Convert an amount between currencies
    Convert {
        #[arg(long)]
        amount: Decimal,
        /// Defaults to the base currency
        #[arg(long)]
        from: Option<Currency>,
        #[arg(long, default_value = "USD")]
        to: Currency,
    },
    /// Write all transactions as CSV to stdout
    Export,
}

fn main() {
    let args = Args::parse();

    let mut settings = match Settings::load(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };
    if let Some(data_file) = args.data_file {
        settings.data_file = data_file;
    }
    if let Some(budget_limit) = args.budget_limit {
        settings.budget_limit = Some(budget_limit);
    }

    init_tracing(&settings.log_level);

    let base_currency = match settings.base_currency() {
        Ok(currency) => currency,
        Err(e) => {
            eprintln!("Error in configuration: base currency: {}", e);
            process::exit(1);
        }
    };

    let store = CsvStore::new(&settings.data_file, base_currency.clone());
    let ledger = Ledger::new(base_currency).with_policy(settings.validation_policy());
    let mut session = Session::open(ledger, store).with_budget_limit(settings.budget_limit);
    if let Some(e) = session.load_error() {
        eprintln!(
            "Warning: could not read '{}' ({}); starting with an empty ledger",
            settings.data_file.display(),
            e
        );
    }
    if session.skipped_rows() > 0 {
        eprintln!(
            "Warning: skipped {} unreadable row(s) in '{}'; the file will be backed up before it is rewritten",
            session.skipped_rows(),
            settings.data_file.display()
        );
    }

    if let Err(e) = run(args.command, &mut session, &settings) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` takes precedence over the
/// configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("finance_tracker={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("{0}")]
    InvalidInput(String),
}

fn run(command: Command, session: &mut Session, settings: &Settings) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Command::Add {
            kind,
            amount,
            category,
            description,
            date,
            currency,
        } => {
            let mut entry = NewTransaction::new(date.unwrap_or_else(today), kind, amount)
                .category(category)
                .description(description);
            entry.currency = currency;

            session.add(entry)?;
            if let Some(backup) = session.backup_path() {
                eprintln!("Previous data file kept at '{}'", backup.display());
            }
            if let Some(record) = session.ledger().last() {
                writeln!(out, "Transaction successfully added: {}", describe(record))?;
            }
        }
        Command::List => write_list(session.records(), &mut out)?,
        Command::Summary { target } => {
            let base = session.ledger().base_currency().clone();
            write_summary(&session.summary(), &base, &mut out)?;
            if let Some(target) = target {
                let conversion = match HttpRateLookup::new(&settings.rates) {
                    Ok(lookup) => session.balance_in(&lookup, &target),
                    Err(notice) => Conversion::Unconverted {
                        amount: session.summary().totals.balance,
                        currency: base,
                        notice,
                    },
                };
                writeln!(out, "Net saving ({}): {}", target, conversion)?;
            }
        }
        Command::Categories { kind } => {
            write_categories(session.records(), kind, &mut out)?;
        }
        Command::Periods { granularity } => {
            write_periods(session.records(), granularity, &mut out)?;
        }
        Command::Convert { amount, from, to } => {
            if amount <= Decimal::ZERO {
                return Err(CliError::InvalidInput(
                    "amount to convert must be greater than zero".to_string(),
                ));
            }
            let from = from.unwrap_or_else(|| session.ledger().base_currency().clone());
            let conversion = match HttpRateLookup::new(&settings.rates) {
                Ok(lookup) => rates::convert_for_display(&lookup, amount, &from, &to),
                Err(notice) => Conversion::Unconverted {
                    amount,
                    currency: from,
                    notice,
                },
            };
            writeln!(out, "{}", conversion)?;
        }
        Command::Export => {
            write_records(session.records(), &mut out)?;
        }
    }

    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn describe(record: &TransactionRecord) -> String {
    format!(
        "{} {} {} {} ({})",
        record.date(),
        record.kind(),
        record.amount(),
        record.currency(),
        record.category()
    )
}

/// Writes the transaction table, ordered by date.
fn write_list<W: Write>(records: &[TransactionRecord], mut out: W) -> io::Result<()> {
    if records.is_empty() {
        return writeln!(out, "No transactions yet.");
    }

    writeln!(
        out,
        "{:<10}  {:<7}  {:>12}  {:<3}  {:<16}  Description",
        "Date", "Type", "Amount", "Cur", "Category"
    )?;
    for record in reporter::sorted_by_date(records) {
        writeln!(
            out,
            "{:<10}  {:<7}  {:>12}  {:<3}  {:<16}  {}",
            record.date().to_string(),
            record.kind().as_str(),
            record.amount().to_string(),
            record.currency().as_str(),
            record.category().as_str(),
            record.description().unwrap_or("")
        )?;
    }
    Ok(())
}

fn write_summary<W: Write>(summary: &Summary, base: &Currency, mut out: W) -> io::Result<()> {
    let totals = summary.totals;
    writeln!(out, "Total Income:   {} {}", totals.income, base)?;
    writeln!(out, "Total Expenses: {} {}", totals.expense, base)?;
    writeln!(out, "Net Saving:     {} {}", totals.balance, base)?;

    match (summary.budget_limit, summary.over_budget) {
        (Some(limit), Some(true)) => {
            writeln!(out, "Budget alert: expenses exceed the limit of {} {}", limit, base)
        }
        (Some(limit), _) => writeln!(out, "Within budget ({} {})", limit, base),
        _ => Ok(()),
    }
}

fn write_categories<W: Write>(
    records: &[TransactionRecord],
    kind: Option<TransactionKind>,
    mut out: W,
) -> io::Result<()> {
    let sums = reporter::by_category(records, kind);
    if sums.is_empty() {
        return writeln!(out, "No matching transactions.");
    }
    for (category, amount) in sums {
        writeln!(out, "{:<16}  {:>12}", category.as_str(), amount.to_string())?;
    }
    Ok(())
}

fn write_periods<W: Write>(
    records: &[TransactionRecord],
    granularity: Granularity,
    mut out: W,
) -> io::Result<()> {
    let series = reporter::by_period(records, granularity);
    if series.is_empty() {
        return writeln!(out, "No transactions yet.");
    }

    writeln!(out, "{:<10}  {:>12}  {:>12}", "Period", "Net", "Balance")?;
    let cumulative = reporter::cumulative_balance(&series);
    for (point, running) in series.iter().zip(cumulative.iter()) {
        writeln!(
            out,
            "{:<10}  {:>12}  {:>12}",
            point.period.to_string(),
            point.net.to_string(),
            running.running_total.to_string()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use finance_tracker::{Category, MemoryStore, TransactionRecord};
    use rust_decimal_macros::dec;

    fn record(day: u32, kind: TransactionKind, amount: Decimal, category: &str) -> TransactionRecord {
        TransactionRecord::new(
            NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            kind,
            amount,
            Category::new(category),
            None,
            Currency::parse("MYR").unwrap(),
        )
        .unwrap()
    }

    fn render<F: FnOnce(&mut Vec<u8>) -> io::Result<()>>(f: F) -> String {
        let mut output = Vec::new();
        f(&mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn args_parse_add_command() {
        let args = Args::try_parse_from([
            "finance-tracker",
            "add",
            "--kind",
            "expense",
            "--amount",
            "12.50",
            "--category",
            "Food",
            "--date",
            "2025-01-02",
        ])
        .unwrap();

        match args.command {
            Command::Add {
                kind,
                amount,
                category,
                date,
                currency,
                ..
            } => {
                assert_eq!(kind, TransactionKind::Expense);
                assert_eq!(amount, dec!(12.50));
                assert_eq!(category, "Food");
                assert_eq!(date, NaiveDate::from_ymd_opt(2025, 1, 2));
                assert_eq!(currency, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn args_reject_unknown_kind() {
        let result = Args::try_parse_from([
            "finance-tracker",
            "add",
            "--kind",
            "transfer",
            "--amount",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn args_accept_global_flags_after_subcommand() {
        let args =
            Args::try_parse_from(["finance-tracker", "summary", "--data-file", "other.csv"])
                .unwrap();
        assert_eq!(args.data_file, Some(PathBuf::from("other.csv")));
    }

    #[test]
    fn list_is_sorted_by_date() {
        let records = vec![
            record(5, TransactionKind::Expense, dec!(3), "Food"),
            record(1, TransactionKind::Income, dec!(100), "Salary"),
        ];

        let output = render(|out| write_list(&records, out));
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("2025-01-01"));
        assert!(lines[2].starts_with("2025-01-05"));
    }

    #[test]
    fn empty_list_has_a_message() {
        let output = render(|out| write_list(&[], out));
        assert_eq!(output, "No transactions yet.\n");
    }

    #[test]
    fn summary_shows_budget_alert() {
        let records = vec![
            record(1, TransactionKind::Income, dec!(1000), "Salary"),
            record(2, TransactionKind::Expense, dec!(400), "Rent"),
        ];
        let myr = Currency::parse("MYR").unwrap();

        let summary = reporter::summarize(&records, Some(dec!(300)));
        let output = render(|out| write_summary(&summary, &myr, out));
        assert!(output.contains("Total Income:   1000 MYR"));
        assert!(output.contains("Total Expenses: 400 MYR"));
        assert!(output.contains("Net Saving:     600 MYR"));
        assert!(output.contains("Budget alert"));

        let summary = reporter::summarize(&records, None);
        let output = render(|out| write_summary(&summary, &myr, out));
        assert!(!output.contains("budget"));
        assert!(!output.contains("Budget"));
    }

    #[test]
    fn categories_filtered_by_kind() {
        let records = vec![
            record(1, TransactionKind::Income, dec!(1000), "Salary"),
            record(2, TransactionKind::Expense, dec!(250), "Food"),
        ];

        let output = render(|out| write_categories(&records, Some(TransactionKind::Expense), out));
        assert!(output.contains("Food"));
        assert!(!output.contains("Salary"));
    }

    #[test]
    fn periods_include_running_balance() {
        let records = vec![
            record(2, TransactionKind::Income, dec!(100), "Salary"),
            record(2, TransactionKind::Expense, dec!(40), "Food"),
            record(3, TransactionKind::Expense, dec!(10), "Food"),
        ];

        let output = render(|out| write_periods(&records, Granularity::Daily, out));
        let lines: Vec<Vec<&str>> = output
            .lines()
            .skip(1)
            .map(|line| line.split_whitespace().collect())
            .collect();
        assert_eq!(lines[0], vec!["2025-01-02", "60", "60"]);
        assert_eq!(lines[1], vec!["2025-01-03", "-10", "50"]);
    }

    #[test]
    fn session_over_memory_store_feeds_the_writers() {
        let myr = Currency::parse("MYR").unwrap();
        let mut session =
            finance_tracker::Session::open(Ledger::new(myr.clone()), MemoryStore::new());
        session
            .add(
                NewTransaction::income(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), dec!(5))
                    .category("Gift"),
            )
            .unwrap();

        let output = render(|out| write_categories(session.records(), None, out));
        assert!(output.contains("Gift"));
    }
}
