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

//! Reporter integration tests over ledger snapshots.

use chrono::NaiveDate;
use finance_tracker::reporter::{self, CumulativePoint, Granularity, PeriodNet, Totals};
use finance_tracker::{Category, Currency, Ledger, MAX_AMOUNT, NewTransaction, TransactionKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ledger_with(entries: Vec<NewTransaction>) -> Ledger {
    let mut ledger = Ledger::new(Currency::parse("MYR").unwrap());
    for entry in entries {
        ledger.add(entry).unwrap();
    }
    ledger
}

fn sample_ledger() -> Ledger {
    let day = date(2025, 1, 15);
    ledger_with(vec![
        NewTransaction::income(day, dec!(1000)).category("Salary"),
        NewTransaction::expense(day, dec!(250)).category("Food"),
        NewTransaction::expense(day, dec!(150)).category("Transport"),
    ])
}

#[test]
fn totals_of_empty_input_are_zero() {
    assert_eq!(
        reporter::totals(&[]),
        Totals {
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
            balance: Decimal::ZERO,
        }
    );
}

#[test]
fn totals_scenario() {
    let ledger = sample_ledger();
    assert_eq!(
        reporter::totals(ledger.all()),
        Totals {
            income: dec!(1000),
            expense: dec!(400),
            balance: dec!(600),
        }
    );
}

#[test]
fn expense_breakdown_scenario() {
    let ledger = sample_ledger();

    let expected: BTreeMap<Category, Decimal> = [
        (Category::new("Food"), dec!(250)),
        (Category::new("Transport"), dec!(150)),
    ]
    .into_iter()
    .collect();
    assert_eq!(
        reporter::by_category(ledger.all(), Some(TransactionKind::Expense)),
        expected
    );
}

#[test]
fn unfiltered_breakdown_includes_all_kinds() {
    let ledger = sample_ledger();
    let sums = reporter::by_category(ledger.all(), None);

    assert_eq!(sums.len(), 3);
    assert_eq!(sums[&Category::new("Salary")], dec!(1000));
}

#[test]
fn breakdown_omits_categories_without_matches() {
    let ledger = sample_ledger();
    let income = reporter::by_category(ledger.all(), Some(TransactionKind::Income));

    assert_eq!(income.len(), 1);
    assert!(!income.contains_key(&Category::new("Food")));
}

#[test]
fn breakdown_sums_repeated_categories() {
    let day = date(2025, 1, 1);
    let ledger = ledger_with(vec![
        NewTransaction::expense(day, dec!(10.25)).category("Food"),
        NewTransaction::expense(day, dec!(4.75)).category("Food"),
        NewTransaction::expense(day, dec!(3)),
    ]);

    let sums = reporter::by_category(ledger.all(), Some(TransactionKind::Expense));
    assert_eq!(sums[&Category::new("Food")], dec!(15.00));
    assert_eq!(sums[&Category::new("Uncategorized")], dec!(3));
}

#[test]
fn by_kind_omits_missing_kind() {
    let day = date(2025, 1, 1);
    let ledger = ledger_with(vec![
        NewTransaction::expense(day, dec!(10)),
        NewTransaction::expense(day, dec!(5)),
    ]);

    let sums = reporter::by_kind(ledger.all());
    assert_eq!(sums.len(), 1);
    assert_eq!(sums[&TransactionKind::Expense], dec!(15));
}

#[test]
fn same_day_income_and_expense_net_to_one_point() {
    let day = date(2025, 3, 8);
    let ledger = ledger_with(vec![
        NewTransaction::income(day, dec!(100)),
        NewTransaction::expense(day, dec!(40)),
    ]);

    let series = reporter::by_period(ledger.all(), Granularity::Daily);
    assert_eq!(
        series,
        vec![PeriodNet {
            period: day,
            net: dec!(60),
        }]
    );

    let cumulative = reporter::cumulative_balance(&series);
    assert_eq!(cumulative[0].running_total, dec!(60));
}

#[test]
fn single_record_gives_one_point_series() {
    let ledger = ledger_with(vec![NewTransaction::expense(date(2025, 2, 2), dec!(7))]);

    let series = reporter::by_period(ledger.all(), Granularity::Monthly);
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].period, date(2025, 2, 1));
    assert_eq!(series[0].net, dec!(-7));
}

#[test]
fn unsorted_dates_produce_ascending_cumulative_series() {
    let ledger = ledger_with(vec![
        NewTransaction::income(date(2025, 3, 1), dec!(30)),
        NewTransaction::income(date(2025, 1, 1), dec!(10)),
        NewTransaction::expense(date(2025, 2, 1), dec!(5)),
    ]);

    let series = reporter::by_period(ledger.all(), Granularity::Daily);
    let cumulative = reporter::cumulative_balance(&series);
    assert_eq!(
        cumulative,
        vec![
            CumulativePoint {
                period: date(2025, 1, 1),
                running_total: dec!(10),
            },
            CumulativePoint {
                period: date(2025, 2, 1),
                running_total: dec!(5),
            },
            CumulativePoint {
                period: date(2025, 3, 1),
                running_total: dec!(35),
            },
        ]
    );
}

#[test]
fn yearly_series_spans_years() {
    let ledger = ledger_with(vec![
        NewTransaction::income(date(2024, 12, 31), dec!(1)),
        NewTransaction::income(date(2025, 1, 1), dec!(2)),
    ]);

    let series = reporter::by_period(ledger.all(), Granularity::Yearly);
    let periods: Vec<NaiveDate> = series.iter().map(|p| p.period).collect();
    assert_eq!(periods, vec![date(2024, 1, 1), date(2025, 1, 1)]);
}

#[test]
fn empty_input_gives_empty_series() {
    assert!(reporter::by_period(&[], Granularity::Daily).is_empty());
    assert!(reporter::cumulative_balance(&[]).is_empty());
}

#[test]
fn budget_alert_is_strict() {
    assert!(reporter::budget_alert(dec!(500.01), dec!(500)));
    assert!(!reporter::budget_alert(dec!(500), dec!(500)));
    assert!(!reporter::budget_alert(dec!(0), dec!(500)));
}

#[test]
fn reporting_does_not_touch_the_ledger() {
    let ledger = sample_ledger();
    let before = ledger.all().to_vec();

    let _ = reporter::totals(ledger.all());
    let _ = reporter::by_period(ledger.all(), Granularity::Daily);
    let _ = reporter::sorted_by_date(ledger.all());

    assert_eq!(ledger.all(), before.as_slice());
}

#[test]
fn reports_over_the_largest_amounts_stay_exact() {
    let mut entries = Vec::new();
    for month in 1..=12 {
        for _ in 0..100 {
            entries.push(
                NewTransaction::income(date(2025, month, 1), MAX_AMOUNT).category("Windfall"),
            );
        }
        entries.push(
            NewTransaction::expense(date(2025, month, 2), MAX_AMOUNT).category("Windfall"),
        );
    }
    let ledger = ledger_with(entries);

    let totals = reporter::totals(ledger.all());
    assert_eq!(totals.income, MAX_AMOUNT * dec!(1200));
    assert_eq!(totals.expense, MAX_AMOUNT * dec!(12));
    assert_eq!(totals.balance, MAX_AMOUNT * dec!(1188));

    assert_eq!(
        reporter::by_category(ledger.all(), None)[&Category::new("Windfall")],
        MAX_AMOUNT * dec!(1212)
    );
    assert_eq!(
        reporter::by_kind(ledger.all())[&TransactionKind::Income],
        MAX_AMOUNT * dec!(1200)
    );

    let series = reporter::by_period(ledger.all(), Granularity::Monthly);
    assert!(series.iter().all(|point| point.net == MAX_AMOUNT * dec!(99)));
    let cumulative = reporter::cumulative_balance(&series);
    assert_eq!(
        cumulative.last().map(|point| point.running_total),
        Some(totals.balance)
    );
}
