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

//! Derived figures over a snapshot of ledger records.
//!
//! Every function here is a pure function of its input slice: no state is
//! kept and the records are never reordered in place. Amounts are summed as
//! recorded, whatever their currency.

use crate::base::Category;
use crate::transaction::{TransactionKind, TransactionRecord};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Income, expense, and their difference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    /// `income - expense`
    pub balance: Decimal,
}

/// Bucket size for period series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Granularity {
    Daily,
    #[default]
    Monthly,
    Yearly,
}

impl Granularity {
    /// First day of the period containing `date`.
    pub fn period_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Daily => date,
            Self::Monthly => date.with_day(1).unwrap_or(date),
            Self::Yearly => date.with_ordinal(1).unwrap_or(date),
        }
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" => Ok(Self::Daily),
            "monthly" | "month" => Ok(Self::Monthly),
            "yearly" | "year" => Ok(Self::Yearly),
            other => Err(format!("unknown granularity '{other}'")),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        })
    }
}

/// Net amount (income minus expense) of one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodNet {
    pub period: NaiveDate,
    pub net: Decimal,
}

/// Running balance at the end of one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CumulativePoint {
    pub period: NaiveDate,
    pub running_total: Decimal,
}

/// Totals together with the budget check, as shown on the summary screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub totals: Totals,
    pub budget_limit: Option<Decimal>,
    /// `None` when no budget limit is configured.
    pub over_budget: Option<bool>,
}

pub fn totals(records: &[TransactionRecord]) -> Totals {
    let (income, expense) =
        records
            .iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(income, expense), record| {
                match record.kind() {
                    TransactionKind::Income => (income + record.amount(), expense),
                    TransactionKind::Expense => (income, expense + record.amount()),
                }
            });

    Totals {
        income,
        expense,
        balance: income - expense,
    }
}

/// Sums amounts per category, optionally for one kind only.
///
/// Categories without a matching record do not appear in the result.
pub fn by_category(
    records: &[TransactionRecord],
    kind: Option<TransactionKind>,
) -> BTreeMap<Category, Decimal> {
    let mut sums = BTreeMap::new();
    for record in records
        .iter()
        .filter(|record| kind.is_none_or(|kind| record.kind() == kind))
    {
        *sums
            .entry(record.category().clone())
            .or_insert(Decimal::ZERO) += record.amount();
    }
    sums
}

/// Sums amounts per kind. A kind without records is omitted.
pub fn by_kind(records: &[TransactionRecord]) -> BTreeMap<TransactionKind, Decimal> {
    let mut sums = BTreeMap::new();
    for record in records {
        *sums.entry(record.kind()).or_insert(Decimal::ZERO) += record.amount();
    }
    sums
}

/// Net amount per period, ascending by period, whatever the input order.
pub fn by_period(records: &[TransactionRecord], granularity: Granularity) -> Vec<PeriodNet> {
    let mut nets: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for record in records {
        *nets
            .entry(granularity.period_start(record.date()))
            .or_insert(Decimal::ZERO) += record.signed_amount();
    }

    nets.into_iter()
        .map(|(period, net)| PeriodNet { period, net })
        .collect()
}

/// Prefix sum of a period series.
///
/// The series is ordered by period before summing, so the first point's
/// running total is the earliest period's own net amount.
pub fn cumulative_balance(series: &[PeriodNet]) -> Vec<CumulativePoint> {
    let mut ordered = series.to_vec();
    ordered.sort_by_key(|point| point.period);

    let mut running_total = Decimal::ZERO;
    ordered
        .into_iter()
        .map(|point| {
            running_total += point.net;
            CumulativePoint {
                period: point.period,
                running_total,
            }
        })
        .collect()
}

/// True iff spending exceeds the limit. Spending exactly the limit is fine.
pub fn budget_alert(total_expense: Decimal, budget_limit: Decimal) -> bool {
    total_expense > budget_limit
}

pub fn summarize(records: &[TransactionRecord], budget_limit: Option<Decimal>) -> Summary {
    let totals = totals(records);
    Summary {
        totals,
        budget_limit,
        over_budget: budget_limit.map(|limit| budget_alert(totals.expense, limit)),
    }
}

/// Records ordered by date for display. Ties keep ledger order.
pub fn sorted_by_date(records: &[TransactionRecord]) -> Vec<&TransactionRecord> {
    let mut sorted: Vec<&TransactionRecord> = records.iter().collect();
    sorted.sort_by_key(|record| record.date());
    sorted
}
