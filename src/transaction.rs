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

//! Transaction records.
//!
//! A [`TransactionRecord`] is the fixed-shape row the ledger stores. Its
//! direction lives in [`TransactionKind`]; the amount is always a positive
//! magnitude. Records are built from a [`NewTransaction`] form by the ledger,
//! or decoded from the store, and are never mutated afterwards.

use crate::base::{Category, Currency};
use crate::error::ValidationError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest amount a single record may carry: one quadrillion.
///
/// Keeps every sum the reporter computes far inside `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Checks that `amount` is positive and at most [`MAX_AMOUNT`].
pub fn check_amount(amount: Decimal) -> Result<(), ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::InvalidAmount);
    }
    if amount > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge { max: MAX_AMOUNT });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(format!("unknown transaction type '{other}'")),
        }
    }
}

/// Raw input for a new ledger entry, as collected from the user.
///
/// Text fields are kept as typed so the ledger's validation policy can tell a
/// blank field from a defaulted one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    /// Falls back to the ledger's base currency when absent.
    pub currency: Option<Currency>,
}

impl NewTransaction {
    pub fn new(date: NaiveDate, kind: TransactionKind, amount: Decimal) -> Self {
        Self {
            date,
            kind,
            amount,
            category: String::new(),
            description: String::new(),
            currency: None,
        }
    }

    pub fn income(date: NaiveDate, amount: Decimal) -> Self {
        Self::new(date, TransactionKind::Income, amount)
    }

    pub fn expense(date: NaiveDate, amount: Decimal) -> Self {
        Self::new(date, TransactionKind::Expense, amount)
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }
}

/// One logged income or expense event.
///
/// # Invariants
///
/// - `0 < amount <= MAX_AMOUNT`; direction is carried by `kind`, never by sign.
/// - `category` is never blank (see [`Category`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    date: NaiveDate,
    kind: TransactionKind,
    amount: Decimal,
    category: Category,
    description: Option<String>,
    currency: Currency,
}

impl TransactionRecord {
    /// Builds a record, rejecting amounts outside `(0, MAX_AMOUNT]`.
    ///
    /// A blank description is stored as `None`.
    pub fn new(
        date: NaiveDate,
        kind: TransactionKind,
        amount: Decimal,
        category: Category,
        description: Option<String>,
        currency: Currency,
    ) -> Result<Self, ValidationError> {
        check_amount(amount)?;
        let description = description
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        Ok(Self {
            date,
            kind,
            amount,
            category,
            description,
            currency,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Amount with the sign implied by `kind`: positive for income,
    /// negative for expense.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}
