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

//! Error types for ledger entry, rate lookup, and persistence.
//!
//! None of these are fatal: each is reported to the user and the ledger is
//! left in a consistent state.

use thiserror::Error;

/// Entry-level validation failures raised by [`Ledger::add`](crate::Ledger::add).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Amount is zero or negative
    #[error("invalid amount (must be positive)")]
    InvalidAmount,

    /// Amount is above [`MAX_AMOUNT`](crate::MAX_AMOUNT)
    #[error("amount too large (at most {max})")]
    AmountTooLarge { max: rust_decimal::Decimal },

    /// Category is blank and the policy requires one
    #[error("missing category")]
    MissingCategory,

    /// Description is blank and the policy requires one
    #[error("missing description")]
    MissingDescription,

    /// Currency code is not three ASCII letters
    #[error("invalid currency code '{0}'")]
    InvalidCurrency(String),
}

/// Currency rate lookup failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateError {
    /// The rate source does not quote this pair
    #[error("unsupported currency pair {from}/{to}")]
    Unsupported { from: String, to: String },

    /// The rate source could not be reached
    #[error("rate service unreachable: {0}")]
    Unreachable(String),

    /// The rate source did not answer within the configured timeout
    #[error("rate service timed out")]
    Timeout,

    /// The response could not be understood
    #[error("malformed rate response: {0}")]
    Malformed(String),

    /// The rate source answered with a zero or negative rate
    #[error("rate service returned a non-positive rate")]
    NonPositive,

    /// The converted amount does not fit in a decimal
    #[error("converted amount is out of range")]
    Overflow,
}

/// Backing store failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Failures of a session-level "add transaction" action.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The entry was rejected; nothing changed
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The entry is held in memory but could not be written to the store
    #[error("transaction recorded but not saved: {0}")]
    Unsynced(#[source] StoreError),
}
