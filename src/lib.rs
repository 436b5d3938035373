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

//! # Finance Tracker
//!
//! This library keeps a personal income/expense ledger, derives totals and
//! period reports from it, persists it as CSV, and converts amounts between
//! currencies through a pluggable rate source.
//!
//! ## Core Components
//!
//! - [`Ledger`]: Append-only, validated collection of [`TransactionRecord`]s
//! - [`reporter`]: Pure functions computing totals, breakdowns, and running balances
//! - [`Store`]: Load/save interface, with [`CsvStore`] and [`MemoryStore`]
//! - [`RateLookup`]: Currency rate source, with [`HttpRateLookup`] and [`StaticRates`]
//! - [`Session`]: Owns a ledger and its store for the lifetime of a user session
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use finance_tracker::{Currency, Ledger, NewTransaction, reporter};
//! use rust_decimal_macros::dec;
//!
//! let mut ledger = Ledger::new(Currency::parse("MYR").unwrap());
//! let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
//!
//! ledger.add(NewTransaction::income(day, dec!(1000)).category("Salary")).unwrap();
//! ledger.add(NewTransaction::expense(day, dec!(250)).category("Food")).unwrap();
//!
//! let totals = reporter::totals(ledger.all());
//! assert_eq!(totals.balance, dec!(750));
//! ```

mod base;
pub mod config;
pub mod error;
mod ledger;
pub mod rates;
pub mod reporter;
mod session;
pub mod store;
mod transaction;

pub use base::{Category, Currency};
pub use config::{RateSettings, Settings};
pub use error::{RateError, SessionError, StoreError, ValidationError};
pub use ledger::{Ledger, ValidationPolicy};
pub use rates::{Conversion, HttpRateLookup, RateLookup, StaticRates};
pub use reporter::{CumulativePoint, Granularity, PeriodNet, Summary, Totals};
pub use session::Session;
pub use store::{CsvStore, Loaded, MemoryStore, Store};
pub use transaction::{MAX_AMOUNT, NewTransaction, TransactionKind, TransactionRecord};
