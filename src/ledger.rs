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

//! Append-only transaction ledger.
//!
//! The [`Ledger`] owns the ordered sequence of [`TransactionRecord`]s for a
//! session and is the only place new records are admitted. Records are kept in
//! insertion order; there is no edit or delete. Corrections are made by
//! appending a compensating record.

use crate::base::{Category, Currency};
use crate::error::ValidationError;
use crate::transaction::{NewTransaction, TransactionRecord, check_amount};

/// Which free-text fields must be filled in for an entry to be accepted.
///
/// A blank category is normally defaulted to `Uncategorized`; setting
/// `require_category` rejects it instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationPolicy {
    pub require_category: bool,
    pub require_description: bool,
}

/// Ordered, append-only collection of transaction records.
///
/// Duplicate entries are allowed: two identical submissions produce two
/// records.
#[derive(Debug, Clone)]
pub struct Ledger {
    records: Vec<TransactionRecord>,
    policy: ValidationPolicy,
    /// Currency assigned to entries that do not name one.
    base_currency: Currency,
}

impl Ledger {
    /// Creates an empty ledger with the default validation policy.
    pub fn new(base_currency: Currency) -> Self {
        Self {
            records: Vec::new(),
            policy: ValidationPolicy::default(),
            base_currency,
        }
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Restores previously persisted records, keeping their order.
    ///
    /// Restored records have already passed construction-time checks, so the
    /// entry policy is not re-applied to them.
    pub fn with_records(mut self, records: Vec<TransactionRecord>) -> Self {
        self.records = records;
        self
    }

    /// Validates an entry and appends it as the newest record.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::InvalidAmount`] - amount is zero or negative.
    /// - [`ValidationError::AmountTooLarge`] - amount is above [`MAX_AMOUNT`](crate::MAX_AMOUNT).
    /// - [`ValidationError::MissingCategory`] - category is blank and required.
    /// - [`ValidationError::MissingDescription`] - description is blank and required.
    ///
    /// On error the ledger is left untouched.
    pub fn add(&mut self, entry: NewTransaction) -> Result<(), ValidationError> {
        if let Err(err) = check_amount(entry.amount) {
            tracing::debug!(amount = %entry.amount, error = %err, "rejecting entry");
            return Err(err);
        }
        if self.policy.require_category && entry.category.trim().is_empty() {
            return Err(ValidationError::MissingCategory);
        }
        if self.policy.require_description && entry.description.trim().is_empty() {
            return Err(ValidationError::MissingDescription);
        }

        let currency = entry
            .currency
            .unwrap_or_else(|| self.base_currency.clone());
        let record = TransactionRecord::new(
            entry.date,
            entry.kind,
            entry.amount,
            Category::new(&entry.category),
            Some(entry.description),
            currency,
        )?;

        tracing::debug!(
            date = %record.date(),
            kind = %record.kind(),
            amount = %record.amount(),
            category = %record.category(),
            "transaction added"
        );
        self.records.push(record);
        Ok(())
    }

    /// Returns every record in insertion order.
    pub fn all(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&TransactionRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn base_currency(&self) -> &Currency {
        &self.base_currency
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }
}
