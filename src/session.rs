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

//! A user session: the ledger, the store it mirrors to, and the actions a
//! user can take against them.
//!
//! The [`Session`] is the single owner of the ledger. Front ends hold one and
//! pass it to each action instead of reaching for shared state. Each action
//! runs to completion before the next one starts.

use crate::base::Currency;
use crate::error::{SessionError, StoreError};
use crate::ledger::Ledger;
use crate::rates::{Conversion, RateLookup, convert_for_display};
use crate::reporter::{self, Summary};
use crate::store::Store;
use crate::transaction::{NewTransaction, TransactionRecord};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

pub struct Session<S: Store> {
    ledger: Ledger,
    store: S,
    budget_limit: Option<Decimal>,
    /// Set when the initial load failed and the ledger started empty.
    load_error: Option<StoreError>,
    /// Stored rows the initial load could not read.
    skipped_rows: usize,
    /// Set until the store's data has been copied aside after a lossy load.
    backup_pending: bool,
    backup: Option<PathBuf>,
    /// Set while the in-memory ledger holds records the store does not.
    unsynced: bool,
}

impl<S: Store> Session<S> {
    /// Opens a session, seeding `ledger` with whatever `store` holds.
    ///
    /// An unreadable store does not prevent the session from starting: the
    /// ledger starts empty and the failure is kept in [`Session::load_error`].
    /// Rows the store could not read are counted in [`Session::skipped_rows`].
    /// In both cases the store is backed up before the first save, and if
    /// that backup fails the save is refused.
    pub fn open(ledger: Ledger, store: S) -> Self {
        let (ledger, load_error, skipped_rows) = match store.load() {
            Ok(loaded) => {
                if !loaded.is_complete() {
                    tracing::warn!(skipped = loaded.skipped, "some stored transactions could not be read");
                }
                (ledger.with_records(loaded.records), None, loaded.skipped)
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load transactions, starting with an empty ledger");
                (ledger, Some(err), 0)
            }
        };
        let backup_pending = load_error.is_some() || skipped_rows > 0;

        Self {
            ledger,
            store,
            budget_limit: None,
            load_error,
            skipped_rows,
            backup_pending,
            backup: None,
            unsynced: false,
        }
    }

    pub fn with_budget_limit(mut self, budget_limit: Option<Decimal>) -> Self {
        self.budget_limit = budget_limit;
        self
    }

    /// Validates and appends an entry, then writes the whole ledger to the
    /// store.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Validation`] - the entry was rejected; nothing changed.
    /// - [`SessionError::Unsynced`] - the record was appended in memory but the
    ///   save failed. A later successful [`Session::sync`] or add persists it.
    pub fn add(&mut self, entry: NewTransaction) -> Result<(), SessionError> {
        self.ledger.add(entry)?;
        self.unsynced = true;
        self.sync().map_err(SessionError::Unsynced)
    }

    /// Writes the full ledger to the store.
    ///
    /// After a lossy load the stored data is backed up first; if the backup
    /// fails nothing is written.
    pub fn sync(&mut self) -> Result<(), StoreError> {
        if self.backup_pending {
            match self.store.back_up() {
                Ok(backup) => {
                    if let Some(path) = &backup {
                        tracing::warn!(backup = %path.display(), "kept a copy of the stored transactions before overwriting them");
                    }
                    self.backup = backup;
                    self.backup_pending = false;
                }
                Err(err) => {
                    tracing::error!(error = %err, "refusing to overwrite stored transactions that could not be backed up");
                    return Err(err);
                }
            }
        }

        match self.store.save(self.ledger.all()) {
            Ok(()) => {
                self.unsynced = false;
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, records = self.ledger.len(), "failed to save transactions");
                Err(err)
            }
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn records(&self) -> &[TransactionRecord] {
        self.ledger.all()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn load_error(&self) -> Option<&StoreError> {
        self.load_error.as_ref()
    }

    /// Number of stored rows that could not be read when the session opened.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Where the stored data was copied before this session first
    /// overwrote it, if it had to be.
    pub fn backup_path(&self) -> Option<&Path> {
        self.backup.as_deref()
    }

    /// True while records added this session have not reached the store.
    pub fn is_unsynced(&self) -> bool {
        self.unsynced
    }

    pub fn summary(&self) -> Summary {
        reporter::summarize(self.ledger.all(), self.budget_limit)
    }

    /// Current balance shown in another currency.
    ///
    /// The ledger is only read; a failed lookup yields the unconverted
    /// balance in the base currency.
    pub fn balance_in(&self, lookup: &dyn RateLookup, to: &Currency) -> Conversion {
        let balance = reporter::totals(self.ledger.all()).balance;
        convert_for_display(lookup, balance, self.ledger.base_currency(), to)
    }
}
