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

//! Currency conversion.
//!
//! The ledger never talks to the network itself. It asks a [`RateLookup`] for
//! a positive rate and multiplies. [`HttpRateLookup`] is the production
//! lookup, backed by an exchangerate.host style `convert` endpoint;
//! [`StaticRates`] serves fixed rates for offline use and tests.

use crate::base::Currency;
use crate::config::RateSettings;
use crate::error::RateError;
use reqwest::Url;
use reqwest::blocking::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Source of conversion rates for a currency pair.
pub trait RateLookup {
    /// Returns how many units of `to` one unit of `from` buys.
    ///
    /// Implementations must only ever return a strictly positive rate.
    fn rate_of(&self, from: &Currency, to: &Currency) -> Result<Decimal, RateError>;
}

/// Multiplies `amount` by `rate`.
///
/// # Errors
///
/// [`RateError::Overflow`] if the product does not fit in a `Decimal`.
pub fn convert(amount: Decimal, rate: Decimal) -> Result<Decimal, RateError> {
    amount.checked_mul(rate).ok_or(RateError::Overflow)
}

/// Result of converting an amount for display.
///
/// A failed lookup is not an error at this level: the original amount is
/// shown as-is with a notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    Converted {
        amount: Decimal,
        from: Currency,
        to: Currency,
        rate: Decimal,
        converted: Decimal,
    },
    Unconverted {
        amount: Decimal,
        currency: Currency,
        notice: RateError,
    },
}

impl Conversion {
    /// The figure to show: converted when possible, the original otherwise.
    pub fn display_amount(&self) -> Decimal {
        match self {
            Self::Converted { converted, .. } => *converted,
            Self::Unconverted { amount, .. } => *amount,
        }
    }

    pub fn notice(&self) -> Option<&RateError> {
        match self {
            Self::Converted { .. } => None,
            Self::Unconverted { notice, .. } => Some(notice),
        }
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Converted {
                amount,
                from,
                to,
                converted,
                ..
            } => write!(f, "{amount} {from} = {:.2} {to}", converted.round_dp(2)),
            Self::Unconverted {
                amount,
                currency,
                notice,
            } => write!(f, "{amount} {currency} (conversion unavailable: {notice})"),
        }
    }
}

/// Converts `amount` from one currency to another, falling back to the
/// unconverted amount when the lookup fails.
pub fn convert_for_display(
    lookup: &dyn RateLookup,
    amount: Decimal,
    from: &Currency,
    to: &Currency,
) -> Conversion {
    let outcome = lookup
        .rate_of(from, to)
        .and_then(|rate| convert(amount, rate).map(|converted| (rate, converted)));
    match outcome {
        Ok((rate, converted)) => Conversion::Converted {
            amount,
            from: from.clone(),
            to: to.clone(),
            rate,
            converted,
        },
        Err(notice) => {
            tracing::warn!(%from, %to, error = %notice, "currency conversion failed");
            Conversion::Unconverted {
                amount,
                currency: from.clone(),
                notice,
            }
        }
    }
}

/// Fixed rate table.
///
/// A pair converts to itself at rate 1. The inverse of a registered pair is
/// not derived.
#[derive(Debug, Clone, Default)]
pub struct StaticRates {
    rates: HashMap<(Currency, Currency), Decimal>,
}

impl StaticRates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rate. Non-positive rates are ignored.
    pub fn with_rate(mut self, from: Currency, to: Currency, rate: Decimal) -> Self {
        if rate > Decimal::ZERO {
            self.rates.insert((from, to), rate);
        }
        self
    }
}

impl RateLookup for StaticRates {
    fn rate_of(&self, from: &Currency, to: &Currency) -> Result<Decimal, RateError> {
        if from == to {
            return Ok(Decimal::ONE);
        }
        self.rates
            .get(&(from.clone(), to.clone()))
            .copied()
            .ok_or_else(|| RateError::Unsupported {
                from: from.to_string(),
                to: to.to_string(),
            })
    }
}

/// Body of a `convert` response.
///
/// Only `result` matters; a missing or null result means the pair is not
/// quoted. The number is read as written, so `0.2133` stays `0.2133`.
#[derive(Debug, Deserialize)]
struct ConvertResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    result: Option<Decimal>,
}

/// Blocking HTTP rate lookup with a bounded wait.
#[derive(Debug, Clone)]
pub struct HttpRateLookup {
    endpoint: Url,
    access_key: Option<String>,
    http: Client,
}

impl HttpRateLookup {
    pub fn new(settings: &RateSettings) -> Result<Self, RateError> {
        let endpoint = Url::parse(&settings.endpoint)
            .map_err(|err| RateError::Unreachable(format!("invalid endpoint: {err}")))?;
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|err| RateError::Unreachable(err.to_string()))?;

        Ok(Self {
            endpoint,
            access_key: settings.access_key.clone(),
            http,
        })
    }

    fn unsupported(from: &Currency, to: &Currency) -> RateError {
        RateError::Unsupported {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl RateLookup for HttpRateLookup {
    fn rate_of(&self, from: &Currency, to: &Currency) -> Result<Decimal, RateError> {
        if from == to {
            return Ok(Decimal::ONE);
        }

        let mut request = self.http.get(self.endpoint.clone()).query(&[
            ("from", from.as_str()),
            ("to", to.as_str()),
            ("amount", "1"),
        ]);
        if let Some(key) = &self.access_key {
            request = request.query(&[("access_key", key.as_str())]);
        }

        tracing::debug!(%from, %to, endpoint = %self.endpoint, "requesting conversion rate");
        let response = request.send().map_err(|err| {
            if err.is_timeout() {
                RateError::Timeout
            } else {
                RateError::Unreachable(err.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RateError::Unreachable(format!("HTTP {status}")));
        }

        let body = response.json::<ConvertResponse>().map_err(|err| {
            if err.is_timeout() {
                RateError::Timeout
            } else {
                RateError::Malformed(err.to_string())
            }
        })?;

        if body.success == Some(false) {
            return Err(Self::unsupported(from, to));
        }
        let rate = body.result.ok_or_else(|| Self::unsupported(from, to))?;
        if rate <= Decimal::ZERO {
            return Err(RateError::NonPositive);
        }

        Ok(rate)
    }
}
