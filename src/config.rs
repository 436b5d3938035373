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

//! Layered settings.
//!
//! Values are resolved, lowest priority first, from built-in defaults, an
//! optional TOML file, and `FINANCE_TRACKER_*` environment variables. Nested
//! keys use a double underscore, e.g. `FINANCE_TRACKER_RATES__TIMEOUT_SECS=3`.
//! Command-line flags are applied on top by the binary.

use crate::base::Currency;
use crate::error::ValidationError;
use crate::ledger::ValidationPolicy;
use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/finance";
const ENV_PREFIX: &str = "FINANCE_TRACKER";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_file: PathBuf,
    pub base_currency: String,
    pub log_level: String,
    /// Spending above this triggers the budget alert.
    pub budget_limit: Option<Decimal>,
    pub require_category: bool,
    pub require_description: bool,
    pub rates: RateSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("transactions.csv"),
            base_currency: "MYR".to_string(),
            log_level: "info".to_string(),
            budget_limit: None,
            require_category: false,
            require_description: false,
            rates: RateSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RateSettings {
    pub endpoint: String,
    pub access_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RateSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.exchangerate.host/convert".to_string(),
            access_key: None,
            timeout_secs: 5,
        }
    }
}

impl Settings {
    /// Loads settings from `path` (required when given) or from the default
    /// location (optional), then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_PATH).required(false),
        };

        Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    pub fn base_currency(&self) -> Result<Currency, ValidationError> {
        Currency::parse(&self.base_currency)
    }

    pub fn validation_policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            require_category: self.require_category,
            require_description: self.require_description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::fs;

    fn write_config(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "finance-tracker-config-{}-{name}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("finance.toml");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn empty_file_yields_defaults() {
        let path = write_config("defaults", "");
        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.rates.timeout_secs, 5);
    }

    #[test]
    fn file_values_override_defaults() {
        let path = write_config(
            "override",
            r#"
data_file = "ledger.csv"
base_currency = "usd"
budget_limit = "1500.50"
require_description = true

[rates]
timeout_secs = 2
access_key = "secret"
"#,
        );

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.data_file, PathBuf::from("ledger.csv"));
        assert_eq!(settings.base_currency().unwrap().as_str(), "USD");
        assert_eq!(settings.budget_limit, Some(dec!(1500.50)));
        assert!(settings.validation_policy().require_description);
        assert!(!settings.validation_policy().require_category);
        assert_eq!(settings.rates.timeout_secs, 2);
        assert_eq!(settings.rates.access_key.as_deref(), Some("secret"));
        assert_eq!(settings.rates.endpoint, RateSettings::default().endpoint);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("finance-tracker-no-such-config.toml");
        assert!(Settings::load(Some(&path)).is_err());
    }

    #[test]
    fn invalid_base_currency_is_reported() {
        let settings = Settings {
            base_currency: "ringgit".to_string(),
            ..Settings::default()
        };
        assert!(settings.base_currency().is_err());
    }
}
