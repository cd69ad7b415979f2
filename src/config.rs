use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::series::{Granularity, DEFAULT_THRESHOLD};
use crate::session::Settings;

/// What to show and how to aggregate it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Account filter (case-insensitive regular expression). Empty shows everything.
    pub filter: String,

    /// Commodity to value everything in. When unset, amounts stay native.
    pub display_commodity: Option<String>,

    /// Collapse every commodity into the display commodity.
    pub merge: bool,

    /// Index postings by their effective (auxiliary) date.
    pub effective_dates: bool,

    /// Deepest account level to show separately; 0 means unlimited.
    pub depth_limit: usize,

    /// Period size for the timed breakdown.
    pub granularity: Granularity,
}

fn default_threshold() -> Decimal {
    DEFAULT_THRESHOLD
}

/// Pie chart configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PieConfig {
    /// Minimum share of the running total for a wedge of its own.
    #[serde(default = "default_threshold", with = "decimal_string")]
    pub threshold: Decimal,

    /// Only include accounts under this name prefix.
    pub account: Option<String>,
}

impl Default for PieConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            account: None,
        }
    }
}

/// Price lookup configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Ignore prices older than this many days. Unset means no limit.
    pub lookback_days: Option<u32>,
}

/// Display/output formatting configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// When true, render values with thousands separators.
    pub grouping: bool,

    /// When true, pad values to the commodity's display precision.
    pub fixed_decimals: bool,
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub view: ViewConfig,
    pub pie: PieConfig,
    pub pricing: PricingConfig,
    pub display: DisplayConfig,

    /// Reject postings to accounts the journal did not declare.
    pub strict_accounts: bool,
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Checks values that parse but make no sense.
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.pie.threshold)
    }

    /// Load config from a file, or return default config if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Session settings described by this config.
    pub fn settings(&self) -> Settings {
        Settings {
            filter: self.view.filter.clone(),
            display_commodity: self.view.display_commodity.clone(),
            merge: self.view.merge,
            effective_dates: self.view.effective_dates,
            depth_limit: self.view.depth_limit,
            granularity: self.view.granularity,
            pie_threshold: self.pie.threshold,
            pie_account: self.pie.account.clone(),
            strict_accounts: self.strict_accounts,
        }
    }
}

/// A pie threshold is a share of the running total, so it must lie in (0, 1].
pub fn validate_threshold(threshold: Decimal) -> Result<()> {
    ensure!(
        threshold > Decimal::ZERO && threshold <= Decimal::ONE,
        "pie threshold must be greater than 0 and at most 1, got {threshold}"
    );
    Ok(())
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./ledgerview.toml` if it exists in current directory
/// 2. `<config dir>/ledgerview/ledgerview.toml`
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from("ledgerview.toml");
    if local_config.exists() {
        return local_config;
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("ledgerview").join("ledgerview.toml");
    }

    local_config
}

/// Decimals are written as strings in TOML to keep them exact.
mod decimal_string {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.normalize().to_string())
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Float(f64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Decimal::from_str(s.trim()).map_err(de::Error::custom),
            Raw::Float(f) => Decimal::try_from(f).map_err(de::Error::custom),
        }
    }
}
