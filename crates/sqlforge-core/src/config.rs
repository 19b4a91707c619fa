// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Engine configuration.
//!
//! | Key | Env var | Default |
//! |-----|---------|---------|
//! | `dialect` | `SQLFORGE_DIALECT` | `postgres` |
//! | `batch_mode` | `SQLFORGE_BATCH_MODE` | `uniform` |
//! | `default_page_size` | `SQLFORGE_PAGE_SIZE` | `20` |
//!
//! ```rust,ignore
//! let config = EngineConfig::from_json(r#"{ "dialect": "mssql", "default_page_size": 50 }"#)?;
//! assert_eq!(config.dialect, Dialect::SqlServer);
//!
//! let config = EngineConfig::from_env()?;
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{batch::BatchMode, dialect::Dialect, error::CodeGenError};

/// Environment variable naming the dialect.
pub const ENV_DIALECT: &str = "SQLFORGE_DIALECT";
/// Environment variable naming the batch mode.
pub const ENV_BATCH_MODE: &str = "SQLFORGE_BATCH_MODE";
/// Environment variable holding the default page size.
pub const ENV_PAGE_SIZE: &str = "SQLFORGE_PAGE_SIZE";

const DEFAULT_PAGE_SIZE: u32 = 20;

/// Failure while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed or unknown JSON.
    #[error("invalid engine configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Unsupported dialect tag.
    #[error(transparent)]
    Dialect(#[from] CodeGenError),

    /// A value that does not parse.
    #[error("invalid value `{value}` for {key}")]
    InvalidValue {
        /// Setting name.
        key:   &'static str,
        /// Rejected value.
        value: String
    }
}

/// Runtime settings of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Active dialect.
    pub dialect:           Dialect,
    /// NULL treatment in batches.
    pub batch_mode:        BatchMode,
    /// Page size used when a caller asks for a page without one.
    pub default_page_size: u32
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dialect:           Dialect::default(),
            batch_mode:        BatchMode::default(),
            default_page_size: DEFAULT_PAGE_SIZE
        }
    }
}

impl EngineConfig {
    /// Defaults with another dialect.
    #[must_use]
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    /// Parse JSON; missing keys take defaults, unknown keys are rejected.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Json`] or [`ConfigError::InvalidValue`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.check()
    }

    /// Read settings through `lookup`; unset keys take defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Dialect`] or [`ConfigError::InvalidValue`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(dialect) = lookup(ENV_DIALECT) {
            config.dialect = dialect.parse()?;
        }
        if let Some(mode) = lookup(ENV_BATCH_MODE) {
            config.batch_mode = match mode.trim().to_ascii_lowercase().as_str() {
                "uniform" => BatchMode::Uniform,
                "skip_nulls" | "skip-nulls" => BatchMode::SkipNulls,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key:   ENV_BATCH_MODE,
                        value: mode
                    });
                }
            };
        }
        if let Some(size) = lookup(ENV_PAGE_SIZE) {
            config.default_page_size =
                size.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key:   ENV_PAGE_SIZE,
                        value: size.clone()
                    })?;
        }
        config.check()
    }

    /// Read settings from the process environment.
    ///
    /// # Errors
    ///
    /// Same as [`EngineConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn check(self) -> Result<Self, ConfigError> {
        if self.default_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                key:   "default_page_size",
                value: "0".into()
            });
        }
        Ok(self)
    }
}
