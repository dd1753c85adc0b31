//! Repository configuration loaded from TOML.
//!
//! Every field has a default, so an empty document is a valid config. Values
//! are checked by `validate`, which both loaders run before returning.

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};
use thiserror::Error as ThisError;

/// Largest page size a config may allow.
pub const PAGE_SIZE_CEILING: u32 = 10_000;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

///
/// DialectName
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectName {
    #[default]
    Generic,
    Cosmos,
}

///
/// RepositoryConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepositoryConfig {
    pub dialect: DialectName,
    /// Overrides the container declared by the entity schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    pub default_page_size: u32,
    pub max_page_size: u32,
    /// Log rendered query text at debug level.
    pub debug: bool,
    pub descriptor_cache: DescriptorCacheConfig,
    pub cursor: CursorConfig,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            dialect: DialectName::Generic,
            container: None,
            default_page_size: 100,
            max_page_size: 1_000,
            debug: false,
            descriptor_cache: DescriptorCacheConfig::default(),
            cursor: CursorConfig::default(),
        }
    }
}

impl RepositoryConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_page_size == 0 {
            return Err(ConfigError::invalid(
                "default_page_size",
                "must be greater than zero",
            ));
        }
        if self.max_page_size > PAGE_SIZE_CEILING {
            return Err(ConfigError::invalid(
                "max_page_size",
                format!("must not exceed {PAGE_SIZE_CEILING}"),
            ));
        }
        if self.default_page_size > self.max_page_size {
            return Err(ConfigError::invalid(
                "default_page_size",
                format!(
                    "{} exceeds max_page_size {}",
                    self.default_page_size, self.max_page_size
                ),
            ));
        }
        if self.cursor.max_token_bytes == 0 {
            return Err(ConfigError::invalid(
                "cursor.max_token_bytes",
                "must be greater than zero",
            ));
        }
        if let Some(container) = &self.container
            && container.trim().is_empty()
        {
            return Err(ConfigError::invalid("container", "must not be blank"));
        }

        Ok(())
    }
}

///
/// DescriptorCacheConfig
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DescriptorCacheConfig {
    pub enabled: bool,
}

impl Default for DescriptorCacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

///
/// CursorConfig
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CursorConfig {
    /// Upper bound on decoded cursor payloads.
    pub max_token_bytes: usize,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            max_token_bytes: 16 * 1024,
        }
    }
}
