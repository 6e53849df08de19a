//! Engine configuration
//!
//! Loaded from TOML; every field has a default so an empty document is valid.
//!
//! ```toml
//! descriptor_cache_capacity = 2048
//! list_separator = ";"
//! ```

use serde::{Deserialize, Serialize};

use crate::describe::DEFAULT_DESCRIPTOR_CAPACITY;
use crate::errors::{LogBindError, Result};
use crate::split::ListSyntax;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Descriptors kept per cache generation
    pub descriptor_cache_capacity: usize,
    pub list_separator: char,
    pub list_quote: char,
    pub list_escape: char,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let syntax = ListSyntax::default();
        Self {
            descriptor_cache_capacity: DEFAULT_DESCRIPTOR_CAPACITY,
            list_separator: syntax.separator,
            list_quote: syntax.quote,
            list_escape: syntax.escape,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for malformed TOML, unknown keys, or values
    /// rejected by [`validate`](Self::validate).
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` when the capacity is zero or the separator
    /// collides with the quote or escape character.
    pub fn validate(&self) -> Result<()> {
        if self.descriptor_cache_capacity == 0 {
            return Err(LogBindError::InvalidConfig {
                reason: "descriptor_cache_capacity must be at least 1".to_string(),
            });
        }
        self.list_syntax().validate()
    }

    pub fn list_syntax(&self) -> ListSyntax {
        ListSyntax {
            separator: self.list_separator,
            quote: self.list_quote,
            escape: self.list_escape,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.descriptor_cache_capacity, 10_000);
        assert_eq!(config.list_separator, ',');
    }

    #[test]
    fn test_overrides() {
        let config =
            EngineConfig::from_toml_str("descriptor_cache_capacity = 64\nlist_separator = \";\"")
                .unwrap();
        assert_eq!(config.descriptor_cache_capacity, 64);
        assert_eq!(config.list_syntax().separator, ';');
        assert_eq!(config.list_syntax().quote, '\'');
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let err = EngineConfig::from_toml_str("descriptor_cache_capacity = 0").unwrap_err();
        assert!(matches!(err, LogBindError::InvalidConfig { .. }));
    }

    #[test]
    fn test_rejects_separator_collision() {
        let err = EngineConfig::from_toml_str("list_separator = \"'\"").unwrap_err();
        assert!(matches!(err, LogBindError::InvalidConfig { .. }));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        assert!(EngineConfig::from_toml_str("cache_size = 3").is_err());
    }
}
