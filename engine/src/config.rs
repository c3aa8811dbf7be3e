//! Store configuration.

use std::env;

/// Default label attached to the store's log events.
pub const DEFAULT_LABEL: &str = "tome";

/// Default name of the identity field inside every record payload.
pub const DEFAULT_IDENTITY_FIELD: &str = "id";

/// Configuration for a [`Store`](crate::Store).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Label used to tell stores apart in log output
    pub label: String,
    /// Payload field that carries each record's identity
    pub identity_field: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            identity_field: DEFAULT_IDENTITY_FIELD.to_string(),
        }
    }
}

impl StoreConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// `TOME_STORE_LABEL` and `TOME_IDENTITY_FIELD` override the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let label = env::var("TOME_STORE_LABEL").unwrap_or_else(|_| DEFAULT_LABEL.to_string());

        let identity_field = env::var("TOME_IDENTITY_FIELD")
            .unwrap_or_else(|_| DEFAULT_IDENTITY_FIELD.to_string());

        let config = Self {
            label,
            identity_field,
        };
        config.validate()?;
        Ok(config)
    }

    /// Builder-style setter for the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Builder-style setter for the identity field name.
    pub fn with_identity_field(mut self, field: impl Into<String>) -> Self {
        self.identity_field = field.into();
        self
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.identity_field.is_empty() {
            return Err(ConfigError::EmptyIdentityField);
        }
        // The identity must be addressable as a single top-level path segment.
        if self.identity_field.contains('.') {
            return Err(ConfigError::NestedIdentityField(
                self.identity_field.clone(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("identity field name must not be empty")]
    EmptyIdentityField,

    #[error("identity field '{0}' must be a top-level field name")]
    NestedIdentityField(String),
}
