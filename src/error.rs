//! Error types for binding, coercion and decoding.

use core::fmt;

use crate::de::DecodeError;

/// Errors surfaced by binding, typed accessors and decode operations.
///
/// `get` itself never returns one of these: an absent key is `None`, and
/// type-mismatch detection lives in the coercion step.
#[derive(Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// A structurally invalid provider or collection was handed to a bind
    /// operation.
    InvalidProvider {
        /// What was wrong with the input.
        reason: String,
    },
    /// A resolved raw value could not be parsed into the requested type.
    TypeCoercion {
        /// The normalized key that was read.
        key: String,
        /// The raw value that failed to parse.
        value: String,
        /// The requested type.
        expected: &'static str,
    },
    /// The merged configuration could not be decoded into the target
    /// structure.
    DecodeTarget(DecodeError),
}

impl ConfigError {
    pub(crate) fn invalid_provider(reason: impl Into<String>) -> Self {
        ConfigError::InvalidProvider {
            reason: reason.into(),
        }
    }

    pub(crate) fn coercion(key: &str, value: &crate::value::Value, expected: &'static str) -> Self {
        ConfigError::TypeCoercion {
            key: key.to_string(),
            value: value.to_string(),
            expected,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidProvider { reason } => {
                write!(f, "invalid provider: {reason}")
            }
            ConfigError::TypeCoercion {
                key,
                value,
                expected,
            } => {
                write!(f, "cannot coerce '{value}' at key '{key}' into {expected}")
            }
            ConfigError::DecodeTarget(e) => {
                write!(f, "cannot decode configuration into target: {e}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::DecodeTarget(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DecodeError> for ConfigError {
    fn from(e: DecodeError) -> Self {
        ConfigError::DecodeTarget(e)
    }
}
