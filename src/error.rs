//! Error types and handling for ChargeGuard
//!
//! This module defines the error types used throughout the application.
//! The first three variants form the field-write taxonomy surfaced to
//! callers of the write entry point; the rest cover the ambient layers
//! (configuration, storage, logging).

use thiserror::Error;

/// Result type alias for ChargeGuard operations
pub type Result<T> = std::result::Result<T, ChargerError>;

/// Main error type for ChargeGuard
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChargerError {
    /// The field name is not part of the register schema
    #[error("Unknown field: {name}")]
    UnknownField { name: String },

    /// The physical value lies outside the field's valid range
    #[error("Value out of range for {field}: got {got}, expected {min}..={max}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        got: i64,
    },

    /// Two-wire bus transport failure (including bus-level timeouts)
    #[error("Bus error: {message}")]
    Bus { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// The controller task is gone or dropped a reply
    #[error("Channel error: {message}")]
    Channel { message: String },
}

impl ChargerError {
    /// Create a new unknown-field error
    pub fn unknown_field<S: Into<String>>(name: S) -> Self {
        ChargerError::UnknownField { name: name.into() }
    }

    /// Create a new out-of-range error
    pub fn out_of_range<S: Into<String>>(field: S, min: i64, max: i64, got: i64) -> Self {
        ChargerError::OutOfRange {
            field: field.into(),
            min,
            max,
            got,
        }
    }

    /// Create a new bus error
    pub fn bus<S: Into<String>>(message: S) -> Self {
        ChargerError::Bus {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        ChargerError::Config {
            message: message.into(),
        }
    }

    /// Create a new serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        ChargerError::Serialization {
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        ChargerError::Io {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        ChargerError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new channel error
    pub fn channel<S: Into<String>>(message: S) -> Self {
        ChargerError::Channel {
            message: message.into(),
        }
    }

    /// Short kind tag used in API replies and log lines
    pub fn kind(&self) -> &'static str {
        match self {
            ChargerError::UnknownField { .. } => "UnknownField",
            ChargerError::OutOfRange { .. } => "OutOfRange",
            ChargerError::Bus { .. } => "BusError",
            ChargerError::Config { .. } => "Config",
            ChargerError::Serialization { .. } => "Serialization",
            ChargerError::Io { .. } => "Io",
            ChargerError::Validation { .. } => "Validation",
            ChargerError::Channel { .. } => "Channel",
        }
    }
}

impl From<std::io::Error> for ChargerError {
    fn from(err: std::io::Error) -> Self {
        ChargerError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for ChargerError {
    fn from(err: serde_yaml::Error) -> Self {
        ChargerError::serialization(err.to_string())
    }
}

impl From<serde_json::Error> for ChargerError {
    fn from(err: serde_json::Error) -> Self {
        ChargerError::serialization(err.to_string())
    }
}
