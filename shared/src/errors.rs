//! Error types for the calculators

use std::fmt;
use thiserror::Error;

/// Calculator error types
#[derive(Error, Debug)]
pub enum CalcError {
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Last-inputs store error types
///
/// Never reaches the user; the cache layer logs and drops these.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Every violation found in one form submission, in rule order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    messages: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages.join("; "))
    }
}

impl From<ValidationErrors> for CalcError {
    fn from(errors: ValidationErrors) -> Self {
        CalcError::Validation(errors)
    }
}
