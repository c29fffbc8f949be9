//! Structured error types shared across strata crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`StrataError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (identifiers, sizes, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

/// Canonical error type for the strata crates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum StrataError {
    /// An operation referenced a vertex that was never created.
    #[error("unknown vertex: {0}")]
    UnknownVertex(ErrorInfo),
    /// The classifier was asked about an edge outside the four known shapes.
    #[error("undetermined edge color: {0}")]
    UndeterminedColor(ErrorInfo),
    /// Caller supplied a negative count or a zero thread count.
    #[error("invalid parameter: {0}")]
    InvalidParameter(ErrorInfo),
    /// A graph store failed its structural self-check.
    #[error("invariant violated: {0}")]
    Invariant(ErrorInfo),
    /// Worker lifecycle and job execution failures.
    #[error("worker error: {0}")]
    Worker(ErrorInfo),
    /// Serialization and decoding errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// Filesystem errors raised by output writers.
    #[error("io error: {0}")]
    Io(ErrorInfo),
}

impl StrataError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            StrataError::UnknownVertex(info)
            | StrataError::UndeterminedColor(info)
            | StrataError::InvalidParameter(info)
            | StrataError::Invariant(info)
            | StrataError::Worker(info)
            | StrataError::Serde(info)
            | StrataError::Io(info) => info,
        }
    }

    fn info_mut(&mut self) -> &mut ErrorInfo {
        match self {
            StrataError::UnknownVertex(info)
            | StrataError::UndeterminedColor(info)
            | StrataError::InvalidParameter(info)
            | StrataError::Invariant(info)
            | StrataError::Worker(info)
            | StrataError::Serde(info)
            | StrataError::Io(info) => info,
        }
    }

    /// Returns the stable machine readable code of the payload.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// Adds a context entry to the payload, keeping the error family.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.info_mut()
            .context
            .insert(key.into(), value.to_string());
        self
    }

    /// Builds an [`StrataError::InvalidParameter`] naming the rejected field.
    pub fn invalid_parameter(field: &str, value: impl ToString, message: &str) -> Self {
        StrataError::InvalidParameter(
            ErrorInfo::new("invalid-parameter", message)
                .with_context("field", field)
                .with_context("value", value),
        )
    }

    /// Builds an [`StrataError::Io`] from a filesystem failure.
    pub fn io(operation: &str, err: impl ToString) -> Self {
        StrataError::Io(ErrorInfo::new("io", err.to_string()).with_context("operation", operation))
    }
}
