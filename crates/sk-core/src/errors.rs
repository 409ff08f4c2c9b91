//! Error taxonomy of the solver.
//!
//! Every failure carries an [`ErrorInfo`]: a stable kebab-case `code` that
//! tests and callers match on, a message, and the offending values as
//! string context. The enum variant says which stage gave up.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Payload shared by every [`SkError`] family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable code, e.g. `decay` or `message-non-finite`.
    pub code: String,
    /// Diagnostic for humans.
    pub message: String,
    /// Offending values keyed by name (parameters, spin indices, sweep number).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// How the caller might recover.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Payload with an empty context and no hint.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Records `key = value`, replacing an earlier entry for `key`.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Attaches a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        let mut entries = self.context.iter();
        if let Some((key, value)) = entries.next() {
            write!(f, " ({key}={value}")?;
            for (key, value) in entries {
                write!(f, ", {key}={value}")?;
            }
            write!(f, ")")?;
        }
        match &self.hint {
            Some(hint) => write!(f, "; hint: {hint}"),
            None => Ok(()),
        }
    }
}

/// Failure of a solver run.
///
/// Running out of sweeps is not an error: a belief-propagation run that
/// exhausts its budget reports `is_converged = false` as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum SkError {
    /// Invalid run parameters, detected before any sweep starts.
    #[error("parameter error: {0}")]
    Parameter(ErrorInfo),
    /// A non-finite value appeared in the message state or a free entropy.
    #[error("numerical error: {0}")]
    Numerical(ErrorInfo),
    /// The replica-symmetric self-consistency iteration failed to settle.
    #[error("oracle error: {0}")]
    Oracle(ErrorInfo),
    /// Configuration loading, thread pool setup and record output.
    #[error("io error: {0}")]
    Io(ErrorInfo),
}

impl SkError {
    /// [`SkError::Parameter`] with a bare payload.
    pub fn parameter(code: &str, message: impl Into<String>) -> Self {
        SkError::Parameter(ErrorInfo::new(code, message))
    }

    /// Payload of any family.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            SkError::Parameter(info)
            | SkError::Numerical(info)
            | SkError::Oracle(info)
            | SkError::Io(info) => info,
        }
    }

    /// Family name as serialized in the `family` tag.
    pub fn family(&self) -> &'static str {
        match self {
            SkError::Parameter(_) => "Parameter",
            SkError::Numerical(_) => "Numerical",
            SkError::Oracle(_) => "Oracle",
            SkError::Io(_) => "Io",
        }
    }

    /// Adds context to the payload while keeping the family.
    pub fn with_context(self, key: impl Into<String>, value: impl ToString) -> Self {
        match self {
            SkError::Parameter(info) => SkError::Parameter(info.with_context(key, value)),
            SkError::Numerical(info) => SkError::Numerical(info.with_context(key, value)),
            SkError::Oracle(info) => SkError::Oracle(info.with_context(key, value)),
            SkError::Io(info) => SkError::Io(info.with_context(key, value)),
        }
    }

    /// True for errors raised by parameter validation.
    pub fn is_parameter(&self) -> bool {
        matches!(self, SkError::Parameter(_))
    }
}
