use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIs};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIs, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    /// The symbol was skipped on purpose, e.g. it uses an unsupported feature.
    Warning,
    /// The symbol (or the whole image) could not be processed.
    Error,
}

/// A skipped symbol and the reason it was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub symbol: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: `{}`: {}", self.severity, self.symbol, self.message)
    }
}

/// Ordered collector of the diagnostics of one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn push(
        &mut self,
        severity: Severity,
        symbol: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.records.push(Diagnostic {
            severity,
            symbol: symbol.into(),
            message: message.into(),
        });
    }

    pub fn warn(&mut self, symbol: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Warning, symbol, message);
    }

    pub fn error(&mut self, symbol: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Error, symbol, message);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter().filter(|d| d.severity.is_warning())
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter().filter(|d| d.severity.is_error())
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn any_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.records.extend(other.records);
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
