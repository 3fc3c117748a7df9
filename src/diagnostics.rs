use crate::graph::{GraphIndex, last4};
use serde::Serialize;

/// Errors block generation; warnings never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Ordered collection of plain-text diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Diagnostics {
    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        match severity {
            Severity::Error => self.errors.push(message.into()),
            Severity::Warning => self.warnings.push(message.into()),
        }
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// The user-visible name of a node for messages: its label, or the kind and a
/// short id suffix. Unknown ids fall back to the suffix alone.
pub fn name_of(index: &GraphIndex<'_>, id: &str) -> String {
    match index.node(id) {
        Some(node) => node.display_name(),
        None => format!("…{}", last4(id)),
    }
}
