//! Trace: one provenance relationship triple

use serde::{Deserialize, Serialize};

/// A subject-predicate-object relationship between two nodes.
///
/// A trace has no identity beyond its contents; inserting the same trace
/// twice means the same thing as inserting it once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trace {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Trace {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// True if this trace is `subject --predicate--> *`
    pub fn is_from(&self, subject: &str, predicate: &str) -> bool {
        self.subject == subject && self.predicate == predicate
    }

    /// True if this trace is `* --predicate--> object`
    pub fn is_to(&self, object: &str, predicate: &str) -> bool {
        self.object == object && self.predicate == predicate
    }
}

impl std::fmt::Display for Trace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}
