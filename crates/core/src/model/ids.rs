use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a quiz as issued by the external catalog.
///
/// Catalog identifiers are opaque strings (document ids), so no numeric
/// structure is assumed.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizId(String);

impl QuizId {
    /// Creates a new `QuizId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for QuizId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuizId({})", self.0)
    }
}

impl fmt::Display for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_id_serializes_as_plain_string() {
        let id = QuizId::new("64fa0c");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"64fa0c\"");
        assert_eq!(format!("{id:?}"), "QuizId(64fa0c)");
    }
}
