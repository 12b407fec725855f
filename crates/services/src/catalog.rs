use std::path::Path;
use std::sync::Arc;

use quiz_core::model::{Quiz, QuizId};
use serde::Deserialize;

use crate::error::CatalogError;

/// Read-only list of quizzes available to the learner.
///
/// Entries are not validated here; a broken quiz is rejected when a session
/// is started from it.
#[derive(Debug, Clone, Default)]
pub struct QuizCatalog {
    quizzes: Vec<Arc<Quiz>>,
}

/// Catalog documents come either as a bare array or wrapped in `quizzes`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    List(Vec<Quiz>),
    Wrapped { quizzes: Vec<Quiz> },
}

impl QuizCatalog {
    #[must_use]
    pub fn new(quizzes: Vec<Quiz>) -> Self {
        Self {
            quizzes: quizzes.into_iter().map(Arc::new).collect(),
        }
    }

    /// Parse a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` if the document is not a quiz list.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let quizzes = match serde_json::from_str::<CatalogDocument>(json)? {
            CatalogDocument::List(quizzes) | CatalogDocument::Wrapped { quizzes } => quizzes,
        };
        Ok(Self::new(quizzes))
    }

    /// Read and parse a catalog file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read, or
    /// `CatalogError::Parse` if it is not a quiz list.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    #[must_use]
    pub fn quizzes(&self) -> &[Arc<Quiz>] {
        &self.quizzes
    }

    #[must_use]
    pub fn get(&self, id: &QuizId) -> Option<Arc<Quiz>> {
        self.quizzes.iter().find(|q| q.id() == id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }
}
