use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuizId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Reasons a quiz cannot be played to a valid terminal state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidQuizError {
    #[error("quiz has no questions")]
    NoQuestions,

    #[error("question {index} marks `{key}` as correct but has no such option")]
    UnknownCorrectOption { index: usize, key: String },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single multiple-choice question.
///
/// Options are keyed by a short label (`"A"`, `"B"`, ...). Keys are kept in a
/// sorted map so presentation order is stable regardless of input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    text: String,
    options: BTreeMap<String, String>,
    correct: String,
}

impl Question {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        options: impl IntoIterator<Item = (String, String)>,
        correct: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            options: options.into_iter().collect(),
            correct: correct.into(),
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }

    #[must_use]
    pub fn correct_key(&self) -> &str {
        &self.correct
    }

    /// Exact, case-sensitive comparison against the correct key.
    #[must_use]
    pub fn is_correct(&self, option_key: &str) -> bool {
        self.correct == option_key
    }

    fn has_valid_answer(&self) -> bool {
        self.options.contains_key(&self.correct)
    }
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// Read-only quiz definition supplied by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    #[serde(alias = "_id")]
    id: QuizId,
    title: String,
    #[serde(default)]
    questions: Vec<Question>,
}

impl Quiz {
    #[must_use]
    pub fn new(id: QuizId, title: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            id,
            title: title.into(),
            questions,
        }
    }

    #[must_use]
    pub fn id(&self) -> &QuizId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Checks that the quiz can be played to completion.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuizError::NoQuestions` for an empty quiz, or
    /// `InvalidQuizError::UnknownCorrectOption` for the first question whose
    /// correct key is not among its options.
    pub fn validate(&self) -> Result<(), InvalidQuizError> {
        if self.questions.is_empty() {
            return Err(InvalidQuizError::NoQuestions);
        }
        if let Some((index, question)) = self
            .questions
            .iter()
            .enumerate()
            .find(|(_, q)| !q.has_valid_answer())
        {
            return Err(InvalidQuizError::UnknownCorrectOption {
                index,
                key: question.correct.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn question(text: &str, keys: &[&str], correct: &str) -> Question {
    Question::new(
        text,
        keys.iter().map(|k| ((*k).to_owned(), format!("option {k}"))),
        correct,
    )
}
