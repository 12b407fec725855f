use quiz_core::model::{QuizSession, SessionStateError};

/// One selectable answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub key: String,
    pub text: String,
}

/// Presentation-agnostic snapshot of the active question.
///
/// The correct key is deliberately absent; presentation layers only get what
/// they need to ask the question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    /// Zero-based position in the quiz.
    pub index: usize,
    pub total: usize,
    pub text: String,
    /// Options ordered by key.
    pub options: Vec<OptionView>,
}

impl QuestionView {
    /// Snapshot the question under the session cursor.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::Complete` if no question remains.
    pub fn from_session(session: &QuizSession) -> Result<Self, SessionStateError> {
        let question = session.current_question()?;
        Ok(Self {
            index: session.cursor(),
            total: session.total(),
            text: question.text().to_owned(),
            options: question
                .options()
                .iter()
                .map(|(key, text)| OptionView {
                    key: key.clone(),
                    text: text.clone(),
                })
                .collect(),
        })
    }

    /// One-based position, e.g. for "Question 2 of 5".
    #[must_use]
    pub fn number(&self) -> usize {
        self.index + 1
    }

    #[must_use]
    pub fn has_option(&self, key: &str) -> bool {
        self.options.iter().any(|o| o.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Question, Quiz, QuizId};
    use quiz_core::time::fixed_now;
    use std::sync::Arc;

    #[test]
    fn view_lists_options_in_key_order() {
        let quiz = Quiz::new(
            QuizId::new("q"),
            "Order",
            vec![Question::new(
                "Pick one",
                [
                    ("C".to_string(), "third".to_string()),
                    ("A".to_string(), "first".to_string()),
                    ("B".to_string(), "second".to_string()),
                ],
                "B",
            )],
        );
        let mut session = QuizSession::start(Arc::new(quiz), fixed_now()).unwrap();
        let view = QuestionView::from_session(&session).unwrap();

        assert_eq!(view.number(), 1);
        assert_eq!(view.total, 1);
        let keys: Vec<_> = view.options.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
        assert!(view.has_option("C"));
        assert!(!view.has_option("D"));

        session.submit_answer("B", fixed_now()).unwrap();
        assert_eq!(
            QuestionView::from_session(&session),
            Err(SessionStateError::Complete)
        );
    }
}
