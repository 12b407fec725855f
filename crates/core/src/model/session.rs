use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::model::ids::QuizId;
use crate::model::quiz::{InvalidQuizError, Question, Quiz};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// An operation was invoked in the wrong session state.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("quiz session already completed")]
    Complete,

    #[error("quiz session is not complete yet")]
    NotComplete,
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

/// Outcome of a completed quiz session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSummary {
    quiz_id: QuizId,
    score: u32,
    total: u32,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl QuizSummary {
    #[must_use]
    pub fn quiz_id(&self) -> &QuizId {
        &self.quiz_id
    }

    /// Number of correctly answered questions.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Number of questions in the quiz.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Time from starting the session to the final answer.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.completed_at - self.started_at
    }

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.score == self.total
    }

    /// Score as a whole percentage, rounded down.
    #[must_use]
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let pct = u64::from(self.score) * 100 / u64::from(self.total);
        u32::try_from(pct).unwrap_or(100)
    }
}

/// Aggregated view of session progress, useful for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One traversal of a quiz's questions.
///
/// States are `Active(cursor)` for `cursor < total` and `Complete` once the
/// cursor reaches the end. `submit_answer` is the only mutation.
#[derive(Clone)]
pub struct QuizSession {
    quiz: Arc<Quiz>,
    cursor: usize,
    correct: usize,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Start a session at the first question.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuizError` if the quiz has no questions or any
    /// question's correct key is missing from its options.
    pub fn start(quiz: Arc<Quiz>, started_at: DateTime<Utc>) -> Result<Self, InvalidQuizError> {
        quiz.validate()?;
        Ok(Self {
            quiz,
            cursor: 0,
            correct: 0,
            started_at,
            completed_at: None,
        })
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.quiz.len()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.total().saturating_sub(self.cursor)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cursor >= self.total()
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress {
            total: self.total(),
            answered: self.cursor,
            correct: self.correct,
            remaining: self.remaining(),
            is_complete: self.is_complete(),
        }
    }

    /// The question under the cursor.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::Complete` once every question is answered.
    pub fn current_question(&self) -> Result<&Question, SessionStateError> {
        self.quiz
            .questions()
            .get(self.cursor)
            .ok_or(SessionStateError::Complete)
    }

    /// Score the answer for the current question and advance the cursor.
    ///
    /// Returns whether the answer matched the correct key.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::Complete` if the session already finished;
    /// the session is left untouched.
    pub fn submit_answer(
        &mut self,
        option_key: &str,
        answered_at: DateTime<Utc>,
    ) -> Result<bool, SessionStateError> {
        let is_correct = self.current_question()?.is_correct(option_key);

        if is_correct {
            self.correct += 1;
        }
        self.cursor += 1;
        if self.is_complete() {
            self.completed_at = Some(answered_at);
        }

        Ok(is_correct)
    }

    /// Final score for a completed session.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::NotComplete` while questions remain.
    pub fn summary(&self) -> Result<QuizSummary, SessionStateError> {
        let Some(completed_at) = self.completed_at else {
            return Err(SessionStateError::NotComplete);
        };
        Ok(QuizSummary {
            quiz_id: self.quiz.id().clone(),
            score: u32::try_from(self.correct).unwrap_or(u32::MAX),
            total: u32::try_from(self.total()).unwrap_or(u32::MAX),
            started_at: self.started_at,
            completed_at,
        })
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("quiz_id", self.quiz.id())
            .field("questions_len", &self.quiz.len())
            .field("cursor", &self.cursor)
            .field("correct", &self.correct)
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) fn summary_for_tests(score: u32, total: u32) -> QuizSummary {
    let now = crate::time::fixed_now();
    QuizSummary {
        quiz_id: QuizId::new("test"),
        score,
        total,
        started_at: now,
        completed_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::quiz::question;
    use crate::time::{fixed_clock, fixed_now};

    fn two_question_quiz() -> Arc<Quiz> {
        Arc::new(Quiz::new(
            QuizId::new("quiz-1"),
            "Two",
            vec![
                question("first", &["A", "B"], "A"),
                question("second", &["A", "B"], "B"),
            ],
        ))
    }

    #[test]
    fn start_rejects_invalid_quiz() {
        let empty = Arc::new(Quiz::new(QuizId::new("e"), "Empty", Vec::new()));
        let err = QuizSession::start(empty, fixed_now()).unwrap_err();
        assert_eq!(err, InvalidQuizError::NoQuestions);
    }

    #[test]
    fn session_advances_and_completes() {
        let mut session = QuizSession::start(two_question_quiz(), fixed_now()).unwrap();
        assert_eq!(session.current_question().unwrap().text(), "first");
        assert!(!session.is_complete());

        assert!(session.submit_answer("A", fixed_now()).unwrap());
        assert_eq!(session.cursor(), 1);
        assert_eq!(session.current_question().unwrap().text(), "second");
        assert_eq!(session.summary(), Err(SessionStateError::NotComplete));

        assert!(!session.submit_answer("A", fixed_now()).unwrap());
        assert!(session.is_complete());
        assert_eq!(
            session.current_question().unwrap_err(),
            SessionStateError::Complete
        );

        let summary = session.summary().unwrap();
        assert_eq!(summary.score(), 1);
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.percent(), 50);
        assert!(!summary.is_perfect());
        assert_eq!(summary.completed_at(), fixed_now());
    }

    #[test]
    fn summary_spans_start_to_final_answer() {
        let mut clock = fixed_clock();
        let mut session = QuizSession::start(two_question_quiz(), clock.now()).unwrap();
        clock.advance(Duration::seconds(20));
        session.submit_answer("A", clock.now()).unwrap();
        clock.advance(Duration::seconds(25));
        session.submit_answer("B", clock.now()).unwrap();

        let summary = session.summary().unwrap();
        assert_eq!(summary.completed_at(), clock.now());
        assert_eq!(summary.duration(), Duration::seconds(45));
    }

    #[test]
    fn answering_after_completion_leaves_state_unchanged() {
        let mut session = QuizSession::start(two_question_quiz(), fixed_now()).unwrap();
        session.submit_answer("A", fixed_now()).unwrap();
        session.submit_answer("B", fixed_now()).unwrap();

        let err = session.submit_answer("A", fixed_now()).unwrap_err();
        assert_eq!(err, SessionStateError::Complete);
        assert_eq!(session.cursor(), 2);
        assert_eq!(session.correct_count(), 2);
        assert!(session.summary().unwrap().is_perfect());
    }

    #[test]
    fn score_never_exceeds_answered() {
        let quiz = Arc::new(Quiz::new(
            QuizId::new("q"),
            "Mixed",
            vec![
                question("1", &["A", "B"], "A"),
                question("2", &["A", "B"], "B"),
                question("3", &["A", "B", "C"], "C"),
                question("4", &["A", "B"], "A"),
            ],
        ));
        let answers = ["A", "A", "C", "B"];
        let mut session = QuizSession::start(quiz, fixed_now()).unwrap();
        for (n, key) in answers.iter().enumerate() {
            session.submit_answer(key, fixed_now()).unwrap();
            let progress = session.progress();
            assert_eq!(progress.answered, n + 1);
            assert!(progress.correct <= progress.answered);
        }
        let summary = session.summary().unwrap();
        assert_eq!(summary.score(), 2);
        assert_eq!(summary.total(), 4);
    }
}
