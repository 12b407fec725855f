use std::fmt;
use std::sync::Arc;

use quiz_core::badges::BadgeEngine;
use quiz_core::model::{Crediting, Progress, Quiz, QuizSession, QuizSummary, RewardPolicy};
use tracing::{debug, info};

use super::view::QuestionView;
use crate::Clock;
use crate::error::QuizServiceError;
use crate::progress_store::ProgressStore;

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

/// What the completion routine produced for a finished quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizCompletion {
    pub summary: QuizSummary,
    /// Badges unlocked by this quiz, in grant order.
    pub new_badges: Vec<String>,
    /// Points from correct answers in this run.
    pub answer_points: u64,
    /// Points from badges unlocked by this run.
    pub bonus_points: u64,
    /// Progress after everything was applied.
    pub progress: Progress,
}

impl QuizCompletion {
    #[must_use]
    pub fn points_earned(&self) -> u64 {
        self.answer_points.saturating_add(self.bonus_points)
    }
}

/// Result of answering a single question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub complete: bool,
    /// Points earned by this answer, whether credited now or held.
    pub points_awarded: u64,
    /// Present only on the answer that finished the quiz.
    pub completion: Option<QuizCompletion>,
}

//
// ─── RUN ───────────────────────────────────────────────────────────────────────
//

/// A quiz session plus the point ledger for this play-through.
pub struct QuizRun {
    session: QuizSession,
    credited: u64,
    pending: u64,
    /// Badges recorded so far by the completion routine, kept across retries.
    granted: Vec<String>,
    bonus: u64,
    completion: Option<QuizCompletion>,
}

impl QuizRun {
    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.session.is_complete()
    }

    /// Answer points earned but held until completion.
    #[must_use]
    pub fn pending_points(&self) -> u64 {
        self.pending
    }

    #[must_use]
    pub fn completion(&self) -> Option<&QuizCompletion> {
        self.completion.as_ref()
    }
}

impl fmt::Debug for QuizRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizRun")
            .field("session", &self.session)
            .field("credited", &self.credited)
            .field("pending", &self.pending)
            .field("granted", &self.granted)
            .field("completed", &self.completion.is_some())
            .finish()
    }
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Orchestrates quiz sessions, point crediting and badge unlocking.
///
/// This is the only writer of learner progress.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    policy: RewardPolicy,
    engine: BadgeEngine,
    store: ProgressStore,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(clock: Clock, policy: RewardPolicy, store: ProgressStore) -> Self {
        let engine = BadgeEngine::from_policy(&policy);
        Self {
            clock,
            policy,
            engine,
            store,
        }
    }

    /// Current learner progress for display.
    pub async fn progress(&self) -> Progress {
        self.store.load().await
    }

    /// Start a fresh run of `quiz`.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::InvalidQuiz` if the quiz cannot be played
    /// to completion.
    pub fn start_quiz(&self, quiz: Arc<Quiz>) -> Result<QuizRun, QuizServiceError> {
        let quiz_id = quiz.id().clone();
        let session = QuizSession::start(quiz, self.clock.now())?;
        info!(quiz_id = %quiz_id, questions = session.total(), "quiz started");
        Ok(QuizRun {
            session,
            credited: 0,
            pending: 0,
            granted: Vec::new(),
            bonus: 0,
            completion: None,
        })
    }

    /// The question the learner should answer next.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` once the quiz is complete.
    pub fn current_question(&self, run: &QuizRun) -> Result<QuestionView, QuizServiceError> {
        Ok(QuestionView::from_session(&run.session)?)
    }

    /// Score an answer for the current question.
    ///
    /// Correct answers earn `points_per_correct`; with immediate crediting
    /// they are persisted before this returns. The answer that finishes the
    /// quiz also runs the completion routine.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` if the quiz already finished, or
    /// `QuizServiceError::Storage` if persisting points or badges fails. The
    /// answer still counts then: points that could not be written are held
    /// for the completion routine, which `finish` retries.
    pub async fn answer(
        &self,
        run: &mut QuizRun,
        option_key: &str,
    ) -> Result<AnswerOutcome, QuizServiceError> {
        let correct = run.session.submit_answer(option_key, self.clock.now())?;
        debug!(
            quiz_id = %run.session.quiz().id(),
            question = run.session.cursor(),
            correct,
            "answer scored"
        );

        let points_awarded = if correct {
            self.policy.points_per_correct()
        } else {
            0
        };
        if points_awarded > 0 {
            match self.policy.crediting() {
                Crediting::Immediate => {
                    if let Err(err) = self.store.apply_points_delta(points_awarded).await {
                        run.pending += points_awarded;
                        return Err(err.into());
                    }
                    run.credited += points_awarded;
                }
                Crediting::OnCompletion => run.pending += points_awarded,
            }
        }

        let completion = if run.session.is_complete() {
            Some(self.finish(run).await?)
        } else {
            None
        };

        Ok(AnswerOutcome {
            correct,
            complete: run.session.is_complete(),
            points_awarded,
            completion,
        })
    }

    /// Run the completion routine for a finished quiz.
    ///
    /// Called by `answer` on the final question. Repeated calls return the
    /// recorded result; after a storage failure a call retries what was
    /// left undone. Each badge is written together with its bonus, so a
    /// retry never skips a bonus.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` if questions remain, or
    /// `QuizServiceError::Storage` if a write fails.
    pub async fn finish(&self, run: &mut QuizRun) -> Result<QuizCompletion, QuizServiceError> {
        if let Some(done) = &run.completion {
            return Ok(done.clone());
        }
        let summary = run.session.summary()?;

        // Answer points land before badges are evaluated so thresholds see
        // the post-quiz total.
        if run.pending > 0 {
            self.store.apply_points_delta(run.pending).await?;
            run.credited += run.pending;
            run.pending = 0;
        }

        let before = self.store.load().await;
        let award = self.engine.evaluate(&before, &summary);

        for badge in &award.granted {
            if !self
                .store
                .grant_badge_with_bonus(&badge.name, badge.bonus)
                .await?
            {
                continue;
            }
            run.bonus += badge.bonus;
            info!(badge = %badge.name, bonus = badge.bonus, "badge granted");
            run.granted.push(badge.name.clone());
        }

        let completion = QuizCompletion {
            summary,
            new_badges: run.granted.clone(),
            answer_points: run.credited,
            bonus_points: run.bonus,
            progress: self.store.load().await,
        };
        info!(
            quiz_id = %completion.summary.quiz_id(),
            score = completion.summary.score(),
            total = completion.summary.total(),
            points_earned = completion.points_earned(),
            "quiz completed"
        );

        run.completion = Some(completion.clone());
        Ok(completion)
    }
}

impl fmt::Debug for QuizLoopService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizLoopService")
            .field("clock", &self.clock)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
