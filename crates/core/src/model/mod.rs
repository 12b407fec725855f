mod ids;
mod progress;
mod quiz;
mod reward;
mod session;

pub use ids::QuizId;
pub use progress::{POINTS_PER_LEVEL, Progress};
pub use quiz::{InvalidQuizError, Question, Quiz};
pub use reward::{BadgeCondition, BadgeRule, Crediting, RewardPolicy, RewardPolicyError};
pub use session::{QuizProgress, QuizSession, QuizSummary, SessionStateError};

#[cfg(test)]
pub(crate) use quiz::question;
#[cfg(test)]
pub(crate) use session::summary_for_tests;
