mod view;
mod workflow;

// Public API of the quiz subsystem.
pub use crate::error::QuizServiceError;
pub use view::{OptionView, QuestionView};
pub use workflow::{AnswerOutcome, QuizCompletion, QuizLoopService, QuizRun};
