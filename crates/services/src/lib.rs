#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog;
pub mod error;
pub mod progress_store;
pub mod quiz;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use catalog::QuizCatalog;
pub use error::{AppServicesError, CatalogError, QuizServiceError};
pub use progress_store::ProgressStore;
pub use quiz::{AnswerOutcome, OptionView, QuestionView, QuizCompletion, QuizLoopService, QuizRun};
