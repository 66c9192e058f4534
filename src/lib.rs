//! Quiz Forge library crate (used by the server and integration tests).
//!
//! # Public API Surface
//!
//! The pipeline assembles the best starter or exit quiz for a lesson plan:
//!
//! - [`QuizService`] fans out to every [`QuizCandidateGenerator`], rates the
//!   resulting pools with one [`QuizEvaluator`] call, and hands both to a
//!   [`QuizSelector`].
//! - [`Tracker`], [`Task`] and [`Report`] record the run as a tree of timed nodes,
//!   optionally streamed to a subscriber.
//! - [`RetrievalService`] finds reference lesson plans: embed, filtered vector
//!   search, dedup, cross-encoder rerank.
//! - [`build_quiz_service`] assembles a strategy combination from
//!   [`QuizServiceSettings`].
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod evaluation;
pub mod gateway;
pub mod generators;
pub mod model;
pub mod reporting;
pub mod retrieval;
pub mod selection;
pub mod service;

pub use config::{Config, ConfigError};
pub use evaluation::{
    EvaluationError, GenaiStructuredGenerator, LlmQuizEvaluator, QuizEvaluator, QuizRating,
    RatingSchema, ReturnFirstEvaluator, StructuredGenerator,
};
#[cfg(any(test, feature = "mock"))]
pub use evaluation::{MockEvaluator, MockStructuredGenerator};
pub use generators::{
    BasedOnLessonGenerator, CachedQuizGenerator, CurrentQuizGenerator, GeneratorError,
    InMemoryQuestionBank, QuestionLookup, QuestionSearch, QuestionSearchGenerator,
    QuizCandidateGenerator, SimilarLessonsGenerator,
};
#[cfg(any(test, feature = "mock"))]
pub use generators::{MockGenerator, MockQuestionLookup, MockQuestionSearch};
pub use model::{
    BasedOn, CandidateSourceRef, LessonPlan, ModelError, QuizCandidatePool, QuizQuestion,
    QuizSlot, RelevantLessonPlan,
};
pub use reporting::{NodeStatus, Report, ReportError, ReportNode, Task, Tracker};
pub use retrieval::{
    ConfiguredRetrievalService, LessonPlanRetriever, RetrievalConfig, RetrievalError,
    RetrievalService,
};
#[cfg(any(test, feature = "mock"))]
pub use retrieval::MockLessonPlanRetriever;
pub use selection::{QuizSelector, SelectionError, SimpleQuizSelector};
pub use service::{
    QuizService, QuizServiceError, QuizServiceMode, QuizServiceSettings, ServiceDependencies,
    build_quiz_service,
};
