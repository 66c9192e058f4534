//! Composition root: strategy settings, the factory and [`QuizService`].

pub mod error;
pub mod factory;
pub mod quiz_service;
pub mod settings;


pub use error::{QuizServiceError, QuizServiceResult};
pub use factory::{ServiceDependencies, build_quiz_service};
pub use quiz_service::QuizService;
pub use settings::{
    EvaluatorKind, GeneratorKind, QuizServiceMode, QuizServiceSettings, SelectorKind,
};
