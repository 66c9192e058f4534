use std::sync::Arc;

use crate::evaluation::QuizRating;
use crate::retrieval::LessonPlanRetriever;
use crate::service::QuizService;

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct HandlerState {
    pub quiz_service: Arc<QuizService<QuizRating>>,

    /// Used to fill in relevant lesson plans when a request carries none.
    pub retriever: Option<Arc<dyn LessonPlanRetriever>>,
}

impl HandlerState {
    pub fn new(quiz_service: QuizService<QuizRating>) -> Self {
        Self {
            quiz_service: Arc::new(quiz_service),
            retriever: None,
        }
    }

    pub fn with_retriever(mut self, retriever: Arc<dyn LessonPlanRetriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }
}

impl std::fmt::Debug for HandlerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerState")
            .field("quiz_service", &self.quiz_service)
            .field("retriever", &self.retriever.is_some())
            .finish()
    }
}
