use std::sync::Arc;

use tracing::info;

use super::error::{QuizServiceError, QuizServiceResult};
use super::quiz_service::QuizService;
use super::settings::{EvaluatorKind, GeneratorKind, QuizServiceSettings, SelectorKind};
use crate::evaluation::{
    LlmQuizEvaluator, QuizEvaluator, RatingSchema, ReturnFirstEvaluator, StructuredGenerator,
};
use crate::generators::{
    BasedOnLessonGenerator, CachedQuizGenerator, CurrentQuizGenerator, QuestionLookup,
    QuestionSearch, QuestionSearchGenerator, QuizCandidateGenerator, SimilarLessonsGenerator,
};
use crate::retrieval::LessonPlanRetriever;
use crate::selection::{QuizSelector, SimpleQuizSelector};

/// Collaborators the configured strategies may need. Unused ones can stay `None`.
#[derive(Clone, Default)]
pub struct ServiceDependencies {
    pub question_lookup: Option<Arc<dyn QuestionLookup>>,
    pub retriever: Option<Arc<dyn LessonPlanRetriever>>,
    pub question_search: Option<Arc<dyn QuestionSearch>>,
    pub structured_generator: Option<Arc<dyn StructuredGenerator>>,
    pub cached_quiz: Option<CachedQuizGenerator>,
}

impl ServiceDependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_question_lookup(mut self, lookup: Arc<dyn QuestionLookup>) -> Self {
        self.question_lookup = Some(lookup);
        self
    }

    pub fn with_retriever(mut self, retriever: Arc<dyn LessonPlanRetriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn with_question_search(mut self, search: Arc<dyn QuestionSearch>) -> Self {
        self.question_search = Some(search);
        self
    }

    pub fn with_structured_generator(mut self, generator: Arc<dyn StructuredGenerator>) -> Self {
        self.structured_generator = Some(generator);
        self
    }

    pub fn with_cached_quiz(mut self, cached: CachedQuizGenerator) -> Self {
        self.cached_quiz = Some(cached);
        self
    }
}

impl std::fmt::Debug for ServiceDependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceDependencies")
            .field("question_lookup", &self.question_lookup.is_some())
            .field("retriever", &self.retriever.is_some())
            .field("question_search", &self.question_search.is_some())
            .field("structured_generator", &self.structured_generator.is_some())
            .field("cached_quiz", &self.cached_quiz.as_ref().map(|c| c.label()))
            .finish()
    }
}

/// Assembles the strategy combination named by `settings`.
///
/// Fails with [`QuizServiceError::MissingDependency`] when a selected strategy
/// has nothing to run with, so a misconfigured deployment fails at startup.
pub fn build_quiz_service<R: RatingSchema>(
    settings: &QuizServiceSettings,
    dependencies: &ServiceDependencies,
) -> QuizServiceResult<QuizService<R>> {
    if settings.generators.is_empty() {
        return Err(QuizServiceError::MissingDependency {
            strategy: "quiz service",
            dependency: "at least one generator",
        });
    }

    let generators = settings
        .generators
        .iter()
        .map(|kind| build_generator(*kind, dependencies))
        .collect::<QuizServiceResult<Vec<_>>>()?;

    let evaluator: Arc<dyn QuizEvaluator<R>> = match settings.evaluator {
        EvaluatorKind::LlmEvaluator => {
            let generator = dependencies.structured_generator.clone().ok_or(
                QuizServiceError::MissingDependency {
                    strategy: "llm-evaluator",
                    dependency: "a structured generator",
                },
            )?;
            Arc::new(LlmQuizEvaluator::<R>::new(generator))
        }
        EvaluatorKind::ReturnFirst => Arc::new(ReturnFirstEvaluator::<R>::new()),
    };

    let selector: Arc<dyn QuizSelector<R>> = match settings.selector {
        SelectorKind::Simple => Arc::new(SimpleQuizSelector::new()),
    };

    let service = QuizService::new(generators, evaluator, selector);
    info!(
        generators = ?service.generator_names(),
        evaluator = service.evaluator_name(),
        selector = service.selector_name(),
        "Quiz service assembled"
    );
    Ok(service)
}

fn build_generator(
    kind: GeneratorKind,
    dependencies: &ServiceDependencies,
) -> QuizServiceResult<Arc<dyn QuizCandidateGenerator>> {
    let lookup = |strategy: &'static str| {
        dependencies
            .question_lookup
            .clone()
            .ok_or(QuizServiceError::MissingDependency {
                strategy,
                dependency: "a question lookup",
            })
    };

    let generator: Arc<dyn QuizCandidateGenerator> = match kind {
        GeneratorKind::BasedOnLesson => {
            Arc::new(BasedOnLessonGenerator::new(lookup("based-on-lesson")?))
        }
        GeneratorKind::SimilarLessons => {
            let mut generator = SimilarLessonsGenerator::new(lookup("similar-lessons")?);
            if let Some(retriever) = &dependencies.retriever {
                generator = generator.with_retriever(Arc::clone(retriever));
            }
            Arc::new(generator)
        }
        GeneratorKind::CurrentQuiz => Arc::new(CurrentQuizGenerator::new()),
        GeneratorKind::Cached => Arc::new(dependencies.cached_quiz.clone().ok_or(
            QuizServiceError::MissingDependency {
                strategy: "cached",
                dependency: "a cached quiz",
            },
        )?),
        GeneratorKind::QuestionSearch => Arc::new(QuestionSearchGenerator::new(
            dependencies.question_search.clone().ok_or(
                QuizServiceError::MissingDependency {
                    strategy: "question-search",
                    dependency: "a question search",
                },
            )?,
        )),
    };
    Ok(generator)
}
