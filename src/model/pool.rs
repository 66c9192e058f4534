use serde::{Deserialize, Serialize};

use super::question::QuizQuestion;
use super::slot::QuizSlot;

/// How a candidate pool was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CandidateSourceRef {
    /// Questions of the lesson the plan was based on.
    BasedOnLesson {
        lesson_plan_id: String,
        lesson_title: String,
    },
    /// Questions of a lesson found by retrieval.
    SimilarLessons {
        lesson_plan_id: String,
        lesson_title: String,
    },
    /// The quiz already present on the lesson plan.
    CurrentQuiz { slot: QuizSlot },
    /// A fixed demo set.
    Cached { label: String },
    /// Produced fresh by a named generator.
    Generated { generator: String },
}

impl CandidateSourceRef {
    pub fn kind(&self) -> &'static str {
        match self {
            CandidateSourceRef::BasedOnLesson { .. } => "basedOnLesson",
            CandidateSourceRef::SimilarLessons { .. } => "similarLessons",
            CandidateSourceRef::CurrentQuiz { .. } => "currentQuiz",
            CandidateSourceRef::Cached { .. } => "cached",
            CandidateSourceRef::Generated { .. } => "generated",
        }
    }
}

/// Provenance-tagged set of questions proposed by one generator invocation.
///
/// Fields are private so a pool cannot change after a generator hands it over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizCandidatePool {
    questions: Vec<QuizQuestion>,
    source: CandidateSourceRef,
}

impl QuizCandidatePool {
    pub fn new(questions: Vec<QuizQuestion>, source: CandidateSourceRef) -> Self {
        Self { questions, source }
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn source(&self) -> &CandidateSourceRef {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn into_questions(self) -> Vec<QuizQuestion> {
        self.questions
    }
}
