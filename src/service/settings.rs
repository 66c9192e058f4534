use serde::{Deserialize, Serialize};

/// Deployment preset selecting a strategy combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizServiceMode {
    /// Fixed demo quiz, trusted as-is.
    Demo,
    /// Questions of the based-on lesson only.
    #[default]
    BasedOn,
    /// All sources, rated by the LLM evaluator.
    Production,
}

impl std::str::FromStr for QuizServiceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "demo" => Ok(Self::Demo),
            "based-on" | "basedon" | "based_on" => Ok(Self::BasedOn),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!("Unknown quiz service mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeneratorKind {
    BasedOnLesson,
    SimilarLessons,
    CurrentQuiz,
    Cached,
    /// Question-level keyword search, chunked into fixed-size pools.
    QuestionSearch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvaluatorKind {
    /// Structured LLM judgement per pool.
    LlmEvaluator,
    /// First pool wins.
    ReturnFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectorKind {
    #[default]
    Simple,
}

/// Strategy selection consumed by [`crate::service::build_quiz_service`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizServiceSettings {
    pub generators: Vec<GeneratorKind>,
    pub evaluator: EvaluatorKind,
    pub selector: SelectorKind,
}

impl QuizServiceSettings {
    pub fn for_mode(mode: QuizServiceMode) -> Self {
        match mode {
            QuizServiceMode::Demo => Self {
                generators: vec![GeneratorKind::Cached],
                evaluator: EvaluatorKind::ReturnFirst,
                selector: SelectorKind::Simple,
            },
            QuizServiceMode::BasedOn => Self {
                generators: vec![GeneratorKind::BasedOnLesson],
                evaluator: EvaluatorKind::ReturnFirst,
                selector: SelectorKind::Simple,
            },
            QuizServiceMode::Production => Self {
                generators: vec![
                    GeneratorKind::BasedOnLesson,
                    GeneratorKind::SimilarLessons,
                    GeneratorKind::CurrentQuiz,
                ],
                evaluator: EvaluatorKind::LlmEvaluator,
                selector: SelectorKind::Simple,
            },
        }
    }
}

impl Default for QuizServiceSettings {
    fn default() -> Self {
        Self::for_mode(QuizServiceMode::default())
    }
}
