use serde::{Deserialize, Serialize};

use super::question::QuizQuestion;
use super::slot::QuizSlot;

/// Reference to the lesson a plan was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasedOn {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Lesson plan fields read by the pipeline. Never mutated by it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LessonPlan {
    pub title: String,
    pub subject: Option<String>,
    pub key_stage: Option<String>,
    pub topic: Option<String>,
    pub learning_outcome: Option<String>,
    pub learning_cycles: Vec<String>,
    pub prior_knowledge: Vec<String>,
    pub key_learning_points: Vec<String>,
    pub based_on: Option<BasedOn>,
    pub starter_quiz: Vec<QuizQuestion>,
    pub exit_quiz: Vec<QuizQuestion>,
}

impl LessonPlan {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_based_on(mut self, id: &str, title: Option<&str>) -> Self {
        self.based_on = Some(BasedOn {
            id: id.to_string(),
            title: title.map(str::to_string),
        });
        self
    }

    pub fn with_scope(mut self, key_stage: &str, subject: &str) -> Self {
        self.key_stage = Some(key_stage.to_string());
        self.subject = Some(subject.to_string());
        self
    }

    /// Existing questions for `slot`.
    pub fn quiz(&self, slot: QuizSlot) -> &[QuizQuestion] {
        match slot {
            QuizSlot::Starter => &self.starter_quiz,
            QuizSlot::Exit => &self.exit_quiz,
        }
    }

    /// `"title. topic"` when a topic is present, else the title.
    pub fn search_text(&self) -> String {
        match self.topic.as_deref().filter(|t| !t.trim().is_empty()) {
            Some(topic) => format!("{}. {}", self.title, topic),
            None => self.title.clone(),
        }
    }
}

/// A retrieval hit after cross-encoder reranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevantLessonPlan {
    pub lesson_plan_id: String,
    pub title: String,
    #[serde(default)]
    pub key_stage: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub relevance_score: f32,
}

impl RelevantLessonPlan {
    pub fn new(lesson_plan_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            lesson_plan_id: lesson_plan_id.into(),
            title: title.into(),
            key_stage: None,
            subject: None,
            content: String::new(),
            relevance_score: 0.0,
        }
    }
}
