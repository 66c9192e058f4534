use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::error::{GeneratorError, GeneratorResult};
use crate::model::{QuizQuestion, QuizSlot};

/// Lookup-by-identifier capability: the existing questions of a stored lesson.
///
/// Unknown lessons yield an empty list.
#[async_trait]
pub trait QuestionLookup: Send + Sync {
    async fn questions_for_lesson_plan(
        &self,
        lesson_plan_id: &str,
        slot: QuizSlot,
    ) -> GeneratorResult<Vec<QuizQuestion>>;
}

#[derive(Debug, Clone, Default)]
struct BankLesson {
    title: Option<String>,
    starter_quiz: Vec<QuizQuestion>,
    exit_quiz: Vec<QuizQuestion>,
}

impl BankLesson {
    fn quiz(&self, slot: QuizSlot) -> &[QuizQuestion] {
        match slot {
            QuizSlot::Starter => &self.starter_quiz,
            QuizSlot::Exit => &self.exit_quiz,
        }
    }
}

#[derive(Deserialize)]
struct RawBank {
    #[serde(default)]
    lessons: HashMap<String, RawLesson>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLesson {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    starter_quiz: Vec<Value>,
    #[serde(default)]
    exit_quiz: Vec<Value>,
}

/// Read-only question bank keyed by lesson plan id.
///
/// JSON layout: `{"lessons": {"<id>": {"title", "starterQuiz": [..], "exitQuiz": [..]}}}`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuestionBank {
    lessons: HashMap<String, BankLesson>,
}

impl InMemoryQuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a lesson. Questions are taken as-is.
    pub fn with_lesson(
        mut self,
        lesson_plan_id: impl Into<String>,
        title: Option<&str>,
        starter_quiz: Vec<QuizQuestion>,
        exit_quiz: Vec<QuizQuestion>,
    ) -> Self {
        self.lessons.insert(
            lesson_plan_id.into(),
            BankLesson {
                title: title.map(str::to_string),
                starter_quiz,
                exit_quiz,
            },
        );
        self
    }

    /// Parses a bank document. Questions that fail to parse or validate are dropped.
    pub fn from_json(json: &str) -> GeneratorResult<Self> {
        let raw: RawBank =
            serde_json::from_str(json).map_err(|e| GeneratorError::QuestionBank {
                reason: e.to_string(),
            })?;

        let mut lessons = HashMap::with_capacity(raw.lessons.len());
        let mut dropped = 0usize;

        for (id, lesson) in raw.lessons {
            let starter_quiz = parse_questions(&id, QuizSlot::Starter, lesson.starter_quiz, &mut dropped);
            let exit_quiz = parse_questions(&id, QuizSlot::Exit, lesson.exit_quiz, &mut dropped);
            lessons.insert(
                id,
                BankLesson {
                    title: lesson.title,
                    starter_quiz,
                    exit_quiz,
                },
            );
        }

        debug!(lessons = lessons.len(), dropped, "Parsed question bank");
        Ok(Self { lessons })
    }

    pub fn load(path: &Path) -> GeneratorResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| GeneratorError::QuestionBank {
            reason: format!("{}: {}", path.display(), e),
        })?;
        let bank = Self::from_json(&json)?;
        info!(path = %path.display(), lessons = bank.len(), "Loaded question bank");
        Ok(bank)
    }

    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    pub fn contains(&self, lesson_plan_id: &str) -> bool {
        self.lessons.contains_key(lesson_plan_id)
    }

    pub fn title(&self, lesson_plan_id: &str) -> Option<&str> {
        self.lessons
            .get(lesson_plan_id)
            .and_then(|l| l.title.as_deref())
    }

    /// Every stored question, lessons in id order, starter before exit.
    pub(crate) fn all_questions(&self) -> impl Iterator<Item = &QuizQuestion> {
        let mut ids: Vec<&String> = self.lessons.keys().collect();
        ids.sort();
        ids.into_iter().flat_map(move |id| {
            let lesson = &self.lessons[id];
            lesson.starter_quiz.iter().chain(&lesson.exit_quiz)
        })
    }

    /// Synchronous form of [`QuestionLookup::questions_for_lesson_plan`].
    pub fn questions(&self, lesson_plan_id: &str, slot: QuizSlot) -> Vec<QuizQuestion> {
        self.lessons
            .get(lesson_plan_id)
            .map(|l| l.quiz(slot).to_vec())
            .unwrap_or_default()
    }
}

fn parse_questions(
    lesson_plan_id: &str,
    slot: QuizSlot,
    raw: Vec<Value>,
    dropped: &mut usize,
) -> Vec<QuizQuestion> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let parsed = serde_json::from_value::<QuizQuestion>(value)
                .map_err(|e| e.to_string())
                .and_then(|q| q.validate().map(|_| q).map_err(|e| e.to_string()));
            match parsed {
                Ok(q) => Some(q),
                Err(reason) => {
                    warn!(
                        lesson_plan_id,
                        slot = %slot,
                        index,
                        reason = %reason,
                        "Dropping invalid question from bank"
                    );
                    *dropped += 1;
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl QuestionLookup for InMemoryQuestionBank {
    async fn questions_for_lesson_plan(
        &self,
        lesson_plan_id: &str,
        slot: QuizSlot,
    ) -> GeneratorResult<Vec<QuizQuestion>> {
        Ok(self.questions(lesson_plan_id, slot))
    }
}
