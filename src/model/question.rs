use serde::{Deserialize, Serialize};

use super::error::{ModelError, ModelResult};

/// One block of a question stem or answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StemBlock {
    Text {
        text: String,
    },
    Image {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribution: Option<String>,
    },
}

impl StemBlock {
    pub fn text(text: impl Into<String>) -> Self {
        StemBlock::Text { text: text.into() }
    }

    /// Plain-text rendering; images become markdown links.
    pub fn render(&self) -> String {
        match self {
            StemBlock::Text { text } => text.clone(),
            StemBlock::Image { url, .. } => format!("![image]({})", url),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceAnswer {
    pub answer: Vec<StemBlock>,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPair {
    pub correct_choice: Vec<StemBlock>,
    pub match_option: Vec<StemBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub answer: Vec<StemBlock>,
    pub correct_order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortAnswer {
    pub answer: Vec<StemBlock>,
    pub is_default: bool,
}

/// Type-specific answer data, tagged by `questionType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "questionType", rename_all = "kebab-case")]
pub enum QuestionKind {
    MultipleChoice { answers: Vec<ChoiceAnswer> },
    Match { pairs: Vec<MatchPair> },
    Order { items: Vec<OrderItem> },
    ShortAnswer { answers: Vec<ShortAnswer> },
    ExplanatoryText,
}

impl QuestionKind {
    pub fn name(&self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice { .. } => "multiple-choice",
            QuestionKind::Match { .. } => "match",
            QuestionKind::Order { .. } => "order",
            QuestionKind::ShortAnswer { .. } => "short-answer",
            QuestionKind::ExplanatoryText => "explanatory-text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub uid: String,
    pub stem: Vec<StemBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

fn default_active() -> bool {
    true
}

fn blocks(text: &str) -> Vec<StemBlock> {
    vec![StemBlock::text(text)]
}

fn render_blocks(blocks: &[StemBlock]) -> String {
    blocks
        .iter()
        .map(StemBlock::render)
        .collect::<Vec<_>>()
        .join(" ")
}

impl QuizQuestion {
    pub fn new(uid: impl Into<String>, stem: Vec<StemBlock>, kind: QuestionKind) -> Self {
        Self {
            uid: uid.into(),
            stem,
            hint: None,
            feedback: None,
            active: true,
            kind,
        }
    }

    /// Text-only multiple-choice question.
    pub fn multiple_choice(
        uid: impl Into<String>,
        stem: &str,
        correct: &[&str],
        distractors: &[&str],
    ) -> Self {
        let answers = correct
            .iter()
            .map(|a| ChoiceAnswer {
                answer: blocks(a),
                is_correct: true,
            })
            .chain(distractors.iter().map(|d| ChoiceAnswer {
                answer: blocks(d),
                is_correct: false,
            }))
            .collect();

        Self::new(uid, blocks(stem), QuestionKind::MultipleChoice { answers })
    }

    /// Text-only short-answer question; the first answer is the default.
    pub fn short_answer(uid: impl Into<String>, stem: &str, answers: &[&str]) -> Self {
        let answers = answers
            .iter()
            .enumerate()
            .map(|(i, a)| ShortAnswer {
                answer: blocks(a),
                is_default: i == 0,
            })
            .collect();

        Self::new(uid, blocks(stem), QuestionKind::ShortAnswer { answers })
    }

    pub fn explanatory(uid: impl Into<String>, text: &str) -> Self {
        Self::new(uid, blocks(text), QuestionKind::ExplanatoryText)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn question_type(&self) -> &'static str {
        self.kind.name()
    }

    /// Checks the stem and answer invariants.
    pub fn validate(&self) -> ModelResult<()> {
        let invalid = |reason: &str| ModelError::InvalidQuestion {
            uid: self.uid.clone(),
            reason: reason.to_string(),
        };

        if self.stem.is_empty() {
            return Err(invalid("stem is empty"));
        }

        match &self.kind {
            QuestionKind::MultipleChoice { answers } => {
                if !answers.iter().any(|a| a.is_correct) {
                    return Err(invalid("multiple-choice question has no correct answer"));
                }
            }
            QuestionKind::Match { pairs } if pairs.is_empty() => {
                return Err(invalid("match question has no pairs"));
            }
            QuestionKind::Order { items } if items.is_empty() => {
                return Err(invalid("order question has no items"));
            }
            QuestionKind::ShortAnswer { answers } if answers.is_empty() => {
                return Err(invalid("short-answer question has no answers"));
            }
            _ => {}
        }

        Ok(())
    }

    /// Plain-text rendering used in evaluation prompts.
    pub fn render(&self) -> String {
        let mut out = format!("[{}] {}", self.question_type(), render_blocks(&self.stem));

        match &self.kind {
            QuestionKind::MultipleChoice { answers } => {
                for a in answers {
                    let marker = if a.is_correct { "correct" } else { "distractor" };
                    out.push_str(&format!("\n  - ({}) {}", marker, render_blocks(&a.answer)));
                }
            }
            QuestionKind::Match { pairs } => {
                for p in pairs {
                    out.push_str(&format!(
                        "\n  - {} => {}",
                        render_blocks(&p.correct_choice),
                        render_blocks(&p.match_option)
                    ));
                }
            }
            QuestionKind::Order { items } => {
                let mut sorted: Vec<_> = items.iter().collect();
                sorted.sort_by_key(|i| i.correct_order);
                for item in sorted {
                    out.push_str(&format!(
                        "\n  {}. {}",
                        item.correct_order,
                        render_blocks(&item.answer)
                    ));
                }
            }
            QuestionKind::ShortAnswer { answers } => {
                for a in answers {
                    out.push_str(&format!("\n  - {}", render_blocks(&a.answer)));
                }
            }
            QuestionKind::ExplanatoryText => {}
        }

        if let Some(hint) = &self.hint {
            out.push_str(&format!("\n  hint: {}", hint));
        }

        out
    }
}
