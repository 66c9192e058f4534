use serde::{Deserialize, Serialize};

use super::error::ModelError;

/// Which quiz of the lesson plan is being populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuizSlot {
    #[serde(rename = "starterQuiz", alias = "/starterQuiz", alias = "starter")]
    Starter,
    #[serde(rename = "exitQuiz", alias = "/exitQuiz", alias = "exit")]
    Exit,
}

impl QuizSlot {
    pub const ALL: [QuizSlot; 2] = [QuizSlot::Starter, QuizSlot::Exit];

    /// Field name on the lesson plan.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizSlot::Starter => "starterQuiz",
            QuizSlot::Exit => "exitQuiz",
        }
    }

    /// JSON-patch path of the quiz section.
    pub fn as_path(&self) -> &'static str {
        match self {
            QuizSlot::Starter => "/starterQuiz",
            QuizSlot::Exit => "/exitQuiz",
        }
    }
}

impl std::str::FromStr for QuizSlot {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "starter" | "starterQuiz" | "/starterQuiz" => Ok(Self::Starter),
            "exit" | "exitQuiz" | "/exitQuiz" => Ok(Self::Exit),
            other => Err(ModelError::UnknownSlot {
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for QuizSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
