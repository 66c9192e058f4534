//! Quiz data model: slots, questions, lesson plans and candidate pools.

pub mod error;
pub mod lesson;
pub mod pool;
pub mod question;
pub mod slot;


pub use error::{ModelError, ModelResult};
pub use lesson::{BasedOn, LessonPlan, RelevantLessonPlan};
pub use pool::{CandidateSourceRef, QuizCandidatePool};
pub use question::{
    ChoiceAnswer, MatchPair, OrderItem, QuestionKind, QuizQuestion, ShortAnswer, StemBlock,
};
pub use slot::QuizSlot;
