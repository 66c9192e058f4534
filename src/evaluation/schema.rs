use schemars::{JsonSchema, SchemaGenerator};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Binds a rating type to the JSON schema the evaluator asks the model to fill.
pub trait RatingSchema:
    JsonSchema + DeserializeOwned + Serialize + Clone + Send + Sync + 'static
{
    /// Schema name sent with structured-output requests.
    const NAME: &'static str;

    /// Score used for selection; higher is better.
    fn rating(&self) -> f64;

    /// Semantic checks serde cannot express (ranges, non-empty text).
    fn validate(&self) -> Result<(), String>;

    /// Rating produced without a model call.
    fn fixed(rating: f64, note: &str) -> Self;

    /// Root JSON schema sent as the structured-output response format.
    fn output_schema() -> Value {
        SchemaGenerator::default()
            .into_root_schema_for::<Self>()
            .to_value()
    }
}

/// Default rating shape: a score in `[0, 1]` and the reason for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuizRating {
    /// How well the questions suit the lesson, from 0.0 (unusable) to 1.0 (ideal).
    pub rating: f64,
    /// Short explanation of the rating.
    pub justification: String,
}

impl QuizRating {
    pub fn new(rating: f64, justification: &str) -> Self {
        Self {
            rating,
            justification: justification.to_string(),
        }
    }
}

impl RatingSchema for QuizRating {
    const NAME: &'static str = "quiz_rating";

    fn rating(&self) -> f64 {
        self.rating
    }

    fn validate(&self) -> Result<(), String> {
        if !self.rating.is_finite() || !(0.0..=1.0).contains(&self.rating) {
            return Err(format!("rating must be within [0, 1], got {}", self.rating));
        }
        Ok(())
    }

    fn fixed(rating: f64, note: &str) -> Self {
        Self::new(rating, note)
    }
}
