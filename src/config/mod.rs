//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `QUIZFORGE_*` environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_COLLECTION_NAME, DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_EMBEDDING_MODEL,
    DEFAULT_LLM_MODEL, DEFAULT_RERANK_MODEL,
};
use crate::service::QuizServiceMode;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `QUIZFORGE_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Strategy preset. Default: `based-on`.
    pub mode: QuizServiceMode,

    /// Model name handed to genai for quiz ratings.
    pub llm_model: String,

    /// JSON question bank backing every lesson lookup.
    pub question_bank_path: Option<PathBuf>,

    /// Lesson served by the `demo` mode.
    pub demo_lesson_id: Option<String>,

    /// Qdrant endpoint URL. Default: `http://localhost:6334`.
    pub qdrant_url: String,

    /// Collection holding lesson plan parts.
    pub collection_name: String,

    /// OpenAI-compatible embeddings endpoint. Unset means local hashed embeddings.
    pub embedding_url: Option<String>,

    pub embedding_model: String,

    pub embedding_dimensions: usize,

    /// Cohere-compatible rerank endpoint. Unset means lexical reranking.
    pub rerank_url: Option<String>,

    pub rerank_model: String,

    /// Bearer token for the embedding and rerank endpoints.
    pub api_key: Option<String>,

    /// Enables the similar-lessons source. Default: `true`.
    pub retrieval_enabled: bool,

    /// Adds question-level search to production runs. Default: `false`.
    pub question_search_enabled: bool,
}

/// Default Qdrant URL used when `QUIZFORGE_QDRANT_URL` is not set.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            mode: QuizServiceMode::default(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            question_bank_path: None,
            demo_lesson_id: None,
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
            embedding_url: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
            rerank_url: None,
            rerank_model: DEFAULT_RERANK_MODEL.to_string(),
            api_key: None,
            retrieval_enabled: true,
            question_search_enabled: false,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "QUIZFORGE_PORT";
    const ENV_BIND_ADDR: &'static str = "QUIZFORGE_BIND_ADDR";
    const ENV_MODE: &'static str = "QUIZFORGE_MODE";
    const ENV_LLM_MODEL: &'static str = "QUIZFORGE_LLM_MODEL";
    const ENV_QUESTION_BANK_PATH: &'static str = "QUIZFORGE_QUESTION_BANK_PATH";
    const ENV_DEMO_LESSON_ID: &'static str = "QUIZFORGE_DEMO_LESSON_ID";
    const ENV_QDRANT_URL: &'static str = "QUIZFORGE_QDRANT_URL";
    const ENV_COLLECTION: &'static str = "QUIZFORGE_COLLECTION";
    const ENV_EMBEDDING_URL: &'static str = "QUIZFORGE_EMBEDDING_URL";
    const ENV_EMBEDDING_MODEL: &'static str = "QUIZFORGE_EMBEDDING_MODEL";
    const ENV_EMBEDDING_DIMENSIONS: &'static str = "QUIZFORGE_EMBEDDING_DIMENSIONS";
    const ENV_RERANK_URL: &'static str = "QUIZFORGE_RERANK_URL";
    const ENV_RERANK_MODEL: &'static str = "QUIZFORGE_RERANK_MODEL";
    const ENV_API_KEY: &'static str = "QUIZFORGE_API_KEY";
    const ENV_RETRIEVAL_ENABLED: &'static str = "QUIZFORGE_RETRIEVAL_ENABLED";
    const ENV_QUESTION_SEARCH_ENABLED: &'static str = "QUIZFORGE_QUESTION_SEARCH_ENABLED";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let mode = Self::parse_mode_from_env(defaults.mode)?;
        let embedding_dimensions =
            Self::parse_usize_from_env(Self::ENV_EMBEDDING_DIMENSIONS, defaults.embedding_dimensions)?;

        Ok(Self {
            port,
            bind_addr,
            mode,
            llm_model: Self::parse_string_from_env(Self::ENV_LLM_MODEL, defaults.llm_model),
            question_bank_path: Self::parse_optional_string_from_env(Self::ENV_QUESTION_BANK_PATH)
                .map(PathBuf::from),
            demo_lesson_id: Self::parse_optional_string_from_env(Self::ENV_DEMO_LESSON_ID),
            qdrant_url: Self::parse_string_from_env(Self::ENV_QDRANT_URL, defaults.qdrant_url),
            collection_name: Self::parse_string_from_env(
                Self::ENV_COLLECTION,
                defaults.collection_name,
            ),
            embedding_url: Self::parse_optional_string_from_env(Self::ENV_EMBEDDING_URL),
            embedding_model: Self::parse_string_from_env(
                Self::ENV_EMBEDDING_MODEL,
                defaults.embedding_model,
            ),
            embedding_dimensions,
            rerank_url: Self::parse_optional_string_from_env(Self::ENV_RERANK_URL),
            rerank_model: Self::parse_string_from_env(Self::ENV_RERANK_MODEL, defaults.rerank_model),
            api_key: Self::parse_optional_string_from_env(Self::ENV_API_KEY),
            retrieval_enabled: Self::parse_bool_from_env(
                Self::ENV_RETRIEVAL_ENABLED,
                defaults.retrieval_enabled,
            ),
            question_search_enabled: Self::parse_bool_from_env(
                Self::ENV_QUESTION_SEARCH_ENABLED,
                defaults.question_search_enabled,
            ),
        })
    }

    /// Validates paths and mode requirements (does not touch the network).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref path) = self.question_bank_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }

        if self.mode == QuizServiceMode::Demo {
            if self.question_bank_path.is_none() {
                return Err(ConfigError::MissingEnvVar {
                    name: Self::ENV_QUESTION_BANK_PATH,
                });
            }
            if self.demo_lesson_id.is_none() {
                return Err(ConfigError::MissingEnvVar {
                    name: Self::ENV_DEMO_LESSON_ID,
                });
            }
        }

        if self.embedding_dimensions == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_EMBEDDING_DIMENSIONS,
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_mode_from_env(default: QuizServiceMode) -> Result<QuizServiceMode, ConfigError> {
        match env::var(Self::ENV_MODE) {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidMode { value }),
            Err(_) => Ok(default),
        }
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_usize_from_env(var_name: &'static str, default: usize) -> Result<usize, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: var_name,
                reason: format!("'{}' is not a number", value),
            }),
            Err(_) => Ok(default),
        }
    }

    fn parse_bool_from_env(var_name: &str, default: bool) -> bool {
        match env::var(var_name).map(|v| v.trim().to_lowercase()) {
            Ok(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
            Ok(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
            _ => default,
        }
    }
}
