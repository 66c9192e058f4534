use super::*;
use serial_test::serial;
use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_quizforge_env() {
    const VARS: &[&str] = &[
        "QUIZFORGE_PORT",
        "QUIZFORGE_BIND_ADDR",
        "QUIZFORGE_MODE",
        "QUIZFORGE_LLM_MODEL",
        "QUIZFORGE_QUESTION_BANK_PATH",
        "QUIZFORGE_DEMO_LESSON_ID",
        "QUIZFORGE_QDRANT_URL",
        "QUIZFORGE_COLLECTION",
        "QUIZFORGE_EMBEDDING_URL",
        "QUIZFORGE_EMBEDDING_MODEL",
        "QUIZFORGE_EMBEDDING_DIMENSIONS",
        "QUIZFORGE_RERANK_URL",
        "QUIZFORGE_RERANK_MODEL",
        "QUIZFORGE_API_KEY",
        "QUIZFORGE_RETRIEVAL_ENABLED",
        "QUIZFORGE_QUESTION_SEARCH_ENABLED",
    ];
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for var in VARS {
        unsafe { env::remove_var(var) };
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.port, 8080);
    assert_eq!(
        config.bind_addr,
        IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1))
    );
    assert_eq!(config.mode, QuizServiceMode::BasedOn);
    assert_eq!(config.llm_model, "gpt-4o-mini");
    assert_eq!(config.qdrant_url, "http://localhost:6334");
    assert_eq!(config.collection_name, "lesson_plan_parts");
    assert_eq!(config.embedding_dimensions, 256);
    assert!(config.embedding_url.is_none());
    assert!(config.rerank_url.is_none());
    assert!(config.retrieval_enabled);
    assert!(!config.question_search_enabled);
}

#[test]
fn test_socket_addr() {
    let config = Config::default();
    assert_eq!(config.socket_addr(), "127.0.0.1:8080");

    let config = Config {
        port: 3000,
        bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        ..Default::default()
    };
    assert_eq!(config.socket_addr(), "0.0.0.0:3000");
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_quizforge_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config.port, 8080);
    assert_eq!(config.mode, QuizServiceMode::BasedOn);
    assert!(config.question_bank_path.is_none());
}

#[test]
#[serial]
fn test_from_env_custom_port_and_ipv6_bind_addr() {
    clear_quizforge_env();

    with_env_vars(
        &[("QUIZFORGE_PORT", "3000"), ("QUIZFORGE_BIND_ADDR", "::1")],
        || {
            let config = Config::from_env().expect("should parse");
            assert_eq!(config.port, 3000);
            assert_eq!(
                config.bind_addr,
                IpAddr::V6(std::net::Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1))
            );
        },
    );
}

#[test]
#[serial]
fn test_from_env_mode_spellings() {
    clear_quizforge_env();

    for (raw, expected) in [
        ("demo", QuizServiceMode::Demo),
        ("based-on", QuizServiceMode::BasedOn),
        ("BasedOn", QuizServiceMode::BasedOn),
        ("production", QuizServiceMode::Production),
    ] {
        with_env_vars(&[("QUIZFORGE_MODE", raw)], || {
            let config = Config::from_env().expect("should parse");
            assert_eq!(config.mode, expected, "mode {raw}");
        });
    }
}

#[test]
#[serial]
fn test_invalid_mode() {
    clear_quizforge_env();

    with_env_vars(&[("QUIZFORGE_MODE", "staging")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMode { .. }));
        assert!(err.to_string().contains("staging"));
    });
}

#[test]
#[serial]
fn test_invalid_port_zero() {
    clear_quizforge_env();

    with_env_vars(&[("QUIZFORGE_PORT", "0")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { .. }));
        assert!(err.to_string().contains("invalid port"));
    });
}

#[test]
#[serial]
fn test_invalid_port_not_number() {
    clear_quizforge_env();

    with_env_vars(&[("QUIZFORGE_PORT", "not_a_port")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::PortParseError { .. }));
        assert!(err.to_string().contains("failed to parse port"));
    });
}

#[test]
#[serial]
fn test_invalid_bind_addr() {
    clear_quizforge_env();

    with_env_vars(&[("QUIZFORGE_BIND_ADDR", "not.an.ip.address")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBindAddr { .. }));
    });
}

#[test]
#[serial]
fn test_invalid_embedding_dimensions() {
    clear_quizforge_env();

    with_env_vars(&[("QUIZFORGE_EMBEDDING_DIMENSIONS", "lots")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(err.to_string().contains("QUIZFORGE_EMBEDDING_DIMENSIONS"));
    });
}

#[test]
#[serial]
fn test_full_config_parse() {
    clear_quizforge_env();

    with_env_vars(
        &[
            ("QUIZFORGE_PORT", "9090"),
            ("QUIZFORGE_BIND_ADDR", "0.0.0.0"),
            ("QUIZFORGE_MODE", "production"),
            ("QUIZFORGE_LLM_MODEL", "gpt-4o"),
            ("QUIZFORGE_QUESTION_BANK_PATH", "/data/bank.json"),
            ("QUIZFORGE_QDRANT_URL", "http://qdrant.cluster:6334"),
            ("QUIZFORGE_COLLECTION", "lessons"),
            ("QUIZFORGE_EMBEDDING_URL", "https://api.openai.com/v1/embeddings"),
            ("QUIZFORGE_EMBEDDING_DIMENSIONS", "512"),
            ("QUIZFORGE_RERANK_URL", "https://api.cohere.com/v2/rerank"),
            ("QUIZFORGE_API_KEY", "  "),
            ("QUIZFORGE_RETRIEVAL_ENABLED", "false"),
            ("QUIZFORGE_QUESTION_SEARCH_ENABLED", "TRUE"),
        ],
        || {
            let config = Config::from_env().expect("should parse full config");

            assert_eq!(config.socket_addr(), "0.0.0.0:9090");
            assert_eq!(config.mode, QuizServiceMode::Production);
            assert_eq!(config.llm_model, "gpt-4o");
            assert_eq!(
                config.question_bank_path,
                Some(PathBuf::from("/data/bank.json"))
            );
            assert_eq!(config.qdrant_url, "http://qdrant.cluster:6334");
            assert_eq!(config.collection_name, "lessons");
            assert_eq!(config.embedding_dimensions, 512);
            assert!(config.embedding_url.is_some());
            assert!(config.rerank_url.is_some());
            assert!(config.api_key.is_none(), "blank values count as unset");
            assert!(!config.retrieval_enabled);
            assert!(config.question_search_enabled);
        },
    );
}

#[test]
#[serial]
fn test_unrecognised_bool_falls_back_to_default() {
    clear_quizforge_env();

    with_env_vars(&[("QUIZFORGE_RETRIEVAL_ENABLED", "maybe")], || {
        let config = Config::from_env().expect("should parse with fallback");
        assert!(config.retrieval_enabled);
    });
}

#[test]
fn test_validate_nonexistent_question_bank() {
    let config = Config {
        question_bank_path: Some(PathBuf::from("/nonexistent/bank.json")),
        ..Default::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::PathNotFound { .. }));
}

#[test]
fn test_validate_question_bank_is_directory() {
    let config = Config {
        question_bank_path: Some(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src")),
        ..Default::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::NotAFile { .. }));
}

#[test]
fn test_validate_demo_requires_bank_and_lesson() {
    let config = Config {
        mode: QuizServiceMode::Demo,
        ..Default::default()
    };
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("QUIZFORGE_QUESTION_BANK_PATH"));

    let config = Config {
        mode: QuizServiceMode::Demo,
        question_bank_path: Some(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml")),
        ..Default::default()
    };
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("QUIZFORGE_DEMO_LESSON_ID"));

    let config = Config {
        demo_lesson_id: Some("lesson-1".to_string()),
        ..config
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_zero_dimensions() {
    let config = Config {
        embedding_dimensions: 0,
        ..Default::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { .. })
    ));
}

#[test]
fn test_validate_success_with_defaults() {
    assert!(Config::default().validate().is_ok());
}
