//! Quiz Forge HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use quizforge::config::Config;
use quizforge::evaluation::{GenaiStructuredGenerator, QuizRating};
use quizforge::gateway::{HandlerState, create_router_with_state};
use quizforge::generators::{CachedQuizGenerator, InMemoryQuestionBank};
use quizforge::model::QuizSlot;
use quizforge::retrieval::{
    ConfiguredRetrievalService, CrossEncoderBackend, EmbedderBackend, HashEmbedder,
    HttpCrossEncoder, LessonPlanRetriever, LexicalCrossEncoder, OpenAiEmbedder,
    QdrantLessonSearch, RetrievalConfig,
};
use quizforge::service::{
    GeneratorKind, QuizService, QuizServiceMode, QuizServiceSettings, ServiceDependencies,
    build_quiz_service,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        mode = ?config.mode,
        "Quiz Forge starting"
    );

    let bank = Arc::new(load_question_bank(&config)?);
    let retriever = build_retriever(&config)?;

    let mut dependencies = ServiceDependencies::new()
        .with_question_lookup(bank.clone())
        .with_question_search(bank.clone())
        .with_structured_generator(Arc::new(GenaiStructuredGenerator::new(&config.llm_model)));
    if let Some(retriever) = &retriever {
        dependencies = dependencies.with_retriever(Arc::clone(retriever));
    }
    if config.mode == QuizServiceMode::Demo {
        dependencies = dependencies.with_cached_quiz(demo_quiz(&config, &bank)?);
    }

    let mut settings = QuizServiceSettings::for_mode(config.mode);
    if config.mode == QuizServiceMode::Production && config.question_search_enabled {
        settings.generators.push(GeneratorKind::QuestionSearch);
    }
    let service: QuizService<QuizRating> = build_quiz_service(&settings, &dependencies)?;

    let mut state = HandlerState::new(service);
    if let Some(retriever) = retriever {
        state = state.with_retriever(retriever);
    }
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Quiz Forge shutdown complete");
    Ok(())
}

fn load_question_bank(config: &Config) -> anyhow::Result<InMemoryQuestionBank> {
    match &config.question_bank_path {
        Some(path) => InMemoryQuestionBank::load(path)
            .with_context(|| format!("loading question bank {}", path.display())),
        None => {
            tracing::warn!("No QUIZFORGE_QUESTION_BANK_PATH configured, lesson lookups will find nothing");
            Ok(InMemoryQuestionBank::new())
        }
    }
}

fn demo_quiz(config: &Config, bank: &InMemoryQuestionBank) -> anyhow::Result<CachedQuizGenerator> {
    let id = config
        .demo_lesson_id
        .as_deref()
        .context("demo mode requires QUIZFORGE_DEMO_LESSON_ID")?;
    anyhow::ensure!(bank.contains(id), "demo lesson '{}' is not in the question bank", id);

    let label = bank.title(id).unwrap_or(id);
    Ok(CachedQuizGenerator::new(
        label,
        bank.questions(id, QuizSlot::Starter),
        bank.questions(id, QuizSlot::Exit),
    ))
}

fn build_retriever(config: &Config) -> anyhow::Result<Option<Arc<dyn LessonPlanRetriever>>> {
    if !config.retrieval_enabled {
        tracing::info!("Retrieval disabled");
        return Ok(None);
    }

    let embedder = match &config.embedding_url {
        Some(url) => EmbedderBackend::OpenAi(
            OpenAiEmbedder::new(url, &config.embedding_model, config.embedding_dimensions)
                .with_api_key(config.api_key.clone()),
        ),
        None => {
            tracing::warn!("No QUIZFORGE_EMBEDDING_URL configured, using hashed embeddings");
            EmbedderBackend::Hash(HashEmbedder::new(config.embedding_dimensions))
        }
    };

    let reranker = match &config.rerank_url {
        Some(url) => CrossEncoderBackend::Http(
            HttpCrossEncoder::new(url, &config.rerank_model).with_api_key(config.api_key.clone()),
        ),
        None => {
            tracing::warn!("No QUIZFORGE_RERANK_URL configured, using lexical reranking");
            CrossEncoderBackend::Lexical(LexicalCrossEncoder::new())
        }
    };

    let search = QdrantLessonSearch::new(&config.qdrant_url, &config.collection_name)?;
    let retrieval_config = RetrievalConfig::default()
        .collection_name(&config.collection_name)
        .vector_size(config.embedding_dimensions);

    let service = ConfiguredRetrievalService::new(embedder, search, reranker, retrieval_config)?;
    let retriever: Arc<dyn LessonPlanRetriever> = Arc::new(service);
    Ok(Some(retriever))
}

fn run_health_check() -> i32 {
    let port = std::env::var("QUIZFORGE_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(_) => return 1,
    };

    rt.block_on(async {
        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        {
            Ok(client) => client,
            Err(_) => return 1,
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
