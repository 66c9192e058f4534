//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use quizforge::gateway::{HandlerState, create_router_with_state};
use quizforge::model::QuizQuestion;
use quizforge::retrieval::search::LessonPlanHit;
use quizforge::retrieval::{
    LexicalCrossEncoder, MockEmbedder, MockLessonPlanSearch, RetrievalConfig, RetrievalService,
};
use serde_json::{Map, Value, json};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub const VECTOR_SIZE: usize = 256;

pub type TestRetrievalService =
    RetrievalService<MockEmbedder, MockLessonPlanSearch, LexicalCrossEncoder>;

pub fn questions(prefix: &str, n: usize) -> Vec<QuizQuestion> {
    (1..=n)
        .map(|i| {
            QuizQuestion::multiple_choice(
                format!("{prefix}-Q{i}"),
                "Which metal reacts most vigorously with water?",
                &["potassium"],
                &["copper", "gold"],
            )
        })
        .collect()
}

/// One lesson in the on-disk question bank.
pub struct BankLesson {
    pub id: &'static str,
    pub title: &'static str,
    pub starter_quiz: Vec<QuizQuestion>,
    pub exit_quiz: Vec<QuizQuestion>,
}

impl BankLesson {
    pub fn new(id: &'static str, title: &'static str) -> Self {
        Self {
            id,
            title,
            starter_quiz: Vec::new(),
            exit_quiz: Vec::new(),
        }
    }

    pub fn starter(mut self, questions: Vec<QuizQuestion>) -> Self {
        self.starter_quiz = questions;
        self
    }

    pub fn exit(mut self, questions: Vec<QuizQuestion>) -> Self {
        self.exit_quiz = questions;
        self
    }
}

/// Writes a question bank file; keep the `TempDir` alive while the path is used.
pub fn write_bank(lessons: &[BankLesson]) -> (TempDir, PathBuf) {
    let mut map = Map::new();
    for lesson in lessons {
        map.insert(
            lesson.id.to_string(),
            json!({
                "title": lesson.title,
                "starterQuiz": lesson.starter_quiz,
                "exitQuiz": lesson.exit_quiz,
            }),
        );
    }
    let body = json!({ "lessons": Value::Object(map) });

    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("bank.json");
    std::fs::write(&path, serde_json::to_vec_pretty(&body).expect("bank json")).expect("write bank");
    (dir, path)
}

/// Search hits in distance order, with one duplicate lesson.
pub fn metal_hits() -> Vec<LessonPlanHit> {
    vec![
        LessonPlanHit::new("S1", "Metals reactivity series", 0.10),
        LessonPlanHit::new("S1", "Metals reactivity series", 0.12).with_content("Displacement"),
        LessonPlanHit::new("S2", "Metals and acids", 0.30),
        LessonPlanHit::new("S3", "Volcanoes", 0.45),
    ]
}

/// Retrieval over canned hits; keep the `Arc` to read the mocks' call counts.
pub fn retrieval_service(embedder: MockEmbedder, hits: Vec<LessonPlanHit>) -> Arc<TestRetrievalService> {
    let service = RetrievalService::new(
        embedder,
        MockLessonPlanSearch::new(hits),
        LexicalCrossEncoder::new(),
        RetrievalConfig::default().vector_size(VECTOR_SIZE),
    )
    .expect("valid retrieval config");
    Arc::new(service)
}

pub struct TestServer {
    pub addr: SocketAddr,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn spawn_server(state: HandlerState) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let app = create_router_with_state(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server_handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
    });

    TestServer {
        addr,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    }
}
