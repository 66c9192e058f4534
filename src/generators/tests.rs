use super::*;
use std::sync::Arc;

use crate::model::{CandidateSourceRef, LessonPlan, QuizQuestion, QuizSlot, RelevantLessonPlan};
use crate::reporting::{NodeStatus, Task};
use crate::retrieval::MockLessonPlanRetriever;

fn questions(prefix: &str, n: usize) -> Vec<QuizQuestion> {
    (1..=n)
        .map(|i| QuizQuestion::multiple_choice(format!("{prefix}-{i}"), "What is 2 + 2?", &["4"], &["3", "5"]))
        .collect()
}

fn relevant(ids: &[&str]) -> Vec<RelevantLessonPlan> {
    ids.iter()
        .map(|id| RelevantLessonPlan::new(*id, format!("Title {id}")))
        .collect()
}

#[tokio::test]
async fn test_based_on_returns_single_pool_with_source() {
    let lookup = Arc::new(
        MockQuestionLookup::new().with_questions("L1", QuizSlot::Starter, questions("Q", 3)),
    );
    let generator = BasedOnLessonGenerator::new(lookup.clone());
    let plan = LessonPlan::new("My lesson").with_based_on("L1", Some("Intro"));

    let pools = generator
        .starter_quiz_candidates(&plan, &[], &Task::detached())
        .await
        .unwrap();

    assert_eq!(pools.len(), 1);
    assert_eq!(pools[0].len(), 3);
    assert_eq!(
        pools[0].source(),
        &CandidateSourceRef::BasedOnLesson {
            lesson_plan_id: "L1".to_string(),
            lesson_title: "Intro".to_string(),
        }
    );
    assert_eq!(lookup.calls(), vec![("L1".to_string(), QuizSlot::Starter)]);
}

#[tokio::test]
async fn test_based_on_without_reference_makes_no_calls() {
    let lookup = Arc::new(MockQuestionLookup::new());
    let generator = BasedOnLessonGenerator::new(lookup.clone());
    let plan = LessonPlan::new("My lesson");

    for slot in QuizSlot::ALL {
        let pools = generator
            .candidates_for(slot, &plan, &[], &Task::detached())
            .await
            .unwrap();
        assert!(pools.is_empty());
    }
    assert_eq!(lookup.call_count(), 0);
}

#[tokio::test]
async fn test_based_on_uses_fallback_title_and_exit_slot() {
    let lookup = Arc::new(
        MockQuestionLookup::new().with_questions("L1", QuizSlot::Exit, questions("E", 1)),
    );
    let generator = BasedOnLessonGenerator::new(lookup.clone());
    let plan = LessonPlan::new("My lesson").with_based_on("L1", None);

    let pools = generator
        .exit_quiz_candidates(&plan, &[], &Task::detached())
        .await
        .unwrap();

    assert_eq!(
        pools[0].source(),
        &CandidateSourceRef::BasedOnLesson {
            lesson_plan_id: "L1".to_string(),
            lesson_title: "Based on lesson".to_string(),
        }
    );
    assert_eq!(lookup.calls(), vec![("L1".to_string(), QuizSlot::Exit)]);
}

#[tokio::test]
async fn test_based_on_lookup_failure_propagates() {
    let generator = BasedOnLessonGenerator::new(Arc::new(MockQuestionLookup::failing("down")));
    let plan = LessonPlan::new("My lesson").with_based_on("L1", Some("Intro"));

    let err = generator
        .starter_quiz_candidates(&plan, &[], &Task::detached())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("down"));
}

#[tokio::test]
async fn test_similar_lessons_pools_and_drops_empty() {
    let lookup = Arc::new(
        MockQuestionLookup::new()
            .with_questions("a", QuizSlot::Starter, questions("A", 2))
            .with_questions("c", QuizSlot::Starter, questions("C", 1)),
    );
    let generator = SimilarLessonsGenerator::new(lookup.clone());

    let pools = generator
        .starter_quiz_candidates(&LessonPlan::new("x"), &relevant(&["a", "b", "c"]), &Task::detached())
        .await
        .unwrap();

    assert_eq!(pools.len(), 2);
    assert_eq!(
        pools[0].source(),
        &CandidateSourceRef::SimilarLessons {
            lesson_plan_id: "a".to_string(),
            lesson_title: "Title a".to_string(),
        }
    );
    assert_eq!(pools[1].len(), 1);
    assert_eq!(lookup.call_count(), 3);
}

#[tokio::test]
async fn test_similar_lessons_respects_max_lessons() {
    let lookup = Arc::new(MockQuestionLookup::new());
    let generator = SimilarLessonsGenerator::new(lookup.clone());
    let many = relevant(&["1", "2", "3", "4", "5", "6"]);

    generator
        .exit_quiz_candidates(&LessonPlan::new("x"), &many, &Task::detached())
        .await
        .unwrap();
    assert_eq!(lookup.call_count(), 3);

    let lookup = Arc::new(MockQuestionLookup::new());
    let generator = SimilarLessonsGenerator::new(lookup.clone()).with_max_lessons(5);
    generator
        .exit_quiz_candidates(&LessonPlan::new("x"), &many, &Task::detached())
        .await
        .unwrap();
    assert_eq!(lookup.call_count(), 5);
}

#[tokio::test]
async fn test_similar_lessons_without_input_or_retriever_is_empty() {
    let lookup = Arc::new(MockQuestionLookup::new());
    let generator = SimilarLessonsGenerator::new(lookup.clone());

    let pools = generator
        .starter_quiz_candidates(&LessonPlan::new("x"), &[], &Task::detached())
        .await
        .unwrap();
    assert!(pools.is_empty());
    assert_eq!(lookup.call_count(), 0);
}

#[tokio::test]
async fn test_similar_lessons_fetches_with_retriever_when_scoped() {
    let lookup = Arc::new(
        MockQuestionLookup::new().with_questions("r1", QuizSlot::Starter, questions("R", 2)),
    );
    let retriever = Arc::new(MockLessonPlanRetriever::new(relevant(&["r1"])));
    let generator = SimilarLessonsGenerator::new(lookup.clone()).with_retriever(retriever.clone());

    let unscoped = generator
        .starter_quiz_candidates(&LessonPlan::new("Fractions"), &[], &Task::detached())
        .await
        .unwrap();
    assert!(unscoped.is_empty());
    assert_eq!(retriever.call_count(), 0);

    let plan = LessonPlan::new("Fractions").with_scope("ks2", "maths");
    let task = Task::detached();
    let pools = generator
        .starter_quiz_candidates(&plan, &[], &task)
        .await
        .unwrap();

    assert_eq!(pools.len(), 1);
    assert_eq!(
        retriever.calls(),
        vec![(
            "Fractions".to_string(),
            vec!["ks2".to_string()],
            vec!["maths".to_string()]
        )]
    );
    let report = task.snapshot();
    assert_eq!(
        report.child("retrieval").map(|n| n.status),
        Some(NodeStatus::Complete)
    );
}

#[tokio::test]
async fn test_current_quiz_relabels_questions() {
    let mut plan = LessonPlan::new("x");
    plan.exit_quiz = questions("orig", 3);

    let pools = CurrentQuizGenerator::new()
        .exit_quiz_candidates(&plan, &[], &Task::detached())
        .await
        .unwrap();

    assert_eq!(pools.len(), 1);
    let uids: Vec<_> = pools[0].questions().iter().map(|q| q.uid.as_str()).collect();
    assert_eq!(uids, vec!["CURRENT-Q1", "CURRENT-Q2", "CURRENT-Q3"]);
    assert_eq!(
        pools[0].source(),
        &CandidateSourceRef::CurrentQuiz {
            slot: QuizSlot::Exit
        }
    );
    assert_eq!(plan.exit_quiz[0].uid, "orig-1");

    let none = CurrentQuizGenerator::new()
        .starter_quiz_candidates(&plan, &[], &Task::detached())
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_cached_generator_serves_fixed_quiz() {
    let generator = CachedQuizGenerator::new("demo", questions("S", 2), Vec::new());

    let starter = generator
        .starter_quiz_candidates(&LessonPlan::default(), &[], &Task::detached())
        .await
        .unwrap();
    assert_eq!(starter.len(), 1);
    assert_eq!(starter[0].source().kind(), "cached");

    let exit = generator
        .exit_quiz_candidates(&LessonPlan::default(), &[], &Task::detached())
        .await
        .unwrap();
    assert!(exit.is_empty());
}

#[tokio::test]
async fn test_question_bank_loads_and_drops_invalid() {
    let json = r#"{
        "lessons": {
            "L1": {
                "title": "Fractions",
                "starterQuiz": [
                    {
                        "uid": "q1",
                        "stem": [{"type": "text", "text": "Half of 4?"}],
                        "questionType": "short-answer",
                        "answers": [{"answer": [{"type": "text", "text": "2"}], "isDefault": true}]
                    },
                    {
                        "uid": "q2",
                        "stem": [],
                        "questionType": "explanatory-text"
                    },
                    {"uid": "q3", "questionType": "mystery"}
                ]
            }
        }
    }"#;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bank.json");
    std::fs::write(&path, json).unwrap();

    let bank = InMemoryQuestionBank::load(&path).unwrap();
    assert_eq!(bank.len(), 1);
    assert_eq!(bank.title("L1"), Some("Fractions"));

    let starter = bank
        .questions_for_lesson_plan("L1", QuizSlot::Starter)
        .await
        .unwrap();
    assert_eq!(starter.len(), 1);
    assert_eq!(starter[0].uid, "q1");

    assert!(bank.questions("L1", QuizSlot::Exit).is_empty());
    assert!(bank.questions("missing", QuizSlot::Starter).is_empty());
}

#[test]
fn test_question_bank_rejects_malformed_document() {
    assert!(matches!(
        InMemoryQuestionBank::from_json("not json"),
        Err(GeneratorError::QuestionBank { .. })
    ));
    assert!(InMemoryQuestionBank::load(std::path::Path::new("/nonexistent/bank.json")).is_err());
}

fn reactivity_plan() -> LessonPlan {
    let mut plan = LessonPlan::new("Reactivity of metals").with_scope("ks3", "science");
    plan.topic = Some("Metals".to_string());
    plan.prior_knowledge = vec!["Metals react with acids".to_string()];
    plan.key_learning_points = vec!["Potassium reacts violently with water".to_string()];
    plan
}

#[tokio::test]
async fn test_question_search_chunks_hits_and_pads_last_pool() {
    let search = Arc::new(MockQuestionSearch::new(questions("S", 8)));
    let generator = QuestionSearchGenerator::new(search.clone());
    let mut plan = reactivity_plan();
    let mut padding = questions("orig", 3);
    padding.insert(0, questions("S", 7).remove(6));
    plan.starter_quiz = padding;

    let task = Task::detached();
    let pools = generator
        .starter_quiz_candidates(&plan, &[], &task)
        .await
        .unwrap();

    assert_eq!(pools.iter().map(|p| p.len()).collect::<Vec<_>>(), vec![6, 5]);
    let last: Vec<_> = pools[1].questions().iter().map(|q| q.uid.as_str()).collect();
    assert_eq!(last, vec!["S-7", "S-8", "orig-1", "orig-2", "orig-3"]);
    assert_eq!(
        pools[0].source(),
        &CandidateSourceRef::Generated {
            generator: "questionSearch".to_string()
        }
    );
    assert_eq!(
        search.queries(),
        vec![(
            "Reactivity of metals. Metals. Metals react with acids".to_string(),
            100
        )]
    );

    assert_eq!(task.snapshot().data.get("matches"), Some(&serde_json::json!(8)));
}

#[tokio::test]
async fn test_question_search_exit_query_uses_key_learning_points() {
    let search = Arc::new(MockQuestionSearch::new(questions("E", 2)));
    let generator = QuestionSearchGenerator::new(search.clone()).with_pool_size(2);

    let pools = generator
        .exit_quiz_candidates(&reactivity_plan(), &[], &Task::detached())
        .await
        .unwrap();

    assert_eq!(pools.len(), 1);
    assert_eq!(pools[0].len(), 2);
    assert_eq!(
        search.queries()[0].0,
        "Reactivity of metals. Metals. Potassium reacts violently with water"
    );
}

#[tokio::test]
async fn test_question_search_needs_key_stage() {
    let search = Arc::new(MockQuestionSearch::new(questions("S", 3)));
    let generator = QuestionSearchGenerator::new(search.clone());

    for slot in QuizSlot::ALL {
        let pools = generator
            .candidates_for(slot, &LessonPlan::new("Reactivity of metals"), &[], &Task::detached())
            .await
            .unwrap();
        assert!(pools.is_empty());
    }
    assert_eq!(search.call_count(), 0);
}

#[tokio::test]
async fn test_question_search_without_hits_or_with_failure() {
    let empty = QuestionSearchGenerator::new(Arc::new(MockQuestionSearch::new(Vec::new())));
    let pools = empty
        .starter_quiz_candidates(&reactivity_plan(), &[], &Task::detached())
        .await
        .unwrap();
    assert!(pools.is_empty());

    let failing = QuestionSearchGenerator::new(Arc::new(MockQuestionSearch::failing("index offline")));
    let err = failing
        .starter_quiz_candidates(&reactivity_plan(), &[], &Task::detached())
        .await
        .unwrap_err();
    assert!(matches!(err, GeneratorError::Search { .. }));
}

#[tokio::test]
async fn test_question_bank_search_ranks_by_keyword_overlap() {
    let question = |uid: &str, stem: &str| {
        format!(
            r#"{{"uid": "{uid}", "stem": [{{"type": "text", "text": "{stem}"}}], "questionType": "short-answer",
                "answers": [{{"answer": [{{"type": "text", "text": "x"}}], "isDefault": true}}]}}"#
        )
    };
    let json = format!(
        r#"{{"lessons": {{
            "L1": {{"starterQuiz": [{}], "exitQuiz": [{}]}},
            "L2": {{"starterQuiz": [{}, {}]}}
        }}}}"#,
        question("m1", "Which metal is most reactive?"),
        question("v1", "How do volcanoes erupt?"),
        question("m1", "Which metal is most reactive?"),
        question("m2", "Name a reactive metal found in group one"),
    );
    let bank = InMemoryQuestionBank::from_json(&json).unwrap();

    let hits = bank.search_questions("reactive metal", 10).await.unwrap();
    let uids: Vec<_> = hits.iter().map(|q| q.uid.as_str()).collect();
    assert_eq!(uids, vec!["m1", "m2"]);

    let top = bank.search_questions("reactive metal", 1).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].uid, "m1");

    assert!(bank.search_questions("photosynthesis", 10).await.unwrap().is_empty());
}
