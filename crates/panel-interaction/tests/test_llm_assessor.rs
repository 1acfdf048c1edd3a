mod common;

use common::FakeServer;
use panel_core::assessment::{CompetencyStrength, ResponseAnalyzer, ScoringContext, ScoringEngine};
use panel_core::config::InterviewConfig;
use panel_core::question::question_bank;
use panel_interaction::LlmAssessor;

fn chat_reply(content: &str) -> String {
    serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
    .to_string()
}

fn context() -> ScoringContext {
    ScoringContext {
        session_id: "session_1".to_string(),
        config: InterviewConfig::default(),
        events: Vec::new(),
        behavioral: None,
        coding: None,
    }
}

#[tokio::test]
async fn test_analyze_uses_model_reply() {
    let server = FakeServer::spawn(|_| {
        (
            200,
            chat_reply(
                r#"{"sentiment":0.6,"star_completeness":0.9,"competency_demonstration":"strong","insights":["Clear ownership"],"improvement_areas":["Quantify results"]}"#,
            ),
        )
    })
    .await;
    let assessor = LlmAssessor::new(&server.base_url, "sk-test", "gpt-4o");
    let question = &question_bank()[0];

    let analysis = assessor
        .analyze(question, "I resolved the conflict with my team")
        .await
        .unwrap();

    assert_eq!(analysis.sentiment, 0.6);
    assert_eq!(analysis.star_completeness, 0.9);
    assert_eq!(analysis.competency, CompetencyStrength::Strong);
    assert_eq!(analysis.insights, vec!["Clear ownership"]);
    assert_eq!(analysis.keywords, vec!["conflict", "team"]);

    let request = &server.requests()[0];
    assert_eq!(request.path(), "/chat/completions");
    assert_eq!(request.header("authorization"), Some("Bearer sk-test"));
    let body = request.json();
    assert_eq!(body["model"], "gpt-4o");
    assert_eq!(body["response_format"]["type"], "json_object");
    let prompt = body["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("Teamwork question"));
}

#[tokio::test]
async fn test_analyze_falls_back_when_model_fails() {
    let server = FakeServer::spawn(|_| (500, r#"{"error":"overloaded"}"#.to_string())).await;
    let assessor = LlmAssessor::new(&server.base_url, "sk-test", "gpt-4o");

    let analysis = assessor
        .analyze(&question_bank()[1], "I had to learn quickly")
        .await
        .unwrap();

    assert_eq!(analysis.sentiment, 0.0);
    assert_eq!(analysis.star_completeness, 0.5);
    assert_eq!(analysis.keywords, vec!["learn"]);
    assert_eq!(analysis.improvement_areas, vec!["Could provide more specific examples"]);
}

#[tokio::test]
async fn test_score_returns_partial_update() {
    let server = FakeServer::spawn(|_| {
        (
            200,
            chat_reply("```json\n{\"culture\": 80, \"technical\": 65}\n```"),
        )
    })
    .await;
    let assessor = LlmAssessor::new(&server.base_url, "sk-test", "gpt-4o");

    let update = assessor.score(&context()).await.unwrap();

    assert_eq!(update.culture, Some(80));
    assert_eq!(update.technical, Some(65));
    assert_eq!(update.communication, None);
    let prompt = server.requests()[0].json()["messages"][0]["content"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(prompt.contains("Backend Software Engineer"));
    assert!(prompt.contains("No code was executed."));
}

#[tokio::test]
async fn test_score_accepts_fractional_and_out_of_range_numbers() {
    let server = FakeServer::spawn(|_| {
        (
            200,
            chat_reply(r#"{"culture": 82.5, "communication": -5, "problem_solving": 101, "technical": 70}"#),
        )
    })
    .await;
    let assessor = LlmAssessor::new(&server.base_url, "sk-test", "gpt-4o");

    let update = assessor.score(&context()).await.unwrap();

    assert_eq!(update.culture, Some(83));
    assert_eq!(update.communication, Some(0));
    assert_eq!(update.problem_solving, Some(100));
    assert_eq!(update.technical, Some(70));
}

#[tokio::test]
async fn test_score_errors_without_scores() {
    let server = FakeServer::spawn(|_| (200, chat_reply("{}"))).await;
    let assessor = LlmAssessor::new(&server.base_url, "sk-test", "gpt-4o");

    assert!(assessor.score(&context()).await.is_err());
}

#[tokio::test]
async fn test_score_propagates_http_errors() {
    let server = FakeServer::spawn(|_| (429, "slow down".to_string())).await;
    let assessor = LlmAssessor::new(&server.base_url, "sk-test", "gpt-4o");

    let err = assessor.score(&context()).await.unwrap_err();
    assert!(err.is_retryable());
}
