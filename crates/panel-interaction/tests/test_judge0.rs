mod common;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use common::FakeServer;
use panel_core::assessment::{CodeExecutor, CodeSubmission};
use panel_core::config::Difficulty;
use panel_core::problem::CodingProblem;
use panel_core::settings::Judge0Settings;
use panel_interaction::Judge0Executor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn settings(server: &FakeServer, api_key: Option<&str>) -> Judge0Settings {
    Judge0Settings {
        base_url: server.base_url.clone(),
        api_key: api_key.map(str::to_string),
        host: "judge0.test".to_string(),
        poll_interval_ms: 1,
        max_polls: 3,
    }
}

fn encode(text: &str) -> String {
    BASE64_STANDARD.encode(text)
}

fn two_sum_submission() -> CodeSubmission {
    CodeSubmission::for_problem(
        &CodingProblem::for_difficulty(Difficulty::Easy),
        "python",
        "print('hi')",
    )
}

#[tokio::test]
async fn test_executes_every_case_and_summarizes() {
    let submitted = Arc::new(AtomicUsize::new(0));
    let counter = submitted.clone();
    let problem = CodingProblem::for_difficulty(Difficulty::Easy);
    let expected: Vec<String> = problem.test_cases.iter().map(|c| c.expected.clone()).collect();

    let server = FakeServer::spawn(move |req| {
        if req.method == "POST" {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            return (201, format!(r#"{{"token":"tok-{n}"}}"#));
        }
        // Second test case prints the wrong answer
        let n: usize = req
            .path()
            .trim_start_matches("/submissions/tok-")
            .parse()
            .unwrap();
        let stdout = if n == 1 {
            encode("[9, 9]\n")
        } else {
            encode(&format!("{}\n", expected[n]))
        };
        (
            200,
            format!(
                r#"{{"status":{{"id":3,"description":"Accepted"}},"stdout":"{stdout}","stderr":null,"time":"0.020","memory":{}}}"#,
                1000 * (n + 1)
            ),
        )
    })
    .await;

    let executor = Judge0Executor::new(&settings(&server, Some("key-123")));
    let result = executor.execute(&two_sum_submission()).await.unwrap();

    assert_eq!(result.total, 3);
    assert_eq!(result.passed, 2);
    assert_eq!(result.exec_time_ms, 20);
    assert_eq!(result.max_memory_kb, 3000);
    assert!(!result.results[1].passed);
    assert_eq!(result.results[1].output, "[9, 9]\n");

    let requests = server.requests();
    let post = requests.iter().find(|r| r.method == "POST").unwrap();
    assert_eq!(post.path(), "/submissions");
    assert!(post.target.contains("base64_encoded=true"));
    assert_eq!(post.header("X-RapidAPI-Key"), Some("key-123"));
    assert_eq!(post.header("X-RapidAPI-Host"), Some("judge0.test"));
    let body = post.json();
    assert_eq!(body["language_id"], 71);
    assert_eq!(body["source_code"], encode("print('hi')"));
    assert_eq!(body["cpu_time_limit"], 5);
    assert_eq!(body["memory_limit"], 256000);
}

#[tokio::test]
async fn test_pending_submission_times_out() {
    let server = FakeServer::spawn(|req| {
        if req.method == "POST" {
            (201, r#"{"token":"slow"}"#.to_string())
        } else {
            (
                200,
                r#"{"status":{"id":2,"description":"Processing"}}"#.to_string(),
            )
        }
    })
    .await;

    let executor = Judge0Executor::new(&settings(&server, None));
    let result = executor.execute(&two_sum_submission()).await.unwrap();

    assert_eq!(result.passed, 0);
    assert_eq!(result.results[0].status, "Timeout");
    assert_eq!(result.stderr, "Test case 1 failed: Execution timeout");
    // Without a key no RapidAPI headers are sent
    assert!(server.requests()[0].header("X-RapidAPI-Key").is_none());
    // 3 submissions, each polled max_polls times
    let polls = server
        .requests()
        .iter()
        .filter(|r| r.method == "GET")
        .count();
    assert_eq!(polls, 9);
}

#[tokio::test]
async fn test_rejected_submission_is_recorded_as_failure() {
    let server = FakeServer::spawn(|_| (422, r#"{"error":"bad"}"#.to_string())).await;

    let executor = Judge0Executor::new(&settings(&server, None));
    let result = executor.execute(&two_sum_submission()).await.unwrap();

    assert_eq!(result.passed, 0);
    assert_eq!(result.results[0].status, "error");
    assert_eq!(result.results[0].error, "Submission failed: 422");
}

#[tokio::test]
async fn test_unsupported_language_is_rejected() {
    let server = FakeServer::spawn(|_| (200, "{}".to_string())).await;
    let mut submission = two_sum_submission();
    submission.language = "cobol".to_string();

    let err = Judge0Executor::new(&settings(&server, None))
        .execute(&submission)
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_health_check() {
    let up = FakeServer::spawn(|_| (200, "{}".to_string())).await;
    assert!(Judge0Executor::new(&settings(&up, None)).health_check().await);

    let down = FakeServer::spawn(|_| (500, "{}".to_string())).await;
    assert!(!Judge0Executor::new(&settings(&down, None)).health_check().await);
}
