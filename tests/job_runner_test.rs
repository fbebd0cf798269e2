mod common;

use analytics_jobs::services::progress::{FeedHandle, FeedStatus, JobFeed, MemoryProgress};
use analytics_jobs::{
    ApiClient, ApiPayload, FnTokenProvider, JobError, JobRequest, JobRunner, ProgressSink,
};
use common::{runner, test_config, TOKEN};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn similarity_request(server: &MockServer, progress: Arc<MemoryProgress>) -> JobRequest {
    JobRequest::new(
        format!("{}/v1/similarity", server.uri()),
        json!({"set_a": ["a0"], "set_b": ["b0"], "fast": false, "flattened": false}),
        "Similarity",
    )
    .with_interval(Duration::from_millis(10))
    .with_progress(progress)
}

async fn requests_to(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == route)
        .count()
}

#[tokio::test]
async fn immediate_result_is_returned_after_one_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/similarity"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"matrix": [[1, 0], [0, 1]]})))
        .expect(1)
        .mount(&server)
        .await;

    let progress = Arc::new(MemoryProgress::new());
    let payload = runner(&server.uri())
        .run(&similarity_request(&server, progress.clone()))
        .await
        .unwrap();

    assert_eq!(
        payload,
        ApiPayload::Matrix(vec![vec![1.0, 0.0], vec![0.0, 1.0]])
    );
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
    assert_eq!(progress.messages().last().unwrap(), "Similarity complete");
}

#[tokio::test]
async fn queued_job_is_polled_then_fetched() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/similarity"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"job_id": "job-1"})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/jobs"))
        .and(query_param("jobId", "job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "pending"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/jobs"))
        .and(query_param("jobId", "job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "result_url": format!("{}/results/job-1", server.uri()),
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/results/job-1"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"matrix": [[0.9]]})))
        .expect(1)
        .mount(&server)
        .await;

    let progress = Arc::new(MemoryProgress::new());
    let payload = runner(&server.uri())
        .run(&similarity_request(&server, progress.clone()))
        .await
        .unwrap();

    assert_eq!(payload, ApiPayload::Matrix(vec![vec![0.9]]));
    assert_eq!(requests_to(&server, "/v1/jobs").await, 2);

    let messages = progress.messages();
    assert!(messages.iter().any(|m| m == "Similarity job submitted, polling..."));
    // 第 2 次轮询时提示等待
    assert!(messages.iter().any(|m| m.starts_with("Waiting for Similarity to complete...")));
    assert_eq!(messages.last().unwrap(), "Similarity complete");
}

#[tokio::test]
async fn completed_without_result_url_fails_before_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"job_id": "job-2"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "completed"})))
        .mount(&server)
        .await;

    let progress = Arc::new(MemoryProgress::new());
    let err = runner(&server.uri())
        .run(&similarity_request(&server, progress.clone()))
        .await
        .unwrap_err();

    assert!(matches!(err, JobError::UnexpectedResponse { .. }));
    assert!(err.to_string().contains("missing resultUrl"));
    assert_eq!(requests_to(&server, "/v1/jobs").await, 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
    assert!(progress.messages().last().unwrap().starts_with("Similarity failed:"));
}

#[tokio::test]
async fn unknown_terminal_status_fails_the_job() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"job_id": "job-3"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "weird"})))
        .mount(&server)
        .await;

    let err = runner(&server.uri())
        .run(&similarity_request(&server, Arc::new(MemoryProgress::new())))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Job failed with status: weird"));
}

#[tokio::test]
async fn non_success_submit_carries_status_text_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let progress = Arc::new(MemoryProgress::new());
    let err = runner(&server.uri())
        .run(&similarity_request(&server, progress.clone()))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Internal Server Error: boom");
    assert_eq!(
        progress.messages().last().unwrap(),
        "Similarity failed: Internal Server Error: boom"
    );
}

#[tokio::test]
async fn accepted_without_job_id_keeps_raw_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"job_id": 42})))
        .mount(&server)
        .await;

    let err = runner(&server.uri())
        .run(&similarity_request(&server, Arc::new(MemoryProgress::new())))
        .await
        .unwrap_err();

    match err {
        JobError::UnexpectedResponse { reason, body } => {
            assert_eq!(reason, "missing job_id");
            assert!(body.contains("42"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn failed_result_fetch_reports_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"job_id": "job-4"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "result_url": format!("{}/results/job-4", server.uri()),
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/results/job-4"))
        .respond_with(ResponseTemplate::new(404).set_body_string("expired"))
        .mount(&server)
        .await;

    let err = runner(&server.uri())
        .run(&similarity_request(&server, Arc::new(MemoryProgress::new())))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Not Found: expired");
}

#[tokio::test]
async fn pending_job_times_out_when_poll_timeout_is_set() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"job_id": "job-slow"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "pending"})))
        .mount(&server)
        .await;

    let progress = Arc::new(MemoryProgress::new());
    let err = runner(&server.uri())
        .with_poll_timeout(Some(Duration::from_millis(50)))
        .run(&similarity_request(&server, progress.clone()))
        .await
        .unwrap_err();

    match &err {
        JobError::PollTimeout { job_id, .. } => assert_eq!(job_id, "job-slow"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(requests_to(&server, "/v1/jobs").await >= 1);
    assert!(progress
        .messages()
        .last()
        .unwrap()
        .starts_with("Similarity failed: job job-slow still pending"));
}

#[tokio::test]
async fn token_failure_aborts_before_any_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"matrix": [[1]]})))
        .expect(0)
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let tokens = FnTokenProvider::new(|| async { Err::<String, _>(anyhow::anyhow!("token expired")) });
    let client = ApiClient::new(&config, Arc::new(tokens)).unwrap();

    let progress = Arc::new(MemoryProgress::new());
    let err = JobRunner::new(client)
        .run(&similarity_request(&server, progress.clone()))
        .await
        .unwrap_err();

    match &err {
        JobError::Auth(reason) => assert!(reason.contains("token expired")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(
        progress.messages().last().unwrap(),
        "Similarity failed: failed to acquire bearer token: token expired"
    );
}

#[tokio::test]
async fn job_status_server_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"job_id": "job-5"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/jobs"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
        .expect(1)
        .mount(&server)
        .await;

    let err = runner(&server.uri())
        .run(&similarity_request(&server, Arc::new(MemoryProgress::new())))
        .await
        .unwrap_err();

    match &err {
        JobError::Http { status, body, .. } => {
            assert_eq!(*status, 500);
            assert_eq!(body, "db down");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.to_string(), "Internal Server Error: db down");
    assert_eq!(requests_to(&server, "/v1/jobs").await, 1);
}

#[tokio::test]
async fn broken_progress_sink_does_not_stop_the_job() {
    struct Exploding;

    impl ProgressSink for Exploding {
        fn report(&self, _message: &str) -> anyhow::Result<()> {
            panic!("ui gone")
        }
    }

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"themes": [{"name": "price"}]})))
        .mount(&server)
        .await;

    let request = JobRequest::new(format!("{}/v1/themes", server.uri()), json!({}), "Themes")
        .with_progress(Arc::new(Exploding));
    let payload = runner(&server.uri()).run(&request).await.unwrap();

    assert_eq!(payload, ApiPayload::Themes(vec![json!({"name": "price"})]));
}

#[derive(Default)]
struct RecordingFeed {
    events: Mutex<Vec<(String, Option<FeedStatus>)>>,
}

impl JobFeed for RecordingFeed {
    fn create_item(&self, title: &str) -> anyhow::Result<FeedHandle> {
        self.events.lock().unwrap().push((format!("create {}", title), None));
        Ok(FeedHandle("item-1".into()))
    }

    fn update_item(
        &self,
        handle: &FeedHandle,
        message: &str,
        status: Option<FeedStatus>,
    ) -> anyhow::Result<()> {
        assert_eq!(handle.0, "item-1");
        self.events.lock().unwrap().push((message.to_string(), status));
        Ok(())
    }
}

#[tokio::test]
async fn job_feed_tracks_submission_polling_and_completion() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"job_id": "job-5"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "result_url": format!("{}/results/job-5", server.uri()),
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/results/job-5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [1, 2]})))
        .mount(&server)
        .await;

    let feed = Arc::new(RecordingFeed::default());
    let runner = runner(&server.uri()).with_feed(feed.clone());
    let payload = runner
        .run(&similarity_request(&server, Arc::new(MemoryProgress::new())))
        .await
        .unwrap();
    assert_eq!(payload, ApiPayload::Results(vec![json!(1), json!(2)]));

    let events = feed.events.lock().unwrap();
    assert_eq!(events.first().unwrap().0, "create Similarity");
    assert!(events
        .iter()
        .any(|(msg, status)| msg.contains("polling") && *status == Some(FeedStatus::Running)));
    assert_eq!(events.last().unwrap().1, Some(FeedStatus::Completed));
}
