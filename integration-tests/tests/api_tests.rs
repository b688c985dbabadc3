use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use bytes::Bytes;
use serde_json::{json, Value};

use common::types::job::StatusSnapshot;
use common::types::voice::VoiceAsset;

mod test_utils;
use test_utils::*;

fn snapshot(status: &str) -> StatusSnapshot {
    StatusSnapshot::new(status)
}

fn completed_snapshot(result: Value) -> StatusSnapshot {
    let mut done = StatusSnapshot::new("done");
    done.result = Some(result);
    done
}

#[tokio::test]
async fn test_probes_respond() {
    let (server, _) = setup_server(ScriptedUpstream::new(Value::Null, Vec::new()));

    let response = server.get("/api/v1/live").await;
    response.assert_status(StatusCode::OK);

    let response = server.get("/api/v1/ready").await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["checks"]["storage"], "ok");
    assert_eq!(body["storage_backend"], "memory");
}

#[tokio::test]
async fn test_content_generation_with_wait_returns_result() {
    let upstream = ScriptedUpstream::new(
        json!({ "request_id": "req-1" }),
        vec![completed_snapshot(json!({ "content": "a short summary" }))],
    );
    let (server, _) = setup_server(upstream.clone());

    let response = server
        .post("/api/v1/content?wait=true")
        .json(&json!({ "text": "Long source material" }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["job_id"], "req-1");
    assert_eq!(body["state"], "completed");
    assert_eq!(body["result"]["content"], "a short summary");

    assert_eq!(upstream.create_calls(), 1);
    // Terminal on the first poll means exactly one status request
    assert_eq!(upstream.status_calls(), 1);
}

#[tokio::test]
async fn test_content_generation_without_wait_is_accepted() {
    let upstream = ScriptedUpstream::new(json!({ "request_id": "req-2" }), Vec::new());
    let (server, _) = setup_server(upstream.clone());

    let response = server
        .post("/api/v1/content")
        .json(&json!({ "text": "Long source material" }))
        .await;

    response.assert_status(StatusCode::ACCEPTED);
    let body: Value = response.json();
    assert_eq!(body["job_id"], "req-2");
    assert_eq!(body["state"], "pending");
    assert_eq!(upstream.status_calls(), 0);
}

#[tokio::test]
async fn test_blank_text_is_rejected_before_any_upstream_call() {
    let upstream = ScriptedUpstream::new(json!({ "request_id": "req-3" }), Vec::new());
    let (server, _) = setup_server(upstream.clone());

    let response = server
        .post("/api/v1/analysis/sentiment")
        .json(&json!({ "text": "   " }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(upstream.create_calls(), 0);
    assert_eq!(upstream.status_calls(), 0);
}

#[tokio::test]
async fn test_failed_job_reports_upstream_message() {
    let mut failed = StatusSnapshot::new("error");
    failed.error_message = Some("boom".to_string());
    let upstream = ScriptedUpstream::new(
        json!({ "request_id": "req-4" }),
        vec![snapshot("in_progress"), failed],
    );
    let (server, _) = setup_server(upstream);

    let response = server
        .post("/api/v1/analysis/argumentation?wait=true")
        .json(&json!({ "text": "Claims and warrants" }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["state"], "failed");
    assert_eq!(body["error"], "boom");
}

#[tokio::test]
async fn test_failed_job_without_message_gets_generic_fallback() {
    let upstream = ScriptedUpstream::new(json!({ "request_id": "req-5" }), vec![snapshot("error")]);
    let (server, _) = setup_server(upstream);

    let response = server
        .post("/api/v1/content?wait=true")
        .json(&json!({ "text": "Source" }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["state"], "failed");
    assert_eq!(body["error"], "The job failed without a diagnostic message");
}

#[tokio::test]
async fn test_wait_endpoint_times_out_with_check_back_later() {
    let upstream = ScriptedUpstream::new(Value::Null, vec![snapshot("in_progress")]);
    let (server, _) = setup_server(upstream.clone());

    let response = server.get("/api/v1/jobs/job-busy/wait").await;

    // Exhausting the attempt budget is "still processing", not a failure
    response.assert_status(StatusCode::ACCEPTED);
    let body: Value = response.json();
    assert_eq!(body["status"], "processing");
    assert_eq!(body["job_id"], "job-busy");
    assert_eq!(body["attempts"], 3);
    assert_eq!(upstream.status_calls(), 3);
}

#[tokio::test]
async fn test_single_status_check_makes_one_request() {
    let upstream = ScriptedUpstream::new(Value::Null, vec![snapshot("in_progress")]);
    let (server, _) = setup_server(upstream.clone());

    let response = server.get("/api/v1/jobs/job-1").await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["state"], "processing");
    assert_eq!(upstream.status_calls(), 1);
}

#[tokio::test]
async fn test_upstream_status_error_maps_to_bad_gateway() {
    let upstream = ScriptedUpstream::failing_status(500);
    let (server, _) = setup_server(upstream);

    let response = server.get("/api/v1/jobs/job-1").await;
    response.assert_status(StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_unknown_job_maps_to_not_found() {
    let upstream = ScriptedUpstream::failing_status(404);
    let (server, _) = setup_server(upstream);

    let response = server.get("/api/v1/jobs/job-missing").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_voice_clone_end_to_end() {
    let stock_voice = VoiceAsset {
        id: "stock-1".to_string(),
        name: "Narrator".to_string(),
        source_audio_url: None,
        preview_url: None,
    };
    let upstream = ScriptedUpstream::with_voices(
        json!({ "id": "clone-job-1" }),
        vec![completed_snapshot(
            json!({ "voice_id": "voice-9", "preview_url": "https://cdn/preview.mp3" }),
        )],
        vec![stock_voice],
    );
    let (server, state) = setup_server(upstream.clone());

    let form = MultipartForm::new().add_text("name", "My Voice").add_part(
        "audio",
        Part::bytes(b"fake audio bytes".to_vec())
            .file_name("clip.mp3")
            .mime_type("audio/mpeg"),
    );
    let response = server.post("/api/v1/voices/clone").multipart(form).await;

    response.assert_status(StatusCode::CREATED);
    let asset: Value = response.json();
    assert_eq!(asset["id"], "voice-9");
    assert_eq!(asset["name"], "My Voice");
    assert_eq!(asset["preview_url"], "https://cdn/preview.mp3");

    // The uploaded audio is reachable under the advertised media URL path
    let source_url = asset["source_audio_url"].as_str().expect("source url");
    assert!(source_url.contains("/media/uploads/"));
    assert!(source_url.ends_with("-clip.mp3"));

    // The cloned voice joins the session library behind the stock voices
    let response = server.get("/api/v1/voices").await;
    response.assert_status(StatusCode::OK);
    let voices: Vec<Value> = response.json();
    assert_eq!(voices.len(), 2);
    assert_eq!(voices[0]["id"], "stock-1");
    assert_eq!(voices[1]["id"], "voice-9");

    assert_eq!(state.voices.read().await.len(), 1);
}

#[tokio::test]
async fn test_voice_clone_without_name_is_rejected() {
    let upstream = ScriptedUpstream::new(json!({ "id": "clone-job-2" }), Vec::new());
    let (server, _) = setup_server(upstream.clone());

    let form = MultipartForm::new().add_text("name", "").add_part(
        "audio",
        Part::bytes(b"fake audio bytes".to_vec())
            .file_name("clip.mp3")
            .mime_type("audio/mpeg"),
    );
    let response = server.post("/api/v1/voices/clone").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(upstream.create_calls(), 0);
    assert_eq!(upstream.status_calls(), 0);
}

#[tokio::test]
async fn test_upload_over_configured_limit_is_rejected() {
    let upstream = ScriptedUpstream::new(json!({ "id": "clone-job-3" }), Vec::new());
    let mut config = test_config();
    config.upload_max_bytes = 1024;
    let (server, _) = setup_server_with_config(upstream.clone(), config);

    let form = MultipartForm::new().add_text("name", "Big Voice").add_part(
        "audio",
        Part::bytes(vec![0u8; 4096])
            .file_name("big.mp3")
            .mime_type("audio/mpeg"),
    );
    let response = server.post("/api/v1/voices/clone").multipart(form).await;

    assert!(response.status_code().is_client_error());
    assert_eq!(upstream.create_calls(), 0);
    assert_eq!(upstream.status_calls(), 0);
}

#[tokio::test]
async fn test_stored_media_is_served_with_content_type() {
    let (server, state) = setup_server(ScriptedUpstream::new(Value::Null, Vec::new()));

    state
        .media
        .put("uploads/123-clip.mp3", Bytes::from_static(b"audio"))
        .await
        .expect("seed media");

    let response = server.get("/api/v1/media/uploads/123-clip.mp3").await;
    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.header("content-type"),
        "audio/mpeg".parse::<axum::http::HeaderValue>().expect("header")
    );
    assert_eq!(response.as_bytes().as_ref(), b"audio");
}

#[tokio::test]
async fn test_missing_media_is_not_found() {
    let (server, _) = setup_server(ScriptedUpstream::new(Value::Null, Vec::new()));

    let response = server.get("/api/v1/media/uploads/nope.mp3").await;
    response.assert_status(StatusCode::NOT_FOUND);
}
