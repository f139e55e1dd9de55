//! End-to-end recognition against a mock Sight service

mod common;

use std::time::Duration;

use common::*;
use serde_json::{Value, json};
use sight::{Error, ErrorKind, PollOutcome, RecognitionConfig};
use wiremock::MockServer;
use wiremock::ResponseTemplate;

#[tokio::test]
async fn synchronous_reply_yields_one_page() {
    let server = MockServer::start().await;
    let (_dir, paths) = input_files(&["receipt.png"]);
    mount_submit(
        &server,
        200,
        json!({
            "PollingURL": "",
            "RecognizedText": page_json(0, 1, 1)["RecognizedText"].clone()
        }),
    )
    .await;

    let client = client_for(&server);
    let stream = client.recognize(&paths).await.expect("recognize failed");
    assert_eq!(stream.total_files(), 1);

    let (pages, outcome) = stream.collect().await;
    assert!(outcome.is_completed());
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].file_index, 0);
    assert_eq!(pages[0].page_number, 1);
    assert_eq!(pages[0].number_of_pages_in_file, 1);
    assert_eq!(pages[0].recognized_text[0].text, "file 0 page 1");
    assert_eq!(poll_count(&server).await, 0);
}

#[tokio::test]
async fn two_files_complete_in_one_batch() {
    let server = MockServer::start().await;
    let (_dir, paths) = input_files(&["a.png", "b.jpg"]);
    mount_async_submit(&server).await;
    mount_poll_once(
        &server,
        ResponseTemplate::new(200).set_body_json(pages_body(vec![
            page_json(0, 1, 1),
            page_json(1, 1, 1),
        ])),
    )
    .await;

    let client = client_for(&server);
    let (pages, outcome) = client.recognize(&paths).await.unwrap().collect().await;

    assert!(matches!(outcome, PollOutcome::Completed));
    let mut files: Vec<i64> = pages.iter().map(|p| p.file_index).collect();
    files.sort_unstable();
    assert_eq!(files, vec![0, 1]);
    assert_eq!(poll_count(&server).await, 1);
}

#[tokio::test]
async fn pages_split_across_batches_arrive_in_order() {
    let server = MockServer::start().await;
    let (_dir, paths) = input_files(&["report.pdf"]);
    mount_async_submit(&server).await;
    mount_poll_once(
        &server,
        ResponseTemplate::new(200).set_body_json(pages_body(vec![page_json(0, 2, 3)])),
    )
    .await;
    mount_poll_once(
        &server,
        ResponseTemplate::new(200).set_body_json(pages_body(vec![])),
    )
    .await;
    mount_poll_once(
        &server,
        ResponseTemplate::new(200).set_body_json(pages_body(vec![
            page_json(0, 1, 3),
            page_json(0, 3, 3),
        ])),
    )
    .await;

    let client = client_for(&server);
    let mut stream = client.recognize(&paths).await.unwrap();

    let mut numbers = Vec::new();
    while let Some(page) = stream.next_page().await {
        numbers.push(page.page_number);
    }
    assert_eq!(numbers, vec![2, 1, 3]);
    assert!(stream.finish().await.is_completed());
    assert_eq!(poll_count(&server).await, 3);
}

#[tokio::test]
async fn rejected_key_fails_before_any_stream() {
    let server = MockServer::start().await;
    let (_dir, paths) = input_files(&["a.png"]);
    mount_submit(&server, 401, json!({ "Error": "bad key" })).await;

    let client = client_for(&server);
    let err = client.recognize(&paths).await.unwrap_err();

    assert!(matches!(err, Error::Unauthorized));
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert_eq!(poll_count(&server).await, 0);
}

#[tokio::test]
async fn initial_server_error_carries_status_and_body() {
    let server = MockServer::start().await;
    let (_dir, paths) = input_files(&["a.png"]);
    mount_submit(&server, 503, json!("overloaded")).await;

    let client = client_for(&server);
    match client.recognize(&paths).await {
        Err(Error::Server { status, body }) => {
            assert_eq!(status, 503);
            assert!(body.contains("overloaded"), "{body}");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn unauthorized_poll_stops_immediately() {
    let server = MockServer::start().await;
    let (_dir, paths) = input_files(&["a.png", "b.png"]);
    mount_async_submit(&server).await;
    mount_poll_once(
        &server,
        ResponseTemplate::new(200).set_body_json(pages_body(vec![page_json(0, 1, 1)])),
    )
    .await;
    mount_poll_fallback(&server, ResponseTemplate::new(401)).await;

    let client = client_for(&server);
    let (pages, outcome) = client.recognize(&paths).await.unwrap().collect().await;

    assert_eq!(pages.len(), 1);
    assert!(matches!(outcome, PollOutcome::Failed(Error::Unauthorized)));
    assert_eq!(poll_count(&server).await, 2);
}

#[tokio::test]
async fn five_consecutive_failures_end_the_stream() {
    let server = MockServer::start().await;
    let (_dir, paths) = input_files(&["a.png"]);
    mount_async_submit(&server).await;
    mount_poll_fallback(&server, ResponseTemplate::new(500).set_body_string("boom")).await;

    let client = client_for(&server);
    let (pages, outcome) = client.recognize(&paths).await.unwrap().collect().await;

    assert!(pages.is_empty());
    match outcome {
        PollOutcome::Failed(Error::RetriesExhausted { attempts, last }) => {
            assert_eq!(attempts, 5);
            assert!(matches!(*last, Error::Server { status: 500, .. }));
        }
        other => panic!("expected exhausted retries, got {other:?}"),
    }
    assert_eq!(poll_count(&server).await, 5);
}

#[tokio::test]
async fn a_good_poll_resets_the_failure_budget() {
    let server = MockServer::start().await;
    let (_dir, paths) = input_files(&["a.png", "b.png"]);
    mount_async_submit(&server).await;
    for _ in 0..4 {
        mount_poll_once(&server, ResponseTemplate::new(502)).await;
    }
    mount_poll_once(
        &server,
        ResponseTemplate::new(200).set_body_json(pages_body(vec![page_json(0, 1, 1)])),
    )
    .await;
    for _ in 0..4 {
        mount_poll_once(&server, ResponseTemplate::new(502)).await;
    }
    mount_poll_once(
        &server,
        ResponseTemplate::new(200).set_body_json(pages_body(vec![page_json(1, 1, 1)])),
    )
    .await;

    let client = client_for(&server);
    let (pages, outcome) = client.recognize(&paths).await.unwrap().collect().await;

    assert!(outcome.is_completed(), "{outcome:?}");
    assert_eq!(pages.len(), 2);
    assert_eq!(poll_count(&server).await, 10);
}

#[tokio::test]
async fn unreadable_file_is_finished_by_its_error_placeholder() {
    let server = MockServer::start().await;
    let (_dir, paths) = input_files(&["broken.pdf", "fine.png"]);
    mount_async_submit(&server).await;
    mount_poll_once(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(pages_body(vec![error_page_json(0, "could not open file")])),
    )
    .await;
    mount_poll_once(
        &server,
        ResponseTemplate::new(200).set_body_json(pages_body(vec![page_json(1, 1, 1)])),
    )
    .await;

    let client = client_for(&server);
    let mut stream = client.recognize(&paths).await.unwrap();

    let first = stream.next_page().await.expect("placeholder page");
    assert!(first.is_placeholder());
    assert_eq!(first.error(), Some("could not open file"));
    assert!(first.recognized_text.is_empty());

    let second = stream.next_page().await.expect("real page");
    assert_eq!(second.file_index, 1);
    assert!(stream.next_page().await.is_none());
    assert!(stream.finish().await.is_completed());
    assert_eq!(poll_count(&server).await, 2);
}

#[tokio::test]
async fn silent_file_keeps_polling_until_cancelled() {
    let server = MockServer::start().await;
    let (_dir, paths) = input_files(&["a.png", "b.png"]);
    mount_async_submit(&server).await;
    mount_poll_once(
        &server,
        ResponseTemplate::new(200).set_body_json(pages_body(vec![page_json(0, 1, 1)])),
    )
    .await;
    mount_poll_fallback(
        &server,
        ResponseTemplate::new(200).set_body_json(pages_body(vec![])),
    )
    .await;

    let client = client_for(&server);
    let mut stream = client.recognize(&paths).await.unwrap();
    assert_eq!(stream.next_page().await.unwrap().file_index, 0);

    // file 1 never reports, so the batch never completes on its own
    let waited = tokio::time::timeout(Duration::from_millis(100), stream.next_page()).await;
    assert!(waited.is_err());
    stream.cancel();
    assert!(matches!(stream.finish().await, PollOutcome::Cancelled));
    assert!(poll_count(&server).await >= 3);
}

#[tokio::test]
async fn request_carries_files_and_flags() {
    let server = MockServer::start().await;
    let (_dir, paths) = input_files(&["scan.jpg", "doc.pdf"]);
    mount_submit(&server, 200, json!({ "RecognizedText": [] })).await;

    let client = client_for(&server);
    let config = RecognitionConfig {
        script_hints: vec!["latin".to_string(), "greek".to_string()],
        do_auto_rotate: true,
        ..RecognitionConfig::words()
    };
    let (pages, outcome) = client
        .recognize_with(&config, &paths)
        .await
        .unwrap()
        .collect()
        .await;
    assert!(outcome.is_completed());
    assert_eq!(pages.len(), 1);

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["MakeSentences"], false);
    assert_eq!(body["DoAutoRotate"], true);
    assert_eq!(body["DoExifRotate"], false);
    assert_eq!(body["DoAsync"], false);
    assert_eq!(body["ScriptHints"], json!(["latin", "greek"]));

    let files = body["Files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["MimeType"], "image/jpg");
    assert_eq!(files[1]["MimeType"], "application/pdf");
    // "contents of scan.jpg"
    assert_eq!(files[0]["Base64File"], "Y29udGVudHMgb2Ygc2Nhbi5qcGc=");
}
