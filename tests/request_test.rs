//! Request lifecycle behavior against a scripted transport.

mod common;

use common::{client_with, MockReply, MockTransport};
use http::header;
use searchnet::base::{LoadState, NetError};
use searchnet::restapi::request::RequestOptions;

const TARGET: &str = "https://api.example.com/search?q=rust";

#[tokio::test]
async fn response_without_run_reports_not_started() {
    let transport = MockTransport::new(vec![]);
    let client = client_with(transport);
    let request = client.create(TARGET, RequestOptions::default()).unwrap();
    assert_eq!(request.response().await, Err(NetError::NotStarted));
}

#[tokio::test]
async fn second_run_reports_already_started() {
    let transport = MockTransport::new(vec![MockReply::Status(200, "{}")]);
    let client = client_with(transport);
    let request = client.create(TARGET, RequestOptions::default()).unwrap();
    request.run().unwrap();
    assert_eq!(request.run(), Err(NetError::AlreadyStarted));
}

#[tokio::test]
async fn load_state_tracks_the_lifecycle() {
    let transport = MockTransport::gated(vec![MockReply::Status(200, "{}")]);
    let client = client_with(transport.clone());
    let request = client.create(TARGET, RequestOptions::default()).unwrap();

    assert_eq!(request.load_state(), LoadState::Idle);
    request.run().unwrap();
    assert_eq!(request.load_state(), LoadState::Fetching);

    transport.release(1);
    request.response().await.unwrap();
    assert_eq!(request.load_state(), LoadState::Complete);
    assert!(request.load_state().is_settled());
}

#[tokio::test]
async fn failed_request_settles_into_failed_state() {
    let transport = MockTransport::new(vec![MockReply::Error("connection refused")]);
    let client = client_with(transport);
    let request = client.create(TARGET, RequestOptions::default()).unwrap();
    request.run().unwrap();
    let err = request.response().await.unwrap_err();
    assert_eq!(err, NetError::Transport("connection refused".to_owned()));
    assert_eq!(request.load_state(), LoadState::Failed);
}

#[tokio::test]
async fn abort_without_replacement_fails_with_aborted() {
    let transport = MockTransport::gated(vec![MockReply::Status(200, "{}")]);
    let client = client_with(transport.clone());
    let request = client.create(TARGET, RequestOptions::default()).unwrap();
    request.run().unwrap();
    tokio::task::yield_now().await;

    request.abort();
    assert!(request.is_aborted());
    assert_eq!(request.response().await, Err(NetError::Aborted));
    assert!(client.registry().is_empty());
    assert_eq!(transport.completed(), 0);
}

#[tokio::test]
async fn posts_with_bodies_each_reach_the_server() {
    let transport = MockTransport::new(vec![
        MockReply::Status(200, r#"{"n":1}"#),
        MockReply::Status(200, r#"{"n":2}"#),
    ]);
    let client = client_with(transport.clone());

    let first = client.post(TARGET).body("payload").build().unwrap();
    let second = client.post(TARGET).body("payload").build().unwrap();
    first.run().unwrap();
    second.run().unwrap();

    let first_body = first.response().await.unwrap().text_lossy();
    let second_body = second.response().await.unwrap().text_lossy();
    assert_eq!(first_body, r#"{"n":1}"#);
    assert_eq!(second_body, r#"{"n":2}"#);
    assert_eq!(transport.started(), 2);
    assert!(client.registry().is_empty());
}

#[tokio::test]
async fn baseline_json_headers_reach_the_transport() {
    let transport = MockTransport::new(vec![MockReply::Status(200, "{}")]);
    let client = client_with(transport.clone());
    client
        .get(TARGET)
        .header("x-request-id", "7")
        .send()
        .await
        .unwrap();

    let seen = transport.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].headers[header::CONTENT_TYPE], "application/json");
    assert_eq!(seen[0].headers[header::ACCEPT], "application/json");
    assert_eq!(seen[0].headers["x-request-id"], "7");
}
