//! End-to-end node tests against a mocked BounceBan API.
//!
//! These drive `BouncebanNode` through the real `BouncebanClient`, so the
//! 408 retry budget and header scheme are exercised together with the
//! processing-mode semantics.

use std::sync::Arc;

use bounceban_api::{BouncebanClient, ClientConfig};
use nodes::{BouncebanNode, NodeParameters};
use pipeline::{ApiError, ApiKey, InputItem, ItemIndex, NodeError, ProcessingMode, RESULT_KEY};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn node(server: &MockServer, mode: ProcessingMode, continue_on_fail: bool) -> BouncebanNode {
    let config = ClientConfig::new(ApiKey::new("node-key").unwrap()).with_base_url(server.uri());
    let client = BouncebanClient::new(config).expect("failed to create client");
    let parameters = NodeParameters {
        processing_mode: mode,
        continue_on_fail,
        ..Default::default()
    };
    BouncebanNode::new(Arc::new(client), parameters)
}

async fn mount_verify(server: &MockServer, email: &str, status: u16, expected_calls: u64) {
    let template = if status == 200 {
        ResponseTemplate::new(200).set_body_json(json!({"email": email, "result": "deliverable"}))
    } else {
        ResponseTemplate::new(status)
    };

    Mock::given(method("GET"))
        .and(path("/v1/verify/single"))
        .and(header("authorization", "node-key"))
        .and(query_param("email", email))
        .respond_with(template)
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn input(emails: &[&str]) -> Vec<InputItem> {
    emails
        .iter()
        .map(|e| InputItem::new(json!({"email": e})))
        .collect()
}

#[tokio::test]
async fn test_batch_embeds_exhausted_408_and_keeps_other_results() {
    let server = MockServer::start().await;
    mount_verify(&server, "ok1@example.com", 200, 1).await;
    mount_verify(&server, "slow@example.com", 408, 16).await;
    mount_verify(&server, "ok2@example.com", 200, 1).await;

    let out = node(&server, ProcessingMode::Batch, false)
        .execute(&input(&["ok1@example.com", "slow@example.com", "ok2@example.com"]))
        .await
        .expect("batch mode never aborts");

    assert_eq!(out.items.len(), 3);
    assert_eq!(out.items[0].json[RESULT_KEY]["result"], "deliverable");
    assert!(out.items[1].error_message().unwrap().contains("16 attempt"));
    assert_eq!(out.items[2].json[RESULT_KEY]["result"], "deliverable");
}

#[tokio::test]
async fn test_sequential_surfaces_exhausted_408() {
    let server = MockServer::start().await;
    mount_verify(&server, "ok@example.com", 200, 1).await;
    mount_verify(&server, "slow@example.com", 408, 16).await;
    mount_verify(&server, "never@example.com", 200, 0).await;

    let err = node(&server, ProcessingMode::Sequential, false)
        .execute(&input(&["ok@example.com", "slow@example.com", "never@example.com"]))
        .await
        .unwrap_err();

    match err {
        NodeError::ItemFailed {
            item,
            source: ApiError::RequestTimeout { attempts, .. },
        } => {
            assert_eq!(item, ItemIndex::new(1));
            assert_eq!(attempts, 16);
        }
        other => panic!("expected an exhausted 408 on item 1, got {other:?}"),
    }
}

#[tokio::test]
async fn test_sequential_halts_on_bad_request() {
    let server = MockServer::start().await;
    mount_verify(&server, "first@example.com", 200, 1).await;
    mount_verify(&server, "bad@example.com", 400, 1).await;
    mount_verify(&server, "never@example.com", 200, 0).await;

    let err = node(&server, ProcessingMode::Sequential, false)
        .execute(&input(&["first@example.com", "bad@example.com", "never@example.com"]))
        .await
        .unwrap_err();

    assert!(matches!(err, NodeError::ItemFailed { item, .. } if item == ItemIndex::new(1)));
}

#[tokio::test]
async fn test_sequential_continue_on_fail_processes_every_item() {
    let server = MockServer::start().await;
    mount_verify(&server, "first@example.com", 200, 1).await;
    mount_verify(&server, "bad@example.com", 500, 1).await;
    mount_verify(&server, "last@example.com", 200, 1).await;

    let out = node(&server, ProcessingMode::Sequential, true)
        .execute(&input(&["first@example.com", "bad@example.com", "last@example.com"]))
        .await
        .unwrap();

    assert_eq!(out.items.len(), 3);
    assert!(out.items[1].error_message().unwrap().contains("HTTP 500"));
    assert_eq!(out.summary.failed, 1);
}

#[tokio::test]
async fn test_missing_email_sends_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let out = node(&server, ProcessingMode::Batch, false)
        .execute(&[InputItem::new(json!({"email": ""})), InputItem::new(json!({}))])
        .await
        .unwrap();

    assert_eq!(out.summary.missing_email, 2);
}

#[tokio::test]
async fn test_credential_check_uses_account_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/account"))
        .and(header("authorization", "node-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"credits": 5})))
        .expect(1)
        .mount(&server)
        .await;

    let account = node(&server, ProcessingMode::Sequential, false)
        .test_credentials()
        .await
        .unwrap();

    assert_eq!(account["credits"], 5);
}
