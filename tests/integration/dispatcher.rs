//! Integration tests for the request executor

use super::*;
use integrations_doccloud::prelude::*;
use integrations_doccloud::{TransportError, UploadStream};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use std::time::Duration;
use wiremock::matchers::{body_bytes, body_json, body_string_contains, header, header_regex, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_post_json_is_authenticated() {
    let mock_server = setup_mock_server().await;

    mock_with_auth("/convert", "POST")
        .and(header("Content-Type", "application/json; charset=utf-8"))
        .and(body_json(json!({"outputformat": "pdf"})))
        .respond_with(success_response(json!({"id": "abc"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client
        .executor()
        .post("/convert", json!({"outputformat": "pdf"}).into(), true)
        .await
        .expect("request should succeed");

    assert_eq!(response.as_json(), Some(&json!({"id": "abc"})));
}

#[tokio::test]
async fn test_get_mapping_becomes_query() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/process/abc"))
        .and(query_param("wait", "true"))
        .and(query_param("step", "convert"))
        .respond_with(success_response(json!({"step": "convert"})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let url = service_url(&mock_server, "/process/abc");
    let response = client
        .executor()
        .get(&url, json!({"wait": true, "step": "convert"}).into(), false)
        .await
        .unwrap();
    assert!(response.as_json().is_some());

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].body.is_empty());
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_multipart_upload() {
    let mock_server = setup_mock_server().await;

    let mut source = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
    source.write_all(b"word document").unwrap();

    mock_with_auth("/convert", "POST")
        .and(header_regex("Content-Type", "^multipart/form-data"))
        .and(body_string_contains("name=\"files[0]\""))
        .and(body_string_contains("word document"))
        .respond_with(success_response(json!({"id": "abc"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    client
        .executor()
        .post("/convert", RequestContent::files([source.path()]), true)
        .await
        .expect("upload should succeed");
}

#[tokio::test]
async fn test_raw_stream_upload() {
    let mock_server = setup_mock_server().await;

    mock_with_auth("/convert", "POST")
        .and(body_bytes(b"raw document".to_vec()))
        .respond_with(success_response(json!({"id": "abc"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let content = RequestContent::RawStream(UploadStream::from_bytes("raw document"));
    client
        .executor()
        .post("/convert", content, true)
        .await
        .expect("raw upload should succeed");
}

#[tokio::test]
async fn test_non_json_response_is_streamed() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/download/abc/out.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.7".to_vec(), "application/pdf"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client
        .executor()
        .get(
            &format!("{}/download/abc/out.pdf", mock_server.uri()),
            RequestContent::Empty,
            false,
        )
        .await
        .unwrap();

    assert!(response.as_json().is_none());
    let body = response.into_stream().unwrap().collect_bytes().await.unwrap();
    assert_eq!(&body[..], b"%PDF-1.7");
}

#[tokio::test]
async fn test_bad_request() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(error_response(400, json!({"message": "outputformat is missing"})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let error = client
        .create_convert(json!({}).into())
        .await
        .unwrap_err();

    match error {
        DocCloudError::BadRequest { message, status_code } => {
            assert_eq!(message, "outputformat is missing");
            assert_eq!(status_code, 400);
        }
        other => panic!("Expected BadRequest, got {:?}", other),
    }
}

#[tokio::test]
async fn test_conversion_failed() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(error_response(422, json!({"error": "bad format"})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let error = client
        .create_convert(json!({"outputformat": "pdf"}).into())
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        DocCloudError::ConversionFailed { ref message, status_code: 422 } if message == "bad format"
    ));
}

#[tokio::test]
async fn test_temporary_unavailable_with_retry_after() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(
            error_response(503, json!({"message": "maintenance"})).insert_header("Retry-After", "30"),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let error = client
        .create_convert(json!({}).into())
        .await
        .unwrap_err();

    assert!(matches!(error, DocCloudError::TemporaryUnavailable { .. }));
    assert_eq!(error.retry_after(), Some(Duration::from_secs(30)));
    assert!(error.is_retryable());
}

#[tokio::test]
async fn test_temporary_unavailable_without_retry_after() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(error_response(503, json!({"message": "maintenance"})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let error = client
        .create_convert(json!({}).into())
        .await
        .unwrap_err();

    assert!(matches!(error, DocCloudError::TemporaryUnavailable { retry_after: None, .. }));
    assert_eq!(error.retry_after(), None);
}

#[tokio::test]
async fn test_other_status_is_api_error() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(error_response(401, json!({"message": "Invalid access token"})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let error = client
        .create_convert(json!({}).into())
        .await
        .unwrap_err();

    assert!(matches!(error, DocCloudError::Api { status_code: 401, .. }));
    assert_eq!(error.api_message(), Some("Invalid access token"));
}

#[tokio::test]
async fn test_unparseable_error_body() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let error = client
        .create_convert(json!({}).into())
        .await
        .unwrap_err();

    assert!(matches!(error, DocCloudError::Parse { .. }));
}

#[tokio::test]
async fn test_error_without_message_is_unclassified() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(error_response(404, json!({"detail": "Not Found"})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let error = client
        .create_convert(json!({}).into())
        .await
        .unwrap_err();

    match error {
        DocCloudError::Transport(TransportError::Status { status, body }) => {
            assert_eq!(status, 404);
            assert!(body.contains("Not Found"));
        }
        other => panic!("Expected unclassified HTTP error, got {:?}", other),
    }
}
