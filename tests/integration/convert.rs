//! Integration tests for the conversion job lifecycle

use super::*;
use integrations_doccloud::prelude::*;
use integrations_doccloud::ConvertState;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

async fn mount_created_job(mock_server: &MockServer) {
    mock_with_auth("/convert", "POST")
        .respond_with(success_response(json!({
            "id": "abc",
            "url": service_url(mock_server, "/process/abc")
        })))
        .mount(mock_server)
        .await;
}

async fn mount_status(mock_server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/process/abc"))
        .respond_with(success_response(body))
        .mount(mock_server)
        .await;
}

fn pdf_response(body: &[u8]) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_vec(), "application/pdf")
}

#[tokio::test]
async fn test_single_output_lifecycle() {
    let mock_server = setup_mock_server().await;
    mount_created_job(&mock_server).await;
    mount_status(
        &mock_server,
        json!({
            "id": "abc",
            "url": service_url(&mock_server, "/process/abc"),
            "output": {
                "url": service_url(&mock_server, "/download/abc"),
                "filename": "out.pdf",
                "size": 8
            }
        }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/download/abc"))
        .respond_with(pdf_response(b"%PDF-1.7"))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/process/abc"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let mut job = client
        .create_convert(json!({"outputformat": "pdf"}).into())
        .await
        .unwrap();
    assert_eq!(job.state(), ConvertState::Created);

    job.wait(Duration::from_millis(10), 3).await.unwrap();
    assert_eq!(job.state(), ConvertState::Completed);
    assert_eq!(job.lookup("output.filename"), Some(&json!("out.pdf")));

    let dir = tempfile::tempdir().unwrap();
    let saved = job.download(Some(dir.path()), None).await.unwrap();
    assert_eq!(saved.file_name().unwrap(), "out.pdf");
    assert_eq!(std::fs::read(&saved).unwrap(), b"%PDF-1.7");

    job.delete().await.unwrap();
    assert_eq!(job.state(), ConvertState::Deleted);
}

#[tokio::test]
async fn test_download_all_multiple_outputs() {
    let mock_server = setup_mock_server().await;
    mount_status(
        &mock_server,
        json!({
            "output": {
                "url": service_url(&mock_server, "/download/abc"),
                "files": [
                    {"filename": "page 1.png", "size": 3},
                    {"filename": "page 2.png", "size": 3}
                ]
            }
        }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/download/abc/page%201.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"one".to_vec(), "image/png"))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download/abc/page%202.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"two".to_vec(), "image/png"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let mut job = client
        .convert()
        .resume(json!({"id": "abc", "url": service_url(&mock_server, "/process/abc")}))
        .unwrap();
    job.refresh(None).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let paths = job.download_all(Some(dir.path())).await.unwrap();

    assert_eq!(paths.len(), 2);
    assert_eq!(std::fs::read(dir.path().join("page 1.png")).unwrap(), b"one");
    assert_eq!(std::fs::read(dir.path().join("page 2.png")).unwrap(), b"two");
}

#[tokio::test]
async fn test_download_stream_before_completion() {
    let mock_server = setup_mock_server().await;
    mount_status(&mock_server, json!({"id": "abc", "step": "convert"})).await;

    let client = client_for(&mock_server);
    let mut job = client
        .convert()
        .resume(json!({"url": service_url(&mock_server, "/process/abc")}))
        .unwrap();
    job.refresh(None).await.unwrap();
    assert_eq!(job.state(), ConvertState::Processing);

    let mut sink = Vec::new();
    let error = job.download_stream(&mut sink, None).await.unwrap_err();

    assert!(matches!(error, DocCloudError::Api { status_code: 400, .. }));
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_download_stream_to_writer() {
    let mock_server = setup_mock_server().await;
    mount_status(
        &mock_server,
        json!({"output": {"url": service_url(&mock_server, "/download/abc")}}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/download/abc/report.pdf"))
        .respond_with(pdf_response(b"%PDF-1.7 report"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let mut job = client
        .convert()
        .resume(json!({"url": service_url(&mock_server, "/process/abc")}))
        .unwrap();
    job.refresh(None).await.unwrap();

    let mut sink = Vec::new();
    let written = job.download_stream(&mut sink, Some("report.pdf")).await.unwrap();

    assert_eq!(written, 15);
    assert_eq!(sink, b"%PDF-1.7 report".to_vec());
}

#[tokio::test]
async fn test_download_requires_destination_for_multiple_outputs() {
    let mock_server = setup_mock_server().await;
    mount_status(
        &mock_server,
        json!({
            "output": {
                "url": service_url(&mock_server, "/download/abc"),
                "files": ["a.png", "b.png"]
            }
        }),
    )
    .await;

    let client = client_for(&mock_server);
    let mut job = client
        .convert()
        .resume(json!({"url": service_url(&mock_server, "/process/abc")}))
        .unwrap();
    job.refresh(None).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let error = job.download(Some(dir.path()), None).await.unwrap_err();
    assert!(matches!(error, DocCloudError::InvalidParameter { .. }));
}

#[tokio::test]
async fn test_refresh_replaces_data() {
    let mock_server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/process/abc"))
        .respond_with(success_response(json!({"step": "upload", "percent": 10})))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/process/abc"))
        .respond_with(success_response(json!({"step": "convert"})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let mut job = client
        .convert()
        .resume(json!({"url": service_url(&mock_server, "/process/abc")}))
        .unwrap();

    job.refresh(None).await.unwrap();
    assert_eq!(job.get("percent"), Some(&json!(10)));

    job.refresh(None).await.unwrap();
    assert_eq!(job.get("step"), Some(&json!("convert")));
    assert_eq!(job.get("percent"), None);
}

#[tokio::test]
async fn test_refresh_error_is_classified() {
    let mock_server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/process/abc"))
        .respond_with(
            error_response(503, json!({"error": "Service paused"})).insert_header("Retry-After", "5"),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let mut job = client
        .convert()
        .resume(json!({"url": service_url(&mock_server, "/process/abc")}))
        .unwrap();

    let error = job.wait(Duration::from_millis(10), 5).await.unwrap_err();
    assert_eq!(error.retry_after(), Some(Duration::from_secs(5)));
    assert_eq!(job.state(), ConvertState::Created);
}
