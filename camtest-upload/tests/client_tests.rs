//! Upload client against mock endpoints

use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use bytes::Bytes;
use camtest_core::{CamTestError, RecordedClip};
use camtest_upload::{HttpUploadClient, UploadClient, UploadMetadata};
use serde_json::{json, Value};
use tokio::net::TcpListener;

async fn spawn_endpoint(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{}/upload-test", addr)
}

/// Echoes what the client sent, reporting the size in camelCase
async fn echo_upload(mut multipart: Multipart) -> Json<Value> {
    let mut size = 0usize;
    let mut file_name = None;
    let mut content_type = None;
    let mut user_id = None;

    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("video") => {
                file_name = field.file_name().map(str::to_string);
                content_type = field.content_type().map(str::to_string);
                size = field.bytes().await.unwrap().len();
            }
            Some("user_id") => user_id = Some(field.text().await.unwrap()),
            _ => {}
        }
    }

    Json(json!({
        "sizeBytes": size,
        "filename": file_name,
        "content_type": content_type,
        "user_id": user_id,
    }))
}

fn clip(len: usize) -> RecordedClip {
    RecordedClip::from_chunks(&[Bytes::from(vec![9u8; len])], "video/webm;codecs=vp8,opus")
}

#[tokio::test]
async fn test_multipart_shape() {
    let url = spawn_endpoint(Router::new().route("/upload-test", post(echo_upload))).await;
    let client = HttpUploadClient::new(&url);

    let ack = client
        .upload(&clip(1_234), &UploadMetadata::for_user("99"))
        .await
        .unwrap();

    assert_eq!(ack.size_bytes, 1_234);
    assert_eq!(ack.receipt.user_id.as_deref(), Some("99"));
    assert_eq!(ack.receipt.content_type.as_deref(), Some("video/webm"));
    let file_name = ack.receipt.filename.unwrap();
    assert!(file_name.starts_with("video_"));
    assert!(file_name.ends_with(".webm"));
}

#[tokio::test]
async fn test_user_id_omitted_without_metadata() {
    let url = spawn_endpoint(Router::new().route("/upload-test", post(echo_upload))).await;
    let client = HttpUploadClient::new(&url);

    let ack = client
        .upload(&clip(10), &UploadMetadata::default())
        .await
        .unwrap();

    assert_eq!(ack.size_bytes, 10);
    assert!(ack.receipt.user_id.is_none());
}

#[tokio::test]
async fn test_unparseable_mime_type_is_sent_without_content_type() {
    let url = spawn_endpoint(Router::new().route("/upload-test", post(echo_upload))).await;
    let client = HttpUploadClient::new(&url);
    let clip = RecordedClip::from_file("clip.mov", "not a mime type", Bytes::from(vec![1u8; 64]));

    let ack = client
        .upload(&clip, &UploadMetadata::default())
        .await
        .unwrap();

    assert_eq!(ack.size_bytes, 64);
    assert!(ack.receipt.content_type.is_none());
}

#[tokio::test]
async fn test_server_error_status() {
    let router = Router::new().route(
        "/upload-test",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let client = HttpUploadClient::new(&spawn_endpoint(router).await);

    let err = client
        .upload(&clip(10), &UploadMetadata::default())
        .await
        .unwrap_err();

    match err {
        CamTestError::Server { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Internal Server Error");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_success_without_size_is_malformed() {
    let router = Router::new().route(
        "/upload-test",
        post(|| async { Json(json!({"status": "success"})) }),
    );
    let client = HttpUploadClient::new(&spawn_endpoint(router).await);

    let err = client
        .upload(&clip(10), &UploadMetadata::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CamTestError::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_non_json_success_is_malformed() {
    let router = Router::new().route("/upload-test", post(|| async { "ok" }));
    let client = HttpUploadClient::new(&spawn_endpoint(router).await);

    let err = client
        .upload(&clip(10), &UploadMetadata::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CamTestError::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpUploadClient::new(&format!("http://{}/upload-test", addr));
    let err = client
        .upload(&clip(10), &UploadMetadata::default())
        .await
        .unwrap_err();

    assert!(matches!(err, CamTestError::Network { .. }));
    assert!(!err.is_fatal());
}
