use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::Method;
use serde::Deserialize;
use tracing::info;

use rawpeek_core::config::UploadMethod;
use rawpeek_core::error::{RawPeekError, Result};
use rawpeek_core::transfer::{UploadReceipt, Uploader};

use crate::parse_http_url;

#[derive(Debug, Deserialize)]
struct StorageResponse {
    #[serde(rename = "storageId")]
    storage_id: Option<String>,
}

/// Pull `storageId` out of the destination's JSON reply.
pub fn parse_storage_id(body: &str) -> Result<String> {
    let response: StorageResponse = serde_json::from_str(body)
        .map_err(|e| RawPeekError::Upload(format!("unreadable upload response: {e}")))?;

    response
        .storage_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| RawPeekError::Upload("No storageId returned from upload".to_string()))
}

/// Sends the preview as `image/jpeg` to a pre-signed destination URL.
pub struct HttpUploader {
    client: reqwest::Client,
    method: Method,
}

impl HttpUploader {
    pub fn new(timeout: Duration, method: UploadMethod) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let method = match method {
            UploadMethod::Post => Method::POST,
            UploadMethod::Put => Method::PUT,
        };
        Ok(Self { client, method })
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload(&self, url: &str, image: Vec<u8>) -> Result<UploadReceipt> {
        let parsed = parse_http_url(url)?;
        let size = image.len();
        info!(method = %self.method, bytes = size, "Uploading preview");

        let response = self
            .client
            .request(self.method.clone(), parsed)
            .header(CONTENT_TYPE, "image/jpeg")
            .header(CONTENT_LENGTH, size)
            .body(image)
            .send()
            .await
            .map_err(|e| RawPeekError::Upload(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RawPeekError::Upload(format!("reading response failed: {e}")))?;

        if !status.is_success() {
            return Err(RawPeekError::Upload(format!(
                "destination returned status {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let storage_id = parse_storage_id(&body)?;
        info!(storage_id = %storage_id, "Preview uploaded");
        Ok(UploadReceipt { storage_id })
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Bytes,
        http::{HeaderMap, StatusCode},
        routing::{post, put},
        Json, Router,
    };

    use super::*;

    #[test]
    fn storage_id_is_extracted() {
        assert_eq!(parse_storage_id(r#"{"storageId":"kg2abc"}"#).unwrap(), "kg2abc");
    }

    #[test]
    fn missing_or_blank_storage_id_is_an_upload_failure() {
        for body in [r#"{}"#, r#"{"storageId":null}"#, r#"{"storageId":"  "}"#] {
            let err = parse_storage_id(body).unwrap_err();
            assert!(matches!(err, RawPeekError::Upload(_)), "body {body}: {err:?}");
        }
    }

    #[test]
    fn non_json_reply_is_an_upload_failure() {
        assert!(matches!(
            parse_storage_id("<html>ok</html>"),
            Err(RawPeekError::Upload(_))
        ));
    }

    async fn echo_size(headers: HeaderMap, body: Bytes) -> Json<serde_json::Value> {
        let content_type = headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        Json(serde_json::json!({
            "storageId": format!("{content_type}:{}", body.len())
        }))
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn posts_jpeg_and_returns_storage_id() {
        let base = serve(Router::new().route("/upload", post(echo_size))).await;
        let uploader = HttpUploader::new(Duration::from_secs(10), UploadMethod::Post).unwrap();

        let receipt = uploader
            .upload(&format!("{base}/upload"), vec![0xff; 1234])
            .await
            .unwrap();
        assert_eq!(receipt.storage_id, "image/jpeg:1234");
    }

    #[tokio::test]
    async fn put_method_is_honoured() {
        let base = serve(Router::new().route("/upload", put(echo_size))).await;
        let uploader = HttpUploader::new(Duration::from_secs(10), UploadMethod::Put).unwrap();

        let receipt = uploader
            .upload(&format!("{base}/upload"), vec![1, 2, 3])
            .await
            .unwrap();
        assert_eq!(receipt.storage_id, "image/jpeg:3");
    }

    #[tokio::test]
    async fn rejected_upload_is_reported() {
        let base = serve(Router::new().route(
            "/upload",
            post(|| async { (StatusCode::PAYLOAD_TOO_LARGE, "too big") }),
        ))
        .await;
        let uploader = HttpUploader::new(Duration::from_secs(10), UploadMethod::Post).unwrap();

        let err = uploader
            .upload(&format!("{base}/upload"), vec![0; 10])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("413"), "got: {err}");
    }
}
