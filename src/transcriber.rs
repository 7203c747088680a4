use anyhow::{Context, Result};
use reqwest::{multipart, StatusCode};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::TranscriptionConfig;
use crate::temp_audio::TempAudioFile;

/// Result of one call to the transcription endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptionOutcome {
    /// HTTP 200 with a `transcription` string
    Text(String),
    /// HTTP 200 without a usable `transcription` field
    Missing,
    /// Any other status
    Rejected { status: StatusCode, body: String },
}

pub struct TranscriptionClient {
    client: reqwest::Client,
    endpoint_url: String,
}

impl TranscriptionClient {
    pub fn new(config: &TranscriptionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint_url: config.endpoint_url.clone(),
        })
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// Upload the file as the multipart field `file`.
    pub async fn transcribe(&self, audio: &TempAudioFile) -> Result<TranscriptionOutcome> {
        let bytes = tokio::fs::read(audio.path())
            .await
            .with_context(|| format!("Failed to read temp audio: {}", audio.path().display()))?;

        let file_part = multipart::Part::bytes(bytes)
            .file_name(audio.file_name())
            .mime_str(mime_for_extension(audio.extension()))
            .context("Invalid MIME type")?;
        let form = multipart::Form::new().part("file", file_part);

        debug!("Uploading {} to {}", audio.file_name(), self.endpoint_url);

        let response = self
            .client
            .post(&self.endpoint_url)
            .multipart(form)
            .send()
            .await
            .context("Failed to send request to transcription service")?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Ok(TranscriptionOutcome::Rejected { status, body });
        }

        let body: Value = response
            .json()
            .await
            .context("Failed to parse transcription response")?;

        let outcome = match body.get("transcription").and_then(Value::as_str) {
            Some(text) => TranscriptionOutcome::Text(text.to_string()),
            None => TranscriptionOutcome::Missing,
        };

        if let TranscriptionOutcome::Text(text) = &outcome {
            info!("Transcription completed: {} chars", text.len());
        }
        Ok(outcome)
    }
}

fn mime_for_extension(ext: &str) -> &'static str {
    match ext {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" | "oga" | "opus" => "audio/ogg",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{header_regex, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> TranscriptionClient {
        TranscriptionClient::new(&TranscriptionConfig {
            endpoint_url: format!("{}/transcribe", server.uri()),
            timeout_secs: 5,
            ..Default::default()
        })
        .unwrap()
    }

    async fn sample(dir: &tempfile::TempDir) -> TempAudioFile {
        TempAudioFile::create(dir.path(), "ogg", b"OggS fake audio")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_success_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transcribe"))
            .and(header_regex("content-type", "^multipart/form-data"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "transcription": "hello" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        let audio = sample(&dir).await;
        let outcome = client_for(&server).transcribe(&audio).await.unwrap();
        assert_eq!(outcome, TranscriptionOutcome::Text("hello".to_string()));
    }

    #[tokio::test]
    async fn test_upload_carries_file_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        let audio = sample(&dir).await;
        client_for(&server).transcribe(&audio).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("name=\"file\""));
        assert!(body.contains(&audio.file_name()));
        assert!(body.contains("audio/ogg"));
        assert!(body.contains("OggS fake audio"));
    }

    #[tokio::test]
    async fn test_missing_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "text": "hi" })),
            )
            .mount(&server)
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        let audio = sample(&dir).await;
        let outcome = client_for(&server).transcribe(&audio).await.unwrap();
        assert_eq!(outcome, TranscriptionOutcome::Missing);
    }

    #[tokio::test]
    async fn test_non_string_field_is_missing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "transcription": null })),
            )
            .mount(&server)
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        let audio = sample(&dir).await;
        let outcome = client_for(&server).transcribe(&audio).await.unwrap();
        assert_eq!(outcome, TranscriptionOutcome::Missing);
    }

    #[tokio::test]
    async fn test_server_error_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({ "transcription": "ignored" })),
            )
            .mount(&server)
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        let audio = sample(&dir).await;
        let outcome = client_for(&server).transcribe(&audio).await.unwrap();
        match outcome {
            TranscriptionOutcome::Rejected { status, body } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert!(body.contains("ignored"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_other_success_codes_are_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        let audio = sample(&dir).await;
        let outcome = client_for(&server).transcribe(&audio).await.unwrap();
        assert!(matches!(outcome, TranscriptionOutcome::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_invalid_json_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        let audio = sample(&dir).await;
        assert!(client_for(&server).transcribe(&audio).await.is_err());
    }

    #[tokio::test]
    async fn test_timeout_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "transcription": "late" }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = TranscriptionClient::new(&TranscriptionConfig {
            endpoint_url: server.uri(),
            timeout_secs: 1,
            ..Default::default()
        })
        .unwrap();

        let dir = tempfile::TempDir::new().unwrap();
        let audio = sample(&dir).await;
        assert!(client.transcribe(&audio).await.is_err());
    }

    #[test]
    fn test_mime_for_extension() {
        assert_eq!(mime_for_extension("mp3"), "audio/mpeg");
        assert_eq!(mime_for_extension("oga"), "audio/ogg");
        assert_eq!(mime_for_extension("flac"), "application/octet-stream");
    }
}
