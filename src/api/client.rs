use futures::Stream;
use futures::TryStreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use thiserror::Error;
use url::Url;

use super::models::{ClientConfig, ConvertResponse};
use crate::domain::{AppError, ConversionRequest, ConversionResult};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Clone)]
pub struct ConversionClient {
    config: ClientConfig,
    http: Client,
}

impl ConversionClient {
    pub fn new(config: ClientConfig) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder.build().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default HTTP client");
            Client::new()
        });

        Self { config, http }
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.config.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn form(request: &ConversionRequest) -> Form {
        let mut form = Form::new()
            .text("youtube_url", request.source_url.clone())
            .text("format", request.output_format.token());

        if let Some(credential) = &request.credential_file {
            let part = Part::bytes(credential.bytes.clone()).file_name(credential.file_name.clone());
            form = form.part("cookies_file", part);
        }

        form
    }

    /// Submit a conversion and wait for the service's verdict.
    ///
    /// Never fails: transport problems and unexpected bodies are logged and
    /// reported as [`AppError::Transport`] so raw errors stay out of the UI.
    pub async fn submit(&self, request: &ConversionRequest) -> ConversionResult {
        tracing::info!(
            source_url = %request.source_url,
            format = request.output_format.token(),
            with_cookies = request.credential_file.is_some(),
            "submitting conversion"
        );

        match self.post_convert(request).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, "conversion request did not complete");
                ConversionResult::Failure(AppError::Transport)
            }
        }
    }

    async fn post_convert(&self, request: &ConversionRequest) -> Result<ConversionResult> {
        let response = self
            .http
            .post(self.endpoint(&["convert"]))
            .multipart(Self::form(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let parsed: ConvertResponse = serde_json::from_str(&body).map_err(|e| {
            ApiError::InvalidResponse(format!("HTTP {}: JSON decode error: {}", status, e))
        })?;

        parsed.into_result().ok_or_else(|| {
            ApiError::InvalidResponse("success response without conversion_id".to_string())
        })
    }

    /// Address of the converted file for `conversion_id`.
    pub fn download_reference(&self, conversion_id: &str) -> Url {
        self.endpoint(&["download", conversion_id])
    }

    /// Fetch a converted file as a byte stream.
    /// Returns (total_size, stream)
    pub async fn download_file_stream(
        &self,
        download_url: &Url,
    ) -> Result<(Option<u64>, impl Stream<Item = Result<bytes::Bytes>>)> {
        let response = self
            .http
            .get(download_url.clone())
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ApiError::ApiError(format!("Download request failed: {}", e)))?;

        let total_size = response.content_length();
        let stream = response.bytes_stream().map_err(ApiError::RequestError);

        Ok((total_size, stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CredentialFile, OutputFormat};
    use futures::StreamExt;
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(server: &mockito::ServerGuard) -> ConversionClient {
        ConversionClient::new(ClientConfig {
            base_url: Url::parse(&server.url()).unwrap(),
            request_timeout: None,
        })
    }

    fn request(url: &str, format: OutputFormat) -> ConversionRequest {
        ConversionRequest {
            source_url: url.to_string(),
            output_format: format,
            credential_file: None,
        }
    }

    #[tokio::test]
    async fn test_submit_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/convert")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="youtube_url"\s+youtu\.be/dQw4w9WgXcQ"#.to_string()),
                Matcher::Regex(r#"name="format"\s+mp3"#.to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "status": "success",
                    "message": "Conversion successful!",
                    "conversion_id": "abc123",
                    "title": "Song"
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let result = client
            .submit(&request("youtu.be/dQw4w9WgXcQ", OutputFormat::Audio))
            .await;

        mock.assert_async().await;
        assert_eq!(
            result,
            ConversionResult::Success {
                conversion_id: "abc123".to_string(),
                title: "Song".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_submit_sends_cookies_file() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/convert")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="format"\s+mp4"#.to_string()),
                Matcher::Regex(r#"name="cookies_file"; filename="cookies.txt""#.to_string()),
                Matcher::Regex("# Netscape HTTP Cookie File".to_string()),
            ]))
            .with_body(json!({ "status": "success", "conversion_id": "x", "title": "T" }).to_string())
            .expect(1)
            .create_async()
            .await;

        let mut req = request("https://youtu.be/dQw4w9WgXcQ", OutputFormat::Video);
        req.credential_file = Some(CredentialFile {
            file_name: "cookies.txt".to_string(),
            bytes: b"# Netscape HTTP Cookie File\n".to_vec(),
        });

        let result = client_for(&server).submit(&req).await;

        mock.assert_async().await;
        assert!(matches!(result, ConversionResult::Success { .. }));
    }

    #[tokio::test]
    async fn test_submit_error_status_keeps_server_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/convert")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(json!({ "status": "error", "message": "quota exceeded" }).to_string())
            .create_async()
            .await;

        let result = client_for(&server)
            .submit(&request("youtu.be/dQw4w9WgXcQ", OutputFormat::Audio))
            .await;

        assert_eq!(
            result,
            ConversionResult::Failure(AppError::Rejected("quota exceeded".to_string()))
        );
    }

    #[tokio::test]
    async fn test_submit_unexpected_body_is_transport_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/convert")
            .with_status(502)
            .with_body("<html>Bad Gateway</html>")
            .create_async()
            .await;

        let result = client_for(&server)
            .submit(&request("youtu.be/dQw4w9WgXcQ", OutputFormat::Audio))
            .await;

        assert_eq!(result, ConversionResult::Failure(AppError::Transport));
    }

    #[tokio::test]
    async fn test_submit_unreachable_service_is_transport_failure() {
        // Nothing listens on the discard port.
        let client = ConversionClient::new(ClientConfig {
            base_url: Url::parse("http://127.0.0.1:9/").unwrap(),
            request_timeout: None,
        });

        let result = client
            .submit(&request("youtu.be/dQw4w9WgXcQ", OutputFormat::Audio))
            .await;

        assert_eq!(result, ConversionResult::Failure(AppError::Transport));
    }

    #[test]
    fn test_download_reference() {
        let client = ConversionClient::new(ClientConfig::default());
        assert_eq!(
            client.download_reference("abc123").as_str(),
            "http://127.0.0.1:5000/download/abc123"
        );

        let nested = ConversionClient::new(ClientConfig {
            base_url: Url::parse("https://convert.example/wizard").unwrap(),
            request_timeout: None,
        });
        assert_eq!(
            nested.download_reference("a b").as_str(),
            "https://convert.example/wizard/download/a%20b"
        );
    }

    #[tokio::test]
    async fn test_download_file_stream() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/download/abc123")
            .with_status(200)
            .with_body("ID3 fake mp3 bytes")
            .create_async()
            .await;

        let client = client_for(&server);
        let url = client.download_reference("abc123");
        let (total, stream) = client.download_file_stream(&url).await.unwrap();
        let chunks: Vec<_> = stream.collect().await;
        let body: Vec<u8> = chunks
            .into_iter()
            .flat_map(|chunk| chunk.unwrap().to_vec())
            .collect();

        assert_eq!(total, Some(18));
        assert_eq!(body, b"ID3 fake mp3 bytes");
    }

    #[tokio::test]
    async fn test_download_missing_file_fails() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/download/gone")
            .with_status(404)
            .with_body(json!({ "status": "error", "message": "File not found or expired" }).to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        let url = client.download_reference("gone");
        assert!(matches!(
            client.download_file_stream(&url).await,
            Err(ApiError::ApiError(_))
        ));
    }
}
