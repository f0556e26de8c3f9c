use reqwest::Client;
use serde_json::{json, Value};
use std::future::Future;
use tracing::debug;

use crate::config::StudioConfig;
use crate::error::{Result, StudioError};
use crate::generator::ImageGenerator;
use crate::types::ImageRef;

fn normalize(endpoint: &str) -> String {
    endpoint.trim_end_matches('/').to_string()
}

/// Async client for Google's Imagen models via the Generative Language
/// `predict` endpoint.
///
/// # Example
/// ```no_run
/// use imagen_studio::{ImagenClient, StudioConfig};
///
/// # async fn example() -> imagen_studio::Result<()> {
/// let config = StudioConfig::builder().with_api_key("your-key").build();
/// let client = ImagenClient::new(&config)?;
/// let image = client.generate_image("a red fox in the snow").await?;
/// println!("{} bytes", image.decode()?.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ImagenClient {
    http: Client,
    endpoint: String,
    model: String,
    api_key: String,
    output_mime_type: String,
    timeout: Option<std::time::Duration>,
}

impl ImagenClient {
    /// Create a client from configuration. Fails when no API key is set.
    pub fn new(config: &StudioConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        Ok(Self {
            http: Client::new(),
            endpoint: normalize(&config.endpoint),
            model: config.model.clone(),
            api_key,
            output_mime_type: config.output_mime_type.clone(),
            timeout: config.timeout,
        })
    }

    /// Use a custom `reqwest::Client` (for connection pooling, proxies, TLS).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Returns the configured endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the configured model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full URL of the predict call for the configured model.
    pub fn predict_url(&self) -> String {
        format!("{}/v1beta/models/{}:predict", self.endpoint, self.model)
    }

    /// Request one image for `prompt`.
    pub async fn generate_image(&self, prompt: &str) -> Result<ImageRef> {
        let url = self.predict_url();
        let body = predict_body(prompt, &self.output_mime_type);
        debug!(model = %self.model, prompt_len = prompt.len(), "sending Imagen predict request");

        let mut request = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let resp = request.send().await.map_err(|e| StudioError::Network {
            context: format!("Cannot reach image API at {}", self.endpoint),
            source: e,
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "Imagen returned an error status");
            return Err(StudioError::Api {
                status: status.as_u16(),
                message: api_error_message(status.as_u16(), &body_text),
            });
        }

        let json: Value = resp.json().await.map_err(|e| StudioError::Network {
            context: "Failed to read Imagen predict response".into(),
            source: e,
        })?;

        parse_predict_response(&json, &self.output_mime_type)
    }
}

impl ImageGenerator for ImagenClient {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<ImageRef>> + Send {
        self.generate_image(prompt)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// JSON body of a predict request for a single image.
pub fn predict_body(prompt: &str, mime_type: &str) -> Value {
    json!({
        "instances": [{ "prompt": prompt }],
        "parameters": {
            "sampleCount": 1,
            "outputMimeType": mime_type,
        },
    })
}

/// Extract the first generated image from a predict response.
pub fn parse_predict_response(json: &Value, default_mime: &str) -> Result<ImageRef> {
    let predictions = match json.get("predictions") {
        Some(Value::Array(p)) => p,
        Some(_) => {
            return Err(StudioError::InvalidResponse(
                "Imagen response field 'predictions' is not an array".into(),
            ))
        }
        None => return Err(StudioError::NoImage),
    };
    let prediction = predictions.first().ok_or(StudioError::NoImage)?;

    let bytes = prediction
        .get("bytesBase64Encoded")
        .and_then(|v| v.as_str())
        .unwrap_or("");

    if bytes.is_empty() {
        if let Some(reason) = prediction.get("raiFilteredReason").and_then(|v| v.as_str()) {
            return Err(StudioError::Filtered(reason.to_string()));
        }
        return Err(StudioError::NoImage);
    }

    let mime = prediction
        .get("mimeType")
        .and_then(|v| v.as_str())
        .filter(|m| !m.is_empty())
        .unwrap_or(default_mime);

    Ok(ImageRef::from_base64(mime, bytes))
}

/// Human-readable message for a failed call. Prefers the `error.message`
/// field of Google's error envelope, then the raw body.
pub fn api_error_message(status: u16, body: &str) -> String {
    let from_envelope = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        v.pointer("/error/message")
            .and_then(|m| m.as_str())
            .map(|m| m.trim().to_string())
    });

    match from_envelope {
        Some(message) if !message.is_empty() => message,
        _ if !body.trim().is_empty() => format!("Image API returned HTTP {}: {}", status, body.trim()),
        _ => format!("Image API returned HTTP {}", status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ImagenClient {
        let config = StudioConfig::builder()
            .with_api_key("test-key")
            .with_endpoint("https://example.test///")
            .build();
        ImagenClient::new(&config).unwrap()
    }

    #[test]
    fn test_normalize_endpoint() {
        assert_eq!(normalize("http://localhost:9000/"), "http://localhost:9000");
        assert_eq!(normalize("http://localhost:9000"), "http://localhost:9000");
    }

    #[test]
    fn test_client_requires_api_key() {
        let result = ImagenClient::new(&StudioConfig::default());
        assert!(matches!(result, Err(StudioError::Config(_))));
    }

    #[test]
    fn test_predict_url() {
        let client = client();
        assert_eq!(client.endpoint(), "https://example.test");
        assert_eq!(
            client.predict_url(),
            "https://example.test/v1beta/models/imagen-3.0-generate-002:predict"
        );
        assert_eq!(client.name(), "imagen-3.0-generate-002");
    }

    #[test]
    fn test_predict_body_keeps_raw_prompt() {
        let body = predict_body("  a red fox ", "image/jpeg");
        assert_eq!(body["instances"][0]["prompt"], "  a red fox ");
        assert_eq!(body["parameters"]["sampleCount"], 1);
        assert_eq!(body["parameters"]["outputMimeType"], "image/jpeg");
    }

    #[test]
    fn test_parse_predict_response() {
        let json: Value = serde_json::from_str(
            r#"{
            "predictions": [
                {"bytesBase64Encoded": "AAEC", "mimeType": "image/png"}
            ]
        }"#,
        )
        .unwrap();
        let img = parse_predict_response(&json, "image/jpeg").unwrap();
        assert_eq!(img.locator(), "data:image/png;base64,AAEC");
    }

    #[test]
    fn test_parse_predict_response_default_mime() {
        let json: Value =
            serde_json::from_str(r#"{"predictions": [{"bytesBase64Encoded": "AAEC"}]}"#).unwrap();
        let img = parse_predict_response(&json, "image/jpeg").unwrap();
        assert_eq!(img.mime_type(), Some("image/jpeg"));
    }

    #[test]
    fn test_parse_predict_response_empty() {
        let json: Value = serde_json::from_str(r#"{}"#).unwrap();
        assert!(matches!(
            parse_predict_response(&json, "image/jpeg"),
            Err(StudioError::NoImage)
        ));

        let json: Value = serde_json::from_str(r#"{"predictions": []}"#).unwrap();
        assert!(matches!(
            parse_predict_response(&json, "image/jpeg"),
            Err(StudioError::NoImage)
        ));
    }

    #[test]
    fn test_parse_predict_response_malformed() {
        let json: Value = serde_json::from_str(r#"{"predictions": "nope"}"#).unwrap();
        assert!(matches!(
            parse_predict_response(&json, "image/jpeg"),
            Err(StudioError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_parse_predict_response_filtered() {
        let json: Value = serde_json::from_str(
            r#"{"predictions": [{"raiFilteredReason": "blocked by safety filter"}]}"#,
        )
        .unwrap();
        match parse_predict_response(&json, "image/jpeg") {
            Err(StudioError::Filtered(reason)) => assert_eq!(reason, "blocked by safety filter"),
            other => panic!("expected Filtered, got {:?}", other),
        }
    }

    #[test]
    fn test_api_error_message_from_envelope() {
        let body = r#"{"error": {"code": 429, "message": "quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(api_error_message(429, body), "quota exceeded");
    }

    #[test]
    fn test_api_error_message_fallbacks() {
        assert_eq!(
            api_error_message(502, "Bad Gateway"),
            "Image API returned HTTP 502: Bad Gateway"
        );
        assert_eq!(api_error_message(500, ""), "Image API returned HTTP 500");
        assert_eq!(
            api_error_message(400, r#"{"error": {"message": ""}}"#),
            r#"Image API returned HTTP 400: {"error": {"message": ""}}"#
        );
    }

    /// Serve one canned HTTP response on a local port. Resolves to the raw
    /// request text once the response is written.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
                if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    let headers = String::from_utf8_lossy(&request[..end]).to_ascii_lowercase();
                    let length = headers
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request).into_owned()
        });

        (endpoint, server)
    }

    fn local_client(endpoint: &str) -> ImagenClient {
        let config = StudioConfig::builder()
            .with_api_key("test-key")
            .with_endpoint(endpoint)
            .build();
        ImagenClient::new(&config)
            .unwrap()
            .with_http_client(Client::builder().no_proxy().build().unwrap())
    }

    #[tokio::test]
    async fn test_generate_image_error_status() {
        let (endpoint, server) = serve_once(
            "429 Too Many Requests",
            r#"{"error": {"code": 429, "message": "quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#,
        )
        .await;

        let err = local_client(&endpoint)
            .generate_image("a red fox")
            .await
            .unwrap_err();
        match err {
            StudioError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "quota exceeded");
            }
            other => panic!("expected Api error, got {:?}", other),
        }

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1beta/models/imagen-3.0-generate-002:predict "));
        assert!(request.to_ascii_lowercase().contains("x-goog-api-key: test-key"));
        assert!(request.contains(r#""prompt":"a red fox""#));
    }

    #[tokio::test]
    async fn test_generate_image_success() {
        let (endpoint, server) = serve_once(
            "200 OK",
            r#"{"predictions": [{"bytesBase64Encoded": "AAEC", "mimeType": "image/jpeg"}]}"#,
        )
        .await;

        let image = local_client(&endpoint).generate_image("a red fox").await.unwrap();
        assert_eq!(image.locator(), "data:image/jpeg;base64,AAEC");
        server.await.unwrap();
    }
}
