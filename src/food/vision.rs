use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use super::labels::Label;
use crate::error::NetworkError;

/// Source of weighted labels for an image.
#[async_trait]
pub trait LabelDetector: Send + Sync {
    async fn detect_labels(&self, image: &[u8], max_results: u32) -> Result<Vec<Label>, NetworkError>;
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateResult {
    #[serde(default)]
    label_annotations: Vec<Label>,
}

/// Google Cloud Vision `images:annotate` client, label detection only.
#[derive(Clone)]
pub struct GoogleVisionClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl GoogleVisionClient {
    pub fn new(client: Client, api_key: String, endpoint: String) -> Self {
        Self {
            client,
            api_key,
            endpoint,
        }
    }
}

pub(crate) fn annotate_request(image: &[u8], max_results: u32) -> serde_json::Value {
    json!({
        "requests": [{
            "image": { "content": STANDARD.encode(image) },
            "features": [{ "type": "LABEL_DETECTION", "maxResults": max_results }]
        }]
    })
}

pub(crate) fn parse_annotate_response(body: &str) -> Result<Vec<Label>, NetworkError> {
    let parsed: AnnotateResponse =
        serde_json::from_str(body).map_err(|e| NetworkError::Malformed(e.to_string()))?;
    Ok(parsed
        .responses
        .into_iter()
        .next()
        .map(|r| r.label_annotations)
        .unwrap_or_default())
}

#[async_trait]
impl LabelDetector for GoogleVisionClient {
    #[instrument(skip(self, image), fields(image_bytes = image.len()))]
    async fn detect_labels(&self, image: &[u8], max_results: u32) -> Result<Vec<Label>, NetworkError> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&annotate_request(image, max_results))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let labels = parse_annotate_response(&body)?;
        debug!(count = labels.len(), "labels detected");
        Ok(labels)
    }
}
