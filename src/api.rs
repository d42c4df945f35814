use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// A retrieved passage. Valid only for the turn that produced it; each
/// assistant response replaces the previous source set wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: i64,
    pub content: String,
    #[serde(default)]
    pub metadata: SourceMetadata,
    pub similarity: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

/// Error body returned by the glue server on any failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

pub struct ChatClient {
    endpoint: String,
    client: reqwest::Client,
}

impl ChatClient {
    pub fn with_config(endpoint: String) -> Self {
        ChatClient {
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    /// Send one question to the chat endpoint. Any non-2xx status is a
    /// failure regardless of body shape.
    pub async fn send(&self, message: &str) -> Result<ChatResponse> {
        let request = ChatRequest {
            message: message.to_string(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| match e.details {
                    Some(d) => format!("{}: {}", e.error, d),
                    None => e.error,
                })
                .unwrap_or(body);
            return Err(anyhow!("Chat API error ({}): {}", status, detail));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_deserializes() {
        let json = r#"{
            "answer": "Vitamin D helps. [1]",
            "sources": [
                {
                    "id": 5,
                    "content": "Fat-soluble vitamins A, D, E, and K are stored in fatty tissues.",
                    "metadata": { "page": 45, "origin": "micronutrients-guide.pdf" },
                    "similarity": 0.87
                }
            ]
        }"#;

        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.answer, "Vitamin D helps. [1]");
        assert_eq!(response.sources.len(), 1);
        assert_eq!(response.sources[0].id, 5);
        assert_eq!(response.sources[0].metadata.page, Some(45));
        assert_eq!(
            response.sources[0].metadata.origin.as_deref(),
            Some("micronutrients-guide.pdf")
        );
    }

    #[test]
    fn test_missing_sources_defaults_to_empty() {
        let response: ChatResponse = serde_json::from_str(r#"{"answer": "hi"}"#).unwrap();
        assert!(response.sources.is_empty());
    }

    #[test]
    fn test_missing_metadata_fields() {
        let json = r#"{"id": 1, "content": "x", "metadata": {}, "similarity": 0.5}"#;
        let source: Source = serde_json::from_str(json).unwrap();
        assert_eq!(source.metadata.page, None);
        assert_eq!(source.metadata.origin, None);
    }

    #[test]
    fn test_error_body_without_details() {
        let body: ErrorBody = serde_json::from_str(r#"{"error": "Internal server error"}"#).unwrap();
        assert_eq!(body.error, "Internal server error");
        assert!(body.details.is_none());
    }
}
