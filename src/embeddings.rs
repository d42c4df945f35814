use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    input: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Generate an embedding vector for the given text via an OpenAI-style
/// `/embeddings` endpoint.
pub async fn generate_embedding(
    endpoint: &str,
    api_key: &str,
    model: &str,
    text: &str,
) -> Result<Vec<f32>> {
    let url = format!("{}/embeddings", endpoint.trim_end_matches('/'));

    let request = EmbeddingRequest {
        model: model.to_string(),
        input: text.to_string(),
    };

    let client = reqwest::Client::new();
    let response = client
        .post(&url)
        .bearer_auth(api_key)
        .json(&request)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(anyhow!("Embedding API error ({}): {}", status, body));
    }

    let embedding_response: EmbeddingResponse = response.json().await?;

    embedding_response
        .data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .ok_or_else(|| anyhow!("Embedding response contained no vectors"))
}
