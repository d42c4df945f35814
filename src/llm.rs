use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

macro_rules! debug_println {
    ($($arg:tt)*) => {
        if std::env::var("NUTRICHAT_DEBUG").is_ok() {
            eprintln!($($arg)*);
        }
    };
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: WireMessage,
}

/// Client for an OpenAI-style `/chat/completions` endpoint.
pub struct CompletionClient {
    endpoint: String,
    model: String,
    api_key: String,
    max_tokens: u32,
    temperature: f32,
    client: reqwest::Client,
}

impl CompletionClient {
    pub fn with_config(
        endpoint: String,
        model: String,
        api_key: String,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        CompletionClient {
            endpoint,
            model,
            api_key,
            max_tokens,
            temperature,
            client: reqwest::Client::new(),
        }
    }

    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));

        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![WireMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug_println!("[llm] POST {} model={}", url, self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Completion API error ({}): {}", status, body));
        }

        let completion: CompletionResponse = response.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow!("Completion response contained no choices"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_wire_shape() {
        let json = r#"{
            "id": "chatcmpl-1",
            "choices": [
                {
                    "index": 0,
                    "message": { "role": "assistant", "content": "Vitamins A, D, E, and K. [1]" },
                    "finish_reason": "stop"
                }
            ]
        }"#;
        let parsed: CompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.content, "Vitamins A, D, E, and K. [1]");
    }

    #[test]
    fn test_request_wire_shape() {
        let request = CompletionRequest {
            model: "gpt-4".to_string(),
            messages: vec![WireMessage {
                role: "user".to_string(),
                content: "hello".to_string(),
            }],
            max_tokens: 1000,
            temperature: 0.7,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 1000);
    }
}
