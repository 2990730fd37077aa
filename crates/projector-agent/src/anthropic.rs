use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::provider::{ChatRequest, ChatResponse, LlmProvider, ProviderError, Role};

const API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.unwrap_or_else(|| "https://api.anthropic.com".to_string()),
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn send(&self, req: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let body = build_request_body(req);
        let url = format!("{}/v1/messages", self.base_url);

        debug!(model = %req.model, "sending request to Anthropic");

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status == 429 {
            let retry = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|s| s * 1000)
                .unwrap_or(5000);
            return Err(ProviderError::RateLimited {
                retry_after_ms: retry,
            });
        }

        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "Anthropic API error");
            return Err(ProviderError::Api {
                status,
                message: text,
            });
        }

        let api_resp: ApiResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(parse_response(api_resp))
    }
}

fn build_request_body(req: &ChatRequest) -> serde_json::Value {
    let messages: Vec<serde_json::Value> = req
        .messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| {
            if m.images.is_empty() {
                serde_json::json!({
                    "role": m.role,
                    "content": m.content,
                })
            } else {
                let mut blocks = vec![serde_json::json!({
                    "type": "text",
                    "text": m.content,
                })];
                for image in &m.images {
                    blocks.push(serde_json::json!({
                        "type": "image",
                        "source": {
                            "type": "base64",
                            "media_type": "image/png",
                            "data": image,
                        },
                    }));
                }
                serde_json::json!({
                    "role": m.role,
                    "content": blocks,
                })
            }
        })
        .collect();

    let mut body = serde_json::json!({
        "model": req.model,
        "messages": messages,
        "max_tokens": req.max_tokens,
    });
    if !req.system.is_empty() {
        body["system"] = serde_json::json!(req.system);
    }
    body
}

fn parse_response(resp: ApiResponse) -> ChatResponse {
    // Concatenate all text blocks; tool/thinking blocks are not requested.
    let content = resp
        .content
        .iter()
        .filter_map(|b| b.text.as_deref())
        .collect::<Vec<_>>()
        .join("");

    ChatResponse {
        content,
        model: resp.model,
        tokens_in: resp.usage.input_tokens,
        tokens_out: resp.usage.output_tokens,
    }
}

// Anthropic API response types (private — deserialization only)

#[derive(Deserialize)]
struct ApiResponse {
    model: String,
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Message;

    #[test]
    fn system_goes_in_top_level_field() {
        let req = ChatRequest {
            model: "claude-3-5-sonnet-20241022".to_string(),
            system: "answer tersely".to_string(),
            messages: vec![Message::user("hi")],
            max_tokens: 512,
        };
        let body = build_request_body(&req);
        assert_eq!(body["system"], "answer tersely");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn image_turns_become_base64_blocks() {
        let mut msg = Message::user("slide");
        msg.images.push("UE5H".to_string());
        let req = ChatRequest {
            model: "claude-3-5-sonnet-20241022".to_string(),
            system: String::new(),
            messages: vec![msg],
            max_tokens: 512,
        };
        let body = build_request_body(&req);
        let blocks = body["messages"][0]["content"].as_array().unwrap();
        assert_eq!(blocks[1]["type"], "image");
        assert_eq!(blocks[1]["source"]["data"], "UE5H");
        assert!(body.get("system").is_none());
    }
}
