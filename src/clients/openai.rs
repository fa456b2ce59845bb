use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use crate::clients::traits::{CompletionRequest, TextGenerator};
use crate::config::ModelConfig;
use crate::error::{GenerationError, Result};

/// Client for OpenAI-compatible `/chat/completions` endpoints
#[derive(Clone, Debug)]
pub struct ChatCompletionsClient {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    max_tokens: u32,
    client: Client,
}

impl ChatCompletionsClient {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| GenerationError::Config {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            endpoint: config.completions_url(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn body(&self, request: &CompletionRequest) -> Value {
        json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": request.system},
                {"role": "user", "content": request.user}
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature
        })
    }
}

/// Pull the first choice's message text out of a completions envelope
pub fn completion_text(envelope: &Value) -> Option<&str> {
    envelope["choices"][0]["message"]["content"].as_str()
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let mut builder = self.client.post(&self.endpoint).json(&self.body(request));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let res = builder.send().await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(GenerationError::UpstreamCall {
                message: format!("model endpoint returned {}: {}", status, text),
            });
        }

        let envelope: Value = res.json().await?;
        let content = completion_text(&envelope)
            .ok_or_else(|| GenerationError::UpstreamCall {
                message: "response has no choices[0].message.content".to_string(),
            })?
            .trim()
            .to_string();

        debug!(model = %self.model, chars = content.len(), "received completion");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_carries_system_and_user_messages() {
        let client = ChatCompletionsClient::new(&ModelConfig::default()).unwrap();
        let body = client.body(&CompletionRequest {
            system: "sys".into(),
            user: "usr".into(),
        });
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "sys");
        assert_eq!(body["messages"][1]["content"], "usr");
    }

    #[test]
    fn completion_text_reads_first_choice() {
        let envelope = json!({"choices": [{"message": {"role": "assistant", "content": "{}"}}]});
        assert_eq!(completion_text(&envelope), Some("{}"));
        assert_eq!(completion_text(&json!({"error": "nope"})), None);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ModelConfig {
            model: String::new(),
            ..ModelConfig::default()
        };
        assert!(matches!(
            ChatCompletionsClient::new(&config),
            Err(GenerationError::Config { .. })
        ));
    }
}
