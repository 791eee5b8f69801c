use super::{
    error_from_response, http_client, Collaborator, CollaboratorConfig, CollaboratorError,
    CollaboratorInfo, ConfigError, ANTHROPIC_VERSION, SYSTEM_PROMPT,
};
use crate::operation::GenerationOptions;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

/// Messages-API binding (`POST {base}/messages`).
pub struct AnthropicCollaborator {
    client: Client,
    config: CollaboratorConfig,
    api_key: String,
}

impl AnthropicCollaborator {
    pub fn new(config: CollaboratorConfig, api_key: String) -> Result<Self, ConfigError> {
        Ok(Self {
            client: http_client(&config)?,
            config,
            api_key,
        })
    }

    fn request_body(&self, prompt: &str, options: &GenerationOptions) -> Value {
        json!({
            "model": self.config.model,
            "max_tokens": options.max_tokens(),
            "temperature": options.temperature(),
            "system": SYSTEM_PROMPT,
            "messages": [{"role": "user", "content": prompt}]
        })
    }
}

/// Concatenate every `text` content block.
pub(crate) fn extract_output_text(data: &Value) -> Option<String> {
    let blocks = data.get("content")?.as_array()?;
    let text: String = blocks
        .iter()
        .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|b| b.get("text").and_then(Value::as_str))
        .collect();
    (!text.is_empty()).then_some(text)
}

#[async_trait]
impl Collaborator for AnthropicCollaborator {
    async fn execute(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, CollaboratorError> {
        let url = format!("{}/messages", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.request_body(prompt, options))
            .send()
            .await
            .map_err(|e| CollaboratorError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response("Anthropic", response).await);
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| CollaboratorError::InvalidResponse(e.to_string()))?;

        extract_output_text(&data).ok_or_else(|| {
            CollaboratorError::InvalidResponse("response carried no text content".to_string())
        })
    }

    fn info(&self) -> CollaboratorInfo {
        CollaboratorInfo {
            provider: self.config.provider.as_str().to_string(),
            model: self.config.model.clone(),
        }
    }
}
