use super::{
    error_from_response, http_client, Collaborator, CollaboratorConfig, CollaboratorError,
    CollaboratorInfo, ConfigError, SYSTEM_PROMPT,
};
use crate::operation::GenerationOptions;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

/// Chat-completions binding (`POST {base}/chat/completions`).
pub struct OpenAiCollaborator {
    client: Client,
    config: CollaboratorConfig,
    api_key: String,
}

impl OpenAiCollaborator {
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
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": prompt}
            ],
            "temperature": options.temperature(),
            "max_tokens": options.max_tokens(),
            "response_format": {"type": "json_object"}
        })
    }
}

pub(crate) fn extract_output_text(data: &Value) -> Option<String> {
    data.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(str::to_string)
}

#[async_trait]
impl Collaborator for OpenAiCollaborator {
    async fn execute(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, CollaboratorError> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt, options))
            .send()
            .await
            .map_err(|e| CollaboratorError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response("OpenAI", response).await);
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| CollaboratorError::InvalidResponse(e.to_string()))?;

        extract_output_text(&data).ok_or_else(|| {
            CollaboratorError::InvalidResponse("missing choices[0].message.content".to_string())
        })
    }

    fn info(&self) -> CollaboratorInfo {
        CollaboratorInfo {
            provider: self.config.provider.as_str().to_string(),
            model: self.config.model.clone(),
        }
    }
}
