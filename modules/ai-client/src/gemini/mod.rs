mod client;
pub(crate) mod types;

use async_trait::async_trait;

use crate::error::AiError;
use crate::traits::{GenerationRequest, TextGenerator};

use client::GeminiClient;
use types::GenerateRequest;

// =============================================================================
// Gemini Agent
// =============================================================================

#[derive(Clone)]
pub struct Gemini {
    api_key: Option<String>,
    pub(crate) model: String,
    base_url: Option<String>,
}

impl std::fmt::Debug for Gemini {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gemini")
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Gemini {
    /// A missing or blank key is accepted here and reported as
    /// `AiError::Config` on the first `generate` call.
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn client(&self) -> Result<GeminiClient, AiError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AiError::Config("Gemini API key not configured".to_string()))?;
        let client = GeminiClient::new(api_key);
        Ok(match self.base_url {
            Some(ref url) => client.with_base_url(url),
            None => client,
        })
    }
}

#[async_trait]
impl TextGenerator for Gemini {
    async fn generate(&self, request: GenerationRequest) -> Result<String, AiError> {
        let client = self.client()?;

        let mut wire = GenerateRequest::new(request.prompt)
            .system(request.instructions)
            .max_output_tokens(8192);
        if request.web_search {
            wire = wire.web_search();
        }

        let response = client.generate(&self.model, &wire).await?;

        response
            .text()
            .ok_or_else(|| AiError::Api("No text in Gemini response".to_string()))
    }
}
