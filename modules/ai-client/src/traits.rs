use async_trait::async_trait;

use crate::error::AiError;

// =============================================================================
// Generation Request
// =============================================================================

/// One prompt for the text-generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub instructions: String,
    /// Let the model ground its answer with a web search.
    pub web_search: bool,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            instructions: instructions.into(),
            web_search: false,
        }
    }

    pub fn with_web_search(mut self) -> Self {
        self.web_search = true;
        self
    }
}

// =============================================================================
// TextGenerator Trait
// =============================================================================

/// Prompt in, free-form text out. Callers must not assume the text is
/// well-formed in any way.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String, AiError>;
}
