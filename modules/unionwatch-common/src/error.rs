use ai_client::AiError;
use thiserror::Error;

/// Failure of one pipeline operation. Nothing partial is ever returned
/// alongside one of these.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("malformed model output: {snippet}")]
    Recovery { snippet: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl PipelineError {
    /// Configuration errors abort a whole batch; every other kind only
    /// drops the item it happened on.
    pub fn is_fatal_for_batch(&self) -> bool {
        matches!(self, PipelineError::Configuration(_))
    }
}

impl From<AiError> for PipelineError {
    fn from(e: AiError) -> Self {
        match e {
            AiError::Config(msg) => PipelineError::Configuration(msg),
            other => PipelineError::Transport(other.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store document is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Store rejected the write: {0}")]
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_ai_error_maps_to_configuration() {
        let err: PipelineError = AiError::Config("no key".to_string()).into();
        assert!(matches!(err, PipelineError::Configuration(_)));
        assert!(err.is_fatal_for_batch());
    }

    #[test]
    fn other_ai_errors_map_to_transport() {
        for e in [
            AiError::Network("timeout".to_string()),
            AiError::Api("429".to_string()),
            AiError::Parse("eof".to_string()),
        ] {
            let err: PipelineError = e.into();
            assert!(matches!(err, PipelineError::Transport(_)));
            assert!(!err.is_fatal_for_batch());
        }
    }

    #[test]
    fn recovery_message_names_the_kind() {
        let err = PipelineError::Recovery {
            snippet: "{oops".to_string(),
        };
        assert_eq!(err.to_string(), "malformed model output: {oops");
    }
}
