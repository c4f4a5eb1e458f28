//! Pull a JSON payload out of a model reply.
//!
//! Replies arrive wrapped in prose, markdown fences, or both. Recovery trims
//! the fences, then windows the text from the first `{`/`[` to the last
//! `}`/`]` and parses that strictly. A delimiter inside a string literal can
//! still produce the wrong window; that case fails loudly instead of being
//! patched up.

use ai_client::truncate_to_char_boundary;
use serde_json::Value;
use tracing::warn;
use unionwatch_common::PipelineError;

/// Diagnostic snippets carried in errors are capped at this many bytes.
const SNIPPET_MAX_BYTES: usize = 2_000;

pub fn recover(text: &str) -> Result<Value, PipelineError> {
    let stripped = strip_fences(text);

    let Some(window) = payload_window(&stripped) else {
        warn!(
            len = stripped.len(),
            "Model output contains no JSON delimiters"
        );
        return Err(recovery_error(&stripped));
    };

    serde_json::from_str(window).map_err(|e| {
        warn!(error = %e, snippet = snippet(window), "Failed to parse model output");
        recovery_error(window)
    })
}

/// Remove markdown code fences: a leading ```` ```json ```` or ```` ``` ````,
/// a trailing ```` ``` ````, then any fence left anywhere in the text.
pub fn strip_fences(text: &str) -> String {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest.trim_start();
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest.trim_end();
    }
    s.replace("```", "")
}

/// Slice from the first opening delimiter to the last closing one.
pub fn payload_window(text: &str) -> Option<&str> {
    let start = match (text.find('{'), text.find('[')) {
        (Some(curly), Some(square)) => curly.min(square),
        (Some(curly), None) => curly,
        (None, Some(square)) => square,
        (None, None) => return None,
    };

    let rest = &text[start..];
    let end = match (rest.rfind('}'), rest.rfind(']')) {
        (Some(curly), Some(square)) => curly.max(square),
        (Some(curly), None) => curly,
        (None, Some(square)) => square,
        (None, None) => return Some(rest),
    };

    Some(&rest[..=end])
}

fn snippet(s: &str) -> &str {
    truncate_to_char_boundary(s, SNIPPET_MAX_BYTES)
}

fn recovery_error(attempted: &str) -> PipelineError {
    PipelineError::Recovery {
        snippet: snippet(attempted).to_string(),
    }
}
