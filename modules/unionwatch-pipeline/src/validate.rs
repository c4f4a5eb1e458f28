//! Shape checks on recovered model output.
//!
//! Only presence and container shapes are checked here. Optional scalar
//! fields are taken as extracted: `null` reads as empty, numbers as text.

use serde_json::{Map, Value};
use tracing::warn;
use unionwatch_common::{
    ActionRecord, AgreementRecord, ExtractionKind, ExtractionPayload, ExtractionResult,
    PipelineError, UnionIdentity, UnionRecord,
};

/// A full union record from research. Requires non-empty `name` and `id`,
/// which are trimmed the same way extracted identities are.
pub fn validate_union_record(value: Value) -> Result<UnionRecord, PipelineError> {
    let Value::Object(map) = &value else {
        return Err(incomplete("expected a JSON object"));
    };
    let Some(name) = non_empty_str(map, "name").map(str::to_string) else {
        return Err(incomplete("missing name"));
    };
    let Some(id) = non_empty_str(map, "id").map(str::to_string) else {
        return Err(incomplete("missing id"));
    };

    let mut record: UnionRecord =
        serde_json::from_value(value).map_err(|e| incomplete(&e.to_string()))?;
    record.name = name;
    record.id = id;
    Ok(record)
}

/// One action-or-agreement extraction:
/// `{"union": {"name", "id"}, "kind": "action"|"agreement", "data": {...}}`.
pub fn validate_extraction(value: &Value) -> Result<ExtractionResult, PipelineError> {
    let Value::Object(map) = value else {
        return Err(unidentified("expected a JSON object"));
    };

    let union = match map.get("union") {
        Some(Value::Object(union)) => union,
        _ => return Err(unidentified("missing union object")),
    };
    let (Some(name), Some(id)) = (non_empty_str(union, "name"), non_empty_str(union, "id")) else {
        return Err(unidentified("union has no name or id"));
    };

    let data = match map.get("data") {
        Some(data @ Value::Object(_)) => data.clone(),
        _ => return Err(unidentified("missing data object")),
    };

    let kind = match map.get("kind") {
        Some(Value::String(raw)) => ExtractionKind::parse(raw).ok_or_else(|| {
            PipelineError::Validation(format!("unknown extraction kind {raw:?}"))
        })?,
        _ => {
            return Err(PipelineError::Validation(
                "missing extraction kind".to_string(),
            ))
        }
    };

    let payload = match kind {
        ExtractionKind::Action => serde_json::from_value::<ActionRecord>(data)
            .map(ExtractionPayload::Action),
        ExtractionKind::Agreement => serde_json::from_value::<AgreementRecord>(data)
            .map(ExtractionPayload::Agreement),
    }
    .map_err(|e| PipelineError::Validation(format!("malformed {kind} data: {e}")))?;

    Ok(ExtractionResult {
        union: UnionIdentity {
            name: name.to_string(),
            id: id.to_string(),
        },
        payload,
    })
}

/// Batch replies must be an array. Anything else yields zero results rather
/// than an error. Each element is validated on its own; failures are logged
/// and dropped.
pub fn validate_batch(value: &Value) -> Vec<ExtractionResult> {
    let Value::Array(elements) = value else {
        warn!("Batch reply is not an array, treating as empty");
        return Vec::new();
    };

    elements
        .iter()
        .enumerate()
        .filter_map(|(index, element)| match validate_extraction(element) {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(index, error = %e, "Dropped invalid batch element");
                None
            }
        })
        .collect()
}

fn non_empty_str<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn incomplete(detail: &str) -> PipelineError {
    PipelineError::Validation(format!("incomplete structure: {detail}"))
}

fn unidentified(detail: &str) -> PipelineError {
    PipelineError::Validation(format!("unidentified source: {detail}"))
}
