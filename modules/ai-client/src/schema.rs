use schemars::{schema_for, JsonSchema};
use serde_json::Value;

/// Render a type's JSON schema in a compact, self-contained form suitable for
/// pasting into model instructions.
///
/// Automatically implemented for any type that implements `JsonSchema`.
pub trait PromptSchema: JsonSchema {
    fn prompt_schema() -> Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        inline_refs(&mut value);

        if let Value::Object(map) = &mut value {
            map.remove("definitions");
            map.remove("$schema");
            map.remove("title");
        }

        value
    }

    fn prompt_schema_string() -> String {
        serde_json::to_string_pretty(&Self::prompt_schema()).unwrap_or_default()
    }
}

impl<T: JsonSchema> PromptSchema for T {}

fn inline_refs(value: &mut Value) {
    let definitions = match value {
        Value::Object(map) => map.get("definitions").cloned(),
        _ => None,
    };

    if let Some(defs) = definitions {
        inline_refs_recursive(value, &defs);
    }
}

fn inline_refs_recursive(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(ref_path)) = map.get("$ref").cloned() {
                let type_name = ref_path.trim_start_matches("#/definitions/");
                if let Some(def) = definitions.get(type_name) {
                    *value = def.clone();
                    inline_refs_recursive(value, definitions);
                    return;
                }
            }

            if let Some(Value::Array(all_of)) = map.get("allOf").cloned() {
                if let [only] = all_of.as_slice() {
                    *value = only.clone();
                    inline_refs_recursive(value, definitions);
                    return;
                }
            }

            for (_, v) in map.iter_mut() {
                inline_refs_recursive(v, definitions);
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                inline_refs_recursive(item, definitions);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    #[derive(JsonSchema)]
    struct Member {
        name: String,
        role: String,
    }

    #[allow(dead_code)]
    #[derive(JsonSchema)]
    struct Committee {
        members: Vec<Member>,
        chair: Member,
    }

    #[test]
    fn test_schema_has_no_definitions() {
        let schema = Committee::prompt_schema();
        let obj = schema.as_object().unwrap();
        assert!(!obj.contains_key("definitions"));
        assert!(!obj.contains_key("$schema"));
    }

    #[test]
    fn test_nested_struct_inlined() {
        let schema = Committee::prompt_schema();
        let chair = &schema["properties"]["chair"];
        assert!(chair.get("$ref").is_none());
        assert_eq!(chair["type"], "object");
        assert!(chair["properties"].get("role").is_some());
    }

    #[test]
    fn test_schema_string_is_json() {
        let text = Committee::prompt_schema_string();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert!(parsed.is_object());
    }
}
