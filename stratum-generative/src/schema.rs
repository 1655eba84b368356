//! Output-schema pre-validation and post-call response validation
//! (spec.md §4.3 steps 3 and 6).

use crate::error::GenerativeError;
use serde_json::Value;

/// Reject schemas with conflicting constraints (`minimum > maximum`,
/// etc.) before any LLM call is made. `jsonschema` itself happily
/// compiles these — they're syntactically valid, just unsatisfiable by
/// any instance — so this walks the schema looking for known-impossible
/// constraint pairs.
pub fn check_satisfiable(schema: &Value) -> Result<(), GenerativeError> {
    check_satisfiable_at(schema, "$")
}

fn check_satisfiable_at(schema: &Value, path: &str) -> Result<(), GenerativeError> {
    let Value::Object(obj) = schema else { return Ok(()) };

    check_bounds(obj, "minimum", "maximum", path)?;
    check_bounds(obj, "minLength", "maxLength", path)?;
    check_bounds(obj, "minItems", "maxItems", path)?;
    check_bounds(obj, "minProperties", "maxProperties", path)?;

    if let Some(Value::Object(properties)) = obj.get("properties") {
        for (name, sub_schema) in properties {
            check_satisfiable_at(sub_schema, &format!("{path}.properties.{name}"))?;
        }
    }
    if let Some(items) = obj.get("items") {
        check_satisfiable_at(items, &format!("{path}.items"))?;
    }

    Ok(())
}

fn check_bounds(
    obj: &serde_json::Map<String, Value>,
    min_key: &str,
    max_key: &str,
    path: &str,
) -> Result<(), GenerativeError> {
    if let (Some(min), Some(max)) = (obj.get(min_key).and_then(Value::as_f64), obj.get(max_key).and_then(Value::as_f64)) {
        if min > max {
            return Err(GenerativeError::ImpossibleSchema(format!(
                "{path}: {min_key} ({min}) > {max_key} ({max})"
            )));
        }
    }
    Ok(())
}

/// Validate `instance` against `schema`, failing with
/// [`GenerativeError::SchemaValidationError`] on the first violation.
pub fn validate_against(schema: &Value, instance: &Value) -> Result<(), GenerativeError> {
    let validator = jsonschema::validator_for(schema)
        .map_err(|e| GenerativeError::ImpossibleSchema(e.to_string()))?;
    if let Some(err) = validator.iter_errors(instance).next() {
        return Err(GenerativeError::SchemaValidationError(err.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_min_greater_than_max() {
        let schema = json!({"type": "integer", "minimum": 10, "maximum": 5});
        assert!(matches!(
            check_satisfiable(&schema),
            Err(GenerativeError::ImpossibleSchema(_))
        ));
    }

    #[test]
    fn rejects_impossible_nested_property_schema() {
        let schema = json!({
            "type": "object",
            "properties": { "age": {"type": "integer", "minimum": 100, "maximum": 1} }
        });
        assert!(check_satisfiable(&schema).is_err());
    }

    #[test]
    fn accepts_well_formed_schema() {
        let schema = json!({"type": "object", "properties": {"sum": {"type": "integer", "minimum": 0, "maximum": 100}}});
        assert!(check_satisfiable(&schema).is_ok());
    }

    #[test]
    fn validates_response_against_schema() {
        let schema = json!({"type": "object", "required": ["sum"], "properties": {"sum": {"type": "integer"}}});
        assert!(validate_against(&schema, &json!({"sum": 15})).is_ok());
        assert!(validate_against(&schema, &json!({"sum": "not a number"})).is_err());
    }
}
