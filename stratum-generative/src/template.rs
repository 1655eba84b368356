//! `{{name}}` prompt-variable substitution (spec.md §4.3 step 2).

use crate::error::GenerativeError;
use serde_json::{Map, Value};

/// Render `template`, substituting each `{{name}}` placeholder with its
/// string form from `variables`. Fails before any LLM call is made if a
/// referenced placeholder has no binding.
pub fn render_template(template: &str, variables: &Map<String, Value>) -> Result<String, GenerativeError> {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        rendered.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            // Unterminated placeholder: treat the rest as literal text.
            rendered.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let name = after_open[..end].trim();
        let value = variables
            .get(name)
            .ok_or_else(|| GenerativeError::MissingVariable(name.to_string()))?;
        rendered.push_str(&value_to_prompt_string(value));
        rest = &after_open[end + 2..];
    }
    rendered.push_str(rest);
    Ok(rendered)
}

fn value_to_prompt_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
