//! Intent extraction: free-text query → (brand, product, type).

use crate::error::AgentError;
use crate::llm::LanguageModel;
use crate::prompts;

/// Normalized request intent. All fields are optional: extraction degrades
/// to `None` fields rather than failing the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Intent {
    pub brand: Option<String>,
    pub product: Option<String>,
    pub category: Option<String>,
}

/// Ask the model for a JSON triple and parse it leniently.
///
/// The model's free-text response is scanned for the first balanced
/// brace-delimited substring, which is then parsed as loose JSON. If no such
/// substring exists, or it is not valid JSON, every field is left absent —
/// downstream stages degrade to empty-content queries instead of halting.
///
/// # Errors
///
/// Returns [`AgentError`] only on language-model transport failure.
pub async fn extract_intent(
    llm: &dyn LanguageModel,
    query: &str,
) -> Result<Intent, AgentError> {
    let output = llm.complete(&prompts::intent_prompt(query)).await?;

    let Some(candidate) = first_json_object(&output) else {
        tracing::warn!("intent extraction found no JSON object in model output");
        return Ok(Intent::default());
    };

    let Ok(value) = serde_json::from_str::<serde_json::Value>(candidate) else {
        tracing::warn!("intent extraction candidate was not valid JSON");
        return Ok(Intent::default());
    };

    let field = |key: &str| -> Option<String> {
        value
            .get(key)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
    };

    Ok(Intent {
        brand: field("brand"),
        product: field("product"),
        // The extraction prompt names this key "type".
        category: field("type"),
    })
}

/// Return the first balanced `{ … }` substring of `text`, if any.
///
/// Brace depth is tracked outside of JSON string literals so braces inside
/// quoted values do not unbalance the scan.
fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}
