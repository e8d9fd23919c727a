//! Tolerant JSON extraction from model output
//!
//! Language-model responses frequently wrap the requested JSON in code fences
//! or surround it with prose. This strips a leading fence block and slices
//! the outermost `{...}` window before handing the text to serde.

use crate::types::ServiceError;
use serde::de::DeserializeOwned;

/// Extract and deserialize the first JSON object found in model output
pub fn parse_json_response<T: DeserializeOwned>(text: &str) -> Result<T, ServiceError> {
    let candidate = extract_json_object(text)
        .ok_or_else(|| ServiceError::Parse(format!("no JSON object in response: {:.200}", text)))?;
    serde_json::from_str(candidate).map_err(|e| ServiceError::Parse(e.to_string()))
}

/// Slice the JSON object out of possibly-fenced, possibly-chatty model text
pub fn extract_json_object(text: &str) -> Option<&str> {
    let mut text = text.trim();

    // Prefer the first fenced block when one exists
    if text.contains("```") {
        let mut parts = text.split("```");
        let _before = parts.next();
        if let Some(fenced) = parts.next() {
            let fenced = fenced.trim();
            text = fenced.strip_prefix("json").map(str::trim).unwrap_or(fenced);
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}
