//! Plan retrieval: prompt construction, the API exchange, and extraction of
//! the JSON plan out of a free-form model reply.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::anthropic::Client;
use crate::anthropic::types::{Message, MessagesCreateRequest};
use crate::error::{OrganizerError, Result};
use crate::index::FileRecord;

pub const DEFAULT_MODEL: &str = "claude-opus-4-20250514";
pub const PLAN_MAX_TOKENS: u32 = 4000;
pub const PLAN_TEMPERATURE: f32 = 0.0;

/// Externally-supplied reorganization directive. Treated as opaque: no path
/// validity or uniqueness is enforced beyond "is a string", and files whose
/// key is absent from `organization_plan` are simply left in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrganizationPlan {
    #[serde(default)]
    pub organization_plan: BTreeMap<String, String>,
    #[serde(default)]
    pub folder_descriptions: BTreeMap<String, String>,
}

/// Pretty-printed JSON listing of the index, as embedded in the prompt.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn index_listing_json(records: &[FileRecord]) -> Result<String> {
    serde_json::to_string_pretty(records).map_err(|e| OrganizerError::Decode(e.to_string()))
}

/// Builds the instruction sent to the model: the serialized index plus the
/// required output schema.
///
/// # Errors
///
/// Returns an error if the index cannot be serialized.
pub fn build_prompt(records: &[FileRecord]) -> Result<String> {
    let listing = index_listing_json(records)?;
    Ok(format!(
        r#"I have an Obsidian vault with the following file structure. Please analyze the filenames and current folder structure, then suggest a better organization.

Current file structure:
{listing}

Please respond with a JSON structure that maps each file to its new location. The format should be:
{{
    "organization_plan": {{
        "current_file_path": "new_folder_path",
        ...
    }},
    "folder_descriptions": {{
        "folder_name": "description of what goes in this folder",
        ...
    }}
}}

Consider:
1. Group files by topic, type, or purpose based on their names
2. Create a logical hierarchy that makes files easy to find
3. Use clear, descriptive folder names
4. Don't create too many levels of nesting (max 3 levels deep)
5. Keep the existing structure if it already makes sense

Only return valid JSON, no other text."#
    ))
}

/// Extracts the first balanced JSON object embedded in free text.
///
/// The model is asked for pure JSON but not trusted to comply; surrounding
/// prose is tolerated. The scanner tracks string and escape state, so braces
/// inside string values do not break the balance count. Returns `None` if no
/// opening brace exists or the first candidate never closes.
#[must_use]
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
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

/// Parses an [`OrganizationPlan`] out of a free-form reply body.
///
/// # Errors
///
/// Returns [`OrganizerError::NoPlanPayload`] if no balanced JSON object is
/// present, or a decode error if the first candidate is not valid plan JSON.
/// Both are service errors: the run aborts with the vault untouched.
pub fn parse_plan_reply(text: &str) -> Result<OrganizationPlan> {
    let payload = extract_json_object(text).ok_or(OrganizerError::NoPlanPayload)?;
    serde_json::from_str(payload)
        .map_err(|e| OrganizerError::Decode(format!("plan payload: {e}")))
}

/// Performs the single request/response exchange and decodes the plan.
///
/// # Errors
///
/// Propagates transport, API, and plan-decoding failures. No retries.
pub async fn suggest_plan(
    client: &Client,
    records: &[FileRecord],
    model: &str,
) -> Result<OrganizationPlan> {
    let req = MessagesCreateRequest {
        model: model.to_string(),
        max_tokens: PLAN_MAX_TOKENS,
        messages: vec![Message::user(build_prompt(records)?)],
        temperature: Some(PLAN_TEMPERATURE),
    };

    let response = client.create_message(req).await?;
    let text = response.text();
    debug!(reply_chars = text.len(), "model reply received");
    parse_plan_reply(&text)
}
