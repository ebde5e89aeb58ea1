//! Reply extraction from the raw generation payload.
//!
//! A successful generation carries the provider's structured response
//! as a raw JSON string. The reply text lives at
//! `candidates[0].content.parts[0].text`; any deviation from that
//! shape is a contract violation and fails the turn.

use serde::Deserialize;

use crate::error::TurnError;

#[derive(Debug, Deserialize)]
struct ReplyPayload {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ReplyPart>>,
}

#[derive(Debug, Deserialize)]
struct ReplyPart {
    text: Option<String>,
}

/// Extract the first candidate's reply text from a raw payload.
pub fn extract_reply_text(raw: &str) -> Result<String, TurnError> {
    let payload: ReplyPayload = serde_json::from_str(raw)
        .map_err(|e| TurnError::ResponseShape(format!("payload is not valid JSON: {e}")))?;

    payload
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts)
        .and_then(|parts| parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or_else(|| {
            TurnError::ResponseShape("payload has no candidate reply text".to_string())
        })
}
