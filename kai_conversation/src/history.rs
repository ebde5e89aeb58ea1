//! History serialization for the generation service.
//!
//! Converts the ordered transcript into the role/parts context payload
//! the generation service accepts. Callers pass the transcript as it
//! was *before* the in-flight turn's user message was appended; the
//! current prompt travels as a separate argument and is never
//! duplicated into the context.

use kai_core::{ContextEntry, Message};

/// Build the context payload from a transcript slice.
///
/// Each message maps to one entry: the sender becomes a role label
/// (`User` -> "user", `Model` -> "model") and the text becomes a single
/// text part. An empty transcript yields an empty context (first turn).
///
/// Escaping contract: entries are plain data; quoting and escaping of
/// special characters (including embedded double quotes) happen when
/// the entry is rendered to JSON, via `serde_json`, and are therefore
/// lossless on round-trip.
#[must_use]
pub fn build_context(messages: &[Message]) -> Vec<ContextEntry> {
    messages
        .iter()
        .map(|m| ContextEntry::new(m.sender.as_role(), m.text.clone()))
        .collect()
}

/// Render a context payload to its JSON wire form.
pub fn render_context(entries: &[ContextEntry]) -> anyhow::Result<String> {
    Ok(serde_json::to_string(entries)?)
}
