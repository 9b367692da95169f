//! Pulling the idea itself out of a generated message.
//!
//! The model is asked to introduce the idea with a fixed marker
//! (`"Идея: "` by default). The idea is whatever follows the marker up to
//! the first sentence terminator or line break.

pub const DEFAULT_IDEA_MARKER: &str = "Идея: ";

const TERMINATORS: &[char] = &['.', '!', '?', '\n', '\r'];

/// Returns the idea following `marker`, or `None` when the marker is absent
/// or nothing but whitespace follows it.
pub fn extract_idea<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    if marker.is_empty() {
        return None;
    }
    let start = text.find(marker)? + marker.len();
    let rest = &text[start..];
    let end = rest.find(TERMINATORS).unwrap_or(rest.len());
    let idea = rest[..end].trim();
    (!idea.is_empty()).then_some(idea)
}
