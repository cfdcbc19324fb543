//! `@name` character mention autocomplete for text-box editing.
//!
//! Character voices come with the book; typing `@` followed by part of a
//! name offers matching characters, and picking one replaces the partial
//! token with `@Name `. Offsets are byte offsets into the text and are
//! always kept on char boundaries.

#[cfg(test)]
#[path = "mention_test.rs"]
mod mention_test;

use serde::{Deserialize, Serialize};

/// A book character with an assigned narration voice. Read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterVoice {
    pub character_name: String,
    #[serde(default)]
    pub voice_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// An in-progress `@query` token ending at the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionQuery {
    /// Byte offset of the `@`.
    pub start: usize,
    /// Byte offset just past the query (the cursor).
    pub end: usize,
    /// Text typed after the `@`.
    pub query: String,
}

/// Find the mention token the cursor is in, if any.
///
/// The `@` must start the text or follow whitespace, and nothing between it
/// and the cursor may be whitespace.
#[must_use]
pub fn mention_at(text: &str, cursor: usize) -> Option<MentionQuery> {
    let cursor = floor_char_boundary(text, cursor);
    let before = &text[..cursor];
    let at = before.rfind('@')?;
    let query = &before[at + 1..];
    if query.chars().any(char::is_whitespace) {
        return None;
    }
    let preceded_ok = before[..at].chars().next_back().is_none_or(char::is_whitespace);
    if !preceded_ok {
        return None;
    }
    Some(MentionQuery { start: at, end: cursor, query: query.to_owned() })
}

/// Voices whose name starts with the query, case-insensitively.
#[must_use]
pub fn suggestions<'a>(voices: &'a [CharacterVoice], query: &str) -> Vec<&'a CharacterVoice> {
    let needle = query.to_lowercase();
    voices
        .iter()
        .filter(|v| v.character_name.to_lowercase().starts_with(&needle))
        .collect()
}

/// Replace the mention token with `@name ` and return the new text plus the
/// cursor position just after the inserted space.
#[must_use]
pub fn insert_mention(text: &str, mention: &MentionQuery, name: &str) -> (String, usize) {
    let start = floor_char_boundary(text, mention.start);
    let end = floor_char_boundary(text, mention.end.max(start));
    let inserted = format!("@{name} ");
    let mut out = String::with_capacity(text.len() + inserted.len());
    out.push_str(&text[..start]);
    out.push_str(&inserted);
    let cursor = out.len();
    out.push_str(&text[end..]);
    (out, cursor)
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
