//! Window and trim rules over a session's message list.

use crate::types::{ConversationTurn, Message, Role, Session};

/// Most recent `max` messages
pub fn context_window(messages: &[Message], max: usize) -> &[Message] {
    &messages[messages.len().saturating_sub(max)..]
}

/// Digest of the user messages among the last `scan` discarded ones
///
/// Only the tail of `discarded` is inspected, so older discarded messages
/// never reach the digest.
pub fn summarize(discarded: &[Message], scan: usize, preview_chars: usize) -> Option<String> {
    let tail = &discarded[discarded.len().saturating_sub(scan)..];
    let parts: Vec<String> = tail
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| {
            let preview: String = m.content.chars().take(preview_chars).collect();
            format!("User asked about: {preview}...")
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

/// Keep only the last `max` messages, replacing the summary with a digest of
/// the dropped ones when that digest is non-empty
///
/// Returns the number of discarded messages.
pub fn trim(session: &mut Session, max: usize, scan: usize, preview_chars: usize) -> usize {
    let len = session.messages.len();
    if len <= max {
        return 0;
    }

    let discarded: Vec<Message> = session.messages.drain(..len - max).collect();
    if let Some(summary) = summarize(&discarded, scan, preview_chars) {
        session.metadata.context_summary = Some(summary);
    }
    discarded.len()
}

/// Turns handed to the model: the window, led by the summary once trimming
/// has happened
pub fn conversation_context(session: &Session, max: usize) -> Vec<ConversationTurn> {
    let window = context_window(&session.messages, max);
    let mut turns: Vec<ConversationTurn> = Vec::with_capacity(window.len() + 1);

    let trimmed = session.metadata.message_count > window.len() as u64;
    if let Some(summary) = session.metadata.context_summary.as_deref() {
        if trimmed && !summary.is_empty() {
            turns.push(ConversationTurn {
                role: Role::Assistant,
                content: format!("[Previous conversation summary: {summary}]"),
            });
        }
    }

    turns.extend(window.iter().map(|m| ConversationTurn {
        role: m.role,
        content: m.content.clone(),
    }));
    turns
}
