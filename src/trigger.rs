//! Decides whether a text message is addressed to the bot and extracts the
//! text to transform.
//!
//! Two conditions trigger a reply, checked in order:
//! - the message replies to one of the bot's own messages
//! - the message mentions the bot, by `@username` or by resolved user id
//!
//! Everything else is ignored.

use crate::platform::{Identity, MentionEntity, TextMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Reply,
    Mention,
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerKind::Reply => write!(f, "reply"),
            TriggerKind::Mention => write!(f, "mention"),
        }
    }
}

/// Returns the payload to transform, or `None` when the message is not for us.
/// The payload may be empty; callers must stay silent then.
pub fn classify(msg: &TextMessage, me: &Identity) -> Option<String> {
    trigger_kind(msg, me).map(|kind| match kind {
        TriggerKind::Reply => msg.text.trim().to_string(),
        TriggerKind::Mention => strip_mention(&msg.text, me),
    })
}

/// Which condition makes `msg` addressed to the bot, first match wins.
pub fn trigger_kind(msg: &TextMessage, me: &Identity) -> Option<TriggerKind> {
    if msg.reply_parent == Some(me.id) {
        Some(TriggerKind::Reply)
    } else if mentions_me(msg, me) {
        Some(TriggerKind::Mention)
    } else {
        None
    }
}

fn mentions_me(msg: &TextMessage, me: &Identity) -> bool {
    let handle = me.handle().to_lowercase();
    msg.entities.iter().any(|entity| match entity {
        MentionEntity::Plain { start, end } => utf16_slice(&msg.text, *start, *end)
            .map(|mentioned| mentioned.to_lowercase() == handle)
            .unwrap_or(false),
        MentionEntity::Resolved { user_id } => *user_id == me.id,
    })
}

/// Removes every exact (case-sensitive) `@username` and trims the rest.
fn strip_mention(text: &str, me: &Identity) -> String {
    text.replace(&me.handle(), "").trim().to_string()
}

/// Slice `text` by UTF-16 code unit offsets. Out-of-range or
/// surrogate-splitting offsets yield `None`.
fn utf16_slice(text: &str, start: usize, end: usize) -> Option<String> {
    if start > end {
        return None;
    }
    let units: Vec<u16> = text.encode_utf16().collect();
    let slice = units.get(start..end)?;
    String::from_utf16(slice).ok()
}
