pub mod telegram;

/// The bot's own account, fetched once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: u64,
    /// Username without the leading `@`
    pub username: String,
}

impl Identity {
    /// The `@username` handle users type to mention the bot
    pub fn handle(&self) -> String {
        format!("@{}", self.username)
    }
}

/// Where a reply goes: the chat and the message being answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatRef {
    pub chat_id: i64,
    pub message_id: i32,
}

/// Opaque inline query id handed back when answering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRef(pub String);

/// A mention inside a text message.
///
/// `Plain` offsets are UTF-16 code units into the message text, the unit
/// Telegram uses for entity offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MentionEntity {
    /// `@username` typed in the text
    Plain { start: usize, end: usize },
    /// Mention of a user without a username, resolved to their id
    Resolved { user_id: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessage {
    pub text: String,
    pub entities: Vec<MentionEntity>,
    /// Sender id of the message being replied to
    pub reply_parent: Option<u64>,
    pub chat: ChatRef,
}

/// An update received from any platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundUpdate {
    Command { name: String, chat: ChatRef },
    InlineQuery { query_text: String, query: QueryRef },
    TextMessage(TextMessage),
}

/// A single inline result rendered as a text article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineArticle {
    pub id: String,
    pub title: String,
    pub body: String,
    pub description: Option<String>,
}

/// What the bot wants to send back for one update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundResponse {
    ReplyText { text: String, target: ChatRef },
    InlineAnswer {
        query: QueryRef,
        results: Vec<InlineArticle>,
    },
}
