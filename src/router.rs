use tracing::{debug, info};
use uuid::Uuid;

use crate::platform::{
    ChatRef, Identity, InboundUpdate, InlineArticle, OutboundResponse, QueryRef, TextMessage,
};
use crate::trigger;
use crate::verticalize::verticalize;

const INLINE_TITLE: &str = "Verticalize text";
const INLINE_DESCRIPTION: &str = "Convert text to vertical uppercase";
const PLACEHOLDER_TITLE: &str = "Type something...";
const PLACEHOLDER_BODY: &str = "Type text to verticalize.";

/// Maps inbound updates to the response the bot should send, if any.
/// Holds only the bot's identity; routing the same update twice gives the
/// same answer apart from fresh inline result ids.
pub struct Router {
    me: Identity,
}

impl Router {
    pub fn new(me: Identity) -> Self {
        Self { me }
    }

    pub fn identity(&self) -> &Identity {
        &self.me
    }

    pub fn route(&self, update: &InboundUpdate) -> Option<OutboundResponse> {
        match update {
            InboundUpdate::Command { name, chat } => self.on_command(name, *chat),
            InboundUpdate::InlineQuery { query_text, query } => {
                Some(self.on_inline_query(query_text, query))
            }
            InboundUpdate::TextMessage(msg) => self.on_text(msg),
        }
    }

    fn on_command(&self, name: &str, chat: ChatRef) -> Option<OutboundResponse> {
        if name != "start" {
            debug!("Ignoring unknown command /{}", name);
            return None;
        }
        Some(OutboundResponse::ReplyText {
            text: greeting(&self.me),
            target: chat,
        })
    }

    fn on_inline_query(&self, query_text: &str, query: &QueryRef) -> OutboundResponse {
        let article = if query_text.trim().is_empty() {
            InlineArticle {
                id: fresh_result_id(),
                title: PLACEHOLDER_TITLE.to_string(),
                body: PLACEHOLDER_BODY.to_string(),
                description: None,
            }
        } else {
            InlineArticle {
                id: fresh_result_id(),
                title: INLINE_TITLE.to_string(),
                body: verticalize(query_text),
                description: Some(INLINE_DESCRIPTION.to_string()),
            }
        };

        OutboundResponse::InlineAnswer {
            query: query.clone(),
            results: vec![article],
        }
    }

    fn on_text(&self, msg: &TextMessage) -> Option<OutboundResponse> {
        let Some(payload) = trigger::classify(msg, &self.me) else {
            debug!(chat_id = msg.chat.chat_id, "Message not addressed to bot, ignoring");
            return None;
        };
        let kind = trigger::trigger_kind(msg, &self.me)
            .map(|kind| kind.to_string())
            .unwrap_or_default();

        if payload.is_empty() {
            debug!(
                chat_id = msg.chat.chat_id,
                trigger = %kind,
                "Triggered with empty payload, staying silent"
            );
            return None;
        }

        info!(
            chat_id = msg.chat.chat_id,
            message_id = msg.chat.message_id,
            trigger = %kind,
            "Triggered reply"
        );
        Some(OutboundResponse::ReplyText {
            text: verticalize(&payload),
            target: msg.chat,
        })
    }
}

/// Static `/start` reply with the bot's handle filled in
pub fn greeting(me: &Identity) -> String {
    let handle = me.handle();
    format!(
        "Hello! I'm alive.\n\n\
         Try mentioning me:\n{handle} hello world\n\n\
         Or use inline mode:\nType {handle} anywhere."
    )
}

fn fresh_result_id() -> String {
    Uuid::new_v4().to_string()
}
