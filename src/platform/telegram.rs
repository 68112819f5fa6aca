use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    InlineQuery, InlineQueryId, InlineQueryResult, InlineQueryResultArticle,
    InputMessageContent, InputMessageContentText, MessageEntity, MessageEntityKind, MessageId,
    ReplyParameters,
};
use teloxide::utils::command::BotCommands;
use tracing::{debug, info, warn};

use crate::bot::VerticalBot;
use crate::emitter::Gateway;
use crate::error::TransportError;
use crate::platform::{
    ChatRef, Identity, InboundUpdate, InlineArticle, MentionEntity, QueryRef, TextMessage,
};

/// Commands advertised in the Telegram command menu
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "say hello and show how to use the bot")]
    Start,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
        }
    }
}

pub type TelegramBot = VerticalBot<TelegramGateway>;

/// [`Gateway`] backed by the Telegram Bot API
#[derive(Clone)]
pub struct TelegramGateway {
    bot: Bot,
}

impl TelegramGateway {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Gateway for TelegramGateway {
    async fn send_reply(&self, target: ChatRef, text: &str) -> Result<(), TransportError> {
        let mut req = self.bot.send_message(ChatId(target.chat_id), text);
        req.reply_parameters = Some(ReplyParameters::new(MessageId(target.message_id)));
        req.await?;
        Ok(())
    }

    async fn answer_inline_query(
        &self,
        query: &QueryRef,
        results: &[InlineArticle],
        cache_time: u32,
    ) -> Result<(), TransportError> {
        let results: Vec<InlineQueryResult> = results.iter().map(to_telegram_article).collect();

        let mut req = self.bot.answer_inline_query(inline_query_id(query), results);
        req.cache_time = Some(cache_time);
        req.await?;
        Ok(())
    }

    async fn self_identity(&self) -> Result<Identity, TransportError> {
        let me = self.bot.get_me().await?;
        let username = me
            .user
            .username
            .clone()
            .ok_or_else(|| TransportError::Gateway("bot account has no username".to_string()))?;
        Ok(Identity {
            id: me.user.id.0,
            username,
        })
    }
}

fn inline_query_id(query: &QueryRef) -> InlineQueryId {
    InlineQueryId(query.0.clone())
}

fn to_telegram_article(article: &InlineArticle) -> InlineQueryResult {
    let content =
        InputMessageContent::Text(InputMessageContentText::new(article.body.clone()));
    let mut result =
        InlineQueryResultArticle::new(article.id.clone(), article.title.clone(), content);
    result.description = article.description.clone();
    InlineQueryResult::Article(result)
}

/// Convert a Telegram message into an update. Non-text messages yield `None`.
pub fn inbound_from_message(msg: &Message, me: &Identity) -> Option<InboundUpdate> {
    let text = msg.text()?;
    let chat = ChatRef {
        chat_id: msg.chat.id.0,
        message_id: msg.id.0,
    };
    let entities = msg.entities().unwrap_or_default();

    if starts_with_command(entities) {
        return Some(InboundUpdate::Command {
            name: command_name(text, me),
            chat,
        });
    }

    let mentions = entities
        .iter()
        .filter_map(|entity| match &entity.kind {
            MessageEntityKind::Mention => Some(MentionEntity::Plain {
                start: entity.offset,
                end: entity.offset + entity.length,
            }),
            MessageEntityKind::TextMention { user } => {
                Some(MentionEntity::Resolved { user_id: user.id.0 })
            }
            _ => None,
        })
        .collect();

    let reply_parent = msg
        .reply_to_message()
        .and_then(|parent| parent.from.as_ref())
        .map(|user| user.id.0);

    Some(InboundUpdate::TextMessage(TextMessage {
        text: text.to_string(),
        entities: mentions,
        reply_parent,
        chat,
    }))
}

pub fn inbound_from_inline_query(query: &InlineQuery) -> InboundUpdate {
    InboundUpdate::InlineQuery {
        query_text: query.query.clone(),
        query: QueryRef(query.id.to_string()),
    }
}

fn starts_with_command(entities: &[MessageEntity]) -> bool {
    entities
        .first()
        .map(|entity| entity.offset == 0 && matches!(entity.kind, MessageEntityKind::BotCommand))
        .unwrap_or(false)
}

/// `/start@me args` -> `start`. Unknown commands, and commands addressed to
/// another bot, keep their raw token (`help`, `start@other_bot`) so they never
/// match one of ours.
fn command_name(text: &str, me: &Identity) -> String {
    // Only the command token is parsed; arguments are not ours to interpret
    let token = text.split_whitespace().next().unwrap_or_default();
    match Command::parse(token, &me.username) {
        Ok(command) => command.name().to_string(),
        Err(_) => token.trim_start_matches('/').to_string(),
    }
}

/// Run the Telegram dispatcher until Ctrl-C
pub async fn run(bot: Bot, service: Arc<TelegramBot>, register_commands: bool) -> Result<()> {
    info!("Starting Telegram platform...");

    if register_commands {
        match bot.set_my_commands(Command::bot_commands()).await {
            Ok(_) => debug!("Registered bot commands"),
            Err(e) => warn!("Failed to register bot commands: {}", e),
        }
    }

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handle_message))
        .branch(Update::filter_inline_query().endpoint(handle_inline_query));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![service])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_message(msg: Message, service: Arc<TelegramBot>) -> Result<(), TransportError> {
    let Some(update) = inbound_from_message(&msg, service.router().identity()) else {
        return Ok(());
    };

    service.handle_update(update).await?;
    Ok(())
}

async fn handle_inline_query(
    query: InlineQuery,
    service: Arc<TelegramBot>,
) -> Result<(), TransportError> {
    debug!(from = query.from.id.0, "Inline query: {}", query.query);
    service
        .handle_update(inbound_from_inline_query(&query))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn me() -> Identity {
        Identity {
            id: 42,
            username: "bot".to_string(),
        }
    }

    fn message(extra: serde_json::Value) -> Message {
        let mut value = json!({
            "message_id": 10,
            "date": 1_700_000_000,
            "chat": { "id": 5, "type": "private", "first_name": "Ann" },
            "from": { "id": 5, "is_bot": false, "first_name": "Ann" },
        });
        for (key, field) in extra.as_object().unwrap() {
            value[key] = field.clone();
        }
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_mention_entities_are_mapped() {
        let msg = message(json!({
            "text": "@bot hi Bot",
            "entities": [
                { "type": "mention", "offset": 0, "length": 4 },
                { "type": "bold", "offset": 5, "length": 2 },
                { "type": "text_mention", "offset": 8, "length": 3,
                  "user": { "id": 42, "is_bot": true, "first_name": "Bot" } }
            ]
        }));

        let update = inbound_from_message(&msg, &me()).unwrap();
        assert_eq!(
            update,
            InboundUpdate::TextMessage(TextMessage {
                text: "@bot hi Bot".to_string(),
                entities: vec![
                    MentionEntity::Plain { start: 0, end: 4 },
                    MentionEntity::Resolved { user_id: 42 },
                ],
                reply_parent: None,
                chat: ChatRef {
                    chat_id: 5,
                    message_id: 10,
                },
            })
        );
    }

    #[test]
    fn test_reply_parent_is_sender_of_replied_message() {
        let msg = message(json!({
            "text": "again",
            "reply_to_message": {
                "message_id": 9,
                "date": 1_700_000_000,
                "chat": { "id": 5, "type": "private", "first_name": "Ann" },
                "from": { "id": 42, "is_bot": true, "first_name": "Bot", "username": "bot" },
                "text": "A\nB"
            }
        }));

        match inbound_from_message(&msg, &me()) {
            Some(InboundUpdate::TextMessage(text)) => assert_eq!(text.reply_parent, Some(42)),
            other => panic!("expected text message, got {:?}", other),
        }
    }

    #[test]
    fn test_commands_are_not_text_messages() {
        let msg = message(json!({
            "text": "/start@bot now",
            "entities": [{ "type": "bot_command", "offset": 0, "length": 10 }]
        }));

        assert_eq!(
            inbound_from_message(&msg, &me()),
            Some(InboundUpdate::Command {
                name: "start".to_string(),
                chat: ChatRef {
                    chat_id: 5,
                    message_id: 10,
                },
            })
        );
    }

    #[test]
    fn test_non_text_message_is_skipped() {
        let msg = message(json!({ "location": { "latitude": 52.5, "longitude": 13.4 } }));
        assert_eq!(inbound_from_message(&msg, &me()), None);
    }

    #[test]
    fn test_command_name() {
        assert_eq!(command_name("/start", &me()), "start");
        assert_eq!(command_name("/start@bot", &me()), "start");
        assert_eq!(command_name("/start@bot hello there", &me()), "start");
        assert_eq!(command_name("/start@other_bot", &me()), "start@other_bot");
        assert_eq!(command_name("/help me", &me()), "help");
    }

    #[test]
    fn test_known_commands_parse_through_bot_commands() {
        assert!(matches!(Command::parse("/start", "bot"), Ok(Command::Start)));
        assert!(Command::parse("/start@other_bot", "bot").is_err());
        assert_eq!(Command::Start.name(), "start");
    }

    #[test]
    fn test_query_ref_round_trips_to_telegram_id() {
        let query: InlineQuery = serde_json::from_value(json!({
            "id": "4242",
            "from": { "id": 5, "is_bot": false, "first_name": "Ann" },
            "query": "",
            "offset": ""
        }))
        .unwrap();

        let InboundUpdate::InlineQuery { query: query_ref, .. } = inbound_from_inline_query(&query)
        else {
            panic!("expected inline query update");
        };
        assert_eq!(inline_query_id(&query_ref).0, query.id.0);
        assert_eq!(inline_query_id(&QueryRef("q1".to_string())).0, "q1");
    }

    #[test]
    fn test_inline_query_conversion() {
        let query: InlineQuery = serde_json::from_value(json!({
            "id": "q1",
            "from": { "id": 5, "is_bot": false, "first_name": "Ann" },
            "query": "hi there",
            "offset": ""
        }))
        .unwrap();

        assert_eq!(
            inbound_from_inline_query(&query),
            InboundUpdate::InlineQuery {
                query_text: "hi there".to_string(),
                query: QueryRef("q1".to_string()),
            }
        );
    }

    #[test]
    fn test_article_conversion() {
        let article = InlineArticle {
            id: "id-1".to_string(),
            title: "Verticalize text".to_string(),
            body: "H\nI".to_string(),
            description: Some("Convert text to vertical uppercase".to_string()),
        };

        match to_telegram_article(&article) {
            InlineQueryResult::Article(result) => {
                assert_eq!(result.title, "Verticalize text");
                assert_eq!(
                    result.description.as_deref(),
                    Some("Convert text to vertical uppercase")
                );
            }
            other => panic!("expected article, got {:?}", other),
        }
    }
}
