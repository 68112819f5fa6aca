use async_trait::async_trait;
use tracing::debug;

use crate::error::TransportError;
use crate::platform::{ChatRef, Identity, InlineArticle, OutboundResponse, QueryRef};

/// Outbound side of a chat platform
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn send_reply(&self, target: ChatRef, text: &str) -> Result<(), TransportError>;

    async fn answer_inline_query(
        &self,
        query: &QueryRef,
        results: &[InlineArticle],
        cache_time: u32,
    ) -> Result<(), TransportError>;

    async fn self_identity(&self) -> Result<Identity, TransportError>;
}

/// Turns routed responses into gateway calls
pub struct ResponseEmitter<G> {
    gateway: G,
    inline_cache_time: u32,
    max_message_len: usize,
}

impl<G: Gateway> ResponseEmitter<G> {
    pub fn new(gateway: G, inline_cache_time: u32, max_message_len: usize) -> Self {
        Self {
            gateway,
            inline_cache_time,
            max_message_len,
        }
    }

    #[cfg(test)]
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub async fn emit(&self, response: OutboundResponse) -> Result<(), TransportError> {
        match response {
            OutboundResponse::ReplyText { text, target } => {
                let chunks = split_message(&text, self.max_message_len);
                debug!(
                    chat_id = target.chat_id,
                    chunks = chunks.len(),
                    "Sending reply"
                );
                for chunk in chunks {
                    self.gateway.send_reply(target, &chunk).await?;
                }
                Ok(())
            }
            OutboundResponse::InlineAnswer { query, results } => {
                debug!(results = results.len(), "Answering inline query");
                self.gateway
                    .answer_inline_query(&query, &results, self.inline_cache_time)
                    .await
            }
        }
    }
}

/// Split long messages for the platform's message size limit, measured in
/// characters. Prefers blank lines (word boundaries), then single newlines.
fn split_message(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);
    if text.chars().count() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        // Separators between chunks are dropped
        let rest = &text[start..];
        start += rest.len() - rest.trim_start_matches('\n').len();
        if start >= text.len() {
            break;
        }

        // Byte offset just past the next max_len characters
        let end = text[start..]
            .char_indices()
            .nth(max_len)
            .map_or(text.len(), |(offset, _)| start + offset);

        let actual_end = if end < text.len() {
            let window = &text[start..end];
            window
                .rfind("\n\n")
                .or_else(|| window.rfind('\n'))
                .map(|pos| start + pos)
                .unwrap_or(end)
        } else {
            end
        };

        chunks.push(text[start..actual_end].to_string());
        start = actual_end;
    }

    chunks
}
