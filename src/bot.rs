use tracing::{debug, info};

use crate::emitter::{Gateway, ResponseEmitter};
use crate::error::TransportError;
use crate::platform::{InboundUpdate, OutboundResponse};
use crate::router::Router;

/// Routes each update and emits the resulting response through the gateway.
pub struct VerticalBot<G> {
    router: Router,
    emitter: ResponseEmitter<G>,
}

impl<G: Gateway> VerticalBot<G> {
    pub fn new(router: Router, emitter: ResponseEmitter<G>) -> Self {
        Self { router, emitter }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Handle one update. Returns `Ok(true)` if something was sent.
    pub async fn handle_update(&self, update: InboundUpdate) -> Result<bool, TransportError> {
        let Some(response) = self.router.route(&update) else {
            return Ok(false);
        };

        match &response {
            OutboundResponse::ReplyText { target, .. } => {
                debug!(
                    chat_id = target.chat_id,
                    message_id = target.message_id,
                    "Replying"
                );
            }
            OutboundResponse::InlineAnswer { query, .. } => {
                info!(query_id = %query.0, "Answering inline query");
            }
        }

        self.emitter.emit(response).await?;
        Ok(true)
    }
}
