mod bot;
mod config;
mod emitter;
mod error;
mod platform;
mod router;
mod trigger;
mod verticalize;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use teloxide::Bot;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bot::VerticalBot;
use crate::config::Config;
use crate::emitter::{Gateway, ResponseEmitter};
use crate::platform::telegram::{self, TelegramGateway};
use crate::router::Router;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,verticalbot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Inline cache time: {}s", config.inline.cache_time);
    info!("  Max reply length: {}", config.reply.max_message_len);

    let bot = Bot::new(&config.bot_token);
    let gateway = TelegramGateway::new(bot.clone());

    // Identity is fetched once and shared read-only with every handler
    let me = gateway
        .self_identity()
        .await
        .context("Failed to fetch bot identity")?;
    info!("Running as @{} (id {})", me.username, me.id);

    let service = Arc::new(VerticalBot::new(
        Router::new(me),
        ResponseEmitter::new(
            gateway,
            config.inline.cache_time,
            config.reply.max_message_len,
        ),
    ));

    info!("Bot is starting...");
    telegram::run(bot, service, config.telegram.register_commands).await?;

    Ok(())
}
