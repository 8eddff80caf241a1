//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for `ProdTrack`, including all slash
//! commands, autocomplete handlers, and bot context management.

/// Discord command implementations (entry, report, users, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::Settings,
    core::{
        notify::{CollectingNotifier, Notice},
        users,
    },
    errors::{Error, Result},
    models::User,
    store::{DbStore, MirroredStore},
};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Store type shared by all commands.
pub type BotStore = MirroredStore<DbStore>;

/// Poise context with the crate's data and error types.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

/// Shared data available to all bot commands.
pub struct BotData {
    /// Store for every collection
    pub store: BotStore,
    /// Application settings loaded at startup
    pub settings: Arc<Settings>,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub const fn new(store: BotStore, settings: Arc<Settings>) -> Self {
        Self { store, settings }
    }
}

/// Resolves the command author to a staff account through its linked chat id.
///
/// Replies with a refusal and returns `None` when the author has no account.
pub async fn acting_user(ctx: Context<'_>) -> Result<Option<User>> {
    let chat_id = ctx.author().id.to_string();
    let user = users::find_by_chat_id(&ctx.data().store, &chat_id).await?;

    if user.is_none() {
        ctx.say(
            Notice::error(format!(
                "Your Discord account ({chat_id}) is not linked to a staff account. \
                 Ask an admin to run `/user_manage link`."
            ))
            .render(),
        )
        .await?;
    }
    Ok(user)
}

/// Sends the outcome of a core operation as the reply.
///
/// On success the collected notices are sent. Errors caused by the user's input or role
/// are shown to them; anything else is propagated to the framework error handler.
pub async fn reply_outcome<T>(
    ctx: Context<'_>,
    notifier: &CollectingNotifier,
    outcome: Result<T>,
) -> Result<Option<T>> {
    match outcome {
        Ok(value) => {
            let text = notifier
                .take()
                .iter()
                .map(Notice::render)
                .collect::<Vec<_>>()
                .join("\n");
            if !text.is_empty() {
                ctx.say(text).await?;
            }
            Ok(Some(value))
        }
        Err(e) if e.is_user_facing() => {
            ctx.say(Notice::error(e.to_string()).render()).await?;
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Parses a command argument, replying with the parse error when it is invalid.
pub async fn parse_arg<T>(ctx: Context<'_>, raw: &str) -> Result<Option<T>>
where
    T: std::str::FromStr<Err = Error>,
{
    match raw.parse::<T>() {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            ctx.say(Notice::error(e.to_string()).render()).await?;
            Ok(None)
        }
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {error}", ctx.command().name);
            let message = Notice::error("Something went wrong, the change was not saved.");
            if let Err(e) = ctx.say(message.render()).await {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Connects to Discord and serves commands until the client stops.
#[instrument(skip_all)]
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::plan(),
                commands::actual(),
                commands::edit(),
                commands::delete(),
                commands::summary(),
                commands::day(),
                commands::export(),
                commands::log(),
                commands::user_manage(),
                commands::ping(),
                commands::help(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e}"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e}"))?;
    Ok(())
}

pub use commands::*;
pub use handlers::*;
