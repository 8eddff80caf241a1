//! Staff administration commands - `/user_manage` and its subcommands.
//!
//! Only admins may run the mutating subcommands; the core enforces this. Replies that
//! carry credentials are ephemeral.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, acting_user, handlers::autocomplete, parse_arg, reply_outcome},
        core::{
            notify::CollectingNotifier,
            permissions::{self, CAN_ADMINISTER},
            users::{self, NewUser},
        },
        errors::{Error, Result},
        models::Role,
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Parent command for managing staff accounts.
    ///
    /// Staff accounts carry the role that decides who may plan, record, edit and
    /// administer. This command groups subcommands for each account change.
    #[poise::command(
        slash_command,
        subcommands(
            "user_add",
            "user_list",
            "user_delete",
            "user_role",
            "user_password",
            "user_link"
        )
    )]
    pub async fn user_manage(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Staff management command. Available subcommands:\n\
            `/user_manage add` - Add a staff account\n\
            `/user_manage list` - List staff accounts\n\
            `/user_manage delete` - Delete a staff account\n\
            `/user_manage role` - Change an account's role\n\
            `/user_manage password` - Reset an account's password\n\
            `/user_manage link` - Link a Discord account to a staff account";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds a staff account.
    #[poise::command(slash_command, rename = "add", ephemeral)]
    pub async fn user_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Login name"] username: String,
        #[description = "Display name"] name: String,
        #[description = "Role"]
        #[autocomplete = "autocomplete::autocomplete_role"]
        role: String,
        #[description = "Initial password (at least 6 characters)"] password: String,
        #[description = "Contact email"] email: Option<String>,
        #[description = "Discord account to link"] member: Option<serenity::User>,
    ) -> Result<()> {
        let Some(actor) = acting_user(ctx).await? else {
            return Ok(());
        };
        let Some(role) = parse_arg::<Role>(ctx, &role).await? else {
            return Ok(());
        };

        let new_user = NewUser {
            name,
            username,
            email: email.unwrap_or_default(),
            role,
            password,
            chat_id: member.map(|m| m.id.to_string()),
        };

        let notifier = CollectingNotifier::new();
        let outcome = users::add_user(&ctx.data().store, &notifier, &actor, new_user).await;
        reply_outcome(ctx, &notifier, outcome).await?;
        Ok(())
    }

    /// Lists staff accounts with their roles.
    #[poise::command(slash_command, rename = "list", ephemeral)]
    pub async fn user_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let Some(actor) = acting_user(ctx).await? else {
            return Ok(());
        };
        if !permissions::is_allowed(actor.role, CAN_ADMINISTER) {
            ctx.say("❌ Only admins can list staff accounts.").await?;
            return Ok(());
        }

        let accounts = users::list_users(&ctx.data().store).await?;
        let mut text = format!("**Staff accounts ({})**\n", accounts.len());
        for user in &accounts {
            writeln!(
                &mut text,
                "• **{}** ({}) - {}{}",
                user.username,
                user.name,
                user.role,
                if user.chat_id.is_some() { " · linked" } else { "" }
            )?;
        }

        ctx.say(text).await?;
        Ok(())
    }

    /// Deletes a staff account. The last admin cannot be deleted.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn user_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Account to delete"]
        #[autocomplete = "autocomplete::autocomplete_user"]
        user_id: String,
    ) -> Result<()> {
        let Some(actor) = acting_user(ctx).await? else {
            return Ok(());
        };

        let notifier = CollectingNotifier::new();
        let outcome = users::delete_user(&ctx.data().store, &notifier, &actor, &user_id).await;
        reply_outcome(ctx, &notifier, outcome).await?;
        Ok(())
    }

    /// Changes an account's role. The last admin cannot be demoted.
    #[poise::command(slash_command, rename = "role")]
    pub async fn user_role(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Account to change"]
        #[autocomplete = "autocomplete::autocomplete_user"]
        user_id: String,
        #[description = "New role"]
        #[autocomplete = "autocomplete::autocomplete_role"]
        role: String,
    ) -> Result<()> {
        let Some(actor) = acting_user(ctx).await? else {
            return Ok(());
        };
        let Some(role) = parse_arg::<Role>(ctx, &role).await? else {
            return Ok(());
        };

        let notifier = CollectingNotifier::new();
        let outcome =
            users::change_role(&ctx.data().store, &notifier, &actor, &user_id, role).await;
        reply_outcome(ctx, &notifier, outcome).await?;
        Ok(())
    }

    /// Resets an account's password.
    #[poise::command(slash_command, rename = "password", ephemeral)]
    pub async fn user_password(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Account to change"]
        #[autocomplete = "autocomplete::autocomplete_user"]
        user_id: String,
        #[description = "New password (at least 6 characters)"] password: String,
    ) -> Result<()> {
        let Some(actor) = acting_user(ctx).await? else {
            return Ok(());
        };

        let notifier = CollectingNotifier::new();
        let outcome =
            users::reset_password(&ctx.data().store, &notifier, &actor, &user_id, &password)
                .await;
        reply_outcome(ctx, &notifier, outcome).await?;
        Ok(())
    }

    /// Links a Discord account to a staff account, so its commands act as that user.
    #[poise::command(slash_command, rename = "link")]
    pub async fn user_link(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Staff account"]
        #[autocomplete = "autocomplete::autocomplete_user"]
        user_id: String,
        #[description = "Discord account"] member: serenity::User,
    ) -> Result<()> {
        let Some(actor) = acting_user(ctx).await? else {
            return Ok(());
        };

        let chat_id = member.id.to_string();
        let notifier = CollectingNotifier::new();
        let outcome =
            users::link_chat(&ctx.data().store, &notifier, &actor, &user_id, &chat_id).await;
        reply_outcome(ctx, &notifier, outcome).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
