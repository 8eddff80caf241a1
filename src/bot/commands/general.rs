//! General Discord commands - ping, help, and other utility commands.
//! This module contains simple commands that don't touch the store and provide basic
//! bot functionality and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**ProdTrack Help**\n\
        Your Discord account must be linked to a staff account before you can use the \
        commands below.\n\n\
        **Production Commands**\n\
        • `/plan <category> <process> <product> <quantity> <unit> [date]` - Plans production for a day (planner, manager, admin).\n\
        • `/actual <entry> <quantity> [batch_no] [manpower] [date]` - Records the actual output of a plan (operator, manager, admin).\n\
        • `/edit <entry> [fields...]` - Corrects an entry; plan and actual quantities are separate options (manager, admin).\n\
        • `/delete <entry>` - Deletes an entry (manager, admin).\n\n\
        **Reports**\n\
        • `/summary <category> [month]` - Monthly totals, efficiency and per-process breakdown.\n\
        • `/day [date] [category]` - Entries of one day.\n\
        • `/export <category> [month]` - Downloads the monthly CSV report.\n\
        • `/log [lines]` - Recent activity.\n\n\
        **Administration**\n\
        • `/user_manage <subcommand>` - Manage staff accounts (add, list, delete, role, password, link).\n\n\
        **Utility Commands**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
