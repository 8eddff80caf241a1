//! Production entry commands - `plan`, `actual`, `edit` and `delete`.
//!
//! Each command resolves the acting staff account from the Discord author, parses its
//! arguments into the core input types and replies with the notices the operation
//! produced.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, acting_user, handlers::autocomplete, parse_arg, reply_outcome},
        core::{
            date,
            entry::{self, ActualRecord, EntryEdit, NewPlan},
            notify::CollectingNotifier,
        },
        errors::{Error, Result},
        models::{Category, Process, Unit},
    };

    /// Plans production of a product for a day.
    ///
    /// Off-days are locked for planning. The date defaults to today.
    #[poise::command(slash_command, prefix_command)]
    #[allow(clippy::too_many_arguments)]
    pub async fn plan(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: String,
        #[description = "Process step"]
        #[autocomplete = "autocomplete::autocomplete_process"]
        process: String,
        #[description = "Product name"]
        #[autocomplete = "autocomplete::autocomplete_product_name"]
        product: String,
        #[description = "Planned quantity"] quantity: i64,
        #[description = "Unit (KG, LTR, PCS, BOX)"]
        #[autocomplete = "autocomplete::autocomplete_unit"]
        unit: String,
        #[description = "Day to plan (YYYY-MM-DD, default today)"] date: Option<String>,
    ) -> Result<()> {
        let Some(actor) = acting_user(ctx).await? else {
            return Ok(());
        };
        let Some(category) = parse_arg::<Category>(ctx, &category).await? else {
            return Ok(());
        };
        let Some(unit) = parse_arg::<Unit>(ctx, &unit).await? else {
            return Ok(());
        };

        let input = NewPlan {
            date: date.unwrap_or_else(date::today_key),
            category,
            process: Process::from(process),
            product_name: product,
            quantity,
            unit,
        };

        let notifier = CollectingNotifier::new();
        let outcome = entry::create_plan(&ctx.data().store, &notifier, &actor, input).await;
        reply_outcome(ctx, &notifier, outcome).await?;
        Ok(())
    }

    /// Records the actual output against a planned entry.
    ///
    /// The entry must be planned on the given day, which defaults to today, and in the
    /// given category when one is picked.
    #[poise::command(slash_command, prefix_command)]
    pub async fn actual(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Planned entry"]
        #[autocomplete = "autocomplete::autocomplete_entry"]
        entry_id: String,
        #[description = "Produced quantity"] quantity: i64,
        #[description = "Batch number"] batch_no: Option<String>,
        #[description = "Headcount on the job"] manpower: Option<i64>,
        #[description = "Day of the plan (YYYY-MM-DD, default today)"] date: Option<String>,
        #[description = "Category of the plan"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: Option<String>,
    ) -> Result<()> {
        let Some(actor) = acting_user(ctx).await? else {
            return Ok(());
        };
        let category = match category {
            Some(raw) => match parse_arg::<Category>(ctx, &raw).await? {
                Some(category) => Some(category),
                None => return Ok(()),
            },
            None => None,
        };

        let record = ActualRecord {
            plan_id: entry_id,
            category,
            date: date.unwrap_or_else(date::today_key),
            quantity,
            batch_no,
            manpower: manpower.unwrap_or(0),
        };

        let notifier = CollectingNotifier::new();
        let outcome = entry::record_actual(&ctx.data().store, &notifier, &actor, record).await;
        reply_outcome(ctx, &notifier, outcome).await?;
        Ok(())
    }

    /// Edits an entry. Only the given fields change.
    ///
    /// Plan and actual quantities are separate options so it is always clear which one
    /// is being corrected. An empty batch number clears it.
    #[poise::command(slash_command, prefix_command)]
    #[allow(clippy::too_many_arguments)]
    pub async fn edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Entry to edit"]
        #[autocomplete = "autocomplete::autocomplete_entry"]
        entry_id: String,
        #[description = "New date (YYYY-MM-DD)"] date: Option<String>,
        #[description = "New product name"]
        #[autocomplete = "autocomplete::autocomplete_product_name"]
        product: Option<String>,
        #[description = "New category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: Option<String>,
        #[description = "New process"]
        #[autocomplete = "autocomplete::autocomplete_process"]
        process: Option<String>,
        #[description = "New unit"]
        #[autocomplete = "autocomplete::autocomplete_unit"]
        unit: Option<String>,
        #[description = "New planned quantity"] plan_quantity: Option<i64>,
        #[description = "New actual quantity"] actual_quantity: Option<i64>,
        #[description = "New headcount"] manpower: Option<i64>,
        #[description = "New batch number (empty clears it)"] batch_no: Option<String>,
    ) -> Result<()> {
        let Some(actor) = acting_user(ctx).await? else {
            return Ok(());
        };

        let category = match category {
            Some(raw) => match parse_arg::<Category>(ctx, &raw).await? {
                Some(category) => Some(category),
                None => return Ok(()),
            },
            None => None,
        };
        let unit = match unit {
            Some(raw) => match parse_arg::<Unit>(ctx, &raw).await? {
                Some(unit) => Some(unit),
                None => return Ok(()),
            },
            None => None,
        };

        let edit = EntryEdit {
            date,
            product_name: product,
            category,
            process: process.map(Process::from),
            unit,
            plan_quantity,
            actual_quantity,
            manpower,
            batch_no,
        };

        let notifier = CollectingNotifier::new();
        let outcome = entry::edit_entry(&ctx.data().store, &notifier, &actor, &entry_id, edit).await;
        reply_outcome(ctx, &notifier, outcome).await?;
        Ok(())
    }

    /// Deletes an entry.
    #[poise::command(slash_command, prefix_command)]
    pub async fn delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Entry to delete"]
        #[autocomplete = "autocomplete::autocomplete_entry"]
        entry_id: String,
    ) -> Result<()> {
        let Some(actor) = acting_user(ctx).await? else {
            return Ok(());
        };

        let notifier = CollectingNotifier::new();
        let outcome = entry::delete_entry(&ctx.data().store, &notifier, &actor, &entry_id).await;
        if let Some(None) = reply_outcome(ctx, &notifier, outcome).await? {
            ctx.say(format!("❌ Entry '{entry_id}' no longer exists."))
                .await?;
        }
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
