//! Reporting commands - `summary`, `day`, `export` and `log`.
//!
//! Views are recomputed from the full entry set on every call.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, acting_user, handlers::autocomplete, parse_arg},
        core::{
            aggregate::{self, AggregateView},
            audit, calendar, date, entry, export,
        },
        errors::{Error, Result},
        models::Category,
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Day groups shown in the summary embed
    const SUMMARY_DAYS: usize = 7;
    /// Default and maximum number of log lines
    const DEFAULT_LOG_LINES: usize = 20;
    const MAX_LOG_LINES: usize = 50;
    /// Discord message limit, leaving room for the code fence
    const MAX_MESSAGE_LEN: usize = 1900;

    async fn load_view(
        ctx: poise::Context<'_, BotData, Error>,
        category: &str,
        month: Option<String>,
    ) -> Result<Option<AggregateView>> {
        let Some(category) = parse_arg::<Category>(ctx, category).await? else {
            return Ok(None);
        };
        let month = match month {
            Some(raw) => match date::parse_month(&raw) {
                Ok(month) => month,
                Err(e) => {
                    ctx.say(format!("❌ {e}")).await?;
                    return Ok(None);
                }
            },
            None => date::current_month_key(),
        };

        let store = &ctx.data().store;
        let entries = entry::list_entries(store).await?;
        let off_days = calendar::off_days(store).await?;
        Ok(Some(aggregate::aggregate(&entries, &off_days, category, &month)))
    }

    fn process_table(view: &AggregateView) -> Result<String> {
        let mut table = String::new();
        for row in &view.processes {
            writeln!(
                &mut table,
                "**{}:** {} / {} ({:.1}%)",
                row.label,
                row.actual,
                row.plan,
                aggregate::efficiency(row.plan, row.actual)
            )?;
        }
        Ok(table)
    }

    /// Shows the monthly dashboard for a category.
    ///
    /// Totals, efficiency and the per-process breakdown for the month, followed by the
    /// most recent days.
    #[poise::command(slash_command, prefix_command)]
    pub async fn summary(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: String,
        #[description = "Month (YYYY-MM, default this month)"] month: Option<String>,
    ) -> Result<()> {
        if acting_user(ctx).await?.is_none() {
            return Ok(());
        }
        let Some(view) = load_view(ctx, &category, month).await? else {
            return Ok(());
        };

        let mut fields = vec![
            (
                "Totals".to_string(),
                format!(
                    "**Plan:** {}\n**Actual:** {}\n**Efficiency:** {:.1}%",
                    view.totals.plan, view.totals.actual, view.totals.efficiency
                ),
                false,
            ),
            ("Processes (actual / plan)".to_string(), process_table(&view)?, false),
        ];

        for group in view.days.iter().take(SUMMARY_DAYS) {
            let mut value = String::new();
            if let Some(holiday) = &group.off_day_description {
                writeln!(&mut value, "🏖️ {holiday}")?;
            }
            for e in &group.entries {
                writeln!(
                    &mut value,
                    "{} · {}: {} / {} {}",
                    e.process.name(),
                    e.product_name,
                    e.actual_quantity,
                    e.plan_quantity,
                    e.unit
                )?;
            }
            if value.is_empty() {
                value.push('-');
            }
            fields.push((
                format!(
                    "{} (actual {})",
                    date::format_display_date(&group.date),
                    group.total_actual
                ),
                value,
                false,
            ));
        }

        let entry_count: usize = view.days.iter().map(|d| d.entries.len()).sum();
        let embed = serenity::CreateEmbed::default()
            .title(format!("📊 {} Production - {}", view.category, view.month))
            .description(ctx.data().settings.organization.name.clone())
            .color(0x0034_98DB)
            .fields(fields)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{entry_count} entr{} this month",
                if entry_count == 1 { "y" } else { "ies" }
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Lists the entries of one day.
    #[poise::command(slash_command, prefix_command)]
    pub async fn day(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Day (YYYY-MM-DD, default today)"] date: Option<String>,
        #[description = "Only this category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: Option<String>,
    ) -> Result<()> {
        if acting_user(ctx).await?.is_none() {
            return Ok(());
        }
        let category = match category {
            Some(raw) => match parse_arg::<Category>(ctx, &raw).await? {
                Some(category) => Some(category),
                None => return Ok(()),
            },
            None => None,
        };

        let day = date::normalize_date(&date.unwrap_or_else(date::today_key));
        let store = &ctx.data().store;
        let entries = entry::candidates_for_day(store, &day, category).await?;
        let off_days = calendar::off_days(store).await?;

        let mut text = format!("**{}**\n", date::format_display_date(&day));
        if let Some(holiday) = calendar::find_off_day(&off_days, &day) {
            writeln!(&mut text, "🏖️ Off-day: {}", holiday.description)?;
        }
        if entries.is_empty() {
            text.push_str("No entries.");
        }
        for e in &entries {
            writeln!(
                &mut text,
                "`{}` [{}] {} · {} · {}: plan {} / actual {} {}{}",
                e.id,
                e.stage().as_str(),
                e.category,
                e.process.name(),
                e.product_name,
                e.plan_quantity,
                e.actual_quantity,
                e.unit,
                e.batch_no
                    .as_deref()
                    .map(|b| format!(" (batch {b})"))
                    .unwrap_or_default()
            )?;
        }

        ctx.say(text).await?;
        Ok(())
    }

    /// Uploads the monthly CSV report for a category.
    #[poise::command(slash_command, prefix_command)]
    pub async fn export(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: String,
        #[description = "Month (YYYY-MM, default this month)"] month: Option<String>,
    ) -> Result<()> {
        if acting_user(ctx).await?.is_none() {
            return Ok(());
        }
        let Some(view) = load_view(ctx, &category, month).await? else {
            return Ok(());
        };

        let report = export::export_report(&view, &ctx.data().settings.organization.name)?;
        let attachment =
            serenity::CreateAttachment::bytes(report.content.into_bytes(), report.file_name.clone());

        ctx.send(
            poise::CreateReply::default()
                .content(format!("📄 {}", report.file_name))
                .attachment(attachment),
        )
        .await?;
        Ok(())
    }

    /// Shows the most recent activity log lines.
    #[poise::command(slash_command, prefix_command)]
    pub async fn log(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Number of lines (default 20, max 50)"] lines: Option<u32>,
    ) -> Result<()> {
        if acting_user(ctx).await?.is_none() {
            return Ok(());
        }

        let limit = lines
            .map_or(DEFAULT_LOG_LINES, |n| usize::try_from(n).unwrap_or(MAX_LOG_LINES))
            .clamp(1, MAX_LOG_LINES);
        let records = audit::recent(&ctx.data().store, limit).await?;
        if records.is_empty() {
            ctx.say("No activity yet.").await?;
            return Ok(());
        }

        let mut body = String::new();
        for record in &records {
            let line = audit::format_log_line(record);
            if body.len() + line.len() + 1 > MAX_MESSAGE_LEN {
                break;
            }
            body.push_str(&line);
            body.push('\n');
        }

        ctx.say(format!("```\n{body}```")).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
