//! Autocomplete handlers for Discord slash command parameters.
//!
//! Fixed vocabularies (categories, processes, units, roles) are filtered in memory;
//! product names and entry ids are looked up in the store.

use crate::{
    bot::BotData,
    core::{date, entry, users},
    errors::Error,
    models::{Category, Process, ProductionEntry, Role, Unit},
};
use poise::serenity_prelude as serenity;

/// Discord autocomplete limit
const MAX_CHOICES: usize = 25;
/// Discord limit on the length of a choice name
const MAX_CHOICE_NAME_LEN: usize = 100;

fn filter_names<'a>(names: impl IntoIterator<Item = &'a str>, partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();
    names
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .map(str::to_string)
        .take(MAX_CHOICES)
        .collect()
}

/// Suggests product categories.
#[allow(clippy::unused_async)] // poise awaits autocomplete callbacks
pub async fn autocomplete_category(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    filter_names(Category::ALL.map(Category::as_str), partial)
}

/// Suggests the known processes. Other names may still be typed freely.
#[allow(clippy::unused_async)] // poise awaits autocomplete callbacks
pub async fn autocomplete_process(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    filter_names(Process::KNOWN.iter().map(Process::name), partial)
}

/// Suggests quantity units.
#[allow(clippy::unused_async)] // poise awaits autocomplete callbacks
pub async fn autocomplete_unit(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    filter_names(Unit::ALL.map(Unit::as_str), partial)
}

/// Suggests staff roles.
#[allow(clippy::unused_async)] // poise awaits autocomplete callbacks
pub async fn autocomplete_role(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    filter_names(Role::ALL.map(Role::as_str), partial)
}

/// Suggests product names already used in any entry.
pub async fn autocomplete_product_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(entries) = entry::list_entries(&ctx.data().store).await else {
        return Vec::new();
    };

    let mut names: Vec<String> = entries.into_iter().map(|e| e.product_name).collect();
    names.sort();
    names.dedup();
    filter_names(names.iter().map(String::as_str), partial)
}

/// Choice name for an entry, cut to the length Discord accepts.
fn entry_label(e: &ProductionEntry) -> String {
    let label = format!(
        "{} | {} | {} | {} | {} | plan {} / actual {}",
        date::normalize_date(&e.date),
        e.stage().as_str(),
        e.category,
        e.process.name(),
        e.product_name,
        e.plan_quantity,
        e.actual_quantity
    );
    label.chars().take(MAX_CHOICE_NAME_LEN).collect()
}

/// Suggests entries, newest first, labelled with date, stage, process and product. The
/// value sent back is the entry id.
pub async fn autocomplete_entry(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<serenity::AutocompleteChoice> {
    let Ok(entries) = entry::list_entries(&ctx.data().store).await else {
        return Vec::new();
    };

    let partial_lower = partial.to_lowercase();
    entries
        .into_iter()
        .map(|e| (entry_label(&e), e.id))
        .filter(|(label, id)| {
            label.to_lowercase().contains(&partial_lower) || id.starts_with(partial)
        })
        .take(MAX_CHOICES)
        .map(|(label, id)| serenity::AutocompleteChoice::new(label, id))
        .collect()
}

/// Suggests staff accounts by username. The value sent back is the user id.
pub async fn autocomplete_user(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<serenity::AutocompleteChoice> {
    let Ok(accounts) = users::list_users(&ctx.data().store).await else {
        return Vec::new();
    };

    let partial_lower = partial.to_lowercase();
    accounts
        .into_iter()
        .filter(|u| u.username.to_lowercase().contains(&partial_lower))
        .take(MAX_CHOICES)
        .map(|u| {
            serenity::AutocompleteChoice::new(format!("{} ({})", u.username, u.role), u.id)
        })
        .collect()
}
