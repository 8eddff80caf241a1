//! Production entry business logic - planning, recording actuals, editing and deleting.
//!
//! An entry carries both the plan and the actual for one (date, category, process,
//! product) occurrence. Planning creates the record with a zero actual; recording the
//! actual updates that same record in place. Every mutation checks the actor's role
//! before touching the store, writes one activity-log line and emits a notice.

use crate::{
    core::{
        audit, calendar, date,
        diff,
        notify::{Notice, Notifier},
        permissions::{self, CAN_MODIFY, CAN_PLAN, CAN_RECORD},
    },
    errors::{Error, Result},
    models::{Category, EntryStage, LogAction, LogEntry, Process, ProductionEntry, Unit, User},
    store::{Collection, Store},
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

/// Input for [`create_plan`].
#[derive(Debug, Clone)]
pub struct NewPlan {
    /// Planned day, any string whose first ten characters are `YYYY-MM-DD`
    pub date: String,
    /// Product category
    pub category: Category,
    /// Process step
    pub process: Process,
    /// Product name
    pub product_name: String,
    /// Planned quantity, must be a positive integer
    pub quantity: i64,
    /// Unit of the quantity
    pub unit: Unit,
}

/// Input for [`record_actual`].
#[derive(Debug, Clone)]
pub struct ActualRecord {
    /// Id of the planned entry
    pub plan_id: String,
    /// Category the plan must belong to, when the caller picked one
    pub category: Option<Category>,
    /// Day being recorded; the plan must be on this day
    pub date: String,
    /// Produced quantity, must be a positive integer
    pub quantity: i64,
    /// Lot identifier
    pub batch_no: Option<String>,
    /// Headcount, must not be negative
    pub manpower: i64,
}

/// Replacement values for [`edit_entry`]. `None` leaves a field unchanged.
///
/// Plan and actual quantities are addressed separately, so an edit always states which
/// of the two it changes.
#[derive(Debug, Clone, Default)]
pub struct EntryEdit {
    /// New date
    pub date: Option<String>,
    /// New product name
    pub product_name: Option<String>,
    /// New category
    pub category: Option<Category>,
    /// New process
    pub process: Option<Process>,
    /// New unit
    pub unit: Option<Unit>,
    /// New planned quantity
    pub plan_quantity: Option<i64>,
    /// New actual quantity
    pub actual_quantity: Option<i64>,
    /// New headcount
    pub manpower: Option<i64>,
    /// New batch number; an empty string clears it
    pub batch_no: Option<String>,
}

/// An [`EntryEdit`] whose values passed validation.
#[derive(Debug, Clone, Default)]
struct ValidEdit {
    date: Option<String>,
    product_name: Option<String>,
    category: Option<Category>,
    process: Option<Process>,
    unit: Option<Unit>,
    plan_quantity: Option<u32>,
    actual_quantity: Option<u32>,
    manpower: Option<u32>,
    batch_no: Option<Option<String>>,
}

impl EntryEdit {
    fn validate(self) -> Result<ValidEdit> {
        // Dates are accepted on off-days here: editing is the override path.
        Ok(ValidEdit {
            date: self.date.as_deref().map(date::canonical_date).transpose()?,
            product_name: self
                .product_name
                .as_deref()
                .map(|name| required_text(name, "Product name"))
                .transpose()?,
            category: self.category,
            process: self.process,
            unit: self.unit,
            plan_quantity: self
                .plan_quantity
                .map(|q| non_negative(q, "Plan quantity"))
                .transpose()?,
            actual_quantity: self
                .actual_quantity
                .map(|q| non_negative(q, "Actual quantity"))
                .transpose()?,
            manpower: self
                .manpower
                .map(|m| non_negative(m, "Manpower"))
                .transpose()?,
            batch_no: self.batch_no.as_deref().map(optional_text),
        })
    }
}

impl ValidEdit {
    fn apply_to(self, entry: &mut ProductionEntry) {
        if let Some(date) = self.date {
            entry.date = date;
        }
        if let Some(product_name) = self.product_name {
            entry.product_name = product_name;
        }
        if let Some(category) = self.category {
            entry.category = category;
        }
        if let Some(process) = self.process {
            entry.process = process;
        }
        if let Some(unit) = self.unit {
            entry.unit = unit;
        }
        if let Some(plan_quantity) = self.plan_quantity {
            entry.plan_quantity = plan_quantity;
        }
        if let Some(actual_quantity) = self.actual_quantity {
            entry.actual_quantity = actual_quantity;
            entry.stage = Some(if actual_quantity > 0 {
                EntryStage::Recorded
            } else {
                EntryStage::Planned
            });
        }
        if let Some(manpower) = self.manpower {
            entry.manpower = manpower;
        }
        if let Some(batch_no) = self.batch_no {
            entry.batch_no = batch_no;
        }
    }
}

fn required_text(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn positive_quantity(value: i64, field: &str) -> Result<u32> {
    if value <= 0 {
        return Err(Error::validation(format!(
            "{field} must be a positive whole number, got {value}"
        )));
    }
    u32::try_from(value).map_err(|_| Error::validation(format!("{field} {value} is too large")))
}

fn non_negative(value: i64, field: &str) -> Result<u32> {
    if value < 0 {
        return Err(Error::validation(format!(
            "{field} cannot be negative, got {value}"
        )));
    }
    u32::try_from(value).map_err(|_| Error::validation(format!("{field} {value} is too large")))
}

fn not_found(id: &str) -> Error {
    Error::NotFound {
        kind: "Entry",
        id: id.to_string(),
    }
}

/// Creates a plan entry with a zero actual.
///
/// Fails with [`Error::Validation`] if the date is invalid or an off-day, the product
/// name is empty, or the quantity is not a positive integer. Nothing is written when
/// validation fails.
pub async fn create_plan<S: Store>(
    store: &S,
    notifier: &dyn Notifier,
    actor: &User,
    plan: NewPlan,
) -> Result<ProductionEntry> {
    permissions::ensure_allowed(actor.role, CAN_PLAN, "create plans")?;

    let date = date::canonical_date(&plan.date)?;
    let product_name = required_text(&plan.product_name, "Product name")?;
    let quantity = positive_quantity(plan.quantity, "Plan quantity")?;

    let off_days = calendar::off_days(store).await?;
    if let Some(off_day) = calendar::find_off_day(&off_days, &date) {
        return Err(Error::validation(format!(
            "{date} is an off-day ({}); planning is locked",
            off_day.description
        )));
    }

    let entry = ProductionEntry {
        id: Uuid::new_v4().to_string(),
        date,
        category: plan.category,
        process: plan.process,
        product_name,
        plan_quantity: quantity,
        actual_quantity: 0,
        unit: plan.unit,
        batch_no: None,
        manpower: 0,
        stage: Some(EntryStage::Planned),
        last_updated_by: actor.id.clone(),
        updated_at: Utc::now(),
    };

    let log_record = audit::record(
        actor,
        LogAction::CreatePlan,
        format!(
            "Planned {} {} for {} ({})",
            entry.plan_quantity, entry.unit, entry.product_name, entry.date
        ),
    );

    let (record, line) = (entry.clone(), log_record.clone());
    store
        .modify_pair(
            Collection::ProductionEntries,
            Collection::ActivityLog,
            move |entries: &mut Vec<ProductionEntry>, log: &mut Vec<LogEntry>| {
                entries.push(record);
                log.push(line);
                Ok(())
            },
        )
        .await?;

    audit::trace(&log_record);
    notifier.notify(Notice::success(log_record.details));

    info!(entry_id = %entry.id, "Plan created");
    Ok(entry)
}

/// Records the actual output against a plan on the given day.
///
/// The plan is looked up only among the entries of that day, and of the record's
/// category when one is given; an id outside that list fails with [`Error::NotFound`].
pub async fn record_actual<S: Store>(
    store: &S,
    notifier: &dyn Notifier,
    actor: &User,
    record: ActualRecord,
) -> Result<ProductionEntry> {
    permissions::ensure_allowed(actor.role, CAN_RECORD, "record actual output")?;

    let day = date::canonical_date(&record.date)?;
    let quantity = positive_quantity(record.quantity, "Actual quantity")?;
    let manpower = non_negative(record.manpower, "Manpower")?;
    let batch_no = record.batch_no.as_deref().and_then(optional_text);
    let category = record.category;
    let plan_id = record.plan_id;
    let actor = actor.clone();

    let (updated, log_record) = store
        .modify_pair(
            Collection::ProductionEntries,
            Collection::ActivityLog,
            move |entries: &mut Vec<ProductionEntry>, log: &mut Vec<LogEntry>| {
                let entry = entries
                    .iter_mut()
                    .find(|e| {
                        e.id == plan_id
                            && date::normalize_date(&e.date) == day
                            && category.is_none_or(|c| e.category == c)
                    })
                    .ok_or_else(|| not_found(&plan_id))?;

                entry.actual_quantity = quantity;
                entry.batch_no = batch_no;
                entry.manpower = manpower;
                entry.stage = Some(EntryStage::Recorded);
                entry.last_updated_by = actor.id.clone();
                entry.updated_at = Utc::now();

                let line = audit::record(
                    &actor,
                    LogAction::RecordActual,
                    format!(
                        "Recorded {} {} for {} ({})",
                        entry.actual_quantity, entry.unit, entry.product_name, entry.date
                    ),
                );
                log.push(line.clone());
                Ok((entry.clone(), line))
            },
        )
        .await?;

    audit::trace(&log_record);
    notifier.notify(Notice::success(log_record.details));

    info!(entry_id = %updated.id, "Actual recorded");
    Ok(updated)
}

/// Applies an edit to an entry and logs exactly the fields that changed.
///
/// When nothing changes the entry is left untouched and a no-change log line is
/// written instead.
pub async fn edit_entry<S: Store>(
    store: &S,
    notifier: &dyn Notifier,
    actor: &User,
    id: &str,
    edit: EntryEdit,
) -> Result<ProductionEntry> {
    permissions::ensure_allowed(actor.role, CAN_MODIFY, "edit entries")?;

    let edit = edit.validate()?;
    let entry_id = id.to_string();
    let actor = actor.clone();

    let (after, changed, log_record) = store
        .modify_pair(
            Collection::ProductionEntries,
            Collection::ActivityLog,
            move |entries: &mut Vec<ProductionEntry>, log: &mut Vec<LogEntry>| {
                let entry = entries
                    .iter_mut()
                    .find(|e| e.id == entry_id)
                    .ok_or_else(|| not_found(&entry_id))?;

                let before = entry.clone();
                let mut after = before.clone();
                edit.apply_to(&mut after);

                let subject = format!("Edited {} ({})", before.product_name, before.date);
                let changes = diff::diff_entries(&before, &after);
                let line = if changes.is_empty() {
                    audit::record(
                        &actor,
                        LogAction::EditNoChange,
                        format!("{subject}: no values changed"),
                    )
                } else {
                    after.last_updated_by = actor.id.clone();
                    after.updated_at = Utc::now();
                    *entry = after;
                    audit::record(
                        &actor,
                        LogAction::EditEntry,
                        format!("{subject}: {}", diff::render_changes(&changes)),
                    )
                };

                log.push(line.clone());
                let current = entry.clone();
                Ok((current, changes.len(), line))
            },
        )
        .await?;

    audit::trace(&log_record);
    if changed == 0 {
        notifier.notify(Notice::info("No values changed"));
    } else {
        notifier.notify(Notice::success(log_record.details));
    }

    info!(entry_id = %after.id, changed, "Entry edited");
    Ok(after)
}

/// Deletes an entry by id.
///
/// Returns the removed entry, or `None` without writing anything if the id is unknown.
/// Deletion is permanent.
pub async fn delete_entry<S: Store>(
    store: &S,
    notifier: &dyn Notifier,
    actor: &User,
    id: &str,
) -> Result<Option<ProductionEntry>> {
    permissions::ensure_allowed(actor.role, CAN_MODIFY, "delete entries")?;

    let entry_id = id.to_string();
    let actor = actor.clone();
    let removed = store
        .modify_pair(
            Collection::ProductionEntries,
            Collection::ActivityLog,
            move |entries: &mut Vec<ProductionEntry>, log: &mut Vec<LogEntry>| {
                let Some(index) = entries.iter().position(|e| e.id == entry_id) else {
                    return Ok(None);
                };
                let entry = entries.remove(index);
                let line = audit::record(
                    &actor,
                    LogAction::DeleteEntry,
                    format!("Deleted {} ({})", entry.product_name, entry.date),
                );
                log.push(line.clone());
                Ok(Some((entry, line)))
            },
        )
        .await?;

    Ok(removed.map(|(entry, log_record)| {
        audit::trace(&log_record);
        notifier.notify(Notice::success(log_record.details));
        info!(entry_id = %entry.id, "Entry deleted");
        entry
    }))
}

/// Finds an entry by id.
pub async fn get_entry<S: Store>(store: &S, id: &str) -> Result<Option<ProductionEntry>> {
    let entries: Vec<ProductionEntry> = store.get(Collection::ProductionEntries).await?;
    Ok(entries.into_iter().find(|e| e.id == id))
}

/// All entries, newest date first.
pub async fn list_entries<S: Store>(store: &S) -> Result<Vec<ProductionEntry>> {
    let mut entries: Vec<ProductionEntry> = store.get(Collection::ProductionEntries).await?;
    entries.sort_by(|a, b| date::normalize_date(&b.date).cmp(&date::normalize_date(&a.date)));
    Ok(entries)
}

/// Entries on `day` that an actual can be recorded against, optionally limited to one
/// category, ordered by process then product.
pub async fn candidates_for_day<S: Store>(
    store: &S,
    day: &str,
    category: Option<Category>,
) -> Result<Vec<ProductionEntry>> {
    let key = date::normalize_date(day);
    let entries: Vec<ProductionEntry> = store.get(Collection::ProductionEntries).await?;

    let mut candidates: Vec<ProductionEntry> = entries
        .into_iter()
        .filter(|e| date::normalize_date(&e.date) == key)
        .filter(|e| category.is_none_or(|c| e.category == c))
        .collect();
    candidates.sort_by(|a, b| {
        a.process
            .name()
            .cmp(b.process.name())
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    Ok(candidates)
}
