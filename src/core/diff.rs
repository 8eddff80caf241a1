//! Field-level comparison of two versions of a production entry.
//!
//! Used to write a single activity-log line per edit naming only the fields that
//! changed, each as `Field (old → new)`.

use crate::models::ProductionEntry;
use std::fmt;

/// One changed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    /// Display name of the field
    pub field: &'static str,
    /// Value before the edit
    pub from: String,
    /// Value after the edit
    pub to: String,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} → {})", self.field, self.from, self.to)
    }
}

fn batch_display(batch: Option<&str>) -> String {
    batch.map_or_else(|| "-".to_string(), str::to_string)
}

/// Compares the user-editable fields of two entries, in a fixed field order.
#[must_use]
pub fn diff_entries(before: &ProductionEntry, after: &ProductionEntry) -> Vec<FieldChange> {
    let fields: [(&'static str, String, String); 9] = [
        ("Date", before.date.clone(), after.date.clone()),
        (
            "Product",
            before.product_name.clone(),
            after.product_name.clone(),
        ),
        (
            "Category",
            before.category.to_string(),
            after.category.to_string(),
        ),
        (
            "Process",
            before.process.to_string(),
            after.process.to_string(),
        ),
        ("Unit", before.unit.to_string(), after.unit.to_string()),
        (
            "Plan Qty",
            before.plan_quantity.to_string(),
            after.plan_quantity.to_string(),
        ),
        (
            "Actual Qty",
            before.actual_quantity.to_string(),
            after.actual_quantity.to_string(),
        ),
        (
            "Manpower",
            before.manpower.to_string(),
            after.manpower.to_string(),
        ),
        (
            "Batch",
            batch_display(before.batch_no.as_deref()),
            batch_display(after.batch_no.as_deref()),
        ),
    ];

    fields
        .into_iter()
        .filter(|(_, from, to)| from != to)
        .map(|(field, from, to)| FieldChange { field, from, to })
        .collect()
}

/// Joins changes as `"Field (old → new), Field (old → new)"`.
#[must_use]
pub fn render_changes(changes: &[FieldChange]) -> String {
    changes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Process;
    use crate::test_utils::sample_entry;

    #[test]
    fn test_identical_entries_have_no_changes() {
        let entry = sample_entry("e1", "2024-01-10");
        assert!(diff_entries(&entry, &entry.clone()).is_empty());
    }

    #[test]
    fn test_single_field_change() {
        let before = sample_entry("e1", "2024-01-10");
        let mut after = before.clone();
        after.plan_quantity = 120;

        let changes = diff_entries(&before, &after);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].to_string(), "Plan Qty (100 → 120)");
    }

    #[test]
    fn test_render_multiple_changes_in_field_order() {
        let before = sample_entry("e1", "2024-01-10");
        let mut after = before.clone();
        after.batch_no = Some("B-17".to_string());
        after.process = Process::Coating;

        let rendered = render_changes(&diff_entries(&before, &after));
        assert_eq!(rendered, "Process (Mixing → Coating), Batch (- → B-17)");
    }

    #[test]
    fn test_bookkeeping_fields_ignored() {
        let before = sample_entry("e1", "2024-01-10");
        let mut after = before.clone();
        after.last_updated_by = "someone-else".to_string();
        after.updated_at = chrono::Utc::now();
        assert!(diff_entries(&before, &after).is_empty());
    }
}
