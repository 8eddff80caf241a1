//! Aggregation of production entries into the dashboard view.
//!
//! Everything here is a pure function of the full entry set and the off-day calendar:
//! no store access, deterministic, safe to recompute on every read. Entries are scoped
//! to one category; totals, the process breakdown and the day groups further to one
//! `YYYY-MM` month.

use crate::{
    core::date,
    models::{Category, OffDay, Process, ProductionEntry},
};
use std::collections::BTreeSet;

/// Label of the bucket collecting processes outside [`Process::KNOWN`].
pub const OTHER_PROCESS: &str = "Other";

/// Plan/actual sums for a month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotals {
    /// Sum of planned quantities
    pub plan: u64,
    /// Sum of actual quantities
    pub actual: u64,
    /// `actual / plan * 100`, or 0 when nothing was planned
    pub efficiency: f64,
}

/// Plan/actual sums for one process over a month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessTotals {
    /// Process name, or [`OTHER_PROCESS`]
    pub label: String,
    /// Sum of planned quantities
    pub plan: u64,
    /// Sum of actual quantities
    pub actual: u64,
}

/// Entries of one day, plus the holiday marker if the day is an off-day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyGroup {
    /// `YYYY-MM-DD` date key
    pub date: String,
    /// Entries on this day
    pub entries: Vec<ProductionEntry>,
    /// Sum of actual quantities on this day
    pub total_actual: u64,
    /// Whether the day is an off-day
    pub is_off_day: bool,
    /// Holiday name when `is_off_day`
    pub off_day_description: Option<String>,
}

/// The full dashboard view for one category and month.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateView {
    /// Category the view is scoped to
    pub category: Category,
    /// `YYYY-MM` month the totals and groups cover
    pub month: String,
    /// Month totals
    pub totals: MonthlyTotals,
    /// One row per known process, then the "Other" bucket
    pub processes: Vec<ProcessTotals>,
    /// Day groups for the month, newest first
    pub days: Vec<DailyGroup>,
    /// Every dated entry of the category, newest first
    pub entries: Vec<ProductionEntry>,
}

/// Efficiency as a percentage. Exactly 0 when `plan` is 0, whatever the actual.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Quantities stay far below 2^52
pub fn efficiency(plan: u64, actual: u64) -> f64 {
    if plan == 0 {
        return 0.0;
    }

    actual as f64 / plan as f64 * 100.0
}

/// Entries of `category` with a non-empty date, newest first.
#[must_use]
pub fn sorted_entries(entries: &[ProductionEntry], category: Category) -> Vec<ProductionEntry> {
    let mut filtered: Vec<ProductionEntry> = entries
        .iter()
        .filter(|e| e.category == category && !date::normalize_date(&e.date).is_empty())
        .cloned()
        .collect();
    filtered.sort_by(|a, b| date::normalize_date(&b.date).cmp(&date::normalize_date(&a.date)));
    filtered
}

/// Plan/actual totals over `entries`.
#[must_use]
pub fn monthly_totals<'a>(entries: impl IntoIterator<Item = &'a ProductionEntry>) -> MonthlyTotals {
    let (plan, actual) = entries.into_iter().fold((0_u64, 0_u64), |(plan, actual), e| {
        (
            plan + u64::from(e.plan_quantity),
            actual + u64::from(e.actual_quantity),
        )
    });

    MonthlyTotals {
        plan,
        actual,
        efficiency: efficiency(plan, actual),
    }
}

/// Per-process totals. Every known process appears once in [`Process::KNOWN`] order,
/// zero-filled if idle, followed by the "Other" bucket for unknown process names.
#[must_use]
pub fn process_breakdown<'a>(
    entries: impl IntoIterator<Item = &'a ProductionEntry>,
) -> Vec<ProcessTotals> {
    let mut rows: Vec<ProcessTotals> = Process::KNOWN
        .iter()
        .map(|p| ProcessTotals {
            label: p.name().to_string(),
            plan: 0,
            actual: 0,
        })
        .chain(std::iter::once(ProcessTotals {
            label: OTHER_PROCESS.to_string(),
            plan: 0,
            actual: 0,
        }))
        .collect();
    let other_index = rows.len() - 1;

    for entry in entries {
        let index = Process::KNOWN
            .iter()
            .position(|p| *p == entry.process)
            .unwrap_or(other_index);
        rows[index].plan += u64::from(entry.plan_quantity);
        rows[index].actual += u64::from(entry.actual_quantity);
    }

    rows
}

/// Groups entries by day, newest first. Off-days in the month appear even with no
/// entries, as empty groups marked `is_off_day`.
#[must_use]
pub fn daily_groups(
    month_entries: &[ProductionEntry],
    off_days: &[OffDay],
    month: &str,
) -> Vec<DailyGroup> {
    let month_off_days: Vec<(String, &OffDay)> = off_days
        .iter()
        .map(|day| (date::normalize_date(&day.date), day))
        .filter(|(key, _)| date::in_month(key, month))
        .collect();

    let dates: BTreeSet<String> = month_entries
        .iter()
        .map(|e| date::normalize_date(&e.date))
        .chain(month_off_days.iter().map(|(key, _)| key.clone()))
        .collect();

    dates
        .into_iter()
        .rev()
        .map(|key| {
            let entries: Vec<ProductionEntry> = month_entries
                .iter()
                .filter(|e| date::normalize_date(&e.date) == key)
                .cloned()
                .collect();
            let total_actual = entries.iter().map(|e| u64::from(e.actual_quantity)).sum();
            let off_day = month_off_days
                .iter()
                .find(|(day_key, _)| *day_key == key)
                .map(|(_, day)| day.description.clone());

            DailyGroup {
                date: key,
                entries,
                total_actual,
                is_off_day: off_day.is_some(),
                off_day_description: off_day,
            }
        })
        .collect()
}

/// Builds the dashboard view for `category` and `month` from the full entry set.
#[must_use]
pub fn aggregate(
    entries: &[ProductionEntry],
    off_days: &[OffDay],
    category: Category,
    month: &str,
) -> AggregateView {
    let month = month.trim();
    let entries = sorted_entries(entries, category);
    let month_entries: Vec<ProductionEntry> = entries
        .iter()
        .filter(|e| date::in_month(&e.date, month))
        .cloned()
        .collect();

    AggregateView {
        category,
        month: month.to_string(),
        totals: monthly_totals(&month_entries),
        processes: process_breakdown(&month_entries),
        days: daily_groups(&month_entries, off_days, month),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_entry;

    fn entry(id: &str, date: &str, process: Process, plan: u32, actual: u32) -> ProductionEntry {
        let mut entry = sample_entry(id, date);
        entry.process = process;
        entry.plan_quantity = plan;
        entry.actual_quantity = actual;
        entry
    }

    fn off_day(date: &str, description: &str) -> OffDay {
        OffDay {
            date: date.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_efficiency_zero_plan() {
        assert!(efficiency(0, 0).abs() < f64::EPSILON);
        assert!(efficiency(0, 500).abs() < f64::EPSILON);
    }

    #[test]
    fn test_efficiency_ratio() {
        assert!((efficiency(100, 80) - 80.0).abs() < f64::EPSILON);
        assert!((efficiency(50, 75) - 150.0).abs() < f64::EPSILON);
        assert!(efficiency(3, 0) >= 0.0);
    }

    #[test]
    fn test_totals_for_month_only() {
        let entries = vec![
            entry("a", "2024-01-10", Process::Mixing, 100, 80),
            entry("b", "2024-01-20T07:00:00Z", Process::Coating, 50, 50),
            entry("c", "2024-02-01", Process::Mixing, 999, 999),
        ];

        let view = aggregate(&entries, &[], Category::Tablet, "2024-01");
        assert_eq!(view.totals.plan, 150);
        assert_eq!(view.totals.actual, 130);
        assert_eq!(view.entries.len(), 3);
    }

    #[test]
    fn test_category_and_empty_date_filtered() {
        let mut capsule = entry("a", "2024-01-10", Process::Mixing, 100, 80);
        capsule.category = Category::Capsule;
        let undated = entry("b", "  ", Process::Mixing, 10, 10);

        let view = aggregate(&[capsule, undated], &[], Category::Tablet, "2024-01");
        assert_eq!(view.totals.plan, 0);
        assert!(view.entries.is_empty());
        assert!(view.days.is_empty());
    }

    #[test]
    fn test_breakdown_lists_every_known_process_once() {
        let view = aggregate(&[], &[], Category::Tablet, "2024-01");

        assert_eq!(view.processes.len(), Process::KNOWN.len() + 1);
        for process in &Process::KNOWN {
            let rows: Vec<_> = view
                .processes
                .iter()
                .filter(|row| row.label == process.name())
                .collect();
            assert_eq!(rows.len(), 1);
            assert_eq!((rows[0].plan, rows[0].actual), (0, 0));
        }
        assert_eq!(view.processes.last().map(|r| r.label.as_str()), Some(OTHER_PROCESS));
    }

    #[test]
    fn test_unknown_process_goes_to_other_bucket() {
        let entries = vec![
            entry("a", "2024-01-10", Process::from("Sterilization"), 40, 30),
            entry("b", "2024-01-11", Process::from("Labelling"), 10, 5),
            entry("c", "2024-01-11", Process::Packing, 7, 7),
        ];

        let breakdown = process_breakdown(&entries);
        let other = breakdown.last().cloned();
        assert_eq!(
            other,
            Some(ProcessTotals {
                label: OTHER_PROCESS.to_string(),
                plan: 50,
                actual: 35,
            })
        );
        let packing = breakdown.iter().find(|r| r.label == "Packing").cloned();
        assert_eq!(packing.map(|r| (r.plan, r.actual)), Some((7, 7)));
    }

    #[test]
    fn test_daily_groups_include_empty_off_day() {
        let entries = vec![entry("a", "2024-01-10", Process::Mixing, 100, 80)];
        let off_days = vec![
            off_day("2024-01-11", "Founders Day"),
            off_day("2024-02-14", "Next month"),
        ];

        let view = aggregate(&entries, &off_days, Category::Tablet, "2024-01");
        assert_eq!(view.days.len(), 2);

        assert_eq!(view.days[0].date, "2024-01-11");
        assert!(view.days[0].is_off_day);
        assert!(view.days[0].entries.is_empty());
        assert_eq!(view.days[0].off_day_description.as_deref(), Some("Founders Day"));

        assert_eq!(view.days[1].date, "2024-01-10");
        assert!(!view.days[1].is_off_day);
        assert_eq!(view.days[1].total_actual, 80);
    }

    #[test]
    fn test_two_days_one_off_day() {
        let mut first = entry("a", "2024-01-10", Process::Mixing, 100, 80);
        first.product_name = "A".to_string();
        let mut second = entry("b", "2024-01-11", Process::Mixing, 50, 0);
        second.category = Category::Syrup;
        let off_days = vec![off_day("2024-01-11", "Holiday")];

        let groups = aggregate(&[first, second], &off_days, Category::Tablet, "2024-01").days;

        assert_eq!(groups.len(), 2);
        let holiday = groups.iter().find(|g| g.date == "2024-01-11");
        assert!(holiday.is_some_and(|g| g.is_off_day && g.entries.is_empty()));
    }

    #[test]
    fn test_groups_and_entries_sorted_descending() {
        let entries = vec![
            entry("a", "2024-01-02", Process::Mixing, 1, 1),
            entry("b", "2024-01-15", Process::Mixing, 1, 1),
            entry("c", "2024-01-09T23:59:00Z", Process::Mixing, 1, 1),
        ];

        let view = aggregate(&entries, &[], Category::Tablet, "2024-01");
        let dates: Vec<&str> = view.days.iter().map(|g| g.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-15", "2024-01-09", "2024-01-02"]);

        let ids: Vec<&str> = view.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_off_day_with_entries_carries_marker() {
        let entries = vec![entry("a", "2024-01-26", Process::Mixing, 10, 10)];
        let off_days = vec![off_day("2024-01-26T00:00:00Z", "Republic Day")];

        let groups = daily_groups(&entries, &off_days, "2024-01");
        assert_eq!(groups.len(), 1);
        assert!(groups[0].is_off_day);
        assert_eq!(groups[0].entries.len(), 1);
    }
}
